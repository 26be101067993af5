//! Coupon validation against the provider. Never fails: remote errors come
//! back as an invalid result with a retry message.

use serde::Serialize;
use tracing::{info, warn};

use crate::billing::gateway::PaymentGateway;
use crate::billing::pricing::AppliedCoupon;

const MSG_EMPTY: &str = "Informe o código do cupom.";
const MSG_INVALID: &str = "Cupom inválido ou expirado.";
const MSG_UNAVAILABLE: &str = "Não foi possível validar o cupom agora. Tente novamente.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CouponValidation {
    pub code: String,
    pub valid: bool,
    pub discount_percent: f64,
    pub message: Option<String>,
}

impl CouponValidation {
    fn invalid(code: String, message: impl Into<String>) -> Self {
        Self {
            code,
            valid: false,
            discount_percent: 0.0,
            message: Some(message.into()),
        }
    }

    pub fn applied(&self) -> Option<AppliedCoupon> {
        self.valid.then(|| AppliedCoupon {
            code: self.code.clone(),
            discount_percent: self.discount_percent,
        })
    }
}

/// Codes are trimmed and upper-cased before they reach the provider.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

pub async fn validate_coupon(gateway: &dyn PaymentGateway, code: &str) -> CouponValidation {
    let code = normalize_code(code);
    if code.is_empty() {
        return CouponValidation::invalid(code, MSG_EMPTY);
    }

    match gateway.validate_coupon(&code).await {
        Ok(reply) if reply.valid => {
            let discount_percent = if reply.discount_percent.is_finite() {
                reply.discount_percent.clamp(0.0, 100.0)
            } else {
                0.0
            };
            info!(%code, discount_percent, "coupon accepted");
            CouponValidation {
                code,
                valid: true,
                discount_percent,
                message: reply.message,
            }
        }
        Ok(reply) => {
            let message = reply
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| MSG_INVALID.to_string());
            CouponValidation::invalid(code, message)
        }
        Err(e) => {
            warn!(%code, "coupon validation failed: {e}");
            CouponValidation::invalid(code, MSG_UNAVAILABLE)
        }
    }
}
