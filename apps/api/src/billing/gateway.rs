//! Remote payment provider.
//!
//! Every provider call goes through the `PaymentGateway` trait so the session
//! state machine and the coupon flow can run against a scripted gateway in
//! tests. `HttpPaymentGateway` speaks the provider's JSON protocol:
//!
//! - `POST /create-charge {name, email, taxId, coupon?}` → `{paymentId, qrPayload, qrImage}` or `{error}`
//! - `GET /charge-status?id=…` → `{confirmed}`
//! - `POST /validate-coupon {code}` → `{valid, discountPercent?, message?}`
//! - `POST /register-free-usage {code}` → `{paymentId?}`

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("{0}")]
    Rejected(String),

    #[error("invalid provider URL: {0}")]
    InvalidUrl(String),
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

/// Charge creation payload. `tax_id` is always digits only.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargeRequest {
    pub name: String,
    pub email: String,
    pub tax_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon: Option<String>,
}

/// An instant-payment charge: opaque id plus the QR code to pay it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Charge {
    pub payment_id: String,
    pub qr_payload: String,
    pub qr_image: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeStatus {
    #[serde(default)]
    pub confirmed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponReply {
    #[serde(default)]
    pub valid: bool,
    #[serde(default)]
    pub discount_percent: f64,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreeUsage {
    #[serde(default)]
    pub payment_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ChargeReply {
    Created(Charge),
    Failed { error: String },
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    error: String,
}

#[derive(Serialize)]
struct CouponPayload<'a> {
    code: &'a str,
}

// ────────────────────────────────────────────────────────────────────────────
// Trait
// ────────────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_charge(&self, request: &ChargeRequest) -> Result<Charge, GatewayError>;

    async fn charge_status(&self, payment_id: &str) -> Result<ChargeStatus, GatewayError>;

    async fn validate_coupon(&self, code: &str) -> Result<CouponReply, GatewayError>;

    async fn register_free_usage(&self, coupon: &str) -> Result<FreeUsage, GatewayError>;
}

// ────────────────────────────────────────────────────────────────────────────
// HTTP implementation
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct HttpPaymentGateway {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpPaymentGateway {
    pub fn new(base_url: &str, api_key: Option<String>, timeout: Duration) -> Result<Self, GatewayError> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(GatewayError::InvalidUrl(base_url));
        }
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key).header("apikey", key),
            None => request,
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, GatewayError> {
        let response = self.authorize(request).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("payment provider returned {}: {}", status, body);
            let message = serde_json::from_str::<ProviderError>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn create_charge(&self, request: &ChargeRequest) -> Result<Charge, GatewayError> {
        let reply: ChargeReply = self
            .send(self.client.post(self.url("create-charge")).json(request))
            .await?;
        match reply {
            ChargeReply::Created(charge) => {
                debug!(payment_id = %charge.payment_id, "charge created");
                Ok(charge)
            }
            ChargeReply::Failed { error } => Err(GatewayError::Rejected(error)),
        }
    }

    async fn charge_status(&self, payment_id: &str) -> Result<ChargeStatus, GatewayError> {
        self.send(
            self.client
                .get(self.url("charge-status"))
                .query(&[("id", payment_id)]),
        )
        .await
    }

    async fn validate_coupon(&self, code: &str) -> Result<CouponReply, GatewayError> {
        self.send(
            self.client
                .post(self.url("validate-coupon"))
                .json(&CouponPayload { code }),
        )
        .await
    }

    async fn register_free_usage(&self, coupon: &str) -> Result<FreeUsage, GatewayError> {
        self.send(
            self.client
                .post(self.url("register-free-usage"))
                .json(&CouponPayload { code: coupon }),
        )
        .await
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Scripted gateway for tests
// ────────────────────────────────────────────────────────────────────────────
