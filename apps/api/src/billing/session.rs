//! Payment session state machine.
//!
//! ```text
//! CollectingTaxId ──submit──▶ Creating ──ok──▶ AwaitingSettlement ──confirmed──▶ Confirmed
//!        ▲                       │
//!        └──────── error ────────┘
//! ```
//!
//! Transitions are pure; the async driver in `billing::flow` performs the
//! provider calls between them. A session is discarded when it is closed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::billing::gateway::{Charge, ChargeRequest, GatewayError};
use crate::billing::pricing::{PricingError, PricingQuote};
use crate::tax_id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentState {
    CollectingTaxId,
    Creating,
    AwaitingSettlement,
    Confirmed,
}

impl PaymentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentState::CollectingTaxId => "collecting_tax_id",
            PaymentState::Creating => "creating",
            PaymentState::AwaitingSettlement => "awaiting_settlement",
            PaymentState::Confirmed => "confirmed",
        }
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("cannot {action} while the payment is {}", .from.as_str())]
    InvalidTransition { from: PaymentState, action: &'static str },

    #[error("{0}")]
    InvalidPayer(String),

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error("payment provider error: {0}")]
    Gateway(#[from] GatewayError),
}

/// Payer details as typed into the form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PayerForm {
    pub name: String,
    pub email: String,
    pub tax_id: String,
}

impl PayerForm {
    /// Returns the digits-only tax id when every field is usable.
    fn validate(&self) -> Result<String, String> {
        if self.name.trim().is_empty() {
            return Err("Informe o nome completo.".to_string());
        }
        let email = self.email.trim();
        let well_formed = email
            .split_once('@')
            .is_some_and(|(user, domain)| !user.is_empty() && domain.contains('.'));
        if !well_formed {
            return Err("Informe um e-mail válido.".to_string());
        }
        let digits = tax_id::clean(&self.tax_id);
        if !tax_id::is_valid(&digits) {
            return Err("CPF inválido.".to_string());
        }
        Ok(digits)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentSession {
    pub id: Uuid,
    pub state: PaymentState,
    pub quote: PricingQuote,
    pub form: PayerForm,
    pub payment_id: Option<String>,
    pub qr_payload: Option<String>,
    pub qr_image: Option<String>,
    pub error: Option<String>,
    /// Every state entered, in order.
    pub history: Vec<PaymentState>,
    pub opened_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
}

impl PaymentSession {
    pub fn new(quote: PricingQuote) -> Self {
        Self {
            id: Uuid::new_v4(),
            state: PaymentState::CollectingTaxId,
            quote,
            form: PayerForm::default(),
            payment_id: None,
            qr_payload: None,
            qr_image: None,
            error: None,
            history: vec![PaymentState::CollectingTaxId],
            opened_at: Utc::now(),
            confirmed_at: None,
        }
    }

    fn enter(&mut self, state: PaymentState) {
        self.state = state;
        self.history.push(state);
    }

    fn expect(&self, state: PaymentState, action: &'static str) -> Result<(), SessionError> {
        if self.state == state {
            Ok(())
        } else {
            Err(SessionError::InvalidTransition {
                from: self.state,
                action,
            })
        }
    }

    /// CollectingTaxId → Creating. The form is kept even when it is rejected,
    /// and nothing leaves this state unless the quote can actually be charged.
    pub fn begin_creating(&mut self, form: PayerForm) -> Result<ChargeRequest, SessionError> {
        self.expect(PaymentState::CollectingTaxId, "submit payer details")?;
        self.form = PayerForm {
            tax_id: tax_id::format(&form.tax_id),
            ..form
        };

        if let Err(e) = self.quote.ensure_chargeable() {
            self.error = Some(e.to_string());
            return Err(e.into());
        }
        let digits = match self.form.validate() {
            Ok(digits) => digits,
            Err(message) => {
                self.error = Some(message.clone());
                return Err(SessionError::InvalidPayer(message));
            }
        };

        self.error = None;
        self.enter(PaymentState::Creating);
        Ok(ChargeRequest {
            name: self.form.name.trim().to_string(),
            email: self.form.email.trim().to_string(),
            tax_id: digits,
            coupon: self.quote.coupon_code.clone(),
        })
    }

    /// Creating → CollectingTaxId with the provider's message.
    pub fn charge_failed(&mut self, message: impl Into<String>) -> Result<(), SessionError> {
        self.expect(PaymentState::Creating, "record a failed charge")?;
        self.error = Some(message.into());
        self.enter(PaymentState::CollectingTaxId);
        Ok(())
    }

    /// Creating → AwaitingSettlement.
    pub fn charge_created(&mut self, charge: Charge) -> Result<(), SessionError> {
        self.expect(PaymentState::Creating, "record a created charge")?;
        self.payment_id = Some(charge.payment_id);
        self.qr_payload = Some(charge.qr_payload);
        self.qr_image = Some(charge.qr_image);
        self.enter(PaymentState::AwaitingSettlement);
        Ok(())
    }

    /// AwaitingSettlement → Confirmed. Returns `true` only for the call that
    /// performed the transition.
    pub fn confirm(&mut self) -> bool {
        if self.state != PaymentState::AwaitingSettlement {
            return false;
        }
        self.error = None;
        self.confirmed_at = Some(Utc::now());
        self.enter(PaymentState::Confirmed);
        true
    }

    /// Informational message shown while the session stays put.
    pub fn note(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn is_confirmed(&self) -> bool {
        self.state == PaymentState::Confirmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::billing::pricing::{quote, AppliedCoupon, Price};

    fn chargeable() -> PricingQuote {
        quote(Price::from_decimal(10.0), None, Price::from_decimal(5.0))
    }

    fn form(tax_id: &str) -> PayerForm {
        PayerForm {
            name: " Ana Souza ".to_string(),
            email: "ana@example.com".to_string(),
            tax_id: tax_id.to_string(),
        }
    }

    fn charge() -> Charge {
        Charge {
            payment_id: "pay_1".to_string(),
            qr_payload: "000201".to_string(),
            qr_image: "img".to_string(),
        }
    }

    #[test]
    fn test_submit_cleans_tax_id() {
        let mut session = PaymentSession::new(chargeable());
        let request = session.begin_creating(form("529.982.247-25")).unwrap();
        assert_eq!(request.tax_id, "52998224725");
        assert_eq!(request.name, "Ana Souza");
        assert_eq!(session.state, PaymentState::Creating);
        assert_eq!(session.form.tax_id, "529.982.247-25");
    }

    #[test]
    fn test_invalid_tax_id_stays_collecting() {
        let mut session = PaymentSession::new(chargeable());
        let err = session.begin_creating(form("111.111.111-11")).unwrap_err();
        assert!(matches!(err, SessionError::InvalidPayer(_)));
        assert_eq!(session.state, PaymentState::CollectingTaxId);
        assert_eq!(session.form.tax_id, "111.111.111-11");
        assert_eq!(session.error.as_deref(), Some("CPF inválido."));
    }

    #[test]
    fn test_bad_email_is_rejected() {
        let mut session = PaymentSession::new(chargeable());
        let mut f = form("52998224725");
        f.email = "ana@".to_string();
        assert!(session.begin_creating(f).is_err());
    }

    #[test]
    fn test_below_minimum_blocks_submit() {
        let coupon = AppliedCoupon {
            code: "PROMO60".to_string(),
            discount_percent: 60.0,
        };
        let q = quote(Price::from_decimal(10.0), Some(&coupon), Price::from_decimal(5.0));
        let mut session = PaymentSession::new(q);
        let err = session.begin_creating(form("52998224725")).unwrap_err();
        assert!(matches!(err, SessionError::Pricing(PricingError::BelowMinimum { .. })));
        assert_eq!(session.history, vec![PaymentState::CollectingTaxId]);
    }

    #[test]
    fn test_failure_returns_to_collecting_and_keeps_form() {
        let mut session = PaymentSession::new(chargeable());
        session.begin_creating(form("52998224725")).unwrap();
        session.charge_failed("provider down").unwrap();
        assert_eq!(session.state, PaymentState::CollectingTaxId);
        assert_eq!(session.error.as_deref(), Some("provider down"));
        assert_eq!(session.form.name, " Ana Souza ");
        // can retry
        assert!(session.begin_creating(session.form.clone()).is_ok());
    }

    #[test]
    fn test_happy_path_and_single_confirmation() {
        let mut session = PaymentSession::new(chargeable());
        session.begin_creating(form("52998224725")).unwrap();
        session.charge_created(charge()).unwrap();
        assert_eq!(session.payment_id.as_deref(), Some("pay_1"));
        assert!(session.confirm());
        assert!(!session.confirm());
        assert_eq!(
            session.history,
            vec![
                PaymentState::CollectingTaxId,
                PaymentState::Creating,
                PaymentState::AwaitingSettlement,
                PaymentState::Confirmed,
            ]
        );
        assert!(session.confirmed_at.is_some());
    }

    #[test]
    fn test_out_of_order_transitions_are_refused() {
        let mut session = PaymentSession::new(chargeable());
        assert!(!session.confirm());
        assert!(matches!(
            session.charge_created(charge()),
            Err(SessionError::InvalidTransition { from: PaymentState::CollectingTaxId, .. })
        ));
        session.begin_creating(form("52998224725")).unwrap();
        assert!(session.begin_creating(form("52998224725")).is_err());
    }
}
