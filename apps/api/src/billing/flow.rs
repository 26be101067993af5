//! Async driver for a payment session: performs the provider calls between
//! state transitions and owns the settlement poller.

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::billing::gateway::PaymentGateway;
use crate::billing::poller::{
    lock, spawn_announcement, spawn_poller, PollContext, PollSettings, SettlementEvent, TaskGuard,
};
use crate::billing::pricing::{PricingError, PricingQuote};
use crate::billing::session::{PayerForm, PaymentSession, PaymentState, SessionError};

pub struct PaymentFlow {
    ctx: PollContext,
    task: Option<TaskGuard>,
}

impl PaymentFlow {
    /// Opens a fresh session in `CollectingTaxId` for a chargeable quote.
    pub fn open(
        workspace_id: Uuid,
        quote: PricingQuote,
        gateway: Arc<dyn PaymentGateway>,
        settings: PollSettings,
        events: mpsc::UnboundedSender<SettlementEvent>,
    ) -> Result<Self, SessionError> {
        if quote.is_free() {
            return Err(PricingError::FreeOrder.into());
        }
        let session = PaymentSession::new(quote);
        info!(%workspace_id, session_id = %session.id, "payment session opened");
        Ok(Self {
            ctx: PollContext {
                workspace_id,
                gateway,
                session: Arc::new(Mutex::new(session)),
                settings,
                events,
            },
            task: None,
        })
    }

    pub fn snapshot(&self) -> PaymentSession {
        lock(&self.ctx.session).clone()
    }

    pub fn state(&self) -> PaymentState {
        lock(&self.ctx.session).state
    }

    /// Payment id of a confirmed session.
    pub fn settled_payment_id(&self) -> Option<String> {
        let session = lock(&self.ctx.session);
        if session.is_confirmed() {
            session.payment_id.clone()
        } else {
            None
        }
    }

    pub fn is_polling(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Validates the payer, creates the charge and starts polling.
    pub async fn submit(&mut self, form: PayerForm) -> Result<PaymentSession, SessionError> {
        let request = lock(&self.ctx.session).begin_creating(form)?;

        match self.ctx.gateway.create_charge(&request).await {
            Ok(charge) => {
                let payment_id = charge.payment_id.clone();
                lock(&self.ctx.session).charge_created(charge)?;
                info!(workspace_id = %self.ctx.workspace_id, %payment_id, "awaiting settlement");
                self.task = Some(spawn_poller(self.ctx.clone(), payment_id));
                Ok(self.snapshot())
            }
            Err(e) => {
                warn!(workspace_id = %self.ctx.workspace_id, "charge creation failed: {e}");
                lock(&self.ctx.session).charge_failed(e.to_string())?;
                Err(e.into())
            }
        }
    }

    /// One immediate status query. Restarts polling if it had stopped.
    pub async fn recheck(&mut self) -> Result<PaymentSession, SessionError> {
        let payment_id = {
            let session = lock(&self.ctx.session);
            match (&session.state, &session.payment_id) {
                (PaymentState::AwaitingSettlement, Some(id)) => id.clone(),
                (PaymentState::Confirmed, _) => return Ok(session.clone()),
                (from, _) => {
                    return Err(SessionError::InvalidTransition {
                        from: *from,
                        action: "check the payment",
                    })
                }
            }
        };

        let status = self.ctx.gateway.charge_status(&payment_id).await?;
        if status.confirmed {
            let transitioned = lock(&self.ctx.session).confirm();
            if transitioned {
                info!(%payment_id, "payment confirmed on recheck");
                // replaces the poller, which is no longer needed
                self.task = Some(spawn_announcement(self.ctx.clone(), payment_id));
            }
        } else if !self.is_polling() {
            lock(&self.ctx.session).error = None;
            self.task = Some(spawn_poller(self.ctx.clone(), payment_id));
        }
        Ok(self.snapshot())
    }
}

/// Full-discount path: no session, no charge. Registers the coupon use and
/// returns the reference the export is filed under.
pub async fn register_free_usage(
    gateway: &dyn PaymentGateway,
    quote: &PricingQuote,
) -> Result<String, SessionError> {
    if !quote.is_free() {
        return Err(SessionError::InvalidTransition {
            from: PaymentState::CollectingTaxId,
            action: "skip payment for a priced order",
        });
    }
    let coupon = quote.coupon_code.as_deref().unwrap_or_default();
    let usage = gateway.register_free_usage(coupon).await?;
    let reference = usage
        .payment_id
        .unwrap_or_else(|| format!("free-{}", Uuid::new_v4()));
    info!(%coupon, %reference, "free usage registered");
    Ok(reference)
}

impl PaymentFlow {
    /// Closes the payment surface. Returns the payment id when the session
    /// had already confirmed, in which case its announcement keeps running.
    pub fn close(mut self) -> Option<String> {
        self.release()
    }

    /// Decides under the session lock so a concurrent confirmation is either
    /// seen here or never announced.
    fn release(&mut self) -> Option<String> {
        let session = lock(&self.ctx.session);
        let settled = if session.is_confirmed() {
            session.payment_id.clone()
        } else {
            None
        };
        if let Some(task) = self.task.take() {
            if settled.is_some() {
                task.detach();
            } else {
                drop(task);
            }
        }
        settled
    }
}

impl Drop for PaymentFlow {
    /// Closing before confirmation stops polling. After confirmation the
    /// pending announcement still runs.
    fn drop(&mut self) {
        self.release();
    }
}
