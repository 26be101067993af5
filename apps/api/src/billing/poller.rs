//! Settlement polling.
//!
//! One background task per awaiting session asks the provider for the charge
//! status on a fixed interval. The first positive answer moves the session
//! to `Confirmed`, waits the confirmation delay, announces the settlement and
//! ends the task. Transient query errors are logged and polling continues.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::billing::gateway::PaymentGateway;
use crate::billing::session::PaymentSession;

pub const TIMEOUT_MESSAGE: &str =
    "Ainda não recebemos a confirmação do pagamento. Se você já pagou, verifique novamente.";

/// Emitted once per confirmed session, after the confirmation delay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementEvent {
    pub workspace_id: Uuid,
    pub session_id: Uuid,
    pub payment_id: String,
}

#[derive(Debug, Clone, Copy)]
pub struct PollSettings {
    pub interval: Duration,
    pub confirmation_delay: Duration,
    /// `None` polls until the session is closed.
    pub timeout: Option<Duration>,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(5000),
            confirmation_delay: Duration::from_millis(1500),
            timeout: None,
        }
    }
}

/// Everything a poller or a confirmation task needs, cloned per task.
#[derive(Clone)]
pub struct PollContext {
    pub workspace_id: Uuid,
    pub gateway: Arc<dyn PaymentGateway>,
    pub session: Arc<Mutex<PaymentSession>>,
    pub settings: PollSettings,
    pub events: mpsc::UnboundedSender<SettlementEvent>,
}

pub(crate) fn lock(session: &Mutex<PaymentSession>) -> MutexGuard<'_, PaymentSession> {
    session.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Owns a background task and aborts it when dropped unless detached.
#[derive(Debug)]
pub struct TaskGuard {
    task: Option<JoinHandle<()>>,
}

impl TaskGuard {
    pub fn spawn<F>(future: F) -> Self
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        Self {
            task: Some(tokio::spawn(future)),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Lets the task run to completion on its own.
    pub fn detach(mut self) {
        self.task.take();
    }
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

pub fn spawn_poller(ctx: PollContext, payment_id: String) -> TaskGuard {
    TaskGuard::spawn(poll_until_settled(ctx, payment_id))
}

/// Confirmation delay followed by the settlement announcement.
pub fn spawn_announcement(ctx: PollContext, payment_id: String) -> TaskGuard {
    TaskGuard::spawn(announce(ctx, payment_id))
}

async fn poll_until_settled(ctx: PollContext, payment_id: String) {
    let mut ticker = time::interval(ctx.settings.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // first tick completes immediately; the first query waits one interval
    ticker.tick().await;
    let deadline = ctx.settings.timeout.map(|t| Instant::now() + t);

    loop {
        ticker.tick().await;

        if deadline.is_some_and(|d| Instant::now() >= d) {
            info!(%payment_id, "settlement polling timed out");
            lock(&ctx.session).note(TIMEOUT_MESSAGE);
            return;
        }

        match ctx.gateway.charge_status(&payment_id).await {
            Ok(status) if status.confirmed => {
                let transitioned = lock(&ctx.session).confirm();
                if transitioned {
                    info!(%payment_id, "payment confirmed");
                    announce(ctx, payment_id).await;
                }
                return;
            }
            Ok(_) => debug!(%payment_id, "payment not settled yet"),
            Err(e) => warn!(%payment_id, "charge status query failed: {e}"),
        }
    }
}

async fn announce(ctx: PollContext, payment_id: String) {
    time::sleep(ctx.settings.confirmation_delay).await;
    let session_id = lock(&ctx.session).id;
    let event = SettlementEvent {
        workspace_id: ctx.workspace_id,
        session_id,
        payment_id,
    };
    if ctx.events.send(event).is_err() {
        warn!(workspace_id = %ctx.workspace_id, "settlement receiver closed, export skipped");
    }
}
