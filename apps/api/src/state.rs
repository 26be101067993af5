use std::sync::Arc;

use tokio::sync::mpsc;

use crate::billing::{PaymentGateway, PollSettings, PriceList, SettlementEvent};
use crate::export::ExportOrchestrator;
use crate::workspace::WorkspaceStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub workspaces: WorkspaceStore,
    /// Pluggable payment provider. Default: HttpPaymentGateway.
    pub gateway: Arc<dyn PaymentGateway>,
    pub exports: ExportOrchestrator,
    pub prices: PriceList,
    pub poll: PollSettings,
    /// Confirmed sessions announce themselves here; the export worker listens.
    pub settlements: mpsc::UnboundedSender<SettlementEvent>,
}
