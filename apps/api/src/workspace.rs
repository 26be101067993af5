//! In-memory authoring workspaces.
//!
//! A workspace is one editing session: the document being authored, the
//! selected template, the applied coupon, the open payment session and the
//! final export, if any. Nothing here outlives the process.
//!
//! Once an order is paid (or registered free) its reference is held on the
//! workspace until an export is recorded under it, so a paid order is never
//! charged again.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::billing::{AppliedCoupon, PaymentFlow, PaymentState, PriceList, PricingQuote};
use crate::export::ExportRecord;
use crate::models::ResumeDocument;
use crate::render::TemplateId;

pub type SharedWorkspace = Arc<Mutex<Workspace>>;

pub struct Workspace {
    pub id: Uuid,
    pub document: ResumeDocument,
    pub template: TemplateId,
    pub coupon: Option<AppliedCoupon>,
    pub payment: Option<PaymentFlow>,
    /// Reference of a settled order still waiting for its export.
    pub settlement: Option<String>,
    pub export: Option<ExportRecord>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Serializable view of a workspace.
#[derive(Debug, Clone, Serialize)]
pub struct WorkspaceSummary {
    pub id: Uuid,
    pub template: TemplateId,
    pub coupon: Option<AppliedCoupon>,
    pub payment_state: Option<PaymentState>,
    pub pending_settlement: Option<String>,
    pub export: Option<ExportRecord>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Workspace {
    pub fn new(document: ResumeDocument) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            document,
            template: TemplateId::default(),
            coupon: None,
            payment: None,
            settlement: None,
            export: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn quote(&self, prices: &PriceList) -> PricingQuote {
        prices.quote(self.coupon.as_ref())
    }

    pub fn has_open_payment(&self) -> bool {
        self.payment.is_some()
    }

    /// The reference a paid order is filed under: a held settlement, or the
    /// payment id of a confirmed session.
    pub fn settled_reference(&self) -> Option<String> {
        self.settlement
            .clone()
            .or_else(|| self.payment.as_ref().and_then(PaymentFlow::settled_payment_id))
    }

    /// Discards the payment session, keeping its settlement if it confirmed.
    pub fn close_payment(&mut self) -> Option<PaymentState> {
        let flow = self.payment.take()?;
        let state = flow.state();
        if let Some(payment_id) = flow.close() {
            self.settlement = Some(payment_id);
        }
        self.touch();
        Some(state)
    }

    pub fn summary(&self) -> WorkspaceSummary {
        WorkspaceSummary {
            id: self.id,
            template: self.template,
            coupon: self.coupon.clone(),
            payment_state: self.payment.as_ref().map(PaymentFlow::state),
            pending_settlement: self.settled_reference(),
            export: self.export.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Clone, Default)]
pub struct WorkspaceStore {
    inner: Arc<RwLock<HashMap<Uuid, SharedWorkspace>>>,
}

impl WorkspaceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, document: ResumeDocument) -> (Uuid, SharedWorkspace) {
        let workspace = Workspace::new(document);
        let id = workspace.id;
        let shared = Arc::new(Mutex::new(workspace));
        self.write().insert(id, shared.clone());
        (id, shared)
    }

    pub fn get(&self, id: Uuid) -> Option<SharedWorkspace> {
        self.read().get(&id).cloned()
    }

    /// Dropping the workspace closes its payment session.
    pub fn remove(&self, id: Uuid) -> bool {
        self.write().remove(&id).is_some()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<Uuid, SharedWorkspace>> {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<Uuid, SharedWorkspace>> {
        self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::billing::Price;

    #[tokio::test]
    async fn test_create_get_remove() {
        let store = WorkspaceStore::new();
        let (id, _) = store.create(ResumeDocument::new());
        let (other, _) = store.create(ResumeDocument::new());
        assert_ne!(id, other);

        let workspace = store.get(id).unwrap();
        assert_eq!(workspace.lock().await.template, TemplateId::Modern);

        assert!(store.remove(id));
        assert!(store.get(id).is_none());
        assert!(!store.remove(id));
    }

    #[tokio::test]
    async fn test_quote_follows_applied_coupon() {
        let store = WorkspaceStore::new();
        let (_, workspace) = store.create(ResumeDocument::new());
        let mut ws = workspace.lock().await;
        let prices = PriceList::default();

        assert_eq!(ws.quote(&prices).final_price, Price::from_cents(1000));
        ws.coupon = Some(AppliedCoupon {
            code: "PROMO50".to_string(),
            discount_percent: 50.0,
        });
        assert_eq!(ws.quote(&prices).final_price, Price::from_cents(500));
        assert!(ws.summary().payment_state.is_none());
    }

    #[tokio::test]
    async fn test_closing_without_payment() {
        let store = WorkspaceStore::new();
        let (_, workspace) = store.create(ResumeDocument::new());
        let mut ws = workspace.lock().await;
        assert_eq!(ws.close_payment(), None);
        assert_eq!(ws.settled_reference(), None);

        ws.settlement = Some("pay_3".to_string());
        assert_eq!(ws.summary().pending_settlement.as_deref(), Some("pay_3"));
    }
}
