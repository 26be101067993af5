//! Export orchestration.
//!
//! Runs once a payment is settled (or the order is free): renders the
//! workspace's document in export mode with the selected template and no
//! watermark, hands the artifact to an `ExportSink`, and records the result on
//! the workspace, discarding the settled payment session. Repeated settlement
//! signals for an exported workspace return the existing record.
//!
//! The payment reference is held on the workspace before delivery starts. A
//! failed delivery leaves it there, and the export can be retried from it
//! without charging again.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::billing::SettlementEvent;
use crate::render::{render, RenderMode, SectionId, TemplateId};
use crate::workspace::{Workspace, WorkspaceStore};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("workspace {0} not found")]
    WorkspaceNotFound(Uuid),

    #[error("failed to write export: {0}")]
    Io(#[from] std::io::Error),
}

/// A rendered, watermark-free document ready to be delivered.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub workspace_id: Uuid,
    pub template: TemplateId,
    pub payment_reference: String,
    pub html: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRecord {
    pub payment_reference: String,
    pub template: TemplateId,
    pub sections: Vec<SectionId>,
    /// Where the sink put the artifact.
    pub location: String,
    pub bytes: usize,
    pub exported_at: DateTime<Utc>,
}

#[async_trait]
pub trait ExportSink: Send + Sync {
    async fn deliver(&self, artifact: &ExportArtifact) -> Result<String, ExportError>;
}

/// Writes `<root>/<workspace>/<template>-<reference>.html`.
pub struct FsExportSink {
    root: PathBuf,
}

impl FsExportSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

fn file_safe(reference: &str) -> String {
    reference
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

#[async_trait]
impl ExportSink for FsExportSink {
    async fn deliver(&self, artifact: &ExportArtifact) -> Result<String, ExportError> {
        let dir = self.root.join(artifact.workspace_id.to_string());
        tokio::fs::create_dir_all(&dir).await?;
        let path = dir.join(format!(
            "{}-{}.html",
            artifact.template.as_str(),
            file_safe(&artifact.payment_reference)
        ));
        tokio::fs::write(&path, artifact.html.as_bytes()).await?;
        debug!(path = %path.display(), "export written");
        Ok(path.display().to_string())
    }
}

#[derive(Clone)]
pub struct ExportOrchestrator {
    store: WorkspaceStore,
    sink: std::sync::Arc<dyn ExportSink>,
}

impl ExportOrchestrator {
    pub fn new(store: WorkspaceStore, sink: std::sync::Arc<dyn ExportSink>) -> Self {
        Self { store, sink }
    }

    pub async fn export(
        &self,
        workspace_id: Uuid,
        payment_reference: &str,
    ) -> Result<ExportRecord, ExportError> {
        let workspace = self
            .store
            .get(workspace_id)
            .ok_or(ExportError::WorkspaceNotFound(workspace_id))?;
        let mut ws = workspace.lock().await;
        self.export_locked(&mut ws, payment_reference).await
    }

    /// Exports for a settlement signal. Signals for a payment the workspace
    /// no longer holds are dropped.
    pub async fn export_settled(
        &self,
        event: &SettlementEvent,
    ) -> Result<Option<ExportRecord>, ExportError> {
        let workspace = self
            .store
            .get(event.workspace_id)
            .ok_or(ExportError::WorkspaceNotFound(event.workspace_id))?;
        let mut ws = workspace.lock().await;
        if ws.export.is_none()
            && ws.settled_reference().as_deref() != Some(event.payment_id.as_str())
        {
            warn!(
                workspace_id = %event.workspace_id,
                session_id = %event.session_id,
                payment_id = %event.payment_id,
                "ignoring settlement for a discarded session"
            );
            return Ok(None);
        }
        self.export_locked(&mut ws, &event.payment_id).await.map(Some)
    }

    /// Same as `export` for a caller already holding the workspace lock.
    pub async fn export_locked(
        &self,
        ws: &mut Workspace,
        payment_reference: &str,
    ) -> Result<ExportRecord, ExportError> {
        let workspace_id = ws.id;
        if let Some(existing) = &ws.export {
            debug!(%workspace_id, %payment_reference, "workspace already exported");
            return Ok(existing.clone());
        }

        ws.settlement = Some(payment_reference.to_string());
        let output = render(&ws.document, ws.template, RenderMode::Export);
        let artifact = ExportArtifact {
            workspace_id,
            template: ws.template,
            payment_reference: payment_reference.to_string(),
            html: output.html,
        };
        let location = self.sink.deliver(&artifact).await?;

        let record = ExportRecord {
            payment_reference: artifact.payment_reference,
            template: artifact.template,
            sections: output.sections,
            location,
            bytes: artifact.html.len(),
            exported_at: Utc::now(),
        };
        info!(%workspace_id, template = %record.template, location = %record.location, "export completed");
        ws.export = Some(record.clone());
        // the settled session has served its purpose
        ws.settlement = None;
        ws.payment = None;
        ws.touch();
        Ok(record)
    }
}

/// Consumes settlement events until every sender is gone.
pub fn spawn_export_worker(
    orchestrator: ExportOrchestrator,
    mut events: mpsc::UnboundedReceiver<SettlementEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            if let Err(e) = orchestrator.export_settled(&event).await {
                error!(
                    workspace_id = %event.workspace_id,
                    payment_id = %event.payment_id,
                    "export after settlement failed, reference kept for retry: {e}"
                );
            }
        }
        debug!("export worker stopped");
    })
}
