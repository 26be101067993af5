//! Axum route handlers for analysis, rendering and template selection.

use axum::{
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::{analyze, AnalysisReport};
use crate::errors::AppError;
use crate::render::{render_with, RenderMode, RenderOptions, TemplateId};
use crate::routes::documents::find_workspace;
use crate::state::AppState;
use crate::tax_id::{self, TaxIdCheck};
use crate::workspace::WorkspaceSummary;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct RenderQuery {
    pub template: Option<TemplateId>,
    pub mode: Option<RenderMode>,
    /// `html` returns the markup itself instead of the JSON envelope.
    pub format: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TemplateRequest {
    pub template: TemplateId,
}

#[derive(Debug, Serialize)]
pub struct TemplateInfo {
    pub id: TemplateId,
    pub name: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct TaxIdRequest {
    pub value: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/workspaces/:id/analysis
pub async fn handle_analysis(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AnalysisReport>, AppError> {
    let workspace = find_workspace(&state, id)?;
    let ws = workspace.lock().await;
    Ok(Json(analyze(&ws.document)))
}

/// GET /api/v1/workspaces/:id/render?template=&mode=&format=
/// Output is watermarked until the workspace has been exported.
pub async fn handle_render(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<RenderQuery>,
) -> Result<Response, AppError> {
    let workspace = find_workspace(&state, id)?;
    let ws = workspace.lock().await;

    let template = query.template.unwrap_or(ws.template);
    let mode = query.mode.unwrap_or_default();
    let options = if ws.export.is_some() {
        RenderOptions::default()
    } else {
        RenderOptions::watermarked()
    };
    let output = render_with(&ws.document, template, mode, &options);

    match query.format.as_deref() {
        None | Some("json") => Ok(Json(output).into_response()),
        Some("html") => Ok(Html(output.html).into_response()),
        Some(other) => Err(AppError::Validation(format!("unknown format '{other}'"))),
    }
}

/// PUT /api/v1/workspaces/:id/template
pub async fn handle_select_template(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<TemplateRequest>,
) -> Result<Json<WorkspaceSummary>, AppError> {
    let workspace = find_workspace(&state, id)?;
    let mut ws = workspace.lock().await;
    ws.template = body.template;
    ws.touch();
    Ok(Json(ws.summary()))
}

/// GET /api/v1/templates
pub async fn handle_list_templates() -> Json<Vec<TemplateInfo>> {
    Json(
        TemplateId::ALL
            .into_iter()
            .map(|id| TemplateInfo {
                id,
                name: id.display_name(),
            })
            .collect(),
    )
}

/// POST /api/v1/tax-id/check
pub async fn handle_check_tax_id(Json(body): Json<TaxIdRequest>) -> Json<TaxIdCheck> {
    Json(tax_id::check(&body.value))
}
