//! Axum route handlers for workspaces and document authoring.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{Entry, EntryKind, EntryPatch, PersonalField, ResumeDocument};
use crate::state::AppState;
use crate::workspace::{SharedWorkspace, WorkspaceSummary};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct WorkspaceResponse {
    pub workspace: WorkspaceSummary,
    pub document: ResumeDocument,
}

#[derive(Debug, Serialize)]
pub struct EntryCreatedResponse {
    pub kind: EntryKind,
    pub id: String,
    pub ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    pub to: usize,
}

#[derive(Debug, Deserialize)]
pub struct SkillRequest {
    pub skill: String,
}

#[derive(Debug, Serialize)]
pub struct SkillsResponse {
    pub added: Option<bool>,
    pub removed: Option<String>,
    pub skills: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct TechnologyRequest {
    pub technology: String,
}

#[derive(Debug, Serialize)]
pub struct TechnologiesResponse {
    pub technologies: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

pub(crate) fn find_workspace(state: &AppState, id: Uuid) -> Result<SharedWorkspace, AppError> {
    state
        .workspaces
        .get(id)
        .ok_or_else(|| AppError::NotFound(format!("workspace {id} not found")))
}

fn parse_kind(raw: &str) -> Result<EntryKind, AppError> {
    raw.parse().map_err(AppError::Validation)
}

fn parse_document(body: &[u8]) -> Result<ResumeDocument, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ResumeDocument::new());
    }
    let raw = std::str::from_utf8(body)
        .map_err(|_| AppError::Validation("document must be UTF-8 JSON".to_string()))?;
    Ok(ResumeDocument::from_json(raw)?)
}

// ────────────────────────────────────────────────────────────────────────────
// Workspaces
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/workspaces
/// Optional body: a resume document to start from.
pub async fn handle_create_workspace(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<WorkspaceResponse>), AppError> {
    let document = parse_document(&body)?;
    let (id, workspace) = state.workspaces.create(document);
    info!(workspace_id = %id, "workspace created");

    let ws = workspace.lock().await;
    Ok((
        StatusCode::CREATED,
        Json(WorkspaceResponse {
            workspace: ws.summary(),
            document: ws.document.clone(),
        }),
    ))
}

/// GET /api/v1/workspaces/:id
pub async fn handle_get_workspace(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<WorkspaceResponse>, AppError> {
    let workspace = find_workspace(&state, id)?;
    let ws = workspace.lock().await;
    Ok(Json(WorkspaceResponse {
        workspace: ws.summary(),
        document: ws.document.clone(),
    }))
}

/// DELETE /api/v1/workspaces/:id
/// Discards the workspace along with any open payment session.
pub async fn handle_delete_workspace(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.workspaces.remove(id) {
        info!(workspace_id = %id, "workspace deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("workspace {id} not found")))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Whole-document operations
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/workspaces/:id/document
/// Pretty-printed schema JSON, accepted back as-is by the import.
pub async fn handle_get_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let workspace = find_workspace(&state, id)?;
    let ws = workspace.lock().await;
    let body = ws.document.to_json()?;
    Ok(([(header::CONTENT_TYPE, "application/json")], body))
}

/// PUT /api/v1/workspaces/:id/document
/// Replaces the document wholesale. Missing keys default to empty.
pub async fn handle_import_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Bytes,
) -> Result<Json<ResumeDocument>, AppError> {
    let document = parse_document(&body)?;
    let workspace = find_workspace(&state, id)?;
    let mut ws = workspace.lock().await;
    ws.document.replace(document);
    ws.touch();
    Ok(Json(ws.document.clone()))
}

/// POST /api/v1/workspaces/:id/document/reset
pub async fn handle_reset_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ResumeDocument>, AppError> {
    let workspace = find_workspace(&state, id)?;
    let mut ws = workspace.lock().await;
    ws.document.reset();
    ws.touch();
    Ok(Json(ws.document.clone()))
}

/// PATCH /api/v1/workspaces/:id/personal
/// Body: `{ "<field>": "<value>", ... }` with camelCase field names.
pub async fn handle_update_personal(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(fields): Json<Map<String, Value>>,
) -> Result<Json<ResumeDocument>, AppError> {
    let mut updates = Vec::with_capacity(fields.len());
    for (key, value) in fields {
        let field: PersonalField = serde_json::from_value(Value::String(key.clone()))
            .map_err(|_| AppError::Validation(format!("unknown personal field '{key}'")))?;
        let value = match value {
            Value::String(s) => s,
            Value::Null => String::new(),
            other => {
                return Err(AppError::Validation(format!(
                    "personal field '{key}' must be a string, got {other}"
                )))
            }
        };
        updates.push((field, value));
    }

    let workspace = find_workspace(&state, id)?;
    let mut ws = workspace.lock().await;
    for (field, value) in updates {
        ws.document.set_personal_field(field, value);
    }
    ws.touch();
    Ok(Json(ws.document.clone()))
}

// ────────────────────────────────────────────────────────────────────────────
// Collection entries
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/workspaces/:id/entries
/// Body: an entry tagged with `kind`; `{ "kind": "project" }` adds a blank one.
pub async fn handle_add_entry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(entry): Json<Entry>,
) -> Result<(StatusCode, Json<EntryCreatedResponse>), AppError> {
    let kind = entry.kind();
    let workspace = find_workspace(&state, id)?;
    let mut ws = workspace.lock().await;
    let entry_id = ws.document.add_entry(entry);
    ws.touch();
    Ok((
        StatusCode::CREATED,
        Json(EntryCreatedResponse {
            kind,
            id: entry_id,
            ids: ws.document.entry_ids(kind).into_iter().map(str::to_string).collect(),
        }),
    ))
}

/// PATCH /api/v1/workspaces/:id/entries/:kind/:entry_id
/// Body: the fields to change; absent fields stay as they are.
pub async fn handle_update_entry(
    State(state): State<AppState>,
    Path((id, kind, entry_id)): Path<(Uuid, String, String)>,
    Json(mut fields): Json<Map<String, Value>>,
) -> Result<Json<ResumeDocument>, AppError> {
    let kind = parse_kind(&kind)?;
    fields.insert("kind".to_string(), Value::String(kind.as_str().to_string()));
    let patch: EntryPatch = serde_json::from_value(Value::Object(fields))
        .map_err(|e| AppError::Validation(format!("invalid {kind} update: {e}")))?;

    let workspace = find_workspace(&state, id)?;
    let mut ws = workspace.lock().await;
    ws.document.update_entry(&entry_id, patch)?;
    ws.touch();
    Ok(Json(ws.document.clone()))
}

/// DELETE /api/v1/workspaces/:id/entries/:kind/:entry_id
pub async fn handle_remove_entry(
    State(state): State<AppState>,
    Path((id, kind, entry_id)): Path<(Uuid, String, String)>,
) -> Result<Json<Entry>, AppError> {
    let kind = parse_kind(&kind)?;
    let workspace = find_workspace(&state, id)?;
    let mut ws = workspace.lock().await;
    let removed = ws.document.remove_entry(kind, &entry_id)?;
    ws.touch();
    Ok(Json(removed))
}

/// POST /api/v1/workspaces/:id/entries/:kind/:entry_id/move
pub async fn handle_move_entry(
    State(state): State<AppState>,
    Path((id, kind, entry_id)): Path<(Uuid, String, String)>,
    Json(body): Json<MoveRequest>,
) -> Result<Json<Vec<String>>, AppError> {
    let kind = parse_kind(&kind)?;
    let workspace = find_workspace(&state, id)?;
    let mut ws = workspace.lock().await;
    ws.document.move_entry(kind, &entry_id, body.to)?;
    ws.touch();
    Ok(Json(
        ws.document.entry_ids(kind).into_iter().map(str::to_string).collect(),
    ))
}

/// POST /api/v1/workspaces/:id/projects/:entry_id/technologies
pub async fn handle_add_technology(
    State(state): State<AppState>,
    Path((id, entry_id)): Path<(Uuid, String)>,
    Json(body): Json<TechnologyRequest>,
) -> Result<Json<TechnologiesResponse>, AppError> {
    let workspace = find_workspace(&state, id)?;
    let mut ws = workspace.lock().await;
    ws.document.add_technology(&entry_id, &body.technology)?;
    ws.touch();
    Ok(Json(technologies_of(&ws.document, &entry_id)))
}

/// DELETE /api/v1/workspaces/:id/projects/:entry_id/technologies/:technology
pub async fn handle_remove_technology(
    State(state): State<AppState>,
    Path((id, entry_id, technology)): Path<(Uuid, String, String)>,
) -> Result<Json<TechnologiesResponse>, AppError> {
    let workspace = find_workspace(&state, id)?;
    let mut ws = workspace.lock().await;
    ws.document.remove_technology(&entry_id, &technology)?;
    ws.touch();
    Ok(Json(technologies_of(&ws.document, &entry_id)))
}

fn technologies_of(document: &ResumeDocument, project_id: &str) -> TechnologiesResponse {
    TechnologiesResponse {
        technologies: document
            .projects
            .iter()
            .find(|p| p.id == project_id)
            .map(|p| p.technologies.clone())
            .unwrap_or_default(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Skills
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/workspaces/:id/skills
pub async fn handle_add_skill(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<SkillRequest>,
) -> Result<Json<SkillsResponse>, AppError> {
    let workspace = find_workspace(&state, id)?;
    let mut ws = workspace.lock().await;
    let added = ws.document.add_skill(&body.skill)?;
    ws.touch();
    Ok(Json(SkillsResponse {
        added: Some(added),
        removed: None,
        skills: ws.document.skills.clone(),
    }))
}

/// DELETE /api/v1/workspaces/:id/skills/:index
pub async fn handle_remove_skill(
    State(state): State<AppState>,
    Path((id, index)): Path<(Uuid, usize)>,
) -> Result<Json<SkillsResponse>, AppError> {
    let workspace = find_workspace(&state, id)?;
    let mut ws = workspace.lock().await;
    let removed = ws.document.remove_skill(index)?;
    ws.touch();
    Ok(Json(SkillsResponse {
        added: None,
        removed: Some(removed),
        skills: ws.document.skills.clone(),
    }))
}
