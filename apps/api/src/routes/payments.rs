//! Axum route handlers for coupons, pricing, the payment session and the
//! final export.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::billing::{
    register_free_usage, validate_coupon, CouponValidation, PayerForm, PaymentFlow,
    PaymentSession, PricingQuote,
};
use crate::errors::AppError;
use crate::export::ExportRecord;
use crate::routes::documents::find_workspace;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CouponRequest {
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct CouponResponse {
    pub validation: CouponValidation,
    pub quote: PricingQuote,
}

/// What opening a payment led to.
#[derive(Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum OpenPaymentResponse {
    /// A session is collecting the payer's details.
    Session { session: PaymentSession },
    /// Nothing to pay: the export already ran.
    Free { export: ExportRecord },
    /// The order was already paid; the export ran from that payment.
    Settled { export: ExportRecord },
}

// ────────────────────────────────────────────────────────────────────────────
// Coupon & pricing
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/workspaces/:id/coupon
/// Always answers 200; an invalid coupon clears any discount.
pub async fn handle_apply_coupon(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<CouponRequest>,
) -> Result<Json<CouponResponse>, AppError> {
    let workspace = find_workspace(&state, id)?;
    let mut ws = workspace.lock().await;
    if ws.has_open_payment() {
        return Err(AppError::Conflict(
            "close the open payment before changing the coupon".to_string(),
        ));
    }

    let validation = validate_coupon(state.gateway.as_ref(), &body.code).await;
    ws.coupon = validation.applied();
    ws.touch();
    Ok(Json(CouponResponse {
        quote: ws.quote(&state.prices),
        validation,
    }))
}

/// DELETE /api/v1/workspaces/:id/coupon
pub async fn handle_remove_coupon(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PricingQuote>, AppError> {
    let workspace = find_workspace(&state, id)?;
    let mut ws = workspace.lock().await;
    if ws.has_open_payment() {
        return Err(AppError::Conflict(
            "close the open payment before changing the coupon".to_string(),
        ));
    }
    ws.coupon = None;
    ws.touch();
    Ok(Json(ws.quote(&state.prices)))
}

/// GET /api/v1/workspaces/:id/quote
pub async fn handle_quote(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PricingQuote>, AppError> {
    let workspace = find_workspace(&state, id)?;
    let ws = workspace.lock().await;
    Ok(Json(ws.quote(&state.prices)))
}

// ────────────────────────────────────────────────────────────────────────────
// Payment session
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/workspaces/:id/payment
/// Opens a fresh session, replacing an unconfirmed one. A full discount skips
/// the session: free usage is registered and the export runs immediately. An
/// order that is already paid is exported instead of charged again.
pub async fn handle_open_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<OpenPaymentResponse>), AppError> {
    let workspace = find_workspace(&state, id)?;
    let mut ws = workspace.lock().await;

    if ws.export.is_some() {
        return Err(AppError::Conflict("this resume has already been exported".to_string()));
    }
    // an earlier session that confirmed leaves its payment id behind
    ws.close_payment();
    if let Some(reference) = ws.settled_reference() {
        info!(workspace_id = %id, %reference, "order already paid, exporting instead of charging");
        let record = state.exports.export_locked(&mut ws, &reference).await?;
        return Ok((StatusCode::OK, Json(OpenPaymentResponse::Settled { export: record })));
    }

    let quote = ws.quote(&state.prices);
    if quote.is_free() {
        let reference = register_free_usage(state.gateway.as_ref(), &quote).await?;
        let record = state.exports.export_locked(&mut ws, &reference).await?;
        return Ok((StatusCode::OK, Json(OpenPaymentResponse::Free { export: record })));
    }
    quote.ensure_chargeable()?;

    let flow = PaymentFlow::open(
        id,
        quote,
        state.gateway.clone(),
        state.poll,
        state.settlements.clone(),
    )?;
    let session = flow.snapshot();
    ws.payment = Some(flow);
    ws.touch();
    Ok((
        StatusCode::CREATED,
        Json(OpenPaymentResponse::Session { session }),
    ))
}

/// GET /api/v1/workspaces/:id/payment
pub async fn handle_get_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PaymentSession>, AppError> {
    let workspace = find_workspace(&state, id)?;
    let ws = workspace.lock().await;
    let flow = ws
        .payment
        .as_ref()
        .ok_or_else(|| AppError::NotFound("no open payment".to_string()))?;
    Ok(Json(flow.snapshot()))
}

/// POST /api/v1/workspaces/:id/payment/submit
/// Body: `{ name, email, taxId }`. The tax id may be masked or raw digits.
pub async fn handle_submit_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(form): Json<PayerForm>,
) -> Result<Json<PaymentSession>, AppError> {
    let workspace = find_workspace(&state, id)?;
    let mut ws = workspace.lock().await;
    let flow = ws
        .payment
        .as_mut()
        .ok_or_else(|| AppError::NotFound("no open payment".to_string()))?;
    let session = flow.submit(form).await?;
    Ok(Json(session))
}

/// POST /api/v1/workspaces/:id/payment/recheck
pub async fn handle_recheck_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PaymentSession>, AppError> {
    let workspace = find_workspace(&state, id)?;
    let mut ws = workspace.lock().await;
    let flow = ws
        .payment
        .as_mut()
        .ok_or_else(|| AppError::NotFound("no open payment".to_string()))?;
    Ok(Json(flow.recheck().await?))
}

/// DELETE /api/v1/workspaces/:id/payment
/// Closes the session. Before confirmation this discards it and stops polling;
/// a confirmed payment stays on the workspace until it is exported.
pub async fn handle_close_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let workspace = find_workspace(&state, id)?;
    let mut ws = workspace.lock().await;
    match ws.close_payment() {
        Some(closed) => {
            info!(workspace_id = %id, state = closed.as_str(), "payment session closed");
            Ok(StatusCode::NO_CONTENT)
        }
        None => Err(AppError::NotFound("no open payment".to_string())),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Export
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/workspaces/:id/export
/// Runs the export for a paid order whose delivery has not completed.
pub async fn handle_retry_export(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ExportRecord>, AppError> {
    let workspace = find_workspace(&state, id)?;
    let mut ws = workspace.lock().await;
    if let Some(existing) = &ws.export {
        return Ok(Json(existing.clone()));
    }
    let reference = ws
        .settled_reference()
        .ok_or_else(|| AppError::Conflict("no settled payment to export".to_string()))?;
    Ok(Json(state.exports.export_locked(&mut ws, &reference).await?))
}

/// GET /api/v1/workspaces/:id/export
pub async fn handle_get_export(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ExportRecord>, AppError> {
    let workspace = find_workspace(&state, id)?;
    let ws = workspace.lock().await;
    ws.export
        .clone()
        .map(Json)
        .ok_or_else(|| AppError::NotFound("nothing exported yet".to_string()))
}
