//! REST routes for settlement tooling

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use lapshare_common::{LapshareError, RecordId, Vnd, VERSION};
use lapshare_settlement::{
    validate_before_submit, SettlementField, SettlementFigures, SettlementService,
};
use prometheus::{Encoder, Registry, TextEncoder};
use serde::Deserialize;
use serde_json::json;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::error::ApiError;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<SettlementService>,
    pub registry: Registry,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PreviewRequest {
    damage_fee: Vnd,
    held_amount: Vnd,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReviseRequest {
    current: SettlementFigures,
    edited_field: SettlementField,
    new_value: i64,
    damage_fee: Vnd,
    held_amount: Vnd,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ValidateRequest {
    figures: SettlementFigures,
    damage_fee: Vnd,
    held_amount: Vnd,
}

/// Create REST API routes
pub fn create_router(state: AppState) -> Router {
    // CORS layer to allow staff tooling from any origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]);

    Router::new()
        .route("/health", get(|| async { Json(json!({"status": "healthy"})) }))
        .route("/metrics", get(metrics))
        .route(
            "/api/v1/version",
            get(|| async {
                Json(json!({
                    "service": "lapshare-api",
                    "version": VERSION,
                    "description": "Deposit, damage, and compensation settlement",
                }))
            }),
        )
        .route("/api/v1/settlements/preview", post(preview))
        .route("/api/v1/settlements/revise", post(revise))
        .route("/api/v1/settlements/validate", post(validate))
        .route(
            "/api/v1/reports/:report_id/settlement",
            get(prepare).post(submit),
        )
        .route("/api/v1/reports/:report_id/settlement/state", get(settlement_state))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn metrics(State(state): State<AppState>) -> Result<String, ApiError> {
    let mut buffer = Vec::new();
    TextEncoder::new()
        .encode(&state.registry.gather(), &mut buffer)
        .map_err(|e| LapshareError::Internal(e.to_string()))?;
    String::from_utf8(buffer)
        .map_err(|e| LapshareError::Internal(e.to_string()).into())
}

async fn preview(
    State(state): State<AppState>,
    Json(req): Json<PreviewRequest>,
) -> impl IntoResponse {
    Json(state.service.preview(req.damage_fee, req.held_amount))
}

async fn revise(
    State(state): State<AppState>,
    Json(req): Json<ReviseRequest>,
) -> impl IntoResponse {
    Json(state.service.revise(
        &req.current,
        req.edited_field,
        req.new_value,
        req.damage_fee,
        req.held_amount,
    ))
}

async fn validate(Json(req): Json<ValidateRequest>) -> Result<impl IntoResponse, ApiError> {
    validate_before_submit(&req.figures, req.damage_fee, req.held_amount)
        .map_err(|e| ApiError(e.into()))?;
    Ok(Json(json!({"valid": true})))
}

async fn prepare(
    State(state): State<AppState>,
    Path(report_id): Path<RecordId>,
) -> Result<impl IntoResponse, ApiError> {
    let context = state.service.prepare(report_id).await?;
    Ok(Json(context))
}

async fn settlement_state(
    State(state): State<AppState>,
    Path(report_id): Path<RecordId>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.service.state(report_id).await?))
}

async fn submit(
    State(state): State<AppState>,
    Path(report_id): Path<RecordId>,
    Json(figures): Json<SettlementFigures>,
) -> Result<impl IntoResponse, ApiError> {
    let transaction = state.service.submit(report_id, figures).await?;
    Ok((StatusCode::CREATED, Json(transaction)))
}
