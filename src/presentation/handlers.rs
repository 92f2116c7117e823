// HTTP request handlers
use crate::infrastructure::http_response::{ApiEnvelope, ApiError, ApiResult};
use crate::presentation::app_state::AppState;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub waterjet_id: Option<String>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(api_info))
        .route("/api/waterjets", get(list_waterjets))
        .route("/api/waterjets/:id/dates", get(list_dates))
        .route("/api/dashboard/current", get(current_dashboard))
        .route("/api/dashboard/history", get(history_dashboard))
        .route("/api/health", get(health_check))
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Service description and endpoint map
pub async fn api_info() -> Json<Value> {
    Json(json!({
        "message": "Waterjet fault prediction API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "current_data": "/api/dashboard/current",
            "history_data": "/api/dashboard/history?start_date=YYYY-MM-DD&end_date=YYYY-MM-DD&waterjet_id=xxx",
            "waterjets": "/api/waterjets",
            "dates": "/api/waterjets/{id}/dates",
            "health": "/api/health"
        },
        "status": "running",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

pub async fn list_waterjets(State(state): State<Arc<AppState>>) -> ApiResult<Json<ApiEnvelope<Vec<String>>>> {
    let ids = state.waterjet_service.list_waterjet_ids().await?;
    Ok(Json(ApiEnvelope::ok(ids)))
}

/// Recent dates for a waterjet, newest first
pub async fn list_dates(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Json<ApiEnvelope<Vec<String>>> {
    tracing::debug!("Listing dates for {}", id);
    Json(ApiEnvelope::ok(state.waterjet_service.available_dates(Utc::now())))
}

pub async fn current_dashboard(State(state): State<Arc<AppState>>) -> ApiResult<Json<Value>> {
    let readings = state.current_readings.snapshot().await;
    let payload = state.dashboard_service.get_current(readings).await?;

    Ok(Json(json!({
        "success": true,
        "data": payload,
        "timestamp": Utc::now().to_rfc3339(),
    })))
}

pub async fn history_dashboard(
    Query(query): Query<HistoryQuery>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Value>> {
    let start_raw = query
        .start_date
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::BadRequest("start_date is required".to_string()))?;
    let start_date = parse_date("start_date", start_raw)?;
    let end_date = match query.end_date.as_deref().filter(|s| !s.is_empty()) {
        Some(raw) => parse_date("end_date", raw)?,
        None => state.dashboard_service.today(),
    };
    if end_date < start_date {
        return Err(ApiError::BadRequest(format!(
            "end_date {} is before start_date {}",
            end_date, start_date
        )));
    }
    let waterjet_id = query.waterjet_id.as_deref().filter(|s| !s.is_empty());

    let payload = state
        .dashboard_service
        .get_history(start_date, end_date, waterjet_id)
        .await?;

    Ok(Json(json!({
        "success": true,
        "data": payload,
        "query_params": {
            "start_date": query.start_date,
            "end_date": query.end_date,
            "waterjet_id": query.waterjet_id,
        }
    })))
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "success": true,
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "data_count": state.current_readings.len().await,
    }))
}

fn parse_date(name: &str, raw: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| ApiError::BadRequest(format!("{} must be YYYY-MM-DD, got {:?}", name, raw)))
}
