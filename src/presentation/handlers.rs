// HTTP request handlers
use crate::application::report_builder::StatsOutcome;
use crate::infrastructure::http_response::{accepts_brotli, text_response};
use crate::presentation::app_state::AppState;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use std::sync::Arc;

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Full text report, or the not-enough-data sentinel
pub async fn stats_report(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let compress = accepts_brotli(&headers);

    match state.stats_service.stats().await {
        Ok(analysis) => match text_response(analysis.outcome.to_string(), compress).await {
            Ok(response) => response,
            Err(status) => status.into_response(),
        },
        Err(e) => {
            tracing::error!("Error building stats: {:#}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Per-day table and fuel runway as JSON
pub async fn daily_overview(State(state): State<Arc<AppState>>) -> Response {
    match state.stats_service.stats().await {
        Ok(analysis) => match analysis.outcome {
            StatsOutcome::Report(report) => Json(json!({
                "status": "ok",
                "days": report.overview.days,
                "summary": report.overview.summary,
                "in_operation": analysis.in_operation,
                "issues": analysis.issues,
            }))
            .into_response(),
            StatsOutcome::NotEnoughData => Json(json!({
                "status": "not_enough_data",
                "in_operation": analysis.in_operation,
                "issues": analysis.issues,
            }))
            .into_response(),
        },
        Err(e) => {
            tracing::error!("Error building daily overview: {:#}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
