use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json};
use candidate_report::candidates::{
    candidate_router, CandidateReportService, CandidateStore, ReportPublisher,
};
use serde_json::json;
use std::sync::atomic::Ordering;
use std::sync::Arc;

const WELCOME: &str = "Candidate report service. POST /api/v1/candidates to register a candidate, \
POST /api/v1/reports to build the shortlist, GET /api/v1/reports/latest.pdf to download it.";

/// Candidate endpoints plus the operational routes every deployment exposes.
pub(crate) fn with_operational_routes<S, P>(
    service: Arc<CandidateReportService<S, P>>,
) -> axum::Router
where
    S: CandidateStore + 'static,
    P: ReportPublisher + 'static,
{
    candidate_router(service)
        .route("/", get(welcome))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn welcome() -> &'static str {
    WELCOME
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    if state.readiness.load(Ordering::Relaxed) {
        (StatusCode::OK, Json(json!({ "status": "ready" })))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "initializing" })),
        )
    }
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
