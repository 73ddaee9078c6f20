use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tracing::{error, info, warn};

use super::domain::CandidateSubmission;
use super::intake::IntakeGuard;
use super::publisher::{PublishError, ReportPublisher};
use super::service::CandidateReportService;
use super::store::CandidateStore;

pub const CANDIDATES_ROUTE: &str = "/api/v1/candidates";
pub const REPORTS_ROUTE: &str = "/api/v1/reports";
pub const REPORT_DOWNLOAD_ROUTE: &str = "/api/v1/reports/latest.pdf";
pub const REPORT_STATUS_ROUTE: &str = "/api/v1/reports/status";

const REPORT_FILENAME: &str = "report.pdf";

/// Router builder exposing candidate intake and report endpoints.
///
/// Store, render, and publish calls run on the blocking pool.
pub fn candidate_router<S, P>(service: Arc<CandidateReportService<S, P>>) -> Router
where
    S: CandidateStore + 'static,
    P: ReportPublisher + 'static,
{
    Router::new()
        .route(CANDIDATES_ROUTE, post(submit_handler::<S, P>))
        .route(REPORTS_ROUTE, post(generate_handler::<S, P>))
        .route(REPORT_DOWNLOAD_ROUTE, get(download_handler::<S, P>))
        .route(REPORT_STATUS_ROUTE, get(status_handler::<S, P>))
        .with_state(service)
}

pub(crate) async fn submit_handler<S, P>(
    State(service): State<Arc<CandidateReportService<S, P>>>,
    Json(submission): Json<CandidateSubmission>,
) -> Response
where
    S: CandidateStore + 'static,
    P: ReportPublisher + 'static,
{
    let record = match IntakeGuard.admit(submission) {
        Ok(record) => record,
        Err(rejection) => {
            warn!(%rejection, "candidate submission rejected");
            let payload = json!({ "errors": rejection.views() });
            return (StatusCode::BAD_REQUEST, Json(payload)).into_response();
        }
    };

    match tokio::task::spawn_blocking(move || service.add_candidate(record)).await {
        Ok(Ok(())) => {
            let payload = json!({ "message": "candidate created" });
            (StatusCode::CREATED, Json(payload)).into_response()
        }
        Ok(Err(err)) => {
            error!(error = %err, "failed to store candidate");
            internal_error()
        }
        Err(err) => {
            error!(error = %err, "candidate append task failed");
            internal_error()
        }
    }
}

pub(crate) async fn generate_handler<S, P>(
    State(service): State<Arc<CandidateReportService<S, P>>>,
) -> Response
where
    S: CandidateStore + 'static,
    P: ReportPublisher + 'static,
{
    match tokio::task::spawn_blocking(move || service.generate_report()).await {
        Ok(Ok(report)) => {
            info!(
                candidates = report.candidate_count,
                pages = report.page_count,
                flagged = report.flagged_count,
                "report published"
            );
            let payload = json!({
                "message": "report generated",
                "pdf_url": report.location,
                "candidate_count": report.candidate_count,
                "page_count": report.page_count,
                "flagged_count": report.flagged_count,
                "published_at": report.published_at,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Ok(Err(err)) => {
            error!(error = %err, "report generation failed");
            internal_error()
        }
        Err(err) => {
            error!(error = %err, "report generation task failed");
            internal_error()
        }
    }
}

pub(crate) async fn download_handler<S, P>(
    State(service): State<Arc<CandidateReportService<S, P>>>,
) -> Response
where
    S: CandidateStore + 'static,
    P: ReportPublisher + 'static,
{
    match tokio::task::spawn_blocking(move || service.fetch_report()).await {
        Ok(Ok(bytes)) => {
            let content_type = mime::APPLICATION_PDF;
            let disposition = format!("attachment; filename=\"{REPORT_FILENAME}\"");
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, content_type.to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                bytes,
            )
                .into_response()
        }
        Ok(Err(PublishError::NotFound)) => {
            let payload = json!({ "error": "report not found" });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
        Ok(Err(PublishError::Pending)) => {
            let payload = json!({ "error": "report generation in progress" });
            (StatusCode::SERVICE_UNAVAILABLE, Json(payload)).into_response()
        }
        Ok(Err(err)) => {
            error!(error = %err, "failed to read published report");
            internal_error()
        }
        Err(err) => {
            error!(error = %err, "report download task failed");
            internal_error()
        }
    }
}

pub(crate) async fn status_handler<S, P>(
    State(service): State<Arc<CandidateReportService<S, P>>>,
) -> Response
where
    S: CandidateStore + 'static,
    P: ReportPublisher + 'static,
{
    (StatusCode::OK, Json(service.report_status())).into_response()
}

fn internal_error() -> Response {
    let payload = json!({ "error": "internal server error" });
    (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
}
