//! End-to-end behavior of the file-backed pipeline: intake over HTTP into a JSON store, report
//! generation, and download of the published PDF.

mod common {
    use std::path::Path;
    use std::sync::Arc;

    use candidate_report::candidates::router::REPORT_DOWNLOAD_ROUTE;
    use candidate_report::candidates::{
        CandidateReportService, EligibilityPolicy, FileReportPublisher, JsonFileStore,
    };

    pub(super) type FileService = CandidateReportService<JsonFileStore, FileReportPublisher>;

    pub(super) fn file_service(root: &Path) -> Arc<FileService> {
        let store = JsonFileStore::new(root.join("data").join("candidates.json"));
        store.initialize().expect("initialize store");
        let publisher =
            FileReportPublisher::new(root.join("reports").join("report.pdf"), REPORT_DOWNLOAD_ROUTE);
        Arc::new(CandidateReportService::new(
            Arc::new(store),
            Arc::new(publisher),
            EligibilityPolicy::default(),
        ))
    }

    pub(super) fn page_text(bytes: &[u8]) -> Vec<String> {
        let document = lopdf::Document::load_mem(bytes).expect("valid pdf");
        let mut lines = Vec::new();
        for (_, page_id) in document.get_pages() {
            let raw = document.get_page_content(page_id).expect("content");
            let content = lopdf::content::Content::decode(&raw).expect("decode");
            lines.extend(content.operations.into_iter().filter_map(|operation| {
                match (operation.operator.as_str(), operation.operands.first()) {
                    ("Tj", Some(lopdf::Object::String(text, _))) => {
                        Some(text.iter().map(|&byte| byte as char).collect())
                    }
                    _ => None,
                }
            }));
        }
        lines
    }
}

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use candidate_report::candidates::router::{
    CANDIDATES_ROUTE, REPORTS_ROUTE, REPORT_DOWNLOAD_ROUTE,
};
use candidate_report::candidates::{candidate_router, import, CandidateStore, JsonFileStore};
use common::*;

fn submission(name: &str, institution: &str, average: f64) -> Request<Body> {
    let payload = json!({
        "name": name,
        "email": format!("{}@example.com", name.to_lowercase()),
        "institution": institution,
        "program": "Ingeniería Civil",
        "average": average,
    });
    Request::post(CANDIDATES_ROUTE)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&payload).expect("payload")))
        .expect("request")
}

#[tokio::test]
async fn submitted_candidates_flow_into_downloaded_report() {
    let dir = tempfile::tempdir().expect("temp dir");
    let service = file_service(dir.path());
    let router = candidate_router(service.clone());

    for (name, institution, average) in [
        ("Ana", "Universidad A", 8.0),
        ("Bo", "Universidad C", 9.0),
        ("Cy", "Universidad B", 7.5),
    ] {
        let response = router
            .clone()
            .oneshot(submission(name, institution, average))
            .await
            .expect("submit");
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let persisted = JsonFileStore::new(dir.path().join("data").join("candidates.json"))
        .read_all()
        .expect("persisted candidates");
    let names: Vec<&str> = persisted.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Ana", "Bo", "Cy"]);

    let generated = router
        .clone()
        .oneshot(
            Request::post(REPORTS_ROUTE)
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("generate");
    assert_eq!(generated.status(), StatusCode::OK);
    assert!(dir.path().join("reports").join("report.pdf").exists());

    let download = router
        .oneshot(
            Request::get(REPORT_DOWNLOAD_ROUTE)
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("download");
    assert_eq!(download.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(download.into_body(), usize::MAX)
        .await
        .expect("body");

    let lines = page_text(&bytes);
    assert_eq!(
        lines,
        vec![
            "Name: Ana",
            "Email: ana@example.com",
            "Institution: Universidad A",
            "Program: Ingeniería Civil",
            "Average: 8",
            "---",
        ]
    );
}

#[test]
fn imported_rows_are_appended_after_existing_candidates() {
    let dir = tempfile::tempdir().expect("temp dir");
    let service = file_service(dir.path());
    service
        .add_candidate(candidate_report::candidates::CandidateRecord::new(
            "Ana",
            "ana@example.com",
            "Universidad A",
            "Física",
            8.0,
        ))
        .expect("seed candidate");

    let csv = "\
name,email,institution,program,average,skills
Dee,dee@example.com,Universidad B,Química,9.4,Python;R
";
    for record in import::records_from_reader(csv.as_bytes()).expect("import") {
        service.add_candidate(record).expect("append imported");
    }

    let report = service.generate_report().expect("generate");
    assert_eq!(report.candidate_count, 2);

    let lines = page_text(&service.fetch_report().expect("fetch"));
    assert_eq!(lines[0], "Name: Ana");
    assert_eq!(lines[6], "Name: Dee");
    assert_eq!(lines[11], "Skills: Python, R");
}
