use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};

use axum::response::Response;
use lopdf::content::Content;
use serde_json::Value;

use crate::candidates::domain::CandidateRecord;
use crate::candidates::eligibility::EligibilityPolicy;
use crate::candidates::publisher::{
    MemoryReportPublisher, PublishError, PublishedReport, ReportPublisher,
};
use crate::candidates::report::RenderedReport;
use crate::candidates::router::{candidate_router, REPORT_DOWNLOAD_ROUTE};
use crate::candidates::service::CandidateReportService;
use crate::candidates::store::{CandidateStore, MemoryCandidateStore, StoreError};

pub(super) fn record(name: &str, institution: &str, average: f64) -> CandidateRecord {
    CandidateRecord::new(
        name,
        format!("{}@example.com", name.to_lowercase()),
        institution,
        "Ingeniería de Software",
        average,
    )
}

/// Ana qualifies; Bo's institution is not allow-listed; Cy sits exactly on the threshold.
pub(super) fn sample_records() -> Vec<CandidateRecord> {
    vec![
        record("Ana", "Universidad A", 8.0),
        record("Bo", "Universidad C", 9.0),
        record("Cy", "Universidad B", 7.5),
    ]
}

pub(super) type MemoryService = CandidateReportService<MemoryCandidateStore, MemoryReportPublisher>;

pub(super) fn build_service(
    records: Vec<CandidateRecord>,
) -> (
    MemoryService,
    Arc<MemoryCandidateStore>,
    Arc<MemoryReportPublisher>,
) {
    let store = Arc::new(MemoryCandidateStore::with_records(records));
    let publisher = Arc::new(MemoryReportPublisher::new(REPORT_DOWNLOAD_ROUTE));
    let service = CandidateReportService::new(
        store.clone(),
        publisher.clone(),
        EligibilityPolicy::default(),
    );
    (service, store, publisher)
}

pub(super) fn router_with_records(records: Vec<CandidateRecord>) -> axum::Router {
    let (service, _, _) = build_service(records);
    candidate_router(Arc::new(service))
}

pub(super) struct UnavailableStore;

impl CandidateStore for UnavailableStore {
    fn append(&self, _record: CandidateRecord) -> Result<(), StoreError> {
        Err(StoreError::WriteFailure {
            path: "offline.json".into(),
            source: io::Error::new(io::ErrorKind::Other, "disk offline"),
        })
    }

    fn read_all(&self) -> Result<Vec<CandidateRecord>, StoreError> {
        Err(StoreError::ReadFailure {
            path: "offline.json".into(),
            source: io::Error::new(io::ErrorKind::Other, "disk offline"),
        })
    }
}

pub(super) struct RejectingPublisher;

impl ReportPublisher for RejectingPublisher {
    fn publish(&self, _report: &RenderedReport) -> Result<PublishedReport, PublishError> {
        Err(PublishError::WriteFailure {
            path: "reports/report.pdf".into(),
            source: io::Error::new(io::ErrorKind::Other, "volume full"),
        })
    }

    fn fetch(&self) -> Result<Vec<u8>, PublishError> {
        Err(PublishError::NotFound)
    }
}

/// Store that parks inside `read_all` until the test releases it, so a generation can be
/// observed mid-flight.
pub(super) struct GatedStore {
    pub(super) entered: Barrier,
    pub(super) release: Barrier,
    records: Vec<CandidateRecord>,
}

impl GatedStore {
    pub(super) fn new(records: Vec<CandidateRecord>) -> Self {
        Self {
            entered: Barrier::new(2),
            release: Barrier::new(2),
            records,
        }
    }
}

impl CandidateStore for GatedStore {
    fn append(&self, _record: CandidateRecord) -> Result<(), StoreError> {
        Ok(())
    }

    fn read_all(&self) -> Result<Vec<CandidateRecord>, StoreError> {
        self.entered.wait();
        self.release.wait();
        Ok(self.records.clone())
    }
}

/// Store whose n-th `read_all` call parks on its own pair of gates; calls listed in `failing`
/// return a read failure once released.
pub(super) struct SequencedStore {
    pub(super) gates: Vec<(Barrier, Barrier)>,
    failing: Vec<usize>,
    calls: AtomicUsize,
    records: Vec<CandidateRecord>,
}

impl SequencedStore {
    pub(super) fn new(records: Vec<CandidateRecord>, calls: usize, failing: Vec<usize>) -> Self {
        Self {
            gates: (0..calls)
                .map(|_| (Barrier::new(2), Barrier::new(2)))
                .collect(),
            failing,
            calls: AtomicUsize::new(0),
            records,
        }
    }
}

impl CandidateStore for SequencedStore {
    fn append(&self, _record: CandidateRecord) -> Result<(), StoreError> {
        Ok(())
    }

    fn read_all(&self) -> Result<Vec<CandidateRecord>, StoreError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let (entered, release) = &self.gates[call];
        entered.wait();
        release.wait();
        if self.failing.contains(&call) {
            return Err(StoreError::ReadFailure {
                path: "sequenced.json".into(),
                source: io::Error::new(io::ErrorKind::Other, "read interrupted"),
            });
        }
        Ok(self.records.clone())
    }
}

/// Text operands of every `Tj` operator, page by page, decoded as Latin-1.
pub(super) fn pdf_text_lines(bytes: &[u8]) -> Vec<String> {
    let document = lopdf::Document::load_mem(bytes).expect("valid pdf");
    let mut lines = Vec::new();
    for (_, page_id) in document.get_pages() {
        let raw = document.get_page_content(page_id).expect("page content");
        let content = Content::decode(&raw).expect("decodable content stream");
        for operation in content.operations {
            if operation.operator != "Tj" {
                continue;
            }
            if let Some(lopdf::Object::String(text, _)) = operation.operands.first() {
                lines.push(text.iter().map(|&byte| byte as char).collect());
            }
        }
    }
    lines
}

pub(super) fn pdf_page_count(bytes: &[u8]) -> usize {
    lopdf::Document::load_mem(bytes)
        .expect("valid pdf")
        .get_pages()
        .len()
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
