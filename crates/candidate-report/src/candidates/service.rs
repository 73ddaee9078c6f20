use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;

use super::domain::CandidateRecord;
use super::eligibility::EligibilityPolicy;
use super::publisher::{PublishError, PublishedReport, ReportPublisher};
use super::report::{RenderError, ReportRenderer};
use super::store::{CandidateStore, StoreError};

/// Where the shortlist report currently stands.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ReportStatus {
    NoReport,
    Generating,
    Published { report: PublishedReport },
    Failed { reason: String },
}

impl ReportStatus {
    pub const fn label(&self) -> &'static str {
        match self {
            ReportStatus::NoReport => "no_report",
            ReportStatus::Generating => "generating",
            ReportStatus::Published { .. } => "published",
            ReportStatus::Failed { .. } => "failed",
        }
    }
}

/// Status bookkeeping shared by overlapping generations.
///
/// The status stays `Generating` until the last in-flight run finishes. It then reads
/// `Published` if any run of that overlapping round published (the latest one wins), and
/// `Failed` only when every run failed.
#[derive(Debug)]
struct Lifecycle {
    status: ReportStatus,
    in_flight: usize,
    round_published: Option<PublishedReport>,
    round_failure: Option<String>,
}

impl Lifecycle {
    fn new() -> Self {
        Self {
            status: ReportStatus::NoReport,
            in_flight: 0,
            round_published: None,
            round_failure: None,
        }
    }

    fn begin(&mut self) {
        if self.in_flight == 0 {
            self.round_published = None;
            self.round_failure = None;
        }
        self.in_flight += 1;
        self.status = ReportStatus::Generating;
    }

    fn finish(&mut self, outcome: &Result<PublishedReport, ReportServiceError>) {
        match outcome {
            Ok(report) => self.round_published = Some(report.clone()),
            Err(err) => self.round_failure = Some(err.to_string()),
        }
        self.in_flight = self.in_flight.saturating_sub(1);
        if self.in_flight > 0 {
            return;
        }

        self.status = match (self.round_published.take(), self.round_failure.take()) {
            (Some(report), _) => ReportStatus::Published { report },
            (None, Some(reason)) => ReportStatus::Failed { reason },
            (None, None) => ReportStatus::NoReport,
        };
    }
}

/// Service composing the record store, eligibility policy, renderer, and publisher.
pub struct CandidateReportService<S, P> {
    store: Arc<S>,
    publisher: Arc<P>,
    policy: EligibilityPolicy,
    renderer: ReportRenderer,
    lifecycle: Mutex<Lifecycle>,
}

impl<S, P> CandidateReportService<S, P>
where
    S: CandidateStore + 'static,
    P: ReportPublisher + 'static,
{
    pub fn new(store: Arc<S>, publisher: Arc<P>, policy: EligibilityPolicy) -> Self {
        Self::with_renderer(store, publisher, policy, ReportRenderer::default())
    }

    pub fn with_renderer(
        store: Arc<S>,
        publisher: Arc<P>,
        policy: EligibilityPolicy,
        renderer: ReportRenderer,
    ) -> Self {
        Self {
            store,
            publisher,
            policy,
            renderer,
            lifecycle: Mutex::new(Lifecycle::new()),
        }
    }

    pub fn policy(&self) -> &EligibilityPolicy {
        &self.policy
    }

    /// Persist an already validated candidate at the end of the store.
    pub fn add_candidate(&self, record: CandidateRecord) -> Result<(), StoreError> {
        self.store.append(record)
    }

    pub fn list_candidates(&self) -> Result<Vec<CandidateRecord>, StoreError> {
        self.store.read_all()
    }

    pub fn shortlist(&self) -> Result<Vec<CandidateRecord>, StoreError> {
        let records = self.store.read_all()?;
        Ok(self.policy.select(&records))
    }

    /// Read, filter, render, and publish; the previous report is replaced on success.
    pub fn generate_report(&self) -> Result<PublishedReport, ReportServiceError> {
        self.lifecycle().begin();
        let outcome = self.run_pipeline();
        self.lifecycle().finish(&outcome);
        outcome
    }

    /// Serve the most recently published report.
    ///
    /// While a generation is running the previous report, if any, is still served; with no
    /// previous report the caller gets [`PublishError::Pending`] instead of `NotFound`.
    pub fn fetch_report(&self) -> Result<Vec<u8>, PublishError> {
        match self.publisher.fetch() {
            Err(PublishError::NotFound) if self.report_status() == ReportStatus::Generating => {
                Err(PublishError::Pending)
            }
            other => other,
        }
    }

    pub fn report_status(&self) -> ReportStatus {
        self.lifecycle().status.clone()
    }

    fn run_pipeline(&self) -> Result<PublishedReport, ReportServiceError> {
        let records = self.store.read_all()?;
        let eligible = self.policy.select(&records);
        let rendered = self.renderer.render(&eligible)?;
        let published = self.publisher.publish(&rendered)?;
        Ok(published)
    }

    fn lifecycle(&self) -> MutexGuard<'_, Lifecycle> {
        self.lifecycle.lock().expect("status mutex poisoned")
    }
}

/// Error raised by the report service.
#[derive(Debug, thiserror::Error)]
pub enum ReportServiceError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Publish(#[from] PublishError),
}
