//! Candidate intake, storage, eligibility screening, and shortlist reporting.
//!
//! Records flow append-only into a [`CandidateStore`]; on request the service reads them back,
//! keeps those allowed by the [`EligibilityPolicy`], renders one text block per candidate into a
//! PDF, and hands it to a [`ReportPublisher`]. Only the router logs; every other module returns
//! typed errors.

pub mod domain;
pub mod eligibility;
pub mod import;
pub mod intake;
pub mod publisher;
pub mod report;
pub mod router;
pub mod service;
pub mod store;

#[cfg(test)]
mod tests;

pub use domain::{CandidateRecord, CandidateSubmission};
pub use eligibility::{select_eligible, EligibilityPolicy};
pub use import::ImportError;
pub use intake::{IntakeGuard, IntakeRejection, IntakeViolation};
pub use publisher::{
    FileReportPublisher, MemoryReportPublisher, PublishError, PublishedReport, ReportPublisher,
};
pub use report::{render, PageLayout, RenderError, RenderedReport, ReportDocument, ReportRenderer};
pub use router::candidate_router;
pub use service::{CandidateReportService, ReportServiceError, ReportStatus};
pub use store::{CandidateStore, JsonFileStore, MemoryCandidateStore, StoreError};
