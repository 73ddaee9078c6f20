use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tempfile::NamedTempFile;

use super::report::RenderedReport;

/// Outbound hook that makes a rendered report retrievable.
pub trait ReportPublisher: Send + Sync {
    fn publish(&self, report: &RenderedReport) -> Result<PublishedReport, PublishError>;
    fn fetch(&self) -> Result<Vec<u8>, PublishError>;
}

/// Publication failures and retrieval misses.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("unable to write report to {}: {source}", .path.display())]
    WriteFailure { path: PathBuf, source: io::Error },
    #[error("no report has been published")]
    NotFound,
    #[error("report generation is in progress")]
    Pending,
    #[error("unable to read report from {}: {source}", .path.display())]
    ReadFailure { path: PathBuf, source: io::Error },
}

/// Metadata returned to callers once a report is in place.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublishedReport {
    pub location: String,
    pub candidate_count: usize,
    pub page_count: usize,
    pub flagged_count: usize,
    pub published_at: DateTime<Utc>,
}

impl PublishedReport {
    fn describe(location: &str, report: &RenderedReport) -> Self {
        Self {
            location: location.to_string(),
            candidate_count: report.candidate_count,
            page_count: report.page_count,
            flagged_count: report.flagged.len(),
            published_at: Utc::now(),
        }
    }
}

/// Writes the report to one fixed file, replacing the previous one.
///
/// The bytes are staged in a temp file next to the target and renamed into place, so a failed
/// write never leaves a truncated report at `path` and readers always see a complete file.
#[derive(Debug)]
pub struct FileReportPublisher {
    path: PathBuf,
    location: String,
    published: AtomicBool,
}

impl FileReportPublisher {
    pub fn new(path: impl Into<PathBuf>, location: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            location: location.into(),
            published: AtomicBool::new(false),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    fn write_atomic(&self, bytes: &[u8]) -> Result<(), PublishError> {
        let dir = self
            .path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir).map_err(|source| self.write_failure(source))?;

        let mut staged =
            NamedTempFile::new_in(dir).map_err(|source| self.write_failure(source))?;
        staged
            .write_all(bytes)
            .and_then(|()| staged.as_file().sync_all())
            .map_err(|source| self.write_failure(source))?;
        staged
            .persist(&self.path)
            .map_err(|err| self.write_failure(err.error))?;
        Ok(())
    }

    fn write_failure(&self, source: io::Error) -> PublishError {
        PublishError::WriteFailure {
            path: self.path.clone(),
            source,
        }
    }
}

impl ReportPublisher for FileReportPublisher {
    fn publish(&self, report: &RenderedReport) -> Result<PublishedReport, PublishError> {
        self.write_atomic(&report.bytes)?;
        self.published.store(true, Ordering::Release);
        Ok(PublishedReport::describe(&self.location, report))
    }

    fn fetch(&self) -> Result<Vec<u8>, PublishError> {
        if !self.published.load(Ordering::Acquire) {
            return Err(PublishError::NotFound);
        }

        fs::read(&self.path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => PublishError::NotFound,
            _ => PublishError::ReadFailure {
                path: self.path.clone(),
                source,
            },
        })
    }
}

/// Keeps the latest report in memory; used by tests and dry runs.
#[derive(Debug, Clone)]
pub struct MemoryReportPublisher {
    location: String,
    latest: Arc<Mutex<Option<Vec<u8>>>>,
}

impl MemoryReportPublisher {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            latest: Arc::new(Mutex::new(None)),
        }
    }
}

impl ReportPublisher for MemoryReportPublisher {
    fn publish(&self, report: &RenderedReport) -> Result<PublishedReport, PublishError> {
        *self.latest.lock().expect("publisher mutex poisoned") = Some(report.bytes.clone());
        Ok(PublishedReport::describe(&self.location, report))
    }

    fn fetch(&self) -> Result<Vec<u8>, PublishError> {
        self.latest
            .lock()
            .expect("publisher mutex poisoned")
            .clone()
            .ok_or(PublishError::NotFound)
    }
}
