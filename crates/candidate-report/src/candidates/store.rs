use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tempfile::NamedTempFile;

use super::domain::CandidateRecord;

/// Storage abstraction for the insertion-ordered candidate sequence.
pub trait CandidateStore: Send + Sync {
    fn append(&self, record: CandidateRecord) -> Result<(), StoreError>;
    fn read_all(&self) -> Result<Vec<CandidateRecord>, StoreError>;
}

/// Error enumeration for record store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("unable to read candidate store {}: {source}", .path.display())]
    ReadFailure { path: PathBuf, source: io::Error },
    #[error("candidate store {} is not a valid candidate list: {source}", .path.display())]
    ParseFailure {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("unable to write candidate store {}: {source}", .path.display())]
    WriteFailure { path: PathBuf, source: io::Error },
}

/// Candidate store backed by a single JSON array on disk.
///
/// Every append rewrites the whole file through a temp file in the same directory followed by
/// a rename, so readers never observe a partially written list. Appends through one store value
/// are serialized; separate processes or separate `JsonFileStore` values pointing at the same
/// file can still lose updates.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the backing file with an empty list when it does not exist yet.
    ///
    /// The empty list is moved into place without replacing, so a file created concurrently by
    /// another writer is kept.
    pub fn initialize(&self) -> Result<(), StoreError> {
        if self.path.exists() {
            return Ok(());
        }

        let _guard = self.write_lock.lock().expect("store mutex poisoned");
        if let Some(parent) = self.parent_dir() {
            fs::create_dir_all(parent).map_err(|source| self.write_failure(source))?;
        }
        match self.stage(&[])?.persist_noclobber(&self.path) {
            Ok(_) => Ok(()),
            Err(err) if err.error.kind() == io::ErrorKind::AlreadyExists => Ok(()),
            Err(err) => Err(self.write_failure(err.error)),
        }
    }

    fn parent_dir(&self) -> Option<&Path> {
        self.path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
    }

    fn load(&self) -> Result<Vec<CandidateRecord>, StoreError> {
        let contents = fs::read(&self.path).map_err(|source| StoreError::ReadFailure {
            path: self.path.clone(),
            source,
        })?;
        serde_json::from_slice(&contents).map_err(|source| StoreError::ParseFailure {
            path: self.path.clone(),
            source,
        })
    }

    fn write_records(&self, records: &[CandidateRecord]) -> Result<(), StoreError> {
        self.stage(records)?
            .persist(&self.path)
            .map_err(|err| self.write_failure(err.error))?;
        Ok(())
    }

    /// Write the serialized list to a synced temp file next to the store.
    fn stage(&self, records: &[CandidateRecord]) -> Result<NamedTempFile, StoreError> {
        let mut buf = serde_json::to_vec_pretty(records)
            .map_err(|err| self.write_failure(io::Error::from(err)))?;
        buf.push(b'\n');

        let dir = self.parent_dir().unwrap_or_else(|| Path::new("."));
        let mut staged =
            NamedTempFile::new_in(dir).map_err(|source| self.write_failure(source))?;
        staged
            .write_all(&buf)
            .and_then(|()| staged.as_file().sync_all())
            .map_err(|source| self.write_failure(source))?;
        Ok(staged)
    }

    fn write_failure(&self, source: io::Error) -> StoreError {
        StoreError::WriteFailure {
            path: self.path.clone(),
            source,
        }
    }
}

impl CandidateStore for JsonFileStore {
    /// JSON has no representation for NaN or infinity, so such a record is refused before the
    /// file is touched.
    fn append(&self, record: CandidateRecord) -> Result<(), StoreError> {
        if !record.average.is_finite() {
            return Err(self.write_failure(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("candidate '{}' has a non-finite average", record.name),
            )));
        }

        let _guard = self.write_lock.lock().expect("store mutex poisoned");
        let mut records = self.load()?;
        records.push(record);
        self.write_records(&records)
    }

    fn read_all(&self) -> Result<Vec<CandidateRecord>, StoreError> {
        self.load()
    }
}

/// Volatile store used by tests and dry runs.
#[derive(Debug, Default, Clone)]
pub struct MemoryCandidateStore {
    records: Arc<Mutex<Vec<CandidateRecord>>>,
}

impl MemoryCandidateStore {
    pub fn with_records(records: Vec<CandidateRecord>) -> Self {
        Self {
            records: Arc::new(Mutex::new(records)),
        }
    }

    pub fn len(&self) -> usize {
        self.records.lock().expect("store mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CandidateStore for MemoryCandidateStore {
    fn append(&self, record: CandidateRecord) -> Result<(), StoreError> {
        self.records
            .lock()
            .expect("store mutex poisoned")
            .push(record);
        Ok(())
    }

    fn read_all(&self) -> Result<Vec<CandidateRecord>, StoreError> {
        Ok(self.records.lock().expect("store mutex poisoned").clone())
    }
}
