//! A single JSON file holding every request.
//!
//! The file is a pretty-printed array of request records. It is read once on
//! open; changes are kept in memory until [`JsonFileStore::flush`]. The
//! working set and the identifier rules are those of [`MemoryStore`].

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};

use crate::{
    domain::{NewRequest, Request, RequestId},
    storage::{MemoryStore, RequestStore, StoreError},
};

/// A [`RequestStore`] backed by one JSON file.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    inner: MemoryStore,
    dirty: bool,
}

impl JsonFileStore {
    /// Opens the store at `path`.
    ///
    /// A missing or empty file opens as an empty store; the file is created on
    /// the first [`flush`](RequestStore::flush) with pending changes.
    ///
    /// # Errors
    ///
    /// Fails if the file exists but cannot be read or does not hold a list of
    /// requests.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let requests = load(&path)?;
        tracing::debug!(path = %path.display(), count = requests.len(), "loaded requests");

        Ok(Self {
            path,
            inner: MemoryStore::with_requests(requests),
            dirty: false,
        })
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether there are changes not yet flushed.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }
}

fn load(path: &Path) -> Result<Vec<Request>, StoreError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no request file yet");
            return Ok(Vec::new());
        }
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    if content.trim().is_empty() {
        return Ok(Vec::new());
    }

    serde_json::from_str(&content).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

impl RequestStore for JsonFileStore {
    fn requests(&self) -> &[Request] {
        self.inner.requests()
    }

    fn create(&mut self, new: NewRequest, now: DateTime<Utc>) -> Result<&Request, StoreError> {
        let request = self.inner.create(new, now)?;
        self.dirty = true;
        Ok(request)
    }

    fn update(&mut self, request: Request, now: DateTime<Utc>) -> Result<&Request, StoreError> {
        let request = self.inner.update(request, now)?;
        self.dirty = true;
        Ok(request)
    }

    fn delete(&mut self, id: RequestId) -> Result<Request, StoreError> {
        let request = self.inner.delete(id)?;
        self.dirty = true;
        Ok(request)
    }

    fn flush(&mut self) -> Result<(), StoreError> {
        if !self.dirty {
            return Ok(());
        }

        let io_error = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }

        let content = serde_json::to_string_pretty(self.inner.requests()).map_err(|source| {
            StoreError::Parse {
                path: self.path.clone(),
                source,
            }
        })?;

        // Write beside the target and rename, so a failed write leaves the
        // previous file intact.
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, content).map_err(io_error)?;
        fs::rename(&staging, &self.path).map_err(io_error)?;

        tracing::debug!(
            path = %self.path.display(),
            count = self.inner.requests().len(),
            "saved requests"
        );
        self.dirty = false;
        Ok(())
    }
}
