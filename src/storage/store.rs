// The store interface consumed by the CLI.

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::{NewRequest, Request, RequestId, Status, ValidationError};

/// A collection of requests that owns their storage lifecycle.
///
/// Implementations assign identifiers on [`create`](RequestStore::create),
/// replace records in place on [`update`](RequestStore::update) and drop them
/// on [`delete`](RequestStore::delete). Durable implementations write changes
/// out on [`flush`](RequestStore::flush).
pub trait RequestStore {
    /// All requests, in insertion order.
    fn requests(&self) -> &[Request];

    /// Adds a request, assigning the next free identifier.
    ///
    /// # Errors
    ///
    /// Fails if the request does not validate or no identifier is left.
    fn create(&mut self, new: NewRequest, now: DateTime<Utc>) -> Result<&Request, StoreError>;

    /// Replaces the stored request with the same identifier.
    ///
    /// `created_date` is kept from the stored record and `last_modified` is
    /// set to `now`.
    ///
    /// # Errors
    ///
    /// Fails if no request has that identifier or if the request does not
    /// validate.
    fn update(&mut self, request: Request, now: DateTime<Utc>) -> Result<&Request, StoreError>;

    /// Removes a request and returns it.
    ///
    /// # Errors
    ///
    /// Fails if no request has that identifier.
    fn delete(&mut self, id: RequestId) -> Result<Request, StoreError>;

    /// Writes pending changes to durable storage.
    ///
    /// # Errors
    ///
    /// Fails if the backing storage cannot be written.
    fn flush(&mut self) -> Result<(), StoreError> {
        Ok(())
    }

    /// Looks a request up by identifier.
    fn get(&self, id: RequestId) -> Option<&Request> {
        self.requests().iter().find(|request| request.id == id)
    }

    /// Requests in the given state.
    fn by_status(&self, status: Status) -> Vec<&Request> {
        self.requests()
            .iter()
            .filter(|request| request.status == status)
            .collect()
    }

    /// Open requests whose deadline has passed.
    fn overdue(&self, today: NaiveDate) -> Vec<&Request> {
        self.requests()
            .iter()
            .filter(|request| request.is_overdue_and_open(today))
            .collect()
    }

    /// Identifier the next created request will get.
    ///
    /// # Errors
    ///
    /// Fails once the highest stored identifier is [`u32::MAX`].
    fn next_id(&self) -> Result<RequestId, StoreError> {
        match self.requests().iter().map(|request| request.id).max() {
            None => Ok(RequestId::new(1)),
            Some(highest) => highest.next().ok_or(StoreError::IdsExhausted(highest)),
        }
    }
}

/// A store operation failed.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No request has the identifier.
    #[error("request {0} not found")]
    NotFound(RequestId),

    /// No identifier is left after the highest stored one.
    #[error("no request identifier left after {0}")]
    IdsExhausted(RequestId),

    /// The request holds invalid data.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Reading or writing the backing file failed.
    #[error("failed to access {}: {source}", path.display())]
    Io {
        /// Backing file.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The backing file does not hold a list of requests.
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        /// Backing file.
        path: PathBuf,
        /// Underlying error.
        source: serde_json::Error,
    },
}
