use chrono::{DateTime, Utc};

use crate::{
    domain::{NewRequest, Request, RequestId},
    storage::{RequestStore, StoreError},
};

/// An in-memory [`RequestStore`].
///
/// Also the working set behind [`JsonFileStore`](crate::JsonFileStore).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryStore {
    requests: Vec<Request>,
}

impl MemoryStore {
    /// An empty store.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            requests: Vec::new(),
        }
    }

    /// A store holding existing records.
    #[must_use]
    pub const fn with_requests(requests: Vec<Request>) -> Self {
        Self { requests }
    }

    /// Consumes the store, returning its records.
    #[must_use]
    pub fn into_requests(self) -> Vec<Request> {
        self.requests
    }

    fn position(&self, id: RequestId) -> Result<usize, StoreError> {
        self.requests
            .iter()
            .position(|request| request.id == id)
            .ok_or(StoreError::NotFound(id))
    }
}

impl RequestStore for MemoryStore {
    fn requests(&self) -> &[Request] {
        &self.requests
    }

    fn create(&mut self, new: NewRequest, now: DateTime<Utc>) -> Result<&Request, StoreError> {
        new.validate()?;

        let request = new.into_request(self.next_id()?, now);
        tracing::info!(id = %request.id, name = %request.name, "created request");

        self.requests.push(request);
        Ok(&self.requests[self.requests.len() - 1])
    }

    fn update(&mut self, mut request: Request, now: DateTime<Utc>) -> Result<&Request, StoreError> {
        request.validate()?;
        request.name = request.name.trim().to_string();
        let index = self.position(request.id)?;
        let existing = &self.requests[index];

        log_changes(existing, &request);

        request.created_date = existing.created_date;
        request.last_modified = now;
        self.requests[index] = request;
        Ok(&self.requests[index])
    }

    fn delete(&mut self, id: RequestId) -> Result<Request, StoreError> {
        let index = self.position(id)?;
        let removed = self.requests.remove(index);
        tracing::info!(id = %removed.id, name = %removed.name, "deleted request");
        Ok(removed)
    }
}

fn log_changes(old: &Request, new: &Request) {
    let id = new.id;
    let by = new.last_modified_by.as_str();

    if old.name != new.name {
        tracing::info!(%id, by, from = %old.name, to = %new.name, "name changed");
    }
    if old.status != new.status {
        tracing::info!(%id, by, from = old.status.name(), to = new.status.name(), "status changed");
    }
    if (old.hours.analyst - new.hours.analyst).abs() > f64::EPSILON {
        tracing::info!(%id, by, from = old.hours.analyst, to = new.hours.analyst, "analyst hours changed");
    }
    if (old.hours.developer - new.hours.developer).abs() > f64::EPSILON {
        tracing::info!(%id, by, from = old.hours.developer, to = new.hours.developer, "developer hours changed");
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone};

    use super::*;
    use crate::domain::{Status, ValidationError};

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, day, 12, 0, 0).unwrap()
    }

    #[test]
    fn create_assigns_sequential_ids() {
        let mut store = MemoryStore::new();
        let first = store.create(NewRequest::named("One"), at(1)).unwrap().id;
        let second = store.create(NewRequest::named("Two"), at(1)).unwrap().id;

        assert_eq!(first, RequestId::new(1));
        assert_eq!(second, RequestId::new(2));
    }

    #[test]
    fn ids_continue_after_highest_existing() {
        let mut store = MemoryStore::new();
        for name in ["a", "b", "c"] {
            store.create(NewRequest::named(name), at(1)).unwrap();
        }
        store.delete(RequestId::new(2)).unwrap();
        let id = store.create(NewRequest::named("d"), at(2)).unwrap().id;

        assert_eq!(id, RequestId::new(4));
    }

    #[test]
    fn create_rejects_invalid_request() {
        let mut store = MemoryStore::new();
        let error = store.create(NewRequest::named(""), at(1)).unwrap_err();

        assert!(matches!(
            error,
            StoreError::Validation(ValidationError::EmptyName)
        ));
        assert!(store.requests().is_empty());
    }

    #[test]
    fn update_keeps_created_date_and_stamps_modified() {
        let mut store = MemoryStore::new();
        let mut request = store
            .create(NewRequest::named("Billing"), at(1))
            .unwrap()
            .clone();

        request.status = Status::InProgress;
        request.created_date = at(20);
        let updated = store.update(request, at(3)).unwrap();

        assert_eq!(updated.status, Status::InProgress);
        assert_eq!(updated.created_date, at(1));
        assert_eq!(updated.last_modified, at(3));
    }

    #[test]
    fn update_trims_name() {
        let mut store = MemoryStore::new();
        let mut request = store
            .create(NewRequest::named("Billing"), at(1))
            .unwrap()
            .clone();

        request.name = "  Billing v2 \t".to_string();
        let updated = store.update(request, at(2)).unwrap();

        assert_eq!(updated.name, "Billing v2");
    }

    #[test]
    fn create_fails_when_ids_are_exhausted() {
        let existing = NewRequest::named("Last").into_request(RequestId::new(u32::MAX), at(1));
        let mut store = MemoryStore::with_requests(vec![existing]);

        assert!(matches!(
            store.create(NewRequest::named("One more"), at(2)),
            Err(StoreError::IdsExhausted(id)) if id == RequestId::new(u32::MAX)
        ));
        assert_eq!(store.requests().len(), 1);
    }

    #[test]
    fn update_unknown_request_fails() {
        let mut store = MemoryStore::new();
        let request = NewRequest::named("Ghost").into_request(RequestId::new(9), at(1));

        assert!(matches!(
            store.update(request, at(2)),
            Err(StoreError::NotFound(id)) if id == RequestId::new(9)
        ));
    }

    #[test]
    fn delete_unknown_request_fails() {
        let mut store = MemoryStore::new();
        assert!(matches!(
            store.delete(RequestId::new(1)),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn queries_by_status_and_overdue() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        let mut store = MemoryStore::new();

        let mut late = NewRequest::named("late");
        late.deadline = NaiveDate::from_ymd_opt(2024, 5, 1);
        store.create(late.clone(), at(1)).unwrap();

        late.name = "late but done".to_string();
        let mut done = store.create(late, at(1)).unwrap().clone();
        done.status = Status::Completed;
        store.update(done, at(2)).unwrap();

        store.create(NewRequest::named("no deadline"), at(1)).unwrap();

        assert_eq!(store.by_status(Status::New).len(), 2);
        assert_eq!(store.by_status(Status::Completed).len(), 1);

        let overdue: Vec<_> = store.overdue(today).iter().map(|r| r.id.get()).collect();
        assert_eq!(overdue, vec![1]);
        assert_eq!(store.get(RequestId::new(3)).unwrap().name, "no deadline");
    }
}
