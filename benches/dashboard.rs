//! This bench aggregates dashboard and report figures over a large set of
//! requests, and reloads that set from a tracker on disk.

#![allow(missing_docs)]

use chrono::{Days, NaiveDate, TimeZone, Utc};
use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use efor::{
    Config, DashboardStats, Directory, NewRequest, Report, Request, RequestStore, Status,
    MemoryStore,
};
use tempfile::TempDir;

const REQUESTS: u32 = 5_000;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

/// Generates requests spread across every size, status and deadline tier
fn requests() -> Vec<Request> {
    let mut store = MemoryStore::new();
    let now = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();

    for i in 0..REQUESTS {
        let mut new = NewRequest::named(format!("Request {i}"));
        new.hours.analyst = f64::from(i % 40);
        new.hours.developer = f64::from(i % 400);
        new.hours.acceptance_test = f64::from(i % 24);
        new.deadline = today().checked_add_days(Days::new(u64::from(i % 90)));

        let mut request = store.create(new, now).unwrap().clone();
        request.status = Status::ALL[(i % 6) as usize];
        store.update(request, now).unwrap();
    }

    store.into_requests()
}

fn aggregate(c: &mut Criterion) {
    let requests = requests();
    let config = Config::default();

    c.bench_function("dashboard stats", |b| {
        b.iter(|| DashboardStats::collect(&requests, &config, today()));
    });

    c.bench_function("report", |b| {
        b.iter(|| Report::collect(&requests, &config, today()));
    });
}

fn reload(c: &mut Criterion) {
    let tmp_dir = TempDir::new().unwrap();
    {
        let mut directory = Directory::init(tmp_dir.path().to_path_buf()).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        for request in requests() {
            let mut new = NewRequest::named(request.name);
            new.hours = request.hours;
            new.deadline = request.deadline;
            directory.store_mut().create(new, now).unwrap();
        }
        directory.flush().unwrap();
    }

    c.bench_function("reload tracker", |b| {
        b.iter_batched(
            || tmp_dir.path().to_path_buf(),
            |root| Directory::new(root).unwrap(),
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, aggregate, reload);
criterion_main!(benches);
