//! In-process stand-ins for the provider and the messaging endpoint.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::models::{Job, RawListing};
use super::notifier::{Notifier, NotifyError};
use super::source::{FetchError, ListingSource};

pub fn listing(id: Option<&str>, title: &str) -> RawListing {
    RawListing {
        job_id: id.map(String::from),
        job_title: Some(title.to_string()),
        employer_name: Some("Acme".to_string()),
        job_country: Some("US".to_string()),
        job_apply_link: id.map(|id| format!("https://apply.example/{id}")),
        ..Default::default()
    }
}

/// Returns the same page on every fetch, optionally after a delay
pub struct FakeSource {
    page: Result<Vec<RawListing>, u16>,
    delay: Duration,
    calls: AtomicUsize,
}

impl FakeSource {
    pub fn new(listings: Vec<RawListing>) -> Self {
        Self {
            page: Ok(listings),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    /// Every fetch fails with the given HTTP status
    pub fn failing(status: u16) -> Self {
        Self {
            page: Err(status),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ListingSource for FakeSource {
    async fn fetch(&self) -> Result<Vec<RawListing>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match &self.page {
            Ok(listings) => Ok(listings.clone()),
            Err(status) => Err(FetchError::Status {
                status: *status,
                body: "unavailable".to_string(),
            }),
        }
    }
}

/// Records every delivery attempt; ids in `failing_ids` are rejected
#[derive(Default)]
pub struct RecordingNotifier {
    attempts: Mutex<Vec<Job>>,
    failing_ids: HashSet<String>,
}

impl RecordingNotifier {
    pub fn failing_for(ids: &[&str]) -> Self {
        Self {
            attempts: Mutex::new(Vec::new()),
            failing_ids: ids.iter().map(|id| id.to_string()).collect(),
        }
    }

    pub fn attempted_ids(&self) -> Vec<String> {
        self.attempts
            .lock()
            .unwrap()
            .iter()
            .filter_map(|job| job.id.clone())
            .collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, job: &Job) -> Result<(), NotifyError> {
        self.attempts.lock().unwrap().push(job.clone());
        match job.id.as_deref() {
            Some(id) if self.failing_ids.contains(id) => Err(NotifyError::Rejected {
                status: 429,
                body: "Too Many Requests".to_string(),
            }),
            _ => Ok(()),
        }
    }
}

/// Never finishes a delivery
pub struct HangingNotifier;

#[async_trait]
impl Notifier for HangingNotifier {
    async fn notify(&self, _job: &Job) -> Result<(), NotifyError> {
        std::future::pending().await
    }
}
