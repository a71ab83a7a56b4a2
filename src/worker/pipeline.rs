use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, warn};

use crate::db::{SeenStore, StoreError};
use crate::jobs::notifier::NOTIFY_TIMEOUT;
use crate::jobs::{Job, KeywordMatcher, ListingSource, Notifier};

/// Outcome of one cycle
///
/// `sent` counts jobs accepted for notification: marked seen and handed to
/// the notifier, whether or not delivery succeeded.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    pub fetched: usize,
    pub skipped_missing_id: usize,
    pub skipped_seen: usize,
    pub skipped_unmatched: usize,
    pub sent: usize,
    pub failed_deliveries: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetch_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persist_error: Option<String>,
}

/// Fetch, filter, deduplicate and notify
///
/// The pipeline is the only writer of the seen store. The store lock is held
/// only for in-memory operations, never across an await or a disk write, so
/// readers such as the status endpoint never wait on a running cycle.
pub struct Pipeline {
    source: Arc<dyn ListingSource>,
    notifier: Arc<dyn Notifier>,
    matcher: KeywordMatcher,
    store: Mutex<SeenStore>,
    notify_delay: Duration,
    notify_timeout: Duration,
}

impl Pipeline {
    pub fn new(
        source: Arc<dyn ListingSource>,
        notifier: Arc<dyn Notifier>,
        matcher: KeywordMatcher,
        store: SeenStore,
        notify_delay: Duration,
    ) -> Self {
        Self {
            source,
            notifier,
            matcher,
            store: Mutex::new(store),
            notify_delay,
            notify_timeout: NOTIFY_TIMEOUT,
        }
    }

    /// Upper bound for a single delivery, whatever the notifier does
    pub fn with_notify_timeout(mut self, notify_timeout: Duration) -> Self {
        self.notify_timeout = notify_timeout;
        self
    }

    /// Run one cycle to completion
    ///
    /// # Behavior
    /// - A failed fetch degrades to an empty page
    /// - Jobs are evaluated in provider order
    /// - Records without an id never reach the matcher or the store
    /// - A job is marked seen before delivery is attempted (at-most-once)
    /// - Delivery failures and timeouts are logged and counted, never retried
    /// - The store is flushed at the end of every cycle
    pub async fn run_cycle(&self) -> CycleReport {
        info!("Checking jobs at {}", Utc::now().to_rfc3339());
        let mut report = CycleReport::default();

        let listings = match self.source.fetch().await {
            Ok(listings) => listings,
            Err(e) => {
                error!("Listing fetch failed, no jobs this cycle: {}", e);
                report.fetch_error = Some(e.to_string());
                Vec::new()
            }
        };
        report.fetched = listings.len();

        for job in listings.into_iter().map(Job::from) {
            let Some(id) = job.dedup_id() else {
                debug!("Skipping listing without id: title={:?}", job.title);
                report.skipped_missing_id += 1;
                continue;
            };

            let already_seen = self.store().contains(id);
            if already_seen {
                debug!("Skipping already notified job {}", id);
                report.skipped_seen += 1;
                continue;
            }

            if !self.matcher.matches(&job) {
                debug!("Skipping non-matching job {}: {:?}", id, job.title);
                report.skipped_unmatched += 1;
                continue;
            }

            self.store().mark_seen(id);
            report.sent += 1;

            match timeout(self.notify_timeout, self.notifier.notify(&job)).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    error!("Failed to deliver notification for job {}: {}", id, e);
                    report.failed_deliveries += 1;
                }
                Err(_) => {
                    error!(
                        "Notification for job {} timed out after {:?}",
                        id, self.notify_timeout
                    );
                    report.failed_deliveries += 1;
                }
            }

            sleep(self.notify_delay).await;
        }

        if let Err(e) = self.flush().await {
            error!("Failed to save seen jobs: {}", e);
            report.persist_error = Some(e.to_string());
        }

        if report.failed_deliveries > 0 {
            warn!(
                "{} of {} notifications could not be delivered",
                report.failed_deliveries, report.sent
            );
        }
        info!(
            "Notifications sent: {} (fetched={}, seen={}, unmatched={}, missing_id={})",
            report.sent,
            report.fetched,
            report.skipped_seen,
            report.skipped_unmatched,
            report.skipped_missing_id
        );
        report
    }

    /// Number of ids in the seen store
    pub fn total_seen(&self) -> usize {
        self.store().len()
    }

    /// Persist the seen store
    ///
    /// The set is copied under the lock; serialization, fsync and rename run
    /// on the blocking pool.
    pub async fn flush(&self) -> Result<(), StoreError> {
        let snapshot = self.store().snapshot();
        tokio::task::spawn_blocking(move || snapshot.write()).await?
    }

    fn store(&self) -> MutexGuard<'_, SeenStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
