use std::fmt;
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::pipeline::{CycleReport, Pipeline};
use crate::db::StoreError;

/// What asked for a cycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trigger {
    Startup,
    Timer,
    Manual,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::Startup => write!(f, "startup"),
            Trigger::Timer => write!(f, "timer"),
            Trigger::Manual => write!(f, "manual"),
        }
    }
}

/// Serializes cycles coming from the timer and the manual trigger
///
/// Both paths go through [`CycleRunner::try_run`]. At most one cycle runs at a
/// time; a trigger arriving while a cycle is in progress is dropped.
pub struct CycleRunner {
    pipeline: Pipeline,
    in_progress: Mutex<()>,
    last_check: RwLock<DateTime<Utc>>,
}

impl CycleRunner {
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline,
            in_progress: Mutex::new(()),
            last_check: RwLock::new(Utc::now()),
        }
    }

    /// Run a cycle unless one is already running
    ///
    /// # Returns
    /// - `Some(report)` - this call ran the cycle
    /// - `None` - another cycle was in progress, nothing was done
    pub async fn try_run(&self, trigger: Trigger) -> Option<CycleReport> {
        let Ok(_guard) = self.in_progress.try_lock() else {
            warn!("Dropping {} trigger: a cycle is already in progress", trigger);
            return None;
        };

        info!("Starting {} cycle", trigger);
        *self.last_check.write().unwrap_or_else(PoisonError::into_inner) = Utc::now();

        Some(self.pipeline.run_cycle().await)
    }

    /// Start time of the latest cycle, or creation time if none ran yet
    pub fn last_check(&self) -> DateTime<Utc> {
        *self.last_check.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn total_seen(&self) -> usize {
        self.pipeline.total_seen()
    }

    /// Wait until no cycle is running
    pub async fn wait_idle(&self) {
        let _guard = self.in_progress.lock().await;
    }

    pub async fn flush(&self) -> Result<(), StoreError> {
        self.pipeline.flush().await
    }
}
