use std::sync::Arc;

use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};
use tracing::info;

use super::cycle::{CycleRunner, Trigger};

/// Background worker firing cycles on the check schedule
pub struct JobWorker {
    runner: Arc<CycleRunner>,
    schedule: String,
}

impl JobWorker {
    /// Create a new JobWorker instance
    ///
    /// `schedule` is a cron expression with a leading seconds field.
    pub fn new(runner: Arc<CycleRunner>, schedule: impl Into<String>) -> Self {
        Self {
            runner,
            schedule: schedule.into(),
        }
    }

    /// Register the check job and start the scheduler
    ///
    /// # Architecture
    /// - Optionally spawns one cycle right away
    /// - Each cron tick asks the runner for a cycle
    /// - Ticks landing while another cycle runs are dropped by the runner
    ///
    /// # Errors
    /// An invalid cron expression, or a scheduler that fails to start.
    /// The caller owns the returned scheduler and shuts it down.
    pub async fn start(&self, run_on_startup: bool) -> Result<JobScheduler, JobSchedulerError> {
        let scheduler = JobScheduler::new().await?;

        let runner = self.runner.clone();
        let job = Job::new_async(self.schedule.as_str(), move |_uuid, _lock| {
            let runner = runner.clone();
            Box::pin(async move {
                runner.try_run(Trigger::Timer).await;
            })
        })?;
        scheduler.add(job).await?;
        scheduler.start().await?;
        info!("Worker started with schedule '{}'", self.schedule);

        if run_on_startup {
            info!("Running initial check...");
            let runner = self.runner.clone();
            tokio::spawn(async move {
                runner.try_run(Trigger::Startup).await;
            });
        }

        Ok(scheduler)
    }
}
