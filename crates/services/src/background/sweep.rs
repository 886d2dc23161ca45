use std::sync::Arc;

use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use crate::notify::NotificationEngine;

/// Cron wrapper around the daily notification sweep. The schedule comes
/// from configuration; the sweep itself owns all per-rule error handling.
pub struct SweepScheduler {
    scheduler: JobScheduler,
}

impl SweepScheduler {
    pub async fn start(
        schedule: &str,
        engine: Arc<NotificationEngine>,
    ) -> anyhow::Result<Self> {
        let scheduler = JobScheduler::new().await?;

        let job = Job::new_async(schedule, move |_uuid, _lock| {
            let engine = Arc::clone(&engine);
            Box::pin(async move {
                info!("Daily notification sweep triggered");
                if let Err(e) = engine.run_daily_sweep().await {
                    error!(%e, "Daily notification sweep failed");
                }
            })
        })?;

        scheduler.add(job).await?;
        scheduler.start().await?;
        info!(schedule, "Notification sweep scheduled");

        Ok(Self { scheduler })
    }

    pub async fn shutdown(&mut self) -> anyhow::Result<()> {
        self.scheduler.shutdown().await?;
        info!("Notification sweep scheduler shut down");
        Ok(())
    }
}
