use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;

use crate::core::error::Result;
use crate::features::jobs::models::DueJob;
use crate::features::jobs::JobService;
use crate::features::notifications::services::NotificationDispatcher;
use crate::features::users::UserService;

/// Reminds users near an upcoming job's issue that it is about to start.
/// Each job is reminded once.
pub struct JobReminderWorker {
    jobs: Arc<JobService>,
    users: Arc<UserService>,
    dispatcher: Arc<NotificationDispatcher>,
    period: Duration,
    window_days: i64,
}

impl JobReminderWorker {
    pub fn new(
        jobs: Arc<JobService>,
        users: Arc<UserService>,
        dispatcher: Arc<NotificationDispatcher>,
        period: Duration,
        window_days: i64,
    ) -> Self {
        Self {
            jobs,
            users,
            dispatcher,
            period,
            window_days,
        }
    }

    /// Run the sweep in a background loop
    pub async fn run(&self) {
        tracing::info!(
            "Starting job reminder worker (every {:?}, {} day window)",
            self.period,
            self.window_days
        );

        let mut interval = interval(self.period);

        loop {
            interval.tick().await;

            if let Err(e) = self.process_batch().await {
                tracing::error!("Error sending job reminders: {:?}", e);
            }
        }
    }

    async fn process_batch(&self) -> Result<()> {
        let due = self.jobs.find_due_reminders(self.window_days).await?;

        if due.is_empty() {
            return Ok(());
        }

        tracing::info!("Sending reminders for {} upcoming jobs", due.len());

        for job in due {
            if let Err(e) = self.remind(&job).await {
                tracing::error!("Failed to send reminder for job {}: {:?}", job.id, e);
            }
        }

        Ok(())
    }

    async fn remind(&self, job: &DueJob) -> Result<()> {
        let recipients = self.users.list_ids_by_location(&job.location).await?;
        let report = self.dispatcher.notify_job_reminder(job, &recipients).await;

        // Stamped even when some recipients failed; those are logged by the fan-out
        self.jobs.mark_reminded(job.id).await?;

        tracing::info!(
            "Job {} reminder: {}/{} users in '{}' notified",
            job.id,
            report.delivered,
            report.recipients,
            job.location
        );
        Ok(())
    }
}
