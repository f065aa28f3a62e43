mod job_reminder;

pub use job_reminder::JobReminderWorker;
