use minijinja::context;
use std::sync::Arc;

use crate::features::donations::models::Donation;
use crate::features::issues::models::Issue;
use crate::features::jobs::models::{DueJob, Job};
use crate::features::notifications::dtos::{DispatchOutcome, FanOutReport};
use crate::features::notifications::models::{CreateNotification, NotificationType};
use crate::features::notifications::services::NotificationService;
use crate::features::users::models::User;
use crate::features::users::UserService;
use crate::modules::email::{EmailClient, EmailMessage};
use crate::shared::templates::{render_template, TemplateError};

/// Turns domain events into stored notifications, live pushes and emails.
///
/// Nothing here fails the caller: each recipient is handled on its own and
/// problems are logged, then reported through [`FanOutReport`] or
/// [`DispatchOutcome`].
pub struct NotificationDispatcher {
    notifications: Arc<NotificationService>,
    users: Arc<UserService>,
    email: Arc<EmailClient>,
    frontend_url: String,
}

impl NotificationDispatcher {
    pub fn new(
        notifications: Arc<NotificationService>,
        users: Arc<UserService>,
        email: Arc<EmailClient>,
        frontend_url: String,
    ) -> Self {
        Self {
            notifications,
            users,
            email,
            frontend_url: frontend_url.trim_end_matches('/').to_string(),
        }
    }

    /// One notification per recipient, in order
    pub async fn fan_out(
        &self,
        recipients: &[String],
        notification_type: NotificationType,
        message: &str,
        event_slug: Option<&str>,
    ) -> FanOutReport {
        let mut report = FanOutReport {
            recipients: recipients.len(),
            ..Default::default()
        };

        for user_id in recipients {
            if self
                .notify(user_id, notification_type, message, event_slug)
                .await
            {
                report.delivered += 1;
            } else {
                report.failed += 1;
            }
        }

        if report.failed > 0 {
            tracing::warn!(
                "{} fan-out: {}/{} notifications failed",
                notification_type,
                report.failed,
                report.recipients
            );
        }
        report
    }

    /// Store and push a single notification; `false` if it could not be stored
    pub async fn notify(
        &self,
        user_id: &str,
        notification_type: NotificationType,
        message: &str,
        event_slug: Option<&str>,
    ) -> bool {
        let data = CreateNotification {
            user_id: user_id.to_string(),
            notification_type,
            message: message.to_string(),
            event_slug: event_slug.map(str::to_string),
        };

        match self.notifications.create(&data).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(
                    "Failed to notify {} ({}): {}",
                    user_id,
                    notification_type,
                    e
                );
                false
            }
        }
    }

    /// Reporter and every other upvoter learn that an NGO took the issue
    pub async fn notify_issue_picked(&self, issue: &Issue, ngo_name: &str) -> FanOutReport {
        let message = issue_picked_message(&issue.title, ngo_name);
        let recipients = issue.notification_recipients();

        let report = self
            .fan_out(
                &recipients,
                NotificationType::IssuePicked,
                &message,
                Some(&issue.slug),
            )
            .await;

        tracing::info!(
            "Issue {} picked: notified {}/{} users",
            issue.id,
            report.delivered,
            report.recipients
        );
        report
    }

    /// In-app notice plus email to the volunteer a job was given to
    pub async fn notify_task_assignment(&self, job: &Job, issue: &Issue) -> DispatchOutcome {
        let message = format!(
            "You have been assigned '{}' for issue '{}'",
            job.title, issue.title
        );
        let notification_created = self
            .notify(
                &job.assigned_to,
                NotificationType::TaskAssigned,
                &message,
                Some(&issue.slug),
            )
            .await;

        let email_sent = match self.recipient(&job.assigned_to).await {
            Some(volunteer) => {
                let body = render_template(
                    "task_assigned.jinja",
                    context! {
                        volunteer_name => volunteer.name,
                        job_title => &job.title,
                        issue_title => &issue.title,
                        start_date => job.start_date.format("%Y-%m-%d %H:%M UTC").to_string(),
                        description => &job.description,
                        link => format!("{}/jobs", self.frontend_url),
                    },
                );
                self.send_email(
                    &volunteer.email,
                    format!("New task: {}", job.title),
                    body,
                )
                .await
            }
            None => false,
        };

        DispatchOutcome {
            notification_created,
            email_sent,
        }
    }

    /// Receipt for the donor, in-app and by email
    pub async fn notify_donation_completion(
        &self,
        donation: &Donation,
        ngo: &User,
    ) -> DispatchOutcome {
        let message = format!(
            "Thank you! Your donation of {} to {} was completed",
            donation.amount, ngo.name
        );
        let notification_created = self
            .notify(
                &donation.user_id,
                NotificationType::DonationReceived,
                &message,
                None,
            )
            .await;

        let email_sent = match self.recipient(&donation.user_id).await {
            Some(donor) => {
                let body = render_template(
                    "donation_completed.jinja",
                    context! {
                        donor_name => donor.name,
                        amount => donation.amount.to_string(),
                        ngo_name => &ngo.name,
                        transaction_id => &donation.transaction_id,
                        message => &donation.message,
                    },
                );
                self.send_email(
                    &donor.email,
                    format!("Donation receipt: {}", donation.transaction_id),
                    body,
                )
                .await
            }
            None => false,
        };

        DispatchOutcome {
            notification_created,
            email_sent,
        }
    }

    /// Tell the NGO a donation arrived
    pub async fn notify_donation_received(&self, donation: &Donation) -> bool {
        let message = format!("You received a donation of {}", donation.amount);
        self.notify(
            &donation.ngo_id,
            NotificationType::DonationReceived,
            &message,
            None,
        )
        .await
    }

    pub async fn notify_job_reminder(&self, job: &DueJob, recipients: &[String]) -> FanOutReport {
        let message = format!(
            "Reminder: '{}' starts on {}",
            job.title,
            job.start_date.format("%Y-%m-%d %H:%M UTC")
        );
        self.fan_out(
            recipients,
            NotificationType::JobReminder,
            &message,
            Some(&job.issue_slug),
        )
        .await
    }

    async fn recipient(&self, user_id: &str) -> Option<User> {
        match self.users.find_by_id(user_id).await {
            Ok(Some(user)) => Some(user),
            Ok(None) => {
                tracing::debug!("No profile for {}, skipping email", user_id);
                None
            }
            Err(e) => {
                tracing::warn!("Failed to load profile {} for email: {}", user_id, e);
                None
            }
        }
    }

    async fn send_email(
        &self,
        to: &str,
        subject: String,
        body: Result<String, TemplateError>,
    ) -> bool {
        if !self.email.is_enabled() {
            tracing::debug!("Email disabled, not sending '{}'", subject);
            return false;
        }

        let body = match body {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("Failed to render email '{}': {}", subject, e);
                return false;
            }
        };

        let message = EmailMessage {
            to: to.to_string(),
            subject,
            body,
        };
        match self.email.send(&message).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to send email to {}: {}", to, e);
                false
            }
        }
    }
}

fn issue_picked_message(issue_title: &str, ngo_name: &str) -> String {
    format!(
        "Your issue '{}' has been picked up by {}",
        issue_title, ngo_name
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{lazy_pool, test_dispatcher};

    #[test]
    fn test_issue_picked_message() {
        assert_eq!(
            issue_picked_message("Broken streetlight", "Light Up"),
            "Your issue 'Broken streetlight' has been picked up by Light Up"
        );
    }

    #[tokio::test]
    async fn test_fan_out_to_nobody() {
        let dispatcher = test_dispatcher(lazy_pool());
        let report = dispatcher
            .fan_out(&[], NotificationType::IssuePicked, "hello", None)
            .await;
        assert_eq!(report, FanOutReport::default());
    }

    #[tokio::test]
    async fn test_fan_out_counts_each_failure() {
        // lazy pool points at a closed port, so every insert fails
        let dispatcher = test_dispatcher(lazy_pool());
        let recipients = vec!["a".to_string(), "b".to_string()];
        let report = dispatcher
            .fan_out(&recipients, NotificationType::JobReminder, "soon", Some("x"))
            .await;

        assert_eq!(
            report,
            FanOutReport {
                recipients: 2,
                delivered: 0,
                failed: 2
            }
        );
    }

    #[tokio::test]
    async fn test_disabled_email_is_not_sent() {
        let dispatcher = test_dispatcher(lazy_pool());
        let sent = dispatcher
            .send_email("a@example.org", "Hi".to_string(), Ok("body".to_string()))
            .await;
        assert!(!sent);
    }
}
