use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::core::error::{AppError, Result};

/// Job status enum matching database enum
///
/// ```text
/// Assigned --submit_proof--> ProofSubmitted --review--> Completed
///                                           --review--> Rejected --submit_proof--> ProofSubmitted
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "job_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Assigned,
    ProofSubmitted,
    Completed,
    Rejected,
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Assigned => write!(f, "assigned"),
            JobStatus::ProofSubmitted => write!(f, "proof_submitted"),
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// Outcome of reviewing submitted proof
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    Approve,
    Reject,
}

/// Database model for job: a task an issue's NGO hands to one volunteer
#[derive(Debug, Clone, FromRow)]
pub struct Job {
    pub id: Uuid,
    pub issue_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub assigned_to: String,
    pub created_by: String,
    pub start_date: DateTime<Utc>,
    pub status: JobStatus,
    pub proof_url: Option<String>,
    pub proof_note: Option<String>,
    pub review_note: Option<String>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub reminder_sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data for creating a job
#[derive(Debug, Clone)]
pub struct CreateJob {
    pub issue_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub assigned_to: String,
    pub created_by: String,
    pub start_date: DateTime<Utc>,
}

/// Job due for a reminder, with the location of its issue
#[derive(Debug, Clone, FromRow)]
pub struct DueJob {
    pub id: Uuid,
    pub title: String,
    pub start_date: DateTime<Utc>,
    pub issue_slug: String,
    pub location: String,
}

impl Job {
    /// Volunteer hands in proof. Allowed first time and after a rejection.
    pub fn submit_proof(
        &mut self,
        proof_url: String,
        proof_note: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<()> {
        match self.status {
            JobStatus::Assigned | JobStatus::Rejected => {}
            other => {
                return Err(AppError::InvalidState(format!(
                    "Job is {} and does not accept proof",
                    other
                )))
            }
        }

        self.status = JobStatus::ProofSubmitted;
        self.proof_url = Some(proof_url);
        self.proof_note = proof_note;
        self.submitted_at = Some(now);
        Ok(())
    }

    pub fn review(
        &mut self,
        decision: ReviewDecision,
        note: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<()> {
        if self.status != JobStatus::ProofSubmitted {
            return Err(AppError::InvalidState(format!(
                "Job is {} and has no proof to review",
                self.status
            )));
        }

        self.status = match decision {
            ReviewDecision::Approve => JobStatus::Completed,
            ReviewDecision::Reject => JobStatus::Rejected,
        };
        self.review_note = note;
        self.reviewed_at = Some(now);
        Ok(())
    }

    pub fn ensure_assignee(&self, user_id: &str) -> Result<()> {
        if self.assigned_to != user_id {
            return Err(AppError::Forbidden(
                "Only the assigned volunteer can submit proof".to_string(),
            ));
        }
        Ok(())
    }
}

/// End of the reminder window starting at `now`
pub fn reminder_window_end(now: DateTime<Utc>, window_days: i64) -> Result<DateTime<Utc>> {
    if window_days < 1 {
        return Err(AppError::Validation(
            "window_days: must be at least 1".to_string(),
        ));
    }
    Duration::try_days(window_days)
        .and_then(|window| now.checked_add_signed(window))
        .ok_or_else(|| AppError::Validation("window_days: out of range".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job() -> Job {
        let now = Utc::now();
        Job {
            id: Uuid::now_v7(),
            issue_id: Uuid::now_v7(),
            title: "Clear the drain".to_string(),
            description: None,
            assigned_to: "volunteer-1".to_string(),
            created_by: "ngo-1".to_string(),
            start_date: now,
            status: JobStatus::Assigned,
            proof_url: None,
            proof_note: None,
            review_note: None,
            submitted_at: None,
            reviewed_at: None,
            reminder_sent_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_proof_then_approve() {
        let mut job = job();
        job.submit_proof("https://img.example.org/1.jpg".into(), None, Utc::now())
            .unwrap();
        assert_eq!(job.status, JobStatus::ProofSubmitted);

        job.review(ReviewDecision::Approve, Some("Great".into()), Utc::now())
            .unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert!(job.reviewed_at.is_some());
    }

    #[test]
    fn test_rejected_job_accepts_new_proof() {
        let mut job = job();
        job.submit_proof("https://img.example.org/1.jpg".into(), None, Utc::now())
            .unwrap();
        job.review(ReviewDecision::Reject, None, Utc::now()).unwrap();
        assert_eq!(job.status, JobStatus::Rejected);

        job.submit_proof("https://img.example.org/2.jpg".into(), None, Utc::now())
            .unwrap();
        assert_eq!(job.status, JobStatus::ProofSubmitted);
        assert_eq!(job.proof_url.as_deref(), Some("https://img.example.org/2.jpg"));
    }

    #[test]
    fn test_completed_job_is_terminal() {
        let mut job = job();
        job.submit_proof("https://img.example.org/1.jpg".into(), None, Utc::now())
            .unwrap();
        job.review(ReviewDecision::Approve, None, Utc::now()).unwrap();

        let err = job
            .submit_proof("https://img.example.org/2.jpg".into(), None, Utc::now())
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));
        assert!(matches!(
            job.review(ReviewDecision::Reject, None, Utc::now()),
            Err(AppError::InvalidState(_))
        ));
    }

    #[test]
    fn test_review_needs_proof() {
        let mut job = job();
        let err = job
            .review(ReviewDecision::Approve, None, Utc::now())
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));
        assert_eq!(job.status, JobStatus::Assigned);
    }

    #[test]
    fn test_only_assignee_submits() {
        let job = job();
        assert!(job.ensure_assignee("volunteer-1").is_ok());
        assert!(matches!(
            job.ensure_assignee("someone-else"),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn test_reminder_window_end() {
        let now = Utc::now();
        assert_eq!(reminder_window_end(now, 2).unwrap(), now + Duration::days(2));

        for window in [0, -3, i64::MAX] {
            assert!(matches!(
                reminder_window_end(now, window),
                Err(AppError::Validation(_))
            ));
        }
    }
}
