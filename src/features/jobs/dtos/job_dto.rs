use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::jobs::models::{Job, JobStatus, ReviewDecision};
use crate::features::notifications::dtos::DispatchOutcome;

/// Response DTO for job
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct JobResponseDto {
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Job> for JobResponseDto {
    fn from(job: Job) -> Self {
        Self {
            id: job.id,
            issue_id: job.issue_id,
            title: job.title,
            description: job.description,
            assigned_to: job.assigned_to,
            created_by: job.created_by,
            start_date: job.start_date,
            status: job.status,
            proof_url: job.proof_url,
            proof_note: job.proof_note,
            review_note: job.review_note,
            submitted_at: job.submitted_at,
            reviewed_at: job.reviewed_at,
            created_at: job.created_at,
            updated_at: job.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateJobDto {
    pub issue_id: Uuid,

    #[validate(length(min = 3, max = 200, message = "Title must be 3-200 characters"))]
    pub title: String,

    #[validate(length(max = 5000, message = "Description must not exceed 5000 characters"))]
    pub description: Option<String>,

    /// Volunteer the job is given to
    #[validate(length(min = 1, message = "Assignee is required"))]
    pub assigned_to: String,

    pub start_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateJobResponseDto {
    pub job: JobResponseDto,
    /// Outcome of the in-app notice and email to the volunteer
    pub notification: DispatchOutcome,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct SubmitProofDto {
    #[validate(url(message = "Proof URL must be a valid URL"))]
    pub proof_url: String,

    #[validate(length(max = 2000, message = "Note must not exceed 2000 characters"))]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ReviewJobDto {
    pub decision: ReviewDecision,

    #[validate(length(max = 2000, message = "Note must not exceed 2000 characters"))]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReviewJobResponseDto {
    pub job: JobResponseDto,
    pub volunteer_notified: bool,
}
