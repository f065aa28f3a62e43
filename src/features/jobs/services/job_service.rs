use chrono::Utc;
use sqlx::{PgConnection, PgPool};
use std::sync::Arc;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::issues::models::IssueStatus;
use crate::features::issues::IssueService;
use crate::features::jobs::dtos::{CreateJobDto, ReviewJobDto, SubmitProofDto};
use crate::features::jobs::models::{reminder_window_end, CreateJob, DueJob, Job, JobStatus};
use crate::features::notifications::dtos::DispatchOutcome;
use crate::features::notifications::models::NotificationType;
use crate::features::notifications::services::NotificationDispatcher;

/// Service for volunteer jobs on assigned issues
pub struct JobService {
    pool: PgPool,
    issues: Arc<IssueService>,
    dispatcher: Arc<NotificationDispatcher>,
}

impl JobService {
    pub fn new(
        pool: PgPool,
        issues: Arc<IssueService>,
        dispatcher: Arc<NotificationDispatcher>,
    ) -> Self {
        Self {
            pool,
            issues,
            dispatcher,
        }
    }

    /// Give a job to a volunteer, then notify them in-app and by email
    pub async fn create(
        &self,
        creator: &AuthenticatedUser,
        dto: CreateJobDto,
    ) -> Result<(Job, DispatchOutcome)> {
        let issue = self.issues.get_by_id(dto.issue_id).await?;
        if issue.status != IssueStatus::Assigned {
            return Err(AppError::InvalidState(format!(
                "Issue is {}; jobs can only be created on assigned issues",
                issue.status
            )));
        }
        issue.ensure_manager(creator)?;

        let data = CreateJob {
            issue_id: issue.id,
            title: dto.title.trim().to_string(),
            description: dto.description.filter(|d| !d.trim().is_empty()),
            assigned_to: dto.assigned_to.trim().to_string(),
            created_by: creator.sub.clone(),
            start_date: dto.start_date,
        };

        let job = sqlx::query_as::<_, Job>(
            r#"
            INSERT INTO jobs (id, issue_id, title, description, assigned_to, created_by, start_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(data.issue_id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(&data.assigned_to)
        .bind(&data.created_by)
        .bind(data.start_date)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create job: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::info!(
            "Created job {} on issue {} for volunteer {}",
            job.id,
            job.issue_id,
            job.assigned_to
        );

        let outcome = self.dispatcher.notify_task_assignment(&job, &issue).await;
        Ok((job, outcome))
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Job> {
        sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get job: {:?}", e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound(format!("Job {} not found", id)))
    }

    /// Caller's jobs, soonest first
    pub async fn list_for_volunteer(&self, user_id: &str) -> Result<Vec<Job>> {
        sqlx::query_as::<_, Job>(
            "SELECT * FROM jobs WHERE assigned_to = $1 ORDER BY start_date ASC, id ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list volunteer jobs: {:?}", e);
            AppError::Database(e)
        })
    }

    pub async fn list_for_issue(&self, issue_id: Uuid) -> Result<Vec<Job>> {
        sqlx::query_as::<_, Job>(
            "SELECT * FROM jobs WHERE issue_id = $1 ORDER BY start_date ASC, id ASC",
        )
        .bind(issue_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list issue jobs: {:?}", e);
            AppError::Database(e)
        })
    }

    pub async fn submit_proof(
        &self,
        id: Uuid,
        user: &AuthenticatedUser,
        dto: SubmitProofDto,
    ) -> Result<Job> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin transaction: {:?}", e);
            AppError::Database(e)
        })?;

        let mut job = Self::lock(&mut tx, id).await?;
        job.ensure_assignee(&user.sub)?;
        job.submit_proof(
            dto.proof_url,
            dto.note.filter(|n| !n.trim().is_empty()),
            Utc::now(),
        )?;
        let job = Self::save(&mut tx, &job).await?;

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit job {}: {:?}", id, e);
            AppError::Database(e)
        })?;

        tracing::info!("Proof submitted for job {} by {}", id, user.sub);
        Ok(job)
    }

    /// Approve or reject submitted proof; the volunteer is told either way
    pub async fn review(
        &self,
        id: Uuid,
        reviewer: &AuthenticatedUser,
        dto: ReviewJobDto,
    ) -> Result<(Job, bool)> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin transaction: {:?}", e);
            AppError::Database(e)
        })?;

        let mut job = Self::lock(&mut tx, id).await?;
        let issue = self.issues.get_by_id(job.issue_id).await?;
        issue.ensure_manager(reviewer)?;

        job.review(
            dto.decision,
            dto.note.filter(|n| !n.trim().is_empty()),
            Utc::now(),
        )?;
        let job = Self::save(&mut tx, &job).await?;

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit job {}: {:?}", id, e);
            AppError::Database(e)
        })?;

        tracing::info!("Job {} reviewed by {}: {}", id, reviewer.sub, job.status);

        let message = match job.status {
            JobStatus::Completed => format!("Your proof for '{}' was approved", job.title),
            _ => format!(
                "Your proof for '{}' was rejected; please submit it again",
                job.title
            ),
        };
        let notified = self
            .dispatcher
            .notify(
                &job.assigned_to,
                NotificationType::TaskUpdate,
                &message,
                Some(&issue.slug),
            )
            .await;

        Ok((job, notified))
    }

    /// Jobs starting within `window_days` that have not been reminded yet
    pub async fn find_due_reminders(&self, window_days: i64) -> Result<Vec<DueJob>> {
        let now = Utc::now();
        let until = reminder_window_end(now, window_days)?;

        sqlx::query_as::<_, DueJob>(
            r#"
            SELECT j.id, j.title, j.start_date, i.slug AS issue_slug, i.location
            FROM jobs j
            JOIN issues i ON i.id = j.issue_id
            WHERE j.start_date > $1
              AND j.start_date <= $2
              AND j.reminder_sent_at IS NULL
              AND j.status <> 'completed'
            ORDER BY j.start_date ASC
            "#,
        )
        .bind(now)
        .bind(until)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to find due job reminders: {:?}", e);
            AppError::Database(e)
        })
    }

    pub async fn mark_reminded(&self, id: Uuid) -> Result<()> {
        sqlx::query("UPDATE jobs SET reminder_sent_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to mark job reminded: {:?}", e);
                AppError::Database(e)
            })?;
        Ok(())
    }

    async fn lock(conn: &mut PgConnection, id: Uuid) -> Result<Job> {
        sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(conn)
            .await
            .map_err(|e| {
                tracing::error!("Failed to lock job: {:?}", e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound(format!("Job {} not found", id)))
    }

    async fn save(conn: &mut PgConnection, job: &Job) -> Result<Job> {
        sqlx::query_as::<_, Job>(
            r#"
            UPDATE jobs
            SET status = $2, proof_url = $3, proof_note = $4, review_note = $5,
                submitted_at = $6, reviewed_at = $7, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(job.id)
        .bind(job.status)
        .bind(&job.proof_url)
        .bind(&job.proof_note)
        .bind(&job.review_note)
        .bind(job.submitted_at)
        .bind(job.reviewed_at)
        .fetch_one(conn)
        .await
        .map_err(|e| {
            tracing::error!("Failed to save job {}: {:?}", job.id, e);
            AppError::Database(e)
        })
    }
}
