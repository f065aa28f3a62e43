use chrono::Utc;
use sqlx::{PgConnection, PgPool};
use std::sync::Arc;
use uuid::Uuid;

use crate::core::database::is_unique_violation;
use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::issues::dtos::{CreateIssueDto, IssueListQuery};
use crate::features::issues::models::{
    Collaborator, CreateIssue, Feedback, Issue, IssueStatus, IssueView,
};
use crate::features::notifications::dtos::FanOutReport;
use crate::features::notifications::services::NotificationDispatcher;
use crate::features::users::services::UserService;
use crate::shared::validation::{slug_with_suffix, slugify};
use crate::shared::volunteer_roster::NewVolunteerPosition;

/// Issue row plus the assigned NGO's name, for statements returning `issues.*`
const VIEW_FROM_CTE: &str = r#"
    SELECT changed.*, u.name AS assigned_ngo_name
    FROM changed
    LEFT JOIN users u ON u.id = changed.assigned_to
"#;

/// Service for the issue lifecycle.
///
/// Every mutation runs in one transaction: the row is locked with
/// `SELECT ... FOR UPDATE`, a method on [`Issue`] applies the change, and the
/// row is written back. Concurrent registrations for the last slot therefore
/// serialise and only one succeeds.
pub struct IssueService {
    pool: PgPool,
    users: Arc<UserService>,
    dispatcher: Arc<NotificationDispatcher>,
}

impl IssueService {
    pub fn new(
        pool: PgPool,
        users: Arc<UserService>,
        dispatcher: Arc<NotificationDispatcher>,
    ) -> Self {
        Self {
            pool,
            users,
            dispatcher,
        }
    }

    // =========================================================================
    // READS
    // =========================================================================

    pub async fn create(&self, reporter_id: &str, dto: CreateIssueDto) -> Result<IssueView> {
        let id = Uuid::now_v7();
        let slug = self.unique_slug(&dto.title, id).await?;

        let issue = Issue::new(
            id,
            slug,
            CreateIssue {
                title: dto.title.trim().to_string(),
                tags: normalize_tags(dto.tags),
                content: dto.content,
                media: dto.media,
                location: dto.location.trim().to_string(),
                reported_by: reporter_id.to_string(),
            },
            Utc::now(),
        );

        let query = format!(
            r#"
            WITH changed AS (
                INSERT INTO issues (
                    id, slug, title, tags, content, media, location, reported_by,
                    status, upvoters, downvoters, is_flagged,
                    volunteer_positions, collaborators, feedback, created_at, updated_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $16)
                RETURNING *
            )
            {}
            "#,
            VIEW_FROM_CTE
        );

        let view = sqlx::query_as::<_, IssueView>(&query)
            .bind(issue.id)
            .bind(&issue.slug)
            .bind(&issue.title)
            .bind(&issue.tags)
            .bind(&issue.content)
            .bind(&issue.media)
            .bind(&issue.location)
            .bind(&issue.reported_by)
            .bind(issue.status)
            .bind(&issue.upvoters)
            .bind(&issue.downvoters)
            .bind(issue.is_flagged)
            .bind(&issue.volunteer_positions)
            .bind(&issue.collaborators)
            .bind(&issue.feedback)
            .bind(issue.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    return AppError::Conflict("An issue with this slug already exists".to_string());
                }
                tracing::error!("Failed to create issue: {:?}", e);
                AppError::Database(e)
            })?;

        tracing::info!(
            "Created issue: {} ({}) reported by {}",
            view.issue.id,
            view.issue.slug,
            reporter_id
        );
        Ok(view)
    }

    /// Slug from the title; an id-based suffix is added when the plain slug is taken
    async fn unique_slug(&self, title: &str, id: Uuid) -> Result<String> {
        let suffix = id.simple().to_string()[..8].to_string();
        let base = slugify(title);
        if base.is_empty() {
            return Ok(suffix);
        }

        let taken: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM issues WHERE slug = $1)")
            .bind(&base)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to check issue slug: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(if taken {
            slug_with_suffix(title, &suffix)
        } else {
            base
        })
    }

    /// Filtered page of issues, newest first, with total count
    pub async fn list(&self, query: &IssueListQuery) -> Result<(Vec<IssueView>, i64)> {
        const FILTER: &str = r#"
            ($1::issue_status IS NULL OR i.status = $1)
            AND ($2::text IS NULL OR $2 = ANY(i.tags))
            AND ($3::text IS NULL OR i.location ILIKE '%' || $3 || '%')
            AND ($4::boolean IS NULL OR i.is_flagged = $4)
        "#;

        let pagination = query.pagination();
        let tag = query.tag.as_deref().map(|t| t.trim().to_lowercase());

        let issues = sqlx::query_as::<_, IssueView>(&format!(
            r#"
            SELECT i.*, u.name AS assigned_ngo_name
            FROM issues i
            LEFT JOIN users u ON u.id = i.assigned_to
            WHERE {}
            ORDER BY i.created_at DESC, i.id DESC
            LIMIT $5 OFFSET $6
            "#,
            FILTER
        ))
        .bind(query.status)
        .bind(&tag)
        .bind(&query.location)
        .bind(query.flagged)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list issues: {:?}", e);
            AppError::Database(e)
        })?;

        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM issues i WHERE {}", FILTER))
                .bind(query.status)
                .bind(&tag)
                .bind(&query.location)
                .bind(query.flagged)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to count issues: {:?}", e);
                    AppError::Database(e)
                })?;

        Ok((issues, total))
    }

    pub async fn get_view(&self, id: Uuid) -> Result<IssueView> {
        sqlx::query_as::<_, IssueView>(
            r#"
            SELECT i.*, u.name AS assigned_ngo_name
            FROM issues i
            LEFT JOIN users u ON u.id = i.assigned_to
            WHERE i.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get issue: {:?}", e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound(format!("Issue {} not found", id)))
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<IssueView> {
        sqlx::query_as::<_, IssueView>(
            r#"
            SELECT i.*, u.name AS assigned_ngo_name
            FROM issues i
            LEFT JOIN users u ON u.id = i.assigned_to
            WHERE i.slug = $1
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get issue by slug: {:?}", e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound(format!("Issue '{}' not found", slug)))
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Issue> {
        self.get_view(id).await.map(|v| v.issue)
    }

    pub async fn list_feedback(&self, id: Uuid) -> Result<Vec<Feedback>> {
        Ok(self.get_by_id(id).await?.feedback.0)
    }

    // =========================================================================
    // MUTATIONS
    // =========================================================================

    /// Lock the issue, apply `change`, write it back. Nothing is written when
    /// `change` fails.
    async fn mutate<R, F>(&self, id: Uuid, change: F) -> Result<(IssueView, R)>
    where
        F: FnOnce(&mut Issue) -> Result<R>,
    {
        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin transaction: {:?}", e);
            AppError::Database(e)
        })?;

        let mut issue = Self::lock(&mut tx, id).await?;
        let outcome = change(&mut issue)?;
        let view = Self::save(&mut tx, &issue).await?;

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit issue {}: {:?}", id, e);
            AppError::Database(e)
        })?;

        Ok((view, outcome))
    }

    async fn lock(conn: &mut PgConnection, id: Uuid) -> Result<Issue> {
        sqlx::query_as::<_, Issue>("SELECT * FROM issues WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(conn)
            .await
            .map_err(|e| {
                tracing::error!("Failed to lock issue: {:?}", e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound(format!("Issue {} not found", id)))
    }

    async fn save(conn: &mut PgConnection, issue: &Issue) -> Result<IssueView> {
        let query = format!(
            r#"
            WITH changed AS (
                UPDATE issues
                SET status = $2, assigned_to = $3, deadline = $4,
                    upvoters = $5, downvoters = $6, is_flagged = $7,
                    volunteer_positions = $8, collaborators = $9, feedback = $10,
                    completed_at = $11, updated_at = NOW()
                WHERE id = $1
                RETURNING *
            )
            {}
            "#,
            VIEW_FROM_CTE
        );

        sqlx::query_as::<_, IssueView>(&query)
            .bind(issue.id)
            .bind(issue.status)
            .bind(&issue.assigned_to)
            .bind(issue.deadline)
            .bind(&issue.upvoters)
            .bind(&issue.downvoters)
            .bind(issue.is_flagged)
            .bind(&issue.volunteer_positions)
            .bind(&issue.collaborators)
            .bind(&issue.feedback)
            .bind(issue.completed_at)
            .fetch_one(conn)
            .await
            .map_err(|e| {
                tracing::error!("Failed to save issue {}: {:?}", issue.id, e);
                AppError::Database(e)
            })
    }

    pub async fn upvote(&self, id: Uuid, user_id: &str) -> Result<IssueView> {
        let (view, _) = self.mutate(id, |issue| issue.upvote(user_id)).await?;
        Ok(view)
    }

    /// Toggle the caller's downvote; also reports whether it is now set
    pub async fn downvote(&self, id: Uuid, user_id: &str) -> Result<(IssueView, bool)> {
        let (view, downvoted) = self
            .mutate(id, |issue| Ok(issue.downvote(user_id)))
            .await?;

        if view.issue.is_flagged {
            tracing::info!("Issue {} is flagged for review", id);
        }
        Ok((view, downvoted))
    }

    /// Claim an open issue for the calling NGO, then notify the reporter and
    /// every upvoter. Notification failures do not undo the assignment.
    pub async fn assign(
        &self,
        id: Uuid,
        ngo: &AuthenticatedUser,
        deadline: Option<chrono::DateTime<Utc>>,
    ) -> Result<(IssueView, FanOutReport)> {
        if deadline.is_some_and(|d| d < Utc::now()) {
            return Err(AppError::Validation(
                "deadline: must not be in the past".to_string(),
            ));
        }

        let ngo_profile = self.users.find_ngo(&ngo.sub).await?;

        let (view, _) = self
            .mutate(id, |issue| issue.assign(&ngo.sub, deadline))
            .await?;
        tracing::info!("Issue {} assigned to NGO {}", id, ngo.sub);

        let report = self
            .dispatcher
            .notify_issue_picked(&view.issue, &ngo_profile.name)
            .await;

        Ok((view, report))
    }

    pub async fn disclaim(&self, id: Uuid, user: &AuthenticatedUser) -> Result<IssueView> {
        let (view, _) = self
            .mutate(id, |issue| {
                if issue.status == IssueStatus::Assigned {
                    issue.ensure_manager(user)?;
                }
                issue.disclaim()
            })
            .await?;

        tracing::info!("Issue {} disclaimed by {}", id, user.sub);
        Ok(view)
    }

    pub async fn complete(&self, id: Uuid, user: &AuthenticatedUser) -> Result<IssueView> {
        let (view, _) = self
            .mutate(id, |issue| {
                issue.ensure_manager(user)?;
                issue.complete(Utc::now())
            })
            .await?;

        tracing::info!("Issue {} completed by {}", id, user.sub);
        Ok(view)
    }

    pub async fn add_volunteer_positions(
        &self,
        id: Uuid,
        user: &AuthenticatedUser,
        positions: Vec<NewVolunteerPosition>,
    ) -> Result<IssueView> {
        let count = positions.len();
        let (view, _) = self
            .mutate(id, |issue| {
                issue.ensure_staff(user)?;
                issue.add_volunteer_positions(positions)
            })
            .await?;

        tracing::info!("Added {} volunteer positions to issue {}", count, id);
        Ok(view)
    }

    pub async fn register_volunteer(
        &self,
        id: Uuid,
        user_id: &str,
        position: &str,
    ) -> Result<IssueView> {
        let (view, _) = self
            .mutate(id, |issue| issue.register_volunteer(user_id, position))
            .await?;

        tracing::info!(
            "User {} registered for '{}' on issue {}",
            user_id,
            position,
            id
        );
        Ok(view)
    }

    /// Release the caller's slot; returns the position it was in
    pub async fn withdraw_volunteer(&self, id: Uuid, user_id: &str) -> Result<(IssueView, String)> {
        let (view, position) = self
            .mutate(id, |issue| issue.withdraw_volunteer(user_id))
            .await?;

        tracing::info!("User {} withdrew from '{}' on issue {}", user_id, position, id);
        Ok((view, position))
    }

    pub async fn submit_feedback(&self, id: Uuid, feedback: Feedback) -> Result<IssueView> {
        let user_id = feedback.user_id.clone();
        let (view, _) = self
            .mutate(id, |issue| issue.submit_feedback(feedback))
            .await?;

        tracing::info!("Feedback from {} recorded on issue {}", user_id, id);
        Ok(view)
    }

    /// Attach a collaborator to an assigned issue; `false` when already attached
    pub async fn add_collaborator(&self, id: Uuid, collaborator: Collaborator) -> Result<bool> {
        let (_, changed) = self
            .mutate(id, |issue| issue.admit_collaborator(collaborator))
            .await?;
        Ok(changed)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM issues WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete issue: {:?}", e);
                AppError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Issue {} not found", id)));
        }

        tracing::info!("Deleted issue {}", id);
        Ok(())
    }
}

/// Lowercased, trimmed, de-duplicated tags in submission order
fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().to_lowercase();
        if !tag.is_empty() && !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_tags() {
        let tags = normalize_tags(vec![
            " Water ".to_string(),
            "water".to_string(),
            "".to_string(),
            "Roads".to_string(),
        ]);
        assert_eq!(tags, vec!["water", "roads"]);
    }
}
