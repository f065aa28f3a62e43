use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::core::database::is_unique_violation;
use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::collaborations::dtos::SendCollaborationRequestDto;
use crate::features::collaborations::models::{
    Collaboration, CollaborationDecision, CollaborationStatus, CreateCollaboration,
};
use crate::features::issues::models::{Collaborator, IssueStatus};
use crate::features::issues::IssueService;
use crate::features::notifications::models::NotificationType;
use crate::features::notifications::services::NotificationDispatcher;
use crate::features::users::UserService;

/// Service for NGO-to-NGO collaboration requests on assigned issues
pub struct CollaborationService {
    pool: PgPool,
    issues: Arc<IssueService>,
    users: Arc<UserService>,
    dispatcher: Arc<NotificationDispatcher>,
}

impl CollaborationService {
    pub fn new(
        pool: PgPool,
        issues: Arc<IssueService>,
        users: Arc<UserService>,
        dispatcher: Arc<NotificationDispatcher>,
    ) -> Self {
        Self {
            pool,
            issues,
            users,
            dispatcher,
        }
    }

    /// Invite another NGO onto an issue; the invited NGO is notified
    pub async fn send_request(
        &self,
        requester: &AuthenticatedUser,
        dto: SendCollaborationRequestDto,
    ) -> Result<Collaboration> {
        let data = CreateCollaboration::new(dto.issue_id, &requester.sub, &dto.ngo_id, dto.message)?;

        let issue = self.issues.get_by_id(data.issue_id).await?;
        if issue.status != IssueStatus::Assigned {
            return Err(AppError::InvalidState(format!(
                "Issue is {}; collaborators can only join assigned issues",
                issue.status
            )));
        }
        self.users.find_ngo(&data.requested_to).await?;

        let collaboration = sqlx::query_as::<_, Collaboration>(
            r#"
            INSERT INTO collaborations (id, issue_id, requested_by, requested_to, message)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(data.issue_id)
        .bind(&data.requested_by)
        .bind(&data.requested_to)
        .bind(&data.message)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                return AppError::Conflict(
                    "A pending request to this NGO already exists for this issue".to_string(),
                );
            }
            tracing::error!("Failed to create collaboration request: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::info!(
            "Collaboration request {} on issue {}: {} -> {}",
            collaboration.id,
            collaboration.issue_id,
            collaboration.requested_by,
            collaboration.requested_to
        );

        let requester_name = requester.name.as_deref().unwrap_or("An NGO");
        let message = format!(
            "{} invited you to collaborate on \"{}\"",
            requester_name, issue.title
        );
        self.dispatcher
            .notify(
                &collaboration.requested_to,
                NotificationType::CollaborationRequest,
                &message,
                Some(&issue.slug),
            )
            .await;

        Ok(collaboration)
    }

    /// Accept or reject a pending request addressed to `responder`.
    ///
    /// On accept the issue's collaborator list is updated before the request
    /// leaves `pending`, so a retry after a partial failure is safe. An accept
    /// on an issue that is no longer assigned is refused and the request stays
    /// pending.
    pub async fn respond(
        &self,
        id: Uuid,
        responder: &AuthenticatedUser,
        decision: CollaborationDecision,
    ) -> Result<(Collaboration, bool)> {
        let pending = self.find_pending(id, &responder.sub).await?;

        let issue_updated = match decision {
            CollaborationDecision::Accepted => {
                let name = match self.users.find_by_id(&responder.sub).await? {
                    Some(profile) => profile.name,
                    None => responder.name.clone().unwrap_or_default(),
                };
                self.issues
                    .add_collaborator(
                        pending.issue_id,
                        Collaborator {
                            id: responder.sub.clone(),
                            name,
                        },
                    )
                    .await?
            }
            CollaborationDecision::Rejected => false,
        };

        let status = CollaborationStatus::from(decision);
        let collaboration = sqlx::query_as::<_, Collaboration>(
            r#"
            UPDATE collaborations
            SET status = $2, responded_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update collaboration {}: {:?}", id, e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound(format!("No pending collaboration request {}", id)))?;

        tracing::info!("Collaboration request {} {}", id, status);

        let message = format!(
            "{} {} your collaboration request",
            responder.name.as_deref().unwrap_or("The NGO"),
            status
        );
        let slug = self
            .issues
            .get_by_id(collaboration.issue_id)
            .await
            .ok()
            .map(|issue| issue.slug);
        self.dispatcher
            .notify(
                &collaboration.requested_by,
                NotificationType::CollaborationResponse,
                &message,
                slug.as_deref(),
            )
            .await;

        Ok((collaboration, issue_updated))
    }

    async fn find_pending(&self, id: Uuid, responder_id: &str) -> Result<Collaboration> {
        sqlx::query_as::<_, Collaboration>(
            r#"
            SELECT * FROM collaborations
            WHERE id = $1 AND requested_to = $2 AND status = 'pending'
            "#,
        )
        .bind(id)
        .bind(responder_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get collaboration request: {:?}", e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound(format!("No pending collaboration request {}", id)))
    }

    /// Requests addressed to `ngo_id`, newest first
    pub async fn list_incoming(&self, ngo_id: &str) -> Result<Vec<Collaboration>> {
        sqlx::query_as::<_, Collaboration>(
            "SELECT * FROM collaborations WHERE requested_to = $1 ORDER BY created_at DESC",
        )
        .bind(ngo_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list incoming collaborations: {:?}", e);
            AppError::Database(e)
        })
    }

    /// Requests sent by `ngo_id`, newest first
    pub async fn list_outgoing(&self, ngo_id: &str) -> Result<Vec<Collaboration>> {
        sqlx::query_as::<_, Collaboration>(
            "SELECT * FROM collaborations WHERE requested_by = $1 ORDER BY created_at DESC",
        )
        .bind(ngo_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list outgoing collaborations: {:?}", e);
            AppError::Database(e)
        })
    }
}
