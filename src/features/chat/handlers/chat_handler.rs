use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::Result;
use crate::core::extractor::{AppJson, AppQuery};
use crate::features::auth::guards::RequireAdmin;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::chat::dtos::{
    ArchiveChatQuery, ArchiveChatResultDto, ChatHistoryQuery, ChatMessageResponseDto,
    SendChatMessageDto,
};
use crate::features::chat::services::ChatService;
use crate::shared::types::{ApiResponse, Meta};

#[utoipa::path(
    get,
    path = "/api/chat/{issue_id}",
    params(
        ("issue_id" = Uuid, Path, description = "Issue ID"),
        ChatHistoryQuery
    ),
    responses(
        (status = 200, description = "Messages, newest first", body = ApiResponse<Vec<ChatMessageResponseDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Issue not found")
    ),
    tag = "chat",
    security(("bearer_auth" = []))
)]
pub async fn get_messages(
    _user: AuthenticatedUser,
    State(service): State<Arc<ChatService>>,
    Path(issue_id): Path<Uuid>,
    AppQuery(query): AppQuery<ChatHistoryQuery>,
) -> Result<Json<ApiResponse<Vec<ChatMessageResponseDto>>>> {
    let (messages, total) = service.history(issue_id, &query).await?;
    let dtos: Vec<ChatMessageResponseDto> = messages.into_iter().map(|m| m.into()).collect();

    Ok(Json(ApiResponse::success(
        Some(dtos),
        None,
        Some(Meta::paged(total, &query.pagination())),
    )))
}

#[utoipa::path(
    post,
    path = "/api/chat/{issue_id}",
    params(("issue_id" = Uuid, Path, description = "Issue ID")),
    request_body = SendChatMessageDto,
    responses(
        (status = 200, description = "Message sent", body = ApiResponse<ChatMessageResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Issue not found")
    ),
    tag = "chat",
    security(("bearer_auth" = []))
)]
pub async fn send_message(
    user: AuthenticatedUser,
    State(service): State<Arc<ChatService>>,
    Path(issue_id): Path<Uuid>,
    AppJson(dto): AppJson<SendChatMessageDto>,
) -> Result<Json<ApiResponse<ChatMessageResponseDto>>> {
    dto.validate()?;

    let message = service.send(issue_id, &user, &dto.message).await?;
    Ok(Json(ApiResponse::success(
        Some(message.into()),
        Some("Message sent".to_string()),
        None,
    )))
}

/// Archive old messages across all issues
#[utoipa::path(
    post,
    path = "/api/admin/chat/archive",
    params(ArchiveChatQuery),
    responses(
        (status = 200, description = "Messages archived", body = ApiResponse<ArchiveChatResultDto>),
        (status = 400, description = "Invalid age"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin access required")
    ),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn archive_messages(
    RequireAdmin(user): RequireAdmin,
    State(service): State<Arc<ChatService>>,
    AppQuery(query): AppQuery<ArchiveChatQuery>,
) -> Result<Json<ApiResponse<ArchiveChatResultDto>>> {
    let archived = service.archive_older_than(query.days_old).await?;
    tracing::info!(
        "Admin {} archived {} chat messages older than {} days",
        user.sub,
        archived,
        query.days_old
    );

    Ok(Json(ApiResponse::success(
        Some(ArchiveChatResultDto {
            archived,
            days_old: query.days_old,
        }),
        Some(format!("Archived {} messages", archived)),
        None,
    )))
}
