use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::Result;
use crate::core::extractor::{AppJson, AppQuery};
use crate::features::auth::guards::{RequireAdmin, RequireNgo};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::issues::dtos::{
    AddPositionsDto, AssignIssueDto, AssignIssueResponseDto, CreateIssueDto,
    DownvoteResponseDto, IssueListQuery, IssueResponseDto, RegisterVolunteerDto,
    SubmitFeedbackDto, WithdrawResponseDto,
};
use crate::features::issues::models::Feedback;
use crate::features::issues::services::IssueService;
use crate::shared::types::{ApiResponse, Meta};

#[derive(Clone)]
pub struct IssueState {
    pub service: Arc<IssueService>,
}

#[utoipa::path(
    post,
    path = "/api/issues",
    request_body = CreateIssueDto,
    responses(
        (status = 200, description = "Issue reported", body = ApiResponse<IssueResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Slug already taken")
    ),
    tag = "issues",
    security(("bearer_auth" = []))
)]
pub async fn create_issue(
    user: AuthenticatedUser,
    State(state): State<IssueState>,
    AppJson(dto): AppJson<CreateIssueDto>,
) -> Result<Json<ApiResponse<IssueResponseDto>>> {
    dto.validate()?;

    let issue = state.service.create(&user.sub, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(issue.into()),
        Some("Issue reported".to_string()),
        None,
    )))
}

#[utoipa::path(
    get,
    path = "/api/issues",
    params(IssueListQuery),
    responses(
        (status = 200, description = "List of issues", body = ApiResponse<Vec<IssueResponseDto>>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "issues",
    security(("bearer_auth" = []))
)]
pub async fn list_issues(
    _user: AuthenticatedUser,
    State(state): State<IssueState>,
    AppQuery(query): AppQuery<IssueListQuery>,
) -> Result<Json<ApiResponse<Vec<IssueResponseDto>>>> {
    let (issues, total) = state.service.list(&query).await?;
    let dtos: Vec<IssueResponseDto> = issues.into_iter().map(|i| i.into()).collect();

    Ok(Json(ApiResponse::success(
        Some(dtos),
        None,
        Some(Meta::paged(total, &query.pagination())),
    )))
}

#[utoipa::path(
    get,
    path = "/api/issues/{id}",
    params(("id" = Uuid, Path, description = "Issue ID")),
    responses(
        (status = 200, description = "Issue found", body = ApiResponse<IssueResponseDto>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Issue not found")
    ),
    tag = "issues",
    security(("bearer_auth" = []))
)]
pub async fn get_issue(
    _user: AuthenticatedUser,
    State(state): State<IssueState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<IssueResponseDto>>> {
    let issue = state.service.get_view(id).await?;
    Ok(Json(ApiResponse::success(Some(issue.into()), None, None)))
}

#[utoipa::path(
    get,
    path = "/api/issues/slug/{slug}",
    params(("slug" = String, Path, description = "Issue slug")),
    responses(
        (status = 200, description = "Issue found", body = ApiResponse<IssueResponseDto>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Issue not found")
    ),
    tag = "issues",
    security(("bearer_auth" = []))
)]
pub async fn get_issue_by_slug(
    _user: AuthenticatedUser,
    State(state): State<IssueState>,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<IssueResponseDto>>> {
    let issue = state.service.get_by_slug(&slug).await?;
    Ok(Json(ApiResponse::success(Some(issue.into()), None, None)))
}

#[utoipa::path(
    post,
    path = "/api/issues/{id}/upvote",
    params(("id" = Uuid, Path, description = "Issue ID")),
    responses(
        (status = 200, description = "Upvote recorded", body = ApiResponse<IssueResponseDto>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Issue not found"),
        (status = 409, description = "Already upvoted")
    ),
    tag = "issues",
    security(("bearer_auth" = []))
)]
pub async fn upvote_issue(
    user: AuthenticatedUser,
    State(state): State<IssueState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<IssueResponseDto>>> {
    let issue = state.service.upvote(id, &user.sub).await?;
    Ok(Json(ApiResponse::success(
        Some(issue.into()),
        Some("Upvote recorded".to_string()),
        None,
    )))
}

/// Toggle the caller's downvote
#[utoipa::path(
    post,
    path = "/api/issues/{id}/downvote",
    params(("id" = Uuid, Path, description = "Issue ID")),
    responses(
        (status = 200, description = "Downvote toggled", body = ApiResponse<DownvoteResponseDto>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Issue not found")
    ),
    tag = "issues",
    security(("bearer_auth" = []))
)]
pub async fn downvote_issue(
    user: AuthenticatedUser,
    State(state): State<IssueState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<DownvoteResponseDto>>> {
    let (issue, downvoted) = state.service.downvote(id, &user.sub).await?;
    let message = if downvoted {
        "Downvote recorded"
    } else {
        "Downvote removed"
    };

    Ok(Json(ApiResponse::success(
        Some(DownvoteResponseDto {
            downvoted,
            issue: issue.into(),
        }),
        Some(message.to_string()),
        None,
    )))
}

/// Claim an open issue for the calling NGO
#[utoipa::path(
    post,
    path = "/api/issues/{id}/assign",
    params(("id" = Uuid, Path, description = "Issue ID")),
    request_body = AssignIssueDto,
    responses(
        (status = 200, description = "Issue assigned", body = ApiResponse<AssignIssueResponseDto>),
        (status = 400, description = "Issue is not open"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "NGO access required"),
        (status = 404, description = "Issue or NGO profile not found")
    ),
    tag = "issues",
    security(("bearer_auth" = []))
)]
pub async fn assign_issue(
    RequireNgo(user): RequireNgo,
    State(state): State<IssueState>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<AssignIssueDto>,
) -> Result<Json<ApiResponse<AssignIssueResponseDto>>> {
    let (issue, notifications) = state.service.assign(id, &user, dto.deadline).await?;

    Ok(Json(ApiResponse::success(
        Some(AssignIssueResponseDto {
            issue: issue.into(),
            notifications,
        }),
        Some("Issue assigned".to_string()),
        None,
    )))
}

#[utoipa::path(
    post,
    path = "/api/issues/{id}/disclaim",
    params(("id" = Uuid, Path, description = "Issue ID")),
    responses(
        (status = 200, description = "Issue released", body = ApiResponse<IssueResponseDto>),
        (status = 400, description = "Issue is completed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the assigned NGO"),
        (status = 404, description = "Issue not found")
    ),
    tag = "issues",
    security(("bearer_auth" = []))
)]
pub async fn disclaim_issue(
    RequireNgo(user): RequireNgo,
    State(state): State<IssueState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<IssueResponseDto>>> {
    let issue = state.service.disclaim(id, &user).await?;
    Ok(Json(ApiResponse::success(
        Some(issue.into()),
        Some("Issue released".to_string()),
        None,
    )))
}

#[utoipa::path(
    post,
    path = "/api/issues/{id}/complete",
    params(("id" = Uuid, Path, description = "Issue ID")),
    responses(
        (status = 200, description = "Issue completed", body = ApiResponse<IssueResponseDto>),
        (status = 400, description = "Issue is not assigned"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the assigned NGO"),
        (status = 404, description = "Issue not found")
    ),
    tag = "issues",
    security(("bearer_auth" = []))
)]
pub async fn complete_issue(
    RequireNgo(user): RequireNgo,
    State(state): State<IssueState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<IssueResponseDto>>> {
    let issue = state.service.complete(id, &user).await?;
    Ok(Json(ApiResponse::success(
        Some(issue.into()),
        Some("Issue completed".to_string()),
        None,
    )))
}

/// Append volunteer positions. Every invalid position is reported at once.
#[utoipa::path(
    post,
    path = "/api/issues/{id}/positions",
    params(("id" = Uuid, Path, description = "Issue ID")),
    request_body = AddPositionsDto,
    responses(
        (status = 200, description = "Positions added", body = ApiResponse<IssueResponseDto>),
        (status = 400, description = "Validation error or issue not assigned"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the assigned NGO or a collaborator"),
        (status = 404, description = "Issue not found")
    ),
    tag = "issues",
    security(("bearer_auth" = []))
)]
pub async fn add_positions(
    user: AuthenticatedUser,
    State(state): State<IssueState>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<AddPositionsDto>,
) -> Result<Json<ApiResponse<IssueResponseDto>>> {
    let issue = state
        .service
        .add_volunteer_positions(id, &user, dto.positions)
        .await?;

    Ok(Json(ApiResponse::success(
        Some(issue.into()),
        Some("Volunteer positions added".to_string()),
        None,
    )))
}

#[utoipa::path(
    post,
    path = "/api/issues/{id}/register",
    params(("id" = Uuid, Path, description = "Issue ID")),
    request_body = RegisterVolunteerDto,
    responses(
        (status = 200, description = "Registered", body = ApiResponse<IssueResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Issue or position not found"),
        (status = 409, description = "Already registered or position full")
    ),
    tag = "issues",
    security(("bearer_auth" = []))
)]
pub async fn register_volunteer(
    user: AuthenticatedUser,
    State(state): State<IssueState>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<RegisterVolunteerDto>,
) -> Result<Json<ApiResponse<IssueResponseDto>>> {
    dto.validate()?;

    let issue = state
        .service
        .register_volunteer(id, &user.sub, dto.position.trim())
        .await?;

    Ok(Json(ApiResponse::success(
        Some(issue.into()),
        Some("Registered as volunteer".to_string()),
        None,
    )))
}

#[utoipa::path(
    post,
    path = "/api/issues/{id}/withdraw",
    params(("id" = Uuid, Path, description = "Issue ID")),
    responses(
        (status = 200, description = "Withdrawn", body = ApiResponse<WithdrawResponseDto>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Issue not found or not registered")
    ),
    tag = "issues",
    security(("bearer_auth" = []))
)]
pub async fn withdraw_volunteer(
    user: AuthenticatedUser,
    State(state): State<IssueState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<WithdrawResponseDto>>> {
    let (issue, position) = state.service.withdraw_volunteer(id, &user.sub).await?;

    Ok(Json(ApiResponse::success(
        Some(WithdrawResponseDto {
            position,
            issue: issue.into(),
        }),
        Some("Withdrawn from volunteer position".to_string()),
        None,
    )))
}

#[utoipa::path(
    post,
    path = "/api/issues/{id}/feedback",
    params(("id" = Uuid, Path, description = "Issue ID")),
    request_body = SubmitFeedbackDto,
    responses(
        (status = 200, description = "Feedback recorded", body = ApiResponse<IssueResponseDto>),
        (status = 400, description = "Validation error or issue not completed"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Issue not found"),
        (status = 409, description = "Feedback already submitted")
    ),
    tag = "issues",
    security(("bearer_auth" = []))
)]
pub async fn submit_feedback(
    user: AuthenticatedUser,
    State(state): State<IssueState>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<SubmitFeedbackDto>,
) -> Result<Json<ApiResponse<IssueResponseDto>>> {
    dto.validate()?;

    let feedback = dto.into_feedback(&user.sub, Utc::now());
    let issue = state.service.submit_feedback(id, feedback).await?;

    Ok(Json(ApiResponse::success(
        Some(issue.into()),
        Some("Feedback recorded".to_string()),
        None,
    )))
}

#[utoipa::path(
    get,
    path = "/api/issues/{id}/feedback",
    params(("id" = Uuid, Path, description = "Issue ID")),
    responses(
        (status = 200, description = "Feedback entries", body = ApiResponse<Vec<Feedback>>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Issue not found")
    ),
    tag = "issues",
    security(("bearer_auth" = []))
)]
pub async fn list_feedback(
    _user: AuthenticatedUser,
    State(state): State<IssueState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<Feedback>>>> {
    let feedback = state.service.list_feedback(id).await?;
    let total = feedback.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(feedback),
        None,
        Some(Meta::total(total)),
    )))
}

#[utoipa::path(
    delete,
    path = "/api/admin/issues/{id}",
    params(("id" = Uuid, Path, description = "Issue ID")),
    responses(
        (status = 200, description = "Issue deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Issue not found")
    ),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn delete_issue(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<IssueState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    state.service.delete(id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Issue deleted".to_string()),
        None,
    )))
}
