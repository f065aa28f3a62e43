use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::auth::guards::RequireNgo;
use crate::features::collaborations::dtos::{
    CollaborationResponseDto, RespondCollaborationDto, RespondOutcomeDto,
    SendCollaborationRequestDto,
};
use crate::features::collaborations::services::CollaborationService;
use crate::shared::types::{ApiResponse, Meta};

#[utoipa::path(
    post,
    path = "/api/collaboration/request",
    request_body = SendCollaborationRequestDto,
    responses(
        (status = 200, description = "Request sent", body = ApiResponse<CollaborationResponseDto>),
        (status = 400, description = "Validation error or issue not assigned"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "NGO access required"),
        (status = 404, description = "Issue or NGO not found"),
        (status = 409, description = "Request already pending")
    ),
    tag = "collaborations",
    security(("bearer_auth" = []))
)]
pub async fn send_request(
    RequireNgo(user): RequireNgo,
    State(service): State<Arc<CollaborationService>>,
    AppJson(dto): AppJson<SendCollaborationRequestDto>,
) -> Result<Json<ApiResponse<CollaborationResponseDto>>> {
    dto.validate()?;

    let collaboration = service.send_request(&user, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(collaboration.into()),
        Some("Collaboration request sent".to_string()),
        None,
    )))
}

/// Accept or reject a request addressed to the caller
#[utoipa::path(
    patch,
    path = "/api/collaboration/request/{id}/respond",
    params(("id" = Uuid, Path, description = "Collaboration request ID")),
    request_body = RespondCollaborationDto,
    responses(
        (status = 200, description = "Response recorded", body = ApiResponse<RespondOutcomeDto>),
        (status = 400, description = "Invalid decision"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "NGO access required"),
        (status = 404, description = "No pending request for the caller")
    ),
    tag = "collaborations",
    security(("bearer_auth" = []))
)]
pub async fn respond_to_request(
    RequireNgo(user): RequireNgo,
    State(service): State<Arc<CollaborationService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<RespondCollaborationDto>,
) -> Result<Json<ApiResponse<RespondOutcomeDto>>> {
    let (collaboration, issue_updated) = service.respond(id, &user, dto.decision).await?;
    let message = format!("Collaboration request {}", collaboration.status);

    Ok(Json(ApiResponse::success(
        Some(RespondOutcomeDto {
            collaboration: collaboration.into(),
            issue_updated,
        }),
        Some(message),
        None,
    )))
}

#[utoipa::path(
    get,
    path = "/api/collaboration/requests/incoming",
    responses(
        (status = 200, description = "Requests addressed to the caller", body = ApiResponse<Vec<CollaborationResponseDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "NGO access required")
    ),
    tag = "collaborations",
    security(("bearer_auth" = []))
)]
pub async fn list_incoming(
    RequireNgo(user): RequireNgo,
    State(service): State<Arc<CollaborationService>>,
) -> Result<Json<ApiResponse<Vec<CollaborationResponseDto>>>> {
    let requests = service.list_incoming(&user.sub).await?;
    let total = requests.len() as i64;
    let dtos: Vec<CollaborationResponseDto> = requests.into_iter().map(|c| c.into()).collect();

    Ok(Json(ApiResponse::success(
        Some(dtos),
        None,
        Some(Meta::total(total)),
    )))
}

#[utoipa::path(
    get,
    path = "/api/collaboration/requests/outgoing",
    responses(
        (status = 200, description = "Requests sent by the caller", body = ApiResponse<Vec<CollaborationResponseDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "NGO access required")
    ),
    tag = "collaborations",
    security(("bearer_auth" = []))
)]
pub async fn list_outgoing(
    RequireNgo(user): RequireNgo,
    State(service): State<Arc<CollaborationService>>,
) -> Result<Json<ApiResponse<Vec<CollaborationResponseDto>>>> {
    let requests = service.list_outgoing(&user.sub).await?;
    let total = requests.len() as i64;
    let dtos: Vec<CollaborationResponseDto> = requests.into_iter().map(|c| c.into()).collect();

    Ok(Json(ApiResponse::success(
        Some(dtos),
        None,
        Some(Meta::total(total)),
    )))
}
