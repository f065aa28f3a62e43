use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use validator::Validate;

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::users::dtos::{NgoResponseDto, UpsertProfileDto, UserResponseDto};
use crate::features::users::services::UserService;
use crate::shared::types::{ApiResponse, Meta};

#[utoipa::path(
    get,
    path = "/api/users/me",
    responses(
        (status = 200, description = "Profile retrieved successfully", body = ApiResponse<UserResponseDto>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Profile not created yet")
    ),
    tag = "users",
    security(("bearer_auth" = []))
)]
pub async fn get_me(
    user: AuthenticatedUser,
    State(service): State<Arc<UserService>>,
) -> Result<Json<ApiResponse<UserResponseDto>>> {
    let profile = service.get_by_id(&user.sub).await?;
    Ok(Json(ApiResponse::success(Some(profile.into()), None, None)))
}

#[utoipa::path(
    put,
    path = "/api/users/me",
    request_body = UpsertProfileDto,
    responses(
        (status = 200, description = "Profile saved", body = ApiResponse<UserResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "users",
    security(("bearer_auth" = []))
)]
pub async fn upsert_me(
    user: AuthenticatedUser,
    State(service): State<Arc<UserService>>,
    AppJson(dto): AppJson<UpsertProfileDto>,
) -> Result<Json<ApiResponse<UserResponseDto>>> {
    dto.validate()?;

    let data = UserService::profile_from(&user, dto)?;
    let profile = service.upsert(&data).await?;
    Ok(Json(ApiResponse::success(
        Some(profile.into()),
        Some("Profile saved".to_string()),
        None,
    )))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(
        ("id" = String, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User found", body = ApiResponse<UserResponseDto>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found")
    ),
    tag = "users",
    security(("bearer_auth" = []))
)]
pub async fn get_user(
    _user: AuthenticatedUser,
    State(service): State<Arc<UserService>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<UserResponseDto>>> {
    let user = service.get_by_id(&id).await?;
    Ok(Json(ApiResponse::success(Some(user.into()), None, None)))
}

/// NGO directory with donation totals
#[utoipa::path(
    get,
    path = "/api/ngos",
    responses(
        (status = 200, description = "List of NGOs", body = ApiResponse<Vec<NgoResponseDto>>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "users",
    security(("bearer_auth" = []))
)]
pub async fn list_ngos(
    _user: AuthenticatedUser,
    State(service): State<Arc<UserService>>,
) -> Result<Json<ApiResponse<Vec<NgoResponseDto>>>> {
    let ngos = service.list_ngos().await?;
    let total = ngos.len() as i64;
    let dtos: Vec<NgoResponseDto> = ngos.into_iter().map(|u| u.into()).collect();
    Ok(Json(ApiResponse::success(Some(dtos), None, Some(Meta::total(total)))))
}
