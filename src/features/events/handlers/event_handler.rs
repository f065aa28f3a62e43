use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::Result;
use crate::core::extractor::{AppJson, AppQuery};
use crate::features::auth::guards::RequireNgo;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::events::dtos::{
    AddEventPositionsDto, CreateEventDto, EventListQuery, EventRegistrationDto,
    EventResponseDto, EventWithdrawResponseDto, UpdateEventStatusDto,
};
use crate::features::events::services::EventService;
use crate::shared::types::{ApiResponse, Meta};

#[utoipa::path(
    post,
    path = "/api/events",
    request_body = CreateEventDto,
    responses(
        (status = 200, description = "Event created", body = ApiResponse<EventResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "NGO access required")
    ),
    tag = "events",
    security(("bearer_auth" = []))
)]
pub async fn create_event(
    RequireNgo(user): RequireNgo,
    State(service): State<Arc<EventService>>,
    AppJson(dto): AppJson<CreateEventDto>,
) -> Result<Json<ApiResponse<EventResponseDto>>> {
    dto.validate()?;

    let event = service.create(&user.sub, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(event.into()),
        Some("Event created".to_string()),
        None,
    )))
}

#[utoipa::path(
    get,
    path = "/api/events",
    params(EventListQuery),
    responses(
        (status = 200, description = "List of events", body = ApiResponse<Vec<EventResponseDto>>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "events",
    security(("bearer_auth" = []))
)]
pub async fn list_events(
    _user: AuthenticatedUser,
    State(service): State<Arc<EventService>>,
    AppQuery(query): AppQuery<EventListQuery>,
) -> Result<Json<ApiResponse<Vec<EventResponseDto>>>> {
    let (events, total) = service.list(&query).await?;
    let dtos: Vec<EventResponseDto> = events.into_iter().map(|e| e.into()).collect();

    Ok(Json(ApiResponse::success(
        Some(dtos),
        None,
        Some(Meta::paged(total, &query.pagination())),
    )))
}

#[utoipa::path(
    get,
    path = "/api/events/{slug}",
    params(("slug" = String, Path, description = "Event slug")),
    responses(
        (status = 200, description = "Event found", body = ApiResponse<EventResponseDto>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Event not found")
    ),
    tag = "events",
    security(("bearer_auth" = []))
)]
pub async fn get_event(
    _user: AuthenticatedUser,
    State(service): State<Arc<EventService>>,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<EventResponseDto>>> {
    let event = service.get_by_slug(&slug).await?;
    Ok(Json(ApiResponse::success(Some(event.into()), None, None)))
}

/// Move an event along its lifecycle; only the organizer may do this
#[utoipa::path(
    patch,
    path = "/api/events/{id}/status",
    params(("id" = Uuid, Path, description = "Event ID")),
    request_body = UpdateEventStatusDto,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<EventResponseDto>),
        (status = 400, description = "Transition not allowed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the organizer"),
        (status = 404, description = "Event not found")
    ),
    tag = "events",
    security(("bearer_auth" = []))
)]
pub async fn update_event_status(
    user: AuthenticatedUser,
    State(service): State<Arc<EventService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateEventStatusDto>,
) -> Result<Json<ApiResponse<EventResponseDto>>> {
    let event = service.update_status(id, &user, dto.status).await?;
    Ok(Json(ApiResponse::success(
        Some(event.into()),
        Some(format!("Event is now {}", dto.status)),
        None,
    )))
}

#[utoipa::path(
    post,
    path = "/api/events/{id}/positions",
    params(("id" = Uuid, Path, description = "Event ID")),
    request_body = AddEventPositionsDto,
    responses(
        (status = 200, description = "Positions added", body = ApiResponse<EventResponseDto>),
        (status = 400, description = "Invalid positions or event closed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the organizer"),
        (status = 404, description = "Event not found")
    ),
    tag = "events",
    security(("bearer_auth" = []))
)]
pub async fn add_event_positions(
    user: AuthenticatedUser,
    State(service): State<Arc<EventService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<AddEventPositionsDto>,
) -> Result<Json<ApiResponse<EventResponseDto>>> {
    let event = service
        .add_volunteer_positions(id, &user, dto.positions)
        .await?;

    Ok(Json(ApiResponse::success(
        Some(event.into()),
        Some("Volunteer positions added".to_string()),
        None,
    )))
}

#[utoipa::path(
    post,
    path = "/api/events/{id}/register",
    params(("id" = Uuid, Path, description = "Event ID")),
    request_body = EventRegistrationDto,
    responses(
        (status = 200, description = "Registered", body = ApiResponse<EventResponseDto>),
        (status = 400, description = "Validation error or event closed"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Event or position not found"),
        (status = 409, description = "Already registered or position full")
    ),
    tag = "events",
    security(("bearer_auth" = []))
)]
pub async fn register_for_event(
    user: AuthenticatedUser,
    State(service): State<Arc<EventService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<EventRegistrationDto>,
) -> Result<Json<ApiResponse<EventResponseDto>>> {
    dto.validate()?;

    let event = service
        .register_volunteer(id, &user.sub, dto.position.trim())
        .await?;

    Ok(Json(ApiResponse::success(
        Some(event.into()),
        Some(format!("Registered as {}", dto.position.trim())),
        None,
    )))
}

#[utoipa::path(
    post,
    path = "/api/events/{id}/withdraw",
    params(("id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Withdrawn", body = ApiResponse<EventWithdrawResponseDto>),
        (status = 400, description = "Event closed"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Event not found or not registered")
    ),
    tag = "events",
    security(("bearer_auth" = []))
)]
pub async fn withdraw_from_event(
    user: AuthenticatedUser,
    State(service): State<Arc<EventService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<EventWithdrawResponseDto>>> {
    let (event, position) = service.withdraw_volunteer(id, &user.sub).await?;

    Ok(Json(ApiResponse::success(
        Some(EventWithdrawResponseDto {
            position,
            event: event.into(),
        }),
        Some("Withdrawn from event".to_string()),
        None,
    )))
}
