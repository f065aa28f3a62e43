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
use crate::features::auth::model::AuthenticatedUser;
use crate::features::jobs::dtos::{
    CreateJobDto, CreateJobResponseDto, JobResponseDto, ReviewJobDto, ReviewJobResponseDto,
    SubmitProofDto,
};
use crate::features::jobs::services::JobService;
use crate::shared::types::{ApiResponse, Meta};

#[utoipa::path(
    post,
    path = "/api/jobs",
    request_body = CreateJobDto,
    responses(
        (status = 200, description = "Job created", body = ApiResponse<CreateJobResponseDto>),
        (status = 400, description = "Validation error or issue not assigned"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the issue's NGO"),
        (status = 404, description = "Issue not found")
    ),
    tag = "jobs",
    security(("bearer_auth" = []))
)]
pub async fn create_job(
    RequireNgo(user): RequireNgo,
    State(service): State<Arc<JobService>>,
    AppJson(dto): AppJson<CreateJobDto>,
) -> Result<Json<ApiResponse<CreateJobResponseDto>>> {
    dto.validate()?;

    let (job, notification) = service.create(&user, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(CreateJobResponseDto {
            job: job.into(),
            notification,
        }),
        Some("Job created".to_string()),
        None,
    )))
}

#[utoipa::path(
    get,
    path = "/api/jobs/mine",
    responses(
        (status = 200, description = "Caller's jobs", body = ApiResponse<Vec<JobResponseDto>>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "jobs",
    security(("bearer_auth" = []))
)]
pub async fn list_my_jobs(
    user: AuthenticatedUser,
    State(service): State<Arc<JobService>>,
) -> Result<Json<ApiResponse<Vec<JobResponseDto>>>> {
    let jobs = service.list_for_volunteer(&user.sub).await?;
    let total = jobs.len() as i64;
    let dtos: Vec<JobResponseDto> = jobs.into_iter().map(|j| j.into()).collect();
    Ok(Json(ApiResponse::success(Some(dtos), None, Some(Meta::total(total)))))
}

#[utoipa::path(
    get,
    path = "/api/issues/{id}/jobs",
    params(("id" = Uuid, Path, description = "Issue ID")),
    responses(
        (status = 200, description = "Jobs of the issue", body = ApiResponse<Vec<JobResponseDto>>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "jobs",
    security(("bearer_auth" = []))
)]
pub async fn list_issue_jobs(
    _user: AuthenticatedUser,
    State(service): State<Arc<JobService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<JobResponseDto>>>> {
    let jobs = service.list_for_issue(id).await?;
    let total = jobs.len() as i64;
    let dtos: Vec<JobResponseDto> = jobs.into_iter().map(|j| j.into()).collect();
    Ok(Json(ApiResponse::success(Some(dtos), None, Some(Meta::total(total)))))
}

#[utoipa::path(
    get,
    path = "/api/jobs/{id}",
    params(("id" = Uuid, Path, description = "Job ID")),
    responses(
        (status = 200, description = "Job found", body = ApiResponse<JobResponseDto>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Job not found")
    ),
    tag = "jobs",
    security(("bearer_auth" = []))
)]
pub async fn get_job(
    _user: AuthenticatedUser,
    State(service): State<Arc<JobService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<JobResponseDto>>> {
    let job = service.get_by_id(id).await?;
    Ok(Json(ApiResponse::success(Some(job.into()), None, None)))
}

#[utoipa::path(
    post,
    path = "/api/jobs/{id}/proof",
    params(("id" = Uuid, Path, description = "Job ID")),
    request_body = SubmitProofDto,
    responses(
        (status = 200, description = "Proof submitted", body = ApiResponse<JobResponseDto>),
        (status = 400, description = "Validation error or job not accepting proof"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the assigned volunteer"),
        (status = 404, description = "Job not found")
    ),
    tag = "jobs",
    security(("bearer_auth" = []))
)]
pub async fn submit_proof(
    user: AuthenticatedUser,
    State(service): State<Arc<JobService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<SubmitProofDto>,
) -> Result<Json<ApiResponse<JobResponseDto>>> {
    dto.validate()?;

    let job = service.submit_proof(id, &user, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(job.into()),
        Some("Proof submitted".to_string()),
        None,
    )))
}

#[utoipa::path(
    post,
    path = "/api/jobs/{id}/review",
    params(("id" = Uuid, Path, description = "Job ID")),
    request_body = ReviewJobDto,
    responses(
        (status = 200, description = "Job reviewed", body = ApiResponse<ReviewJobResponseDto>),
        (status = 400, description = "No proof to review"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the issue's NGO"),
        (status = 404, description = "Job not found")
    ),
    tag = "jobs",
    security(("bearer_auth" = []))
)]
pub async fn review_job(
    RequireNgo(user): RequireNgo,
    State(service): State<Arc<JobService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<ReviewJobDto>,
) -> Result<Json<ApiResponse<ReviewJobResponseDto>>> {
    dto.validate()?;

    let (job, volunteer_notified) = service.review(id, &user, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(ReviewJobResponseDto {
            job: job.into(),
            volunteer_notified,
        }),
        Some("Job reviewed".to_string()),
        None,
    )))
}
