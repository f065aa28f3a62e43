use axum::{extract::State, Json};
use std::sync::Arc;
use validator::Validate;

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::auth::guards::RequireNgo;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::donations::dtos::{
    CreateDonationDto, DonationReceiptDto, DonationResponseDto,
};
use crate::features::donations::services::DonationService;
use crate::shared::types::{ApiResponse, Meta};

#[utoipa::path(
    post,
    path = "/api/donations",
    request_body = CreateDonationDto,
    responses(
        (status = 200, description = "Donation recorded", body = ApiResponse<DonationReceiptDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "NGO not found"),
        (status = 409, description = "Transaction already recorded")
    ),
    tag = "donations",
    security(("bearer_auth" = []))
)]
pub async fn create_donation(
    user: AuthenticatedUser,
    State(service): State<Arc<DonationService>>,
    AppJson(dto): AppJson<CreateDonationDto>,
) -> Result<Json<ApiResponse<DonationReceiptDto>>> {
    dto.validate()?;

    let (donation, notices) = service.record(&user.sub, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(DonationReceiptDto {
            donation: donation.into(),
            donor_notification: notices.donor,
            ngo_notified: notices.ngo_notified,
        }),
        Some("Donation recorded".to_string()),
        None,
    )))
}

#[utoipa::path(
    get,
    path = "/api/donations/mine",
    responses(
        (status = 200, description = "Caller's donations", body = ApiResponse<Vec<DonationResponseDto>>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "donations",
    security(("bearer_auth" = []))
)]
pub async fn list_my_donations(
    user: AuthenticatedUser,
    State(service): State<Arc<DonationService>>,
) -> Result<Json<ApiResponse<Vec<DonationResponseDto>>>> {
    let donations = service.list_by_donor(&user.sub).await?;
    let total = donations.len() as i64;
    let dtos: Vec<DonationResponseDto> = donations.into_iter().map(|d| d.into()).collect();
    Ok(Json(ApiResponse::success(Some(dtos), None, Some(Meta::total(total)))))
}

#[utoipa::path(
    get,
    path = "/api/donations/received",
    responses(
        (status = 200, description = "Donations received by the calling NGO", body = ApiResponse<Vec<DonationResponseDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "NGO access required")
    ),
    tag = "donations",
    security(("bearer_auth" = []))
)]
pub async fn list_received_donations(
    RequireNgo(user): RequireNgo,
    State(service): State<Arc<DonationService>>,
) -> Result<Json<ApiResponse<Vec<DonationResponseDto>>>> {
    let donations = service.list_by_ngo(&user.sub).await?;
    let total = donations.len() as i64;
    let dtos: Vec<DonationResponseDto> = donations.into_iter().map(|d| d.into()).collect();
    Ok(Json(ApiResponse::success(Some(dtos), None, Some(Meta::total(total)))))
}
