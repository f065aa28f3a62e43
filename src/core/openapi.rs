use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::auth;
use crate::features::chat::{dtos as chat_dtos, handlers as chat_handlers};
use crate::features::collaborations::{
    dtos as collaborations_dtos, handlers as collaborations_handlers,
    models as collaborations_models,
};
use crate::features::donations::{
    dtos as donations_dtos, handlers as donations_handlers, models as donations_models,
};
use crate::features::events::{
    dtos as events_dtos, handlers as events_handlers, models as events_models,
};
use crate::features::issues::{
    dtos as issues_dtos, handlers as issues_handlers, models as issues_models,
};
use crate::features::jobs::{dtos as jobs_dtos, handlers as jobs_handlers, models as jobs_models};
use crate::features::notifications::{
    dtos as notifications_dtos, handlers as notifications_handlers,
    models as notifications_models,
};
use crate::features::users::{dtos as users_dtos, handlers as users_handlers};
use crate::shared::types::{ApiResponse, Meta};
use crate::shared::volunteer_roster::{NewVolunteerPosition, VolunteerPosition};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Users
        users_handlers::get_me,
        users_handlers::upsert_me,
        users_handlers::get_user,
        users_handlers::list_ngos,
        // Issues
        issues_handlers::create_issue,
        issues_handlers::list_issues,
        issues_handlers::get_issue,
        issues_handlers::get_issue_by_slug,
        issues_handlers::upvote_issue,
        issues_handlers::downvote_issue,
        issues_handlers::assign_issue,
        issues_handlers::disclaim_issue,
        issues_handlers::complete_issue,
        issues_handlers::add_positions,
        issues_handlers::register_volunteer,
        issues_handlers::withdraw_volunteer,
        issues_handlers::submit_feedback,
        issues_handlers::list_feedback,
        issues_handlers::delete_issue,
        // Events
        events_handlers::create_event,
        events_handlers::list_events,
        events_handlers::get_event,
        events_handlers::update_event_status,
        events_handlers::add_event_positions,
        events_handlers::register_for_event,
        events_handlers::withdraw_from_event,
        // Collaborations
        collaborations_handlers::send_request,
        collaborations_handlers::respond_to_request,
        collaborations_handlers::list_incoming,
        collaborations_handlers::list_outgoing,
        // Notifications
        notifications_handlers::list_notifications,
        notifications_handlers::unread_count,
        notifications_handlers::mark_read,
        notifications_handlers::mark_all_read,
        notifications_handlers::delete_notification,
        // Jobs
        jobs_handlers::create_job,
        jobs_handlers::list_my_jobs,
        jobs_handlers::list_issue_jobs,
        jobs_handlers::get_job,
        jobs_handlers::submit_proof,
        jobs_handlers::review_job,
        // Chat
        chat_handlers::get_messages,
        chat_handlers::send_message,
        chat_handlers::archive_messages,
        // Donations
        donations_handlers::create_donation,
        donations_handlers::list_my_donations,
        donations_handlers::list_received_donations,
    ),
    components(
        schemas(
            // Shared
            Meta,
            VolunteerPosition,
            NewVolunteerPosition,
            auth::model::AuthenticatedUser,
            // Users
            users_dtos::UserResponseDto,
            users_dtos::NgoResponseDto,
            users_dtos::UpsertProfileDto,
            ApiResponse<users_dtos::UserResponseDto>,
            ApiResponse<Vec<users_dtos::NgoResponseDto>>,
            // Issues
            issues_models::IssueStatus,
            issues_models::MediaKind,
            issues_models::MediaItem,
            issues_models::Collaborator,
            issues_models::Resolution,
            issues_models::Feedback,
            issues_dtos::IssueResponseDto,
            issues_dtos::CreateIssueDto,
            issues_dtos::AssignIssueDto,
            issues_dtos::AssignIssueResponseDto,
            issues_dtos::AddPositionsDto,
            issues_dtos::RegisterVolunteerDto,
            issues_dtos::WithdrawResponseDto,
            issues_dtos::DownvoteResponseDto,
            issues_dtos::SubmitFeedbackDto,
            ApiResponse<issues_dtos::IssueResponseDto>,
            ApiResponse<Vec<issues_dtos::IssueResponseDto>>,
            ApiResponse<issues_dtos::AssignIssueResponseDto>,
            ApiResponse<issues_dtos::WithdrawResponseDto>,
            ApiResponse<issues_dtos::DownvoteResponseDto>,
            ApiResponse<Vec<issues_models::Feedback>>,
            // Events
            events_models::EventStatus,
            events_dtos::EventResponseDto,
            events_dtos::CreateEventDto,
            events_dtos::UpdateEventStatusDto,
            events_dtos::AddEventPositionsDto,
            events_dtos::EventRegistrationDto,
            events_dtos::EventWithdrawResponseDto,
            ApiResponse<events_dtos::EventResponseDto>,
            ApiResponse<Vec<events_dtos::EventResponseDto>>,
            ApiResponse<events_dtos::EventWithdrawResponseDto>,
            // Collaborations
            collaborations_models::CollaborationStatus,
            collaborations_models::CollaborationDecision,
            collaborations_dtos::CollaborationResponseDto,
            collaborations_dtos::SendCollaborationRequestDto,
            collaborations_dtos::RespondCollaborationDto,
            collaborations_dtos::RespondOutcomeDto,
            ApiResponse<collaborations_dtos::CollaborationResponseDto>,
            ApiResponse<Vec<collaborations_dtos::CollaborationResponseDto>>,
            ApiResponse<collaborations_dtos::RespondOutcomeDto>,
            // Notifications
            notifications_models::NotificationType,
            notifications_dtos::NotificationResponseDto,
            notifications_dtos::UnreadCountDto,
            notifications_dtos::MarkAllReadDto,
            notifications_dtos::FanOutReport,
            notifications_dtos::DispatchOutcome,
            ApiResponse<Vec<notifications_dtos::NotificationResponseDto>>,
            ApiResponse<notifications_dtos::NotificationResponseDto>,
            ApiResponse<notifications_dtos::UnreadCountDto>,
            ApiResponse<notifications_dtos::MarkAllReadDto>,
            // Jobs
            jobs_models::JobStatus,
            jobs_models::ReviewDecision,
            jobs_dtos::JobResponseDto,
            jobs_dtos::CreateJobDto,
            jobs_dtos::CreateJobResponseDto,
            jobs_dtos::SubmitProofDto,
            jobs_dtos::ReviewJobDto,
            jobs_dtos::ReviewJobResponseDto,
            ApiResponse<jobs_dtos::JobResponseDto>,
            ApiResponse<Vec<jobs_dtos::JobResponseDto>>,
            ApiResponse<jobs_dtos::CreateJobResponseDto>,
            ApiResponse<jobs_dtos::ReviewJobResponseDto>,
            // Chat
            chat_dtos::ChatMessageResponseDto,
            chat_dtos::SendChatMessageDto,
            chat_dtos::ArchiveChatResultDto,
            ApiResponse<chat_dtos::ChatMessageResponseDto>,
            ApiResponse<Vec<chat_dtos::ChatMessageResponseDto>>,
            ApiResponse<chat_dtos::ArchiveChatResultDto>,
            // Donations
            donations_models::DonationStatus,
            donations_dtos::DonationResponseDto,
            donations_dtos::CreateDonationDto,
            donations_dtos::DonationReceiptDto,
            ApiResponse<donations_dtos::DonationReceiptDto>,
            ApiResponse<Vec<donations_dtos::DonationResponseDto>>,
        )
    ),
    tags(
        (name = "users", description = "User profiles and the NGO directory"),
        (name = "issues", description = "Community issues and their lifecycle"),
        (name = "events", description = "NGO-organised events"),
        (name = "collaborations", description = "Collaboration requests between NGOs"),
        (name = "notifications", description = "In-app notifications"),
        (name = "jobs", description = "Volunteer jobs on assigned issues"),
        (name = "chat", description = "Per-issue chat rooms"),
        (name = "donations", description = "Donations to NGOs"),
        (name = "admin", description = "Moderation and maintenance (admin only)"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "CivicHub API",
        version = "0.1.0",
        description = "API documentation for CivicHub",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
