use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::events::models::{Event, EventStatus};
use crate::shared::constants::DEFAULT_PAGE_SIZE;
use crate::shared::types::PaginationQuery;
use crate::shared::volunteer_roster::{NewVolunteerPosition, VolunteerPosition};

/// Response DTO for event
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EventResponseDto {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub location: String,
    pub organizer_id: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: EventStatus,
    pub volunteer_positions: Vec<VolunteerPosition>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Event> for EventResponseDto {
    fn from(e: Event) -> Self {
        Self {
            id: e.id,
            slug: e.slug,
            title: e.title,
            description: e.description,
            location: e.location,
            organizer_id: e.organizer_id,
            start_date: e.start_date,
            end_date: e.end_date,
            status: e.status,
            volunteer_positions: e.volunteer_positions.0,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateEventDto {
    #[validate(length(min = 3, max = 200, message = "Title must be 3-200 characters"))]
    pub title: String,

    #[validate(length(min = 1, max = 20000, message = "Description is required"))]
    pub description: String,

    #[validate(length(min = 1, max = 255, message = "Location is required"))]
    pub location: String,

    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,

    #[serde(default)]
    pub volunteer_positions: Vec<NewVolunteerPosition>,
}

/// Query parameters for listing events
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct EventListQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
    pub status: Option<EventStatus>,
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

impl EventListQuery {
    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery::new(self.page, self.page_size)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateEventStatusDto {
    pub status: EventStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AddEventPositionsDto {
    pub positions: Vec<NewVolunteerPosition>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct EventRegistrationDto {
    #[validate(length(min = 1, message = "Position is required"))]
    pub position: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EventWithdrawResponseDto {
    pub position: String,
    pub event: EventResponseDto,
}
