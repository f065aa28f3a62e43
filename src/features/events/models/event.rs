use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::shared::volunteer_roster::{self, NewVolunteerPosition, VolunteerPosition};

/// Event status enum matching database enum
///
/// ```text
/// Upcoming --> Ongoing --> Completed
///    │            │
///    └────────────┴--> Cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "event_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Upcoming,
    Ongoing,
    Completed,
    Cancelled,
}

impl EventStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, EventStatus::Completed | EventStatus::Cancelled)
    }

    pub fn can_become(self, next: EventStatus) -> bool {
        matches!(
            (self, next),
            (EventStatus::Upcoming, EventStatus::Ongoing)
                | (EventStatus::Upcoming, EventStatus::Cancelled)
                | (EventStatus::Ongoing, EventStatus::Completed)
                | (EventStatus::Ongoing, EventStatus::Cancelled)
        )
    }
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventStatus::Upcoming => write!(f, "upcoming"),
            EventStatus::Ongoing => write!(f, "ongoing"),
            EventStatus::Completed => write!(f, "completed"),
            EventStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Database model for event
#[derive(Debug, Clone, FromRow)]
pub struct Event {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub location: String,
    pub organizer_id: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: EventStatus,
    pub volunteer_positions: Json<Vec<VolunteerPosition>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data for creating an event
#[derive(Debug, Clone)]
pub struct CreateEvent {
    pub title: String,
    pub description: String,
    pub location: String,
    pub organizer_id: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub volunteer_positions: Vec<NewVolunteerPosition>,
}

impl Event {
    pub fn new(id: Uuid, slug: String, data: CreateEvent, now: DateTime<Utc>) -> Result<Self> {
        if data.end_date < data.start_date {
            return Err(AppError::Validation(
                "end_date: must not be before start_date".to_string(),
            ));
        }

        let mut positions = Vec::new();
        if !data.volunteer_positions.is_empty() {
            volunteer_roster::append_positions(&mut positions, data.volunteer_positions)?;
        }

        Ok(Self {
            id,
            slug,
            title: data.title,
            description: data.description,
            location: data.location,
            organizer_id: data.organizer_id,
            start_date: data.start_date,
            end_date: data.end_date,
            status: EventStatus::Upcoming,
            volunteer_positions: Json(positions),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn transition(&mut self, next: EventStatus) -> Result<()> {
        if !self.status.can_become(next) {
            return Err(AppError::InvalidState(format!(
                "Event cannot move from {} to {}",
                self.status, next
            )));
        }
        self.status = next;
        Ok(())
    }

    pub fn add_volunteer_positions(&mut self, positions: Vec<NewVolunteerPosition>) -> Result<()> {
        self.ensure_open()?;
        volunteer_roster::append_positions(&mut self.volunteer_positions.0, positions)
    }

    pub fn register_volunteer(&mut self, user_id: &str, position: &str) -> Result<()> {
        self.ensure_open()?;
        volunteer_roster::register(&mut self.volunteer_positions.0, user_id, position)
    }

    pub fn withdraw_volunteer(&mut self, user_id: &str) -> Result<String> {
        self.ensure_open()?;
        volunteer_roster::withdraw(&mut self.volunteer_positions.0, user_id)
    }

    /// Organizer or admin
    pub fn ensure_organizer(&self, user: &AuthenticatedUser) -> Result<()> {
        if user.is_admin() || self.organizer_id == user.sub {
            return Ok(());
        }
        Err(AppError::Forbidden(
            "Only the organizer can manage this event".to_string(),
        ))
    }

    fn ensure_open(&self) -> Result<()> {
        if self.status.is_terminal() {
            return Err(AppError::InvalidState(format!(
                "Event is {} and no longer takes volunteers",
                self.status
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{create_admin_user, create_ngo_user};
    use chrono::Duration;

    fn event() -> Event {
        let start = Utc::now() + Duration::days(3);
        Event::new(
            Uuid::now_v7(),
            "river-cleanup".to_string(),
            CreateEvent {
                title: "River cleanup".to_string(),
                description: "Bring gloves".to_string(),
                location: "Riverside".to_string(),
                organizer_id: "test-ngo".to_string(),
                start_date: start,
                end_date: start + Duration::hours(4),
                volunteer_positions: vec![NewVolunteerPosition {
                    position: "Collector".to_string(),
                    slots: 1,
                }],
            },
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn test_end_before_start_is_rejected() {
        let start = Utc::now();
        let result = Event::new(
            Uuid::now_v7(),
            "x".to_string(),
            CreateEvent {
                title: "x".to_string(),
                description: "x".to_string(),
                location: "x".to_string(),
                organizer_id: "o".to_string(),
                start_date: start,
                end_date: start - Duration::minutes(1),
                volunteer_positions: Vec::new(),
            },
            Utc::now(),
        );
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_status_machine() {
        let mut e = event();
        assert_eq!(e.status, EventStatus::Upcoming);
        assert!(matches!(
            e.transition(EventStatus::Completed),
            Err(AppError::InvalidState(_))
        ));

        e.transition(EventStatus::Ongoing).unwrap();
        e.transition(EventStatus::Completed).unwrap();
        assert!(e.status.is_terminal());
        assert!(e.transition(EventStatus::Cancelled).is_err());
        assert!(e.transition(EventStatus::Ongoing).is_err());
    }

    #[test]
    fn test_upcoming_can_be_cancelled() {
        let mut e = event();
        e.transition(EventStatus::Cancelled).unwrap();
        assert_eq!(e.status, EventStatus::Cancelled);
    }

    #[test]
    fn test_registration_respects_capacity() {
        let mut e = event();
        e.register_volunteer("a", "Collector").unwrap();
        assert!(matches!(
            e.register_volunteer("b", "Collector"),
            Err(AppError::CapacityExceeded(_))
        ));

        assert_eq!(e.withdraw_volunteer("a").unwrap(), "Collector");
        e.register_volunteer("b", "Collector").unwrap();
        assert_eq!(
            e.volunteer_positions.0[0].registered_volunteers,
            vec!["b".to_string()]
        );
    }

    #[test]
    fn test_terminal_event_refuses_volunteers() {
        let mut e = event();
        e.transition(EventStatus::Cancelled).unwrap();

        assert!(matches!(
            e.register_volunteer("a", "Collector"),
            Err(AppError::InvalidState(_))
        ));
        assert!(matches!(
            e.add_volunteer_positions(vec![NewVolunteerPosition {
                position: "Driver".to_string(),
                slots: 2,
            }]),
            Err(AppError::InvalidState(_))
        ));
    }

    #[test]
    fn test_organizer_access() {
        let e = event();
        assert!(e.ensure_organizer(&create_ngo_user()).is_ok());
        assert!(e.ensure_organizer(&create_admin_user()).is_ok());

        let other = crate::shared::test_helpers::create_user("other-ngo", "ngo");
        assert!(matches!(
            e.ensure_organizer(&other),
            Err(AppError::Forbidden(_))
        ));
    }
}
