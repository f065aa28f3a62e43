use chrono::Utc;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::core::database::is_unique_violation;
use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::events::dtos::{CreateEventDto, EventListQuery};
use crate::features::events::models::{CreateEvent, Event, EventStatus};
use crate::shared::validation::{slug_with_suffix, slugify};
use crate::shared::volunteer_roster::NewVolunteerPosition;

/// Service for NGO-organised events. Mutations lock the row like issues do.
pub struct EventService {
    pool: PgPool,
}

impl EventService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, organizer_id: &str, dto: CreateEventDto) -> Result<Event> {
        let id = Uuid::now_v7();
        let mut event = Event::new(
            id,
            String::new(),
            CreateEvent {
                title: dto.title.trim().to_string(),
                description: dto.description,
                location: dto.location.trim().to_string(),
                organizer_id: organizer_id.to_string(),
                start_date: dto.start_date,
                end_date: dto.end_date,
                volunteer_positions: dto.volunteer_positions,
            },
            Utc::now(),
        )?;
        event.slug = self.unique_slug(&event.title, id).await?;

        let event = sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO events (
                id, slug, title, description, location, organizer_id,
                start_date, end_date, status, volunteer_positions, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $11)
            RETURNING *
            "#,
        )
        .bind(event.id)
        .bind(&event.slug)
        .bind(&event.title)
        .bind(&event.description)
        .bind(&event.location)
        .bind(&event.organizer_id)
        .bind(event.start_date)
        .bind(event.end_date)
        .bind(event.status)
        .bind(&event.volunteer_positions)
        .bind(event.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                return AppError::Conflict("An event with this slug already exists".to_string());
            }
            tracing::error!("Failed to create event: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::info!(
            "Created event: {} ({}) by {}",
            event.id,
            event.slug,
            organizer_id
        );
        Ok(event)
    }

    async fn unique_slug(&self, title: &str, id: Uuid) -> Result<String> {
        let suffix = id.simple().to_string()[..8].to_string();
        let base = slugify(title);
        if base.is_empty() {
            return Ok(suffix);
        }

        let taken: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM events WHERE slug = $1)")
            .bind(&base)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to check event slug: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(if taken {
            slug_with_suffix(title, &suffix)
        } else {
            base
        })
    }

    /// Events by start date, optionally filtered by status
    pub async fn list(&self, query: &EventListQuery) -> Result<(Vec<Event>, i64)> {
        let pagination = query.pagination();

        let events = sqlx::query_as::<_, Event>(
            r#"
            SELECT * FROM events
            WHERE ($1::event_status IS NULL OR status = $1)
            ORDER BY start_date ASC, id ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(query.status)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list events: {:?}", e);
            AppError::Database(e)
        })?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM events WHERE ($1::event_status IS NULL OR status = $1)",
        )
        .bind(query.status)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count events: {:?}", e);
            AppError::Database(e)
        })?;

        Ok((events, total))
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Event> {
        sqlx::query_as::<_, Event>("SELECT * FROM events WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get event by slug: {:?}", e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound(format!("Event '{}' not found", slug)))
    }

    async fn mutate<R, F>(&self, id: Uuid, change: F) -> Result<(Event, R)>
    where
        F: FnOnce(&mut Event) -> Result<R>,
    {
        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin transaction: {:?}", e);
            AppError::Database(e)
        })?;

        let mut event = Self::lock(&mut tx, id).await?;
        let outcome = change(&mut event)?;
        let event = Self::save(&mut tx, &event).await?;

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit event {}: {:?}", id, e);
            AppError::Database(e)
        })?;

        Ok((event, outcome))
    }

    async fn lock(conn: &mut PgConnection, id: Uuid) -> Result<Event> {
        sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(conn)
            .await
            .map_err(|e| {
                tracing::error!("Failed to lock event: {:?}", e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound(format!("Event {} not found", id)))
    }

    async fn save(conn: &mut PgConnection, event: &Event) -> Result<Event> {
        sqlx::query_as::<_, Event>(
            r#"
            UPDATE events
            SET status = $2, volunteer_positions = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(event.id)
        .bind(event.status)
        .bind(&event.volunteer_positions)
        .fetch_one(conn)
        .await
        .map_err(|e| {
            tracing::error!("Failed to save event {}: {:?}", event.id, e);
            AppError::Database(e)
        })
    }

    pub async fn update_status(
        &self,
        id: Uuid,
        user: &AuthenticatedUser,
        status: EventStatus,
    ) -> Result<Event> {
        let (event, _) = self
            .mutate(id, |event| {
                event.ensure_organizer(user)?;
                event.transition(status)
            })
            .await?;

        tracing::info!("Event {} is now {}", id, status);
        Ok(event)
    }

    pub async fn add_volunteer_positions(
        &self,
        id: Uuid,
        user: &AuthenticatedUser,
        positions: Vec<NewVolunteerPosition>,
    ) -> Result<Event> {
        let (event, _) = self
            .mutate(id, |event| {
                event.ensure_organizer(user)?;
                event.add_volunteer_positions(positions)
            })
            .await?;
        Ok(event)
    }

    pub async fn register_volunteer(&self, id: Uuid, user_id: &str, position: &str) -> Result<Event> {
        let (event, _) = self
            .mutate(id, |event| event.register_volunteer(user_id, position))
            .await?;

        tracing::info!(
            "User {} registered for '{}' on event {}",
            user_id,
            position,
            id
        );
        Ok(event)
    }

    pub async fn withdraw_volunteer(&self, id: Uuid, user_id: &str) -> Result<(Event, String)> {
        let (event, position) = self
            .mutate(id, |event| event.withdraw_volunteer(user_id))
            .await?;

        tracing::info!("User {} withdrew from '{}' on event {}", user_id, position, id);
        Ok((event, position))
    }
}
