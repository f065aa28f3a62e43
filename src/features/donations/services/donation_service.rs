use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::core::database::is_unique_violation;
use crate::core::error::{AppError, Result};
use crate::features::donations::dtos::CreateDonationDto;
use crate::features::donations::models::{CreateDonation, Donation};
use crate::features::notifications::dtos::DispatchOutcome;
use crate::features::notifications::services::NotificationDispatcher;
use crate::features::users::UserService;

/// What happened after a donation was stored
#[derive(Debug, Clone, Default)]
pub struct DonationNotices {
    pub donor: DispatchOutcome,
    pub ngo_notified: bool,
}

/// Service for recording donations and keeping NGO totals in step
pub struct DonationService {
    pool: PgPool,
    users: Arc<UserService>,
    dispatcher: Arc<NotificationDispatcher>,
}

impl DonationService {
    pub fn new(
        pool: PgPool,
        users: Arc<UserService>,
        dispatcher: Arc<NotificationDispatcher>,
    ) -> Self {
        Self {
            pool,
            users,
            dispatcher,
        }
    }

    /// Store a donation. A completed donation raises the NGO's total in the
    /// same transaction, then donor and NGO are notified.
    pub async fn record(
        &self,
        donor_id: &str,
        dto: CreateDonationDto,
    ) -> Result<(Donation, DonationNotices)> {
        let ngo = self.users.find_ngo(&dto.ngo_id).await?;

        let data = CreateDonation {
            user_id: donor_id.to_string(),
            ngo_id: ngo.id.clone(),
            amount: dto.amount,
            transaction_id: dto.transaction_id.trim().to_string(),
            status: dto.status,
            message: dto.message.filter(|m| !m.trim().is_empty()),
        };

        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin transaction: {:?}", e);
            AppError::Database(e)
        })?;

        let donation = sqlx::query_as::<_, Donation>(
            r#"
            INSERT INTO donations (id, user_id, ngo_id, amount, transaction_id, status, message)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(&data.user_id)
        .bind(&data.ngo_id)
        .bind(data.amount)
        .bind(&data.transaction_id)
        .bind(data.status)
        .bind(&data.message)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                return AppError::Conflict(format!(
                    "Transaction {} has already been recorded",
                    data.transaction_id
                ));
            }
            tracing::error!("Failed to record donation: {:?}", e);
            AppError::Database(e)
        })?;

        if donation.counts_towards_total() {
            UserService::increment_total_donations(&mut tx, &donation.ngo_id, donation.amount)
                .await?;
        }

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit donation: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::info!(
            "Recorded donation {} of {} from {} to {} ({})",
            donation.id,
            donation.amount,
            donation.user_id,
            donation.ngo_id,
            donation.status
        );

        let mut notices = DonationNotices::default();
        if donation.counts_towards_total() {
            notices.donor = self
                .dispatcher
                .notify_donation_completion(&donation, &ngo)
                .await;
            notices.ngo_notified = self.dispatcher.notify_donation_received(&donation).await;
        }

        Ok((donation, notices))
    }

    pub async fn list_by_donor(&self, user_id: &str) -> Result<Vec<Donation>> {
        sqlx::query_as::<_, Donation>(
            "SELECT * FROM donations WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list donations: {:?}", e);
            AppError::Database(e)
        })
    }

    pub async fn list_by_ngo(&self, ngo_id: &str) -> Result<Vec<Donation>> {
        sqlx::query_as::<_, Donation>(
            "SELECT * FROM donations WHERE ngo_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(ngo_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list received donations: {:?}", e);
            AppError::Database(e)
        })
    }
}
