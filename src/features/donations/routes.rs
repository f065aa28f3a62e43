use crate::features::donations::handlers;
use crate::features::donations::services::DonationService;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

pub fn routes(service: Arc<DonationService>) -> Router {
    Router::new()
        .route("/api/donations", post(handlers::create_donation))
        .route("/api/donations/mine", get(handlers::list_my_donations))
        .route("/api/donations/received", get(handlers::list_received_donations))
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::model::AuthenticatedUser;
    use crate::features::users::UserService;
    use crate::shared::test_helpers::{create_citizen_user, lazy_pool, test_dispatcher, with_user};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use fake::faker::lorem::en::Word;
    use fake::Fake;
    use serde_json::json;

    fn server(user: Option<AuthenticatedUser>) -> TestServer {
        let pool = lazy_pool();
        let service = DonationService::new(
            pool.clone(),
            Arc::new(UserService::new(pool.clone())),
            test_dispatcher(pool),
        );
        let router = routes(Arc::new(service));
        let router = match user {
            Some(user) => with_user(router, user),
            None => router,
        };
        TestServer::new(router).unwrap()
    }

    #[tokio::test]
    async fn test_donate_requires_authentication() {
        let response = server(None)
            .post("/api/donations")
            .json(&json!({}))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_received_requires_ngo() {
        let response = server(Some(create_citizen_user()))
            .get("/api/donations/received")
            .await;
        response.assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_non_positive_amount_is_rejected() {
        let transaction: String = Word().fake();
        let response = server(Some(create_citizen_user()))
            .post("/api/donations")
            .json(&json!({
                "ngo_id": "ngo-1",
                "amount": "0",
                "transaction_id": format!("pi_{}", transaction),
                "status": "completed"
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["errors"][0], "amount: Amount must be greater than zero");
    }

    #[tokio::test]
    async fn test_unknown_status_is_rejected() {
        let response = server(Some(create_citizen_user()))
            .post("/api/donations")
            .json(&json!({
                "ngo_id": "ngo-1",
                "amount": "5.00",
                "transaction_id": "pi_1",
                "status": "refunded"
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }
}
