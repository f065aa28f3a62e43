use crate::features::events::handlers;
use crate::features::events::services::EventService;
use axum::{
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;

pub fn routes(service: Arc<EventService>) -> Router {
    Router::new()
        .route(
            "/api/events",
            post(handlers::create_event).get(handlers::list_events),
        )
        .route("/api/events/{slug}", get(handlers::get_event))
        .route("/api/events/{id}/status", patch(handlers::update_event_status))
        .route("/api/events/{id}/positions", post(handlers::add_event_positions))
        .route("/api/events/{id}/register", post(handlers::register_for_event))
        .route("/api/events/{id}/withdraw", post(handlers::withdraw_from_event))
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::model::AuthenticatedUser;
    use crate::shared::test_helpers::{create_citizen_user, create_ngo_user, lazy_pool, with_user};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::json;
    use uuid::Uuid;

    fn server(user: Option<AuthenticatedUser>) -> TestServer {
        let router = routes(Arc::new(EventService::new(lazy_pool())));
        let router = match user {
            Some(user) => with_user(router, user),
            None => router,
        };
        TestServer::new(router).unwrap()
    }

    #[tokio::test]
    async fn test_list_requires_authentication() {
        let response = server(None).get("/api/events").await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_create_requires_ngo() {
        let response = server(Some(create_citizen_user()))
            .post("/api/events")
            .json(&json!({
                "title": "River clean-up",
                "description": "Bring gloves",
                "location": "North bank",
                "start_date": "2030-05-01T08:00:00Z",
                "end_date": "2030-05-01T12:00:00Z"
            }))
            .await;

        response.assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_create_rejects_end_before_start() {
        let response = server(Some(create_ngo_user()))
            .post("/api/events")
            .json(&json!({
                "title": "River clean-up",
                "description": "Bring gloves",
                "location": "North bank",
                "start_date": "2030-05-01T12:00:00Z",
                "end_date": "2030-05-01T08:00:00Z"
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_collects_validation_errors() {
        let response = server(Some(create_ngo_user()))
            .post("/api/events")
            .json(&json!({
                "title": "x",
                "description": "",
                "location": "",
                "start_date": "2030-05-01T08:00:00Z",
                "end_date": "2030-05-01T12:00:00Z"
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["errors"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_unknown_status_is_rejected() {
        let response = server(Some(create_ngo_user()))
            .patch(&format!("/api/events/{}/status", Uuid::now_v7()))
            .json(&json!({ "status": "postponed" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_register_requires_position() {
        let response = server(Some(create_citizen_user()))
            .post(&format!("/api/events/{}/register", Uuid::now_v7()))
            .json(&json!({ "position": "" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_list_rejects_unknown_status_filter() {
        let response = server(Some(create_citizen_user()))
            .get("/api/events?status=postponed")
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }
}
