use crate::features::notifications::handlers::{self, LiveState};
use crate::features::notifications::services::NotificationService;
use axum::{
    routing::{delete, get, patch},
    Router,
};
use std::sync::Arc;

pub fn routes(service: Arc<NotificationService>) -> Router {
    Router::new()
        .route("/api/notifications", get(handlers::list_notifications))
        .route("/api/notifications/unread-count", get(handlers::unread_count))
        .route("/api/notifications/read-all", patch(handlers::mark_all_read))
        .route("/api/notifications/{id}/read", patch(handlers::mark_read))
        .route("/api/notifications/{id}", delete(handlers::delete_notification))
        .with_state(service)
}

/// Websocket upgrade; authenticates itself from the query string
pub fn live_routes(state: LiveState) -> Router {
    Router::new()
        .route("/api/ws", get(handlers::live_ws))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::{JwksClient, JwtValidator};
    use crate::modules::live::LiveHub;
    use crate::shared::test_helpers::{create_citizen_user, lazy_pool, with_user};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use std::time::Duration;
    use uuid::Uuid;

    fn server(authenticated: bool) -> TestServer {
        let router = routes(Arc::new(NotificationService::new(lazy_pool(), LiveHub::new())));
        let router = if authenticated {
            with_user(router, create_citizen_user())
        } else {
            router
        };
        TestServer::new(router).unwrap()
    }

    fn live_server() -> TestServer {
        let jwks = Arc::new(JwksClient::new(
            "http://127.0.0.1:1",
            Duration::from_secs(60),
        ));
        let validator = Arc::new(JwtValidator::new(
            jwks,
            "http://127.0.0.1:1".to_string(),
            "civichub-api".to_string(),
            Duration::from_secs(0),
        ));
        TestServer::new(live_routes(LiveState {
            hub: LiveHub::new(),
            validator,
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_notifications_require_authentication() {
        server(false)
            .get("/api/notifications")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
        server(false)
            .get("/api/notifications/unread-count")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_invalid_pagination_query() {
        let response = server(true).get("/api/notifications?page=abc").await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_mark_read_needs_valid_id() {
        let response = server(true).patch("/api/notifications/nope/read").await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let response = server(false)
            .patch(&format!("/api/notifications/{}/read", Uuid::now_v7()))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_live_socket_requires_token() {
        let response = live_server().get("/api/ws").await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }
}
