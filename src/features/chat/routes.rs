use crate::features::chat::handlers;
use crate::features::chat::services::ChatService;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

pub fn routes(service: Arc<ChatService>) -> Router {
    Router::new()
        .route(
            "/api/chat/{issue_id}",
            get(handlers::get_messages).post(handlers::send_message),
        )
        .route("/api/admin/chat/archive", post(handlers::archive_messages))
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::model::AuthenticatedUser;
    use crate::features::issues::IssueService;
    use crate::features::users::UserService;
    use crate::modules::live::LiveHub;
    use crate::shared::test_helpers::{
        create_admin_user, create_citizen_user, create_ngo_user, lazy_pool, test_dispatcher,
        with_user,
    };
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::json;
    use uuid::Uuid;

    fn server(user: Option<AuthenticatedUser>) -> TestServer {
        let pool = lazy_pool();
        let users = Arc::new(UserService::new(pool.clone()));
        let issues = Arc::new(IssueService::new(
            pool.clone(),
            users.clone(),
            test_dispatcher(pool.clone()),
        ));
        let router = routes(Arc::new(ChatService::new(
            pool,
            issues,
            users,
            LiveHub::new(),
        )));

        let router = match user {
            Some(user) => with_user(router, user),
            None => router,
        };
        TestServer::new(router).unwrap()
    }

    #[tokio::test]
    async fn test_history_requires_authentication() {
        let response = server(None)
            .get(&format!("/api/chat/{}", Uuid::now_v7()))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_empty_message_is_rejected() {
        let response = server(Some(create_citizen_user()))
            .post(&format!("/api/chat/{}", Uuid::now_v7()))
            .json(&json!({ "message": "" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["errors"][0], "message: Message must be 1-2000 characters");
    }

    #[tokio::test]
    async fn test_whitespace_message_is_rejected() {
        let response = server(Some(create_citizen_user()))
            .post(&format!("/api/chat/{}", Uuid::now_v7()))
            .json(&json!({ "message": "   " }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_overlong_message_is_rejected() {
        let response = server(Some(create_citizen_user()))
            .post(&format!("/api/chat/{}", Uuid::now_v7()))
            .json(&json!({ "message": "a".repeat(2001) }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_archive_requires_admin() {
        let response = server(Some(create_ngo_user()))
            .post("/api/admin/chat/archive")
            .await;

        response.assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_archive_rejects_negative_age() {
        let response = server(Some(create_admin_user()))
            .post("/api/admin/chat/archive?days_old=-1")
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_history_rejects_non_numeric_limit() {
        let response = server(Some(create_citizen_user()))
            .get(&format!("/api/chat/{}?limit=lots", Uuid::now_v7()))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }
}
