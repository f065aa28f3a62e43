use crate::features::issues::handlers::{self, IssueState};
use crate::features::issues::services::IssueService;
use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;

pub fn routes(service: Arc<IssueService>) -> Router {
    let state = IssueState { service };

    Router::new()
        .route(
            "/api/issues",
            post(handlers::create_issue).get(handlers::list_issues),
        )
        .route("/api/issues/slug/{slug}", get(handlers::get_issue_by_slug))
        .route("/api/issues/{id}", get(handlers::get_issue))
        .route("/api/issues/{id}/upvote", post(handlers::upvote_issue))
        .route("/api/issues/{id}/downvote", post(handlers::downvote_issue))
        .route("/api/issues/{id}/assign", post(handlers::assign_issue))
        .route("/api/issues/{id}/disclaim", post(handlers::disclaim_issue))
        .route("/api/issues/{id}/complete", post(handlers::complete_issue))
        .route("/api/issues/{id}/positions", post(handlers::add_positions))
        .route("/api/issues/{id}/register", post(handlers::register_volunteer))
        .route("/api/issues/{id}/withdraw", post(handlers::withdraw_volunteer))
        .route(
            "/api/issues/{id}/feedback",
            post(handlers::submit_feedback).get(handlers::list_feedback),
        )
        .route("/api/admin/issues/{id}", delete(handlers::delete_issue))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::model::AuthenticatedUser;
    use crate::features::users::UserService;
    use crate::shared::test_helpers::{
        create_citizen_user, create_ngo_user, lazy_pool, test_dispatcher, with_user,
    };
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::json;
    use uuid::Uuid;

    fn server(user: Option<AuthenticatedUser>) -> TestServer {
        let pool = lazy_pool();
        let users = Arc::new(UserService::new(pool.clone()));
        let dispatcher = test_dispatcher(pool.clone());
        let router = routes(Arc::new(IssueService::new(pool, users, dispatcher)));

        let router = match user {
            Some(user) => with_user(router, user),
            None => router,
        };
        TestServer::new(router).unwrap()
    }

    #[tokio::test]
    async fn test_list_requires_authentication() {
        let response = server(None).get("/api/issues").await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_create_collects_every_validation_error() {
        let response = server(Some(create_citizen_user()))
            .post("/api/issues")
            .json(&json!({
                "title": "x",
                "tags": [],
                "content": "",
                "location": ""
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(body["errors"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_create_rejects_malformed_body() {
        let response = server(Some(create_citizen_user()))
            .post("/api/issues")
            .json(&json!({ "title": 42 }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_assign_requires_ngo_role() {
        let response = server(Some(create_citizen_user()))
            .post(&format!("/api/issues/{}/assign", Uuid::now_v7()))
            .json(&json!({}))
            .await;

        response.assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_assign_rejects_past_deadline() {
        let response = server(Some(create_ngo_user()))
            .post(&format!("/api/issues/{}/assign", Uuid::now_v7()))
            .json(&json!({ "deadline": "2001-01-01T00:00:00Z" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_feedback_satisfaction_out_of_range() {
        let response = server(Some(create_citizen_user()))
            .post(&format!("/api/issues/{}/feedback", Uuid::now_v7()))
            .json(&json!({ "resolved": "yes", "satisfaction": 11 }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_delete_requires_admin() {
        let response = server(Some(create_ngo_user()))
            .delete(&format!("/api/admin/issues/{}", Uuid::now_v7()))
            .await;

        response.assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_invalid_issue_id_is_rejected() {
        let response = server(Some(create_citizen_user()))
            .get("/api/issues/not-a-uuid")
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }
}
