use crate::features::collaborations::handlers;
use crate::features::collaborations::services::CollaborationService;
use axum::{
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;

pub fn routes(service: Arc<CollaborationService>) -> Router {
    Router::new()
        .route("/api/collaboration/request", post(handlers::send_request))
        .route(
            "/api/collaboration/request/{id}/respond",
            patch(handlers::respond_to_request),
        )
        .route(
            "/api/collaboration/requests/incoming",
            get(handlers::list_incoming),
        )
        .route(
            "/api/collaboration/requests/outgoing",
            get(handlers::list_outgoing),
        )
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::model::AuthenticatedUser;
    use crate::features::issues::IssueService;
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
        let issues = Arc::new(IssueService::new(
            pool.clone(),
            users.clone(),
            dispatcher.clone(),
        ));
        let router = routes(Arc::new(CollaborationService::new(
            pool, issues, users, dispatcher,
        )));

        let router = match user {
            Some(user) => with_user(router, user),
            None => router,
        };
        TestServer::new(router).unwrap()
    }

    #[tokio::test]
    async fn test_incoming_requires_authentication() {
        let response = server(None)
            .get("/api/collaboration/requests/incoming")
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_citizens_cannot_send_requests() {
        let response = server(Some(create_citizen_user()))
            .post("/api/collaboration/request")
            .json(&json!({ "issue_id": Uuid::now_v7(), "ngo_id": "ngo-2" }))
            .await;

        response.assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_self_invitation_is_rejected() {
        let ngo = create_ngo_user();
        let response = server(Some(ngo.clone()))
            .post("/api/collaboration/request")
            .json(&json!({ "issue_id": Uuid::now_v7(), "ngo_id": ngo.sub }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_missing_ngo_id_is_rejected() {
        let response = server(Some(create_ngo_user()))
            .post("/api/collaboration/request")
            .json(&json!({ "issue_id": Uuid::now_v7(), "ngo_id": "" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["errors"][0], "ngo_id: NGO id is required");
    }

    #[tokio::test]
    async fn test_unknown_decision_is_rejected() {
        let response = server(Some(create_ngo_user()))
            .patch(&format!(
                "/api/collaboration/request/{}/respond",
                Uuid::now_v7()
            ))
            .json(&json!({ "decision": "maybe" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }
}
