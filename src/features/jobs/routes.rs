use crate::features::jobs::handlers;
use crate::features::jobs::services::JobService;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

pub fn routes(service: Arc<JobService>) -> Router {
    Router::new()
        .route("/api/jobs", post(handlers::create_job))
        .route("/api/jobs/mine", get(handlers::list_my_jobs))
        .route("/api/jobs/{id}", get(handlers::get_job))
        .route("/api/jobs/{id}/proof", post(handlers::submit_proof))
        .route("/api/jobs/{id}/review", post(handlers::review_job))
        .route("/api/issues/{id}/jobs", get(handlers::list_issue_jobs))
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
        let dispatcher = test_dispatcher(pool.clone());
        let issues = Arc::new(IssueService::new(
            pool.clone(),
            Arc::new(UserService::new(pool.clone())),
            dispatcher.clone(),
        ));
        let router = routes(Arc::new(JobService::new(pool, issues, dispatcher)));

        let router = match user {
            Some(user) => with_user(router, user),
            None => router,
        };
        TestServer::new(router).unwrap()
    }

    #[tokio::test]
    async fn test_my_jobs_require_authentication() {
        let response = server(None).get("/api/jobs/mine").await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_create_requires_ngo() {
        let response = server(Some(create_citizen_user()))
            .post("/api/jobs")
            .json(&json!({
                "issue_id": Uuid::now_v7(),
                "title": "Sweep the park",
                "assigned_to": "volunteer-1",
                "start_date": "2030-01-01T09:00:00Z"
            }))
            .await;

        response.assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_create_validates_fields() {
        let response = server(Some(create_ngo_user()))
            .post("/api/jobs")
            .json(&json!({
                "issue_id": Uuid::now_v7(),
                "title": "x",
                "assigned_to": "",
                "start_date": "2030-01-01T09:00:00Z"
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["errors"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_proof_url_must_be_url() {
        let response = server(Some(create_citizen_user()))
            .post(&format!("/api/jobs/{}/proof", Uuid::now_v7()))
            .json(&json!({ "proof_url": "not a url" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_review_rejects_unknown_decision() {
        let response = server(Some(create_ngo_user()))
            .post(&format!("/api/jobs/{}/review", Uuid::now_v7()))
            .json(&json!({ "decision": "maybe" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }
}
