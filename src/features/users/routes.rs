use crate::features::users::handlers;
use crate::features::users::services::UserService;
use axum::{routing::get, Router};
use std::sync::Arc;

pub fn routes(service: Arc<UserService>) -> Router {
    Router::new()
        .route("/api/users/me", get(handlers::get_me).put(handlers::upsert_me))
        .route("/api/users/{id}", get(handlers::get_user))
        .route("/api/ngos", get(handlers::list_ngos))
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{create_citizen_user, lazy_pool, with_user};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::json;

    fn server(authenticated: bool) -> TestServer {
        let router = routes(Arc::new(UserService::new(lazy_pool())));
        let router = if authenticated {
            with_user(router, create_citizen_user())
        } else {
            router
        };
        TestServer::new(router).unwrap()
    }

    #[tokio::test]
    async fn test_profile_requires_authentication() {
        let response = server(false).get("/api/users/me").await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_upsert_rejects_invalid_profile() {
        let response = server(true)
            .put("/api/users/me")
            .json(&json!({ "name": "", "email": "not-an-email" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(body["errors"].as_array().unwrap().len(), 2);
    }
}
