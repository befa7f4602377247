//! API routes

mod actors;
mod auth;
mod health;
pub mod metrics;
mod types;

use axum::{Router, middleware};
use sakila_auth::auth_middleware;

use crate::state::{AppState, MetricsHandle};

/// Create the main router
///
/// `/register`, `/login`, `/health` and `/metrics` are public; everything
/// under `/api` passes through the authorization gate first.
pub fn create_router(state: AppState, metrics_handle: Option<MetricsHandle>) -> Router {
    // route_layer keeps unknown paths a plain 404 instead of a 401
    let protected = Router::new()
        .merge(auth::protected_routes())
        .merge(actors::routes())
        .route_layer(middleware::from_fn_with_state(
            state.jwt.clone(),
            auth_middleware,
        ));

    let mut router = Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(protected)
        .with_state(state);

    if let Some(handle) = metrics_handle {
        router = router.merge(metrics::routes(handle));
    }

    router
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Method, Request, StatusCode, header},
        response::Response,
    };
    use sakila_auth::{HashParams, JwtManager};
    use sakila_db::Database;
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn test_app() -> Router {
        let db = Database::in_memory().await.unwrap();
        let jwt = Arc::new(JwtManager::new("test-secret", 3600).unwrap());
        let cheap = HashParams {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        };
        create_router(AppState::new(db, jwt, cheap).unwrap(), None)
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        (status, json_body(response).await)
    }

    async fn json_body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        }
    }

    async fn register_and_login(app: &Router, username: &str, password: &str) -> String {
        let creds = json!({ "username": username, "password": password });
        let (status, _) = send(app, Method::POST, "/register", None, Some(creds.clone())).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(app, Method::POST, "/login", None, Some(creds)).await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_end_to_end_scenario() {
        let app = test_app().await;

        let creds = json!({ "username": "bob", "password": "s3cret" });
        let (status, body) = send(&app, Method::POST, "/register", None, Some(creds.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert!(!body.to_string().contains("s3cret"));

        let (status, body) = send(&app, Method::POST, "/login", None, Some(creds)).await;
        assert_eq!(status, StatusCode::OK);
        let token = body["token"].as_str().unwrap().to_string();
        assert!(!token.is_empty());
        assert_eq!(body["token_type"], "Bearer");
        assert_eq!(body["expires_in"], 3600);

        let (status, body) = send(&app, Method::GET, "/api/whoami", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["username"], "bob");

        let (status, _) = send(&app, Method::GET, "/api/actors", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);

        let corrupted = format!("{}x", token);
        let (status, _) = send(&app, Method::GET, "/api/actors", Some(&corrupted), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_identity_alias_accepted() {
        let app = test_app().await;

        let creds = json!({ "identity": "carol", "password": "hunter2" });
        let (status, _) = send(&app, Method::POST, "/register", None, Some(creds.clone())).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(&app, Method::POST, "/login", None, Some(creds)).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_duplicate_registration() {
        let app = test_app().await;
        let creds = json!({ "username": "alice", "password": "first" });

        let (status, _) = send(&app, Method::POST, "/register", None, Some(creds)).await;
        assert_eq!(status, StatusCode::OK);

        let again = json!({ "username": "alice", "password": "second" });
        let (status, body) = send(&app, Method::POST, "/register", None, Some(again)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "CONFLICT");

        // The first credentials still work and the second ones do not
        let (status, _) = send(
            &app,
            Method::POST,
            "/login",
            None,
            Some(json!({ "username": "alice", "password": "first" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(
            &app,
            Method::POST,
            "/login",
            None,
            Some(json!({ "username": "alice", "password": "second" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_malformed_bodies() {
        let app = test_app().await;

        for body in [
            json!({ "username": "alice" }),
            json!({ "password": "s3cret" }),
            json!({ "username": 42, "password": "s3cret" }),
            json!({ "username": "", "password": "s3cret" }),
            json!({ "username": "alice", "password": "" }),
            json!({ "username": "not valid!", "password": "s3cret" }),
            json!({ "username": "\u{0430}lice", "password": "s3cret" }),
            json!({ "username": "\u{e9}".repeat(10), "password": "s3cret" }),
            json!({ "username": "a".repeat(65), "password": "s3cret" }),
            json!("just a string"),
        ] {
            for uri in ["/register", "/login"] {
                let (status, _) = send(&app, Method::POST, uri, None, Some(body.clone())).await;
                assert_eq!(status, StatusCode::BAD_REQUEST, "{} {}", uri, body);
            }
        }

        // Not JSON at all
        let request = Request::builder()
            .method(Method::POST)
            .uri("/register")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let app = test_app().await;
        register_and_login(&app, "alice", "s3cret").await;

        let (unknown_status, unknown_body) = send(
            &app,
            Method::POST,
            "/login",
            None,
            Some(json!({ "username": "nobody", "password": "s3cret" })),
        )
        .await;
        let (wrong_status, wrong_body) = send(
            &app,
            Method::POST,
            "/login",
            None,
            Some(json!({ "username": "alice", "password": "wrong" })),
        )
        .await;

        assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
        assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
        assert_eq!(unknown_body, wrong_body);
    }

    #[tokio::test]
    async fn test_gate_rejects_without_token() {
        let app = test_app().await;

        for uri in ["/api/whoami", "/api/actors", "/api/actors/1"] {
            let (status, body) = send(&app, Method::GET, uri, None, None).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(body["error"]["message"], "Unauthorized");
        }

        // Public routes stay reachable
        let (status, body) = send(&app, Method::GET, "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_lookalike_username_rejected() {
        let app = test_app().await;
        register_and_login(&app, "alice", "s3cret").await;

        // Cyrillic U+0430 in place of the Latin "a"
        let (status, _) = send(
            &app,
            Method::POST,
            "/register",
            None,
            Some(json!({ "username": "\u{0430}lice", "password": "s3cret" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let longest = "a".repeat(64);
        let (status, _) = send(
            &app,
            Method::POST,
            "/register",
            None,
            Some(json!({ "username": longest, "password": "s3cret" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unlisted_health_alias_is_not_routed() {
        let app = test_app().await;
        let request = Request::builder()
            .uri("/healthz")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_token_from_another_key_rejected() {
        let app = test_app().await;
        register_and_login(&app, "alice", "s3cret").await;

        let forged = JwtManager::new("attacker-secret", 3600)
            .unwrap()
            .generate_token("alice")
            .unwrap();
        let (status, _) = send(&app, Method::GET, "/api/whoami", Some(&forged), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_actor_crud_behind_gate() {
        let app = test_app().await;
        let token = register_and_login(&app, "alice", "s3cret").await;

        let (status, created) = send(
            &app,
            Method::POST,
            "/api/actors",
            Some(&token),
            Some(json!({ "first_name": "PENELOPE", "last_name": "GUINESS" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["actor_id"].as_i64().unwrap();
        let uri = format!("/api/actors/{}", id);

        let (status, actor) = send(&app, Method::GET, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(actor["first_name"], "PENELOPE");

        let (status, actor) = send(
            &app,
            Method::PUT,
            &uri,
            Some(&token),
            Some(json!({ "first_name": "NICK", "last_name": "WAHLBERG" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(actor["last_name"], "WAHLBERG");

        let (status, list) = send(&app, Method::GET, "/api/actors", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list.as_array().unwrap().len(), 1);

        let (status, _) = send(&app, Method::DELETE, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(&app, Method::GET, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, Method::GET, "/api/actors/abc", Some(&token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
