//! API error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(#[from] sakila_db::DbError),

    #[error("Auth error: {0}")]
    Auth(#[from] sakila_auth::AuthError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            ApiError::Internal(msg) => {
                error!("Internal error: {}", msg);
                internal()
            }
            ApiError::Database(e) => match e {
                sakila_db::DbError::Duplicate(msg) => {
                    (StatusCode::CONFLICT, "CONFLICT", msg.clone())
                }
                sakila_db::DbError::Connection(_) => {
                    error!("Store unavailable: {}", e);
                    internal()
                }
            },
            ApiError::Auth(e) => {
                if e.is_operational() {
                    error!("Authentication fault: {}", e);
                }
                let (status, message) = e.status_and_message();
                let code = if status == StatusCode::UNAUTHORIZED {
                    "UNAUTHORIZED"
                } else {
                    "INTERNAL_ERROR"
                };
                (status, code, message.to_string())
            }
        };

        let body = axum::Json(json!({
            "error": {
                "code": code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Generic 500; details stay in the server log
fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "Internal error".to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use sakila_auth::AuthError;
    use sakila_db::DbError;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ApiError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
            (ApiError::Conflict("x".into()), StatusCode::CONFLICT),
            (ApiError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (ApiError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (DbError::Duplicate("x".into()).into(), StatusCode::CONFLICT),
            (
                DbError::Connection(sqlx::Error::PoolClosed).into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (AuthError::InvalidCredentials.into(), StatusCode::UNAUTHORIZED),
            (AuthError::TokenExpired.into(), StatusCode::UNAUTHORIZED),
            (
                AuthError::SigningFailure("x".into()).into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[tokio::test]
    async fn test_store_failure_hides_details() {
        let err: ApiError = DbError::Connection(sqlx::Error::PoolClosed).into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "INTERNAL_ERROR");
        assert_eq!(body["error"]["message"], "Internal error");
    }
}
