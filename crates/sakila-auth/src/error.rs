//! Authentication error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    /// Unknown identity or wrong password; the two are never distinguished
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Missing authorization header")]
    MissingCredential,

    #[error("Malformed token")]
    MalformedToken,

    #[error("Token signature mismatch")]
    BadSignature,

    #[error("Token expired")]
    TokenExpired,

    #[error("Token signing failed: {0}")]
    SigningFailure(String),

    #[error("Malformed password digest: {0}")]
    MalformedDigest(String),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),
}

impl AuthError {
    /// Faults on the server side, as opposed to routine rejections of client input
    pub fn is_operational(&self) -> bool {
        matches!(
            self,
            AuthError::SigningFailure(_) | AuthError::MalformedDigest(_) | AuthError::PasswordHash(_)
        )
    }

    /// Short label used for logs and metrics
    pub fn reason(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::MissingCredential => "missing_credential",
            AuthError::MalformedToken => "malformed_token",
            AuthError::BadSignature => "bad_signature",
            AuthError::TokenExpired => "token_expired",
            AuthError::SigningFailure(_) => "signing_failure",
            AuthError::MalformedDigest(_) => "malformed_digest",
            AuthError::PasswordHash(_) => "password_hash",
        }
    }

    /// Status code and client-facing message
    ///
    /// Every authentication failure shares one body so clients cannot tell
    /// which check rejected them.
    pub fn status_and_message(&self) -> (StatusCode, &'static str) {
        if self.is_operational() {
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
        } else {
            (StatusCode::UNAUTHORIZED, "Unauthorized")
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        let code = if status == StatusCode::UNAUTHORIZED {
            "UNAUTHORIZED"
        } else {
            "INTERNAL_ERROR"
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
