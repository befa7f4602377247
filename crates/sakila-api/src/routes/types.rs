//! Request and response types

use serde::{Deserialize, Serialize};

/// Body of `POST /register`
///
/// No `Debug` derive: the plaintext password must never reach a log line.
#[derive(Deserialize)]
pub struct RegisterRequest {
    #[serde(alias = "identity")]
    pub username: String,
    pub password: String,
}

/// Body of `POST /login`
#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(alias = "identity")]
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}
