//! Registration, login, and identity routes

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::{get, post},
};
use sakila_auth::{AuthError, AuthUser, hash_password_with, verify_password};
use sakila_db::{DbError, NewUser};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::AppState;

use super::types::{LoginRequest, LoginResponse, MessageResponse, RegisterRequest};

// ==================== Input Validation ====================

/// Maximum allowed username length; usernames are ASCII so bytes equal characters
const MAX_USERNAME_LENGTH: usize = 64;
/// Maximum allowed password length (prevent DoS with very large passwords)
const MAX_PASSWORD_LENGTH: usize = 256;

/// Validate username format and length
fn validate_username(username: &str) -> Result<(), ApiError> {
    if username.is_empty() {
        return Err(ApiError::BadRequest("Username cannot be empty".to_string()));
    }
    if username.len() > MAX_USERNAME_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Username exceeds maximum length of {} characters",
            MAX_USERNAME_LENGTH
        )));
    }
    // ASCII only, so look-alike letters from other scripts cannot shadow a name
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(ApiError::BadRequest(
            "Username can only contain ASCII letters, digits, underscores, and hyphens"
                .to_string(),
        ));
    }
    Ok(())
}

/// Validate password length
fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.is_empty() {
        return Err(ApiError::BadRequest("Password cannot be empty".to_string()));
    }
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Password exceeds maximum length of {} characters",
            MAX_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

fn malformed_body(rejection: JsonRejection) -> ApiError {
    debug!("Rejected request body: {}", rejection.body_text());
    ApiError::BadRequest("Invalid request body".to_string())
}

// ==================== Auth Routes ====================

/// POST /register
async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(request) = payload.map_err(malformed_body)?;
    validate_username(&request.username)?;
    validate_password(&request.password)?;

    // Argon2 is deliberately slow; keep it off the async workers
    let params = state.hash_params;
    let password = request.password;
    let password_hash = tokio::task::spawn_blocking(move || hash_password_with(&password, &params))
        .await
        .map_err(|e| ApiError::Internal(format!("Task join error: {}", e)))??;

    let user = match state
        .db
        .insert_user(NewUser {
            username: request.username,
            password_hash,
        })
        .await
    {
        Ok(user) => user,
        Err(DbError::Duplicate(msg)) => {
            debug!("Registration refused: {}", msg);
            metrics::counter!("sakila_auth_registrations_total", "outcome" => "duplicate")
                .increment(1);
            return Err(ApiError::Conflict("Username already exists".to_string()));
        }
        Err(e) => return Err(e.into()),
    };

    metrics::counter!("sakila_auth_registrations_total", "outcome" => "created").increment(1);
    info!("Registered user {}", user.username);

    Ok(Json(MessageResponse {
        message: "user created".to_string(),
    }))
}

/// POST /login
async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(request) = payload.map_err(malformed_body)?;

    // Validate input lengths to prevent DoS
    validate_username(&request.username)?;
    validate_password(&request.password)?;

    debug!("Login attempt for user: {}", request.username);

    // Find user - but don't return early to prevent timing attacks
    let user = state.db.get_user_by_username(&request.username).await?;

    let hash_to_verify = match &user {
        Some(u) => u.password_hash.clone(),
        None => state.dummy_hash.to_string(),
    };

    let password = request.password;
    let password_valid =
        tokio::task::spawn_blocking(move || verify_password(&password, &hash_to_verify))
            .await
            .map_err(|e| ApiError::Internal(format!("Task join error: {}", e)))??;

    // Unknown user and wrong password are indistinguishable to the client
    let user = match (user, password_valid) {
        (Some(u), true) => u,
        _ => {
            metrics::counter!("sakila_auth_logins_total", "outcome" => "failure").increment(1);
            return Err(AuthError::InvalidCredentials.into());
        }
    };

    let token = state.jwt.generate_token(&user.username)?;

    metrics::counter!("sakila_auth_logins_total", "outcome" => "success").increment(1);
    info!("User {} logged in successfully", user.username);

    Ok(Json(LoginResponse {
        token,
        token_type: "Bearer",
        expires_in: state.jwt.token_ttl_secs(),
    }))
}

/// GET /api/whoami
async fn whoami(user: AuthUser) -> Json<AuthUser> {
    Json(user)
}

/// Public auth routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

/// Auth routes that require a verified identity
pub fn protected_routes() -> Router<AppState> {
    Router::new().route("/api/whoami", get(whoami))
}
