//! Actor resource routes
//!
//! Thin plumbing over the actor store; every route here sits behind the
//! authorization gate.

use axum::{
    Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    routing::get,
};
use sakila_auth::AuthUser;
use sakila_db::{Actor, NewActor};
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;

fn actor_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, ApiError> {
    path.map(|Path(id)| id)
        .map_err(|_| ApiError::BadRequest("Invalid actor id".to_string()))
}

fn actor_body(payload: Result<Json<NewActor>, JsonRejection>) -> Result<NewActor, ApiError> {
    payload
        .map(|Json(actor)| actor)
        .map_err(|_| ApiError::BadRequest("Invalid request body".to_string()))
}

fn not_found(actor_id: i64) -> ApiError {
    ApiError::NotFound(format!("Actor {} not found", actor_id))
}

/// GET /api/actors
async fn list_actors(State(state): State<AppState>) -> Result<Json<Vec<Actor>>, ApiError> {
    Ok(Json(state.db.list_actors().await?))
}

/// GET /api/actors/{id}
async fn get_actor(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Actor>, ApiError> {
    let id = actor_id(path)?;
    let actor = state.db.get_actor(id).await?.ok_or_else(|| not_found(id))?;
    Ok(Json(actor))
}

/// POST /api/actors
async fn create_actor(
    user: AuthUser,
    State(state): State<AppState>,
    payload: Result<Json<NewActor>, JsonRejection>,
) -> Result<(StatusCode, Json<Actor>), ApiError> {
    let actor = state.db.insert_actor(actor_body(payload)?).await?;
    debug!("Actor {} created by {}", actor.actor_id, user.username);
    Ok((StatusCode::CREATED, Json(actor)))
}

/// PUT /api/actors/{id}
async fn update_actor(
    user: AuthUser,
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<NewActor>, JsonRejection>,
) -> Result<Json<Actor>, ApiError> {
    let id = actor_id(path)?;
    let actor = state
        .db
        .update_actor(id, actor_body(payload)?)
        .await?
        .ok_or_else(|| not_found(id))?;
    debug!("Actor {} updated by {}", id, user.username);
    Ok(Json(actor))
}

/// DELETE /api/actors/{id}
async fn delete_actor(
    user: AuthUser,
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let id = actor_id(path)?;
    if !state.db.delete_actor(id).await? {
        return Err(not_found(id));
    }
    debug!("Actor {} deleted by {}", id, user.username);
    Ok(StatusCode::NO_CONTENT)
}

/// Create actor routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/actors", get(list_actors).post(create_actor))
        .route(
            "/api/actors/{id}",
            get(get_actor).put(update_actor).delete(delete_actor),
        )
}
