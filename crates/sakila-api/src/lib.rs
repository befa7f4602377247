//! Sakila API HTTP layer
//!
//! This crate provides the Axum router for the Sakila API: registration
//! and login, and the actor resource routes mounted behind the
//! authorization gate.

pub mod error;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::{AppState, MetricsHandle};
