//! Sakila API Database Layer
//!
//! This crate provides the persistence layer for the Sakila API: the
//! credential store backing registration and login, and the actor
//! resource store served behind the authorization gate. SQLite via sqlx.

pub mod error;
pub mod models;
pub mod repository;
pub mod utils;

pub use error::DbError;
pub use models::*;
pub use repository::Database;
