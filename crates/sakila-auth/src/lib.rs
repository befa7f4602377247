//! Sakila API Authentication and Authorization
//!
//! This crate provides Argon2 password hashing, HS256 JWT issuance and
//! verification, and the Axum middleware that gates protected routes.

pub mod error;
pub mod jwt;
pub mod middleware;
pub mod password;

pub use error::AuthError;
pub use jwt::{Claims, JwtManager};
pub use middleware::{AuthUser, auth_middleware};
pub use password::{HashParams, hash_password, hash_password_with, verify_password};
