//! Application state

use sakila_auth::{AuthError, HashParams, JwtManager, hash_password_with};
use sakila_db::Database;
use std::sync::Arc;

/// Prometheus handle rendered by the `/metrics` endpoint
pub type MetricsHandle = metrics_exporter_prometheus::PrometheusHandle;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub jwt: Arc<JwtManager>,
    /// Cost applied when hashing newly registered passwords
    pub hash_params: HashParams,
    /// Digest verified in place of a real one when a login names an unknown
    /// user, so that path costs the same as a wrong password
    pub dummy_hash: Arc<str>,
}

impl AppState {
    pub fn new(
        db: Database,
        jwt: Arc<JwtManager>,
        hash_params: HashParams,
    ) -> Result<Self, AuthError> {
        let dummy_hash = hash_password_with("timing-equalizer", &hash_params)?;

        Ok(Self {
            db,
            jwt,
            hash_params,
            dummy_hash: dummy_hash.into(),
        })
    }
}
