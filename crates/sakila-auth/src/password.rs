//! Password hashing and verification (Argon2id)
//!
//! Digests are PHC strings such as `$argon2id$v=19$m=19456,t=2,p=1$<salt>$<hash>`.
//! The salt and cost parameters travel inside the digest, so verification
//! needs nothing but the stored string.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// Argon2 cost parameters applied to newly created digests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HashParams {
    /// Memory cost in KiB
    pub memory_kib: u32,
    /// Number of passes
    pub iterations: u32,
    /// Degree of parallelism
    pub parallelism: u32,
}

impl Default for HashParams {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

impl HashParams {
    fn hasher(&self) -> Result<Argon2<'static>, AuthError> {
        let params = Params::new(self.memory_kib, self.iterations, self.parallelism, None)
            .map_err(|e| AuthError::PasswordHash(e.to_string()))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

/// Hash a password with the default cost parameters
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    hash_password_with(password, &HashParams::default())
}

/// Hash a password with a fresh random salt and the given cost parameters
pub fn hash_password_with(password: &str, params: &HashParams) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = params
        .hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::PasswordHash(e.to_string()))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored digest
///
/// Returns `Ok(false)` on mismatch and `AuthError::MalformedDigest` when the
/// digest is not a parseable Argon2 PHC string.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AuthError::MalformedDigest(e.to_string()))?;
    Algorithm::try_from(parsed_hash.algorithm)
        .map_err(|e| AuthError::MalformedDigest(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
