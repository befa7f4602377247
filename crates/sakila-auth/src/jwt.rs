//! JWT token management

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AuthError;

/// Algorithm used for both signing and verification, whatever a token's header claims
const ALGORITHM: Algorithm = Algorithm::HS256;

/// JWT claims
///
/// Decoding is strict: a payload missing any field, or carrying one with the
/// wrong type, is rejected rather than defaulted.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Authenticated identity
    pub username: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// JWT manager for token generation and validation
///
/// Tokens are always signed with the current key. Verification also accepts
/// signatures made with any retired key still inside its rotation window.
#[derive(Clone)]
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_keys: Vec<DecodingKey>,
    token_ttl: Duration,
}

impl JwtManager {
    /// Create a new JWT manager
    pub fn new(secret: &str, token_ttl_secs: i64) -> Result<Self, AuthError> {
        if secret.is_empty() {
            return Err(AuthError::SigningFailure("JWT secret is empty".to_string()));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_keys: vec![DecodingKey::from_secret(secret.as_bytes())],
            token_ttl: Duration::seconds(token_ttl_secs),
        })
    }

    /// Accept tokens signed with previously used secrets
    pub fn with_retired_keys<I, S>(mut self, retired: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for secret in retired {
            let secret = secret.as_ref();
            if !secret.is_empty() {
                self.decoding_keys
                    .push(DecodingKey::from_secret(secret.as_bytes()));
            }
        }
        self
    }

    /// Token lifetime in seconds
    pub fn token_ttl_secs(&self) -> i64 {
        self.token_ttl.num_seconds()
    }

    /// Generate a JWT token for a user
    pub fn generate_token(&self, username: &str) -> Result<String, AuthError> {
        self.generate_token_at(username, Utc::now())
    }

    /// Generate a JWT token as if issued at `issued_at`
    pub fn generate_token_at(
        &self,
        username: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let exp = issued_at + self.token_ttl;

        let claims = Claims {
            username: username.to_string(),
            iat: issued_at.timestamp(),
            exp: exp.timestamp(),
        };

        debug!("Generating token for user: {}", username);

        encode(&Header::new(ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| AuthError::SigningFailure(e.to_string()))
    }

    /// Validate a JWT token and return claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let segments: Vec<&str> = token.split('.').collect();
        if segments.len() != 3 || segments.iter().any(|s| s.is_empty()) {
            return Err(AuthError::MalformedToken);
        }

        let validation = Self::validation();
        let mut result = Err(AuthError::BadSignature);

        for key in &self.decoding_keys {
            match decode::<Claims>(token, key, &validation) {
                Ok(token_data) => {
                    result = Ok(token_data.claims);
                    break;
                }
                // Try the next key in the rotation window
                Err(e) if matches!(e.kind(), ErrorKind::InvalidSignature) => continue,
                Err(e) => {
                    result = Err(map_jwt_error(e.kind()));
                    break;
                }
            }
        }

        let claims = result?;

        // Check expiration
        let now = Utc::now().timestamp();
        if claims.exp < now {
            return Err(AuthError::TokenExpired);
        }

        Ok(claims)
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(ALGORITHM);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);
        validation
    }
}

/// Map a jsonwebtoken failure onto the verifier's error taxonomy
fn map_jwt_error(kind: &ErrorKind) -> AuthError {
    match kind {
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => AuthError::BadSignature,
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::MalformedToken,
    }
}
