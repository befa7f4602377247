//! Authentication middleware for Axum

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error};

use crate::error::AuthError;
use crate::jwt::{Claims, JwtManager};

/// Authenticated user information
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthUser {
    pub username: String,
}

impl AuthUser {
    /// Create from JWT claims
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            username: claims.username.clone(),
        }
    }
}

/// Extract bearer token from authorization header
fn extract_bearer_token(header: &str) -> Result<&str, AuthError> {
    let (scheme, token) = header.split_once(' ').ok_or(AuthError::MalformedToken)?;
    if !scheme.eq_ignore_ascii_case("Bearer") {
        return Err(AuthError::MalformedToken);
    }
    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::MalformedToken);
    }
    Ok(token)
}

fn authenticate(jwt_manager: &JwtManager, request: &Request) -> Result<AuthUser, AuthError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingCredential)?
        .to_str()
        .map_err(|_| AuthError::MalformedToken)?;

    let token = extract_bearer_token(header)?;
    let claims = jwt_manager.validate_token(token)?;
    Ok(AuthUser::from_claims(&claims))
}

/// Authentication middleware
///
/// Every request passing through this layer must carry a valid bearer token.
/// On success the `AuthUser` is added to request extensions; on failure the
/// request is answered with 401 and the inner service never runs.
pub async fn auth_middleware(
    State(jwt_manager): State<Arc<JwtManager>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let user = match authenticate(&jwt_manager, &request) {
        Ok(user) => user,
        Err(e) => {
            if e.is_operational() {
                error!("Token verification fault: {}", e);
            } else {
                debug!("Rejected {} {}: {}", request.method(), request.uri().path(), e);
            }
            metrics::counter!("sakila_auth_rejections_total", "reason" => e.reason()).increment(1);
            return Err(e);
        }
    };

    debug!("Authenticated user: {}", user.username);

    // Add user to request extensions
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Only present when the route sits behind `auth_middleware`
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AuthError::MissingCredential)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, http::StatusCode, middleware, routing::get};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    fn app(jwt: Arc<JwtManager>, calls: Arc<AtomicUsize>) -> Router {
        Router::new()
            .route(
                "/whoami",
                get(move |user: AuthUser| async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    user.username
                }),
            )
            .layer(middleware::from_fn_with_state(jwt, auth_middleware))
    }

    fn request(authorization: Option<&str>) -> Request {
        let mut builder = axum::http::Request::builder().uri("/whoami");
        if let Some(value) = authorization {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc.def.ghi").unwrap(), "abc.def.ghi");
        assert_eq!(extract_bearer_token("bearer abc").unwrap(), "abc");
        assert!(extract_bearer_token("Basic dXNlcjpwYXNz").is_err());
        assert!(extract_bearer_token("Bearer").is_err());
        assert!(extract_bearer_token("Bearer   ").is_err());
    }

    #[tokio::test]
    async fn test_missing_header_short_circuits() {
        let jwt = Arc::new(JwtManager::new("test-secret", 3600).unwrap());
        let calls = Arc::new(AtomicUsize::new(0));

        let response = app(jwt, calls.clone()).oneshot(request(None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_valid_token_reaches_handler() {
        let jwt = Arc::new(JwtManager::new("test-secret", 3600).unwrap());
        let calls = Arc::new(AtomicUsize::new(0));
        let token = jwt.generate_token("alice").unwrap();

        let response = app(jwt, calls.clone())
            .oneshot(request(Some(&format!("Bearer {}", token))))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "alice");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_rejections_share_one_body() {
        let jwt = Arc::new(JwtManager::new("test-secret", 3600).unwrap());
        let calls = Arc::new(AtomicUsize::new(0));
        let token = jwt.generate_token("alice").unwrap();
        let foreign = JwtManager::new("other-secret", 3600)
            .unwrap()
            .generate_token("alice")
            .unwrap();

        let mut bodies = Vec::new();
        for header in [
            None,
            Some("Token abc".to_string()),
            Some("Bearer not-a-jwt".to_string()),
            Some(format!("Bearer {}x", token)),
            Some(format!("Bearer {}", foreign)),
        ] {
            let response = app(jwt.clone(), calls.clone())
                .oneshot(request(header.as_deref()))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            bodies.push(body_string(response).await);
        }

        assert!(bodies.windows(2).all(|pair| pair[0] == pair[1]));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_extractor_without_middleware() {
        let app = Router::new().route("/whoami", get(|user: AuthUser| async move { user.username }));

        let response = app.oneshot(request(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
