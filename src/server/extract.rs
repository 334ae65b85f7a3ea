use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use tracing::debug;

use crate::error::AuthError;
use crate::server::error::ApiError;
use crate::server::server::AppState;
use crate::session::claims::SessionClaims;

/// Verified session of the caller, recovered from `Authorization: Bearer`.
#[derive(Debug, Clone)]
pub struct SessionUser(pub SessionClaims);

impl FromRequestParts<AppState> for SessionUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(bearer_token)
            .ok_or(ApiError::Unauthorized(AuthError::MissingSession))?;

        state
            .sessions
            .verify(token)
            .map(SessionUser)
            .inspect_err(|e| debug!(error = %e, path = %parts.uri.path(), "session rejected"))
            .map_err(ApiError::Unauthorized)
    }
}

fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
