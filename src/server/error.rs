//! Inbound error taxonomy and its mapping to HTTP responses.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{error, warn};

use crate::error::{AuthError, ProxyError, SessionError};
use crate::observability::metrics::try_metrics;
use crate::proxy::request::RawResponse;

pub const REDEEM_NOT_FOUND_HINT: &str = "The vendor could not find the redemption resource. \
Check vendor.redeem_base_url and vendor.redeem_path, and that the customer_id and reward_id exist for this brand.";

#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed caller input; never reaches the vendor.
    #[error("{0}")]
    Validation(String),

    /// Missing, invalid or expired session credential.
    #[error(transparent)]
    Unauthorized(AuthError),

    /// Vendor non-success after any retry; status relayed verbatim.
    #[error("vendor request failed with status {status}")]
    Upstream { status: StatusCode, detail: Value },

    /// Vendor answered 404 on redemption.
    #[error("vendor reported the redemption target as not found")]
    RedeemNotFound { detail: Value },

    /// Vendor unreachable or answered the credential exchange with garbage.
    #[error("vendor unavailable: {0}")]
    BadGateway(String),

    /// Any other fault; details are logged, never returned.
    #[error("internal error")]
    Internal(String),
}

impl ApiError {
    pub fn upstream(response: &RawResponse) -> Self {
        ApiError::Upstream {
            status: response.status,
            detail: response.body_value(),
        }
    }

    pub fn from_rejection(rejection: JsonRejection) -> Self {
        ApiError::Validation(format!("invalid JSON body: {}", rejection.body_text()))
    }

    fn kind(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation",
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::Upstream { .. } => "upstream",
            ApiError::RedeemNotFound { .. } => "redeem_not_found",
            ApiError::BadGateway(_) => "bad_gateway",
            ApiError::Internal(_) => "internal",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Upstream { status, .. } => *status,
            ApiError::RedeemNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::VendorRejected { status, body } => ApiError::Upstream {
                status: StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                detail: serde_json::from_str(&body).unwrap_or(Value::String(body)),
            },
            AuthError::MissingVendorToken(_) => {
                ApiError::BadGateway("vendor authentication response has no token".to_owned())
            }
            AuthError::Transport(msg) => ApiError::BadGateway(msg),
            session => ApiError::Unauthorized(session),
        }
    }
}

impl From<ProxyError> for ApiError {
    fn from(e: ProxyError) -> Self {
        match e {
            ProxyError::Auth(auth) => auth.into(),
            ProxyError::Transport(msg) => ApiError::BadGateway(msg),
            ProxyError::InvalidRequest(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(e: SessionError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let Some(metrics) = try_metrics() {
            metrics.api_errors.with_label_values(&[self.kind()]).inc();
        }

        let body = match &self {
            ApiError::Internal(detail) => {
                error!(detail = %detail, "internal error");
                json!({ "ok": false, "error": "internal error" })
            }
            ApiError::Upstream { detail, .. } => {
                warn!(status = %status, "vendor error relayed");
                json!({ "ok": false, "error": self.to_string(), "detail": detail })
            }
            ApiError::RedeemNotFound { detail } => json!({
                "ok": false,
                "error": self.to_string(),
                "detail": detail,
                "hint": REDEEM_NOT_FOUND_HINT,
            }),
            ApiError::BadGateway(detail) => {
                warn!(detail = %detail, "vendor unavailable");
                json!({ "ok": false, "error": "vendor unavailable" })
            }
            _ => json!({ "ok": false, "error": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}
