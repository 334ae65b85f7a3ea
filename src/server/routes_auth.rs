use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::json;
use tracing::info;

use crate::observability::metrics::get_metrics;
use crate::proxy::request::ProxyRequestSpec;
use crate::server::error::ApiError;
use crate::server::payloads::{required_id, required_text, TotpRequest, TotpVerifyRequest, VendorTotpRequest};
use crate::server::routes_api::relay;
use crate::server::server::AppState;

pub const VENDOR_TOTP_PATH: &str = "/auth/totp";
pub const VENDOR_TOTP_VERIFY_PATH: &str = "/auth/totp/verify";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/totp/request", post(request_totp))
        .route("/auth/totp/verify", post(verify_totp))
}

/// Ask the vendor to send a one-time code to the customer.
async fn request_totp(
    State(state): State<AppState>,
    payload: Result<Json<TotpRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload.map_err(ApiError::from_rejection)?;
    let body = VendorTotpRequest {
        customer_id: required_id(&request.customer_id, "customer_id")?,
        extra: request.extra,
    };
    let body = serde_json::to_value(body).map_err(|e| ApiError::Internal(e.to_string()))?;

    let response = state
        .proxy
        .call(&ProxyRequestSpec::post(VENDOR_TOTP_PATH).with_json(body))
        .await?;
    relay(response)
}

/// Check the one-time code with the vendor and issue a session on success.
async fn verify_totp(
    State(state): State<AppState>,
    payload: Result<Json<TotpVerifyRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload.map_err(ApiError::from_rejection)?;
    let customer_id = required_id(&request.customer_id, "customer_id")?;
    let code = required_text(&request.code, "code")?;

    let spec = ProxyRequestSpec::get(VENDOR_TOTP_VERIFY_PATH)
        .with_query("code", code)
        .with_query("customer_id", customer_id.clone());
    let response = state.proxy.call(&spec).await?;
    if !response.is_success() {
        return Err(ApiError::upstream(&response));
    }

    let credential = state.sessions.issue(&customer_id)?;
    get_metrics().await.session_issued.inc();
    info!(customer_id = %customer_id, expires_at = credential.expires_at, "session issued");

    Ok(Json(json!({
        "ok": true,
        "token": credential.token,
        "expires_in": credential.expires_in,
        "masivo_verify": response.body_value(),
    }))
    .into_response())
}
