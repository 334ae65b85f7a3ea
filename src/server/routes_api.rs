use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::json;
use tracing::{debug, warn};

use crate::proxy::request::{ProxyRequestSpec, RawResponse};
use crate::server::error::ApiError;
use crate::server::extract::SessionUser;
use crate::server::payloads::{
    BehaviorEventRequest, RedeemPreviewRequest, RedeemRequest, VendorBehaviorEvent,
    VendorRedeemPreview, VendorRedeemRequest,
};
use crate::server::server::AppState;

pub const VENDOR_BEHAVIOR_EVENTS_PATH: &str = "/behavior/events";
pub const VENDOR_REDEEM_PREVIEW_PATH: &str = "/redeem/preview";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/me", get(me))
        .route("/api/me/customer", get(customer))
        .route("/api/behavior/events", post(behavior_event))
        .route("/api/rewards/redeem/preview", put(redeem_preview))
        .route("/api/rewards/redeem", post(redeem))
}

/// Vendor success is relayed with its status and body, anything else is an upstream error.
pub fn relay(response: RawResponse) -> Result<Response, ApiError> {
    if !response.is_success() {
        return Err(ApiError::upstream(&response));
    }
    Ok((response.status, Json(response.body_value())).into_response())
}

async fn me(SessionUser(claims): SessionUser) -> Json<serde_json::Value> {
    Json(json!({ "ok": true, "user": claims }))
}

async fn customer(
    State(state): State<AppState>,
    SessionUser(claims): SessionUser,
) -> Result<Response, ApiError> {
    let path = format!("/customers/{}", claims.customer_id);
    let response = state.proxy.call(&ProxyRequestSpec::get(path)).await?;
    relay(response)
}

async fn behavior_event(
    State(state): State<AppState>,
    SessionUser(claims): SessionUser,
    payload: Result<Json<BehaviorEventRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload.map_err(ApiError::from_rejection)?;
    let event = VendorBehaviorEvent::try_from(request)?;
    if event.customer_id != claims.customer_id {
        debug!(session = %claims.customer_id, body = %event.customer_id, "event for another customer id");
    }
    let body = serde_json::to_value(event).map_err(|e| ApiError::Internal(e.to_string()))?;

    let response = state
        .proxy
        .call(&ProxyRequestSpec::post(VENDOR_BEHAVIOR_EVENTS_PATH).with_json(body))
        .await?;
    relay(response)
}

async fn redeem_preview(
    State(state): State<AppState>,
    SessionUser(_): SessionUser,
    payload: Result<Json<RedeemPreviewRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload.map_err(ApiError::from_rejection)?;
    let preview = VendorRedeemPreview::try_from(request)?;
    let body = serde_json::to_value(preview).map_err(|e| ApiError::Internal(e.to_string()))?;

    let spec = ProxyRequestSpec::put(VENDOR_REDEEM_PREVIEW_PATH)
        .with_base_url(state.redeem.base_url.clone())
        .with_json(body);
    let response = state.proxy.call(&spec).await?;
    relay(response)
}

async fn redeem(
    State(state): State<AppState>,
    SessionUser(_): SessionUser,
    payload: Result<Json<RedeemRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload.map_err(ApiError::from_rejection)?;
    let redemption = VendorRedeemRequest::try_from(request)?;
    let path = state.redeem.path_for(&redemption.customer_id);
    let body = serde_json::to_value(redemption).map_err(|e| ApiError::Internal(e.to_string()))?;

    let spec = ProxyRequestSpec::post(path)
        .with_base_url(state.redeem.base_url.clone())
        .with_json(body);
    let response = state.proxy.call(&spec).await?;

    if response.status == StatusCode::NOT_FOUND {
        warn!(url = %spec.url(&state.redeem.base_url), "vendor reported redemption target not found");
        return Err(ApiError::RedeemNotFound { detail: response.body_value() });
    }
    relay(response)
}
