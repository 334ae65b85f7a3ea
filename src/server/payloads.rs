//! Inbound request bodies, outbound vendor bodies and boundary validation.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::server::error::ApiError;

/// Identifiers may end up in vendor url paths.
static ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9._@+-]{1,128}$").expect("valid id pattern"));

// ---------- inbound ----------

#[derive(Debug, Deserialize)]
pub struct TotpRequest {
    pub customer_id: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct TotpVerifyRequest {
    pub customer_id: Option<Value>,
    pub code: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct BehaviorEventRequest {
    pub customer_id: Option<Value>,
    pub event_type: Option<Value>,
    pub brand_id: Option<Value>,
    pub order: Option<Value>,
    pub amount: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct RedeemPreviewRequest {
    pub order: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct RedeemRequest {
    pub customer_id: Option<Value>,
    pub reward_id: Option<Value>,
    pub amount: Option<Value>,
}

// ---------- outbound ----------

#[derive(Debug, Serialize)]
pub struct VendorTotpRequest {
    pub customer_id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Serialize)]
pub struct VendorBehaviorEvent {
    pub customer_id: String,
    pub event_type: String,
    pub brand_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Serialize)]
pub struct VendorRedeemPreview {
    pub order: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Serialize)]
pub struct VendorRedeemRequest {
    pub customer_id: String,
    pub reward_id: String,
    pub amount: f64,
}

impl TryFrom<BehaviorEventRequest> for VendorBehaviorEvent {
    type Error = ApiError;

    fn try_from(request: BehaviorEventRequest) -> Result<Self, Self::Error> {
        let customer_id = required_id(&request.customer_id, "customer_id")?;
        let event_type = required_text(&request.event_type, "event_type")?;
        let brand_id = required_id(&request.brand_id, "brand_id")?;
        let order = optional_object(&request.order, "order")?;
        let amount = optional_positive_amount(&request.amount, "amount")?;

        if order.is_none() && amount.is_none() {
            return Err(ApiError::Validation("order or amount is required".to_owned()));
        }

        Ok(Self { customer_id, event_type, brand_id, order, amount, extra: request.extra })
    }
}

impl TryFrom<RedeemPreviewRequest> for VendorRedeemPreview {
    type Error = ApiError;

    fn try_from(request: RedeemPreviewRequest) -> Result<Self, Self::Error> {
        let order = optional_object(&request.order, "order")?
            .ok_or_else(|| ApiError::Validation("order is required".to_owned()))?;
        Ok(Self { order, extra: request.extra })
    }
}

impl TryFrom<RedeemRequest> for VendorRedeemRequest {
    type Error = ApiError;

    fn try_from(request: RedeemRequest) -> Result<Self, Self::Error> {
        let customer_id = required_id(&request.customer_id, "customer_id")?;
        let reward_id = required_id(&request.reward_id, "reward_id")?;
        let amount = optional_positive_amount(&request.amount, "amount")?
            .ok_or_else(|| ApiError::Validation("amount is required".to_owned()))?;
        Ok(Self { customer_id, reward_id, amount })
    }
}

// ---------- field rules ----------

/// Non-empty text or integer, normalised to a string.
pub fn required_text(value: &Option<Value>, field: &str) -> Result<String, ApiError> {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_owned()),
        Some(Value::Number(n)) if n.is_i64() || n.is_u64() => Ok(n.to_string()),
        None | Some(Value::Null) => Err(ApiError::Validation(format!("{} is required", field))),
        Some(Value::String(_)) => Err(ApiError::Validation(format!("{} is required", field))),
        Some(_) => Err(ApiError::Validation(format!("{} must be a string", field))),
    }
}

/// Like `required_text`, restricted to characters safe in a url path.
pub fn required_id(value: &Option<Value>, field: &str) -> Result<String, ApiError> {
    let id = required_text(value, field)?;
    if ID_RE.is_match(&id) {
        Ok(id)
    } else {
        Err(ApiError::Validation(format!("{} has invalid characters", field)))
    }
}

pub fn optional_object(
    value: &Option<Value>,
    field: &str,
) -> Result<Option<Map<String, Value>>, ApiError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map.clone())),
        Some(_) => Err(ApiError::Validation(format!("{} must be an object", field))),
    }
}

pub fn optional_positive_amount(value: &Option<Value>, field: &str) -> Result<Option<f64>, ApiError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => match n.as_f64() {
            Some(amount) if amount.is_finite() && amount > 0.0 => Ok(Some(amount)),
            _ => Err(ApiError::Validation(format!("{} must be greater than 0", field))),
        },
        Some(_) => Err(ApiError::Validation(format!("{} must be a number", field))),
    }
}
