use anyhow::{anyhow, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde_json::Value;
use tracing::debug;

/// Decode the `exp` claim of a segmented token into unix milliseconds.
///
/// Returns `None` on any decoding failure; callers fall back to a fixed
/// lifetime instead of surfacing an error.
pub fn decode_expiry_ms(token_value: &str) -> Option<i64> {
    match decode_exp_claim(token_value) {
        Ok(exp_ms) => {
            debug!(expires_at_ms = exp_ms, "token expiry decoded");
            Some(exp_ms)
        }
        Err(e) => {
            debug!(error = %e, "token expiry not decodable");
            None
        }
    }
}

fn decode_exp_claim(token_value: &str) -> Result<i64> {
    let parts: Vec<&str> = token_value.split('.').collect();
    if parts.len() < 2 {
        return Err(anyhow!("token is not segmented"));
    }

    let payload = parts[1].trim_end_matches('=');
    let decoded = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| anyhow!("base64 decode error: {}", e))?;

    let claims: Value =
        serde_json::from_slice(&decoded).map_err(|e| anyhow!("invalid token payload: {}", e))?;

    let exp = claims
        .get("exp")
        .and_then(Value::as_f64)
        .filter(|exp| exp.is_finite() && *exp > 0.0)
        .ok_or_else(|| anyhow!("numeric 'exp' claim not found"))?;

    Ok((exp * 1000.0) as i64)
}
