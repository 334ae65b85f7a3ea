use std::future::Future;

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::cache::token::VendorToken;
use crate::error::AuthError;
use crate::helpers::time::get_instant;
use crate::observability::metrics::get_metrics;
use crate::parser::parser::decode_expiry_ms;

pub const AUTHORIZE_PATH: &str = "/auth/authorize";
pub const API_KEY_HEADER: &str = "x-api-key";

static OK_MSG: &str = "ok";
static REJECTED_MSG: &str = "rejected";
static MALFORMED_MSG: &str = "malformed";
static TRANSPORT_MSG: &str = "transport";

/// Exchanges static credentials for a vendor access token.
pub trait VendorAuthenticator: Send + Sync {
    fn authenticate(&self) -> impl Future<Output = Result<VendorToken, AuthError>> + Send;
}

/// `{ "data": "<token>" }`
#[derive(Debug, Deserialize)]
struct AuthorizeResponse {
    data: Option<Value>,
}

/// Authenticator backed by `GET {base}/auth/authorize` with an `x-api-key` header.
#[derive(Debug, Clone)]
pub struct HttpVendorAuthenticator {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpVendorAuthenticator {
    pub fn new(client: Client, base_url: &str, api_key: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            api_key: api_key.to_owned(),
        }
    }

    async fn exchange(&self, url: &str) -> Result<VendorToken, AuthError> {
        let response = self
            .client
            .get(url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(AuthError::VendorRejected { status: status.as_u16(), body });
        }

        let value = serde_json::from_str::<AuthorizeResponse>(&body)
            .ok()
            .and_then(|parsed| parsed.data)
            .and_then(|data| data.as_str().map(str::to_owned))
            .filter(|token| !token.is_empty())
            .ok_or_else(|| AuthError::MissingVendorToken(body.clone()))?;

        let expires_at_ms = decode_expiry_ms(&value);
        Ok(VendorToken::new(value, expires_at_ms))
    }
}

impl VendorAuthenticator for HttpVendorAuthenticator {
    async fn authenticate(&self) -> Result<VendorToken, AuthError> {
        let metrics = get_metrics().await;
        let start = get_instant();
        let url = format!("{}{}", self.base_url, AUTHORIZE_PATH);
        debug!(url = %url, "vendor credential exchange");

        let result = self.exchange(&url).await;

        metrics
            .vendor_auth_duration
            .observe(start.elapsed().as_secs_f64());

        let outcome = match &result {
            Ok(token) => {
                info!(expires_at_ms = ?token.expires_at_ms, "vendor token acquired");
                OK_MSG
            }
            Err(e) => {
                warn!(error = %e, "vendor credential exchange failed");
                match e {
                    AuthError::VendorRejected { .. } => REJECTED_MSG,
                    AuthError::MissingVendorToken(_) => MALFORMED_MSG,
                    _ => TRANSPORT_MSG,
                }
            }
        };
        metrics.vendor_auth_requests.with_label_values(&[outcome]).inc();

        result
    }
}
