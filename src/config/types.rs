use serde::Deserialize;

use crate::config::settings::SettingsConfig;
use crate::utils::constants::{
    DEFAULT_FALLBACK_LIFETIME_SECS, DEFAULT_HTTP_TIMEOUT_MS, DEFAULT_REDEEM_PATH,
    DEFAULT_SAFETY_MARGIN_SECS, DEFAULT_SESSION_TTL_SECS,
};

/// ================================
/// Full service configuration
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    pub settings: SettingsConfig,
    pub vendor: VendorConfig,
    pub session: SessionConfig,
}

/// ================================
/// Vendor (loyalty API)
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct VendorConfig {
    pub base_url: String,
    /// invariant: UUID shaped
    pub api_key: String,
    /// Redemption endpoints may live on a different host; empty means `base_url`.
    pub redeem_base_url: Option<String>,
    /// `{id}` is replaced by the customer id
    #[serde(default = "default_redeem_path")]
    pub redeem_path: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default)]
    pub token: VendorTokenConfig,
}

impl VendorConfig {
    pub fn redeem_base_url(&self) -> &str {
        self.redeem_base_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or(&self.base_url)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct VendorTokenConfig {
    /// cached token is not served once `now >= exp - safety_margin`
    #[serde(default = "default_safety_margin_seconds")]
    pub safety_margin_seconds: u64,
    /// lifetime assumed for tokens without a decodable expiry
    #[serde(default = "default_fallback_lifetime_seconds")]
    pub fallback_lifetime_seconds: u64,
}

impl Default for VendorTokenConfig {
    fn default() -> Self {
        Self {
            safety_margin_seconds: default_safety_margin_seconds(),
            fallback_lifetime_seconds: default_fallback_lifetime_seconds(),
        }
    }
}

/// ================================
/// Session credentials
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    /// invariant: at least 16 characters
    pub secret: String,
    #[serde(default = "default_session_ttl_seconds")]
    pub ttl_seconds: u64,
}

fn default_redeem_path() -> String {
    DEFAULT_REDEEM_PATH.to_string()
}

fn default_request_timeout_ms() -> u64 {
    DEFAULT_HTTP_TIMEOUT_MS
}

fn default_safety_margin_seconds() -> u64 {
    DEFAULT_SAFETY_MARGIN_SECS
}

fn default_fallback_lifetime_seconds() -> u64 {
    DEFAULT_FALLBACK_LIFETIME_SECS
}

fn default_session_ttl_seconds() -> u64 {
    DEFAULT_SESSION_TTL_SECS
}
