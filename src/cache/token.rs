use crate::utils::constants::{DEFAULT_FALLBACK_LIFETIME_SECS, DEFAULT_SAFETY_MARGIN_SECS};

/// Vendor access token as returned by the credential exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorToken {
    pub value: String,
    /// Decoded `exp` claim in unix milliseconds, if the token carried one.
    pub expires_at_ms: Option<i64>,
}

impl VendorToken {
    pub fn new(value: String, expires_at_ms: Option<i64>) -> Self {
        Self { value, expires_at_ms }
    }
}

/// Lead time and fallback lifetime applied to cached vendor tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenPolicy {
    pub safety_margin_ms: i64,
    pub fallback_lifetime_ms: i64,
}

impl TokenPolicy {
    pub fn from_seconds(safety_margin_seconds: u64, fallback_lifetime_seconds: u64) -> Self {
        Self {
            safety_margin_ms: seconds_to_ms(safety_margin_seconds),
            fallback_lifetime_ms: seconds_to_ms(fallback_lifetime_seconds),
        }
    }
}

fn seconds_to_ms(seconds: u64) -> i64 {
    i64::try_from(seconds).unwrap_or(i64::MAX).saturating_mul(1000)
}

impl Default for TokenPolicy {
    fn default() -> Self {
        Self::from_seconds(DEFAULT_SAFETY_MARGIN_SECS, DEFAULT_FALLBACK_LIFETIME_SECS)
    }
}

/// Token held by the cache together with its effective expiry.
#[derive(Debug, Clone)]
pub struct CachedToken {
    pub token: VendorToken,
    /// `exp` of the token, or `stored_at + fallback` when it had none.
    pub expires_at_ms: i64,
    /// Served from cache only while `now < refresh_at_ms`.
    pub refresh_at_ms: i64,
}

impl CachedToken {
    pub fn new(token: VendorToken, stored_at_ms: i64, policy: &TokenPolicy) -> Self {
        let expires_at_ms = token
            .expires_at_ms
            .unwrap_or_else(|| stored_at_ms.saturating_add(policy.fallback_lifetime_ms));
        Self {
            token,
            expires_at_ms,
            refresh_at_ms: expires_at_ms.saturating_sub(policy.safety_margin_ms),
        }
    }

    /// Check if token can still be handed out
    pub fn is_fresh(&self, now_ms: i64) -> bool {
        now_ms < self.refresh_at_ms
    }
}
