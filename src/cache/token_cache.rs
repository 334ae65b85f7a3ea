use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::cache::token::{CachedToken, TokenPolicy, VendorToken};
use crate::error::AuthError;
use crate::helpers::time::{Clock, SystemClock};
use crate::observability::metrics::get_metrics;
use crate::sources::vendor_auth::VendorAuthenticator;

/// Holds at most one vendor access token and refreshes it on miss or expiry.
///
/// Concurrent misses are coalesced: only the first caller performs the
/// credential exchange, the others wait on `refresh` and then read its result.
pub struct TokenCache<A> {
    authenticator: A,
    clock: Arc<dyn Clock>,
    policy: TokenPolicy,
    inner: RwLock<Option<CachedToken>>,
    refresh: Mutex<()>,
}

impl<A: VendorAuthenticator> TokenCache<A> {
    pub fn new(authenticator: A, policy: TokenPolicy) -> Self {
        Self::with_clock(authenticator, policy, Arc::new(SystemClock))
    }

    pub fn with_clock(authenticator: A, policy: TokenPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            authenticator,
            clock,
            policy,
            inner: RwLock::new(None),
            refresh: Mutex::new(()),
        }
    }

    /// Return the cached token while it is outside the safety margin,
    /// otherwise exchange credentials for a fresh one.
    pub async fn get_valid_token(&self) -> Result<VendorToken, AuthError> {
        if let Some(token) = self.cached().await {
            return Ok(token);
        }

        let _guard = self.refresh.lock().await;
        // another caller may have refreshed while we waited
        if let Some(token) = self.cached().await {
            debug!("vendor token refreshed by concurrent caller");
            return Ok(token);
        }

        let token = self.authenticator.authenticate().await?;
        let now = self.clock.now_ms();
        let cached = CachedToken::new(token.clone(), now, &self.policy);

        if token.expires_at_ms.is_none() {
            info!(
                fallback_lifetime_ms = self.policy.fallback_lifetime_ms,
                "vendor token has no decodable expiry, using fallback lifetime"
            );
        }
        if !cached.is_fresh(now) {
            warn!(
                expires_at_ms = cached.expires_at_ms,
                "vendor issued a token already inside the safety margin"
            );
        }
        get_metrics()
            .await
            .vendor_token_expiry_unix_ms
            .set(cached.expires_at_ms);

        *self.inner.write().await = Some(cached);
        Ok(token)
    }

    /// Drop the cached token; the next `get_valid_token` exchanges again.
    pub async fn invalidate(&self) {
        if self.inner.write().await.take().is_some() {
            info!("vendor token invalidated");
        }
    }

    /// Current cache entry regardless of freshness.
    pub async fn peek(&self) -> Option<CachedToken> {
        self.inner.read().await.clone()
    }

    async fn cached(&self) -> Option<VendorToken> {
        let now = self.clock.now_ms();
        self.inner
            .read()
            .await
            .as_ref()
            .filter(|cached| cached.is_fresh(now))
            .map(|cached| cached.token.clone())
    }
}
