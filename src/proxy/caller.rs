use std::sync::Arc;

use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderValue, StatusCode};
use reqwest::Client;
use tracing::{debug, info};

use crate::cache::token_cache::TokenCache;
use crate::error::ProxyError;
use crate::helpers::time::get_instant;
use crate::observability::metrics::get_metrics;
use crate::proxy::request::{ProxyRequestSpec, RawResponse};
use crate::resilience::retry::{Attempt, RetryBudget};
use crate::sources::vendor_auth::VendorAuthenticator;

static TRANSPORT_MSG: &str = "transport";

/// Issues vendor requests carrying the current vendor token and
/// re-authenticates once when the vendor answers 401.
pub struct AuthenticatedProxyCaller<A> {
    client: Client,
    base_url: String,
    cache: Arc<TokenCache<A>>,
    retry: RetryBudget,
}

impl<A: VendorAuthenticator> AuthenticatedProxyCaller<A> {
    pub fn new(client: Client, base_url: &str, cache: Arc<TokenCache<A>>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            cache,
            retry: RetryBudget::default(),
        }
    }

    pub async fn call(&self, spec: &ProxyRequestSpec) -> Result<RawResponse, ProxyError> {
        self.retry
            .run(move |attempt| self.attempt(spec, attempt))
            .await
    }

    async fn attempt(
        &self,
        spec: &ProxyRequestSpec,
        attempt: u32,
    ) -> Result<Attempt<RawResponse>, ProxyError> {
        if attempt > 1 {
            info!(path = %spec.path, "vendor rejected token, re-authenticating");
            get_metrics().await.vendor_reauth_retries.inc();
            self.cache.invalidate().await;
        }

        let token = self.cache.get_valid_token().await?;
        let response = self.send(spec, &token.value).await?;

        if response.status == StatusCode::UNAUTHORIZED {
            Ok(Attempt::Rejected(response))
        } else {
            Ok(Attempt::Accepted(response))
        }
    }

    async fn send(&self, spec: &ProxyRequestSpec, token: &str) -> Result<RawResponse, ProxyError> {
        let metrics = get_metrics().await;
        let start = get_instant();
        let method = spec.method.as_str();
        let url = spec.url(&self.base_url);

        let mut headers = spec.headers.clone();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|e| ProxyError::InvalidRequest(format!("vendor token is not a valid header: {}", e)))?;
        headers.insert(AUTHORIZATION, bearer);

        let mut request = self.client.request(spec.method.clone(), &url);
        if !spec.query.is_empty() {
            request = request.query(&spec.query);
        }
        if let Some(body) = &spec.body {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            request = request.body(body.to_string());
        }
        request = request.headers(headers);

        debug!(method, url = %url, "vendor call");
        let result = async {
            let response = request.send().await?;
            let status = response.status();
            let text = response.text().await?;
            Ok::<_, reqwest::Error>(RawResponse::new(status, text))
        }
        .await;

        metrics
            .vendor_call_duration
            .with_label_values(&[method])
            .observe(start.elapsed().as_secs_f64());

        match result {
            Ok(response) => {
                metrics
                    .vendor_calls
                    .with_label_values(&[method, response.status.as_str()])
                    .inc();
                debug!(method, url = %url, status = %response.status, "vendor responded");
                Ok(response)
            }
            Err(e) => {
                metrics.vendor_calls.with_label_values(&[method, TRANSPORT_MSG]).inc();
                Err(ProxyError::Transport(e.to_string()))
            }
        }
    }
}
