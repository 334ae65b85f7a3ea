use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::routing::get;
use axum::{Json, Router};
use reqwest::Client;
use serde_json::{json, Value};
use tracing::info;

use crate::cache::token::TokenPolicy;
use crate::cache::token_cache::TokenCache;
use crate::config::settings::MetricsConfig;
use crate::config::types::VendorConfig;
use crate::observability::metrics::get_metrics;
use crate::observability::routes::MetricsState;
use crate::proxy::caller::AuthenticatedProxyCaller;
use crate::server::{routes_api, routes_auth};
use crate::session::issuer::SessionIssuer;
use crate::sources::vendor_auth::HttpVendorAuthenticator;
use crate::ServiceConfig;

pub type VendorProxy = AuthenticatedProxyCaller<HttpVendorAuthenticator>;

/// Where redemption calls go; may differ from the main vendor base url.
#[derive(Debug, Clone)]
pub struct RedeemTarget {
    pub base_url: String,
    /// `{id}` is replaced by the customer id
    pub path_template: String,
}

impl RedeemTarget {
    pub fn new(vendor: &VendorConfig) -> Self {
        Self {
            base_url: vendor.redeem_base_url().trim_end_matches('/').to_owned(),
            path_template: vendor.redeem_path.clone(),
        }
    }

    pub fn path_for(&self, customer_id: &str) -> String {
        self.path_template.replace("{id}", customer_id)
    }
}

#[derive(Clone)]
pub struct AppState {
    pub proxy: Arc<VendorProxy>,
    pub sessions: Arc<SessionIssuer>,
    pub redeem: Arc<RedeemTarget>,
    pub metrics_state: MetricsState,
}

impl AppState {
    /// Wire the vendor client, token cache, proxy caller and session issuer.
    pub async fn from_config(service_config: &ServiceConfig) -> Result<Self> {
        let vendor = &service_config.vendor;
        let client = Client::builder()
            .timeout(Duration::from_millis(vendor.request_timeout_ms))
            .build()?;

        let authenticator = HttpVendorAuthenticator::new(client.clone(), &vendor.base_url, &vendor.api_key);
        let policy = TokenPolicy::from_seconds(
            vendor.token.safety_margin_seconds,
            vendor.token.fallback_lifetime_seconds,
        );
        let cache = Arc::new(TokenCache::new(authenticator, policy));
        let proxy = AuthenticatedProxyCaller::new(client, &vendor.base_url, cache);

        let session = &service_config.session;
        let metrics = get_metrics().await;

        Ok(Self {
            proxy: Arc::new(proxy),
            sessions: Arc::new(SessionIssuer::new(&session.secret, session.ttl_seconds)),
            redeem: Arc::new(RedeemTarget::new(vendor)),
            metrics_state: MetricsState::new(metrics.registry.clone()),
        })
    }
}

pub fn router(state: AppState, metrics_config: &MetricsConfig) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(routes_auth::router())
        .merge(routes_api::router())
        .merge(state.metrics_state.router(metrics_config))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "ok": true }))
}

/// Start the HTTP server and run until ctrl-c / SIGTERM.
pub async fn start(service_config: &ServiceConfig) -> Result<()> {
    let metrics = get_metrics().await;
    let state = AppState::from_config(service_config).await?;
    let app = router(state, &service_config.settings.metrics);

    let bind_addr = &service_config.settings.server.host;
    let port = &service_config.settings.server.port;
    let listener = tokio::net::TcpListener::bind(format!("{}:{}", bind_addr, port)).await?;
    info!("listening on {}", listener.local_addr()?);

    metrics.up.set(1);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    metrics.up.set(0);
    info!("server stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
