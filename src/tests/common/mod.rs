// shared helpers for in-crate scenario tests
pub use axum::Router;
pub use tokio::task::JoinHandle;

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use crate::cache::token::VendorToken;
use crate::config::settings::{LogFormat, LoggingConfig, MetricsConfig, ServerConfig, SettingsConfig};
use crate::config::types::{ServiceConfig, SessionConfig, VendorConfig, VendorTokenConfig};
use crate::error::AuthError;
use crate::sources::vendor_auth::VendorAuthenticator;

pub const API_KEY: &str = "6f1c0d5e-2b7a-4c1e-9a8d-3f2e1b0c9d8e";
pub const SESSION_SECRET: &str = "test-session-secret-0123456789";
pub const SESSION_TTL: u64 = 900;

/// Spawn an Axum router on an ephemeral port and return (JoinHandle, SocketAddr)
pub async fn spawn_axum(router: Router) -> (JoinHandle<()>, SocketAddr) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server failed");
    });
    (handle, addr)
}

pub fn build_reqwest_client() -> Client {
    Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .expect("reqwest client")
}

pub fn test_config(vendor_base_url: &str, redeem_base_url: Option<&str>) -> ServiceConfig {
    ServiceConfig {
        settings: SettingsConfig {
            metrics: MetricsConfig { path: "/metrics".into(), is_enabled: true },
            server: ServerConfig { host: "127.0.0.1".into(), port: "0".into() },
            logging: Some(LoggingConfig::new("debug".into(), LogFormat::Compact)),
        },
        vendor: VendorConfig {
            base_url: vendor_base_url.to_owned(),
            api_key: API_KEY.to_owned(),
            redeem_base_url: redeem_base_url.map(str::to_owned),
            redeem_path: "/customers/{id}/redeem".into(),
            request_timeout_ms: 5000,
            token: VendorTokenConfig::default(),
        },
        session: SessionConfig { secret: SESSION_SECRET.to_owned(), ttl_seconds: SESSION_TTL },
    }
}

/// In-process authenticator handing out `token-1`, `token-2`, ...
#[derive(Clone)]
pub struct CountingAuthenticator {
    pub calls: Arc<AtomicUsize>,
    pub expires_at_ms: Option<i64>,
    pub delay: Option<Duration>,
    pub fail: bool,
}

impl CountingAuthenticator {
    pub fn new(expires_at_ms: Option<i64>) -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            expires_at_ms,
            delay: None,
            fail: false,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl VendorAuthenticator for CountingAuthenticator {
    async fn authenticate(&self) -> Result<VendorToken, AuthError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(AuthError::VendorRejected { status: 401, body: "bad key".into() });
        }
        Ok(VendorToken::new(format!("token-{}", n), self.expires_at_ms))
    }
}
