use prometheus::{
    Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;

// Declare the static OnceCell to hold the Metrics.
static METRICS_INSTANCE: OnceCell<Arc<Metrics>> = OnceCell::const_new();

/// Asynchronously initializes and gets a reference to the static `Metrics`.
pub async fn get_metrics() -> &'static Arc<Metrics> {
    METRICS_INSTANCE
        .get_or_init(|| async {
            info!("Initializing Metrics ...");
            Metrics::new()
        })
        .await
}

/// Metrics if already initialized; for sync call sites.
pub fn try_metrics() -> Option<&'static Arc<Metrics>> {
    METRICS_INSTANCE.get()
}

#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Vendor credential exchange
    pub vendor_auth_requests: IntCounterVec,
    pub vendor_auth_duration: Histogram,
    pub vendor_token_expiry_unix_ms: IntGauge,

    // Proxied vendor calls
    pub vendor_calls: IntCounterVec,
    pub vendor_call_duration: HistogramVec,
    pub vendor_reauth_retries: IntCounter,

    // Inbound
    pub session_issued: IntCounter,
    pub api_errors: IntCounterVec,

    // Config/runtime
    pub config_validation_errors: IntCounter,
    pub up: IntGauge,
}

impl Metrics {
    fn new() -> Arc<Self> {
        let registry = Registry::new_custom(Some("loyaltyproxy".into()), None).unwrap();

        let metrics: Arc<Metrics> = Arc::new(Self {
            // Vendor auth
            vendor_auth_requests: IntCounterVec::new(Opts::new("vendor_auth_requests_total", "Vendor credential exchanges by outcome"), &["outcome"]).unwrap(),
            vendor_auth_duration: Histogram::with_opts(HistogramOpts::new("vendor_auth_duration_seconds", "Vendor credential exchange duration seconds").buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0])).unwrap(),
            vendor_token_expiry_unix_ms: IntGauge::new("vendor_token_expiry_unix_ms", "Effective expiry of the cached vendor token").unwrap(),

            // Vendor calls
            vendor_calls: IntCounterVec::new(Opts::new("vendor_calls_total", "Proxied vendor call attempts"), &["method", "status"]).unwrap(),
            vendor_call_duration: HistogramVec::new(HistogramOpts::new("vendor_call_duration_seconds", "Proxied vendor call duration seconds").buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]), &["method"]).unwrap(),
            vendor_reauth_retries: IntCounter::new("vendor_reauth_retries_total", "Vendor calls retried after an authentication rejection").unwrap(),

            // Inbound
            session_issued: IntCounter::new("session_issued_total", "Session credentials issued").unwrap(),
            api_errors: IntCounterVec::new(Opts::new("api_errors_total", "Inbound requests answered with an error, by kind"), &["kind"]).unwrap(),

            // Config/runtime
            config_validation_errors: IntCounter::new("config_validation_errors_total", "Validation errors during startup").unwrap(),
            up: IntGauge::new("up", "1 if service is healthy").unwrap(),

            registry,
        });

        // Register all metrics in the registry
        let reg = &metrics.registry;
        reg.register(Box::new(metrics.vendor_auth_requests.clone())).unwrap();
        reg.register(Box::new(metrics.vendor_auth_duration.clone())).unwrap();
        reg.register(Box::new(metrics.vendor_token_expiry_unix_ms.clone())).unwrap();
        reg.register(Box::new(metrics.vendor_calls.clone())).unwrap();
        reg.register(Box::new(metrics.vendor_call_duration.clone())).unwrap();
        reg.register(Box::new(metrics.vendor_reauth_retries.clone())).unwrap();
        reg.register(Box::new(metrics.session_issued.clone())).unwrap();
        reg.register(Box::new(metrics.api_errors.clone())).unwrap();
        reg.register(Box::new(metrics.config_validation_errors.clone())).unwrap();
        reg.register(Box::new(metrics.up.clone())).unwrap();

        metrics
    }
}
