//! Configuration validation with aggregated errors.
//! - Aggregates all issues into Vec<String>
//! - Any issue is fatal at startup

use regex::Regex;
use tracing::{error, info};

use crate::config::settings::SettingsConfig;
use crate::config::types::{ServiceConfig, SessionConfig, VendorConfig};
use crate::observability::metrics::get_metrics;
use crate::utils::constants::{MAX_SESSION_TTL_SECS, MAX_TOKEN_LIFETIME_SECS, MIN_SESSION_SECRET_LEN};

const UUID_PATTERN: &str =
    r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$";

/// Public entrypoint: returns Ok(()) or Err(Vec<String>) containing all issues.
pub async fn validate_service_config(cfg: &ServiceConfig) -> Result<(), Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    validate_settings(&cfg.settings, &mut errors);
    validate_vendor(&cfg.vendor, &mut errors);
    validate_session(&cfg.session, &mut errors);

    if errors.is_empty() {
        info!("config validation passed");
        Ok(())
    } else {
        let metrics = get_metrics().await;
        for e in &errors {
            error!("config validation: {}", e);
            metrics.config_validation_errors.inc();
        }
        Err(errors)
    }
}

fn validate_settings(settings: &SettingsConfig, errors: &mut Vec<String>) {
    if settings.server.host.is_empty() {
        errors.push("settings.server.host must not be empty".to_string());
    }
    if settings.server.port.parse::<u16>().is_err() {
        errors.push(format!(
            "settings.server.port '{}' must be an integer in range 0-65535",
            settings.server.port
        ));
    }

    // metrics endpoint start with '/'
    let metrics = &settings.metrics;
    if !metrics.path.starts_with('/') {
        errors.push(format!(
            "settings.metrics.path '{}' must start with '/'",
            metrics.path
        ));
    }

    // logging level
    if let Some(logging) = &settings.logging {
        let valid = ["trace", "debug", "info", "warn", "error"];
        if !valid.contains(&logging.level.to_lowercase().as_str()) {
            errors.push(format!(
                "settings.logging.level '{}' invalid; allowed: {:?}",
                logging.level, valid
            ));
        }
    }
}

fn validate_vendor(vendor: &VendorConfig, errors: &mut Vec<String>) {
    if !is_http_url(&vendor.base_url) {
        errors.push(format!(
            "vendor.base_url '{}' must be an http(s) url",
            vendor.base_url
        ));
    }
    if let Some(redeem_base_url) = &vendor.redeem_base_url {
        if !is_http_url(redeem_base_url) {
            errors.push(format!(
                "vendor.redeem_base_url '{}' must be an http(s) url",
                redeem_base_url
            ));
        }
    }

    if vendor.api_key.is_empty() {
        errors.push("vendor.api_key is required".to_string());
    } else if !is_uuid(&vendor.api_key) {
        // never echo the key itself
        errors.push("vendor.api_key must be UUID shaped".to_string());
    }

    if !vendor.redeem_path.starts_with('/') {
        errors.push(format!(
            "vendor.redeem_path '{}' must start with '/'",
            vendor.redeem_path
        ));
    }
    if vendor.request_timeout_ms == 0 {
        errors.push("vendor.request_timeout_ms must be > 0".to_string());
    }
    if vendor.token.fallback_lifetime_seconds == 0 {
        errors.push("vendor.token.fallback_lifetime_seconds must be > 0".to_string());
    } else if vendor.token.fallback_lifetime_seconds > MAX_TOKEN_LIFETIME_SECS {
        errors.push(format!(
            "vendor.token.fallback_lifetime_seconds must be <= {}",
            MAX_TOKEN_LIFETIME_SECS
        ));
    }
    if vendor.token.safety_margin_seconds >= vendor.token.fallback_lifetime_seconds {
        errors.push(format!(
            "vendor.token.safety_margin_seconds ({}) must be smaller than fallback_lifetime_seconds ({})",
            vendor.token.safety_margin_seconds, vendor.token.fallback_lifetime_seconds
        ));
    }
}

fn validate_session(session: &SessionConfig, errors: &mut Vec<String>) {
    if session.secret.is_empty() {
        errors.push("session.secret is required".to_string());
    } else if session.secret.chars().count() < MIN_SESSION_SECRET_LEN {
        errors.push(format!(
            "session.secret must be at least {} characters",
            MIN_SESSION_SECRET_LEN
        ));
    }
    if session.ttl_seconds == 0 {
        errors.push("session.ttl_seconds must be > 0".to_string());
    } else if session.ttl_seconds > MAX_SESSION_TTL_SECS {
        errors.push(format!("session.ttl_seconds must be <= {}", MAX_SESSION_TTL_SECS));
    }
}

fn is_http_url(url: &str) -> bool {
    (url.starts_with("http://") || url.starts_with("https://")) && url.len() > "https://".len()
}

fn is_uuid(value: &str) -> bool {
    Regex::new(UUID_PATTERN)
        .map(|re| re.is_match(value))
        .unwrap_or(false)
}
