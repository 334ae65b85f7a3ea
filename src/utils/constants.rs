//! Shared constants and invariants

pub const DEFAULT_SAFETY_MARGIN_SECS: u64 = 30;
pub const DEFAULT_FALLBACK_LIFETIME_SECS: u64 = 600;
pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_SESSION_TTL_SECS: u64 = 3600;
pub const DEFAULT_REDEEM_PATH: &str = "/customers/{id}/redeem";

pub const MIN_SESSION_SECRET_LEN: usize = 16;
pub const MAX_SESSION_TTL_SECS: u64 = 365 * 24 * 3600;
pub const MAX_TOKEN_LIFETIME_SECS: u64 = 24 * 3600;
