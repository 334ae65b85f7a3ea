//! # Loyalty Proxy Library
//!
//! Credential-translation proxy in front of a third-party loyalty API.
//! Exchanges a static vendor API key for a vendor access token, caches it,
//! issues its own short-lived session tokens and forwards a small set of
//! business operations to the vendor.
//!
//! Modules:
//! - `cache`: single vendor token cache with expiry tracking
//! - `sources`: vendor credential exchange
//! - `parser`: token expiry extraction
//! - `proxy`: authenticated vendor calls with one-shot re-authentication
//! - `session`: session credential issuing and verification
//! - `server`: inbound HTTP routes
//! - `config`: service configuration loading and validation

pub mod cache;
pub mod config;
pub mod error;
pub mod helpers;
pub mod observability;
pub mod parser;
pub mod proxy;
pub mod resilience;
pub mod server;
pub mod session;
pub mod sources;
pub mod utils;

#[cfg(test)]
mod tests;

pub use crate::config::types::ServiceConfig;
pub use crate::error::{AuthError, ProxyError};
