use thiserror::Error;

/// Authentication failures, both vendor-side (credential exchange) and
/// session-side (caller bearer token).
#[derive(Debug, Error)]
pub enum AuthError {
    /// Vendor answered the credential exchange with a non-success status.
    #[error("vendor authentication rejected: status={status}, body={body}")]
    VendorRejected { status: u16, body: String },

    /// Vendor answered with success but without a string token at `data`.
    #[error("vendor authentication response has no token: {0}")]
    MissingVendorToken(String),

    /// Vendor could not be reached.
    #[error("vendor authentication transport error: {0}")]
    Transport(String),

    /// No `Authorization: Bearer` header on a protected route.
    #[error("missing session credential")]
    MissingSession,

    /// Session token is malformed or its signature does not verify.
    #[error("invalid session credential: {0}")]
    InvalidSession(String),

    /// Session token is past its encoded expiry.
    #[error("session credential expired")]
    SessionExpired,
}

/// Failures of an authenticated vendor call that prevent any response
/// from being relayed. Non-success vendor statuses are not errors here.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("vendor transport error: {0}")]
    Transport(String),

    #[error("invalid vendor request: {0}")]
    InvalidRequest(String),
}

/// Session issuing failures (signing).
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session signing failed: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    #[error("session lifetime of {0}s cannot be represented")]
    Lifetime(u64),
}
