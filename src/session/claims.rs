use serde::{Deserialize, Serialize};

/// Claims carried by a session credential. `iat`/`exp` are unix seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    #[serde(rename = "customerId")]
    pub customer_id: String,
    pub iat: i64,
    pub exp: i64,
}

impl SessionClaims {
    pub fn issued_at(&self) -> i64 {
        self.iat
    }

    pub fn expires_at(&self) -> i64 {
        self.exp
    }
}

/// Freshly issued session token.
#[derive(Debug, Clone)]
pub struct SessionCredential {
    pub token: String,
    pub issued_at: i64,
    pub expires_at: i64,
    /// Lifetime in seconds, as reported to the caller.
    pub expires_in: u64,
}
