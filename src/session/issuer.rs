use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tracing::debug;

use crate::error::{AuthError, SessionError};
use crate::helpers::time::now_i64;
use crate::session::claims::{SessionClaims, SessionCredential};

/// Issues and verifies HS256 session credentials. Stateless: a credential is
/// valid until its encoded expiry.
pub struct SessionIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_seconds: u64,
}

impl SessionIssuer {
    pub fn new(secret: &str, ttl_seconds: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl_seconds,
        }
    }

    pub fn issue(&self, customer_id: &str) -> Result<SessionCredential, SessionError> {
        self.issue_at(customer_id, now_i64())
    }

    pub(crate) fn issue_at(
        &self,
        customer_id: &str,
        issued_at: i64,
    ) -> Result<SessionCredential, SessionError> {
        let exp = i64::try_from(self.ttl_seconds)
            .ok()
            .and_then(|ttl| issued_at.checked_add(ttl))
            .ok_or(SessionError::Lifetime(self.ttl_seconds))?;
        let claims = SessionClaims {
            customer_id: customer_id.to_owned(),
            iat: issued_at,
            exp,
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        debug!(customer_id, expires_at = claims.exp, "session issued");

        Ok(SessionCredential {
            token,
            issued_at: claims.iat,
            expires_at: claims.exp,
            expires_in: self.ttl_seconds,
        })
    }

    pub fn verify(&self, token: &str) -> Result<SessionClaims, AuthError> {
        decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::SessionExpired,
                _ => AuthError::InvalidSession(e.to_string()),
            })
    }
}
