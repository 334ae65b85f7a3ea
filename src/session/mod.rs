pub mod claims;
pub mod issuer;

pub use claims::{SessionClaims, SessionCredential};
pub use issuer::SessionIssuer;
