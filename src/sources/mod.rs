/// Sources module
///
/// Vendor credential exchange: static API key in, vendor access token out.
pub mod vendor_auth;

pub use vendor_auth::{HttpVendorAuthenticator, VendorAuthenticator};
