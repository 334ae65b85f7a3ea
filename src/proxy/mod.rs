pub mod caller;
pub mod request;

pub use caller::AuthenticatedProxyCaller;
pub use request::{ProxyRequestSpec, RawResponse};
