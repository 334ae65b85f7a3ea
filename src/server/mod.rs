pub mod error;
pub mod extract;
pub mod payloads;
pub mod routes_api;
pub mod routes_auth;
pub mod server;
