pub mod common;
mod routes_scenarios;
