#![forbid(unsafe_code)]
//! Curbmap HTTP surface: axum routes over the reconciliation/aggregation
//! engine, with the provider adapter injected through [`AppState`].

mod config;
mod http;
mod state;

pub use config::{RegionConfig, ServerConfig};
pub use http::build_router;
pub use state::AppState;

pub const CRATE_NAME: &str = "curbmap-server";

#[cfg(test)]
mod http_tests;
