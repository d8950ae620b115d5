//! Brokerage Gateway Adapter
//!
//! Implements every driven port against the remote brokerage gateway's
//! REST API:
//! - Bearer token authentication
//! - Retry with exponential backoff for reads, previews and cancels
//! - Single-delivery commit, so a preview is never placed twice

mod adapter;
mod api_types;
mod config;
mod error;
mod http_client;

pub use adapter::GatewayAdapter;
pub use config::{GatewayConfig, RetryConfig};
pub use error::GatewayClientError;
