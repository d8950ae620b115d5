//! Infrastructure Layer
//!
//! Adapters for the ports defined in the application layer.
//!
//! - **Driven Adapters (Outbound)**
//!   - `gateway/`: Remote brokerage gateway over HTTP
//!   - `paper/`: In-memory paper brokerage for development and tests
//!   - `persistence/`: Last-known-good order cache
//!
//! - **Driver Adapters (Inbound)**
//!   - `http/`: REST API consumed by the trading surfaces

pub mod gateway;
pub mod http;
pub mod paper;
pub mod persistence;
