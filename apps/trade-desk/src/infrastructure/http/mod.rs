//! HTTP/REST API adapter.
//!
//! Inbound adapter exposing trade workflows, order history and quotes
//! to the dashboard's trading surfaces.

mod controller;
mod request;
mod response;

pub use controller::{AppState, create_router};
pub use request::*;
pub use response::*;
