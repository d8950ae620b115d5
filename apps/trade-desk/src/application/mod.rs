//! Application Layer
//!
//! The application layer orchestrates domain logic through use cases.
//! It defines:
//!
//! - **Ports**: Interfaces to the external brokerage
//! - **Use Cases**: The trade workflow controller and the order lifecycle tracker
//! - **Services**: Polling loops and open-workflow bookkeeping
//! - **DTOs**: Data transfer objects for UI surfaces

pub mod dto;
pub mod ports;
pub mod services;
pub mod use_cases;

pub use dto::*;
pub use ports::*;
pub use services::*;
pub use use_cases::*;
