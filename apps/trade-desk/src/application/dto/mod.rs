//! Data Transfer Objects (DTOs)
//!
//! DTOs are used for API boundaries and the snapshots published to
//! trading surfaces.

mod order_dto;
mod workflow_dto;

pub use order_dto::{OrderListDto, PlacedOrderDto};
pub use workflow_dto::{ImpactQuoteDto, WorkflowSnapshot};
