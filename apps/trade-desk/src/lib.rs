// Allow unwrap/expect in tests - tests should panic on unexpected errors
// Allow test-specific patterns and pedantic lints in test code
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::match_same_arms,
        clippy::needless_pass_by_value,
        clippy::needless_collect,
        clippy::option_if_let_else,
        clippy::default_trait_access,
        clippy::items_after_statements,
        clippy::or_fun_call
    )
)]

//! Trade Desk - Order Execution Core
//!
//! Client-side order-execution protocol for the dashboard's trading
//! surfaces: the impact -> preview -> confirm workflow that places at
//! most one order per preview, and the lifecycle tracker that follows
//! placed orders by polling.
//!
//! # Architecture (Clean Architecture + DDD + Hexagonal)
//!
//! ## Layers (inside → outside)
//!
//! - **Domain**: Pure state machines and value objects
//!   - `order_execution`: order drafts and intents, impact quotes, placed orders
//!   - `trade_workflow`: Form -> Previewing -> Preview -> Confirming -> Success
//!
//! - **Application**: Use cases and orchestration
//!   - `ports`: Interfaces to the brokerage (quotes, impact, commit, lifecycle)
//!   - `use_cases`: `TradeWorkflowController`, `OrderLifecycleTracker`
//!   - `services`: `OrderMonitor`, `QuotePoller`, `WorkflowRegistry`
//!   - `dto`: Snapshots and views for API boundaries
//!
//! - **Infrastructure**: Adapters (implementations)
//!   - `gateway`: Remote brokerage gateway over HTTP
//!   - `paper`: In-memory paper brokerage
//!   - `persistence`: Last-known-good order cache
//!   - `http`: REST API for trading surfaces

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Clean Architecture Layers
// =============================================================================

/// Domain layer - Core business logic with no external dependencies.
pub mod domain;

/// Application layer - Use cases and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Cross-cutting
// =============================================================================

/// Configuration loading and validation.
pub mod config;

/// REST error envelope.
pub mod error;

/// Prometheus metrics.
pub mod observability;

/// Logging and distributed tracing setup.
pub mod telemetry;

// =============================================================================
// Re-exports from Clean Architecture
// =============================================================================

// Domain re-exports
pub use domain::order_execution::{
    ImpactQuote, OrderDraft, OrderIntent, OrderKind, OrderSide, OrderStatus, OrderType,
    PlacedOrder, TimeInForce, ValidationError,
};
pub use domain::shared::{
    AccountId, Currency, Money, OrderId, PreviewId, Quantity, Symbol, Timestamp, ViewId,
    WorkflowId,
};
pub use domain::trade_workflow::{TradeSurface, WorkflowError, WorkflowState};

// Application re-exports
pub use application::dto::{OrderListDto, PlacedOrderDto, WorkflowSnapshot};
pub use application::ports::{
    Brokerage, GatewayError, ImpactCalculatorPort, OrderCommitterPort, OrderLifecyclePort, Quote,
    QuoteProviderPort,
};
pub use application::services::{OrderMonitor, QuotePoller, ViewRegistry, WorkflowRegistry};
pub use application::use_cases::{
    CancelOutcome, LifecycleError, OrderLifecycleTracker, OrderWindow, TradeWorkflowController,
};

// Infrastructure re-exports
pub use infrastructure::gateway::{GatewayAdapter, GatewayConfig};
pub use infrastructure::http::{AppState, create_router};
pub use infrastructure::paper::{PaperBrokerage, PaperConfig};
pub use infrastructure::persistence::InMemoryOrderCache;
