//! Application Ports (Driven)
//!
//! Ports define how the application uses the external brokerage. Each
//! is implemented by both the HTTP gateway adapter and the paper
//! brokerage.

mod gateway_error;
mod impact_calculator_port;
mod order_committer_port;
mod order_lifecycle_port;
mod quote_provider_port;

pub use gateway_error::GatewayError;
pub use impact_calculator_port::ImpactCalculatorPort;
pub use order_committer_port::OrderCommitterPort;
pub use order_lifecycle_port::OrderLifecyclePort;
pub use quote_provider_port::{Quote, QuoteProviderPort};

#[cfg(test)]
pub use impact_calculator_port::MockImpactCalculatorPort;
#[cfg(test)]
pub use order_committer_port::MockOrderCommitterPort;
#[cfg(test)]
pub use order_lifecycle_port::MockOrderLifecyclePort;
#[cfg(test)]
pub use quote_provider_port::MockQuoteProviderPort;

/// A brokerage that implements every driven port.
pub trait Brokerage:
    QuoteProviderPort + ImpactCalculatorPort + OrderCommitterPort + OrderLifecyclePort
{
}

impl<T> Brokerage for T where
    T: QuoteProviderPort + ImpactCalculatorPort + OrderCommitterPort + OrderLifecyclePort
{
}
