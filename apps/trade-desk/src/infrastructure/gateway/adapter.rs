//! Brokerage gateway adapter implementing every driven port.

use std::future::Future;
use std::time::Instant;

use async_trait::async_trait;
use chrono::SecondsFormat;

use super::api_types::{
    CommitRequest, ImpactRequest, ImpactResponse, OrderListResponse, OrderResponse, QuoteResponse,
};
use super::config::GatewayConfig;
use super::error::GatewayClientError;
use super::http_client::{Delivery, GatewayHttpClient};
use crate::application::ports::{
    GatewayError, ImpactCalculatorPort, OrderCommitterPort, OrderLifecyclePort, Quote,
    QuoteProviderPort,
};
use crate::domain::order_execution::{ImpactQuote, OrderIntent, PlacedOrder};
use crate::domain::shared::{AccountId, OrderId, PreviewId, Symbol, Timestamp};
use crate::observability::record_gateway_request;

/// Adapter for the remote brokerage gateway.
#[derive(Debug, Clone)]
pub struct GatewayAdapter {
    client: GatewayHttpClient,
}

impl GatewayAdapter {
    /// Create a new adapter.
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayClientError> {
        Ok(Self {
            client: GatewayHttpClient::new(config)?,
        })
    }
}

/// Run a gateway call and record its latency and outcome.
async fn timed<T, F>(operation: &str, call: F) -> Result<T, GatewayError>
where
    F: Future<Output = Result<T, GatewayError>>,
{
    let start = Instant::now();
    let result = call.await;
    let outcome = match &result {
        Ok(_) => "ok",
        Err(e) => e.kind(),
    };
    record_gateway_request(operation, outcome, start.elapsed().as_secs_f64());
    result
}

#[async_trait]
impl QuoteProviderPort for GatewayAdapter {
    async fn get_quote(&self, symbol: &Symbol) -> Result<Quote, GatewayError> {
        timed("quote", async {
            let response: QuoteResponse = self
                .client
                .get(&format!("/v1/quotes/{}", symbol.as_str()))
                .await?;
            Ok(response.into_quote())
        })
        .await
    }
}

#[async_trait]
impl ImpactCalculatorPort for GatewayAdapter {
    async fn compute_impact(&self, intent: &OrderIntent) -> Result<ImpactQuote, GatewayError> {
        timed("impact", async {
            let request = ImpactRequest::from_intent(intent);
            tracing::debug!(
                account_id = %request.account_id,
                symbol = %request.symbol,
                side = request.side,
                order_type = request.order_type,
                quantity = %request.quantity,
                "Requesting order impact"
            );
            let response: ImpactResponse = self
                .client
                .post("/v1/impact", &request, Delivery::Retry)
                .await?;
            response.into_quote()
        })
        .await
    }
}

#[async_trait]
impl OrderCommitterPort for GatewayAdapter {
    async fn commit(&self, preview_id: &PreviewId) -> Result<PlacedOrder, GatewayError> {
        timed("commit", async {
            tracing::info!(preview_id = %preview_id, "Committing previewed order");
            let request = CommitRequest {
                preview_id: preview_id.to_string(),
            };
            let response: OrderResponse = self
                .client
                .post("/v1/orders", &request, Delivery::Once)
                .await?;
            let order = response.into_order()?;
            tracing::info!(
                preview_id = %preview_id,
                order_id = %order.order_id(),
                status = %order.status(),
                "Order placed"
            );
            Ok(order)
        })
        .await
    }
}

#[async_trait]
impl OrderLifecyclePort for GatewayAdapter {
    async fn list_orders(
        &self,
        account_id: &AccountId,
        since: Timestamp,
    ) -> Result<Vec<PlacedOrder>, GatewayError> {
        timed("list_orders", async {
            let since = since
                .as_datetime()
                .to_rfc3339_opts(SecondsFormat::Secs, true);
            let response: OrderListResponse = self
                .client
                .get(&format!(
                    "/v1/accounts/{}/orders?since={since}",
                    account_id.as_str()
                ))
                .await?;
            response
                .orders
                .into_iter()
                .map(OrderResponse::into_order)
                .collect()
        })
        .await
    }

    async fn get_order(&self, order_id: &OrderId) -> Result<PlacedOrder, GatewayError> {
        timed("get_order", async {
            let response: OrderResponse = self
                .client
                .get(&format!("/v1/orders/{}", order_id.as_str()))
                .await?;
            response.into_order()
        })
        .await
    }

    async fn cancel_order(&self, order_id: &OrderId) -> Result<(), GatewayError> {
        timed("cancel", async {
            tracing::info!(order_id = %order_id, "Requesting order cancellation");
            self.client
                .post_empty(
                    &format!("/v1/orders/{}/cancel", order_id.as_str()),
                    Delivery::Retry,
                )
                .await
                .map_err(|e| e.into_cancel_error(order_id.as_str()))
        })
        .await
    }
}
