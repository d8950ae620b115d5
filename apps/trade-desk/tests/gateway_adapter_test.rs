//! Gateway Adapter Integration Tests
//!
//! Runs the HTTP gateway adapter against a mock brokerage gateway to
//! check which requests are retried and how failures are reported.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use rust_decimal_macros::dec;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use trade_desk::infrastructure::gateway::RetryConfig;
use trade_desk::{
    GatewayAdapter, GatewayConfig, GatewayError, InMemoryOrderCache, Money, OrderCommitterPort,
    OrderDraft, OrderId, OrderLifecyclePort, OrderSide, OrderStatus, PreviewId,
    QuoteProviderPort, Symbol, TradeSurface, TradeWorkflowController, WorkflowError, WorkflowId,
};

fn adapter(server: &MockServer) -> GatewayAdapter {
    let config = GatewayConfig::new(server.uri(), "test-key")
        .with_timeout(Duration::from_secs(2))
        .with_retry(RetryConfig {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(5),
            multiplier: 2.0,
        });
    GatewayAdapter::new(&config).unwrap()
}

fn order_body(status: &str) -> serde_json::Value {
    json!({
        "order_id": "o1",
        "account_id": "acct-1",
        "symbol": "AAPL",
        "side": "buy",
        "order_type": "market",
        "quantity": "10",
        "filled_quantity": "0",
        "status": status,
        "placed_at": "2026-03-02T15:00:00Z",
        "updated_at": "2026-03-02T15:00:01Z"
    })
}

fn impact_body() -> serde_json::Value {
    json!({
        "preview_id": "p1",
        "accepted": true,
        "estimated_cost": {"amount": "1500.00", "currency": "USD"},
        "estimated_fees": {"amount": "0.00", "currency": "USD"},
        "estimated_total": {"amount": "1500.00", "currency": "USD"},
        "warnings": []
    })
}

#[tokio::test]
async fn quote_request_carries_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/quotes/AAPL"))
        .and(header("authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "symbol": "AAPL",
            "price": "150.00",
            "bid": "149.99",
            "ask": "150.01"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let quote = adapter(&server)
        .get_quote(&Symbol::new("AAPL"))
        .await
        .unwrap();
    assert_eq!(quote.price, dec!(150.00));
    assert_eq!(quote.bid, Some(dec!(149.99)));
}

#[tokio::test]
async fn order_read_is_retried_after_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/orders/o1"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/orders/o1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(order_body("open")))
        .expect(1)
        .mount(&server)
        .await;

    let order = adapter(&server)
        .get_order(&OrderId::new("o1"))
        .await
        .unwrap();
    assert_eq!(order.status(), OrderStatus::Open);
}

#[tokio::test]
async fn commit_is_sent_once_even_on_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/orders"))
        .and(body_json(json!({ "preview_id": "p1" })))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let err = adapter(&server)
        .commit(&PreviewId::new("p1"))
        .await
        .unwrap_err();
    assert!(!matches!(err, GatewayError::Rejected { .. }));
}

#[tokio::test]
async fn unknown_commit_outcome_reaches_the_workflow_as_unconfirmed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/impact"))
        .respond_with(ResponseTemplate::new(200).set_body_json(impact_body()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/orders"))
        .respond_with(ResponseTemplate::new(504))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = Arc::new(adapter(&server));
    let controller = TradeWorkflowController::new(
        WorkflowId::new("wf-1"),
        TradeSurface::TradeTicket,
        OrderDraft::market("acct-1", "AAPL", OrderSide::Buy, dec!(10)),
        60,
        Arc::clone(&gateway),
        Arc::clone(&gateway),
        Arc::new(InMemoryOrderCache::new()),
    );

    let quote = controller.refresh_preview().await.unwrap();
    assert_eq!(quote.estimate().total, Money::usd(dec!(1500.00)));

    let err = controller.confirm(&PreviewId::new("p1")).await.unwrap_err();
    assert!(matches!(err, WorkflowError::CommitUnconfirmed { .. }));

    let again = controller.confirm(&PreviewId::new("p1")).await.unwrap_err();
    assert!(matches!(again, WorkflowError::PreviewConsumed { .. }));
}

#[tokio::test]
async fn commit_refused_by_brokerage_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/orders"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "code": "market_closed",
            "message": "Outside market hours"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = adapter(&server)
        .commit(&PreviewId::new("p1"))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        GatewayError::Rejected {
            reason: "Outside market hours".to_string()
        }
    );
}

#[tokio::test]
async fn cancel_conflict_reports_already_finalized() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/orders/o1/cancel"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "code": "filled",
            "message": "order is already filled"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = adapter(&server)
        .cancel_order(&OrderId::new("o1"))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        GatewayError::AlreadyFinalized {
            order_id: "o1".to_string(),
            status: Some(OrderStatus::Filled),
        }
    );
}

#[tokio::test]
async fn cancel_conflict_while_pending_is_not_finalized() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/orders/o1/cancel"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "code": "pending_cancel",
            "message": "cancel already requested"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = adapter(&server)
        .cancel_order(&OrderId::new("o1"))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        GatewayError::CancelPending {
            order_id: "o1".to_string(),
        }
    );
}

#[tokio::test]
async fn accepted_cancel_has_no_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/orders/o1/cancel"))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    adapter(&server)
        .cancel_order(&OrderId::new("o1"))
        .await
        .unwrap();
}

#[tokio::test]
async fn missing_order_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/orders/nope"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let err = adapter(&server)
        .get_order(&OrderId::new("nope"))
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::NotFound { .. }));
}
