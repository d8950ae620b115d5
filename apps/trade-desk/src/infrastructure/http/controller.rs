//! HTTP Controller (Driver Adapter)
//!
//! Axum-based REST API consumed by the dashboard's trading surfaces.
//! Every handler delegates to the workflow registry, the view registry,
//! the order monitor or the quote poller. Workflows and views can also
//! be followed as server-sent event streams.

use std::convert::Infallible;
use std::pin::Pin;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{
        IntoResponse,
        sse::{Event, KeepAlive, KeepAliveStream, Sse},
    },
    routing::{get, post, put},
};
use serde::Serialize;
use tokio_stream::{Stream, StreamExt, wrappers::WatchStream};

use crate::application::dto::{OrderListDto, PlacedOrderDto};
use crate::application::ports::{Brokerage, Quote};
use crate::application::services::{
    OrderMonitor, QuotePoller, ViewRegistry, ViewSession, ViewSnapshot, ViewUpdates,
    WorkflowRegistry, WorkflowSession,
};
use crate::application::use_cases::LifecycleError;
use crate::domain::order_execution::OrderCache;
use crate::domain::shared::{AccountId, OrderId, PreviewId, Symbol, ViewId, WorkflowId};
use crate::error::ApiError;

use super::request::{
    ConfirmRequest, OpenWorkflowRequest, OrderHistoryQuery, PreviewRequest, UpdateDraftRequest,
};
use super::response::{
    CancelResponse, ConfirmResponse, HealthResponse, ViewResponse, WorkflowResponse,
};

type EventStream = Pin<Box<dyn Stream<Item = Result<Event, Infallible>> + Send>>;

/// Application state shared across handlers.
pub struct AppState<B, S>
where
    B: Brokerage + 'static,
    S: OrderCache + 'static,
{
    /// Open trade workflows.
    pub registry: Arc<WorkflowRegistry<B, S>>,
    /// Order lifecycle tracking.
    pub monitor: Arc<OrderMonitor<B, S>>,
    /// Open order and account views.
    pub views: Arc<ViewRegistry<B, S>>,
    /// Quote reads.
    pub quotes: Arc<QuotePoller<B>>,
    /// Lookback used when a history request names none.
    pub default_lookback_days: u32,
    /// Brokerage mode label.
    pub brokerage: String,
    /// Application version.
    pub version: String,
}

impl<B, S> Clone for AppState<B, S>
where
    B: Brokerage + 'static,
    S: OrderCache + 'static,
{
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            monitor: Arc::clone(&self.monitor),
            views: Arc::clone(&self.views),
            quotes: Arc::clone(&self.quotes),
            default_lookback_days: self.default_lookback_days,
            brokerage: self.brokerage.clone(),
            version: self.version.clone(),
        }
    }
}

impl<B, S> AppState<B, S>
where
    B: Brokerage + 'static,
    S: OrderCache + 'static,
{
    fn session(&self, id: &str) -> Result<Arc<WorkflowSession<B, S>>, ApiError> {
        self.registry
            .get(&WorkflowId::new(id))
            .ok_or_else(|| ApiError::not_found("workflow", id))
    }

    fn view(&self, id: &str) -> Result<Arc<ViewSession<B, S>>, ApiError> {
        self.views
            .get(&ViewId::new(id))
            .ok_or_else(|| ApiError::not_found("view", id))
    }
}

/// Create the HTTP router with all endpoints.
pub fn create_router<B, S>(state: AppState<B, S>) -> Router
where
    B: Brokerage + 'static,
    S: OrderCache + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .route("/api/v1/workflows", post(open_workflow))
        .route(
            "/api/v1/workflows/{id}",
            get(get_workflow).delete(close_workflow),
        )
        .route("/api/v1/workflows/{id}/draft", put(update_draft))
        .route("/api/v1/workflows/{id}/preview", post(request_preview))
        .route("/api/v1/workflows/{id}/confirm", post(confirm))
        .route("/api/v1/workflows/{id}/reset", post(reset))
        .route("/api/v1/workflows/{id}/events", get(workflow_events))
        .route("/api/v1/accounts/{account_id}/orders", get(list_orders))
        .route("/api/v1/accounts/{account_id}/watch", post(watch_account))
        .route("/api/v1/orders/{order_id}", get(get_order))
        .route("/api/v1/orders/{order_id}/cancel", post(cancel_order))
        .route("/api/v1/orders/{order_id}/watch", post(watch_order))
        .route("/api/v1/views/{id}", get(get_view).delete(close_view))
        .route("/api/v1/views/{id}/refresh", post(refresh_view))
        .route("/api/v1/views/{id}/events", get(view_events))
        .route("/api/v1/quotes/{symbol}", get(get_quote))
        .with_state(state)
}

fn workflow_response<B, S>(session: &WorkflowSession<B, S>) -> WorkflowResponse
where
    B: Brokerage + 'static,
    S: OrderCache + 'static,
{
    WorkflowResponse {
        snapshot: session.controller().snapshot(),
        quote_panel: session.quote(),
    }
}

/// Health check endpoint.
async fn health_check<B, S>(State(state): State<AppState<B, S>>) -> impl IntoResponse
where
    B: Brokerage + 'static,
    S: OrderCache + 'static,
{
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
        brokerage: state.brokerage.clone(),
    })
}

/// Open a workflow.
async fn open_workflow<B, S>(
    State(state): State<AppState<B, S>>,
    Json(request): Json<OpenWorkflowRequest>,
) -> impl IntoResponse
where
    B: Brokerage + 'static,
    S: OrderCache + 'static,
{
    let session = state.registry.open(request.surface, request.draft);
    (StatusCode::CREATED, Json(workflow_response(&session)))
}

/// Current state of a workflow.
async fn get_workflow<B, S>(
    State(state): State<AppState<B, S>>,
    Path(id): Path<String>,
) -> Result<Json<WorkflowResponse>, ApiError>
where
    B: Brokerage + 'static,
    S: OrderCache + 'static,
{
    let session = state.session(&id)?;
    Ok(Json(workflow_response(&session)))
}

/// Close a workflow and stop its quote polling.
async fn close_workflow<B, S>(
    State(state): State<AppState<B, S>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError>
where
    B: Brokerage + 'static,
    S: OrderCache + 'static,
{
    if state.registry.close(&WorkflowId::new(&id)) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("workflow", &id))
    }
}

/// Replace the form contents.
async fn update_draft<B, S>(
    State(state): State<AppState<B, S>>,
    Path(id): Path<String>,
    Json(request): Json<UpdateDraftRequest>,
) -> Result<Json<WorkflowResponse>, ApiError>
where
    B: Brokerage + 'static,
    S: OrderCache + 'static,
{
    let session = state.session(&id)?;
    session.edit(request.draft)?;
    Ok(Json(workflow_response(&session)))
}

/// Request an impact preview.
async fn request_preview<B, S>(
    State(state): State<AppState<B, S>>,
    Path(id): Path<String>,
    Json(request): Json<PreviewRequest>,
) -> Result<Json<WorkflowResponse>, ApiError>
where
    B: Brokerage + 'static,
    S: OrderCache + 'static,
{
    let session = state.session(&id)?;
    match request.draft {
        Some(draft) => session.request_preview(draft).await?,
        None => session.controller().refresh_preview().await?,
    };
    Ok(Json(workflow_response(&session)))
}

/// Commit the previewed order.
async fn confirm<B, S>(
    State(state): State<AppState<B, S>>,
    Path(id): Path<String>,
    Json(request): Json<ConfirmRequest>,
) -> Result<Json<ConfirmResponse>, ApiError>
where
    B: Brokerage + 'static,
    S: OrderCache + 'static,
{
    let session = state.session(&id)?;
    let order = session.confirm(&PreviewId::new(request.preview_id)).await?;
    Ok(Json(ConfirmResponse {
        order: PlacedOrderDto::from_order(&order),
        workflow: session.controller().snapshot(),
    }))
}

/// Start a new trade in the same workflow.
async fn reset<B, S>(
    State(state): State<AppState<B, S>>,
    Path(id): Path<String>,
) -> Result<Json<WorkflowResponse>, ApiError>
where
    B: Brokerage + 'static,
    S: OrderCache + 'static,
{
    let session = state.session(&id)?;
    session.reset();
    Ok(Json(workflow_response(&session)))
}

/// Follow a workflow: its snapshot now, then after every transition.
async fn workflow_events<B, S>(
    State(state): State<AppState<B, S>>,
    Path(id): Path<String>,
) -> Result<Sse<KeepAliveStream<EventStream>>, ApiError>
where
    B: Brokerage + 'static,
    S: OrderCache + 'static,
{
    let session = state.session(&id)?;
    let stream = WatchStream::new(session.controller().subscribe())
        .map(|snapshot| Ok(sse_event("workflow", &snapshot)));
    Ok(Sse::new(Box::pin(stream) as EventStream).keep_alive(KeepAlive::default()))
}

/// Order history for an account.
async fn list_orders<B, S>(
    State(state): State<AppState<B, S>>,
    Path(account_id): Path<String>,
    Query(query): Query<OrderHistoryQuery>,
) -> Result<Json<OrderListDto>, ApiError>
where
    B: Brokerage + 'static,
    S: OrderCache + 'static,
{
    let tracker = state.monitor.tracker();
    let window = tracker.window(query.lookback_days.unwrap_or(state.default_lookback_days));
    let list = tracker
        .list_orders(&AccountId::new(account_id), window)
        .await?;
    Ok(Json(list.into()))
}

/// Current state of one order.
async fn get_order<B, S>(
    State(state): State<AppState<B, S>>,
    Path(order_id): Path<String>,
) -> Result<Json<PlacedOrderDto>, ApiError>
where
    B: Brokerage + 'static,
    S: OrderCache + 'static,
{
    let tracked = state
        .monitor
        .tracker()
        .get_order(&OrderId::new(order_id))
        .await?;
    Ok(Json(PlacedOrderDto::from_tracked(&tracked)))
}

/// Request cancellation of an order.
async fn cancel_order<B, S>(
    State(state): State<AppState<B, S>>,
    Path(order_id): Path<String>,
) -> Result<(StatusCode, Json<CancelResponse>), ApiError>
where
    B: Brokerage + 'static,
    S: OrderCache + 'static,
{
    let id = OrderId::new(&order_id);
    let outcome = state.monitor.cancel(&id).await?;
    let order = state
        .monitor
        .tracker()
        .cached(&id)
        .await?
        .map(|tracked| PlacedOrderDto::from_tracked(&tracked));
    Ok((
        StatusCode::ACCEPTED,
        Json(CancelResponse {
            order_id,
            outcome,
            order,
        }),
    ))
}

/// Open a view polling an account's orders.
async fn watch_account<B, S>(
    State(state): State<AppState<B, S>>,
    Path(account_id): Path<String>,
    Query(query): Query<OrderHistoryQuery>,
) -> Result<(StatusCode, Json<ViewResponse>), ApiError>
where
    B: Brokerage + 'static,
    S: OrderCache + 'static,
{
    let lookback_days = query.lookback_days.unwrap_or(state.default_lookback_days);
    let session = state
        .views
        .open_account(AccountId::new(account_id), lookback_days);
    opened_view(&state, &session).await
}

/// Open a view polling one order until it is terminal.
async fn watch_order<B, S>(
    State(state): State<AppState<B, S>>,
    Path(order_id): Path<String>,
) -> Result<(StatusCode, Json<ViewResponse>), ApiError>
where
    B: Brokerage + 'static,
    S: OrderCache + 'static,
{
    let session = state.views.open_order(OrderId::new(order_id));
    opened_view(&state, &session).await
}

/// First read of a new view. A view of an order the brokerage does not
/// know is closed again; any other failure leaves it open and stale.
async fn opened_view<B, S>(
    state: &AppState<B, S>,
    session: &ViewSession<B, S>,
) -> Result<(StatusCode, Json<ViewResponse>), ApiError>
where
    B: Brokerage + 'static,
    S: OrderCache + 'static,
{
    let snapshot = match session.refresh().await {
        Ok(snapshot) => snapshot,
        Err(err @ LifecycleError::NotFound { .. }) => {
            state.views.close(session.id());
            return Err(err.into());
        }
        Err(err) => {
            tracing::warn!(view_id = %session.id(), error = %err, "Initial view read failed");
            session.snapshot()
        }
    };
    Ok((
        StatusCode::CREATED,
        Json(ViewResponse::new(session.id(), &snapshot)),
    ))
}

/// Current contents of a view.
async fn get_view<B, S>(
    State(state): State<AppState<B, S>>,
    Path(id): Path<String>,
) -> Result<Json<ViewResponse>, ApiError>
where
    B: Brokerage + 'static,
    S: OrderCache + 'static,
{
    let session = state.view(&id)?;
    Ok(Json(ViewResponse::new(session.id(), &session.snapshot())))
}

/// Poll a view now.
async fn refresh_view<B, S>(
    State(state): State<AppState<B, S>>,
    Path(id): Path<String>,
) -> Result<Json<ViewResponse>, ApiError>
where
    B: Brokerage + 'static,
    S: OrderCache + 'static,
{
    let session = state.view(&id)?;
    let snapshot = session.refresh().await?;
    Ok(Json(ViewResponse::new(session.id(), &snapshot)))
}

/// Close a view and stop its polling.
async fn close_view<B, S>(
    State(state): State<AppState<B, S>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError>
where
    B: Brokerage + 'static,
    S: OrderCache + 'static,
{
    if state.views.close(&ViewId::new(&id)) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("view", &id))
    }
}

/// Follow a view: its contents now, then after every poll. The stream
/// ends when the view is closed.
async fn view_events<B, S>(
    State(state): State<AppState<B, S>>,
    Path(id): Path<String>,
) -> Result<Sse<KeepAliveStream<EventStream>>, ApiError>
where
    B: Brokerage + 'static,
    S: OrderCache + 'static,
{
    let session = state.view(&id)?;
    let view_id = session.id().clone();
    let stream: EventStream = match session.subscribe() {
        ViewUpdates::Order(rx) => Box::pin(WatchStream::new(rx).map(move |view| {
            let response = ViewResponse::new(&view_id, &ViewSnapshot::Order(view));
            Ok(sse_event("view", &response))
        })),
        ViewUpdates::Account(rx) => Box::pin(WatchStream::new(rx).map(move |view| {
            let response = ViewResponse::new(&view_id, &ViewSnapshot::Account(view));
            Ok(sse_event("view", &response))
        })),
    };
    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

fn sse_event<T: Serialize>(name: &'static str, data: &T) -> Event {
    Event::default().event(name).json_data(data).unwrap_or_else(|e| {
        tracing::error!(event = name, error = %e, "Failed to encode event");
        Event::default().event("error").data(e.to_string())
    })
}

/// Latest quote for a symbol.
async fn get_quote<B, S>(
    State(state): State<AppState<B, S>>,
    Path(symbol): Path<String>,
) -> Result<Json<Quote>, ApiError>
where
    B: Brokerage + 'static,
    S: OrderCache + 'static,
{
    let symbol = Symbol::parse(&symbol)
        .map_err(|e| ApiError::invalid_request(e.to_string()).with_context("symbol", &symbol))?;
    let quote = state.quotes.fetch(&symbol).await?;
    Ok(Json(quote))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use rust_decimal_macros::dec;
    use tokio_util::sync::CancellationToken;
    use tower::ServiceExt;

    use crate::application::services::OrderMonitorConfig;
    use crate::application::use_cases::OrderLifecycleTracker;
    use crate::infrastructure::paper::{PaperBrokerage, PaperConfig};
    use crate::infrastructure::persistence::InMemoryOrderCache;

    fn test_state() -> AppState<PaperBrokerage, InMemoryOrderCache> {
        let brokerage = Arc::new(PaperBrokerage::new(
            PaperConfig::default().with_price("AAPL", dec!(150)),
        ));
        let cache = Arc::new(InMemoryOrderCache::new());
        let shutdown = CancellationToken::new();
        let quotes = Arc::new(QuotePoller::new(
            Arc::clone(&brokerage),
            5_000,
            shutdown.clone(),
        ));
        let tracker = OrderLifecycleTracker::new(Arc::clone(&brokerage), Arc::clone(&cache), 90);
        let monitor = Arc::new(OrderMonitor::new(
            OrderMonitorConfig::default(),
            tracker,
            shutdown,
        ));
        AppState {
            registry: Arc::new(WorkflowRegistry::new(
                Arc::clone(&brokerage),
                Arc::clone(&cache),
                Arc::clone(&quotes),
                60,
            )),
            monitor: Arc::clone(&monitor),
            views: Arc::new(ViewRegistry::new(monitor)),
            quotes,
            default_lookback_days: 7,
            brokerage: "PAPER".to_string(),
            version: "test".to_string(),
        }
    }

    #[tokio::test]
    async fn health_check_returns_healthy() {
        let app = create_router(test_state());

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_workflow_is_404() {
        let app = create_router(test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/workflows/nope")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unknown_view_is_404() {
        let app = create_router(test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/api/v1/views/nope")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn watching_unknown_order_is_404_and_leaves_no_view() {
        let state = test_state();
        let views = Arc::clone(&state.views);
        let app = create_router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/orders/nope/watch")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(views.is_empty());
    }

    #[tokio::test]
    async fn invalid_symbol_quote_is_400() {
        let app = create_router(test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/quotes/%20")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn quote_for_known_symbol() {
        let app = create_router(test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/quotes/AAPL")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
