//! In-memory paper brokerage.
//!
//! Implements every driven port against local state: previews are
//! single-use, orders move through the lifecycle only when told to
//! (or one step per read with `auto_progress`). Identifiers are
//! sequential (`p1`, `o1`, ...) so runs are reproducible.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use rust_decimal::Decimal;

use super::PaperConfig;
use crate::application::ports::{
    GatewayError, ImpactCalculatorPort, OrderCommitterPort, OrderLifecyclePort, Quote,
    QuoteProviderPort,
};
use crate::domain::order_execution::{
    ImpactEstimate, ImpactQuote, ImpactVerdict, OrderIntent, OrderKind, OrderSide, OrderStatus,
    OrderStateMachine, OrderType, PlacedOrder, PlacedOrderParams,
};
use crate::domain::shared::{AccountId, Money, OrderId, PreviewId, Quantity, Symbol, Timestamp};

/// Rejection reason when the market switch is off.
pub const OUTSIDE_MARKET_HOURS: &str = "Outside market hours";
/// Rejection reason when a buy exceeds buying power.
pub const INSUFFICIENT_BUYING_POWER: &str = "Insufficient buying power";

#[derive(Debug, Clone)]
struct PaperPreview {
    intent: OrderIntent,
    rejection: Option<String>,
    execution_price: Decimal,
    total: Decimal,
    expires_at: Timestamp,
    consumed: bool,
}

#[derive(Debug, Clone)]
struct PaperOrder {
    params: PlacedOrderParams,
    execution_price: Decimal,
    reserved: Decimal,
}

#[derive(Debug)]
struct PaperState {
    config: PaperConfig,
    offline: bool,
    next_preview: u64,
    next_order: u64,
    previews: HashMap<PreviewId, PaperPreview>,
    orders: HashMap<OrderId, PaperOrder>,
    commits: usize,
}

/// Paper brokerage.
#[derive(Debug)]
pub struct PaperBrokerage {
    state: Mutex<PaperState>,
}

impl PaperBrokerage {
    /// Create a paper brokerage.
    #[must_use]
    pub fn new(config: PaperConfig) -> Self {
        Self {
            state: Mutex::new(PaperState {
                config,
                offline: false,
                next_preview: 1,
                next_order: 1,
                previews: HashMap::new(),
                orders: HashMap::new(),
                commits: 0,
            }),
        }
    }

    /// Set the price of a symbol.
    pub fn set_price(&self, symbol: &str, price: Decimal) {
        self.state
            .lock()
            .config
            .prices
            .insert(symbol.to_uppercase(), price);
    }

    /// Open or close the market.
    pub fn set_market_open(&self, open: bool) {
        self.state.lock().config.market_open = open;
    }

    /// Simulate an outage: every call fails with a connection error.
    pub fn set_offline(&self, offline: bool) {
        self.state.lock().offline = offline;
    }

    /// Remaining buying power.
    #[must_use]
    pub fn buying_power(&self) -> Decimal {
        self.state.lock().config.buying_power
    }

    /// Number of commit calls received, successful or not.
    #[must_use]
    pub fn commit_count(&self) -> usize {
        self.state.lock().commits
    }

    /// Move an order to `status`, as the venue would.
    ///
    /// `filled_quantity` applies to `PartiallyFilled`; `Filled` fills the
    /// whole order.
    ///
    /// # Errors
    ///
    /// `NotFound` for unknown orders, `Rejected` for transitions the
    /// lifecycle forbids.
    pub fn advance_order(
        &self,
        order_id: &OrderId,
        status: OrderStatus,
        filled_quantity: Option<Quantity>,
    ) -> Result<PlacedOrder, GatewayError> {
        let mut state = self.state.lock();
        let PaperState { config, orders, .. } = &mut *state;
        let order = orders.get_mut(order_id).ok_or_else(|| GatewayError::NotFound {
            resource: format!("order {order_id}"),
        })?;
        OrderStateMachine::validate_transition(order.params.status, status).map_err(|e| {
            GatewayError::Rejected {
                reason: e.to_string(),
            }
        })?;
        apply_status(config, order, status, filled_quantity);
        Ok(PlacedOrder::from_snapshot(order.params.clone()))
    }

    fn check_online(&self) -> Result<(), GatewayError> {
        if self.state.lock().offline {
            return Err(GatewayError::Connection {
                message: "paper brokerage is offline".to_string(),
            });
        }
        Ok(())
    }
}

/// Apply a status change and its fills, releasing any unused reservation.
fn apply_status(
    config: &mut PaperConfig,
    order: &mut PaperOrder,
    status: OrderStatus,
    filled_quantity: Option<Quantity>,
) {
    let params = &mut order.params;
    match status {
        OrderStatus::Filled => params.filled_quantity = params.quantity,
        OrderStatus::PartiallyFilled => {
            if let Some(filled) = filled_quantity {
                params.filled_quantity = params.quantity.cap_fill(filled);
            }
        }
        _ => {}
    }
    if !params.filled_quantity.is_zero() {
        params.avg_fill_price = Some(order.execution_price);
    }
    if matches!(status, OrderStatus::Cancelled | OrderStatus::Rejected)
        && params.side == OrderSide::Buy
    {
        let unfilled = params.quantity.remaining_after(params.filled_quantity).amount();
        let release = (order.execution_price * unfilled).min(order.reserved);
        config.buying_power += release;
        order.reserved -= release;
    }
    params.status = status;
    params.last_updated_at = next_update(params.last_updated_at);
}

/// A timestamp strictly after `previous`.
fn next_update(previous: Timestamp) -> Timestamp {
    let now = Timestamp::now();
    if now > previous {
        now
    } else {
        previous.plus_millis(1)
    }
}

/// The next step of a simulated venue.
const fn auto_step(order_type: OrderType, status: OrderStatus) -> Option<OrderStatus> {
    match (order_type, status) {
        (_, OrderStatus::Submitted) => Some(OrderStatus::Open),
        (OrderType::Market, OrderStatus::Open | OrderStatus::PartiallyFilled) => {
            Some(OrderStatus::Filled)
        }
        _ => None,
    }
}

const fn execution_price(kind: OrderKind, last: Decimal) -> Decimal {
    match kind {
        OrderKind::Market => last,
        OrderKind::Limit { limit_price } | OrderKind::StopLimit { limit_price, .. } => limit_price,
        OrderKind::Stop { stop_price } => stop_price,
    }
}

#[async_trait]
impl QuoteProviderPort for PaperBrokerage {
    async fn get_quote(&self, symbol: &Symbol) -> Result<Quote, GatewayError> {
        self.check_online()?;
        let state = self.state.lock();
        let price = state
            .config
            .prices
            .get(symbol.as_str())
            .copied()
            .ok_or_else(|| GatewayError::NotFound {
                resource: format!("symbol {symbol}"),
            })?;
        let spread = Decimal::new(1, 2);
        Ok(Quote::new(symbol.clone(), price, Timestamp::now())
            .with_spread(price - spread, price + spread))
    }
}

#[async_trait]
impl ImpactCalculatorPort for PaperBrokerage {
    async fn compute_impact(&self, intent: &OrderIntent) -> Result<ImpactQuote, GatewayError> {
        self.check_online()?;
        let mut state = self.state.lock();
        let currency = state.config.currency;
        let now = Timestamp::now();

        let last = state.config.prices.get(intent.symbol().as_str()).copied();
        let price = last.map(|last| execution_price(intent.kind(), last));
        let quantity = intent.quantity().amount();
        let cost = Money::new(price.unwrap_or_default() * quantity, currency).round();
        let fees = Money::new(state.config.commission(quantity), currency).round();
        let estimate = ImpactEstimate::from_parts(cost, fees).map_err(|e| GatewayError::Unknown {
            message: e.to_string(),
        })?;

        let rejection = if price.is_none() {
            Some(format!("Unknown symbol {}", intent.symbol()))
        } else if !state.config.market_open {
            Some(OUTSIDE_MARKET_HOURS.to_string())
        } else if intent.side() == OrderSide::Buy
            && estimate.total.amount() > state.config.buying_power
        {
            Some(INSUFFICIENT_BUYING_POWER.to_string())
        } else {
            None
        };

        let preview_id = PreviewId::new(format!("p{}", state.next_preview));
        state.next_preview += 1;
        let ttl_secs = i64::try_from(state.config.preview_ttl_secs).unwrap_or(i64::from(u32::MAX));
        let expires_at = now.plus_seconds(ttl_secs);
        state.previews.insert(
            preview_id.clone(),
            PaperPreview {
                intent: intent.clone(),
                rejection: rejection.clone(),
                execution_price: price.unwrap_or_default(),
                total: estimate.total.amount(),
                expires_at,
                consumed: false,
            },
        );

        let verdict = rejection.map_or(ImpactVerdict::Accepted, |reason| {
            ImpactVerdict::Rejected { reason }
        });
        let mut warnings = Vec::new();
        if intent.kind() == OrderKind::Market && intent.side() == OrderSide::Buy {
            warnings.push("Market orders execute at the next available price".to_string());
        }
        Ok(ImpactQuote::new(preview_id, verdict, estimate, now)
            .with_warnings(warnings)
            .with_expiry(expires_at))
    }
}

#[async_trait]
impl OrderCommitterPort for PaperBrokerage {
    async fn commit(&self, preview_id: &PreviewId) -> Result<PlacedOrder, GatewayError> {
        self.check_online()?;
        let mut state = self.state.lock();
        state.commits += 1;
        let now = Timestamp::now();

        let preview = state
            .previews
            .get_mut(preview_id)
            .ok_or_else(|| GatewayError::Rejected {
                reason: format!("Unknown preview {preview_id}"),
            })?;
        if preview.consumed {
            return Err(GatewayError::Rejected {
                reason: format!("Preview {preview_id} was already used"),
            });
        }
        preview.consumed = true;
        if let Some(reason) = preview.rejection.clone() {
            return Err(GatewayError::Rejected { reason });
        }
        if now >= preview.expires_at {
            return Err(GatewayError::Rejected {
                reason: format!("Preview {preview_id} has expired"),
            });
        }
        let preview = preview.clone();

        let reserved = if preview.intent.side() == OrderSide::Buy {
            if preview.total > state.config.buying_power {
                return Err(GatewayError::Rejected {
                    reason: INSUFFICIENT_BUYING_POWER.to_string(),
                });
            }
            state.config.buying_power -= preview.total;
            preview.total
        } else {
            Decimal::ZERO
        };

        let order_id = OrderId::new(format!("o{}", state.next_order));
        state.next_order += 1;
        let intent = &preview.intent;
        let params = PlacedOrderParams {
            order_id: order_id.clone(),
            account_id: intent.account_id().clone(),
            symbol: intent.symbol().clone(),
            side: intent.side(),
            order_type: intent.kind().order_type(),
            quantity: intent.quantity(),
            filled_quantity: Quantity::ZERO,
            limit_price: intent.kind().limit_price(),
            stop_price: intent.kind().stop_price(),
            status: OrderStatus::Submitted,
            avg_fill_price: None,
            placed_at: now,
            last_updated_at: now,
        };
        state.orders.insert(
            order_id,
            PaperOrder {
                params: params.clone(),
                execution_price: preview.execution_price,
                reserved,
            },
        );
        Ok(PlacedOrder::from_snapshot(params))
    }
}

#[async_trait]
impl OrderLifecyclePort for PaperBrokerage {
    async fn list_orders(
        &self,
        account_id: &AccountId,
        since: Timestamp,
    ) -> Result<Vec<PlacedOrder>, GatewayError> {
        self.check_online()?;
        let mut state = self.state.lock();
        let PaperState { config, orders, .. } = &mut *state;
        let mut listed: Vec<PlacedOrder> = orders
            .values_mut()
            .filter(|o| &o.params.account_id == account_id && o.params.placed_at >= since)
            .map(|order| {
                if config.auto_progress
                    && let Some(next) = auto_step(order.params.order_type, order.params.status)
                {
                    apply_status(config, order, next, None);
                }
                PlacedOrder::from_snapshot(order.params.clone())
            })
            .collect();
        listed.sort_by(|a, b| b.placed_at().cmp(&a.placed_at()));
        Ok(listed)
    }

    async fn get_order(&self, order_id: &OrderId) -> Result<PlacedOrder, GatewayError> {
        self.check_online()?;
        let mut state = self.state.lock();
        let PaperState { config, orders, .. } = &mut *state;
        let order = orders.get_mut(order_id).ok_or_else(|| GatewayError::NotFound {
            resource: format!("order {order_id}"),
        })?;
        if config.auto_progress
            && let Some(next) = auto_step(order.params.order_type, order.params.status)
        {
            apply_status(config, order, next, None);
        }
        Ok(PlacedOrder::from_snapshot(order.params.clone()))
    }

    async fn cancel_order(&self, order_id: &OrderId) -> Result<(), GatewayError> {
        self.check_online()?;
        let mut state = self.state.lock();
        let PaperState { config, orders, .. } = &mut *state;
        let order = orders.get_mut(order_id).ok_or_else(|| GatewayError::NotFound {
            resource: format!("order {order_id}"),
        })?;
        match order.params.status {
            status if status.is_terminal() => Err(GatewayError::AlreadyFinalized {
                order_id: order_id.to_string(),
                status: Some(status),
            }),
            OrderStatus::Submitted => Err(GatewayError::Rejected {
                reason: "order is not yet working".to_string(),
            }),
            _ => {
                apply_status(config, order, OrderStatus::Cancelled, None);
                Ok(())
            }
        }
    }
}
