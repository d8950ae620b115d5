//! Order form state and the validated order intent it produces.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{OrderKind, OrderSide, OrderType, TimeInForce, ValidationError};
use crate::domain::shared::{AccountId, Quantity, Symbol};

/// Raw order form input, exactly as a trading surface holds it.
///
/// Every field is editable and may be inconsistent (a limit order
/// with no limit price, a zero quantity). [`OrderDraft::validate`]
/// is the only way to obtain an [`OrderIntent`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderDraft {
    /// Account to trade in.
    pub account_id: String,
    /// Ticker as typed.
    pub symbol: String,
    /// Buy or sell.
    pub side: OrderSide,
    /// Selected order type.
    pub order_type: OrderType,
    /// Share quantity.
    pub quantity: Decimal,
    /// Limit price, used by LIMIT and STOP_LIMIT.
    pub limit_price: Option<Decimal>,
    /// Stop price, used by STOP and STOP_LIMIT.
    pub stop_price: Option<Decimal>,
    /// Time in force.
    pub time_in_force: TimeInForce,
    /// Holdings of `symbol` in the account, when the caller knows them.
    pub current_holdings: Option<Decimal>,
}

impl OrderDraft {
    /// A market order draft.
    #[must_use]
    pub fn market(
        account_id: impl Into<String>,
        symbol: impl Into<String>,
        side: OrderSide,
        quantity: Decimal,
    ) -> Self {
        Self {
            account_id: account_id.into(),
            symbol: symbol.into(),
            side,
            quantity,
            ..Self::default()
        }
    }

    /// A blank draft that keeps only the account.
    #[must_use]
    pub fn blank_for(account_id: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            ..Self::default()
        }
    }

    /// Switch to a limit order at `price`.
    #[must_use]
    pub fn with_limit_price(mut self, price: Decimal) -> Self {
        self.order_type = if self.stop_price.is_some() {
            OrderType::StopLimit
        } else {
            OrderType::Limit
        };
        self.limit_price = Some(price);
        self
    }

    /// Switch to a stop order triggered at `price`.
    #[must_use]
    pub fn with_stop_price(mut self, price: Decimal) -> Self {
        self.order_type = if self.limit_price.is_some() {
            OrderType::StopLimit
        } else {
            OrderType::Stop
        };
        self.stop_price = Some(price);
        self
    }

    /// Set the order type without touching prices.
    #[must_use]
    pub const fn with_order_type(mut self, order_type: OrderType) -> Self {
        self.order_type = order_type;
        self
    }

    /// Set the time in force.
    #[must_use]
    pub const fn with_time_in_force(mut self, tif: TimeInForce) -> Self {
        self.time_in_force = tif;
        self
    }

    /// Record the caller's known holdings for the advisory sell check.
    #[must_use]
    pub const fn with_holdings(mut self, held: Decimal) -> Self {
        self.current_holdings = Some(held);
        self
    }

    /// Validate the form and build an order intent.
    ///
    /// Prices the selected order type does not use are ignored.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found, checking account,
    /// symbol, quantity, prices, then holdings.
    pub fn validate(&self) -> Result<OrderIntent, ValidationError> {
        if self.account_id.trim().is_empty() {
            return Err(ValidationError::MissingAccount);
        }

        let symbol =
            Symbol::parse(self.symbol.as_str()).map_err(|_| ValidationError::InvalidSymbol {
                symbol: self.symbol.clone(),
            })?;

        if self.quantity <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveQuantity {
                quantity: self.quantity,
            });
        }

        let kind = self.order_kind()?;

        if self.side.is_sell()
            && let Some(held) = self.current_holdings
            && self.quantity > held
        {
            return Err(ValidationError::InsufficientHoldings {
                requested: self.quantity,
                held,
            });
        }

        Ok(OrderIntent {
            account_id: AccountId::new(self.account_id.trim()),
            symbol,
            side: self.side,
            kind,
            quantity: Quantity::new(self.quantity),
            time_in_force: self.time_in_force,
        })
    }

    fn order_kind(&self) -> Result<OrderKind, ValidationError> {
        let limit = if self.order_type.requires_limit_price() {
            Some(required_price(
                self.limit_price,
                "limit_price",
                ValidationError::MissingLimitPrice {
                    order_type: self.order_type,
                },
            )?)
        } else {
            None
        };
        let stop = if self.order_type.requires_stop_price() {
            Some(required_price(
                self.stop_price,
                "stop_price",
                ValidationError::MissingStopPrice {
                    order_type: self.order_type,
                },
            )?)
        } else {
            None
        };

        Ok(match (self.order_type, limit, stop) {
            (OrderType::Limit, Some(limit_price), _) => OrderKind::Limit { limit_price },
            (OrderType::Stop, _, Some(stop_price)) => OrderKind::Stop { stop_price },
            (OrderType::StopLimit, Some(limit_price), Some(stop_price)) => OrderKind::StopLimit {
                stop_price,
                limit_price,
            },
            _ => OrderKind::Market,
        })
    }
}

fn required_price(
    price: Option<Decimal>,
    field: &'static str,
    missing: ValidationError,
) -> Result<Decimal, ValidationError> {
    match price {
        None => Err(missing),
        Some(price) if price <= Decimal::ZERO => {
            Err(ValidationError::NonPositivePrice { field, price })
        }
        Some(price) => Ok(price),
    }
}

/// A validated, immutable trade request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderIntent {
    account_id: AccountId,
    symbol: Symbol,
    side: OrderSide,
    #[serde(flatten)]
    kind: OrderKind,
    quantity: Quantity,
    time_in_force: TimeInForce,
}

impl OrderIntent {
    /// Account to trade in.
    #[must_use]
    pub const fn account_id(&self) -> &AccountId {
        &self.account_id
    }

    /// Instrument.
    #[must_use]
    pub const fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Buy or sell.
    #[must_use]
    pub const fn side(&self) -> OrderSide {
        self.side
    }

    /// Order kind with its prices.
    #[must_use]
    pub const fn kind(&self) -> OrderKind {
        self.kind
    }

    /// Strictly positive quantity.
    #[must_use]
    pub const fn quantity(&self) -> Quantity {
        self.quantity
    }

    /// Time in force.
    #[must_use]
    pub const fn time_in_force(&self) -> TimeInForce {
        self.time_in_force
    }
}
