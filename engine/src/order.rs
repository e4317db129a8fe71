//! Order types, sides, statuses, and the resting [`Order`] record itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::{Price, Quantity};
use crate::ids::OrderId;

/// Which side of the book an order sits on or removes liquidity from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

/// The seven order types this engine accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    Market,
    Limit,
    Ioc,
    Fok,
    StopLoss,
    StopLimit,
    TakeProfit,
}

impl OrderType {
    /// Stop-family order types admitted to the pending-stop list rather than the book.
    pub fn is_stop_family(self) -> bool {
        matches!(
            self,
            OrderType::StopLoss | OrderType::StopLimit | OrderType::TakeProfit
        )
    }

    /// Only resting limit orders can sit on the book after a partial fill.
    pub fn can_rest_on_book(self) -> bool {
        matches!(self, OrderType::Limit)
    }
}

/// Persisted lifecycle status of an [`Order`].
///
/// This is deliberately narrower than [`OrderResultStatus`]: `accepted` and
/// `pending` are surfaced only on the transient result returned to the caller
/// of `process_order`, never written back onto the order record itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    New,
    Partial,
    Filled,
    Cancelled,
    Rejected,
}

/// Status surfaced on an [`crate::matching::OrderResult`].
///
/// A superset of [`OrderStatus`]: `Accepted` means a limit order is now
/// resting on the book with no change since its last partial/new state;
/// `Pending` means a stop-family order was admitted to the pending-stop list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderResultStatus {
    New,
    Partial,
    Filled,
    Cancelled,
    Rejected,
    Accepted,
    Pending,
}

impl From<OrderStatus> for OrderResultStatus {
    fn from(status: OrderStatus) -> Self {
        match status {
            OrderStatus::New => OrderResultStatus::New,
            OrderStatus::Partial => OrderResultStatus::Partial,
            OrderStatus::Filled => OrderResultStatus::Filled,
            OrderStatus::Cancelled => OrderResultStatus::Cancelled,
            OrderStatus::Rejected => OrderResultStatus::Rejected,
        }
    }
}

/// A live or historical order.
///
/// Owned by the engine from admission until it reaches a terminal status
/// (`Filled` or `Cancelled`); subscribers only ever see copies inside events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    pub symbol: String,
    pub order_type: OrderType,
    pub side: Side,
    pub quantity: Quantity,
    pub price: Option<Price>,
    pub stop_price: Option<Price>,
    pub timestamp: DateTime<Utc>,
    pub remaining_quantity: Quantity,
    pub status: OrderStatus,
    pub is_triggered: bool,
    /// Admission sequence number, used as the sole FIFO tie-break. `timestamp`
    /// is informational only and must never be used to reorder matching.
    pub arrival_seq: u64,
}

impl Order {
    pub fn is_filled(&self) -> bool {
        self.remaining_quantity.is_zero()
    }

    pub fn can_rest_on_book(&self) -> bool {
        self.order_type.can_rest_on_book()
    }

    /// Recompute `status` from `remaining_quantity`. Only ever moves an order
    /// towards `Filled`/`Partial`; terminal states set elsewhere (`Cancelled`,
    /// `Rejected`) are not touched here.
    pub fn update_status(&mut self) {
        if self.remaining_quantity.is_zero() {
            self.status = OrderStatus::Filled;
        } else if self.remaining_quantity < self.quantity {
            self.status = OrderStatus::Partial;
        }
    }
}

/// Caller-supplied fields for a new order; the engine assigns `order_id`,
/// `timestamp`, `arrival_seq`, and initializes `remaining_quantity`/`status`.
#[derive(Debug, Clone)]
pub struct NewOrderRequest {
    pub symbol: String,
    pub order_type: OrderType,
    pub side: Side,
    pub quantity: Quantity,
    pub price: Option<Price>,
    pub stop_price: Option<Price>,
}

impl NewOrderRequest {
    /// Field-presence and positivity checks from §3/§6: does not touch any
    /// book or engine state. Returns a human-readable reason on failure.
    pub fn validate(&self) -> Result<(), String> {
        if self.quantity.is_sign_negative() || self.quantity.is_zero() {
            return Err("quantity must be positive".to_string());
        }
        if !is_valid_symbol(&self.symbol) {
            return Err(format!("malformed symbol: {}", self.symbol));
        }

        match self.order_type {
            OrderType::Limit | OrderType::Ioc | OrderType::Fok => {
                match self.price {
                    None => return Err(format!("price required for {:?} orders", self.order_type)),
                    Some(p) if p.is_sign_negative() || p.is_zero() => {
                        return Err("price must be positive".to_string())
                    }
                    Some(_) => {}
                }
            }
            OrderType::StopLoss | OrderType::TakeProfit | OrderType::StopLimit => {
                match self.stop_price {
                    None => {
                        return Err(format!(
                            "stop_price required for {:?} orders",
                            self.order_type
                        ))
                    }
                    Some(p) if p.is_sign_negative() || p.is_zero() => {
                        return Err("stop_price must be positive".to_string())
                    }
                    Some(_) => {}
                }
                if self.order_type == OrderType::StopLimit {
                    match self.price {
                        None => return Err("limit price required for stop-limit orders".to_string()),
                        Some(p) if p.is_sign_negative() || p.is_zero() => {
                            return Err("limit price must be positive".to_string())
                        }
                        Some(_) => {}
                    }
                }
            }
            OrderType::Market => {}
        }

        Ok(())
    }
}

/// Symbol pattern `^[A-Z]+-[A-Z]+$`, checked without a regex dependency since
/// the shape is a single fixed split on one separator.
pub fn is_valid_symbol(symbol: &str) -> bool {
    let Some((base, quote)) = symbol.split_once('-') else {
        return false;
    };
    let is_upper_alpha = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_uppercase());
    is_upper_alpha(base) && is_upper_alpha(quote)
}
