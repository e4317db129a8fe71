//! Executed trade records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::{Price, Quantity};
use crate::ids::{OrderId, TradeId};
use crate::order::Side;

/// An immutable, fully executed trade.
///
/// Fee fields default to zero and are serialized only when at least one of
/// `maker_fee`/`taker_fee` is nonzero, mirroring the source's conditional
/// serialization of fee fields on its wire representation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub trade_id: TradeId,
    pub symbol: String,
    pub price: Price,
    pub quantity: Quantity,
    pub timestamp: DateTime<Utc>,
    pub maker_order_id: OrderId,
    pub taker_order_id: OrderId,
    /// Always equal to the taker (incoming) order's side.
    pub aggressor_side: Side,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maker_fee: Option<Price>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taker_fee: Option<Price>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maker_fee_rate: Option<Price>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taker_fee_rate: Option<Price>,
}

impl Trade {
    /// Value of the trade, `price * quantity`, used for fee calculation.
    pub fn notional(&self) -> Price {
        self.price * self.quantity
    }
}
