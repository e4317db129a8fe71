//! The per-symbol order book: two sorted price->level maps plus an O(1)
//! order-id index.

use std::collections::{BTreeMap, HashMap};

use chrono::Utc;

use crate::bbo::Bbo;
use crate::decimal::{Price, Quantity};
use crate::ids::OrderId;
use crate::order::{Order, Side};
use crate::price_level::PriceLevel;

/// One side of the book: a sorted map of price to [`PriceLevel`].
///
/// Bids and asks share this implementation; which end of the sorted map is
/// "best" depends on `side` (bids: highest price first, asks: lowest price
/// first).
#[derive(Debug, Clone)]
pub struct BookSide {
    side: Side,
    levels: BTreeMap<Price, PriceLevel>,
}

impl BookSide {
    fn new(side: Side) -> Self {
        Self {
            side,
            levels: BTreeMap::new(),
        }
    }

    /// The best (highest bid / lowest ask) price currently resting, if any.
    pub fn best_price(&self) -> Option<Price> {
        match self.side {
            Side::Buy => self.levels.keys().next_back().copied(),
            Side::Sell => self.levels.keys().next().copied(),
        }
    }

    pub fn best_level(&self) -> Option<&PriceLevel> {
        let price = self.best_price()?;
        self.levels.get(&price)
    }

    pub fn best_level_mut(&mut self) -> Option<&mut PriceLevel> {
        let price = self.best_price()?;
        self.levels.get_mut(&price)
    }

    pub fn level_mut(&mut self, price: Price) -> Option<&mut PriceLevel> {
        self.levels.get_mut(&price)
    }

    pub fn add_order(&mut self, order: Order) {
        let price = order
            .price
            .expect("a resting order always carries its limit price");
        self.levels
            .entry(price)
            .or_insert_with(|| PriceLevel::new(price))
            .add_order(order);
    }

    /// Remove the level at `price` if it has gone empty. Must be called after
    /// any operation that can drain a level, so the book never holds an empty
    /// level (§3 invariant).
    pub fn remove_level_if_empty(&mut self, price: Price) {
        if self.levels.get(&price).is_some_and(PriceLevel::is_empty) {
            self.levels.remove(&price);
        }
    }

    pub fn num_levels(&self) -> usize {
        self.levels.len()
    }

    pub fn num_orders(&self) -> usize {
        self.levels.values().map(PriceLevel::len).sum()
    }

    /// Top `n` levels, best price first, as (price, aggregate quantity).
    pub fn depth(&self, n: usize) -> Vec<(Price, Quantity)> {
        let iter: Box<dyn Iterator<Item = (&Price, &PriceLevel)>> = match self.side {
            Side::Buy => Box::new(self.levels.iter().rev()),
            Side::Sell => Box::new(self.levels.iter()),
        };
        iter.take(n)
            .map(|(price, level)| (*price, level.total_quantity()))
            .collect()
    }

    /// Levels in priority order (best first), for the matching loop to walk.
    pub fn iter_levels_best_first(&self) -> Box<dyn Iterator<Item = (&Price, &PriceLevel)> + '_> {
        match self.side {
            Side::Buy => Box::new(self.levels.iter().rev()),
            Side::Sell => Box::new(self.levels.iter()),
        }
    }
}

/// A single symbol's resting orders: bids, asks, and the order index that
/// lets `cancel_order` and `get_order` jump straight to the right level.
#[derive(Debug, Clone)]
pub struct OrderBook {
    pub symbol: String,
    bids: BookSide,
    asks: BookSide,
    order_index: HashMap<OrderId, (Side, Price)>,
}

impl OrderBook {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            bids: BookSide::new(Side::Buy),
            asks: BookSide::new(Side::Sell),
            order_index: HashMap::new(),
        }
    }

    pub fn side(&self, side: Side) -> &BookSide {
        match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        }
    }

    pub fn side_mut(&mut self, side: Side) -> &mut BookSide {
        match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        }
    }

    /// Add a resting order to its side and the order index. `O(log P)` if a
    /// new level is created, `O(1)` otherwise.
    pub fn add_order(&mut self, order: Order) {
        let price = order
            .price
            .expect("a resting order always carries its limit price");
        self.order_index
            .insert(order.order_id.clone(), (order.side, price));
        self.side_mut(order.side).add_order(order);
    }

    /// Remove an order from the book by id. `None` if the id is unknown,
    /// mapped by the caller onto `EngineError::OrderNotFound`.
    pub fn remove_order(&mut self, order_id: &OrderId) -> Option<Order> {
        let (side, price) = self.order_index.remove(order_id)?;
        let book_side = self.side_mut(side);
        let removed = book_side.level_mut(price).and_then(|l| l.remove(order_id));
        book_side.remove_level_if_empty(price);
        removed
    }

    pub fn has_order(&self, order_id: &OrderId) -> bool {
        self.order_index.contains_key(order_id)
    }

    pub fn get_order(&self, order_id: &OrderId) -> Option<&Order> {
        let (side, price) = self.order_index.get(order_id)?;
        self.side(*side)
            .levels
            .get(price)?
            .iter()
            .find(|o| &o.order_id == order_id)
    }

    /// The resting order at the front of `side`'s best level, i.e. the next
    /// one matching would fill. Used by the matching loop to mutate a maker's
    /// `remaining_quantity` in place.
    pub fn best_order_mut(&mut self, side: Side) -> Option<&mut Order> {
        self.side_mut(side).best_level_mut()?.front_mut()
    }

    /// Apply a signed delta to `side`'s best level's aggregate quantity, after
    /// the matching loop has adjusted the front order's own quantity.
    pub fn adjust_best_level(&mut self, side: Side, delta: Quantity) {
        if let Some(level) = self.side_mut(side).best_level_mut() {
            level.adjust(delta);
        }
    }

    /// Pop the now-fully-filled order resting at the front of `side`'s best
    /// level, removing it from the order index and clearing the level if it
    /// has gone empty. Call only once the front order's `remaining_quantity`
    /// has reached zero.
    pub fn pop_filled_best(&mut self, side: Side) -> Option<Order> {
        let price = self.side(side).best_price()?;
        let popped = self.side_mut(side).level_mut(price)?.pop_front();
        if let Some(order) = &popped {
            self.order_index.remove(&order.order_id);
        }
        self.side_mut(side).remove_level_if_empty(price);
        popped
    }

    pub fn best_bid(&self) -> Option<Price> {
        self.bids.best_price()
    }

    pub fn best_ask(&self) -> Option<Price> {
        self.asks.best_price()
    }

    /// `true` once the bid side's best price is no longer strictly below the
    /// ask side's best price. A crossed book after matching is a fatal
    /// invariant violation (§7): it means the matching algorithm itself is
    /// wrong, never a condition to recover from silently.
    pub fn is_crossed(&self) -> bool {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => bid >= ask,
            _ => false,
        }
    }

    pub fn calculate_bbo(&self) -> Bbo {
        Bbo {
            symbol: self.symbol.clone(),
            best_bid: self.best_bid(),
            best_bid_quantity: self
                .bids
                .best_level()
                .map(PriceLevel::total_quantity)
                .unwrap_or(Quantity::ZERO),
            best_ask: self.best_ask(),
            best_ask_quantity: self
                .asks
                .best_level()
                .map(PriceLevel::total_quantity)
                .unwrap_or(Quantity::ZERO),
            timestamp: Utc::now(),
        }
    }

    pub fn get_depth(&self, levels: usize) -> (Vec<(Price, Quantity)>, Vec<(Price, Quantity)>) {
        (self.bids.depth(levels), self.asks.depth(levels))
    }

    /// Iterate every resting order across both sides, in no particular order;
    /// used by snapshotting, which sorts by `arrival_seq` itself before replay.
    pub fn all_orders(&self) -> impl Iterator<Item = &Order> {
        self.bids
            .levels
            .values()
            .chain(self.asks.levels.values())
            .flat_map(PriceLevel::iter)
    }
}
