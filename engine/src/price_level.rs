//! A single price level: a FIFO queue of resting orders plus their aggregate
//! quantity.

use std::collections::VecDeque;

use crate::decimal::{Price, Quantity};
use crate::ids::OrderId;
use crate::order::Order;

/// FIFO queue of orders resting at one price, with their summed
/// `remaining_quantity` tracked incrementally so depth queries are O(1).
#[derive(Debug, Clone)]
pub struct PriceLevel {
    pub price: Price,
    orders: VecDeque<Order>,
    total_quantity: Quantity,
}

impl PriceLevel {
    pub fn new(price: Price) -> Self {
        Self {
            price,
            orders: VecDeque::new(),
            total_quantity: Quantity::ZERO,
        }
    }

    pub fn total_quantity(&self) -> Quantity {
        self.total_quantity
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// Append to the tail: the new order is the last to match at this price.
    pub fn add_order(&mut self, order: Order) {
        self.total_quantity += order.remaining_quantity;
        self.orders.push_back(order);
    }

    /// The oldest order at this level, the next to match.
    pub fn front(&self) -> Option<&Order> {
        self.orders.front()
    }

    pub fn front_mut(&mut self) -> Option<&mut Order> {
        self.orders.front_mut()
    }

    /// Apply a signed delta to the level's aggregate quantity, e.g. after a
    /// partial fill decrements the front order's `remaining_quantity` without
    /// removing it from the queue.
    pub fn adjust(&mut self, delta: Quantity) {
        self.total_quantity += delta;
    }

    /// Pop the front order unconditionally (used once it is fully filled).
    pub fn pop_front(&mut self) -> Option<Order> {
        let popped = self.orders.pop_front();
        if let Some(o) = &popped {
            self.total_quantity -= o.remaining_quantity;
        }
        popped
    }

    /// Remove an order from anywhere in the level (arbitrary cancellation).
    ///
    /// There is no secondary position index here: this scans the level's own
    /// queue, which in practice is shallow relative to the whole book. This
    /// trades strict O(1) amortized removal for invariant simplicity — see
    /// DESIGN.md.
    pub fn remove(&mut self, order_id: &OrderId) -> Option<Order> {
        let pos = self.orders.iter().position(|o| &o.order_id == order_id)?;
        let removed = self.orders.remove(pos)?;
        self.total_quantity -= removed.remaining_quantity;
        Some(removed)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter()
    }
}
