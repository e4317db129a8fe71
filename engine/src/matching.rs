//! The matching engine: order admission, price-time-priority matching,
//! stop-order triggering, and cancellation.
//!
//! This is the direct counterpart of the source's core engine module. It owns
//! every book, the pending-stop lists, the id generator, and the publishers;
//! nothing outside this module ever mutates a book directly.

use std::collections::{HashMap, VecDeque};
use std::io;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tokio::sync::broadcast;
use tracing::{error, info};

use crate::bbo::{Bbo, MarketEvent, OrderBookSnapshot};
use crate::book::OrderBook;
use crate::config::EngineConfig;
use crate::decimal::{quantize8, Price, Quantity};
use crate::error::{EngineError, FatalInvariant};
use crate::fees::FeeCalculator;
use crate::ids::{IdGenerator, OrderId};
use crate::order::{NewOrderRequest, Order, OrderResultStatus, OrderStatus, OrderType, Side};
use crate::publish::{MarketDataPublisher, SubscribeError, SubscriberRegistry, TradePublisher};
use crate::snapshot::{SnapshotHandle, SnapshotStore};
use crate::trade::Trade;

/// Depth of each market-data/trade broadcast channel. Independent of
/// `order_queue_size`, which bounds the command channel into the engine
/// itself (§5 option (a)), not the fan-out of events leaving it.
const MARKET_DATA_CHANNEL_CAPACITY: usize = 1024;

/// Outcome of a single call to [`MatchingEngine::process_order`].
///
/// A superset of the persisted [`OrderStatus`]: `accepted` and `pending`
/// exist only here, never on the `Order` record itself.
#[derive(Debug, Clone)]
pub struct OrderResult {
    pub order_id: OrderId,
    pub status: OrderResultStatus,
    pub filled_quantity: Quantity,
    pub remaining_quantity: Quantity,
    /// Quantity-weighted average fill price, `None` if no trade occurred.
    pub average_price: Option<Price>,
    pub trades: Vec<Trade>,
}

/// Owns all per-symbol order books and drives matching.
///
/// Single-writer by design (§5): every method that mutates state takes
/// `&mut self`, so the embedding application is responsible for serializing
/// access — either by owning one `MatchingEngine` per thread, or by routing
/// all calls through [`crate::worker::EngineHandle`].
pub struct MatchingEngine {
    config: EngineConfig,
    books: HashMap<String, OrderBook>,
    pending_stops: HashMap<String, Vec<Order>>,
    last_trade_price: HashMap<String, Price>,
    id_gen: IdGenerator,
    fee_calculator: Option<FeeCalculator>,
    market_data_publisher: MarketDataPublisher,
    trade_publisher: TradePublisher,
    snapshot_handle: Option<Box<dyn SnapshotHandle + Send>>,
    last_snapshot_at: Option<Instant>,
}

impl MatchingEngine {
    pub fn new(config: EngineConfig) -> Self {
        let registry = Arc::new(SubscriberRegistry::new(
            MARKET_DATA_CHANNEL_CAPACITY,
            config.max_subscribers_per_symbol,
        ));
        let fee_calculator = config
            .enable_fees
            .then(|| FeeCalculator::new(config.maker_fee_rate, config.taker_fee_rate));
        Self {
            config,
            books: HashMap::new(),
            pending_stops: HashMap::new(),
            last_trade_price: HashMap::new(),
            id_gen: IdGenerator::new(),
            fee_calculator,
            market_data_publisher: MarketDataPublisher::new(Arc::clone(&registry)),
            trade_publisher: TradePublisher::new(registry),
            snapshot_handle: None,
            last_snapshot_at: None,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Install the handle [`Self::process_order`] writes automatic snapshots
    /// to once `config.enable_persistence` is set. Without a handle, the
    /// interval check in `process_order` is a no-op, same as the source
    /// engine's `snapshot_manager` staying `None` until persistence is
    /// enabled.
    pub fn set_snapshot_handle(&mut self, handle: Box<dyn SnapshotHandle + Send>) {
        self.snapshot_handle = Some(handle);
    }

    /// Serialize current state through `handle` right now, bypassing the
    /// interval check. The manual counterpart to the automatic snapshot
    /// `process_order` takes when persistence is enabled.
    pub fn save_snapshot(&self, handle: &mut impl SnapshotHandle) -> io::Result<()> {
        SnapshotStore::save(self, handle)?;
        info!(order_books = self.books.len(), "snapshot_created");
        Ok(())
    }

    /// Replace current state with whatever `handle` holds. Returns `false`
    /// if `handle` has nothing written yet.
    pub fn load_snapshot(&mut self, handle: &mut impl SnapshotHandle) -> io::Result<bool> {
        let loaded = SnapshotStore::load(self, handle)?;
        if loaded {
            info!(
                order_books = self.books.len(),
                order_counter = self.id_gen.order_counter(),
                trade_counter = self.id_gen.trade_counter(),
                "snapshot_loaded"
            );
        }
        Ok(loaded)
    }

    /// Save through the installed handle if persistence is enabled and
    /// `snapshot_interval_seconds` has elapsed since the last save. The first
    /// call after construction only starts the clock, matching the source's
    /// `_check_snapshot`, which treats a `None` `last_snapshot_time` as "just
    /// started" rather than "overdue".
    fn maybe_auto_snapshot(&mut self) {
        if !self.config.enable_persistence {
            return;
        }
        let Some(mut handle) = self.snapshot_handle.take() else {
            return;
        };
        let now = Instant::now();
        match self.last_snapshot_at {
            None => self.last_snapshot_at = Some(now),
            Some(last)
                if now.duration_since(last).as_secs() >= self.config.snapshot_interval_seconds =>
            {
                let snapshot = SnapshotStore::capture(&*self);
                match handle.write(&snapshot) {
                    Ok(()) => {
                        self.last_snapshot_at = Some(now);
                        info!(order_books = self.books.len(), "snapshot_created");
                    }
                    Err(err) => error!(error = %err, "snapshot_failed"),
                }
            }
            Some(_) => {}
        }
        self.snapshot_handle = Some(handle);
    }

    pub fn subscribe_market_data(
        &self,
        symbol: &str,
    ) -> Result<broadcast::Receiver<MarketEvent>, SubscribeError> {
        self.market_data_publisher.subscribe(symbol)
    }

    pub fn subscribe_trades(
        &self,
        symbol: &str,
    ) -> Result<broadcast::Receiver<Trade>, SubscribeError> {
        self.trade_publisher.subscribe(symbol)
    }

    pub fn get_bbo(&self, symbol: &str) -> Option<Bbo> {
        self.market_data_publisher
            .get_cached_bbo(symbol)
            .or_else(|| self.books.get(symbol).map(OrderBook::calculate_bbo))
    }

    pub fn get_depth(
        &self,
        symbol: &str,
        levels: usize,
    ) -> Option<(Vec<(Price, Quantity)>, Vec<(Price, Quantity)>)> {
        self.books.get(symbol).map(|book| book.get_depth(levels))
    }

    pub fn get_order(&self, symbol: &str, order_id: &OrderId) -> Option<&Order> {
        self.books.get(symbol)?.get_order(order_id)
    }

    pub fn pending_stop_count(&self, symbol: &str) -> usize {
        self.pending_stops.get(symbol).map_or(0, Vec::len)
    }

    /// Admit a new order: validate, either queue it as a pending stop order
    /// or run it through matching, and drain any stop orders the resulting
    /// trades trigger.
    pub fn process_order(&mut self, request: NewOrderRequest) -> Result<OrderResult, EngineError> {
        request
            .validate()
            .map_err(|reason| EngineError::Validation { reason })?;

        info!(
            symbol = %request.symbol,
            order_type = ?request.order_type,
            side = ?request.side,
            quantity = %request.quantity,
            price = ?request.price,
            stop_price = ?request.stop_price,
            "order_submitted"
        );

        if request.order_type.is_stop_family() {
            return Ok(self.admit_pending_stop(request));
        }

        let symbol = request.symbol.clone();
        self.ensure_book(&symbol);

        let order_id = self.id_gen.next_order_id();
        let arrival_seq = self.id_gen.order_counter();
        let mut order = Order {
            order_id: order_id.clone(),
            symbol: symbol.clone(),
            order_type: request.order_type,
            side: request.side,
            quantity: request.quantity,
            price: request.price,
            stop_price: request.stop_price,
            timestamp: Utc::now(),
            remaining_quantity: request.quantity,
            status: OrderStatus::New,
            is_triggered: false,
            arrival_seq,
        };

        if request.order_type == OrderType::Fok && !self.can_fill_completely(&symbol, &order) {
            info!(order_id = %order_id, symbol = %symbol, reason = "FOK order cannot be completely filled", "order_cancelled");
            return Err(EngineError::InsufficientLiquidity { order_id });
        }

        let trades = self.execute_matching(&symbol, &mut order)?;
        let result = self.finalize_order(symbol.clone(), order, trades);
        self.drain_triggered_stops(&symbol)?;
        self.maybe_auto_snapshot();
        Ok(result)
    }

    /// Remove a resting order. Returns `false` for an unknown id and for any
    /// order still sitting in the pending-stop list — cancellation only ever
    /// looks at the book's own index, matching the source, so a pending stop
    /// order cannot be cancelled before it triggers.
    pub fn cancel_order(&mut self, symbol: &str, order_id: &OrderId) -> bool {
        let Some(book) = self.books.get_mut(symbol) else {
            return false;
        };
        match book.remove_order(order_id) {
            Some(mut order) => {
                order.status = OrderStatus::Cancelled;
                info!(
                    order_id = %order_id,
                    symbol = %symbol,
                    reason = "User requested cancellation",
                    "order_cancelled"
                );
                self.publish_market_data(symbol);
                true
            }
            None => false,
        }
    }

    fn ensure_book(&mut self, symbol: &str) {
        self.books
            .entry(symbol.to_string())
            .or_insert_with(|| OrderBook::new(symbol));
    }

    fn admit_pending_stop(&mut self, request: NewOrderRequest) -> OrderResult {
        let symbol = request.symbol.clone();
        self.ensure_book(&symbol);
        let order_id = self.id_gen.next_order_id();
        let arrival_seq = self.id_gen.order_counter();
        let order = Order {
            order_id: order_id.clone(),
            symbol: symbol.clone(),
            order_type: request.order_type,
            side: request.side,
            quantity: request.quantity,
            price: request.price,
            stop_price: request.stop_price,
            timestamp: Utc::now(),
            remaining_quantity: request.quantity,
            status: OrderStatus::New,
            is_triggered: false,
            arrival_seq,
        };
        self.pending_stops.entry(symbol).or_default().push(order);
        OrderResult {
            order_id,
            status: OrderResultStatus::Pending,
            filled_quantity: Quantity::ZERO,
            remaining_quantity: request.quantity,
            average_price: None,
            trades: Vec::new(),
        }
    }

    /// Walk the opposite side's best-first levels, summing quantity available
    /// at acceptable prices, without mutating anything. Used only by FOK
    /// admission, which must know before it touches the book whether a full
    /// fill is even possible.
    fn can_fill_completely(&self, symbol: &str, order: &Order) -> bool {
        let Some(book) = self.books.get(symbol) else {
            return false;
        };
        let opposite = order.side.opposite();
        let mut available = Quantity::ZERO;
        for (price, level) in book.side(opposite).iter_levels_best_first() {
            if !price_acceptable(order, *price) {
                break;
            }
            available += level.total_quantity();
            if available >= order.remaining_quantity {
                return true;
            }
        }
        available >= order.remaining_quantity
    }

    /// Walk the opposite side best-first, filling `taker` against resting
    /// makers at each maker's own price (price improvement for the taker),
    /// until `taker` is filled or no further acceptable price remains.
    /// Price-time priority plus always matching at the best remaining price
    /// is what rules out trade-throughs: a level is never skipped while a
    /// better, still-acceptable one exists.
    fn execute_matching(
        &mut self,
        symbol: &str,
        taker: &mut Order,
    ) -> Result<Vec<Trade>, EngineError> {
        let opposite = taker.side.opposite();
        let mut trades = Vec::new();

        loop {
            if taker.is_filled() {
                break;
            }
            let book = self
                .books
                .get_mut(symbol)
                .expect("book was created by ensure_book before matching begins");
            let Some(best_price) = book.side(opposite).best_price() else {
                break;
            };
            if !price_acceptable(taker, best_price) {
                break;
            }

            let maker = book
                .best_order_mut(opposite)
                .expect("a best price implies a front order at that level");
            let trade_qty = taker.remaining_quantity.min(maker.remaining_quantity);
            maker.remaining_quantity -= trade_qty;
            maker.update_status();
            let maker_id = maker.order_id.clone();
            let maker_fully_filled = maker.is_filled();

            taker.remaining_quantity -= trade_qty;
            taker.update_status();
            book.adjust_best_level(opposite, -trade_qty);

            let trade = self.build_trade(symbol, taker, &maker_id, best_price, trade_qty);
            self.last_trade_price
                .insert(symbol.to_string(), trade.price);
            info!(
                trade_id = %trade.trade_id,
                symbol = %trade.symbol,
                price = %trade.price,
                quantity = %trade.quantity,
                maker_order_id = %trade.maker_order_id,
                taker_order_id = %trade.taker_order_id,
                aggressor_side = ?trade.aggressor_side,
                "trade_executed"
            );
            self.trade_publisher.publish_trade(trade.clone());
            trades.push(trade);

            let book = self.books.get_mut(symbol).expect("book exists");
            if maker_fully_filled {
                book.pop_filled_best(opposite);
            }
            if book.is_crossed() {
                return Err(EngineError::Fatal(FatalInvariant::CrossedBook {
                    symbol: symbol.to_string(),
                    best_bid: book.best_bid().map(|p| p.to_string()).unwrap_or_default(),
                    best_ask: book.best_ask().map(|p| p.to_string()).unwrap_or_default(),
                }));
            }
        }

        Ok(trades)
    }

    fn build_trade(
        &mut self,
        symbol: &str,
        taker: &Order,
        maker_id: &OrderId,
        price: Price,
        quantity: Quantity,
    ) -> Trade {
        let mut trade = Trade {
            trade_id: self.id_gen.next_trade_id(),
            symbol: symbol.to_string(),
            price,
            quantity,
            timestamp: Utc::now(),
            maker_order_id: maker_id.clone(),
            taker_order_id: taker.order_id.clone(),
            aggressor_side: taker.side,
            maker_fee: None,
            taker_fee: None,
            maker_fee_rate: None,
            taker_fee_rate: None,
        };
        if let Some(calculator) = &self.fee_calculator {
            let notional = trade.notional();
            let (maker_fee, taker_fee) = calculator.calculate_fees(notional);
            let (maker_rate, taker_rate) = calculator.fee_rates();
            trade.maker_fee = Some(maker_fee);
            trade.taker_fee = Some(taker_fee);
            trade.maker_fee_rate = Some(maker_rate);
            trade.taker_fee_rate = Some(taker_rate);
        }
        trade
    }

    /// Settle an order that has just been through matching: decide whether
    /// any remainder rests on the book, finalize its persisted status, and
    /// publish updated market data if the book actually changed.
    fn finalize_order(&mut self, symbol: String, mut order: Order, trades: Vec<Trade>) -> OrderResult {
        order.update_status();
        let filled_quantity = order.quantity - order.remaining_quantity;
        let should_rest = order.remaining_quantity > Quantity::ZERO && order.can_rest_on_book();

        let status = if should_rest {
            if filled_quantity.is_zero() {
                OrderResultStatus::Accepted
            } else {
                OrderResultStatus::Partial
            }
        } else if order.remaining_quantity.is_zero() {
            OrderResultStatus::Filled
        } else {
            order.status = OrderStatus::Cancelled;
            info!(
                order_id = %order.order_id,
                symbol = %symbol,
                reason = format!("Unfilled {:?} order", order.order_type),
                "order_cancelled"
            );
            OrderResultStatus::Cancelled
        };

        let remaining_quantity = order.remaining_quantity;
        let order_id = order.order_id.clone();
        let average_price = average_fill_price(&trades);

        if should_rest {
            self.books
                .get_mut(&symbol)
                .expect("book exists for a just-matched symbol")
                .add_order(order);
        }
        if !trades.is_empty() {
            self.publish_market_data(&symbol);
        }

        OrderResult {
            order_id,
            status,
            filled_quantity,
            remaining_quantity,
            average_price,
            trades,
        }
    }

    /// Pull any pending stop orders the current last-trade price now
    /// satisfies and run them through matching, repeating until a pass
    /// triggers nothing further. An explicit queue, not recursion: a
    /// cascade of stop triggers is bounded by the number of pending stop
    /// orders, not by call-stack depth.
    fn drain_triggered_stops(&mut self, symbol: &str) -> Result<(), EngineError> {
        let mut queue: VecDeque<Order> = VecDeque::new();
        if let Some(price) = self.last_trade_price.get(symbol).copied() {
            queue.extend(self.collect_triggered(symbol, price));
        }

        while let Some(mut order) = queue.pop_front() {
            let trades = self.execute_matching(symbol, &mut order)?;
            self.finalize_order(symbol.to_string(), order, trades);

            if let Some(price) = self.last_trade_price.get(symbol).copied() {
                queue.extend(self.collect_triggered(symbol, price));
            }
        }
        Ok(())
    }

    /// Partition `symbol`'s pending stop orders into those triggered by
    /// `last_price` and those that remain pending, converting each triggered
    /// order's type to its post-trigger equivalent.
    fn collect_triggered(&mut self, symbol: &str, last_price: Price) -> Vec<Order> {
        let Some(pending) = self.pending_stops.get_mut(symbol) else {
            return Vec::new();
        };
        let mut triggered = Vec::new();
        let mut still_pending = Vec::new();
        for mut order in pending.drain(..) {
            if is_triggered_by(&order, last_price) {
                info!(
                    order_id = %order.order_id,
                    order_type = ?order.order_type,
                    stop_price = ?order.stop_price,
                    trigger_price = %last_price,
                    "stop_order_triggered"
                );
                order.is_triggered = true;
                apply_trigger_conversion(&mut order);
                triggered.push(order);
            } else {
                still_pending.push(order);
            }
        }
        *pending = still_pending;
        triggered
    }

    fn publish_market_data(&self, symbol: &str) {
        let Some(book) = self.books.get(symbol) else {
            return;
        };
        let bbo = book.calculate_bbo();
        let changed = match self.market_data_publisher.get_cached_bbo(symbol) {
            Some(prev) => {
                prev.best_bid != bbo.best_bid
                    || prev.best_bid_quantity != bbo.best_bid_quantity
                    || prev.best_ask != bbo.best_ask
                    || prev.best_ask_quantity != bbo.best_ask_quantity
            }
            None => true,
        };
        if !changed {
            return;
        }
        self.market_data_publisher.publish_bbo_update(symbol, bbo);
        let (bids, asks) = book.get_depth(self.config.depth_levels_default);
        self.market_data_publisher.publish_orderbook_update(
            symbol,
            OrderBookSnapshot {
                symbol: symbol.to_string(),
                timestamp: Utc::now(),
                bids,
                asks,
            },
        );
    }

    pub(crate) fn books(&self) -> &HashMap<String, OrderBook> {
        &self.books
    }

    pub(crate) fn pending_stops(&self) -> &HashMap<String, Vec<Order>> {
        &self.pending_stops
    }

    pub(crate) fn id_generator(&self) -> &IdGenerator {
        &self.id_gen
    }

    pub(crate) fn restore(
        &mut self,
        books: HashMap<String, OrderBook>,
        pending_stops: HashMap<String, Vec<Order>>,
        id_gen: IdGenerator,
    ) {
        self.books = books;
        self.pending_stops = pending_stops;
        self.id_gen = id_gen;
    }
}

/// The price bound a taker order must respect while matching, if any.
/// `None` means any price is acceptable (market orders, and triggered
/// stop-loss/take-profit orders, which become market orders on trigger).
fn effective_price_bound(order: &Order) -> Option<Price> {
    match order.order_type {
        OrderType::Market | OrderType::StopLoss | OrderType::TakeProfit => None,
        OrderType::Limit | OrderType::Ioc | OrderType::Fok | OrderType::StopLimit => order.price,
    }
}

fn price_acceptable(order: &Order, candidate: Price) -> bool {
    match effective_price_bound(order) {
        None => true,
        Some(limit) => match order.side {
            Side::Buy => candidate <= limit,
            Side::Sell => candidate >= limit,
        },
    }
}

/// A stop-family order's trigger condition, keyed off its own side: a sell
/// stop-loss protects a long position and fires as price falls through
/// `stop_price`; a buy stop-loss protects a short position and fires as price
/// rises through it. Take-profit orders trigger in the opposite direction.
fn is_triggered_by(order: &Order, last_price: Price) -> bool {
    let Some(stop_price) = order.stop_price else {
        return false;
    };
    match order.order_type {
        OrderType::StopLoss | OrderType::StopLimit => match order.side {
            Side::Sell => last_price <= stop_price,
            Side::Buy => last_price >= stop_price,
        },
        OrderType::TakeProfit => match order.side {
            Side::Sell => last_price >= stop_price,
            Side::Buy => last_price <= stop_price,
        },
        _ => false,
    }
}

/// A stop order loses its stop-specific type once triggered: stop-loss
/// becomes an ordinary market order; stop-limit becomes an ordinary limit
/// order at its already-set `price`; take-profit becomes a limit order too,
/// at `price` if set or else `stop_price` (`engine.py`'s
/// `check_stop_orders`). This is what lets `finalize_order` decide
/// restability with the same `can_rest_on_book` rule as any other order, with
/// no stop-specific case there.
fn apply_trigger_conversion(order: &mut Order) {
    match order.order_type {
        OrderType::StopLoss => {
            order.order_type = OrderType::Market;
            order.price = None;
        }
        OrderType::StopLimit => {
            order.order_type = OrderType::Limit;
        }
        OrderType::TakeProfit => {
            order.order_type = OrderType::Limit;
            if order.price.is_none() {
                order.price = order.stop_price;
            }
        }
        _ => {}
    }
}

fn average_fill_price(trades: &[Trade]) -> Option<Price> {
    if trades.is_empty() {
        return None;
    }
    let total_notional: Price = trades.iter().map(Trade::notional).sum();
    let total_quantity: Quantity = trades.iter().map(|t| t.quantity).sum();
    Some(quantize8(total_notional / total_quantity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn request(
        symbol: &str,
        order_type: OrderType,
        side: Side,
        quantity: Price,
        price: Option<Price>,
    ) -> NewOrderRequest {
        NewOrderRequest {
            symbol: symbol.to_string(),
            order_type,
            side,
            quantity,
            price,
            stop_price: None,
        }
    }

    #[test]
    fn resting_limit_order_with_no_crossing_liquidity_is_accepted() {
        let mut engine = MatchingEngine::new(EngineConfig::default());
        let result = engine
            .process_order(request(
                "BTC-USDT",
                OrderType::Limit,
                Side::Buy,
                dec!(1),
                Some(dec!(50000)),
            ))
            .unwrap();
        assert_eq!(result.status, OrderResultStatus::Accepted);
        assert_eq!(result.filled_quantity, dec!(0));
    }

    #[test]
    fn crossing_limit_orders_trade_at_the_maker_price() {
        let mut engine = MatchingEngine::new(EngineConfig::default());
        engine
            .process_order(request(
                "BTC-USDT",
                OrderType::Limit,
                Side::Sell,
                dec!(1),
                Some(dec!(50000)),
            ))
            .unwrap();
        let result = engine
            .process_order(request(
                "BTC-USDT",
                OrderType::Limit,
                Side::Buy,
                dec!(1),
                Some(dec!(50010)),
            ))
            .unwrap();
        assert_eq!(result.status, OrderResultStatus::Filled);
        assert_eq!(result.trades.len(), 1);
        assert_eq!(result.trades[0].price, dec!(50000));
    }

    #[test]
    fn partial_fill_leaves_remainder_resting() {
        let mut engine = MatchingEngine::new(EngineConfig::default());
        engine
            .process_order(request(
                "BTC-USDT",
                OrderType::Limit,
                Side::Sell,
                dec!(1),
                Some(dec!(50000)),
            ))
            .unwrap();
        let result = engine
            .process_order(request(
                "BTC-USDT",
                OrderType::Limit,
                Side::Buy,
                dec!(3),
                Some(dec!(50000)),
            ))
            .unwrap();
        assert_eq!(result.status, OrderResultStatus::Partial);
        assert_eq!(result.filled_quantity, dec!(1));
        assert_eq!(result.remaining_quantity, dec!(2));
        assert_eq!(engine.get_bbo("BTC-USDT").unwrap().best_bid, Some(dec!(50000)));
    }

    #[test]
    fn fok_fails_without_enough_liquidity_and_touches_nothing() {
        let mut engine = MatchingEngine::new(EngineConfig::default());
        engine
            .process_order(request(
                "BTC-USDT",
                OrderType::Limit,
                Side::Sell,
                dec!(1),
                Some(dec!(50000)),
            ))
            .unwrap();
        let err = engine
            .process_order(request(
                "BTC-USDT",
                OrderType::Fok,
                Side::Buy,
                dec!(5),
                Some(dec!(50000)),
            ))
            .unwrap_err();
        assert!(matches!(err, EngineError::InsufficientLiquidity { .. }));
        assert_eq!(engine.get_depth("BTC-USDT", 10).unwrap().1, vec![(dec!(50000), dec!(1))]);
    }

    #[test]
    fn market_order_with_no_liquidity_is_cancelled() {
        let mut engine = MatchingEngine::new(EngineConfig::default());
        let result = engine
            .process_order(request("BTC-USDT", OrderType::Market, Side::Buy, dec!(1), None))
            .unwrap();
        assert_eq!(result.status, OrderResultStatus::Cancelled);
    }

    #[test]
    fn sell_stop_loss_triggers_and_fills_as_market_on_qualifying_trade() {
        let mut engine = MatchingEngine::new(EngineConfig::default());
        // Resting liquidity so the eventual triggered market sell has somewhere to land.
        engine
            .process_order(request(
                "BTC-USDT",
                OrderType::Limit,
                Side::Buy,
                dec!(5),
                Some(dec!(49000)),
            ))
            .unwrap();

        let mut stop = request("BTC-USDT", OrderType::StopLoss, Side::Sell, dec!(1), None);
        stop.stop_price = Some(dec!(49500));
        let pending = engine.process_order(stop).unwrap();
        assert_eq!(pending.status, OrderResultStatus::Pending);
        assert_eq!(engine.pending_stop_count("BTC-USDT"), 1);

        // A trade at 49500 (at or below the stop price) should trigger it.
        engine
            .process_order(request(
                "BTC-USDT",
                OrderType::Limit,
                Side::Sell,
                dec!(1),
                Some(dec!(49000)),
            ))
            .unwrap();

        assert_eq!(engine.pending_stop_count("BTC-USDT"), 0);
    }

    #[test]
    fn triggered_take_profit_rests_as_a_limit_order_at_its_stop_price() {
        let mut engine = MatchingEngine::new(EngineConfig::default());
        // Sole resting ask, just enough to print the triggering trade; once
        // consumed there is no more liquidity left for the take-profit buy
        // to match against, so any remaining quantity must rest.
        engine
            .process_order(request(
                "BTC-USDT",
                OrderType::Limit,
                Side::Sell,
                dec!(1),
                Some(dec!(49000)),
            ))
            .unwrap();

        let mut take_profit = request("BTC-USDT", OrderType::TakeProfit, Side::Buy, dec!(2), None);
        take_profit.stop_price = Some(dec!(49500));
        let pending = engine.process_order(take_profit).unwrap();
        assert_eq!(pending.status, OrderResultStatus::Pending);

        // A trade at 49000 (at or below the buy take-profit's stop price)
        // triggers it, converting it to a limit buy at its stop_price (no
        // explicit `price` was given) rather than an unbounded market order.
        engine
            .process_order(request(
                "BTC-USDT",
                OrderType::Limit,
                Side::Buy,
                dec!(1),
                Some(dec!(49000)),
            ))
            .unwrap();

        assert_eq!(engine.pending_stop_count("BTC-USDT"), 0);
        let bbo = engine.get_bbo("BTC-USDT").unwrap();
        assert_eq!(bbo.best_bid, Some(dec!(49500)));
        assert_eq!(bbo.best_bid_quantity, dec!(2));
    }

    #[test]
    fn cancel_on_pending_stop_order_returns_false() {
        let mut engine = MatchingEngine::new(EngineConfig::default());
        let mut stop = request("BTC-USDT", OrderType::StopLoss, Side::Sell, dec!(1), None);
        stop.stop_price = Some(dec!(49500));
        let pending = engine.process_order(stop).unwrap();
        assert!(!engine.cancel_order("BTC-USDT", &pending.order_id));
    }

    #[test]
    fn cancel_removes_resting_order_and_frees_the_level() {
        let mut engine = MatchingEngine::new(EngineConfig::default());
        let result = engine
            .process_order(request(
                "BTC-USDT",
                OrderType::Limit,
                Side::Buy,
                dec!(1),
                Some(dec!(50000)),
            ))
            .unwrap();
        assert!(engine.cancel_order("BTC-USDT", &result.order_id));
        assert_eq!(engine.get_bbo("BTC-USDT").unwrap().best_bid, None);
    }

    #[test]
    fn fees_are_attached_to_trades_when_enabled() {
        let mut config = EngineConfig::default();
        config.enable_fees = true;
        let mut engine = MatchingEngine::new(config);
        engine
            .process_order(request(
                "BTC-USDT",
                OrderType::Limit,
                Side::Sell,
                dec!(1),
                Some(dec!(50000)),
            ))
            .unwrap();
        let result = engine
            .process_order(request(
                "BTC-USDT",
                OrderType::Limit,
                Side::Buy,
                dec!(1),
                Some(dec!(50000)),
            ))
            .unwrap();
        let trade = &result.trades[0];
        assert!(trade.maker_fee.is_some());
        assert!(trade.taker_fee.is_some());
    }
}
