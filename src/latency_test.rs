//! Performance testing suite for the matching engine.
//!
//! Measures latency and throughput under various scenarios:
//! - Market data access, order submission, matching, cancellation
//! - Sustained throughput testing with mixed workloads
//! - Statistical analysis with multiple iterations

use std::time::Instant;

use matching_engine::{EngineConfig, MatchingEngine, NewOrderRequest, OrderType, Side};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const SYMBOL: &str = "AAPL-USD";

/// Runs complete latency test suite.
pub fn run_latency_tests() {
    println!(" HFT Ledger - Real-time Latency Tests\n");

    test_market_data_latency();
    test_order_submission_latency();
    test_order_matching_latency();
    test_cancellation_latency();
}

/// Builds a resting limit request at the given price and quantity.
fn limit_request(side: Side, price: Decimal, qty: Decimal) -> NewOrderRequest {
    NewOrderRequest {
        symbol: SYMBOL.to_string(),
        order_type: OrderType::Limit,
        side,
        quantity: qty,
        price: Some(price),
        stop_price: None,
    }
}

/// Tests best bid/ask lookup performance.
fn test_market_data_latency() {
    println!(" Market Data Latency Test");

    let mut engine = MatchingEngine::new(EngineConfig::default());

    // Populate with 100 orders per side
    for i in 0..100i64 {
        engine
            .process_order(limit_request(Side::Sell, dec!(100.00) + Decimal::from(i), dec!(1)))
            .unwrap();
        engine
            .process_order(limit_request(Side::Buy, dec!(99.99) - Decimal::from(i), dec!(1)))
            .unwrap();
    }

    let iterations = 1_000_000;

    let start = Instant::now();
    for _ in 0..iterations {
        std::hint::black_box(engine.get_bbo(SYMBOL));
    }
    let bbo_duration = start.elapsed();

    let start = Instant::now();
    for _ in 0..iterations {
        std::hint::black_box(engine.get_depth(SYMBOL, 10));
    }
    let depth_duration = start.elapsed();

    println!(
        "  BBO lookup: {:.2} ns/call",
        bbo_duration.as_nanos() as f64 / iterations as f64
    );
    println!(
        "  Depth(10) lookup: {:.2} ns/call",
        depth_duration.as_nanos() as f64 / iterations as f64
    );
    println!(
        "  Combined latency: {:.2} ns\n",
        (bbo_duration.as_nanos() + depth_duration.as_nanos()) as f64 / iterations as f64
    );
}

/// Tests order submission latency for non-crossing orders.
fn test_order_submission_latency() {
    println!(" Order Submission Latency Test");

    let iterations = 10_000i64;
    let mut total_time = 0u128;

    for i in 0..iterations {
        let mut engine = MatchingEngine::new(EngineConfig::default());
        let request = limit_request(Side::Buy, dec!(100.00) - Decimal::from(i), dec!(1));

        let start = Instant::now();
        engine.process_order(request).unwrap();
        total_time += start.elapsed().as_nanos();
    }

    let avg_latency = total_time as f64 / iterations as f64;
    println!("  Average order submission: {:.2} ns", avg_latency);
    println!("  Throughput: {:.0} orders/second\n", 1_000_000_000.0 / avg_latency);
}

/// Tests order matching latency for crossing orders.
fn test_order_matching_latency() {
    println!(" Order Matching Latency Test");

    let iterations = 1_000i64;
    let mut total_setup_time = 0u128;
    let mut total_match_time = 0u128;

    for _ in 0..iterations {
        let setup_start = Instant::now();
        let mut engine = MatchingEngine::new(EngineConfig::default());

        // Add 10 resting ask orders
        for j in 0..10i64 {
            engine
                .process_order(limit_request(Side::Sell, dec!(100.00) + Decimal::from(j), dec!(1)))
                .unwrap();
        }
        total_setup_time += setup_start.elapsed().as_nanos();

        // Crossing bid that matches multiple levels
        let crossing = limit_request(Side::Buy, dec!(100.05), dec!(5));

        let match_start = Instant::now();
        let result = engine.process_order(crossing).unwrap();
        total_match_time += match_start.elapsed().as_nanos();

        std::hint::black_box(result);
    }

    println!(
        "  Setup (10 resting orders): {:.2} ns",
        total_setup_time as f64 / iterations as f64
    );
    println!(
        "  Crossing order execution: {:.2} ns",
        total_match_time as f64 / iterations as f64
    );
    println!(
        "  Total order-to-trade: {:.2} ns\n",
        (total_setup_time + total_match_time) as f64 / iterations as f64
    );
}

/// Measures cancellation latency. The book holds resting orders in a
/// per-level `VecDeque`, so cancelling from anywhere in the level is an
/// eager scan-and-remove rather than a lazy tombstone; there is no
/// lazy-marking variant to compare it against here.
fn test_cancellation_latency() {
    println!(" Cancellation Latency Test");

    let iterations = 1_000i64;
    let orders_per_test = 100i64;

    let mut total_time = 0u128;
    for _ in 0..iterations {
        let mut engine = MatchingEngine::new(EngineConfig::default());
        let mut order_ids = Vec::new();

        for _ in 0..orders_per_test {
            let result = engine
                .process_order(limit_request(Side::Buy, dec!(100.00), dec!(1)))
                .unwrap();
            order_ids.push(result.order_id);
        }

        let start = Instant::now();
        // Cancel 50% of resting orders
        for (idx, order_id) in order_ids.into_iter().enumerate() {
            if idx % 2 == 0 {
                engine.cancel_order(SYMBOL, &order_id);
            }
        }
        total_time += start.elapsed().as_nanos();
    }

    println!(
        "  Eager removal: {:.2} ns per order\n",
        total_time as f64 / (iterations * orders_per_test / 2) as f64
    );
}

/// Runs sustained throughput test with mixed workload.
pub fn run_throughput_test() {
    run_throughput_test_for(std::time::Duration::from_secs(10), "10 seconds");
}

/// Runs 1-minute sustained throughput test with mixed workload.
pub fn run_throughput_test_1min() {
    run_throughput_test_for(std::time::Duration::from_secs(60), "60 seconds");
}

fn run_throughput_test_for(duration: std::time::Duration, label: &str) {
    println!(" Sustained Throughput Test ({label})");

    let mut engine = MatchingEngine::new(EngineConfig::default());
    let mut order_seq = 1i64;
    let mut orders_processed = 0u64;
    let mut trades_executed = 0u64;

    let start_time = Instant::now();

    while start_time.elapsed() < duration {
        // Mix of order types: 25% each of non-crossing bids/asks, crossing bids/asks
        match order_seq % 4 {
            0 => {
                let request = limit_request(Side::Buy, dec!(99.99) - Decimal::from(order_seq % 100), dec!(1));
                engine.process_order(request).unwrap();
            }
            1 => {
                let request = limit_request(Side::Sell, dec!(100.01) + Decimal::from(order_seq % 100), dec!(1));
                engine.process_order(request).unwrap();
            }
            2 => {
                let request = limit_request(Side::Buy, dec!(100.01), dec!(0.5));
                let result = engine.process_order(request).unwrap();
                trades_executed += result.trades.len() as u64;
            }
            3 => {
                let request = limit_request(Side::Sell, dec!(99.99), dec!(0.5));
                let result = engine.process_order(request).unwrap();
                trades_executed += result.trades.len() as u64;
            }
            _ => unreachable!(),
        }

        order_seq += 1;
        orders_processed += 1;

        // Periodic market data queries (every 100 orders)
        if order_seq % 100 == 0 {
            std::hint::black_box(engine.get_bbo(SYMBOL));
        }
    }

    let elapsed = start_time.elapsed();
    let orders_per_sec = orders_processed as f64 / elapsed.as_secs_f64();
    let trades_per_sec = trades_executed as f64 / elapsed.as_secs_f64();

    println!("  Duration: {:.1} seconds", elapsed.as_secs_f64());
    println!("  Orders processed: {}", orders_processed);
    println!("  Trades executed: {}", trades_executed);
    println!("  Order throughput: {:.0} orders/second", orders_per_sec);
    println!("  Trade throughput: {:.0} trades/second", trades_per_sec);
    println!("  Final book state: {:?}\n", engine.get_bbo(SYMBOL));
}
