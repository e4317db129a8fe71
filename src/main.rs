//! HFT Ledger Performance Test Suite
//!
//! Runs performance tests followed by a basic trading demo showing
//! order placement, matching, and trade execution against the
//! decimal-priced matching engine.

use matching_engine::{EngineConfig, MatchingEngine, NewOrderRequest, OrderType, Side};
use rust_decimal_macros::dec;

mod latency_test;

/// Main entry point - runs performance tests and demo.
fn main() {
    tracing_subscriber::fmt::init();

    println!("=== HFT Ledger Performance Lab ===");

    // Run comprehensive performance tests
    latency_test::run_latency_tests();
    latency_test::run_throughput_test();
    
    // Run 1-minute sustained throughput test
    println!("\n=== 1-Minute Sustained Throughput Test ===");
    latency_test::run_throughput_test_1min();
    
    // Show basic order book functionality
    println!("\n=== Basic Demo ===");
    run_basic_demo();
}

/// Demonstrates basic order submission and trade execution through the
/// matching engine.
fn run_basic_demo() {
    let mut engine = MatchingEngine::new(EngineConfig::default());

    println!("HFT Ledger - Order Book Demo");

    let ask = NewOrderRequest {
        symbol: "AAPL-USD".to_string(),
        order_type: OrderType::Limit,
        side: Side::Sell,
        quantity: dec!(100),
        price: Some(dec!(150.00)),
        stop_price: None,
    };

    let bid = NewOrderRequest {
        symbol: "AAPL-USD".to_string(),
        order_type: OrderType::Limit,
        side: Side::Buy,
        quantity: dec!(50),
        price: Some(dec!(149.50)),
        stop_price: None,
    };

    println!("Submitting ask order: {} @ {}", ask.quantity, ask.price.unwrap());
    engine.process_order(ask).unwrap();

    println!("Submitting bid order: {} @ {}", bid.quantity, bid.price.unwrap());
    engine.process_order(bid).unwrap();

    println!("BBO: {:?}", engine.get_bbo("AAPL-USD"));

    // Crossing bid that will execute against the ask
    let crossing_bid = NewOrderRequest {
        symbol: "AAPL-USD".to_string(),
        order_type: OrderType::Limit,
        side: Side::Buy,
        quantity: dec!(75), // Partial fill of the resting ask
        price: Some(dec!(150.00)),
        stop_price: None,
    };

    println!(
        "Submitting crossing bid: {} @ {}",
        crossing_bid.quantity,
        crossing_bid.price.unwrap()
    );
    let result = engine.process_order(crossing_bid).unwrap();

    println!("Trades executed: {}", result.trades.len());
    for trade in &result.trades {
        // Trade executes at the maker's resting price, not the taker's limit.
        println!("  Trade: {} @ {}", trade.quantity, trade.price);
    }

    println!("Final BBO: {:?}", engine.get_bbo("AAPL-USD")); // 25 left of the original ask
}
