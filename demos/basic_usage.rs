// ============================================================================
// Basic Usage Example
// ============================================================================

use chrono::{DateTime, Duration};
use order_book_engine::prelude::*;

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("=== Order Book Example ===\n");

    let mut now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
    let market = MarketId::new("BTC-USD");
    let publisher = LoggingEventHandler;

    let mut book = OrderBookBuilder::new(market.clone())
        .with_tick_size(rust_decimal::Decimal::new(1, 2))
        .build()
        .unwrap();

    println!("Created order book for {}\n", book.market_id());

    // Add sell orders at different prices
    println!("Adding sell orders...");
    for i in 0u64..5 {
        let sell = Order::limit(
            OrderId::new(),
            market.clone(),
            PartyId::new(format!("seller_{i}")),
            Side::Sell,
            Price::new(5_000_000 + i * 100),
            Quantity::new(1),
            TimeInForce::GoodTillCancel,
        );
        let confirmation = book.submit_order(sell, now).unwrap();
        publisher.on_events(confirmation.events());
    }

    // Add buy orders, the last two expiring after a minute
    println!("Adding buy orders...");
    for i in 0u64..5 {
        let tif = if i >= 3 {
            TimeInForce::GoodTillTime(now + Duration::minutes(1))
        } else {
            TimeInForce::GoodTillCancel
        };
        let buy = Order::limit(
            OrderId::new(),
            market.clone(),
            PartyId::new(format!("buyer_{i}")),
            Side::Buy,
            Price::new(4_999_900 - i * 100),
            Quantity::new(1),
            tif,
        );
        let confirmation = book.submit_order(buy, now).unwrap();
        publisher.on_events(confirmation.events());
    }

    print_snapshot(&book);

    // Submit an IOC buy that crosses the first two ask levels
    println!("\n=== Submitting IOC Order ===");
    now += Duration::seconds(1);
    let taker = Order::limit(
        OrderId::new(),
        market.clone(),
        PartyId::new("taker"),
        Side::Buy,
        Price::new(5_000_100),
        Quantity::new(3),
        TimeInForce::ImmediateOrCancel,
    );
    let confirmation = book.submit_order(taker, now).unwrap();

    println!("\nTrades:");
    for trade in &confirmation.trades {
        println!(
            "  #{}: {} @ {} (seller {})",
            trade.sequence,
            trade.size,
            book.display_price(trade.price).unwrap(),
            trade.seller_party_id
        );
    }
    println!("Taker finished as {:?}", confirmation.order.status);
    publisher.on_events(confirmation.events());

    // Expire the good-till-time bids
    println!("\n=== Advancing Logical Time ===");
    now += Duration::minutes(2);
    let expired = book.expire_orders(now).unwrap();
    for order in &expired {
        println!("  Expired {} ({} left)", order.id, order.remaining);
    }

    print_snapshot(&book);
    book.check_invariants().unwrap();
}

fn print_snapshot(book: &OrderBook) {
    println!("\n=== Order Book Snapshot ===");
    let snapshot = book.snapshot(5);

    println!("\nBids:");
    for (price, qty) in &snapshot.bids {
        println!("  {} @ {}", qty, book.display_price(*price).unwrap());
    }

    println!("\nAsks:");
    for (price, qty) in &snapshot.asks {
        println!("  {} @ {}", qty, book.display_price(*price).unwrap());
    }

    println!("\nSpread: {:?} ticks", snapshot.spread);
    println!("Mid Price: {:?}", snapshot.mid_price);
}
