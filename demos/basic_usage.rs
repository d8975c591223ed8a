// ============================================================================
// Basic Usage Example
// ============================================================================

use rust_decimal::Decimal;
use spot_engine::prelude::*;

fn main() {
    println!("=== Spot Engine Example ===\n");

    let config = EngineConfig::new("BTC-USDT").with_depth_limit(5);
    let (service, broadcaster) = match create_service(&config) {
        Ok(built) => built,
        Err(err) => {
            eprintln!("failed to build service: {err}");
            return;
        },
    };
    let trades = broadcaster.subscribe(Channel::Trades);

    println!("Created matching service for {}\n", service.symbol());

    // Add sell orders at different prices
    println!("Adding sell orders...");
    for i in 0u32..5 {
        let request =
            OrderRequest::limit("BTC-USDT", Side::Sell, Decimal::from(50000 + i * 100), Decimal::ONE);
        if let Err(err) = service.submit(request) {
            eprintln!("  rejected: {err}");
        }
    }

    // Add buy orders
    println!("Adding buy orders...");
    for i in 0u32..5 {
        let request =
            OrderRequest::limit("BTC-USDT", Side::Buy, Decimal::from(49900 - i * 100), Decimal::ONE);
        if let Err(err) = service.submit(request) {
            eprintln!("  rejected: {err}");
        }
    }

    // Get order book snapshot
    println!("\n=== Order Book Snapshot ===");
    let snapshot = service.snapshot();

    println!("\nBids:");
    for (price, qty) in &snapshot.bids {
        println!("  {} @ {}", qty, price);
    }

    println!("\nAsks:");
    for (price, qty) in &snapshot.asks {
        println!("  {} @ {}", qty, price);
    }

    println!("\nSpread: {:?}", snapshot.spread);
    println!("Mid Price: {:?}", snapshot.mid_price);

    // IOC that crosses the first three ask levels and cancels the rest
    println!("\n=== Submitting IOC Order ===");
    let ioc = OrderRequest::ioc("BTC-USDT", Side::Buy, Decimal::from(50200), Decimal::from(4));
    match service.submit(ioc) {
        Ok(outcome) => {
            println!("Filled {} ({:?})", outcome.filled_quantity(), outcome.disposition);
            for event in outcome.events() {
                if let OrderEvent::TradeExecuted { trade } = event {
                    println!("  Trade: {} @ {} (qty: {})", trade.id, trade.price, trade.quantity);
                }
            }
        },
        Err(err) => eprintln!("rejected: {err}"),
    }

    // FOK larger than what is left at or below its limit
    println!("\n=== Submitting FOK Order ===");
    let fok = OrderRequest::fok("BTC-USDT", Side::Buy, Decimal::from(50300), Decimal::from(5));
    if let Ok(outcome) = service.submit(fok) {
        println!("Disposition: {:?}", outcome.disposition);
    }

    // A string-typed request with an unknown order type never reaches the book
    if let Err(err) = OrderRequest::parse("BTC-USDT", "stop", "buy", Decimal::ONE, None) {
        println!("\nRejected at the boundary: {err}");
    }

    println!("\n=== Trade Feed ===");
    for message in trades.receiver.try_iter() {
        if let MarketMessage::Trade(trade) = message {
            println!("  {} {} @ {}", trade.aggressor_side, trade.quantity, trade.price);
        }
    }

    let bbo = service.bbo();
    println!("\n=== Final BBO ===");
    println!("Best bid: {:?}", bbo.best_bid);
    println!("Best ask: {:?}", bbo.best_ask);
}
