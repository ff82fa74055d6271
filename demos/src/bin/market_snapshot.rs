//! Demo 1: Market Snapshot
//!
//! Showcases: public endpoints, per-pair ticker decoding, order book depth,
//! OHLC pagination cursor
//!
//! Run: cargo run --bin market_snapshot [PAIR...]

use colored::*;
use kraken_rest::{AssetPair, KrakenRestClient};
use kraken_types::OhlcInterval;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let mut pairs: Vec<AssetPair> = std::env::args()
        .skip(1)
        .map(|arg| arg.parse())
        .collect::<Result<_, _>>()?;
    if pairs.is_empty() {
        pairs = vec![AssetPair::XBTUSD, AssetPair::ETHUSD];
    }

    println!("{}", "═".repeat(65).cyan());
    println!("{}", "  MARKET SNAPSHOT".cyan().bold());
    println!("{}", "  Kraken REST API - Public Endpoints".cyan());
    println!("{}", "═".repeat(65).cyan());
    println!();

    let client = KrakenRestClient::new()?;

    let status = client.get_system_status()?;
    let time = client.get_server_time()?;
    println!(
        "{} Exchange {} at {}",
        "✓".green(),
        status.status.to_string().bold(),
        time.rfc1123
    );
    println!();

    println!(
        "  {:>12}  {:>14}  {:>14}  {:>14}  {:>10}",
        "PAIR".white().bold(),
        "BID".white().bold(),
        "ASK".white().bold(),
        "LAST".white().bold(),
        "SPREAD".white().bold()
    );
    println!("  {}", "─".repeat(72));

    let mut tickers: Vec<_> = client.get_ticker(&pairs)?.into_iter().collect();
    tickers.sort_by(|a, b| a.0.cmp(&b.0));

    for (pair, ticker) in &tickers {
        match ticker {
            Ok(ticker) => println!(
                "  {:>12}  {:>14}  {:>14}  {:>14}  {:>10}",
                pair,
                ticker.bid.price.to_string().green(),
                ticker.ask.price.to_string().red(),
                ticker.last_trade.price,
                ticker
                    .spread_bps()
                    .map(|bps| format!("{:.1} bps", bps))
                    .unwrap_or_else(|| "-".to_string())
            ),
            Err(e) => println!("  {:>12}  {}", pair, format!("decode failed: {}", e).yellow()),
        }
    }
    println!();

    let Some(pair) = pairs.first() else {
        return Ok(());
    };

    println!("{} Top of book for {}", "▸".cyan(), pair.to_string().bold());
    for (name, book) in client.get_order_book(pair, Some(5))? {
        println!("  {}", name.dimmed());
        for (bid, ask) in book.bids.iter().zip(book.asks.iter()) {
            println!(
                "    {:>14} {:>12}   {:>14} {:>12}",
                bid.price.to_string().green(),
                bid.volume,
                ask.price.to_string().red(),
                ask.volume
            );
        }
        if let Some(spread) = book.spread() {
            println!("    spread {}", spread);
        }
    }
    println!();

    let series = client.get_ohlc(pair, Some(OhlcInterval::H1), None)?;
    println!(
        "{} {} hourly candles, next page since {}",
        "▸".cyan(),
        series.rows().count(),
        series.last
    );
    for (name, candles) in &series.data {
        for candle in candles.iter().rev().take(3) {
            println!(
                "    {} {}  O {}  H {}  L {}  C {}  V {}",
                name.dimmed(),
                candle.time.format("%Y-%m-%d %H:%M"),
                candle.open,
                candle.high,
                candle.low,
                candle.close,
                candle.volume
            );
        }
    }

    Ok(())
}
