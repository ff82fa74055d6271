//! Demo 2: Account Summary
//!
//! Showcases: signed private requests, balances, trade balance, open orders,
//! error classification
//!
//! Run: KRAKEN_API_KEY=... KRAKEN_PRIVATE_KEY=... cargo run --bin account_summary

use colored::*;
use kraken_rest::{Asset, ClientConfig, Credentials, KrakenRestClient, RestError};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    println!("{}", "═".repeat(65).cyan());
    println!("{}", "  ACCOUNT SUMMARY".cyan().bold());
    println!("{}", "  Kraken REST API - Private Endpoints".cyan());
    println!("{}", "═".repeat(65).cyan());
    println!();

    let credentials = match Credentials::from_env() {
        Ok(credentials) => credentials,
        Err(e) => {
            println!("{} {}", "✗".red(), e);
            println!("  Set KRAKEN_API_KEY and KRAKEN_PRIVATE_KEY to run this demo.");
            return Ok(());
        }
    };

    let client = KrakenRestClient::with_config(
        ClientConfig::new()
            .with_credentials(credentials)
            .with_timeout(10),
    )?;

    let balance = match client.get_balance() {
        Ok(balance) => balance,
        Err(e @ RestError::Server { .. }) => {
            println!("{} Kraken rejected the request: {}", "✗".red(), e);
            println!("  Recovery: {:?}", e.recovery_strategy());
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    println!("{} Balances", "▸".cyan());
    let mut balances: Vec<_> = balance.non_zero().into_iter().collect();
    balances.sort_by(|a, b| a.0.cmp(&b.0));
    for (asset, amount) in balances {
        println!("    {:>8}  {:>20}", asset.bold(), amount);
    }
    println!();

    let trade_balance = client.get_trade_balance(Some(&Asset::ZUSD))?;
    println!("{} Trade balance (ZUSD)", "▸".cyan());
    println!("    equivalent  {}", trade_balance.equivalent_balance);
    println!("    equity      {}", trade_balance.equity);
    println!("    free margin {}", trade_balance.free_margin);
    println!();

    let orders = client.get_open_orders()?;
    println!("{} {} open orders", "▸".cyan(), orders.open.len());
    for (txid, order) in &orders.open {
        println!(
            "    {}  {} {} {} @ {}  filled {}/{}",
            txid.dimmed(),
            order.description.side,
            order.description.order_type,
            order.description.pair,
            order.description.price,
            order.volume_executed,
            order.volume
        );
    }

    Ok(())
}
