//! Example: query the Blocktrail testnet API.
//!
//! Run with: BLOCKTRAIL_API_KEY=... cargo run --example testnet

use blocktrail_client::{BlocktrailClient, Pagination, amount, client::Result};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let api_key = std::env::var("BLOCKTRAIL_API_KEY").unwrap_or_else(|_| "MY_APIKEY".to_owned());
    let client = BlocktrailClient::testnet(api_key)?;

    println!("=== Blocktrail testnet ===\n");

    // 1. Chain tip
    println!("1. Fetching latest block...");
    let block = client.block_latest().await?;
    println!("   Height: {}", block["height"]);
    println!("   Hash: {}", block["hash"]);
    println!();

    // 2. Transactions of the tip
    println!("2. Fetching its first transactions...");
    let txs = client
        .block_transactions(block["height"].as_u64().unwrap_or_default(), Pagination::new(1, 5))
        .await?;
    if let Some(list) = txs["data"].as_array() {
        for tx in list {
            let value = tx["total_output_value"].as_i64().unwrap_or_default();
            println!("   {} -> {} BTC", tx["hash"], amount::to_btc_string(value)?);
        }
    }
    println!();

    // 3. An address that may or may not exist
    println!("3. Looking up an address...");
    let address = "mhBu1TiZoDEBRz6J5hQrS7G7x4EuL9tzcV".parse()?;
    match client.address(&address).await {
        Ok(info) => {
            let balance = info["balance"].as_i64().unwrap_or_default();
            println!("   Balance: {} BTC", amount::to_btc_string(balance)?);
        }
        Err(e) => match e.api_error() {
            Some(api) => println!("   {} ({})", api.message, api.kind),
            None => return Err(e),
        },
    }

    println!("\n=== Done! ===");
    Ok(())
}
