//! Minimal end-to-end wiring: load a JSON config, set up a tracing
//! subscriber (honoring the configured log path), and inquire one balance.
//!
//! ```sh
//! cargo run --example get_balance -- hostlink.json 0115476117
//! ```

use hostlink::{apis::banking::GetBalanceRequest, Config, HostlinkClient};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let config_path = args.next().unwrap_or_else(|| "hostlink.json".to_string());
    let account_no = args.next().unwrap_or_else(|| "0115476117".to_string());

    let config: Config = serde_json::from_str(&std::fs::read_to_string(&config_path)?)?;

    // The library only emits tracing events; the subscriber is ours to set up.
    match &config.log_path {
        Some(log_path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_path)?;
            tracing_subscriber::fmt().with_writer(Arc::new(file)).init();
        }
        None => tracing_subscriber::fmt().init(),
    }

    let client = HostlinkClient::new(config)?;

    let balance = client
        .banking
        .get_balance(&GetBalanceRequest { account_no })
        .await?;

    println!(
        "{}: {} {}",
        balance.parameters.customer_name,
        balance.parameters.account_balance,
        balance.parameters.account_currency
    );

    Ok(())
}
