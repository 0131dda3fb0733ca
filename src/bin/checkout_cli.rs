//! Checkout CLI
//!
//! Drives the gateway calls by hand against the configured environment.
//!
//! Usage:
//!   cargo run --bin checkout_cli -- open-order <amount> <currency> [client_unique_id]
//!   cargo run --bin checkout_cli -- payment <card_token> <amount> <currency> [card_holder] [email]
//!   cargo run --bin checkout_cli -- checksum key=value [key=value ...]
//!
//! Credentials come from `NUVEI_MERCHANT_ID`, `NUVEI_MERCHANT_SITE_ID`,
//! `NUVEI_SECRET_KEY` and `NUVEI_ENV`/`NUVEI_BASE_URL` (a `.env` file works).
//! `checksum` only needs `NUVEI_SECRET_KEY`.

use anyhow::{bail, Context, Result};
use nuvei_checkout::{
    compute_checksum, init_logging, BillingAddress, GatewayClient, GatewayConfig,
    OpenOrderParams, PaymentParams,
};
use std::env;

fn usage() -> &'static str {
    "usage:\n  \
     checkout_cli open-order <amount> <currency> [client_unique_id]\n  \
     checkout_cli payment <card_token> <amount> <currency> [card_holder] [email]\n  \
     checkout_cli checksum key=value [key=value ...]"
}

/// Full merchant configuration, needed by the commands that call the gateway
fn load_config() -> Result<GatewayConfig> {
    let config = GatewayConfig::from_env().context("Failed to load gateway configuration")?;
    println!("Gateway: {}", config.base_url());
    println!("Merchant: {} / site {}\n", config.merchant_id, config.merchant_site_id);
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let args: Vec<String> = env::args().skip(1).collect();
    let Some(command) = args.first() else {
        bail!(usage());
    };

    match (command.as_str(), &args[1..]) {
        ("open-order", [amount, currency, rest @ ..]) => {
            let client = GatewayClient::new(load_config()?)?;
            let mut params = OpenOrderParams::new(amount.as_str(), currency.as_str());
            params.client_unique_id = rest.first().cloned();

            let order = client.open_order(&params).await?;
            println!("Session token:     {}", order.session_token);
            println!("Order ID:          {}", order.order_id.as_deref().unwrap_or("N/A"));
            println!(
                "Client request ID: {}",
                order.client_request_id.as_deref().unwrap_or("N/A")
            );
        }
        ("payment", [card_token, amount, currency, rest @ ..]) => {
            let client = GatewayClient::new(load_config()?)?;
            let mut params = PaymentParams::new(amount.as_str(), currency.as_str());
            if let Some(card_holder) = rest.first() {
                let email = rest.get(1).map(String::as_str).unwrap_or_default();
                params.billing_address = Some(BillingAddress::from_card_holder(card_holder, email));
            }

            let payment = client.initiate_payment(card_token, &params).await?;
            println!("Transaction ID:     {}", payment.transaction_id);
            println!(
                "Transaction status: {}",
                payment.transaction_status.as_deref().unwrap_or("N/A")
            );
            if let Some(reason) = &payment.gw_error_reason {
                println!("Gateway reason:     {}", reason);
            }
        }
        ("checksum", pairs) if !pairs.is_empty() => {
            let mut fields = Vec::with_capacity(pairs.len());
            for pair in pairs {
                let (key, value) = pair
                    .split_once('=')
                    .with_context(|| format!("expected key=value, got {:?}", pair))?;
                fields.push((key, Some(value)));
            }
            let secret = GatewayConfig::secret_key_from_env()
                .context("Failed to load NUVEI_SECRET_KEY")?;
            println!("{}", compute_checksum(&fields, &secret));
        }
        _ => bail!(usage()),
    }

    Ok(())
}
