pub mod amount;
pub mod checkout;
pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod signing;
pub mod types;

// Re-export commonly used types
pub use amount::{normalize_amount, normalize_currency};
pub use checkout::{
    run_checkout, CardTokenizer, CheckoutForm, CheckoutReceipt, CheckoutSession, CheckoutState,
};
pub use client::GatewayClient;
pub use config::{GatewayConfig, PRODUCTION_BASE_URL, SANDBOX_BASE_URL};
pub use envelope::RequestEnvelope;
pub use error::{GatewayError, Result};
pub use signing::{
    compute_checksum, generate_client_request_id, generate_timestamp, MANDATORY_FIELDS,
};
pub use types::{
    BillingAddress, GatewayEnvelope, OpenOrderParams, OpenOrderResponse, PaymentParams,
    PaymentResponse, TokenizeRequest,
};

/// Initialize logging for the library
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        // Just verify that main exports are accessible
        let config = GatewayConfig::sandbox("m", "s", "k").unwrap();
        let _ = GatewayClient::new(config);
        let _ = OpenOrderParams::new("1", "usd");
        assert_eq!(MANDATORY_FIELDS.len(), 6);
    }
}
