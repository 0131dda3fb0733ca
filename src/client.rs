use crate::amount::{normalize_amount, normalize_currency};
use crate::config::GatewayConfig;
use crate::envelope::RequestEnvelope;
use crate::error::{GatewayError, Result};
use crate::signing::{generate_client_request_id, generate_timestamp};
use crate::types::{
    GatewayEnvelope, OpenOrderParams, OpenOrderResponse, PaymentParams, PaymentResponse,
};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error, info};

const OPEN_ORDER_ENDPOINT: &str = "openOrder.do";
const PAYMENT_ENDPOINT: &str = "payment.do";

/// Client for the Nuvei REST API
///
/// Every call builds a fresh envelope with a new client request id and
/// timestamp, signs it once and posts it once. Nothing is retried.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    client: Client,
    config: GatewayConfig,
}

impl GatewayClient {
    pub fn new(config: GatewayConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("nuvei-checkout/0.1.0")
            .build()?;

        Ok(Self { client, config })
    }

    /// Create a client from `NUVEI_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(GatewayConfig::from_env()?)
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Open an order and obtain a session token for card tokenization
    pub async fn open_order(&self, params: &OpenOrderParams) -> Result<OpenOrderResponse> {
        let envelope = self.open_order_envelope(params)?;
        info!(
            "Opening order for {} {}",
            envelope.get("amount").unwrap_or_default(),
            envelope.get("currency").unwrap_or_default()
        );

        let response = self
            .post_signed(OPEN_ORDER_ENDPOINT, envelope)
            .await?
            .into_success("Failed to get session token")
            .inspect_err(|e| error!("Open order rejected: {}", e))?;

        let order = OpenOrderResponse::try_from(response)?;
        info!(
            "Order opened - Order ID: {}, Client request ID: {}",
            order.order_id.as_deref().unwrap_or("N/A"),
            order.client_request_id.as_deref().unwrap_or("N/A")
        );
        Ok(order)
    }

    /// Submit a payment with a card token produced by the card-capture widget
    pub async fn initiate_payment(
        &self,
        card_token: &str,
        params: &PaymentParams,
    ) -> Result<PaymentResponse> {
        if card_token.trim().is_empty() {
            return Err(GatewayError::MissingField("ccTempToken"));
        }

        let envelope = self.payment_envelope(card_token, params)?;
        info!(
            "Initiating payment for {} {}",
            envelope.get("amount").unwrap_or_default(),
            envelope.get("currency").unwrap_or_default()
        );

        let response = self
            .post_signed(PAYMENT_ENDPOINT, envelope)
            .await?
            .into_success("Payment failed")
            .inspect_err(|e| error!("Payment rejected: {}", e))?;

        let payment = PaymentResponse::try_from(response)?;
        info!(
            "Payment processed - Transaction ID: {}, Status: {}",
            payment.transaction_id,
            payment.transaction_status.as_deref().unwrap_or("N/A")
        );
        Ok(payment)
    }

    /// Mandatory fields in checksum order, plus the generated client request id
    fn base_envelope(&self, amount: &str, currency: &str) -> Result<(RequestEnvelope, String)> {
        let amount = normalize_amount(amount)?;
        let currency = normalize_currency(currency)?;
        let client_request_id = generate_client_request_id();
        let timestamp = generate_timestamp();

        let envelope = RequestEnvelope::new()
            .with("merchantId", self.config.merchant_id.as_str())
            .with("merchantSiteId", self.config.merchant_site_id.as_str())
            .with("clientRequestId", client_request_id.as_str())
            .with("amount", amount)
            .with("currency", currency)
            .with("timeStamp", timestamp);

        Ok((envelope, client_request_id))
    }

    fn open_order_envelope(&self, params: &OpenOrderParams) -> Result<RequestEnvelope> {
        let (envelope, client_request_id) =
            self.base_envelope(&params.amount, &params.currency)?;

        let client_unique_id = non_empty(params.client_unique_id.as_deref())
            .unwrap_or(client_request_id.as_str())
            .to_string();

        Ok(envelope
            .with("clientUniqueId", client_unique_id)
            .with_opt("userTokenId", non_empty(params.user_token_id.as_deref())))
    }

    fn payment_envelope(&self, card_token: &str, params: &PaymentParams) -> Result<RequestEnvelope> {
        let (envelope, client_request_id) =
            self.base_envelope(&params.amount, &params.currency)?;

        let client_unique_id = non_empty(params.client_unique_id.as_deref())
            .unwrap_or(client_request_id.as_str())
            .to_string();

        let mut envelope = envelope
            .with("ccTempToken", card_token)
            .with("clientUniqueId", client_unique_id)
            .with_opt("userTokenId", non_empty(params.user_token_id.as_deref()));

        if let Some(billing) = &params.billing_address {
            for (key, value) in billing.fields() {
                envelope.insert(key, Some(value));
            }
        }

        Ok(envelope)
    }

    /// Sign `envelope`, POST it and parse the response envelope
    async fn post_signed(&self, endpoint: &str, envelope: RequestEnvelope) -> Result<GatewayEnvelope> {
        envelope.require_mandatory()?;
        let envelope = envelope.sign(self.config.secret_key());

        let url = self.config.endpoint(endpoint);
        debug!("POST {} - {}", url, envelope.redacted());

        let response = self
            .client
            .post(&url)
            .header("Accept", "application/json")
            .header("Content-Type", "application/json")
            .json(&envelope)
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;
        debug!("{} response status: {}", endpoint, status);

        match serde_json::from_str::<GatewayEnvelope>(&response_text) {
            // An error status never counts as success, whatever the body says
            Ok(parsed) if !status.is_success() && parsed.is_success() => {
                error!("{} returned SUCCESS with HTTP {}", endpoint, status);
                Err(GatewayError::HttpStatus {
                    status: status.as_u16(),
                    body: response_text,
                })
            }
            Ok(parsed) => {
                debug!(
                    "{} response gateway status: {}",
                    endpoint,
                    parsed.status().unwrap_or("<none>")
                );
                Ok(parsed)
            }
            Err(_) if !status.is_success() => {
                error!("{} failed: {} - {}", endpoint, status, response_text);
                Err(GatewayError::HttpStatus {
                    status: status.as_u16(),
                    body: response_text,
                })
            }
            Err(e) => {
                error!("Failed to parse {} response: {}", endpoint, e);
                Err(GatewayError::Json(e))
            }
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
