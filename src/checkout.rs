//! Checkout sequence driven by the payment screen
//!
//! 1. Validates the form and normalizes amount/currency
//! 2. Opens an order to obtain a session token
//! 3. Hands the session to the card-capture widget for a card token
//! 4. Submits the payment with that token and the billing details
//!
//! The widget itself lives outside this crate; [`CardTokenizer`] is the
//! seam it plugs into.

use crate::amount::{normalize_amount, normalize_currency};
use crate::client::GatewayClient;
use crate::error::{GatewayError, Result};
use crate::types::{BillingAddress, OpenOrderParams, PaymentParams, TokenizeRequest};
use std::future::Future;
use tracing::{info, warn};

/// External card tokenization capability
pub trait CardTokenizer {
    /// Exchange the card details held by the widget for an opaque token
    fn tokenize(&self, request: &TokenizeRequest) -> impl Future<Output = Result<String>> + Send;
}

/// What the user entered on the payment screen
#[derive(Debug, Clone, Default)]
pub struct CheckoutForm {
    pub amount: String,
    pub currency: String,
    pub card_holder_name: String,
    pub email: String,
    /// Defaults to `order-<unix millis>`
    pub client_unique_id: Option<String>,
}

impl CheckoutForm {
    pub fn validate(&self) -> Result<()> {
        if self.card_holder_name.trim().is_empty() {
            return Err(GatewayError::Validation(
                "Please enter card holder name".to_string(),
            ));
        }
        if self.email.trim().is_empty() {
            return Err(GatewayError::Validation("Please enter your email".to_string()));
        }
        Ok(())
    }
}

/// Completed payment, as shown on the confirmation screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutReceipt {
    pub transaction_id: String,
    pub transaction_status: Option<String>,
    pub amount: String,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutState {
    Form,
    Success(CheckoutReceipt),
    Error { message: String },
}

/// Run the whole open order -> tokenize -> pay sequence once.
pub async fn run_checkout<T: CardTokenizer>(
    client: &GatewayClient,
    tokenizer: &T,
    form: &CheckoutForm,
) -> Result<CheckoutReceipt> {
    form.validate()?;

    let amount = normalize_amount(&form.amount)?;
    let currency = normalize_currency(&form.currency)?;
    info!("Starting checkout for {} {}", amount, currency);

    let client_unique_id = form
        .client_unique_id
        .clone()
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| format!("order-{}", chrono::Utc::now().timestamp_millis()));

    let order = client
        .open_order(&OpenOrderParams {
            amount: amount.clone(),
            currency: currency.clone(),
            client_unique_id: Some(client_unique_id),
            user_token_id: None,
        })
        .await?;

    let tokenize_request = TokenizeRequest::from_open_order(&order, &amount, &currency);
    let card_token = tokenizer.tokenize(&tokenize_request).await?;
    if card_token.trim().is_empty() {
        return Err(GatewayError::Tokenization("Failed to get card token".to_string()));
    }
    info!("Received card token");

    let payment = client
        .initiate_payment(
            &card_token,
            &PaymentParams {
                amount: amount.clone(),
                currency: currency.clone(),
                billing_address: Some(BillingAddress::from_card_holder(
                    &form.card_holder_name,
                    &form.email,
                )),
                ..Default::default()
            },
        )
        .await?;

    if !payment.is_approved() {
        warn!(
            "Transaction {} returned status {}",
            payment.transaction_id,
            payment.transaction_status.as_deref().unwrap_or("N/A")
        );
    }

    Ok(CheckoutReceipt {
        transaction_id: payment.transaction_id,
        transaction_status: payment.transaction_status,
        amount,
        currency,
    })
}

/// Payment screen state: `Form -> Success | Error`, and `Error -> Form` on retry
pub struct CheckoutSession<T> {
    client: GatewayClient,
    tokenizer: T,
    state: CheckoutState,
}

impl<T: CardTokenizer> CheckoutSession<T> {
    pub fn new(client: GatewayClient, tokenizer: T) -> Self {
        Self {
            client,
            tokenizer,
            state: CheckoutState::Form,
        }
    }

    pub fn state(&self) -> &CheckoutState {
        &self.state
    }

    /// Submit the form. Only valid while in `Form`; a form that fails
    /// validation leaves the state unchanged.
    pub async fn submit(&mut self, form: &CheckoutForm) -> Result<&CheckoutState> {
        if self.state != CheckoutState::Form {
            return Err(GatewayError::Validation(
                "Checkout is not awaiting payment details".to_string(),
            ));
        }
        form.validate()?;

        self.state = match run_checkout(&self.client, &self.tokenizer, form).await {
            Ok(receipt) => {
                info!("Checkout succeeded - Transaction ID: {}", receipt.transaction_id);
                CheckoutState::Success(receipt)
            }
            Err(e) => {
                warn!("Checkout failed: {}", e);
                CheckoutState::Error {
                    message: e.to_string(),
                }
            }
        };
        Ok(&self.state)
    }

    /// Go back to the form after a failure. Returns false in any other state.
    pub fn retry(&mut self) -> bool {
        if matches!(self.state, CheckoutState::Error { .. }) {
            self.state = CheckoutState::Form;
            true
        } else {
            false
        }
    }
}
