use crate::error::{GatewayError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Status value the gateway uses for an accepted request
pub const STATUS_SUCCESS: &str = "SUCCESS";

/// Parameters for `openOrder.do`
#[derive(Debug, Clone, Default)]
pub struct OpenOrderParams {
    pub amount: String,
    pub currency: String,
    /// Merchant-side order reference; defaults to the client request id
    pub client_unique_id: Option<String>,
    pub user_token_id: Option<String>,
}

impl OpenOrderParams {
    pub fn new(amount: impl Into<String>, currency: impl Into<String>) -> Self {
        Self {
            amount: amount.into(),
            currency: currency.into(),
            ..Default::default()
        }
    }
}

/// Parameters for `payment.do`
#[derive(Debug, Clone, Default)]
pub struct PaymentParams {
    pub amount: String,
    pub currency: String,
    pub client_unique_id: Option<String>,
    pub user_token_id: Option<String>,
    pub billing_address: Option<BillingAddress>,
}

impl PaymentParams {
    pub fn new(amount: impl Into<String>, currency: impl Into<String>) -> Self {
        Self {
            amount: amount.into(),
            currency: currency.into(),
            ..Default::default()
        }
    }
}

/// Billing details, sent as flat top-level request fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingAddress {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub zip: Option<String>,
    pub state: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl BillingAddress {
    /// Split a card holder name: first word is the first name, the rest the last name.
    pub fn from_card_holder(name: &str, email: &str) -> Self {
        let mut words = name.split_whitespace();
        let first_name = words.next().map(str::to_string);
        let last_name = words.collect::<Vec<_>>().join(" ");

        Self {
            first_name,
            last_name: Some(last_name).filter(|s| !s.is_empty()),
            email: Some(email.trim().to_string()).filter(|s| !s.is_empty()),
            ..Default::default()
        }
    }

    /// Non-empty fields as `(wire key, value)` in a fixed order
    pub fn fields(&self) -> Vec<(&'static str, &str)> {
        [
            ("firstName", &self.first_name),
            ("lastName", &self.last_name),
            ("address", &self.address),
            ("city", &self.city),
            ("country", &self.country),
            ("zip", &self.zip),
            ("state", &self.state),
            ("phone", &self.phone),
            ("email", &self.email),
        ]
        .into_iter()
        .filter_map(|(key, value)| {
            value
                .as_deref()
                .filter(|v| !v.is_empty())
                .map(|v| (key, v))
        })
        .collect()
    }
}

/// Response envelope shared by every gateway operation
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayEnvelope {
    /// Kept as raw JSON: a missing, null or non-string status is a rejection
    #[serde(default)]
    pub status: Option<Value>,
    #[serde(default)]
    pub reason: Option<Value>,
    #[serde(default)]
    pub err_code: Option<Value>,
    #[serde(flatten)]
    pub body: Map<String, Value>,
}

impl GatewayEnvelope {
    pub fn is_success(&self) -> bool {
        self.status() == Some(STATUS_SUCCESS)
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_ref()?.as_str()
    }

    /// Gateway-provided reason, if it is a non-blank string
    pub fn reason(&self) -> Option<&str> {
        self.reason
            .as_ref()?
            .as_str()
            .filter(|r| !r.trim().is_empty())
    }

    /// Numeric error code; the gateway sends it as a number or a string
    pub fn err_code(&self) -> Option<i64> {
        match self.err_code.as_ref()? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Turn a non-success envelope into a rejection, using `fallback`
    /// when the gateway gives no reason.
    pub fn into_success(self, fallback: &str) -> Result<Self> {
        if self.is_success() {
            return Ok(self);
        }

        let err_code = self.err_code();
        let reason = self.reason().unwrap_or(fallback).to_string();
        Err(GatewayError::Rejected { reason, err_code })
    }

    /// Full response as JSON, including `status` and `reason`
    pub fn to_value(&self) -> Value {
        let mut map = self.body.clone();
        if let Some(status) = &self.status {
            map.insert("status".to_string(), status.clone());
        }
        if let Some(reason) = &self.reason {
            map.insert("reason".to_string(), reason.clone());
        }
        if let Some(err_code) = &self.err_code {
            map.insert("errCode".to_string(), err_code.clone());
        }
        Value::Object(map)
    }

    fn string_field(&self, key: &str) -> Option<String> {
        match self.body.get(key)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// Successful `openOrder.do` result
#[derive(Debug, Clone)]
pub struct OpenOrderResponse {
    pub session_token: String,
    pub order_id: Option<String>,
    pub merchant_id: Option<String>,
    pub merchant_site_id: Option<String>,
    pub client_request_id: Option<String>,
    pub internal_request_id: Option<String>,
    pub user_token_id: Option<String>,
    /// Full response body
    pub raw: Value,
}

impl TryFrom<GatewayEnvelope> for OpenOrderResponse {
    type Error = GatewayError;

    fn try_from(envelope: GatewayEnvelope) -> Result<Self> {
        let session_token =
            envelope
                .string_field("sessionToken")
                .ok_or(GatewayError::IncompleteResponse {
                    operation: "openOrder",
                    field: "sessionToken",
                })?;

        Ok(Self {
            session_token,
            order_id: envelope.string_field("orderId"),
            merchant_id: envelope.string_field("merchantId"),
            merchant_site_id: envelope.string_field("merchantSiteId"),
            client_request_id: envelope.string_field("clientRequestId"),
            internal_request_id: envelope.string_field("internalRequestId"),
            user_token_id: envelope.string_field("userTokenId"),
            raw: envelope.to_value(),
        })
    }
}

/// Successful `payment.do` result
#[derive(Debug, Clone)]
pub struct PaymentResponse {
    pub transaction_id: String,
    /// `APPROVED`, `DECLINED`, `ERROR`, ...
    pub transaction_status: Option<String>,
    pub order_id: Option<String>,
    pub auth_code: Option<String>,
    pub gw_error_reason: Option<String>,
    pub client_request_id: Option<String>,
    pub raw: Value,
}

impl PaymentResponse {
    pub fn is_approved(&self) -> bool {
        self.transaction_status
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case("APPROVED"))
    }
}

impl TryFrom<GatewayEnvelope> for PaymentResponse {
    type Error = GatewayError;

    fn try_from(envelope: GatewayEnvelope) -> Result<Self> {
        let transaction_id =
            envelope
                .string_field("transactionId")
                .ok_or(GatewayError::IncompleteResponse {
                    operation: "payment",
                    field: "transactionId",
                })?;

        Ok(Self {
            transaction_id,
            transaction_status: envelope.string_field("transactionStatus"),
            order_id: envelope.string_field("orderId"),
            auth_code: envelope.string_field("authCode"),
            gw_error_reason: envelope.string_field("gwErrorReason"),
            client_request_id: envelope.string_field("clientRequestId"),
            raw: envelope.to_value(),
        })
    }
}

/// Input handed to the card-capture widget after an order is opened
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenizeRequest {
    pub session_token: String,
    pub merchant_id: Option<String>,
    pub merchant_site_id: Option<String>,
    pub client_request_id: Option<String>,
    pub amount: String,
    pub currency: String,
}

impl TokenizeRequest {
    pub fn from_open_order(order: &OpenOrderResponse, amount: &str, currency: &str) -> Self {
        Self {
            session_token: order.session_token.clone(),
            merchant_id: order.merchant_id.clone(),
            merchant_site_id: order.merchant_site_id.clone(),
            client_request_id: order.client_request_id.clone(),
            amount: amount.to_string(),
            currency: currency.to_string(),
        }
    }
}
