use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The gateway answered with a non-`SUCCESS` status.
    #[error("{reason}")]
    Rejected {
        reason: String,
        err_code: Option<i64>,
    },

    /// `SUCCESS` status, but the field the operation depends on is missing.
    #[error("{operation} succeeded but the response has no {field}")]
    IncompleteResponse {
        operation: &'static str,
        field: &'static str,
    },

    #[error("Missing mandatory field: {0}")]
    MissingField(&'static str),

    #[error("Invalid amount: {0:?}")]
    InvalidAmount(String),

    #[error("Invalid currency: {0:?}")]
    InvalidCurrency(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Card tokenization failed: {0}")]
    Tokenization(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl GatewayError {
    /// Network or HTTP layer failure, including response bodies that
    /// could not be read as a gateway envelope.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            GatewayError::Http(_) | GatewayError::HttpStatus { .. } | GatewayError::Json(_)
        )
    }

    pub fn is_rejection(&self) -> bool {
        matches!(self, GatewayError::Rejected { .. })
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_displays_reason_only() {
        let err = GatewayError::Rejected {
            reason: "Invalid merchant".to_string(),
            err_code: Some(1001),
        };
        assert_eq!(err.to_string(), "Invalid merchant");
        assert!(err.is_rejection());
        assert!(!err.is_transport());
    }

    #[test]
    fn test_transport_classification() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        assert!(GatewayError::from(json_err).is_transport());
        assert!(GatewayError::HttpStatus { status: 502, body: String::new() }.is_transport());
        assert!(!GatewayError::MissingField("amount").is_transport());
    }
}
