//! Ordered request body sent to the gateway.
//!
//! Fields keep their insertion order on the wire. The checksum does not
//! depend on that order (see [`crate::signing::compute_checksum`]).

use crate::error::{GatewayError, Result};
use crate::signing::{compute_checksum, CHECKSUM_FIELD, MANDATORY_FIELDS};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Keys whose values never appear in logs
const REDACTED_FIELDS: &[&str] = &[CHECKSUM_FIELD, "ccTempToken", "sessionToken"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestEnvelope {
    fields: Vec<(String, Option<String>)>,
}

impl RequestEnvelope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field. An existing key keeps its position and takes the new value.
    pub fn insert(&mut self, key: &str, value: Option<impl Into<String>>) {
        let value = value.map(Into::into);
        match self.fields.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((key.to_string(), value)),
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.insert(key, Some(value));
        self
    }

    pub fn with_opt(mut self, key: &str, value: Option<impl Into<String>>) -> Self {
        self.insert(key, value);
        self
    }

    /// Present, non-empty value for `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, v)| v.as_deref())
            .filter(|v| !v.is_empty())
    }

    pub fn pairs(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fail on the first mandatory checksum field that is absent or empty.
    pub fn require_mandatory(&self) -> Result<()> {
        for name in MANDATORY_FIELDS {
            if self.get(name).is_none() {
                return Err(GatewayError::MissingField(name));
            }
        }
        Ok(())
    }

    /// Compute the checksum over the current fields and append it.
    pub fn sign(mut self, secret: &str) -> Self {
        let pairs: Vec<(&str, Option<&str>)> = self.pairs().collect();
        let checksum = compute_checksum(&pairs, secret);
        self.insert(CHECKSUM_FIELD, Some(checksum));
        self
    }

    /// Same body with secrets and tokens masked, for logging
    pub fn redacted(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        for (key, value) in self.pairs() {
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                let shown = if REDACTED_FIELDS.contains(&key) {
                    "***".to_string()
                } else {
                    value.to_string()
                };
                map.insert(key.to_string(), serde_json::Value::String(shown));
            }
        }
        serde_json::Value::Object(map)
    }
}

impl Serialize for RequestEnvelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let present: Vec<(&str, &str)> = self
            .pairs()
            .filter_map(|(k, v)| v.filter(|v| !v.is_empty()).map(|v| (k, v)))
            .collect();

        let mut map = serializer.serialize_map(Some(present.len()))?;
        for (key, value) in present {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RequestEnvelope {
        RequestEnvelope::new()
            .with("merchantId", "m1")
            .with("merchantSiteId", "s1")
            .with("clientRequestId", "ABC123XYZ")
            .with("amount", "10.00")
            .with("currency", "USD")
            .with("timeStamp", "20240101120000")
    }

    #[test]
    fn test_serializes_in_insertion_order_skipping_absent() {
        let envelope = RequestEnvelope::new()
            .with("merchantId", "m1")
            .with_opt("userTokenId", None::<String>)
            .with("currency", "EUR")
            .with("email", "");

        let json = serde_json::to_string(&envelope).unwrap();
        assert_eq!(json, r#"{"merchantId":"m1","currency":"EUR"}"#);
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut envelope = sample();
        envelope.insert("merchantId", Some("m2"));
        assert_eq!(envelope.len(), 6);
        assert_eq!(envelope.pairs().next(), Some(("merchantId", Some("m2"))));
    }

    #[test]
    fn test_require_mandatory_reports_first_missing() {
        assert!(sample().require_mandatory().is_ok());

        let mut envelope = sample();
        envelope.insert("currency", Some(""));
        envelope.insert("timeStamp", None::<String>);
        assert!(matches!(
            envelope.require_mandatory(),
            Err(GatewayError::MissingField("currency"))
        ));
    }

    #[test]
    fn test_sign_appends_checksum_last() {
        let signed = sample().with("ccTempToken", "tok").sign("secret");
        let (last_key, last_value) = signed.pairs().last().unwrap();
        assert_eq!(last_key, CHECKSUM_FIELD);
        assert_eq!(last_value.unwrap().len(), 64);

        let redacted = signed.redacted();
        assert_eq!(redacted["checksum"], "***");
        assert_eq!(redacted["ccTempToken"], "***");
        assert_eq!(redacted["amount"], "10.00");
    }

    #[test]
    fn test_resigning_ignores_previous_checksum() {
        let once = sample().sign("secret");
        let twice = once.clone().sign("secret");
        assert_eq!(once, twice);
    }
}
