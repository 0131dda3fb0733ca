use chrono::{DateTime, Utc};
use rand::Rng;
use sha2::{Digest, Sha256};

/// Fields covered by the checksum, in the order they are concatenated
pub const MANDATORY_FIELDS: [&str; 6] = [
    "merchantId",
    "merchantSiteId",
    "clientRequestId",
    "amount",
    "currency",
    "timeStamp",
];

pub const CHECKSUM_FIELD: &str = "checksum";

const CLIENT_REQUEST_ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const CLIENT_REQUEST_ID_LEN: usize = 9;

/// Current UTC time as `YYYYMMDDHHMMSS`
pub fn generate_timestamp() -> String {
    format_timestamp(&Utc::now())
}

pub fn format_timestamp(instant: &DateTime<Utc>) -> String {
    instant.format("%Y%m%d%H%M%S").to_string()
}

/// 9 random characters from `[A-Z0-9]`.
///
/// Only a correlation token; not cryptographically random and collisions
/// are left to the gateway.
pub fn generate_client_request_id() -> String {
    client_request_id_from(&mut rand::thread_rng())
}

pub fn client_request_id_from<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..CLIENT_REQUEST_ID_LEN)
        .map(|_| {
            let idx = rng.gen_range(0..CLIENT_REQUEST_ID_ALPHABET.len());
            CLIENT_REQUEST_ID_ALPHABET[idx] as char
        })
        .collect()
}

/// Compute the request checksum.
///
/// Concatenates the values of [`MANDATORY_FIELDS`] that are present, in
/// that fixed order regardless of the order of `fields`, appends `secret`
/// and returns the lowercase hex SHA-256 of the result.
///
/// Keys equal to `checksum` (any case) and absent or empty values are
/// ignored. Missing mandatory fields are skipped without placeholders.
pub fn compute_checksum(fields: &[(&str, Option<&str>)], secret: &str) -> String {
    let mut clear_text = String::new();

    for name in MANDATORY_FIELDS {
        let value = fields
            .iter()
            .filter(|(key, _)| !key.eq_ignore_ascii_case(CHECKSUM_FIELD))
            .find(|(key, _)| *key == name)
            .and_then(|(_, value)| *value)
            .filter(|value| !value.is_empty());

        if let Some(value) = value {
            clear_text.push_str(value);
        }
    }
    clear_text.push_str(secret);

    hex::encode(Sha256::digest(clear_text.as_bytes()))
}
