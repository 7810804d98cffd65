//! Helpers for the gateway's quirks: bare 10-digit phone numbers, deduplicated purpose strings, and the
//! webhook MAC scheme.

use std::collections::HashMap;

use chrono::Utc;
use hmac::{Hmac, Mac};
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;

/// The field carrying the signature in webhook payloads. It is excluded from the signed message.
pub const MAC_FIELD: &str = "mac";

/// Reduce a buyer-supplied phone number to the bare 10 digits the gateway accepts: no `+91`, no trunk zero,
/// no whitespace or punctuation. Keeps the last 10 digits, which covers all the common prefixes at once.
pub fn normalize_phone(raw: &str) -> String {
    let digits = raw.chars().filter(char::is_ascii_digit).collect::<String>();
    match digits.char_indices().nth_back(9) {
        Some((i, _)) => digits[i..].to_string(),
        None => digits,
    }
}

/// Build the purpose string for a payment request. The gateway deduplicates payment requests on purpose text,
/// so a microsecond timestamp is embedded to make every request distinct, even for retries of the same order.
pub fn purpose_for_order(order_id: i64, product_name: &str) -> String {
    let token = Utc::now().timestamp_micros();
    format!("Order #{order_id} - {product_name} [{token}]")
}

/// Calculate the hex MAC over a webhook payload: the values of all fields except `mac`, sorted by key,
/// joined with `|`, signed with HMAC-SHA1 under the gateway auth token.
pub fn calculate_webhook_mac(auth_token: &str, fields: &HashMap<String, String>) -> Option<String> {
    let mut mac = HmacSha1::new_from_slice(auth_token.as_bytes()).ok()?;
    mac.update(signed_message(fields).as_bytes());
    Some(hex::encode(mac.finalize().into_bytes()))
}

/// Verify the `mac` signature of a webhook payload. The comparison is constant-time ([`Mac::verify_slice`]).
pub fn verify_webhook_mac(auth_token: &str, fields: &HashMap<String, String>, provided_mac: &str) -> bool {
    let Ok(mut mac) = HmacSha1::new_from_slice(auth_token.as_bytes()) else {
        return false;
    };
    mac.update(signed_message(fields).as_bytes());
    match hex::decode(provided_mac) {
        Ok(bytes) => mac.verify_slice(&bytes).is_ok(),
        Err(_) => false,
    }
}

fn signed_message(fields: &HashMap<String, String>) -> String {
    let mut keys = fields.keys().filter(|k| k.as_str() != MAC_FIELD).collect::<Vec<_>>();
    keys.sort();
    keys.iter().map(|k| fields[*k].as_str()).collect::<Vec<_>>().join("|")
}
