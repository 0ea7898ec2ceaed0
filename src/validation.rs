//! Recipient validation for inbound claim requests
//!
//! Runs before anything touches the chain, so garbage input never costs gas
//! and never surfaces provider errors to the caller.
//!
//! Accepted body: a JSON object with the recipient under `wallet`. The older
//! `address` field name is accepted as an alias; `wallet` wins when both are
//! present.
use std::str::FromStr;

use alloy::primitives::Address;

use crate::domain::ClaimRequest;
use crate::error::ValidationError;

/// Canonical request field holding the recipient
pub const RECIPIENT_FIELD: &str = "wallet";

/// Alias accepted for deployments whose frontend posts `address`
pub const RECIPIENT_FIELD_ALIAS: &str = "address";

/// Parse a raw request body into a validated claim request
pub fn parse_claim_request(body: &[u8]) -> Result<ClaimRequest, ValidationError> {
    let payload: serde_json::Value =
        serde_json::from_slice(body).map_err(|_| ValidationError::MissingField)?;
    let candidate = extract_recipient(&payload)?;
    let recipient = validate_address(candidate)?;
    Ok(ClaimRequest { recipient })
}

/// Pull the recipient string out of an untyped payload
pub fn extract_recipient(payload: &serde_json::Value) -> Result<&str, ValidationError> {
    let object = payload.as_object().ok_or(ValidationError::MissingField)?;

    let value = object
        .get(RECIPIENT_FIELD)
        .filter(|v| !v.is_null())
        .or_else(|| object.get(RECIPIENT_FIELD_ALIAS).filter(|v| !v.is_null()))
        .ok_or(ValidationError::MissingField)?;

    value
        .as_str()
        .ok_or_else(|| ValidationError::MalformedAddress(value.to_string()))
}

/// Validate an address string.
///
/// `0x` followed by 40 hex digits. Single-case hex carries no checksum and is
/// accepted as is; mixed case must match its EIP-55 checksum.
pub fn validate_address(candidate: &str) -> Result<Address, ValidationError> {
    if candidate.is_empty() {
        return Err(ValidationError::MissingField);
    }

    let malformed = || ValidationError::MalformedAddress(candidate.to_string());

    let hex = candidate.strip_prefix("0x").ok_or_else(malformed)?;
    if hex.len() != 40 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(malformed());
    }

    let has_lower = hex.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = hex.bytes().any(|b| b.is_ascii_uppercase());

    if has_lower && has_upper {
        Address::parse_checksummed(candidate, None).map_err(|_| malformed())
    } else {
        Address::from_str(candidate).map_err(|_| malformed())
    }
}
