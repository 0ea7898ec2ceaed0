//! Classification of provider errors
//!
//! Providers report failures as loosely structured JSON-RPC errors. Everything
//! the pipeline needs to branch on, and everything the caller is shown, is
//! pulled out here once.

use alloy::sol_types::{decode_revert_reason, Revert, SolError};
use alloy::transports::{RpcError, TransportError};
use serde::Serialize;

/// Broad failure classes reported by the chain or the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Endpoint unreachable or the connection dropped
    Network,
    /// Node answered with an error that fits no narrower class
    Rpc,
    /// Hot wallet cannot cover value plus gas
    InsufficientFunds,
    /// Nonce already used or not yet valid
    NonceConflict,
    /// A transaction with this nonce is pending at a higher fee
    Underpriced,
    /// Execution reverted, during estimation or on-chain
    Reverted,
}

impl FailureKind {
    /// Stable string code surfaced in `error.code`
    pub fn code(&self) -> &'static str {
        match self {
            FailureKind::Network => "NETWORK_ERROR",
            FailureKind::Rpc => "SERVER_ERROR",
            FailureKind::InsufficientFunds => "INSUFFICIENT_FUNDS",
            FailureKind::NonceConflict => "NONCE_EXPIRED",
            FailureKind::Underpriced => "REPLACEMENT_UNDERPRICED",
            FailureKind::Reverted => "CALL_EXCEPTION",
        }
    }

    fn summary(&self) -> &'static str {
        match self {
            FailureKind::Network => "RPC endpoint unreachable",
            FailureKind::Rpc => "RPC request failed",
            FailureKind::InsufficientFunds => "insufficient funds for gas * price + value",
            FailureKind::NonceConflict => "nonce has already been used",
            FailureKind::Underpriced => "replacement fee too low",
            FailureKind::Reverted => "execution reverted",
        }
    }

    /// Classify a node error message.
    ///
    /// Node implementations disagree on codes but agree closely on wording,
    /// so matching happens on the lowercased message.
    pub fn classify(message: &str, has_revert_data: bool) -> Self {
        let message = message.to_ascii_lowercase();

        if message.contains("insufficient funds") {
            FailureKind::InsufficientFunds
        } else if message.contains("nonce too low")
            || message.contains("nonce too high")
            || message.contains("invalid nonce")
            || message.contains("already known")
            || message.contains("nonce has already been used")
        {
            FailureKind::NonceConflict
        } else if message.contains("underpriced") {
            FailureKind::Underpriced
        } else if has_revert_data || message.contains("revert") {
            FailureKind::Reverted
        } else {
            FailureKind::Rpc
        }
    }
}

/// A classified chain-side failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainFailure {
    pub kind: FailureKind,
    /// Full provider message
    pub message: String,
    /// Decoded revert reason, when the chain reported one
    pub reason: Option<String>,
    /// JSON-RPC error code
    pub rpc_code: Option<i64>,
    /// Raw provider payload (`error.data`), diagnostics only
    pub data: Option<String>,
}

impl ChainFailure {
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Network,
            message: message.into(),
            reason: None,
            rpc_code: None,
            data: None,
        }
    }

    pub fn insufficient_funds(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::InsufficientFunds,
            message: message.into(),
            reason: None,
            rpc_code: None,
            data: None,
        }
    }

    pub fn reverted(message: impl Into<String>, reason: Option<String>) -> Self {
        Self {
            kind: FailureKind::Reverted,
            message: message.into(),
            reason,
            rpc_code: None,
            data: None,
        }
    }

    /// Build from the parts of a JSON-RPC error response.
    ///
    /// `decoded_reason` comes from ABI-decoding the revert data; when absent
    /// the reason is taken from an `execution reverted: <reason>` message.
    pub fn from_rpc(
        code: i64,
        message: impl Into<String>,
        decoded_reason: Option<String>,
        has_revert_data: bool,
        data: Option<String>,
    ) -> Self {
        let message = message.into();
        let kind = FailureKind::classify(&message, has_revert_data);
        let reason = decoded_reason
            .filter(|r| !r.trim().is_empty())
            .or_else(|| reason_from_message(&message));

        Self {
            kind,
            message,
            reason,
            rpc_code: Some(code),
            data,
        }
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// One-line summary safe for production responses
    pub fn short_message(&self) -> String {
        match &self.reason {
            Some(reason) => format!("{}: {}", self.kind.summary(), reason),
            None => self.kind.summary().to_string(),
        }
    }
}

impl std::fmt::Display for ChainFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message)?;
        if let Some(reason) = &self.reason {
            write!(f, " (reason: {})", reason)?;
        }
        Ok(())
    }
}

impl std::error::Error for ChainFailure {}

impl From<TransportError> for ChainFailure {
    fn from(err: TransportError) -> Self {
        match &err {
            RpcError::ErrorResp(payload) => {
                let revert_data = payload.as_revert_data();
                let decoded = revert_data.as_ref().and_then(|bytes| decode_reason(bytes));
                ChainFailure::from_rpc(
                    payload.code,
                    payload.message.to_string(),
                    decoded,
                    revert_data.is_some(),
                    payload.data.as_ref().map(|raw| raw.get().to_string()),
                )
            }
            RpcError::Transport(_) => ChainFailure::network(err.to_string()),
            _ => Self {
                kind: FailureKind::Rpc,
                message: err.to_string(),
                reason: None,
                rpc_code: None,
                data: None,
            },
        }
    }
}

/// Decode ABI revert data into a reason string.
///
/// `Error(string)` yields the bare string; panics and custom errors fall back
/// to the generic decoder. Empty data and empty reasons yield `None`.
pub fn decode_reason(data: &[u8]) -> Option<String> {
    if data.is_empty() {
        return None;
    }
    let reason = match Revert::abi_decode(data) {
        Ok(revert) => revert.reason,
        Err(_) => decode_revert_reason(data)?,
    };
    let reason = reason.trim();
    (!reason.is_empty()).then(|| reason.to_string())
}

/// Failure raised while filling or signing a transaction locally
pub(crate) fn signing_failure(message: impl Into<String>) -> ChainFailure {
    ChainFailure {
        kind: FailureKind::Rpc,
        message: message.into(),
        reason: None,
        rpc_code: None,
        data: None,
    }
}

fn reason_from_message(message: &str) -> Option<String> {
    let lower = message.to_ascii_lowercase();
    let marker = "execution reverted:";
    let start = lower.find(marker)? + marker.len();
    let reason = message[start..].trim();
    (!reason.is_empty()).then(|| reason.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_common_node_messages() {
        let cases = [
            ("insufficient funds for gas * price + value", FailureKind::InsufficientFunds),
            ("nonce too low: next nonce 12, tx nonce 11", FailureKind::NonceConflict),
            ("already known", FailureKind::NonceConflict),
            ("replacement transaction underpriced", FailureKind::Underpriced),
            ("execution reverted", FailureKind::Reverted),
            ("header not found", FailureKind::Rpc),
        ];

        for (message, expected) in cases {
            assert_eq!(FailureKind::classify(message, false), expected, "{message}");
        }
    }

    #[test]
    fn test_revert_data_forces_reverted() {
        assert_eq!(
            FailureKind::classify("VM Exception while processing transaction", true),
            FailureKind::Reverted
        );
    }

    #[test]
    fn test_reason_taken_from_message_when_not_decoded() {
        let failure = ChainFailure::from_rpc(
            3,
            "execution reverted: ERC20: transfer amount exceeds balance",
            None,
            false,
            None,
        );
        assert_eq!(failure.kind, FailureKind::Reverted);
        assert_eq!(
            failure.reason.as_deref(),
            Some("ERC20: transfer amount exceeds balance")
        );
        assert_eq!(failure.code(), "CALL_EXCEPTION");
        assert_eq!(failure.rpc_code, Some(3));
    }

    #[test]
    fn test_decoded_reason_wins() {
        let failure = ChainFailure::from_rpc(
            3,
            "execution reverted: something else",
            Some("Already claimed".to_string()),
            true,
            Some("\"0x08c379a0\"".to_string()),
        );
        assert_eq!(failure.reason.as_deref(), Some("Already claimed"));
        assert_eq!(failure.short_message(), "execution reverted: Already claimed");
    }

    #[test]
    fn test_plain_revert_has_no_reason() {
        let failure = ChainFailure::from_rpc(-32000, "execution reverted", None, false, None);
        assert_eq!(failure.reason, None);
        assert_eq!(failure.short_message(), "execution reverted");
    }

    #[test]
    fn test_network_failure_display() {
        let failure = ChainFailure::network("error sending request: connection refused");
        assert_eq!(failure.code(), "NETWORK_ERROR");
        assert_eq!(
            failure.to_string(),
            "[NETWORK_ERROR] error sending request: connection refused"
        );
    }

    #[test]
    fn test_decode_revert_reason_from_error_string_abi() {
        // Error(string) with "Already claimed"
        let data = alloy::primitives::hex::decode(concat!(
            "08c379a0",
            "0000000000000000000000000000000000000000000000000000000000000020",
            "000000000000000000000000000000000000000000000000000000000000000f",
            "416c726561647920636c61696d65640000000000000000000000000000000000"
        ))
        .unwrap();
        assert_eq!(decode_reason(&data).as_deref(), Some("Already claimed"));
        assert_eq!(decode_reason(&[]), None);
    }

    #[test]
    fn test_empty_revert_string_has_no_reason() {
        // Error(string) with ""
        let data = alloy::primitives::hex::decode(concat!(
            "08c379a0",
            "0000000000000000000000000000000000000000000000000000000000000020",
            "0000000000000000000000000000000000000000000000000000000000000000"
        ))
        .unwrap();
        assert_eq!(decode_reason(&data), None);
    }
}
