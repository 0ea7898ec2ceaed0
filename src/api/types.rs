use alloy::primitives::TxHash;
use serde::{Deserialize, Serialize};

use crate::domain::TxStatus;

// ============================================================================
// Claim Types
// ============================================================================

/// Body of every claim endpoint response. Callers branch on `success`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<TxHash>,
    /// `pending` when the fate is unknown, `failed` for a mined revert
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TxStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetail>,
}

impl ClaimResponse {
    pub fn success(message: impl Into<String>, tx_hash: TxHash) -> Self {
        Self {
            success: true,
            message: message.into(),
            tx_hash: Some(tx_hash),
            status: None,
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            tx_hash: None,
            status: None,
            error: None,
        }
    }

    pub fn with_error(mut self, error: ErrorDetail) -> Self {
        self.error = Some(error);
        self
    }
}

/// Structured failure detail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub message: String,
    /// Chain-reported revert reason
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Stable error code such as `CALL_EXCEPTION`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Raw provider payload, diagnostics mode only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short: Option<String>,
}

impl ErrorDetail {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            reason: None,
            code: None,
            data: None,
            short: None,
        }
    }
}
