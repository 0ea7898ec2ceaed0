//! Maps claim outcomes to wire responses
//!
//! This is the only place a [`ClaimError`] becomes an HTTP status and body.
//! The signing key and RPC URL never appear in any of these.

use axum::http::StatusCode;

use crate::api::types::{ClaimResponse, ErrorDetail};
use crate::chain::ChainFailure;
use crate::domain::{ClaimReceipt, TxStatus};
use crate::error::{ClaimError, ConfigurationError};

pub const INVALID_ADDRESS_MESSAGE: &str = "Invalid address format.";
pub const MISSING_CONFIG_MESSAGE: &str = "Missing environment variables. Check your .env setup.";
pub const INVALID_CONFIG_MESSAGE: &str = "Invalid relayer configuration. Check your .env setup.";
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal relayer error.";
pub const METHOD_NOT_ALLOWED_MESSAGE: &str = "Only POST allowed";

/// Turn a claim outcome into `(status, body)`.
///
/// `failure_message` is the deployment's top-level message for chain
/// failures. With `expose_diagnostics` off, raw provider payloads are dropped
/// and error text is reduced to the classified summary; the chain-reported
/// reason and code are kept either way.
pub fn assemble(
    outcome: &Result<ClaimReceipt, ClaimError>,
    failure_message: &str,
    expose_diagnostics: bool,
) -> (StatusCode, ClaimResponse) {
    let err = match outcome {
        Ok(receipt) => {
            return (
                StatusCode::OK,
                ClaimResponse::success(receipt.message.clone(), receipt.transaction.hash),
            )
        }
        Err(err) => err,
    };

    match err {
        ClaimError::Validation(_) => (
            StatusCode::BAD_REQUEST,
            ClaimResponse::failure(INVALID_ADDRESS_MESSAGE),
        ),
        ClaimError::Configuration(config_err) => {
            let message = match config_err {
                ConfigurationError::MissingVariable { .. } => MISSING_CONFIG_MESSAGE,
                _ => INVALID_CONFIG_MESSAGE,
            };
            let mut response = ClaimResponse::failure(message);
            if expose_diagnostics {
                response = response.with_error(ErrorDetail::new(config_err.to_string()));
            }
            (StatusCode::INTERNAL_SERVER_ERROR, response)
        }
        ClaimError::ChainConnection(failure) | ClaimError::Submission(failure) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            ClaimResponse::failure(failure_message)
                .with_error(chain_error_detail(failure, expose_diagnostics)),
        ),
        ClaimError::Reverted {
            transaction,
            failure,
        } => {
            let mut response = ClaimResponse::failure(failure_message)
                .with_error(chain_error_detail(failure, expose_diagnostics));
            response.tx_hash = Some(transaction.hash);
            response.status = Some(transaction.status);
            (StatusCode::INTERNAL_SERVER_ERROR, response)
        }
        ClaimError::BroadcastUnknown {
            tx_hash, failure, ..
        } => {
            let response = ClaimResponse {
                success: false,
                message: format!(
                    "Transaction {tx_hash} was sent but the node did not acknowledge it. \
                     It may still be confirmed; check the transaction before retrying."
                ),
                tx_hash: Some(*tx_hash),
                status: Some(TxStatus::Pending),
                error: Some(chain_error_detail(failure, expose_diagnostics)),
            };
            (StatusCode::ACCEPTED, response)
        }
        ClaimError::ConfirmationTimeout {
            tx_hash,
            waited_secs,
            ..
        } => {
            let response = ClaimResponse {
                success: false,
                message: format!(
                    "Transaction {tx_hash} was broadcast but not confirmed within {waited_secs}s. \
                     It may still be confirmed; check the transaction before retrying."
                ),
                tx_hash: Some(*tx_hash),
                status: Some(TxStatus::Pending),
                error: Some(ErrorDetail {
                    code: Some("TIMEOUT".to_string()),
                    ..ErrorDetail::new(err.to_string())
                }),
            };
            (StatusCode::ACCEPTED, response)
        }
        ClaimError::Internal(detail) => {
            let mut response = ClaimResponse::failure(INTERNAL_ERROR_MESSAGE);
            if expose_diagnostics {
                response = response.with_error(ErrorDetail::new(detail.clone()));
            }
            (StatusCode::INTERNAL_SERVER_ERROR, response)
        }
    }
}

fn chain_error_detail(failure: &ChainFailure, expose_diagnostics: bool) -> ErrorDetail {
    let short = failure.short_message();

    if expose_diagnostics {
        ErrorDetail {
            message: failure.message.clone(),
            reason: failure.reason.clone(),
            code: Some(failure.code().to_string()),
            data: failure.data.as_deref().map(|raw| {
                serde_json::from_str(raw)
                    .unwrap_or_else(|_| serde_json::Value::String(raw.to_string()))
            }),
            short: Some(short),
        }
    } else {
        ErrorDetail {
            message: short.clone(),
            reason: failure.reason.clone(),
            code: Some(failure.code().to_string()),
            data: None,
            short: Some(short),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SubmittedTransaction;
    use crate::error::ValidationError;
    use alloy::primitives::{address, TxHash, B256};

    const FAILURE: &str = "Airdrop failed. See error details.";

    fn reverted() -> ClaimError {
        ClaimError::Submission(ChainFailure::from_rpc(
            3,
            "execution reverted: ERC20: transfer amount exceeds balance",
            None,
            true,
            Some("\"0x08c379a0\"".to_string()),
        ))
    }

    #[test]
    fn test_success_body() {
        let hash = B256::repeat_byte(0xab);
        let recipient = address!("70997970C51812dc3A010C7d01b50e0d17dc79C8");
        let outcome = Ok(ClaimReceipt {
            recipient,
            transaction: SubmittedTransaction::pending(hash, 0).with_status(TxStatus::Confirmed),
            block_number: 12,
            message: format!("Tokens sent successfully to {recipient}"),
        });

        let (status, body) = assemble(&outcome, FAILURE, false);
        assert_eq!(status, StatusCode::OK);

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["txHash"], format!("{hash}"));
        assert!(json.get("error").is_none());
        assert!(json.get("status").is_none());
    }

    #[test]
    fn test_validation_is_400_without_error_object() {
        let outcome = Err(ValidationError::MalformedAddress("nope".into()).into());
        let (status, body) = assemble(&outcome, FAILURE, true);

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, ClaimResponse::failure("Invalid address format."));
    }

    #[test]
    fn test_configuration_detail_only_in_diagnostics() {
        let outcome = Err(ConfigurationError::missing("signer.private_key").into());

        let (status, body) = assemble(&outcome, FAILURE, false);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.message, MISSING_CONFIG_MESSAGE);
        assert!(body.error.is_none());

        let (_, body) = assemble(&outcome, FAILURE, true);
        assert!(body.error.unwrap().message.contains("signer.private_key"));
    }

    #[test]
    fn test_production_revert_keeps_reason_drops_data() {
        let (status, body) = assemble(&Err(reverted()), FAILURE, false);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.message, FAILURE);

        let error = body.error.unwrap();
        assert_eq!(
            error.reason.as_deref(),
            Some("ERC20: transfer amount exceeds balance")
        );
        assert_eq!(error.code.as_deref(), Some("CALL_EXCEPTION"));
        assert!(error.data.is_none());
    }

    #[test]
    fn test_diagnostics_revert_includes_raw_data() {
        let (_, body) = assemble(&Err(reverted()), FAILURE, true);
        let error = body.error.unwrap();

        assert_eq!(
            error.message,
            "execution reverted: ERC20: transfer amount exceeds balance"
        );
        assert_eq!(error.data, Some(serde_json::json!("0x08c379a0")));
    }

    #[test]
    fn test_timeout_is_pending_not_failure() {
        let hash = TxHash::repeat_byte(0x11);
        let outcome = Err(ClaimError::ConfirmationTimeout {
            tx_hash: hash,
            nonce: 5,
            waited_secs: 120,
        });

        let (status, body) = assemble(&outcome, FAILURE, false);
        assert_eq!(status, StatusCode::ACCEPTED);
        assert!(!body.success);
        assert_eq!(body.status, Some(TxStatus::Pending));
        assert_eq!(body.tx_hash, Some(hash));
        assert!(body.message.contains("may still be confirmed"));

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["status"], "pending");
        assert_eq!(json["error"]["code"], "TIMEOUT");
    }

    #[test]
    fn test_unacknowledged_broadcast_is_pending() {
        let hash = TxHash::repeat_byte(0x22);
        let outcome = Err(ClaimError::BroadcastUnknown {
            tx_hash: hash,
            nonce: 8,
            failure: ChainFailure::network("error sending request: connection reset by peer"),
        });

        let (status, body) = assemble(&outcome, FAILURE, false);
        assert_eq!(status, StatusCode::ACCEPTED);
        assert!(!body.success);
        assert_eq!(body.tx_hash, Some(hash));
        assert!(body.message.contains("may still be confirmed"));

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["status"], "pending");
        assert_eq!(json["error"]["code"], "NETWORK_ERROR");
        assert_eq!(json["error"]["message"], "RPC endpoint unreachable");
    }

    #[test]
    fn test_mined_revert_reports_failed_transaction() {
        let hash = TxHash::repeat_byte(0x33);
        let outcome = Err(ClaimError::Reverted {
            transaction: SubmittedTransaction::pending(hash, 2).with_status(TxStatus::Failed),
            failure: ChainFailure::reverted(
                "execution reverted: Already claimed",
                Some("Already claimed".to_string()),
            ),
        });

        let (status, body) = assemble(&outcome, FAILURE, false);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.message, FAILURE);
        assert_eq!(body.tx_hash, Some(hash));

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["error"]["reason"], "Already claimed");
        assert_eq!(json["error"]["code"], "CALL_EXCEPTION");
    }
}
