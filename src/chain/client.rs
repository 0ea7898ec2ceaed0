use alloy::primitives::{Address, TxHash, U256};
use async_trait::async_trait;

use crate::chain::ChainFailure;
use crate::domain::{CallReceipt, SignedCall, UnsignedCall};

/// Operations the claim pipeline needs from a chain node, bound to one signer.
///
/// Every method is a suspension point; none of them retry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Address of the hot wallet this client signs for
    fn signer_address(&self) -> Address;

    /// Native balance of the hot wallet. Doubles as the connectivity check.
    async fn native_balance(&self) -> Result<U256, ChainFailure>;

    /// Next nonce for the hot wallet, counting pending transactions
    async fn pending_nonce(&self) -> Result<u64, ChainFailure>;

    /// Estimate gas and fees for `call` and sign it locally with an explicit
    /// nonce. Nothing is broadcast; a revert during estimation fails here.
    async fn sign_call(&self, call: &UnsignedCall, nonce: u64) -> Result<SignedCall, ChainFailure>;

    /// Broadcast a signed transaction. A `Network` failure leaves its fate
    /// unknown: the node may have accepted it before the response was lost.
    async fn broadcast(&self, signed: &SignedCall) -> Result<(), ChainFailure>;

    /// Receipt for `hash`, `None` while the transaction is not yet included
    async fn receipt(&self, hash: TxHash) -> Result<Option<CallReceipt>, ChainFailure>;

    async fn block_number(&self) -> Result<u64, ChainFailure>;

    /// Re-execute `call` at `block` to recover the revert reason of a mined
    /// transaction whose receipt reported failure
    async fn replay_revert(&self, call: &UnsignedCall, block: u64) -> Option<ChainFailure>;
}
