use alloy::eips::eip2718::Encodable2718;
use alloy::eips::BlockId;
use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::Signer;
use async_trait::async_trait;
use tracing::{debug, info};
use url::Url;

use crate::chain::errors::signing_failure;
use crate::chain::{ChainClient, ChainFailure};
use crate::config::SigningKey;
use crate::domain::{CallReceipt, SignedCall, UnsignedCall};
use crate::error::ConfigurationError;

/// JSON-RPC backed chain client for the hot wallet
///
/// The provider is built once at startup. Building it does not touch the
/// network; the first request does. Transactions are signed here rather than
/// in a provider filler so the hash is known before anything is sent.
pub struct AlloyChainClient {
    provider: DynProvider,
    wallet: EthereumWallet,
    signer_address: Address,
    chain_id: Option<u64>,
}

impl AlloyChainClient {
    pub fn connect(
        rpc_url: Url,
        signing_key: &SigningKey,
        chain_id: Option<u64>,
    ) -> Result<Self, ConfigurationError> {
        let signer = signing_key.to_signer()?.with_chain_id(chain_id);
        let signer_address = signer.address();
        let wallet = EthereumWallet::from(signer);

        let endpoint = rpc_url.host_str().unwrap_or("unknown").to_string();
        let provider = ProviderBuilder::new().connect_http(rpc_url).erased();

        info!(
            "Relayer hot wallet {} bound to RPC host {} (chain id: {})",
            signer_address,
            endpoint,
            chain_id.map_or_else(|| "auto".to_string(), |id| id.to_string())
        );

        Ok(Self {
            provider,
            wallet,
            signer_address,
            chain_id,
        })
    }

    async fn chain_id(&self) -> Result<u64, ChainFailure> {
        match self.chain_id {
            Some(id) => Ok(id),
            None => Ok(self.provider.get_chain_id().await?),
        }
    }

    fn request_for(&self, call: &UnsignedCall) -> TransactionRequest {
        TransactionRequest::default()
            .with_from(self.signer_address)
            .with_to(call.to)
            .with_input(call.data.clone())
    }
}

#[async_trait]
impl ChainClient for AlloyChainClient {
    fn signer_address(&self) -> Address {
        self.signer_address
    }

    async fn native_balance(&self) -> Result<U256, ChainFailure> {
        Ok(self.provider.get_balance(self.signer_address).await?)
    }

    async fn pending_nonce(&self) -> Result<u64, ChainFailure> {
        Ok(self
            .provider
            .get_transaction_count(self.signer_address)
            .pending()
            .await?)
    }

    async fn sign_call(&self, call: &UnsignedCall, nonce: u64) -> Result<SignedCall, ChainFailure> {
        let chain_id = self.chain_id().await?;
        let request = self
            .request_for(call)
            .with_nonce(nonce)
            .with_chain_id(chain_id);

        // Estimation executes the call, so a revert surfaces here with its reason
        let gas_limit = self.provider.estimate_gas(request.clone()).await?;
        let fees = self.provider.estimate_eip1559_fees().await?;
        let request = request
            .with_gas_limit(gas_limit)
            .with_max_fee_per_gas(fees.max_fee_per_gas)
            .with_max_priority_fee_per_gas(fees.max_priority_fee_per_gas);

        let envelope = request
            .build(&self.wallet)
            .await
            .map_err(|e| signing_failure(format!("failed to sign transaction: {e}")))?;
        let hash = *envelope.tx_hash();

        debug!(
            "Signed {} to {} with nonce {} as {} (gas_limit={}, data_len={})",
            call.description,
            call.to,
            nonce,
            hash,
            gas_limit,
            call.data.len()
        );

        Ok(SignedCall {
            hash,
            nonce,
            raw: Bytes::from(envelope.encoded_2718()),
        })
    }

    async fn broadcast(&self, signed: &SignedCall) -> Result<(), ChainFailure> {
        self.provider.send_raw_transaction(&signed.raw).await?;
        Ok(())
    }

    async fn receipt(&self, hash: TxHash) -> Result<Option<CallReceipt>, ChainFailure> {
        let Some(receipt) = self.provider.get_transaction_receipt(hash).await? else {
            return Ok(None);
        };
        let Some(block_number) = receipt.block_number else {
            return Ok(None);
        };

        Ok(Some(CallReceipt {
            tx_hash: receipt.transaction_hash,
            block_number,
            success: receipt.status(),
            gas_used: receipt.gas_used,
        }))
    }

    async fn block_number(&self) -> Result<u64, ChainFailure> {
        Ok(self.provider.get_block_number().await?)
    }

    async fn replay_revert(&self, call: &UnsignedCall, block: u64) -> Option<ChainFailure> {
        // State before the including block is the closest match to what the
        // transaction executed against.
        let at = BlockId::number(block.saturating_sub(1));
        match self.provider.call(self.request_for(call)).block(at).await {
            Ok(_) => None,
            Err(err) => Some(ChainFailure::from(err)),
        }
    }
}
