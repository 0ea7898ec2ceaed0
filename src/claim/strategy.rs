use alloy::primitives::{Address, Bytes, U256};
use alloy::sol;
use alloy::sol_types::SolCall;

use crate::domain::UnsignedCall;

// Generate call bindings for the two supported reward paths
sol! {
    #[allow(missing_docs)]
    interface IERC20 {
        function transfer(address to, uint256 value) external returns (bool);
    }

    #[allow(missing_docs)]
    interface IClaimDistributor {
        /// Fixed claim entry point; the recipient is the only argument
        function claim(address recipient) external;
    }
}

/// How a deployment turns a validated recipient into an on-chain call
pub trait ClaimStrategy: Send + Sync + std::fmt::Debug {
    /// Stable strategy name for logs and health output
    fn name(&self) -> &'static str;

    /// Contract the call targets
    fn target(&self) -> Address;

    /// Build the unsigned call for one recipient. No side effects.
    fn build_call(&self, recipient: Address) -> UnsignedCall;

    fn success_message(&self, recipient: Address) -> String;

    fn failure_message(&self) -> &'static str;
}

/// Direct ERC-20 transfer of a fixed amount from the hot wallet
#[derive(Debug, Clone)]
pub struct TokenTransfer {
    token: Address,
    amount: U256,
    display_amount: String,
}

impl TokenTransfer {
    /// `amount` is already scaled to base units; `display_amount` is the
    /// configured human value, used only for logging.
    pub fn new(token: Address, amount: U256, display_amount: impl Into<String>) -> Self {
        Self {
            token,
            amount,
            display_amount: display_amount.into(),
        }
    }

    pub fn amount(&self) -> U256 {
        self.amount
    }
}

impl ClaimStrategy for TokenTransfer {
    fn name(&self) -> &'static str {
        "token_transfer"
    }

    fn target(&self) -> Address {
        self.token
    }

    fn build_call(&self, recipient: Address) -> UnsignedCall {
        let data = IERC20::transferCall {
            to: recipient,
            value: self.amount,
        }
        .abi_encode();

        UnsignedCall {
            to: self.token,
            data: Bytes::from(data),
            description: format!(
                "transfer({recipient}, {} = {} base units)",
                self.display_amount, self.amount
            ),
        }
    }

    fn success_message(&self, recipient: Address) -> String {
        format!("Tokens sent successfully to {recipient}")
    }

    fn failure_message(&self) -> &'static str {
        "Airdrop failed. See error details."
    }
}

/// `claim(recipient)` on a distributor contract that holds the reward logic
#[derive(Debug, Clone)]
pub struct ContractClaim {
    contract: Address,
}

impl ContractClaim {
    pub fn new(contract: Address) -> Self {
        Self { contract }
    }
}

impl ClaimStrategy for ContractClaim {
    fn name(&self) -> &'static str {
        "contract_claim"
    }

    fn target(&self) -> Address {
        self.contract
    }

    fn build_call(&self, recipient: Address) -> UnsignedCall {
        let data = IClaimDistributor::claimCall { recipient }.abi_encode();

        UnsignedCall {
            to: self.contract,
            data: Bytes::from(data),
            description: format!("claim({recipient})"),
        }
    }

    fn success_message(&self, recipient: Address) -> String {
        format!("Claim successful for {recipient}")
    }

    fn failure_message(&self) -> &'static str {
        "Claim failed. See error details."
    }
}
