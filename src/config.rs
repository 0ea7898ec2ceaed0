use std::path::Path;
use std::str::FromStr;

use alloy::primitives::{Address, U256};
use alloy::signers::local::PrivateKeySigner;
use config::{Config, Environment, File};
use serde::Deserialize;
use url::Url;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::claim::{scale_amount, MAX_DECIMALS};
use crate::error::ConfigurationError;

/// Environment variables used by older single-file deployments, mapped onto
/// their structured keys. Structured `RELAYER__*` variables win.
const LEGACY_ENV_KEYS: &[(&str, &str)] = &[
    ("PRIVATE_KEY", "signer.private_key"),
    ("RPC_URL", "chain.rpc_url"),
    ("TOKEN_ADDRESS", "claim.token_address"),
    ("TOKEN_DECIMALS", "claim.token_decimals"),
    ("AMOUNT", "claim.amount"),
    ("CONTRACT_ADDRESS", "claim.contract_address"),
];

/// Raw configuration as loaded from files and the environment.
///
/// Claim-related fields are optional strings here; [`Settings::resolve`]
/// decides whether they are present and well formed.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub chain: ChainSection,
    #[serde(default)]
    pub signer: SignerSection,
    #[serde(default)]
    pub claim: ClaimSection,
    #[serde(default)]
    pub confirmation: ConfirmationConfig,
    #[serde(default)]
    pub response: ResponseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Path of the claim endpoint
    #[serde(default = "default_claim_path")]
    pub claim_path: String,
    /// How long shutdown waits for detached claims and pending-transaction
    /// watchers once the listener has stopped
    #[serde(default = "default_shutdown_grace")]
    pub shutdown_grace_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_claim_path() -> String {
    "/api/claim".to_string()
}

fn default_shutdown_grace() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            claim_path: default_claim_path(),
            shutdown_grace_secs: default_shutdown_grace(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ChainSection {
    pub rpc_url: Option<String>,
    pub chain_id: Option<String>,
    /// Minimum hot-wallet native balance (wei) required before broadcasting
    pub min_native_balance_wei: Option<String>,
}

#[derive(Clone, Deserialize, Default)]
pub struct SignerSection {
    pub private_key: Option<SigningKey>,
}

impl std::fmt::Debug for SignerSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignerSection")
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ClaimSection {
    /// `token_transfer` or `contract_claim`; inferred when absent
    pub mode: Option<String>,
    pub token_address: Option<String>,
    pub token_decimals: Option<String>,
    pub amount: Option<String>,
    pub contract_address: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConfirmationConfig {
    /// Upper bound on waiting for inclusion
    #[serde(default = "default_confirmation_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
    /// Blocks required, counting the including block
    #[serde(default = "default_confirmations")]
    pub confirmations: u64,
}

fn default_confirmation_timeout() -> u64 {
    120
}

fn default_poll_interval() -> u64 {
    1000
}

fn default_confirmations() -> u64 {
    1
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_confirmation_timeout(),
            poll_interval_ms: default_poll_interval(),
            confirmations: default_confirmations(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ResponseConfig {
    /// Include raw provider payloads and full error text in responses.
    /// Development only.
    #[serde(default)]
    pub expose_diagnostics: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
    /// Directory for daily rotated log files
    #[serde(default)]
    pub dir: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            dir: None,
        }
    }
}

/// Hot-wallet private key.
///
/// Wiped from memory on drop and never printed.
#[derive(Clone, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(transparent)]
pub struct SigningKey(String);

impl SigningKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Parse into a local signer. The error never echoes the key.
    pub fn to_signer(&self) -> Result<PrivateKeySigner, ConfigurationError> {
        let hex = self.0.trim();
        let hex = hex.strip_prefix("0x").unwrap_or(hex);
        PrivateKeySigner::from_str(hex).map_err(|_| {
            ConfigurationError::malformed(
                "signer.private_key",
                "not a valid secp256k1 private key",
            )
        })
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SigningKey(<redacted>)")
    }
}

/// Which reward path this deployment uses, with its resolved parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrategyConfig {
    TokenTransfer {
        token: Address,
        decimals: u8,
        /// Configured human amount, e.g. `"10"`
        amount: String,
        /// `amount * 10^decimals`
        base_units: U256,
    },
    ContractClaim {
        contract: Address,
    },
}

/// Fully resolved, immutable relayer configuration.
///
/// Built once at startup and shared read-only by every request.
#[derive(Debug, Clone)]
pub struct RelayerConfig {
    pub rpc_url: Url,
    pub chain_id: Option<u64>,
    pub signing_key: SigningKey,
    /// Address derived from the signing key
    pub hot_wallet: Address,
    pub strategy: StrategyConfig,
    pub min_native_balance: U256,
    pub confirmation: ConfirmationConfig,
}

impl Settings {
    /// Load configuration from the `config` directory and environment
    pub fn load() -> Result<Self, ConfigurationError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigurationError> {
        let config_dir = config_dir.as_ref();

        let mut builder = Config::builder()
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port() as i64)?
            .set_default("logging.level", default_log_level())?;

        for (var, key) in LEGACY_ENV_KEYS {
            if let Ok(value) = std::env::var(var) {
                builder = builder.set_default(*key, value)?;
            }
        }

        let builder = builder
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/development.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("RELAYER_ENV").unwrap_or_else(|_| "production".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (RELAYER__CHAIN__RPC_URL, etc.).
            // Values stay strings so keys and amounts are never reinterpreted.
            .add_source(Environment::with_prefix("RELAYER").separator("__"));

        Ok(builder.build()?.try_deserialize()?)
    }

    /// Validate and resolve everything a claim needs.
    ///
    /// Runs before any chain connection is attempted; the first problem found
    /// is returned.
    pub fn resolve(&self) -> Result<RelayerConfig, ConfigurationError> {
        let rpc_url = required(&self.chain.rpc_url, "chain.rpc_url")?;
        let rpc_url = Url::parse(rpc_url)
            .map_err(|e| ConfigurationError::malformed("chain.rpc_url", e.to_string()))?;
        if !matches!(rpc_url.scheme(), "http" | "https") {
            return Err(ConfigurationError::malformed(
                "chain.rpc_url",
                format!("unsupported scheme `{}`, expected http or https", rpc_url.scheme()),
            ));
        }

        let signing_key = self
            .signer
            .private_key
            .clone()
            .filter(|key| !key.is_blank())
            .ok_or_else(|| ConfigurationError::missing("signer.private_key"))?;
        let hot_wallet = signing_key.to_signer()?.address();

        let chain_id = optional(&self.chain.chain_id)
            .map(|raw| parse_number::<u64>(raw, "chain.chain_id"))
            .transpose()?;

        let min_native_balance = optional(&self.chain.min_native_balance_wei)
            .map(|raw| {
                U256::from_str_radix(raw, 10).map_err(|_| {
                    ConfigurationError::malformed(
                        "chain.min_native_balance_wei",
                        "expected an integer amount of wei",
                    )
                })
            })
            .transpose()?
            .unwrap_or(U256::ZERO);

        if self.confirmation.confirmations == 0 {
            return Err(ConfigurationError::malformed(
                "confirmation.confirmations",
                "must be at least 1",
            ));
        }
        if self.confirmation.timeout_secs == 0 {
            return Err(ConfigurationError::malformed(
                "confirmation.timeout_secs",
                "must be greater than zero",
            ));
        }

        Ok(RelayerConfig {
            rpc_url,
            chain_id,
            signing_key,
            hot_wallet,
            strategy: self.claim.resolve()?,
            min_native_balance,
            confirmation: self.confirmation.clone(),
        })
    }
}

impl ClaimSection {
    fn resolve(&self) -> Result<StrategyConfig, ConfigurationError> {
        let mode = match optional(&self.mode) {
            Some(mode) => mode.to_ascii_lowercase(),
            None => self.inferred_mode().to_string(),
        };

        match mode.as_str() {
            "token_transfer" => {
                let token = parse_address(required(&self.token_address, "claim.token_address")?, "claim.token_address")?;
                let decimals = parse_number::<u8>(
                    required(&self.token_decimals, "claim.token_decimals")?,
                    "claim.token_decimals",
                )?;
                if decimals > MAX_DECIMALS {
                    return Err(ConfigurationError::malformed(
                        "claim.token_decimals",
                        format!("must be at most {MAX_DECIMALS}"),
                    ));
                }

                let amount = required(&self.amount, "claim.amount")?;
                let base_units = scale_amount(amount, decimals)
                    .map_err(|e| ConfigurationError::malformed("claim.amount", e.to_string()))?;
                if base_units.is_zero() {
                    return Err(ConfigurationError::malformed(
                        "claim.amount",
                        "must be greater than zero",
                    ));
                }

                Ok(StrategyConfig::TokenTransfer {
                    token,
                    decimals,
                    amount: amount.to_string(),
                    base_units,
                })
            }
            "contract_claim" => {
                let contract = parse_address(
                    required(&self.contract_address, "claim.contract_address")?,
                    "claim.contract_address",
                )?;
                Ok(StrategyConfig::ContractClaim { contract })
            }
            other => Err(ConfigurationError::malformed(
                "claim.mode",
                format!("unknown mode `{other}`, expected token_transfer or contract_claim"),
            )),
        }
    }

    /// A lone contract address selects contract-claim; anything else is
    /// treated as a token deployment so missing token fields get reported.
    fn inferred_mode(&self) -> &'static str {
        let has_token_fields = optional(&self.token_address).is_some()
            || optional(&self.token_decimals).is_some()
            || optional(&self.amount).is_some();

        if optional(&self.contract_address).is_some() && !has_token_fields {
            "contract_claim"
        } else {
            "token_transfer"
        }
    }
}

fn optional(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str, ConfigurationError> {
    optional(value).ok_or_else(|| ConfigurationError::missing(name))
}

fn parse_number<T: FromStr>(raw: &str, name: &str) -> Result<T, ConfigurationError> {
    raw.parse::<T>().map_err(|_| {
        ConfigurationError::malformed(name, format!("`{raw}` is not a valid unsigned integer"))
    })
}

fn parse_address(raw: &str, name: &str) -> Result<Address, ConfigurationError> {
    crate::validation::validate_address(raw)
        .map_err(|_| ConfigurationError::malformed(name, format!("`{raw}` is not a valid address")))
}
