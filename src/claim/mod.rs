//! Claim strategies and call construction
//!
//! A deployment dispenses its reward one of two ways: an ERC-20 `transfer`
//! straight from the hot wallet, or a `claim(address)` call on a distributor
//! contract. Both build the same [`UnsignedCall`](crate::domain::UnsignedCall)
//! and go through the same submission path.

pub mod amount;
pub mod strategy;

pub use amount::{scale_amount, AmountError, MAX_DECIMALS};
pub use strategy::{ClaimStrategy, ContractClaim, TokenTransfer};
