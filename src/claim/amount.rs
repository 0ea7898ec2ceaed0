use alloy::primitives::U256;
use thiserror::Error;

/// 10^77 is the largest power of ten that fits in a U256
pub const MAX_DECIMALS: u8 = 77;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,

    #[error("amount `{0}` is not a non-negative decimal number")]
    InvalidNumber(String),

    #[error("amount has {fraction_digits} fractional digits but the token only has {decimals} decimals")]
    TooPrecise { fraction_digits: usize, decimals: u8 },

    #[error("decimals {0} exceeds the maximum of {MAX_DECIMALS}")]
    DecimalsOutOfRange(u8),

    #[error("amount overflows uint256 once scaled")]
    Overflow,
}

/// Convert a human decimal amount into token base units.
///
/// Pure integer arithmetic: `"5"` with 18 decimals is exactly `5 * 10^18`.
/// Fractional digits beyond `decimals` are rejected rather than rounded.
pub fn scale_amount(amount: &str, decimals: u8) -> Result<U256, AmountError> {
    if decimals > MAX_DECIMALS {
        return Err(AmountError::DecimalsOutOfRange(decimals));
    }

    let amount = amount.trim();
    let (whole, fraction) = amount.split_once('.').unwrap_or((amount, ""));
    if whole.is_empty() && fraction.is_empty() {
        return Err(AmountError::Empty);
    }
    if !whole.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit()) {
        return Err(AmountError::InvalidNumber(amount.to_string()));
    }

    let fraction = fraction.trim_end_matches('0');
    if fraction.len() > decimals as usize {
        return Err(AmountError::TooPrecise {
            fraction_digits: fraction.len(),
            decimals,
        });
    }

    let padding = decimals as usize - fraction.len();
    let ten = U256::from(10u8);

    let digits = whole
        .bytes()
        .chain(fraction.bytes())
        .chain(std::iter::repeat(b'0').take(padding));

    let mut value = U256::ZERO;
    for digit in digits {
        value = value
            .checked_mul(ten)
            .and_then(|v| v.checked_add(U256::from(digit - b'0')))
            .ok_or(AmountError::Overflow)?;
    }

    Ok(value)
}
