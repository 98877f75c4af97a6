//! # Conversion Engine
//!
//! Fixed-point math between asset amounts, accounting value (18 decimals)
//! and claim tokens. Every product is formed in 256 bits before the single
//! floor division, so intermediate overflow never costs precision.

use issuance_primitives::ONE;
use sp_core::U256;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ConversionError {
    /// Result does not fit in u128, or the decimals are absurd
    Overflow,
    /// Deposit too small to mint a single token unit
    ZeroTokens,
    /// Minting would take supply above the issuance cap
    CapExceeded,
    /// Position has no locked tokens left
    EmptyPosition,
    /// Requested slice redeems nothing after rounding
    ZeroRedemption,
    /// Redemption larger than what the position still holds
    ExceedsPosition,
    /// Redemption larger than the asset's backing total
    ExceedsBacking,
}

fn pow10(decimals: u8) -> Result<U256, ConversionError> {
    U256::from(10u8)
        .checked_pow(U256::from(decimals))
        .ok_or(ConversionError::Overflow)
}

fn to_u128(value: U256) -> Result<u128, ConversionError> {
    u128::try_from(value).map_err(|_| ConversionError::Overflow)
}

/// Value of `amount` (asset precision) in accounting units:
/// `floor(amount * price * 1e18 / (10^asset_decimals * 10^feed_decimals))`.
pub fn asset_to_value(
    amount: u128,
    price: u128,
    asset_decimals: u8,
    feed_decimals: u8,
) -> Result<u128, ConversionError> {
    let numerator = U256::from(amount)
        .checked_mul(U256::from(price))
        .and_then(|n| n.checked_mul(U256::from(ONE)))
        .ok_or(ConversionError::Overflow)?;
    let denominator = pow10(asset_decimals)?
        .checked_mul(pow10(feed_decimals)?)
        .ok_or(ConversionError::Overflow)?;

    to_u128(numerator / denominator)
}

/// Claim tokens issued for `value`: `floor(value * conversion_rate / 1e18)`.
///
/// A zero result is refused. Nothing stops a deposit from landing just
/// above the boundary and minting the smallest unit; there is no
/// minimum-deposit floor.
pub fn value_to_tokens(value: u128, conversion_rate: u128) -> Result<u128, ConversionError> {
    let tokens = U256::from(value)
        .checked_mul(U256::from(conversion_rate))
        .ok_or(ConversionError::Overflow)?
        / U256::from(ONE);
    let tokens = to_u128(tokens)?;

    if tokens == 0 {
        return Err(ConversionError::ZeroTokens);
    }
    Ok(tokens)
}

/// Supply after minting `tokens`, refused above `cap`.
pub fn supply_after_mint(supply: u128, tokens: u128, cap: u128) -> Result<u128, ConversionError> {
    let new_supply = supply.checked_add(tokens).ok_or(ConversionError::Overflow)?;
    if new_supply > cap {
        return Err(ConversionError::CapExceeded);
    }
    Ok(new_supply)
}

/// Asset released for `tokens` out of a position holding
/// (`asset_amount`, `token_amount`): `floor(tokens * asset_amount / token_amount)`.
///
/// The last two checks can only fail if the books are already wrong.
pub fn proportional_asset_amount(
    tokens: u128,
    asset_amount: u128,
    token_amount: u128,
    backing: u128,
) -> Result<u128, ConversionError> {
    if token_amount == 0 {
        return Err(ConversionError::EmptyPosition);
    }

    let amount = to_u128(
        U256::from(tokens)
            .checked_mul(U256::from(asset_amount))
            .ok_or(ConversionError::Overflow)?
            / U256::from(token_amount),
    )?;

    if amount == 0 {
        return Err(ConversionError::ZeroRedemption);
    }
    if amount > asset_amount {
        return Err(ConversionError::ExceedsPosition);
    }
    if amount > backing {
        return Err(ConversionError::ExceedsBacking);
    }
    Ok(amount)
}

// ============================================================================
// Tests
// ============================================================================
