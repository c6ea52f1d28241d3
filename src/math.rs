//! Decimal normalization helpers.
//!
//! Pure functions only: deterministic, no external state lookups. All
//! conversions are bounds-checked so a hostile token (e.g. one reporting
//! absurd decimals) degrades into a resolution failure rather than a panic.

use ethers::types::U256;
use once_cell::sync::Lazy;
use rust_decimal::Decimal;

use crate::errors::PriceError;

/// `Decimal` can represent at most 28 significant decimal digits, so powers
/// of ten are capped there. On-chain tokens never exceed 18 in practice.
pub const MAX_SUPPORTED_DECIMALS: u8 = 28;

static POWERS_OF_TEN: Lazy<[Decimal; MAX_SUPPORTED_DECIMALS as usize + 1]> = Lazy::new(|| {
    let mut table = [Decimal::ONE; MAX_SUPPORTED_DECIMALS as usize + 1];
    let mut acc = Decimal::ONE;
    for entry in table.iter_mut().skip(1) {
        acc *= Decimal::TEN;
        *entry = acc;
    }
    table
});

/// `10^decimals` as a `Decimal`. Saturates at `MAX_SUPPORTED_DECIMALS`.
pub fn exponent_to_decimal(decimals: u8) -> Decimal {
    POWERS_OF_TEN[decimals.min(MAX_SUPPORTED_DECIMALS) as usize]
}

/// Division that treats a zero denominator as zero. Use an explicit
/// `ZeroDivision` guard instead when the zero case must fail the whole
/// valuation (e.g. LP total supply).
pub fn safe_div(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        Decimal::ZERO
    } else {
        numerator / denominator
    }
}

/// `Decimal`'s mantissa is 96 bits wide; anything larger must be scaled
/// down in `U256` arithmetic first.
const MANTISSA_BITS: usize = 96;

/// Convert a raw on-chain integer amount into a human decimal quantity,
/// dividing by `10^decimals`.
///
/// Raw amounts above the 96-bit mantissa are split into whole and
/// fractional parts in `U256` arithmetic before conversion, so large-supply
/// tokens (trillions of units at 18 decimals) normalize instead of
/// overflowing. Only amounts whose *normalized* value still exceeds the
/// mantissa are an error.
pub fn u256_to_decimal(amount: U256, decimals: u8) -> Result<Decimal, PriceError> {
    if amount.bits() <= MANTISSA_BITS {
        let raw = Decimal::from_i128_with_scale(amount.as_u128() as i128, 0);
        return Ok(raw / exponent_to_decimal(decimals));
    }

    let divisor = U256::exp10(decimals.min(MAX_SUPPORTED_DECIMALS) as usize);
    let whole = amount / divisor;
    if whole.bits() > MANTISSA_BITS {
        return Err(PriceError::Normalization(format!(
            "amount {} at {} decimals exceeds decimal range",
            amount, decimals
        )));
    }
    let whole = Decimal::from_i128_with_scale(whole.as_u128() as i128, 0);
    let frac = Decimal::from_i128_with_scale((amount % divisor).as_u128() as i128, 0);
    Ok(whole + frac / exponent_to_decimal(decimals))
}

/// Compensate an AMM quote for the swap fee taken on each hop, so the
/// quoted output approximates a fee-free mid-price:
/// `amount * 10000 / (10000 - fee_bips * hops)`.
pub fn compensate_swap_fee(
    amount: Decimal,
    fee_bips: u32,
    hops: u32,
) -> Result<Decimal, PriceError> {
    let bips = Decimal::from(10_000u32);
    let fee = Decimal::from(fee_bips) * Decimal::from(hops);
    let denominator = bips - fee;
    if denominator <= Decimal::ZERO {
        return Err(PriceError::ZeroDivision("swap fee compensation"));
    }
    Ok(amount * bips / denominator)
}
