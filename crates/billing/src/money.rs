//! Monetary amounts and display formatting.

use serde::{Deserialize, Serialize};

use fieldbill_core::{DomainError, DomainResult, ValueObject};

/// Monetary amount in major currency units (e.g. dinars, not fils).
///
/// The backend exchanges plain JSON numbers, so internal math keeps full
/// floating precision; rounding happens only at display time, governed by
/// [`Currency::decimal_places`].
pub type Money = f64;

/// Guard a computed amount against NaN/infinity.
///
/// Non-finite results are fatal to the calculation that produced them and
/// must never be clamped or displayed.
pub(crate) fn ensure_finite(value: f64, context: &str) -> DomainResult<Money> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(DomainError::arithmetic(format!(
            "{context} produced a non-finite amount"
        )))
    }
}

/// Where the currency symbol is rendered relative to the amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolPosition {
    Before,
    After,
}

/// Display configuration for a currency.
///
/// Governs formatting only — stored math never rounds to `decimal_places`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Currency {
    pub symbol: String,
    pub symbol_position: SymbolPosition,
    pub decimal_places: u32,
    pub is_default: bool,
}

impl ValueObject for Currency {}

/// Render an amount fixed to the currency's decimal places, symbol placed per
/// its position.
///
/// Deterministic: same `(amount, currency)` pair, same string. No grouping,
/// no locale state.
pub fn format_money(amount: Money, currency: &Currency) -> String {
    let fixed = format!("{amount:.prec$}", prec = currency.decimal_places as usize);
    match currency.symbol_position {
        SymbolPosition::Before => format!("{} {}", currency.symbol, fixed),
        SymbolPosition::After => format!("{} {}", fixed, currency.symbol),
    }
}
