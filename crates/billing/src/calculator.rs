//! The billing calculator: deterministic totals and payment reconciliation.
//!
//! All functions here are pure. Validation failures surface before any caller
//! side effect; nothing is swallowed or retried.

use serde::{Deserialize, Serialize};

use fieldbill_core::{DomainError, DomainResult, ValueObject};

use crate::line_item::{LaborCharge, LineItem};
use crate::money::{Money, ensure_finite};
use crate::payment::{Payment, PaymentMethod};

/// Derived invoice amounts. Never stored independently of the inputs that
/// produced them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    pub materials_subtotal: Money,
    pub labor_total: Money,
    pub subtotal: Money,
    pub tax_rate_percent: f64,
    pub tax_amount: Money,
    pub discount: Money,
    pub total: Money,
}

impl ValueObject for InvoiceTotals {}

/// Sum of `quantity × unit_price` over all items; `0` for an empty sequence.
///
/// Rejects any negative quantity or unit price with `Validation`.
pub fn materials_subtotal(items: &[LineItem]) -> DomainResult<Money> {
    let mut sum: f64 = 0.0;
    for item in items {
        sum += item.line_total()?;
    }
    ensure_finite(sum, "materials subtotal")
}

/// `hours × rate_per_hour`, rejecting negative operands.
pub fn labor_total(charge: &LaborCharge) -> DomainResult<Money> {
    if charge.hours < 0.0 {
        return Err(DomainError::validation("labor hours must not be negative"));
    }
    if charge.rate_per_hour < 0.0 {
        return Err(DomainError::validation("labor rate must not be negative"));
    }
    ensure_finite(charge.hours * charge.rate_per_hour, "labor total")
}

/// Combine subtotals, tax and discount into the final invoice amounts.
///
/// A discount exceeding `subtotal + tax_amount` is accepted and the total
/// clamps to zero rather than going negative; callers that want to warn the
/// user about an oversized discount do so separately.
pub fn invoice_totals(
    materials_subtotal: Money,
    labor_total: Money,
    tax_rate_percent: f64,
    discount: Money,
) -> DomainResult<InvoiceTotals> {
    if tax_rate_percent < 0.0 {
        return Err(DomainError::validation("tax rate must not be negative"));
    }
    if discount < 0.0 {
        return Err(DomainError::validation("discount must not be negative"));
    }

    let subtotal = ensure_finite(materials_subtotal + labor_total, "subtotal")?;
    let tax_amount = ensure_finite(subtotal * tax_rate_percent / 100.0, "tax amount")?;
    let total = ensure_finite(subtotal + tax_amount - discount, "total")?.max(0.0);

    Ok(InvoiceTotals {
        materials_subtotal,
        labor_total,
        subtotal,
        tax_rate_percent,
        tax_amount,
        discount,
        total,
    })
}

/// Sum of payment amounts over the sequence, in any order.
///
/// Rejects any non-positive amount with `Validation`.
pub fn aggregate_payments(payments: &[Payment]) -> DomainResult<Money> {
    let mut sum: f64 = 0.0;
    for payment in payments {
        if !(payment.amount > 0.0) {
            return Err(DomainError::validation("payment amount must be positive"));
        }
        sum += payment.amount;
    }
    ensure_finite(sum, "aggregated payments")
}

/// `max(0, total − paid)`. Overpayment floors at zero; excess is not modeled
/// as credit.
pub fn balance_due(total: Money, paid: Money) -> Money {
    (total - paid).max(0.0)
}

/// `paid >= total`.
pub fn is_fully_paid(total: Money, paid: Money) -> bool {
    paid >= total
}

/// Validate a payment the user is about to submit.
///
/// Fails if the amount is not positive, or if the method requires a reference
/// number and none was supplied. Paying more than the remaining balance is
/// accepted: the balance simply floors at zero.
pub fn validate_payment_submission(
    method: PaymentMethod,
    amount: Money,
    reference_number: Option<&str>,
    _balance_due: Money,
) -> DomainResult<()> {
    if !(amount > 0.0) {
        return Err(DomainError::validation("payment amount must be positive"));
    }
    if method.requires_reference()
        && reference_number.map_or(true, |r| r.trim().is_empty())
    {
        return Err(DomainError::validation(
            "a reference number is required for BenefitPay payments",
        ));
    }
    Ok(())
}
