//! Payment records applied against an invoice.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fieldbill_core::ValueObject;

use crate::money::Money;

/// How a payment was made.
///
/// Serialized in the backend's SCREAMING_SNAKE_CASE wire form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Cash,
    /// Regional electronic payment; requires a transaction reference number.
    BenefitPay,
    Card,
    BankTransfer,
    Cheque,
    Online,
}

impl PaymentMethod {
    /// Whether this method requires a transaction reference number.
    pub fn requires_reference(self) -> bool {
        matches!(self, PaymentMethod::BenefitPay)
    }
}

/// A recorded payment.
///
/// Immutable once recorded; an invoice owns an append-only, chronologically
/// ordered sequence of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub amount: Money,
    pub method: PaymentMethod,
    pub reference_number: Option<String>,
    pub notes: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl ValueObject for Payment {}
