//! `fieldbill-billing` — invoice billing and payment reconciliation rules.
//!
//! Pure, synchronous calculation functions over work-order line items, labor
//! charges and payment records. No IO, no shared state: every function is a
//! deterministic map from inputs to a result and may be called concurrently
//! from any number of screens without coordination.

pub mod calculator;
pub mod line_item;
pub mod money;
pub mod payment;

pub use calculator::{
    InvoiceTotals, aggregate_payments, balance_due, invoice_totals, is_fully_paid, labor_total,
    materials_subtotal, validate_payment_submission,
};
pub use line_item::{LaborCharge, LineItem, LineItemKind};
pub use money::{Currency, Money, SymbolPosition, format_money};
pub use payment::{Payment, PaymentMethod};
