//! Line items and labor charges entered during active work.

use serde::{Deserialize, Serialize};

use fieldbill_core::{DomainError, DomainResult, ValueObject};

use crate::money::{Money, ensure_finite};

/// What a line item bills for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineItemKind {
    Material,
    Service,
    Other,
}

/// One billed material/service line: quantity at a unit price.
///
/// Immutable once created; a work order owns an ordered sequence of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub description: String,
    pub quantity: f64,
    pub unit_price: Money,
    pub kind: LineItemKind,
}

impl LineItem {
    /// `quantity × unit_price`, rejecting negative operands.
    pub fn line_total(&self) -> DomainResult<Money> {
        if self.quantity < 0.0 {
            return Err(DomainError::validation("line item quantity must not be negative"));
        }
        if self.unit_price < 0.0 {
            return Err(DomainError::validation(
                "line item unit price must not be negative",
            ));
        }
        ensure_finite(self.quantity * self.unit_price, "line total")
    }
}

impl ValueObject for LineItem {}

/// Labor billed on a work order: hours at an hourly rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaborCharge {
    pub hours: f64,
    pub rate_per_hour: Money,
}

impl LaborCharge {
    /// A zero-hours charge, for work orders billed on materials alone.
    pub fn none() -> Self {
        Self {
            hours: 0.0,
            rate_per_hour: 0.0,
        }
    }
}

impl ValueObject for LaborCharge {}
