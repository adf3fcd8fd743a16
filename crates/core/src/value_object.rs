//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**: two line items
/// with the same description, quantity and unit price are the same value,
/// whereas two work orders with the same contents are still distinct
/// entities. To "modify" a value object, build a new one.
///
/// The supertraits keep value objects cheap to copy, comparable and
/// debuggable. `Eq` is deliberately not required: monetary values in this
/// domain are floating-point.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
