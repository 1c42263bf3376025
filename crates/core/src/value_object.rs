//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Totals, document numbers and line items are compared by their attribute
/// values; two `DocumentTotals` with the same net/VAT/total are the same value
/// no matter which document produced them. Value objects are immutable: to
/// "modify" one, compute a new one.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
