//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects have no identity of their own; two instances with the same
/// attribute values are interchangeable. An order line item is the canonical
/// example here: it only exists as part of the order that owns it.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
