//! Value object trait: equality by value, not identity.
//!
//! Attribute values, attribute definitions, product schemas and money amounts
//! are all value objects: they are built once, validated at construction and
//! never mutated afterwards.

/// Marker trait for value objects.
///
/// ## Value Object vs Entity
///
/// - **Value Object**: no identity; `Money { amount_minor: 1999, currency: "EUR" }`
///   equals any other money value with the same fields.
/// - **Entity**: has identity; two `Variant`s with the same `VariantId` are the
///   same variant even when their stock differs.
///
/// ## Immutability
///
/// To "modify" a value object, construct a new one. Types implementing this
/// trait expose no `&mut self` methods, so a `ProductSchema` shared between
/// concurrent resolutions needs no locking.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq)]
/// struct Dimensions { width_mm: u32, height_mm: u32 }
///
/// impl ValueObject for Dimensions {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
