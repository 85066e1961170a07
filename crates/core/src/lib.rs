//! `skuforge-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives shared by the catalog engine
//! and its infrastructure (no IO, no logging).

pub mod entity;
pub mod error;
pub mod id;
pub mod value_object;
pub mod version;

pub use entity::{Entity, EntityMetadata};
pub use error::{DomainError, DomainResult};
pub use id::{ProductId, VariantId};
pub use value_object::ValueObject;
pub use version::{ExpectedVersion, Versioned};
