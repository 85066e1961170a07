//! Catalog domain module: attribute schemas and variant resolution.
//!
//! This crate contains the schema-driven validation engine for product
//! variants, implemented purely as deterministic domain logic (no IO, no
//! HTTP, no storage, no logging).
//!
//! - [`AttributeType`] classifies [`AttributeValue`]s.
//! - [`AttributeDefinition`] is one immutable schema slot.
//! - [`ProductSchema`] is the ordered, key-unique set of definitions.
//! - [`VariantAttributeResolver`] turns a proposed attribute map into the
//!   minimal map persisted on a [`Variant`].

pub mod attribute_type;
pub mod definition;
pub mod error;
pub mod money;
pub mod product;
pub mod resolver;
pub mod schema;
pub mod taxonomy;
pub mod variant;

pub use attribute_type::{AttributeType, AttributeValue};
pub use definition::{AttributeDefinition, AttributeDefinitionRecord, normalize_key};
pub use error::{
    AttributeRejection, CatalogError, CatalogResult, InvalidVariantAttributesError,
    SchemaDefinitionError,
};
pub use money::Money;
pub use product::{NewProduct, Product, ProductDetails};
pub use resolver::{
    KeyCollisionPolicy, ProposedAttributes, ResolvedAttributes, VariantAttributeResolver,
};
pub use schema::ProductSchema;
pub use taxonomy::{Brand, Category, NewBrand, NewCategory};
pub use variant::{NewVariant, Variant, VariantUpdate};
