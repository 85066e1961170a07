//! Catalog error taxonomy.
//!
//! - [`SchemaDefinitionError`]: malformed schema at construction time. Never
//!   recoverable; the product creation is rejected.
//! - [`InvalidVariantAttributesError`]: proposed variant attributes failed
//!   resolution. Always caller-fixable, never retried.
//!
//! Optimistic concurrency conflicts are detected by the store and surface from
//! the infra crate.

use thiserror::Error;

use skuforge_core::DomainError;

use crate::attribute_type::{AttributeType, AttributeValue};

pub type CatalogResult<T> = Result<T, CatalogError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SchemaDefinitionError {
    #[error("attribute key cannot be blank")]
    BlankKey,

    #[error("attribute '{key}': label cannot be blank")]
    BlankLabel { key: String },

    #[error("attribute '{key}': type is required")]
    MissingType { key: String },

    #[error("attribute '{key}': default value {value} is not a valid {expected}")]
    InvalidDefault {
        key: String,
        expected: AttributeType,
        value: AttributeValue,
    },

    #[error("duplicate attribute key '{key}'")]
    DuplicateKey { key: String },
}

/// Why a single proposed attribute was rejected.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AttributeRejection {
    #[error("value cannot be null")]
    NullValue,

    #[error("key not defined in schema")]
    UnknownKey,

    #[error("value {value} not valid for declared type {expected}")]
    TypeMismatch {
        expected: AttributeType,
        value: AttributeValue,
    },

    #[error("required attribute missing")]
    MissingRequired,

    #[error("keys '{first}' and '{second}' normalize to the same key")]
    DuplicateNormalizedKey { first: String, second: String },

    #[error("unsupported value: {found}")]
    UnsupportedValue { found: String },
}

impl AttributeRejection {
    pub fn unsupported(found: impl Into<String>) -> Self {
        Self::UnsupportedValue {
            found: found.into(),
        }
    }
}

/// A proposed variant attribute map failed resolution against its schema.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("invalid variant attribute '{key}': {reason}")]
pub struct InvalidVariantAttributesError {
    /// Offending key (normalized when normalization succeeded).
    pub key: String,
    pub reason: AttributeRejection,
}

impl InvalidVariantAttributesError {
    pub fn new(key: impl Into<String>, reason: AttributeRejection) -> Self {
        Self {
            key: key.into(),
            reason,
        }
    }
}

/// Any failure raised by the catalog domain.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CatalogError {
    #[error(transparent)]
    Schema(#[from] SchemaDefinitionError),

    #[error(transparent)]
    InvalidAttributes(#[from] InvalidVariantAttributesError),

    #[error(transparent)]
    Domain(#[from] DomainError),
}
