//! Ordered, key-unique collection of attribute definitions owned by a product.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use skuforge_core::ValueObject;

use crate::definition::{AttributeDefinition, AttributeDefinitionRecord};
use crate::error::SchemaDefinitionError;

/// A product's attribute schema.
///
/// Built once and never mutated; a different schema is a different value.
/// Insertion order is preserved for stable responses and indexed by
/// normalized key for lookups.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(
    try_from = "Vec<AttributeDefinitionRecord>",
    into = "Vec<AttributeDefinitionRecord>"
)]
pub struct ProductSchema {
    definitions: Vec<AttributeDefinition>,
    index: HashMap<String, usize>,
}

impl ProductSchema {
    /// Schema with no attributes.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_definitions(
        definitions: impl IntoIterator<Item = AttributeDefinition>,
    ) -> Result<Self, SchemaDefinitionError> {
        let mut schema = Self::default();
        for definition in definitions {
            if schema.index.contains_key(definition.key()) {
                return Err(SchemaDefinitionError::DuplicateKey {
                    key: definition.key().to_string(),
                });
            }
            schema
                .index
                .insert(definition.key().to_string(), schema.definitions.len());
            schema.definitions.push(definition);
        }
        Ok(schema)
    }

    /// Validate wire records in order; the first failing record wins.
    pub fn from_records(
        records: impl IntoIterator<Item = AttributeDefinitionRecord>,
    ) -> Result<Self, SchemaDefinitionError> {
        let definitions = records
            .into_iter()
            .map(AttributeDefinition::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Self::with_definitions(definitions)
    }

    /// Look up a definition by its *normalized* key.
    pub fn lookup(&self, normalized_key: &str) -> Option<&AttributeDefinition> {
        self.index
            .get(normalized_key)
            .map(|&position| &self.definitions[position])
    }

    pub fn definitions(&self) -> &[AttributeDefinition] {
        &self.definitions
    }

    pub fn required(&self) -> impl Iterator<Item = &AttributeDefinition> {
        self.definitions.iter().filter(|d| d.is_required())
    }

    pub fn variant_options(&self) -> impl Iterator<Item = &AttributeDefinition> {
        self.definitions.iter().filter(|d| d.is_variant_option())
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn to_records(&self) -> Vec<AttributeDefinitionRecord> {
        self.definitions.iter().map(AttributeDefinition::to_record).collect()
    }
}

// Definitions compare by key only; schemas compare every field.
impl PartialEq for ProductSchema {
    fn eq(&self, other: &Self) -> bool {
        self.to_records() == other.to_records()
    }
}

impl ValueObject for ProductSchema {}

impl TryFrom<Vec<AttributeDefinitionRecord>> for ProductSchema {
    type Error = SchemaDefinitionError;

    fn try_from(records: Vec<AttributeDefinitionRecord>) -> Result<Self, Self::Error> {
        Self::from_records(records)
    }
}

impl From<ProductSchema> for Vec<AttributeDefinitionRecord> {
    fn from(schema: ProductSchema) -> Self {
        schema.to_records()
    }
}
