use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use skuforge_core::{DomainError, Entity, EntityMetadata, ProductId};

use crate::definition::AttributeDefinitionRecord;
use crate::error::CatalogResult;
use crate::schema::ProductSchema;

/// Input for creating a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub brand_id: String,
    pub category_ids: Vec<String>,
    #[serde(default)]
    pub attribute_definitions: Vec<AttributeDefinitionRecord>,
}

/// Base data of a product; everything except its schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDetails {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub brand_id: String,
    pub category_ids: Vec<String>,
}

/// Entity: Product (owner of an immutable attribute schema).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    metadata: EntityMetadata<ProductId>,
    name: String,
    description: String,
    brand_id: String,
    category_ids: Vec<String>,
    schema: ProductSchema,
}

impl Product {
    /// Validate `new` and build the product with its schema.
    pub fn create(id: ProductId, new: NewProduct, now: DateTime<Utc>) -> CatalogResult<Self> {
        let details = ProductDetails {
            name: new.name,
            description: new.description,
            brand_id: new.brand_id,
            category_ids: new.category_ids,
        };
        let (name, description, brand_id, category_ids) = validate_details(details)?;
        let schema = ProductSchema::from_records(new.attribute_definitions)?;

        Ok(Self {
            metadata: EntityMetadata::new(id, now),
            name,
            description,
            brand_id,
            category_ids,
            schema,
        })
    }

    /// New product value with replaced base data; the schema is carried over.
    pub fn with_details(&self, details: ProductDetails, now: DateTime<Utc>) -> CatalogResult<Self> {
        let (name, description, brand_id, category_ids) = validate_details(details)?;
        Ok(Self {
            metadata: self.metadata.touched(now),
            name,
            description,
            brand_id,
            category_ids,
            schema: self.schema.clone(),
        })
    }

    pub fn id_typed(&self) -> ProductId {
        self.metadata.id
    }

    pub fn metadata(&self) -> &EntityMetadata<ProductId> {
        &self.metadata
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn brand_id(&self) -> &str {
        &self.brand_id
    }

    pub fn category_ids(&self) -> &[String] {
        &self.category_ids
    }

    pub fn schema(&self) -> &ProductSchema {
        &self.schema
    }

    /// Case-insensitive substring match on the product name.
    pub fn name_contains(&self, needle: &str) -> bool {
        self.name
            .to_lowercase()
            .contains(&needle.trim().to_lowercase())
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.metadata.id
    }
}

fn validate_details(
    details: ProductDetails,
) -> Result<(String, String, String, Vec<String>), DomainError> {
    let name = details.name.trim();
    if name.is_empty() {
        return Err(DomainError::validation("name cannot be empty"));
    }

    let brand_id = details.brand_id.trim();
    if brand_id.is_empty() {
        return Err(DomainError::validation("brand id cannot be empty"));
    }

    if details.category_ids.is_empty() {
        return Err(DomainError::validation("product must belong to at least one category"));
    }
    let mut category_ids: Vec<String> = Vec::with_capacity(details.category_ids.len());
    for raw in &details.category_ids {
        let id = raw.trim();
        if id.is_empty() {
            return Err(DomainError::validation("category id cannot be empty"));
        }
        if !category_ids.iter().any(|existing| existing == id) {
            category_ids.push(id.to_string());
        }
    }

    let description = details.description.unwrap_or_default();

    Ok((
        name.to_string(),
        description,
        brand_id.to_string(),
        category_ids,
    ))
}
