use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use skuforge_core::{DomainError, Entity, EntityMetadata, ProductId, VariantId, Versioned};

use crate::attribute_type::AttributeValue;
use crate::error::CatalogResult;
use crate::money::Money;
use crate::product::Product;
use crate::resolver::{ProposedAttributes, ResolvedAttributes, VariantAttributeResolver};
use crate::schema::ProductSchema;

/// Input for creating a variant of a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewVariant {
    pub price: Money,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub attributes: ProposedAttributes,
}

/// Full replacement of a variant's mutable data.
///
/// `attributes` is the complete proposal; the stored map is recomputed from it,
/// never patched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantUpdate {
    pub price: Money,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub images: Vec<String>,
    /// `None` means available.
    #[serde(default)]
    pub available: Option<bool>,
    #[serde(default)]
    pub attributes: ProposedAttributes,
}

/// Entity: a sellable variant of a product.
///
/// Version `0` is provisional (not yet stored); the store assigns `1` on the
/// first write and increments on every accepted update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    metadata: EntityMetadata<VariantId>,
    product_id: ProductId,
    price: Money,
    stock: u32,
    available: bool,
    images: Vec<String>,
    attributes: ResolvedAttributes,
    version: u64,
}

impl Variant {
    /// Resolve `new.attributes` against the product schema and build an
    /// unpersisted variant.
    pub fn provisional(
        id: VariantId,
        product: &Product,
        new: NewVariant,
        resolver: &VariantAttributeResolver,
        now: DateTime<Utc>,
    ) -> CatalogResult<Self> {
        let attributes = resolver.resolve(product.schema(), &new.attributes)?;
        let images = validate_images(new.images)?;

        Ok(Self {
            metadata: EntityMetadata::new(id, now),
            product_id: product.id_typed(),
            price: new.price,
            stock: new.stock,
            available: true,
            images,
            attributes,
            version: 0,
        })
    }

    /// Updated variant value; the attribute map is recomputed from scratch.
    pub fn revise(
        &self,
        product: &Product,
        update: VariantUpdate,
        resolver: &VariantAttributeResolver,
        now: DateTime<Utc>,
    ) -> CatalogResult<Self> {
        if product.id_typed() != self.product_id {
            return Err(DomainError::validation(format!(
                "variant {} belongs to product {}, not {}",
                self.metadata.id,
                self.product_id,
                product.id_typed()
            ))
            .into());
        }

        let attributes = resolver.resolve(product.schema(), &update.attributes)?;
        let images = validate_images(update.images)?;

        Ok(Self {
            metadata: self.metadata.touched(now),
            product_id: self.product_id,
            price: update.price,
            stock: update.stock,
            available: update.available.unwrap_or(true),
            images,
            attributes,
            version: self.version,
        })
    }

    /// Same variant stamped with the version the store assigned.
    pub fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    pub fn is_persisted(&self) -> bool {
        self.version > 0
    }

    pub fn id_typed(&self) -> VariantId {
        self.metadata.id
    }

    pub fn metadata(&self) -> &EntityMetadata<VariantId> {
        &self.metadata
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn price(&self) -> &Money {
        &self.price
    }

    pub fn stock(&self) -> u32 {
        self.stock
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    pub fn images(&self) -> &[String] {
        &self.images
    }

    /// Attributes physically stored on this variant.
    pub fn attributes(&self) -> &ResolvedAttributes {
        &self.attributes
    }

    /// Value of `key` as seen by readers: the stored value, else the schema
    /// default for base attributes and for required attributes satisfied by
    /// their default. Optional variant options have no implicit value.
    pub fn effective_attribute<'a>(
        &'a self,
        schema: &'a ProductSchema,
        normalized_key: &str,
    ) -> Option<&'a AttributeValue> {
        if let Some(value) = self.attributes.get(normalized_key) {
            return Some(value);
        }
        let definition = schema.lookup(normalized_key)?;
        if definition.is_variant_option() && !definition.is_required() {
            return None;
        }
        definition.default_value()
    }

    /// Every effective attribute, keyed by normalized key.
    pub fn effective_attributes(&self, schema: &ProductSchema) -> BTreeMap<String, AttributeValue> {
        schema
            .definitions()
            .iter()
            .filter_map(|definition| {
                self.effective_attribute(schema, definition.key())
                    .map(|value| (definition.key().to_string(), value.clone()))
            })
            .collect()
    }
}

impl Entity for Variant {
    type Id = VariantId;

    fn id(&self) -> &Self::Id {
        &self.metadata.id
    }
}

impl Versioned for Variant {
    fn version(&self) -> u64 {
        self.version
    }
}

fn validate_images(images: Vec<String>) -> Result<Vec<String>, DomainError> {
    images
        .into_iter()
        .map(|image| {
            let trimmed = image.trim();
            if trimmed.is_empty() {
                Err(DomainError::validation("image reference cannot be empty"))
            } else {
                Ok(trimmed.to_string())
            }
        })
        .collect()
}
