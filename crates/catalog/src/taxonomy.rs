//! Brands and categories referenced by products.
//!
//! Both are keyed by a caller-chosen identifier (e.g. `"acme"`, `"shirts"`),
//! the same string a product stores in `brand_id` / `category_ids`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use skuforge_core::{DomainError, DomainResult, Entity, EntityMetadata};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBrand {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
}

/// Entity: Brand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brand {
    metadata: EntityMetadata<String>,
    name: String,
    description: Option<String>,
    logo_url: Option<String>,
}

impl Brand {
    pub fn create(new: NewBrand, now: DateTime<Utc>) -> DomainResult<Self> {
        let id = non_blank(&new.id, "brand id")?;
        let name = non_blank(&new.name, "brand name")?;
        Ok(Self {
            metadata: EntityMetadata::new(id, now),
            name,
            description: trimmed(new.description),
            logo_url: trimmed(new.logo_url),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn logo_url(&self) -> Option<&str> {
        self.logo_url.as_deref()
    }
}

impl Entity for Brand {
    type Id = String;

    fn id(&self) -> &Self::Id {
        &self.metadata.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCategory {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Entity: Category (flat; no parent/ancestor tracking).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    metadata: EntityMetadata<String>,
    name: String,
    description: Option<String>,
}

impl Category {
    pub fn create(new: NewCategory, now: DateTime<Utc>) -> DomainResult<Self> {
        let id = non_blank(&new.id, "category id")?;
        let name = non_blank(&new.name, "category name")?;
        Ok(Self {
            metadata: EntityMetadata::new(id, now),
            name,
            description: trimmed(new.description),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl Entity for Category {
    type Id = String;

    fn id(&self) -> &Self::Id {
        &self.metadata.id
    }
}

fn non_blank(raw: &str, what: &str) -> DomainResult<String> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(DomainError::validation(format!("{what} cannot be empty")));
    }
    Ok(value.to_string())
}

fn trimmed(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brand_fields_are_trimmed() {
        let brand = Brand::create(
            NewBrand {
                id: " acme ".to_string(),
                name: " Acme Apparel ".to_string(),
                description: Some("  ".to_string()),
                logo_url: Some(" https://cdn.example/acme.png ".to_string()),
            },
            Utc::now(),
        )
        .unwrap();
        assert_eq!(brand.id(), "acme");
        assert_eq!(brand.name(), "Acme Apparel");
        assert_eq!(brand.description(), None);
        assert_eq!(brand.logo_url(), Some("https://cdn.example/acme.png"));
    }

    #[test]
    fn blank_identifiers_and_names_are_rejected() {
        let blank_id = Brand::create(
            NewBrand {
                id: "  ".to_string(),
                name: "Acme".to_string(),
                description: None,
                logo_url: None,
            },
            Utc::now(),
        );
        assert!(matches!(blank_id, Err(DomainError::Validation(_))));

        let blank_name = Category::create(
            NewCategory {
                id: "shirts".to_string(),
                name: "".to_string(),
                description: None,
            },
            Utc::now(),
        );
        assert!(matches!(blank_name, Err(DomainError::Validation(_))));
    }
}
