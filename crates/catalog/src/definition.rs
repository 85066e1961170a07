//! Schema entries: one declared attribute of a product.

use serde::{Deserialize, Serialize};

use skuforge_core::ValueObject;

use crate::attribute_type::{AttributeType, AttributeValue};
use crate::error::SchemaDefinitionError;

/// Canonical form of an attribute key: trimmed and lower-cased.
pub fn normalize_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Immutable schema slot.
///
/// The `(is_variant_option, is_required)` pair selects one of four behaviours:
///
/// | variant option | required | behaviour |
/// |---|---|---|
/// | yes | yes | caller must supply a value; always persisted |
/// | yes | no  | optional selector; persisted when supplied, no implicit default |
/// | no  | yes | every variant ends up with a value (default or override) |
/// | no  | no  | persisted only when it differs from the default |
///
/// Equality and hashing use the normalized key alone: two definitions with the
/// same key occupy the same schema slot.
#[derive(Debug, Clone)]
pub struct AttributeDefinition {
    key: String,
    label: String,
    attribute_type: AttributeType,
    is_variant_option: bool,
    is_required: bool,
    default_value: Option<AttributeValue>,
}

impl AttributeDefinition {
    pub fn new(
        key: &str,
        label: &str,
        attribute_type: AttributeType,
        is_variant_option: bool,
        is_required: bool,
        default_value: Option<AttributeValue>,
    ) -> Result<Self, SchemaDefinitionError> {
        let key = normalize_key(key);
        if key.is_empty() {
            return Err(SchemaDefinitionError::BlankKey);
        }

        let label = label.trim();
        if label.is_empty() {
            return Err(SchemaDefinitionError::BlankLabel { key });
        }

        if let Some(value) = &default_value {
            if !attribute_type.accepts(value) {
                return Err(SchemaDefinitionError::InvalidDefault {
                    key,
                    expected: attribute_type,
                    value: value.clone(),
                });
            }
        }

        Ok(Self {
            key,
            label: label.to_string(),
            attribute_type,
            is_variant_option,
            is_required,
            default_value,
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn attribute_type(&self) -> AttributeType {
        self.attribute_type
    }

    pub fn is_variant_option(&self) -> bool {
        self.is_variant_option
    }

    pub fn is_required(&self) -> bool {
        self.is_required
    }

    pub fn default_value(&self) -> Option<&AttributeValue> {
        self.default_value.as_ref()
    }

    /// Same predicate the constructor used for the default.
    pub fn accepts(&self, value: &AttributeValue) -> bool {
        self.attribute_type.accepts(value)
    }

    /// Wire form of this definition.
    pub fn to_record(&self) -> AttributeDefinitionRecord {
        AttributeDefinitionRecord {
            key: self.key.clone(),
            label: self.label.clone(),
            attribute_type: Some(self.attribute_type),
            is_variant_option: self.is_variant_option,
            is_required: self.is_required,
            default_value: self.default_value.clone(),
        }
    }
}

impl PartialEq for AttributeDefinition {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for AttributeDefinition {}

impl core::hash::Hash for AttributeDefinition {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl ValueObject for AttributeDefinition {}

/// Wire record for a schema entry, as supplied by callers and returned in
/// responses: `{key, label, type, isVariantOption, isRequired, defaultValue}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeDefinitionRecord {
    pub key: String,
    pub label: String,
    #[serde(rename = "type")]
    pub attribute_type: Option<AttributeType>,
    #[serde(default)]
    pub is_variant_option: bool,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub default_value: Option<AttributeValue>,
}

impl TryFrom<AttributeDefinitionRecord> for AttributeDefinition {
    type Error = SchemaDefinitionError;

    fn try_from(record: AttributeDefinitionRecord) -> Result<Self, Self::Error> {
        let attribute_type = match record.attribute_type {
            Some(t) => t,
            None => {
                let key = normalize_key(&record.key);
                if key.is_empty() {
                    return Err(SchemaDefinitionError::BlankKey);
                }
                return Err(SchemaDefinitionError::MissingType { key });
            }
        };
        AttributeDefinition::new(
            &record.key,
            &record.label,
            attribute_type,
            record.is_variant_option,
            record.is_required,
            record.default_value,
        )
    }
}

impl From<&AttributeDefinition> for AttributeDefinitionRecord {
    fn from(definition: &AttributeDefinition) -> Self {
        definition.to_record()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashSet;

    #[test]
    fn key_is_trimmed_and_lower_cased() {
        let def = AttributeDefinition::new("  Color ", "Color", AttributeType::String, false, false, None)
            .unwrap();
        assert_eq!(def.key(), "color");
        assert_eq!(def.label(), "Color");
    }

    #[test]
    fn blank_key_is_rejected() {
        let err = AttributeDefinition::new("   ", "Color", AttributeType::String, false, false, None)
            .unwrap_err();
        assert_eq!(err, SchemaDefinitionError::BlankKey);
    }

    #[test]
    fn blank_label_is_rejected() {
        let err = AttributeDefinition::new("color", "\t", AttributeType::String, false, false, None)
            .unwrap_err();
        assert_eq!(err, SchemaDefinitionError::BlankLabel { key: "color".into() });
    }

    #[test]
    fn default_must_satisfy_declared_type() {
        let err = AttributeDefinition::new(
            "weight",
            "Weight",
            AttributeType::Double,
            false,
            false,
            Some(AttributeValue::Integer(3)),
        )
        .unwrap_err();
        match err {
            SchemaDefinitionError::InvalidDefault { key, expected, .. } => {
                assert_eq!(key, "weight");
                assert_eq!(expected, AttributeType::Double);
            }
            other => panic!("expected InvalidDefault, got {other:?}"),
        }
    }

    #[test]
    fn blank_string_default_is_rejected() {
        let err = AttributeDefinition::new(
            "material",
            "Material",
            AttributeType::String,
            false,
            true,
            Some(" ".into()),
        )
        .unwrap_err();
        assert!(matches!(err, SchemaDefinitionError::InvalidDefault { .. }));
    }

    #[test]
    fn valid_default_round_trips_through_predicate() {
        let def = AttributeDefinition::new(
            "accent",
            "Accent",
            AttributeType::ColorHex,
            false,
            false,
            Some("#a0b".into()),
        )
        .unwrap();
        let default = def.default_value().unwrap();
        assert!(def.attribute_type().accepts(default));
    }

    #[test]
    fn equality_is_by_key_alone() {
        let a = AttributeDefinition::new("size", "Size", AttributeType::String, true, true, None).unwrap();
        let b = AttributeDefinition::new("SIZE", "Talla", AttributeType::Integer, false, false, None)
            .unwrap();
        assert_eq!(a, b);

        let set: HashSet<_> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn record_without_type_is_rejected() {
        let record: AttributeDefinitionRecord =
            serde_json::from_value(json!({"key": "Size", "label": "Size"})).unwrap();
        let err = AttributeDefinition::try_from(record).unwrap_err();
        assert_eq!(err, SchemaDefinitionError::MissingType { key: "size".into() });
    }

    #[test]
    fn record_uses_camel_case_wire_names() {
        let record: AttributeDefinitionRecord = serde_json::from_value(json!({
            "key": "color",
            "label": "Color",
            "type": "STRING",
            "isVariantOption": false,
            "isRequired": true,
            "defaultValue": "black"
        }))
        .unwrap();
        let def = AttributeDefinition::try_from(record.clone()).unwrap();
        assert!(def.is_required());
        assert!(!def.is_variant_option());
        assert_eq!(def.default_value(), Some(&AttributeValue::from("black")));
        assert_eq!(def.to_record(), record);
    }
}
