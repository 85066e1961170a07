//! Variant attribute resolution.
//!
//! Turns a caller-proposed attribute map into the minimal, schema-consistent
//! map stored on a variant:
//!
//! 1. Normalize every proposed key (trim, lower-case), detecting collisions.
//! 2. For each normalized pair: reject nulls, reject keys absent from the
//!    schema, reject values the declared type does not accept, then stage the
//!    value when it is a variant option or overrides the schema default.
//! 3. Check that every required definition is either staged or defaulted.
//!
//! A base attribute equal to its default is never stored, so changing a
//! product-level default is visible on every variant that did not override it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::attribute_type::AttributeValue;
use crate::definition::normalize_key;
use crate::error::{AttributeRejection, InvalidVariantAttributesError};
use crate::schema::ProductSchema;

/// Raw caller input: arbitrary keys, values possibly null.
///
/// Sorted by raw key, which makes both error reporting and collision handling
/// deterministic.
pub type ProposedAttributes = BTreeMap<String, Option<AttributeValue>>;

/// Parse a JSON object into proposed attributes.
pub fn proposed_from_json(
    value: &JsonValue,
) -> Result<ProposedAttributes, InvalidVariantAttributesError> {
    let object = match value {
        JsonValue::Null => return Ok(ProposedAttributes::new()),
        JsonValue::Object(object) => object,
        other => {
            return Err(InvalidVariantAttributesError::new(
                "",
                AttributeRejection::unsupported(format!("attributes must be an object, got {other}")),
            ));
        }
    };

    object
        .iter()
        .map(|(key, raw)| {
            AttributeValue::from_json(raw)
                .map(|value| (key.clone(), value))
                .map_err(|reason| InvalidVariantAttributesError::new(normalize_key(key), reason))
        })
        .collect()
}

/// What to do when two proposed keys normalize to the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeyCollisionPolicy {
    /// Fail with [`AttributeRejection::DuplicateNormalizedKey`].
    #[default]
    Reject,
    /// Keep the value of the lexicographically greatest raw key.
    LastWins,
}

impl core::str::FromStr for KeyCollisionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(KeyCollisionPolicy::Reject),
            "last-wins" | "last_wins" => Ok(KeyCollisionPolicy::LastWins),
            other => Err(format!(
                "unknown key collision policy '{other}' (expected 'reject' or 'last-wins')"
            )),
        }
    }
}

/// The persisted attribute map of a variant.
///
/// Every key is normalized and defined by the owning product's schema; every
/// value has passed its definition's type check.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResolvedAttributes(BTreeMap<String, AttributeValue>);

impl ResolvedAttributes {
    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &AttributeValue)> {
        self.0.iter()
    }

    pub fn into_inner(self) -> BTreeMap<String, AttributeValue> {
        self.0
    }

    /// Feed a resolved map back in as a proposal (used for re-resolution).
    pub fn to_proposed(&self) -> ProposedAttributes {
        self.0
            .iter()
            .map(|(k, v)| (k.clone(), Some(v.clone())))
            .collect()
    }
}

/// Stateless resolver; safe to share across threads and call concurrently.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VariantAttributeResolver {
    collision_policy: KeyCollisionPolicy,
}

impl VariantAttributeResolver {
    pub fn new(collision_policy: KeyCollisionPolicy) -> Self {
        Self { collision_policy }
    }

    pub fn resolve(
        &self,
        schema: &ProductSchema,
        proposed: &ProposedAttributes,
    ) -> Result<ResolvedAttributes, InvalidVariantAttributesError> {
        let normalized = self.normalize(proposed)?;

        let mut staged = BTreeMap::new();
        for (key, value) in normalized {
            let Some(value) = value else {
                return Err(InvalidVariantAttributesError::new(key, AttributeRejection::NullValue));
            };

            let Some(definition) = schema.lookup(&key) else {
                return Err(InvalidVariantAttributesError::new(key, AttributeRejection::UnknownKey));
            };

            if !definition.accepts(value) {
                return Err(InvalidVariantAttributesError::new(
                    key,
                    AttributeRejection::TypeMismatch {
                        expected: definition.attribute_type(),
                        value: value.clone(),
                    },
                ));
            }

            let is_default = definition
                .default_value()
                .is_some_and(|default| default.same_value(value));
            if definition.is_variant_option() || !is_default {
                staged.insert(key, value.clone());
            }
        }

        for definition in schema.required() {
            if !staged.contains_key(definition.key()) && definition.default_value().is_none() {
                return Err(InvalidVariantAttributesError::new(
                    definition.key(),
                    AttributeRejection::MissingRequired,
                ));
            }
        }

        Ok(ResolvedAttributes(staged))
    }

    fn normalize<'a>(
        &self,
        proposed: &'a ProposedAttributes,
    ) -> Result<BTreeMap<String, &'a Option<AttributeValue>>, InvalidVariantAttributesError> {
        let mut normalized: BTreeMap<String, (&'a str, &'a Option<AttributeValue>)> = BTreeMap::new();
        for (raw_key, value) in proposed {
            let key = normalize_key(raw_key);
            if let Some((first, _)) = normalized.get(&key) {
                if self.collision_policy == KeyCollisionPolicy::Reject {
                    return Err(InvalidVariantAttributesError::new(
                        key,
                        AttributeRejection::DuplicateNormalizedKey {
                            first: first.to_string(),
                            second: raw_key.clone(),
                        },
                    ));
                }
            }
            normalized.insert(key, (raw_key.as_str(), value));
        }
        Ok(normalized.into_iter().map(|(k, (_, v))| (k, v)).collect())
    }
}
