//! Entity trait: identity + continuity across state changes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}

/// Identity and timestamps shared by every persisted entity.
///
/// Embedded by value in each entity struct rather than inherited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMetadata<Id> {
    pub id: Id,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<Id> EntityMetadata<Id> {
    pub fn new(id: Id, now: DateTime<Utc>) -> Self {
        Self {
            id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Same identity, `updated_at` moved to `now` (never before `created_at`).
    pub fn touched(&self, now: DateTime<Utc>) -> Self
    where
        Id: Clone,
    {
        Self {
            id: self.id.clone(),
            created_at: self.created_at,
            updated_at: now.max(self.created_at),
        }
    }
}
