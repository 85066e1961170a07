use std::fmt::Display;
use std::sync::Arc;

use thiserror::Error;

use skuforge_core::ExpectedVersion;

/// A document together with the version the store assigned to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Stored<V> {
    pub version: u64,
    pub value: V,
}

/// Offset/limit window over a scan.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub offset: usize,
    pub limit: usize,
}

impl PageRequest {
    pub fn new(offset: usize, limit: usize) -> Self {
        Self { offset, limit }
    }

    pub fn first(limit: usize) -> Self {
        Self { offset: 0, limit }
    }

    /// Clamp `limit` into `1..=max`.
    pub fn clamped(self, max: usize) -> Self {
        Self {
            offset: self.offset,
            limit: self.limit.clamp(1, max.max(1)),
        }
    }
}

/// One window of matching documents plus the total match count.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub offset: usize,
    pub limit: usize,
}

impl<T> Page<T> {
    pub fn has_more(&self) -> bool {
        self.offset + self.items.len() < self.total
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            offset: self.offset,
            limit: self.limit,
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("concurrency conflict on {key}: expected {expected:?}, actual version {actual}")]
    Concurrency {
        key: String,
        expected: ExpectedVersion,
        actual: u64,
    },

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("store lock poisoned")]
    Poisoned,
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        StoreError::Serialization(value.to_string())
    }
}

/// Keyed document storage with per-document optimistic concurrency.
///
/// `put` is a conditional write: it succeeds only when the stored version
/// matches `expected` (absent documents are at version `0`) and returns the
/// newly assigned version. Implementations must make the check and the write
/// a single atomic step.
pub trait DocumentStore<K, V>: Send + Sync
where
    K: Display,
{
    fn get(&self, key: &K) -> Result<Option<Stored<V>>, StoreError>;

    fn put(&self, key: K, value: V, expected: ExpectedVersion) -> Result<u64, StoreError>;

    fn exists(&self, key: &K) -> Result<bool, StoreError>;

    /// Returns whether a document was removed.
    fn delete(&self, key: &K) -> Result<bool, StoreError>;

    /// Remove every document matching `predicate`; returns how many were removed.
    fn delete_where(&self, predicate: &dyn Fn(&V) -> bool) -> Result<usize, StoreError>;

    /// Matching documents in key order, windowed by `page`.
    fn scan(
        &self,
        predicate: &dyn Fn(&V) -> bool,
        page: PageRequest,
    ) -> Result<Page<Stored<V>>, StoreError>;
}

impl<K, V, S> DocumentStore<K, V> for Arc<S>
where
    K: Display,
    S: DocumentStore<K, V> + ?Sized,
{
    fn get(&self, key: &K) -> Result<Option<Stored<V>>, StoreError> {
        (**self).get(key)
    }

    fn put(&self, key: K, value: V, expected: ExpectedVersion) -> Result<u64, StoreError> {
        (**self).put(key, value, expected)
    }

    fn exists(&self, key: &K) -> Result<bool, StoreError> {
        (**self).exists(key)
    }

    fn delete(&self, key: &K) -> Result<bool, StoreError> {
        (**self).delete(key)
    }

    fn delete_where(&self, predicate: &dyn Fn(&V) -> bool) -> Result<usize, StoreError> {
        (**self).delete_where(predicate)
    }

    fn scan(
        &self,
        predicate: &dyn Fn(&V) -> bool,
        page: PageRequest,
    ) -> Result<Page<Stored<V>>, StoreError> {
        (**self).scan(predicate, page)
    }
}
