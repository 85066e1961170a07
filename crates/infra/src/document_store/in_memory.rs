use std::collections::BTreeMap;
use std::fmt::Display;
use std::marker::PhantomData;
use std::sync::RwLock;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;

use skuforge_core::ExpectedVersion;

use super::r#trait::{DocumentStore, Page, PageRequest, StoreError, Stored};

#[derive(Debug, Clone)]
struct Entry {
    version: u64,
    document: JsonValue,
}

/// In-memory document store for tests/dev.
///
/// Documents are kept serialized, so every read yields a fresh value and
/// nothing the caller holds aliases stored state.
#[derive(Debug)]
pub struct InMemoryDocumentStore<K, V> {
    documents: RwLock<BTreeMap<K, Entry>>,
    _value: PhantomData<fn() -> V>,
}

impl<K, V> InMemoryDocumentStore<K, V> {
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(BTreeMap::new()),
            _value: PhantomData,
        }
    }
}

impl<K, V> Default for InMemoryDocumentStore<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> InMemoryDocumentStore<K, V>
where
    V: DeserializeOwned,
{
    fn decode(entry: &Entry) -> Result<Stored<V>, StoreError> {
        Ok(Stored {
            version: entry.version,
            value: serde_json::from_value(entry.document.clone())?,
        })
    }
}

impl<K, V> DocumentStore<K, V> for InMemoryDocumentStore<K, V>
where
    K: Ord + Clone + Display + Send + Sync,
    V: Serialize + DeserializeOwned,
{
    fn get(&self, key: &K) -> Result<Option<Stored<V>>, StoreError> {
        let documents = self.documents.read().map_err(|_| StoreError::Poisoned)?;
        documents.get(key).map(Self::decode).transpose()
    }

    fn put(&self, key: K, value: V, expected: ExpectedVersion) -> Result<u64, StoreError> {
        let document = serde_json::to_value(&value)?;
        // Non-finite floats encode as null; refuse documents that cannot be read back.
        serde_json::from_value::<V>(document.clone())?;

        let mut documents = self.documents.write().map_err(|_| StoreError::Poisoned)?;
        let current = documents.get(&key).map(|e| e.version).unwrap_or(0);

        if !expected.matches(current) {
            return Err(StoreError::Concurrency {
                key: key.to_string(),
                expected,
                actual: current,
            });
        }

        let version = current + 1;
        documents.insert(key, Entry { version, document });
        Ok(version)
    }

    fn exists(&self, key: &K) -> Result<bool, StoreError> {
        let documents = self.documents.read().map_err(|_| StoreError::Poisoned)?;
        Ok(documents.contains_key(key))
    }

    fn delete(&self, key: &K) -> Result<bool, StoreError> {
        let mut documents = self.documents.write().map_err(|_| StoreError::Poisoned)?;
        Ok(documents.remove(key).is_some())
    }

    fn delete_where(&self, predicate: &dyn Fn(&V) -> bool) -> Result<usize, StoreError> {
        let mut documents = self.documents.write().map_err(|_| StoreError::Poisoned)?;

        let mut doomed = Vec::new();
        for (key, entry) in documents.iter() {
            if predicate(&Self::decode(entry)?.value) {
                doomed.push(key.clone());
            }
        }
        for key in &doomed {
            documents.remove(key);
        }
        Ok(doomed.len())
    }

    fn scan(
        &self,
        predicate: &dyn Fn(&V) -> bool,
        page: PageRequest,
    ) -> Result<Page<Stored<V>>, StoreError> {
        let documents = self.documents.read().map_err(|_| StoreError::Poisoned)?;

        let mut total = 0;
        let mut items = Vec::new();
        for entry in documents.values() {
            let stored = Self::decode(entry)?;
            if !predicate(&stored.value) {
                continue;
            }
            if total >= page.offset && items.len() < page.limit {
                items.push(stored);
            }
            total += 1;
        }

        Ok(Page {
            items,
            total,
            offset: page.offset,
            limit: page.limit,
        })
    }
}
