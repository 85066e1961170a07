//! Keyed document storage boundary.
//!
//! Products and variants are stored as whole documents with a version counter
//! used for optimistic concurrency. No storage technology is assumed here.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemoryDocumentStore;
pub use r#trait::{DocumentStore, Page, PageRequest, StoreError, Stored};
