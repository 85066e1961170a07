//! Infrastructure layer: document storage, catalog persistence, workflows, config.

pub mod catalog_service;
pub mod config;
pub mod document_store;
pub mod repository;

pub use catalog_service::{CatalogService, ServiceError, ServiceResult};
pub use config::{CatalogConfig, PageQuery};
pub use document_store::{
    DocumentStore, InMemoryDocumentStore, Page, PageRequest, StoreError, Stored,
};
pub use repository::{CatalogRepository, InMemoryCatalogRepository, StoreCatalogRepository};
