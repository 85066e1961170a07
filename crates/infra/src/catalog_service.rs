//! Catalog application workflow.
//!
//! Every write follows the same pipeline:
//!
//! ```text
//! request
//!   ↓
//! 1. Load the owning product (its schema is the resolution context)
//!   ↓
//! 2. Build or revise the entity (pure; attribute resolution happens here)
//!   ↓
//! 3. Conditional write at the version read in step 1
//! ```
//!
//! A version mismatch at step 3 is returned as
//! [`ServiceError::ConcurrencyConflict`]; the service never retries on the
//! caller's behalf.

use std::collections::BTreeMap;

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info, warn};

use skuforge_catalog::{
    AttributeValue, Brand, Category, CatalogError, NewBrand, NewCategory, NewProduct, NewVariant,
    Product, ProductDetails, Variant, VariantAttributeResolver, VariantUpdate,
};
use skuforge_core::{DomainError, Entity, ExpectedVersion, ProductId, VariantId, Versioned};

use crate::config::{CatalogConfig, PageQuery};
use crate::document_store::{Page, StoreError};
use crate::repository::CatalogRepository;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Schema, attribute, or field validation failure.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Stale expected version or an interleaved write; reload and retry.
    #[error("concurrency conflict on {key}: expected {expected:?}, actual version {actual}")]
    ConcurrencyConflict {
        key: String,
        expected: ExpectedVersion,
        actual: u64,
    },

    #[error("storage failure: {0}")]
    Store(StoreError),
}

impl ServiceError {
    fn product_not_found(id: ProductId) -> Self {
        ServiceError::NotFound {
            entity: "product",
            id: id.to_string(),
        }
    }

    fn variant_not_found(id: VariantId) -> Self {
        ServiceError::NotFound {
            entity: "variant",
            id: id.to_string(),
        }
    }

    fn brand_not_found(id: &str) -> Self {
        ServiceError::NotFound {
            entity: "brand",
            id: id.to_string(),
        }
    }

    fn category_not_found(id: &str) -> Self {
        ServiceError::NotFound {
            entity: "category",
            id: id.to_string(),
        }
    }

    /// Creating a key that is already stored is a domain conflict, not a
    /// version race.
    fn already_exists(entity: &str, id: &str, err: StoreError) -> Self {
        match err {
            StoreError::Concurrency { .. } => ServiceError::Catalog(CatalogError::Domain(
                DomainError::conflict(format!("{entity} '{id}' already exists")),
            )),
            other => other.into(),
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Concurrency {
                key,
                expected,
                actual,
            } => ServiceError::ConcurrencyConflict {
                key,
                expected,
                actual,
            },
            other => ServiceError::Store(other),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Product, variant, brand and category workflows over a [`CatalogRepository`].
#[derive(Debug)]
pub struct CatalogService<R> {
    repository: R,
    resolver: VariantAttributeResolver,
    config: CatalogConfig,
}

impl<R> CatalogService<R>
where
    R: CatalogRepository,
{
    pub fn new(repository: R, config: CatalogConfig) -> Self {
        Self {
            repository,
            resolver: VariantAttributeResolver::new(config.key_collision),
            config,
        }
    }

    /// Register a brand; an id that is already taken is a `Conflict`.
    pub fn create_brand(&self, new: NewBrand) -> ServiceResult<Brand> {
        let brand = Brand::create(new, Utc::now()).map_err(CatalogError::from)?;
        self.repository
            .save_brand(&brand, ExpectedVersion::absent())
            .map_err(|e| ServiceError::already_exists("brand", brand.id(), e))?;
        info!(brand_id = %brand.id(), "brand created");
        Ok(brand)
    }

    pub fn list_brands(&self, query: PageQuery) -> ServiceResult<Page<Brand>> {
        Ok(self.repository.list_brands(self.config.page(query))?)
    }

    /// Register a category; an id that is already taken is a `Conflict`.
    pub fn create_category(&self, new: NewCategory) -> ServiceResult<Category> {
        let category = Category::create(new, Utc::now()).map_err(CatalogError::from)?;
        self.repository
            .save_category(&category, ExpectedVersion::absent())
            .map_err(|e| ServiceError::already_exists("category", category.id(), e))?;
        info!(category_id = %category.id(), "category created");
        Ok(category)
    }

    pub fn list_categories(&self, query: PageQuery) -> ServiceResult<Page<Category>> {
        Ok(self.repository.list_categories(self.config.page(query))?)
    }

    /// Create a product together with its mandatory initial variant.
    ///
    /// The brand and every category must already be registered. The initial
    /// variant is resolved before anything is written, so invalid attributes
    /// leave no product behind. If persisting the variant fails the product
    /// is removed again.
    pub fn create_product(
        &self,
        new: NewProduct,
        initial: NewVariant,
    ) -> ServiceResult<(Product, Variant)> {
        let now = Utc::now();
        let product = Product::create(ProductId::new(), new, now).inspect_err(|e| {
            warn!(error = %e, "rejected product");
        })?;
        self.ensure_taxonomy(&product)?;
        let variant = Variant::provisional(VariantId::new(), &product, initial, &self.resolver, now)
            .inspect_err(|e| {
                warn!(product_id = %product.id_typed(), error = %e, "rejected initial variant");
            })?;

        self.repository
            .save_product(&product, ExpectedVersion::absent())?;

        let variant = match self.repository.save_variant(variant, ExpectedVersion::absent()) {
            Ok(variant) => variant,
            Err(e) => {
                warn!(product_id = %product.id_typed(), error = %e, "initial variant not stored; removing product");
                if let Err(rollback) = self.repository.delete_product(product.id_typed()) {
                    warn!(product_id = %product.id_typed(), error = %rollback, "product removal failed");
                }
                return Err(e.into());
            }
        };

        info!(
            product_id = %product.id_typed(),
            variant_id = %variant.id_typed(),
            attributes = product.schema().len(),
            "product created"
        );
        Ok((product, variant))
    }

    /// Replace the product's base data; its schema is never changed.
    pub fn update_product(&self, id: ProductId, details: ProductDetails) -> ServiceResult<Product> {
        let current = self.get_product(id)?;
        let updated = current.with_details(details, Utc::now())?;
        self.ensure_taxonomy(&updated)?;
        self.repository.save_product(&updated, ExpectedVersion::Any)?;
        info!(product_id = %id, "product updated");
        Ok(updated)
    }

    pub fn get_product(&self, id: ProductId) -> ServiceResult<Product> {
        debug!(product_id = %id, "loading product");
        self.repository
            .load_product(id)?
            .ok_or_else(|| ServiceError::product_not_found(id))
    }

    pub fn list_products(&self, query: PageQuery) -> ServiceResult<Page<Product>> {
        Ok(self.repository.list_products(self.config.page(query))?)
    }

    /// Case-insensitive substring search on product names.
    pub fn search_products(&self, name: &str, query: PageQuery) -> ServiceResult<Page<Product>> {
        debug!(query = name, "searching products by name");
        Ok(self
            .repository
            .search_products_by_name(name, self.config.page(query))?)
    }

    pub fn products_by_brand(&self, brand_id: &str, query: PageQuery) -> ServiceResult<Page<Product>> {
        self.ensure_brand(brand_id)?;
        Ok(self
            .repository
            .list_products_by_brand(brand_id, self.config.page(query))?)
    }

    pub fn products_by_category(
        &self,
        category_id: &str,
        query: PageQuery,
    ) -> ServiceResult<Page<Product>> {
        self.ensure_category(category_id)?;
        Ok(self
            .repository
            .list_products_by_category(category_id, self.config.page(query))?)
    }

    /// Delete a product and all of its variants; returns how many variants
    /// were removed.
    ///
    /// The product goes first, so a variant created concurrently either sees
    /// the product gone or is swept by the cascade.
    pub fn delete_product(&self, id: ProductId) -> ServiceResult<usize> {
        if !self.repository.delete_product(id)? {
            return Err(ServiceError::product_not_found(id));
        }
        let removed = self.repository.delete_variants_of_product(id)?;
        info!(product_id = %id, variants_removed = removed, "product deleted");
        Ok(removed)
    }

    pub fn create_variant(&self, product_id: ProductId, new: NewVariant) -> ServiceResult<Variant> {
        let product = self.get_product(product_id)?;
        let variant = Variant::provisional(VariantId::new(), &product, new, &self.resolver, Utc::now())
            .inspect_err(|e| {
                warn!(product_id = %product_id, error = %e, "rejected variant");
            })?;
        debug!(variant_id = %variant.id_typed(), attributes = ?variant.attributes(), "variant attributes resolved");

        let variant = self
            .repository
            .save_variant(variant, ExpectedVersion::absent())?;

        // The product may have been deleted after it was loaded.
        if !self.repository.product_exists(product_id)? {
            warn!(product_id = %product_id, variant_id = %variant.id_typed(), "product deleted during variant creation; removing variant");
            if let Err(rollback) = self.repository.delete_variant(variant.id_typed()) {
                warn!(variant_id = %variant.id_typed(), error = %rollback, "variant removal failed");
            }
            return Err(ServiceError::product_not_found(product_id));
        }

        info!(product_id = %product_id, variant_id = %variant.id_typed(), "variant created");
        Ok(variant)
    }

    /// Replace a variant's data, re-resolving the full proposed attribute map.
    ///
    /// The write is conditional on the version that was read, so a concurrent
    /// update between read and write is reported instead of lost.
    pub fn update_variant(
        &self,
        id: VariantId,
        update: VariantUpdate,
        expected: ExpectedVersion,
    ) -> ServiceResult<Variant> {
        let current = self
            .repository
            .load_variant(id)?
            .ok_or_else(|| ServiceError::variant_not_found(id))?;

        if !expected.matches(current.version()) {
            warn!(variant_id = %id, ?expected, actual = current.version(), "stale variant version");
            return Err(ServiceError::ConcurrencyConflict {
                key: id.to_string(),
                expected,
                actual: current.version(),
            });
        }

        let product = self.get_product(current.product_id())?;
        let revised = current
            .revise(&product, update, &self.resolver, Utc::now())
            .inspect_err(|e| {
                warn!(variant_id = %id, error = %e, "rejected variant update");
            })?;
        debug!(variant_id = %id, attributes = ?revised.attributes(), "variant attributes resolved");

        let saved = self
            .repository
            .save_variant(revised, current.expected_version())
            .inspect_err(|e| {
                if let StoreError::Concurrency { actual, .. } = e {
                    warn!(variant_id = %id, actual, "variant changed concurrently");
                }
            })?;
        info!(variant_id = %id, version = saved.version(), "variant updated");
        Ok(saved)
    }

    pub fn get_variant(&self, id: VariantId) -> ServiceResult<Variant> {
        debug!(variant_id = %id, "loading variant");
        self.repository
            .load_variant(id)?
            .ok_or_else(|| ServiceError::variant_not_found(id))
    }

    pub fn list_variants(&self, product_id: ProductId, query: PageQuery) -> ServiceResult<Page<Variant>> {
        if !self.repository.product_exists(product_id)? {
            return Err(ServiceError::product_not_found(product_id));
        }
        Ok(self
            .repository
            .list_variants_of_product(product_id, self.config.page(query))?)
    }

    pub fn delete_variant(&self, id: VariantId) -> ServiceResult<()> {
        if !self.repository.delete_variant(id)? {
            return Err(ServiceError::variant_not_found(id));
        }
        info!(variant_id = %id, "variant deleted");
        Ok(())
    }

    /// Stored attributes merged with the schema defaults they rely on.
    pub fn effective_attributes(&self, id: VariantId) -> ServiceResult<BTreeMap<String, AttributeValue>> {
        let variant = self.get_variant(id)?;
        let product = self.get_product(variant.product_id())?;
        Ok(variant.effective_attributes(product.schema()))
    }

    fn ensure_brand(&self, brand_id: &str) -> ServiceResult<()> {
        if !self.repository.brand_exists(brand_id)? {
            warn!(brand_id, "unknown brand");
            return Err(ServiceError::brand_not_found(brand_id));
        }
        Ok(())
    }

    fn ensure_category(&self, category_id: &str) -> ServiceResult<()> {
        if !self.repository.category_exists(category_id)? {
            warn!(category_id, "unknown category");
            return Err(ServiceError::category_not_found(category_id));
        }
        Ok(())
    }

    fn ensure_taxonomy(&self, product: &Product) -> ServiceResult<()> {
        self.ensure_brand(product.brand_id())?;
        product
            .category_ids()
            .iter()
            .try_for_each(|category_id| self.ensure_category(category_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::document_store::PageRequest;
    use crate::repository::InMemoryCatalogRepository;
    use skuforge_catalog::{AttributeDefinitionRecord, AttributeType, Money, ProposedAttributes};

    /// Delegates to the in-memory repository, with injectable faults around
    /// variant writes and product deletes.
    #[derive(Default)]
    struct FaultyRepository {
        inner: InMemoryCatalogRepository,
        delete_product_before_variant_save: bool,
        fail_variant_save: bool,
        fail_product_delete: bool,
    }

    impl CatalogRepository for FaultyRepository {
        fn load_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
            self.inner.load_product(id)
        }

        fn save_product(&self, product: &Product, expected: ExpectedVersion) -> Result<u64, StoreError> {
            self.inner.save_product(product, expected)
        }

        fn product_exists(&self, id: ProductId) -> Result<bool, StoreError> {
            self.inner.product_exists(id)
        }

        fn delete_product(&self, id: ProductId) -> Result<bool, StoreError> {
            if self.fail_product_delete {
                return Err(StoreError::Poisoned);
            }
            self.inner.delete_product(id)
        }

        fn list_products(&self, page: PageRequest) -> Result<Page<Product>, StoreError> {
            self.inner.list_products(page)
        }

        fn search_products_by_name(&self, name: &str, page: PageRequest) -> Result<Page<Product>, StoreError> {
            self.inner.search_products_by_name(name, page)
        }

        fn list_products_by_brand(&self, brand_id: &str, page: PageRequest) -> Result<Page<Product>, StoreError> {
            self.inner.list_products_by_brand(brand_id, page)
        }

        fn list_products_by_category(
            &self,
            category_id: &str,
            page: PageRequest,
        ) -> Result<Page<Product>, StoreError> {
            self.inner.list_products_by_category(category_id, page)
        }

        fn load_variant(&self, id: VariantId) -> Result<Option<Variant>, StoreError> {
            self.inner.load_variant(id)
        }

        fn save_variant(&self, variant: Variant, expected: ExpectedVersion) -> Result<Variant, StoreError> {
            if self.fail_variant_save {
                return Err(StoreError::Serialization("disk full".to_string()));
            }
            if self.delete_product_before_variant_save {
                self.inner.delete_product(variant.product_id())?;
            }
            self.inner.save_variant(variant, expected)
        }

        fn delete_variant(&self, id: VariantId) -> Result<bool, StoreError> {
            self.inner.delete_variant(id)
        }

        fn delete_variants_of_product(&self, product_id: ProductId) -> Result<usize, StoreError> {
            self.inner.delete_variants_of_product(product_id)
        }

        fn list_variants_of_product(
            &self,
            product_id: ProductId,
            page: PageRequest,
        ) -> Result<Page<Variant>, StoreError> {
            self.inner.list_variants_of_product(product_id, page)
        }

        fn save_brand(&self, brand: &Brand, expected: ExpectedVersion) -> Result<u64, StoreError> {
            self.inner.save_brand(brand, expected)
        }

        fn brand_exists(&self, id: &str) -> Result<bool, StoreError> {
            self.inner.brand_exists(id)
        }

        fn list_brands(&self, page: PageRequest) -> Result<Page<Brand>, StoreError> {
            self.inner.list_brands(page)
        }

        fn save_category(&self, category: &Category, expected: ExpectedVersion) -> Result<u64, StoreError> {
            self.inner.save_category(category, expected)
        }

        fn category_exists(&self, id: &str) -> Result<bool, StoreError> {
            self.inner.category_exists(id)
        }

        fn list_categories(&self, page: PageRequest) -> Result<Page<Category>, StoreError> {
            self.inner.list_categories(page)
        }
    }

    fn seeded<R: CatalogRepository>(repository: R, config: CatalogConfig) -> CatalogService<R> {
        let service = CatalogService::new(repository, config);
        service
            .create_brand(NewBrand {
                id: "acme".to_string(),
                name: "Acme".to_string(),
                description: None,
                logo_url: None,
            })
            .unwrap();
        service
            .create_category(NewCategory {
                id: "shirts".to_string(),
                name: "Shirts".to_string(),
                description: None,
            })
            .unwrap();
        service
    }

    fn service() -> CatalogService<InMemoryCatalogRepository> {
        seeded(InMemoryCatalogRepository::in_memory(), CatalogConfig::default())
    }

    fn new_product() -> NewProduct {
        NewProduct {
            name: "Basic Tee".to_string(),
            description: None,
            brand_id: "acme".to_string(),
            category_ids: vec!["shirts".to_string()],
            attribute_definitions: vec![AttributeDefinitionRecord {
                key: "size".to_string(),
                label: "Size".to_string(),
                attribute_type: Some(AttributeType::String),
                is_variant_option: true,
                is_required: true,
                default_value: None,
            }],
        }
    }

    fn sized(size: &str) -> ProposedAttributes {
        [("size".to_string(), Some(AttributeValue::from(size)))].into()
    }

    fn new_variant(attributes: ProposedAttributes) -> NewVariant {
        NewVariant {
            price: Money::new(1500, "USD").unwrap(),
            stock: 3,
            images: vec![],
            attributes,
        }
    }

    #[test]
    fn invalid_initial_variant_leaves_no_product() {
        let service = service();
        let err = service
            .create_product(new_product(), new_variant(ProposedAttributes::new()))
            .unwrap_err();
        assert!(matches!(err, ServiceError::Catalog(CatalogError::InvalidAttributes(_))));
        assert_eq!(service.list_products(PageQuery::default()).unwrap().total, 0);
    }

    #[test]
    fn stale_expected_version_is_a_conflict() {
        let service = service();
        let (_, variant) = service
            .create_product(new_product(), new_variant(sized("M")))
            .unwrap();

        let err = service
            .update_variant(
                variant.id_typed(),
                VariantUpdate {
                    price: variant.price().clone(),
                    stock: 1,
                    images: vec![],
                    available: None,
                    attributes: sized("L"),
                },
                ExpectedVersion::Exact(7),
            )
            .unwrap_err();
        assert!(matches!(err, ServiceError::ConcurrencyConflict { actual: 1, .. }));
        assert_eq!(service.get_variant(variant.id_typed()).unwrap().version(), 1);
    }

    #[test]
    fn missing_entities_are_not_found() {
        let service = service();
        assert!(matches!(
            service.get_product(ProductId::new()),
            Err(ServiceError::NotFound { entity: "product", .. })
        ));
        assert!(matches!(
            service.delete_variant(VariantId::new()),
            Err(ServiceError::NotFound { entity: "variant", .. })
        ));
        assert!(matches!(
            service.create_variant(ProductId::new(), new_variant(sized("M"))),
            Err(ServiceError::NotFound { entity: "product", .. })
        ));
    }

    #[test]
    fn page_size_is_capped_by_config() {
        let service = seeded(
            InMemoryCatalogRepository::in_memory(),
            CatalogConfig {
                max_page_size: 2,
                default_page_size: 2,
                ..CatalogConfig::default()
            },
        );
        for _ in 0..3 {
            service
                .create_product(new_product(), new_variant(sized("M")))
                .unwrap();
        }
        let page = service.list_products(PageQuery::first(50)).unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total, 3);
    }

    #[test]
    fn missing_limit_uses_default_page_size() {
        let service = seeded(
            InMemoryCatalogRepository::in_memory(),
            CatalogConfig {
                default_page_size: 2,
                ..CatalogConfig::default()
            },
        );
        for _ in 0..3 {
            service
                .create_product(new_product(), new_variant(sized("M")))
                .unwrap();
        }
        let page = service.list_products(PageQuery::default()).unwrap();
        assert_eq!(page.limit, 2);
        assert_eq!(page.items.len(), 2);
        assert!(page.has_more());

        let rest = service
            .list_products(PageQuery {
                offset: Some(2),
                limit: None,
            })
            .unwrap();
        assert_eq!(rest.items.len(), 1);
    }

    #[test]
    fn duplicate_brand_is_a_domain_conflict() {
        let service = service();
        let err = service
            .create_brand(NewBrand {
                id: " acme ".to_string(),
                name: "Acme again".to_string(),
                description: None,
                logo_url: None,
            })
            .unwrap_err();
        match err {
            ServiceError::Catalog(CatalogError::Domain(DomainError::Conflict(msg))) => {
                assert!(msg.contains("'acme'"), "{msg}")
            }
            other => panic!("expected Conflict, got {other:?}"),
        }
        assert_eq!(service.list_brands(PageQuery::default()).unwrap().total, 1);
    }

    #[test]
    fn variant_created_while_product_is_deleted_is_removed() {
        let repository = Arc::new(FaultyRepository {
            delete_product_before_variant_save: true,
            ..FaultyRepository::default()
        });
        let service = seeded(Arc::clone(&repository), CatalogConfig::default());

        let product = Product::create(ProductId::new(), new_product(), Utc::now()).unwrap();
        repository
            .save_product(&product, ExpectedVersion::absent())
            .unwrap();

        let err = service
            .create_variant(product.id_typed(), new_variant(sized("M")))
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { entity: "product", .. }));
        assert_eq!(
            repository
                .list_variants_of_product(product.id_typed(), PageRequest::first(10))
                .unwrap()
                .total,
            0
        );
    }

    #[test]
    fn failed_rollback_keeps_the_original_error() {
        let repository = Arc::new(FaultyRepository {
            fail_variant_save: true,
            fail_product_delete: true,
            ..FaultyRepository::default()
        });
        let service = seeded(Arc::clone(&repository), CatalogConfig::default());

        let err = service
            .create_product(new_product(), new_variant(sized("M")))
            .unwrap_err();
        match err {
            ServiceError::Store(StoreError::Serialization(msg)) => assert_eq!(msg, "disk full"),
            other => panic!("expected the variant write error, got {other:?}"),
        }
    }

    #[test]
    fn failed_variant_write_removes_the_product() {
        let repository = Arc::new(FaultyRepository {
            fail_variant_save: true,
            ..FaultyRepository::default()
        });
        let service = seeded(Arc::clone(&repository), CatalogConfig::default());

        assert!(matches!(
            service.create_product(new_product(), new_variant(sized("M"))),
            Err(ServiceError::Store(StoreError::Serialization(_)))
        ));
        assert_eq!(service.list_products(PageQuery::default()).unwrap().total, 0);
    }
}
