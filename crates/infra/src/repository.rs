//! Catalog persistence contract over document stores.

use std::sync::Arc;

use skuforge_catalog::{Brand, Category, Product, Variant};
use skuforge_core::{Entity, ExpectedVersion, ProductId, VariantId};

use crate::document_store::{DocumentStore, InMemoryDocumentStore, Page, PageRequest, StoreError};

/// Storage operations the catalog workflow needs.
///
/// Variant writes are conditional on `ExpectedVersion`; a mismatch surfaces
/// as `StoreError::Concurrency` and nothing is written.
pub trait CatalogRepository: Send + Sync {
    fn load_product(&self, id: ProductId) -> Result<Option<Product>, StoreError>;
    fn save_product(&self, product: &Product, expected: ExpectedVersion) -> Result<u64, StoreError>;
    fn product_exists(&self, id: ProductId) -> Result<bool, StoreError>;
    fn delete_product(&self, id: ProductId) -> Result<bool, StoreError>;
    fn list_products(&self, page: PageRequest) -> Result<Page<Product>, StoreError>;
    /// Case-insensitive substring match on the product name.
    fn search_products_by_name(&self, name: &str, page: PageRequest) -> Result<Page<Product>, StoreError>;
    fn list_products_by_brand(&self, brand_id: &str, page: PageRequest) -> Result<Page<Product>, StoreError>;
    fn list_products_by_category(
        &self,
        category_id: &str,
        page: PageRequest,
    ) -> Result<Page<Product>, StoreError>;

    /// The loaded variant carries its stored version.
    fn load_variant(&self, id: VariantId) -> Result<Option<Variant>, StoreError>;
    /// Returns the variant stamped with its new version.
    fn save_variant(&self, variant: Variant, expected: ExpectedVersion) -> Result<Variant, StoreError>;
    fn delete_variant(&self, id: VariantId) -> Result<bool, StoreError>;
    fn delete_variants_of_product(&self, product_id: ProductId) -> Result<usize, StoreError>;
    fn list_variants_of_product(
        &self,
        product_id: ProductId,
        page: PageRequest,
    ) -> Result<Page<Variant>, StoreError>;

    fn save_brand(&self, brand: &Brand, expected: ExpectedVersion) -> Result<u64, StoreError>;
    fn brand_exists(&self, id: &str) -> Result<bool, StoreError>;
    fn list_brands(&self, page: PageRequest) -> Result<Page<Brand>, StoreError>;

    fn save_category(&self, category: &Category, expected: ExpectedVersion) -> Result<u64, StoreError>;
    fn category_exists(&self, id: &str) -> Result<bool, StoreError>;
    fn list_categories(&self, page: PageRequest) -> Result<Page<Category>, StoreError>;
}

impl<R> CatalogRepository for Arc<R>
where
    R: CatalogRepository + ?Sized,
{
    fn load_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        (**self).load_product(id)
    }

    fn save_product(&self, product: &Product, expected: ExpectedVersion) -> Result<u64, StoreError> {
        (**self).save_product(product, expected)
    }

    fn product_exists(&self, id: ProductId) -> Result<bool, StoreError> {
        (**self).product_exists(id)
    }

    fn delete_product(&self, id: ProductId) -> Result<bool, StoreError> {
        (**self).delete_product(id)
    }

    fn list_products(&self, page: PageRequest) -> Result<Page<Product>, StoreError> {
        (**self).list_products(page)
    }

    fn search_products_by_name(&self, name: &str, page: PageRequest) -> Result<Page<Product>, StoreError> {
        (**self).search_products_by_name(name, page)
    }

    fn list_products_by_brand(&self, brand_id: &str, page: PageRequest) -> Result<Page<Product>, StoreError> {
        (**self).list_products_by_brand(brand_id, page)
    }

    fn list_products_by_category(
        &self,
        category_id: &str,
        page: PageRequest,
    ) -> Result<Page<Product>, StoreError> {
        (**self).list_products_by_category(category_id, page)
    }

    fn load_variant(&self, id: VariantId) -> Result<Option<Variant>, StoreError> {
        (**self).load_variant(id)
    }

    fn save_variant(&self, variant: Variant, expected: ExpectedVersion) -> Result<Variant, StoreError> {
        (**self).save_variant(variant, expected)
    }

    fn delete_variant(&self, id: VariantId) -> Result<bool, StoreError> {
        (**self).delete_variant(id)
    }

    fn delete_variants_of_product(&self, product_id: ProductId) -> Result<usize, StoreError> {
        (**self).delete_variants_of_product(product_id)
    }

    fn list_variants_of_product(
        &self,
        product_id: ProductId,
        page: PageRequest,
    ) -> Result<Page<Variant>, StoreError> {
        (**self).list_variants_of_product(product_id, page)
    }

    fn save_brand(&self, brand: &Brand, expected: ExpectedVersion) -> Result<u64, StoreError> {
        (**self).save_brand(brand, expected)
    }

    fn brand_exists(&self, id: &str) -> Result<bool, StoreError> {
        (**self).brand_exists(id)
    }

    fn list_brands(&self, page: PageRequest) -> Result<Page<Brand>, StoreError> {
        (**self).list_brands(page)
    }

    fn save_category(&self, category: &Category, expected: ExpectedVersion) -> Result<u64, StoreError> {
        (**self).save_category(category, expected)
    }

    fn category_exists(&self, id: &str) -> Result<bool, StoreError> {
        (**self).category_exists(id)
    }

    fn list_categories(&self, page: PageRequest) -> Result<Page<Category>, StoreError> {
        (**self).list_categories(page)
    }
}

/// `CatalogRepository` backed by one document store per entity.
///
/// Brands and categories are keyed by their string identifier.
#[derive(Debug, Default)]
pub struct StoreCatalogRepository<P, V, B, C> {
    products: P,
    variants: V,
    brands: B,
    categories: C,
}

pub type InMemoryCatalogRepository = StoreCatalogRepository<
    InMemoryDocumentStore<ProductId, Product>,
    InMemoryDocumentStore<VariantId, Variant>,
    InMemoryDocumentStore<String, Brand>,
    InMemoryDocumentStore<String, Category>,
>;

impl<P, V, B, C> StoreCatalogRepository<P, V, B, C> {
    pub fn new(products: P, variants: V, brands: B, categories: C) -> Self {
        Self {
            products,
            variants,
            brands,
            categories,
        }
    }
}

impl InMemoryCatalogRepository {
    pub fn in_memory() -> Self {
        Self::new(
            InMemoryDocumentStore::new(),
            InMemoryDocumentStore::new(),
            InMemoryDocumentStore::new(),
            InMemoryDocumentStore::new(),
        )
    }
}

impl<P, V, B, C> StoreCatalogRepository<P, V, B, C>
where
    P: DocumentStore<ProductId, Product>,
{
    fn scan_products(
        &self,
        predicate: &dyn Fn(&Product) -> bool,
        page: PageRequest,
    ) -> Result<Page<Product>, StoreError> {
        Ok(self.products.scan(predicate, page)?.map(|stored| stored.value))
    }
}

impl<P, V, B, C> CatalogRepository for StoreCatalogRepository<P, V, B, C>
where
    P: DocumentStore<ProductId, Product>,
    V: DocumentStore<VariantId, Variant>,
    B: DocumentStore<String, Brand>,
    C: DocumentStore<String, Category>,
{
    fn load_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        Ok(self.products.get(&id)?.map(|stored| stored.value))
    }

    fn save_product(&self, product: &Product, expected: ExpectedVersion) -> Result<u64, StoreError> {
        self.products.put(product.id_typed(), product.clone(), expected)
    }

    fn product_exists(&self, id: ProductId) -> Result<bool, StoreError> {
        self.products.exists(&id)
    }

    fn delete_product(&self, id: ProductId) -> Result<bool, StoreError> {
        self.products.delete(&id)
    }

    fn list_products(&self, page: PageRequest) -> Result<Page<Product>, StoreError> {
        self.scan_products(&|_: &Product| true, page)
    }

    fn search_products_by_name(&self, name: &str, page: PageRequest) -> Result<Page<Product>, StoreError> {
        self.scan_products(&|p: &Product| p.name_contains(name), page)
    }

    fn list_products_by_brand(&self, brand_id: &str, page: PageRequest) -> Result<Page<Product>, StoreError> {
        let brand_id = brand_id.trim();
        self.scan_products(&|p: &Product| p.brand_id() == brand_id, page)
    }

    fn list_products_by_category(
        &self,
        category_id: &str,
        page: PageRequest,
    ) -> Result<Page<Product>, StoreError> {
        let category_id = category_id.trim();
        self.scan_products(
            &|p: &Product| p.category_ids().iter().any(|c| c == category_id),
            page,
        )
    }

    fn load_variant(&self, id: VariantId) -> Result<Option<Variant>, StoreError> {
        Ok(self
            .variants
            .get(&id)?
            .map(|stored| stored.value.with_version(stored.version)))
    }

    fn save_variant(&self, variant: Variant, expected: ExpectedVersion) -> Result<Variant, StoreError> {
        let id = variant.id_typed();
        let version = self.variants.put(id, variant.clone(), expected)?;
        Ok(variant.with_version(version))
    }

    fn delete_variant(&self, id: VariantId) -> Result<bool, StoreError> {
        self.variants.delete(&id)
    }

    fn delete_variants_of_product(&self, product_id: ProductId) -> Result<usize, StoreError> {
        self.variants
            .delete_where(&|v: &Variant| v.product_id() == product_id)
    }

    fn list_variants_of_product(
        &self,
        product_id: ProductId,
        page: PageRequest,
    ) -> Result<Page<Variant>, StoreError> {
        Ok(self
            .variants
            .scan(&|v: &Variant| v.product_id() == product_id, page)?
            .map(|stored| stored.value.with_version(stored.version)))
    }

    fn save_brand(&self, brand: &Brand, expected: ExpectedVersion) -> Result<u64, StoreError> {
        self.brands.put(brand.id().clone(), brand.clone(), expected)
    }

    fn brand_exists(&self, id: &str) -> Result<bool, StoreError> {
        self.brands.exists(&id.trim().to_string())
    }

    fn list_brands(&self, page: PageRequest) -> Result<Page<Brand>, StoreError> {
        Ok(self
            .brands
            .scan(&|_: &Brand| true, page)?
            .map(|stored| stored.value))
    }

    fn save_category(&self, category: &Category, expected: ExpectedVersion) -> Result<u64, StoreError> {
        self.categories
            .put(category.id().clone(), category.clone(), expected)
    }

    fn category_exists(&self, id: &str) -> Result<bool, StoreError> {
        self.categories.exists(&id.trim().to_string())
    }

    fn list_categories(&self, page: PageRequest) -> Result<Page<Category>, StoreError> {
        Ok(self
            .categories
            .scan(&|_: &Category| true, page)?
            .map(|stored| stored.value))
    }
}
