//! Driven port for product persistence.
//!
//! Every method is scoped to the owning user. Methods that read "active"
//! products exclude trashed rows; trash methods only see trashed rows. No
//! method relies on an implicit default scope.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::{Page, PageRequest};

use crate::domain::{
    Product, ProductId, ProductListFilter, ProductSort, StatusCounts, TagId, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by product repository adapters.
    pub enum ProductRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "product repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "product repository query failed: {message}",
    }
}

/// Column values for a new product row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub url: String,
    pub image_url: Option<String>,
    pub notes: String,
    pub tag_ids: Vec<TagId>,
    pub created_at: DateTime<Utc>,
}

/// Purchase flag change, with the timestamp already resolved by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurchaseUpdate {
    pub purchased: bool,
    pub purchased_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

/// Port for product storage and the listing queries.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Fetch one page of active products matching `filter`, each with its
    /// tags, together with the total number of matches.
    async fn list_active(
        &self,
        user_id: UserId,
        filter: &ProductListFilter,
        sort: ProductSort,
        page: PageRequest,
    ) -> Result<Page<Product>, ProductRepositoryError>;

    /// Count the user's active products split by purchase status.
    async fn status_counts(&self, user_id: UserId) -> Result<StatusCounts, ProductRepositoryError>;

    /// Fetch an active product with its tags.
    async fn find_active(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<Option<Product>, ProductRepositoryError>;

    /// Insert a product and link the given tags.
    async fn insert(
        &self,
        user_id: UserId,
        product: &NewProduct,
    ) -> Result<Product, ProductRepositoryError>;

    /// Apply a purchase change to an active product whose stored flag is the
    /// opposite of `update.purchased`. Returns `None` when the product is not
    /// active for this user or already carries the requested flag.
    async fn update_purchase(
        &self,
        user_id: UserId,
        product_id: ProductId,
        update: PurchaseUpdate,
    ) -> Result<Option<Product>, ProductRepositoryError>;

    /// Move an active product to the trash. Returns `false` when there was no
    /// active product to trash.
    async fn soft_delete(
        &self,
        user_id: UserId,
        product_id: ProductId,
        deleted_at: DateTime<Utc>,
    ) -> Result<bool, ProductRepositoryError>;

    /// Trashed products, most recently trashed first.
    async fn list_trashed(&self, user_id: UserId) -> Result<Vec<Product>, ProductRepositoryError>;

    /// Take a product out of the trash. Returns `None` when it was not trashed.
    async fn restore(
        &self,
        user_id: UserId,
        product_id: ProductId,
        restored_at: DateTime<Utc>,
    ) -> Result<Option<Product>, ProductRepositoryError>;

    /// Hard-delete a trashed product with its video logs and tag links in one
    /// transaction. Returns `false` when the product was not trashed.
    async fn purge(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<bool, ProductRepositoryError>;

    /// Link a tag to an active product; linking twice is a no-op. Returns
    /// `false` when the product is not active for this user.
    async fn link_tag(
        &self,
        user_id: UserId,
        product_id: ProductId,
        tag_id: TagId,
    ) -> Result<bool, ProductRepositoryError>;

    /// Unlink a tag from an active product. Returns `false` when the product
    /// is not active for this user.
    async fn unlink_tag(
        &self,
        user_id: UserId,
        product_id: ProductId,
        tag_id: TagId,
    ) -> Result<bool, ProductRepositoryError>;
}

/// Fixture implementation holding no products.
///
/// Used when the server starts without a database so the HTTP surface can
/// be exercised end to end.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureProductRepository;

#[async_trait]
impl ProductRepository for FixtureProductRepository {
    async fn list_active(
        &self,
        _user_id: UserId,
        _filter: &ProductListFilter,
        _sort: ProductSort,
        page: PageRequest,
    ) -> Result<Page<Product>, ProductRepositoryError> {
        Ok(Page::new(Vec::new(), 0, page))
    }

    async fn status_counts(&self, _user_id: UserId) -> Result<StatusCounts, ProductRepositoryError> {
        Ok(StatusCounts::default())
    }

    async fn find_active(
        &self,
        _user_id: UserId,
        _product_id: ProductId,
    ) -> Result<Option<Product>, ProductRepositoryError> {
        Ok(None)
    }

    async fn insert(
        &self,
        _user_id: UserId,
        _product: &NewProduct,
    ) -> Result<Product, ProductRepositoryError> {
        Err(ProductRepositoryError::connection(
            "fixture repository cannot store products",
        ))
    }

    async fn update_purchase(
        &self,
        _user_id: UserId,
        _product_id: ProductId,
        _update: PurchaseUpdate,
    ) -> Result<Option<Product>, ProductRepositoryError> {
        Ok(None)
    }

    async fn soft_delete(
        &self,
        _user_id: UserId,
        _product_id: ProductId,
        _deleted_at: DateTime<Utc>,
    ) -> Result<bool, ProductRepositoryError> {
        Ok(false)
    }

    async fn list_trashed(&self, _user_id: UserId) -> Result<Vec<Product>, ProductRepositoryError> {
        Ok(Vec::new())
    }

    async fn restore(
        &self,
        _user_id: UserId,
        _product_id: ProductId,
        _restored_at: DateTime<Utc>,
    ) -> Result<Option<Product>, ProductRepositoryError> {
        Ok(None)
    }

    async fn purge(
        &self,
        _user_id: UserId,
        _product_id: ProductId,
    ) -> Result<bool, ProductRepositoryError> {
        Ok(false)
    }

    async fn link_tag(
        &self,
        _user_id: UserId,
        _product_id: ProductId,
        _tag_id: TagId,
    ) -> Result<bool, ProductRepositoryError> {
        Ok(false)
    }

    async fn unlink_tag(
        &self,
        _user_id: UserId,
        _product_id: ProductId,
        _tag_id: TagId,
    ) -> Result<bool, ProductRepositoryError> {
        Ok(false)
    }
}
