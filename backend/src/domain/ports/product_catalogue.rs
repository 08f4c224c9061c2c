//! Driving port for product listing and lifecycle operations.

use async_trait::async_trait;
use pagination::PageRequest;

use crate::domain::{
    Error, Product, ProductDraft, ProductId, ProductListFilter, ProductListing, ProductSort, TagId,
    TagName, UserId,
};

/// Parameters of a listing request after inbound parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListProductsRequest {
    pub user_id: UserId,
    pub filter: ProductListFilter,
    pub sort: ProductSort,
    pub page: PageRequest,
}

/// Operations on a user's products.
///
/// Every operation is scoped to `user_id`; products of other users are
/// reported as not found.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductCatalogue: Send + Sync {
    /// Filtered, paginated listing plus base-scope status counts.
    async fn list_products(&self, request: ListProductsRequest) -> Result<ProductListing, Error>;

    /// Create a pending product, finding or creating its tags by name.
    async fn create_product(&self, user_id: UserId, draft: ProductDraft) -> Result<Product, Error>;

    async fn get_product(&self, user_id: UserId, product_id: ProductId) -> Result<Product, Error>;

    /// Set the purchased flag, stamping or clearing `purchased_at` on a
    /// transition.
    async fn set_purchased(
        &self,
        user_id: UserId,
        product_id: ProductId,
        purchased: bool,
    ) -> Result<Product, Error>;

    /// Soft delete: move an active product to the trash.
    async fn trash_product(&self, user_id: UserId, product_id: ProductId) -> Result<(), Error>;

    async fn list_trash(&self, user_id: UserId) -> Result<Vec<Product>, Error>;

    async fn restore_product(&self, user_id: UserId, product_id: ProductId)
    -> Result<Product, Error>;

    /// Remove a trashed product and its video logs for good. Active products
    /// are reported as not found in the trash.
    async fn delete_product_permanently(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(), Error>;

    async fn add_tag(
        &self,
        user_id: UserId,
        product_id: ProductId,
        tag_name: TagName,
    ) -> Result<Product, Error>;

    async fn remove_tag(
        &self,
        user_id: UserId,
        product_id: ProductId,
        tag_id: TagId,
    ) -> Result<Product, Error>;
}
