//! Product catalogue service implementing [`ProductCatalogue`].
//!
//! The service owns the business rules around the persistence calls: tag
//! resolution on create, purchase timestamp transitions and the trash-only
//! rule for permanent deletes.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{
    ListProductsRequest, NewProduct, ProductCatalogue, ProductRepository, ProductRepositoryError,
    PurchaseUpdate, TagRegistry, TagRegistryError,
};
use crate::domain::{
    Error, Product, ProductDraft, ProductId, ProductListing, PurchaseTransition, TagId, TagName,
    UserId,
};

/// Product service backed by a repository and the tag registry.
#[derive(Clone)]
pub struct ProductService<P, T> {
    products: Arc<P>,
    tags: Arc<T>,
    clock: Arc<dyn Clock>,
}

impl<P, T> ProductService<P, T> {
    /// Create a new service with the given collaborators.
    pub fn new(products: Arc<P>, tags: Arc<T>, clock: Arc<dyn Clock>) -> Self {
        Self {
            products,
            tags,
            clock,
        }
    }
}

fn map_repository_error(error: ProductRepositoryError) -> Error {
    match error {
        ProductRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("product repository unavailable: {message}"))
        }
        ProductRepositoryError::Query { message } => {
            Error::internal(format!("product repository error: {message}"))
        }
    }
}

fn map_tag_error(error: TagRegistryError) -> Error {
    match error {
        TagRegistryError::Connection { message } => {
            Error::service_unavailable(format!("tag registry unavailable: {message}"))
        }
        TagRegistryError::Query { message } => {
            Error::internal(format!("tag registry error: {message}"))
        }
    }
}

fn product_not_found(product_id: ProductId) -> Error {
    Error::not_found(format!("product {product_id} not found"))
}

fn trashed_product_not_found(product_id: ProductId) -> Error {
    Error::not_found(format!("product {product_id} not found in trash"))
}

impl<P, T> ProductService<P, T>
where
    P: ProductRepository,
    T: TagRegistry,
{
    async fn resolve_tags(&self, names: &[TagName]) -> Result<Vec<TagId>, Error> {
        let mut ids = Vec::with_capacity(names.len());
        for name in names {
            let tag = self.tags.find_or_create(name).await.map_err(map_tag_error)?;
            ids.push(tag.id);
        }
        Ok(ids)
    }

    async fn require_active(&self, user_id: UserId, product_id: ProductId) -> Result<Product, Error> {
        self.products
            .find_active(user_id, product_id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| product_not_found(product_id))
    }
}

#[async_trait]
impl<P, T> ProductCatalogue for ProductService<P, T>
where
    P: ProductRepository,
    T: TagRegistry,
{
    async fn list_products(&self, request: ListProductsRequest) -> Result<ProductListing, Error> {
        let ListProductsRequest {
            user_id,
            filter,
            sort,
            page,
        } = request;
        let page = self
            .products
            .list_active(user_id, &filter, sort, page)
            .await
            .map_err(map_repository_error)?;
        let status_counts = self
            .products
            .status_counts(user_id)
            .await
            .map_err(map_repository_error)?;
        Ok(ProductListing {
            page,
            status_counts,
        })
    }

    async fn create_product(&self, user_id: UserId, draft: ProductDraft) -> Result<Product, Error> {
        let tag_ids = self.resolve_tags(draft.tag_names()).await?;
        let new_product = NewProduct {
            url: draft.url().to_owned(),
            image_url: draft.image_url().map(str::to_owned),
            notes: draft.notes().to_owned(),
            tag_ids,
            created_at: self.clock.utc(),
        };
        let product = self
            .products
            .insert(user_id, &new_product)
            .await
            .map_err(map_repository_error)?;
        info!(user_id = %user_id, product_id = %product.id, "product created");
        Ok(product)
    }

    async fn get_product(&self, user_id: UserId, product_id: ProductId) -> Result<Product, Error> {
        self.require_active(user_id, product_id).await
    }

    async fn set_purchased(
        &self,
        user_id: UserId,
        product_id: ProductId,
        purchased: bool,
    ) -> Result<Product, Error> {
        let current = self.require_active(user_id, product_id).await?;
        let now = self.clock.utc();
        let transition = PurchaseTransition::between(current.purchased, purchased, now);
        if transition == PurchaseTransition::Unchanged {
            return Ok(current);
        }
        let update = PurchaseUpdate {
            purchased,
            purchased_at: transition.apply(current.purchased_at),
            updated_at: now,
        };
        let updated = self
            .products
            .update_purchase(user_id, product_id, update)
            .await
            .map_err(map_repository_error)?;
        match updated {
            Some(product) => Ok(product),
            // Another request applied the same transition first.
            None => self.require_active(user_id, product_id).await,
        }
    }

    async fn trash_product(&self, user_id: UserId, product_id: ProductId) -> Result<(), Error> {
        let trashed = self
            .products
            .soft_delete(user_id, product_id, self.clock.utc())
            .await
            .map_err(map_repository_error)?;
        if !trashed {
            return Err(product_not_found(product_id));
        }
        info!(user_id = %user_id, product_id = %product_id, "product moved to trash");
        Ok(())
    }

    async fn list_trash(&self, user_id: UserId) -> Result<Vec<Product>, Error> {
        self.products
            .list_trashed(user_id)
            .await
            .map_err(map_repository_error)
    }

    async fn restore_product(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<Product, Error> {
        self.products
            .restore(user_id, product_id, self.clock.utc())
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| trashed_product_not_found(product_id))
    }

    async fn delete_product_permanently(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(), Error> {
        let purged = self
            .products
            .purge(user_id, product_id)
            .await
            .map_err(map_repository_error)?;
        if !purged {
            return Err(trashed_product_not_found(product_id));
        }
        info!(user_id = %user_id, product_id = %product_id, "product permanently deleted");
        Ok(())
    }

    async fn add_tag(
        &self,
        user_id: UserId,
        product_id: ProductId,
        tag_name: TagName,
    ) -> Result<Product, Error> {
        // Check ownership first so a foreign product never creates a tag.
        self.require_active(user_id, product_id).await?;
        let tag = self
            .tags
            .find_or_create(&tag_name)
            .await
            .map_err(map_tag_error)?;
        let linked = self
            .products
            .link_tag(user_id, product_id, tag.id)
            .await
            .map_err(map_repository_error)?;
        if !linked {
            return Err(product_not_found(product_id));
        }
        self.require_active(user_id, product_id).await
    }

    async fn remove_tag(
        &self,
        user_id: UserId,
        product_id: ProductId,
        tag_id: TagId,
    ) -> Result<Product, Error> {
        let unlinked = self
            .products
            .unlink_tag(user_id, product_id, tag_id)
            .await
            .map_err(map_repository_error)?;
        if !unlinked {
            return Err(product_not_found(product_id));
        }
        self.require_active(user_id, product_id).await
    }
}

#[cfg(test)]
#[path = "product_service_tests.rs"]
mod tests;
