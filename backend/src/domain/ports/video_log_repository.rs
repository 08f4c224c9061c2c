//! Driven port for per-day video logs.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::{ProductId, UserId, VideoCount, VideoLog, VideoLogWrite};

use super::define_port_error;

define_port_error! {
    /// Errors raised by video log repository adapters.
    pub enum VideoLogRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "video log repository connection failed: {message}",
        /// A read failed.
        Query { message: String } =>
            "video log repository query failed: {message}",
        /// The product is not an active product of the user.
        ProductNotFound { product_id: i32 } =>
            "product {product_id} not found",
        /// The atomic log-and-recount write failed and was rolled back.
        Transaction { message: String } =>
            "video log transaction rolled back: {message}",
    }
}

/// Port for video log storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VideoLogRepository: Send + Sync {
    /// Upsert the `(product, date)` row to `count` and recompute the
    /// product's `video_count` from all its logs, in one transaction.
    async fn record(
        &self,
        user_id: UserId,
        product_id: ProductId,
        date: NaiveDate,
        count: VideoCount,
        now: DateTime<Utc>,
    ) -> Result<VideoLogWrite, VideoLogRepositoryError>;

    /// The log for one day, or `None` when nothing was logged. Fails with
    /// [`VideoLogRepositoryError::ProductNotFound`] when the product is not
    /// the user's.
    async fn find_for_date(
        &self,
        user_id: UserId,
        product_id: ProductId,
        date: NaiveDate,
    ) -> Result<Option<VideoLog>, VideoLogRepositoryError>;

    /// Every log of the product, newest date first.
    async fn list_for_product(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<Vec<VideoLog>, VideoLogRepositoryError>;
}

/// Fixture repository that knows no products.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureVideoLogRepository;

#[async_trait]
impl VideoLogRepository for FixtureVideoLogRepository {
    async fn record(
        &self,
        _user_id: UserId,
        product_id: ProductId,
        _date: NaiveDate,
        _count: VideoCount,
        _now: DateTime<Utc>,
    ) -> Result<VideoLogWrite, VideoLogRepositoryError> {
        Err(VideoLogRepositoryError::product_not_found(product_id.get()))
    }

    async fn find_for_date(
        &self,
        _user_id: UserId,
        product_id: ProductId,
        _date: NaiveDate,
    ) -> Result<Option<VideoLog>, VideoLogRepositoryError> {
        Err(VideoLogRepositoryError::product_not_found(product_id.get()))
    }

    async fn list_for_product(
        &self,
        _user_id: UserId,
        product_id: ProductId,
    ) -> Result<Vec<VideoLog>, VideoLogRepositoryError> {
        Err(VideoLogRepositoryError::product_not_found(product_id.get()))
    }
}
