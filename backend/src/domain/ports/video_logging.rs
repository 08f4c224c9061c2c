//! Driving port for the video log aggregator.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{
    DailyVideoLog, Error, ProductId, UserId, VideoCount, VideoLog, VideoLogWrite,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VideoLogging: Send + Sync {
    /// Record `count` videos for the day, overwriting any earlier entry, and
    /// refresh the product's running total atomically.
    ///
    /// Safe to retry: repeating the call leaves the same state.
    async fn log_video(
        &self,
        user_id: UserId,
        product_id: ProductId,
        date: NaiveDate,
        count: VideoCount,
    ) -> Result<VideoLogWrite, Error>;

    /// The day's log, or a zero-count placeholder when nothing was logged.
    async fn video_log_for_date(
        &self,
        user_id: UserId,
        product_id: ProductId,
        date: NaiveDate,
    ) -> Result<DailyVideoLog, Error>;

    async fn list_video_logs(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<Vec<VideoLog>, Error>;
}
