//! Video log aggregator implementing [`VideoLogging`].

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use mockable::Clock;
use tracing::{error, info};

use crate::domain::ports::{VideoLogRepository, VideoLogRepositoryError, VideoLogging};
use crate::domain::{
    DailyVideoLog, Error, ProductId, UserId, VideoCount, VideoLog, VideoLogWrite,
};

/// Video log service backed by a [`VideoLogRepository`].
#[derive(Clone)]
pub struct VideoLogService<R> {
    logs: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> VideoLogService<R> {
    /// Build the service; `clock` dates every log write.
    pub fn new(logs: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { logs, clock }
    }
}

fn map_repository_error(error: VideoLogRepositoryError) -> Error {
    match error {
        VideoLogRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("video log repository unavailable: {message}"))
        }
        VideoLogRepositoryError::Query { message } => {
            Error::internal(format!("video log repository error: {message}"))
        }
        VideoLogRepositoryError::ProductNotFound { product_id } => {
            Error::not_found(format!("product {product_id} not found"))
        }
        VideoLogRepositoryError::Transaction { message } => {
            error!(%message, "video log transaction rolled back");
            Error::internal(format!("video log update failed: {message}"))
        }
    }
}

#[async_trait]
impl<R> VideoLogging for VideoLogService<R>
where
    R: VideoLogRepository,
{
    async fn log_video(
        &self,
        user_id: UserId,
        product_id: ProductId,
        date: NaiveDate,
        count: VideoCount,
    ) -> Result<VideoLogWrite, Error> {
        let write = self
            .logs
            .record(user_id, product_id, date, count, self.clock.utc())
            .await
            .map_err(map_repository_error)?;
        info!(
            product_id = %product_id,
            %date,
            count = count.get(),
            video_count = write.video_count,
            created = write.created,
            "video log recorded"
        );
        Ok(write)
    }

    async fn video_log_for_date(
        &self,
        user_id: UserId,
        product_id: ProductId,
        date: NaiveDate,
    ) -> Result<DailyVideoLog, Error> {
        let found = self
            .logs
            .find_for_date(user_id, product_id, date)
            .await
            .map_err(map_repository_error)?;
        Ok(found.map_or(DailyVideoLog::Empty { product_id, date }, DailyVideoLog::Logged))
    }

    async fn list_video_logs(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<Vec<VideoLog>, Error> {
        self.logs
            .list_for_product(user_id, product_id)
            .await
            .map_err(map_repository_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::VideoLogId;
    use crate::domain::ports::MockVideoLogRepository;
    use crate::domain::test_fixtures::{fixture_clock, fixture_now};
    use mockall::predicate::eq;
    use rstest::{fixture, rstest};

    const USER: UserId = UserId::new(3);
    const PRODUCT: ProductId = ProductId::new(8);

    #[fixture]
    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 5).expect("valid date")
    }

    fn log(date: NaiveDate, count: i32) -> VideoLog {
        VideoLog {
            id: VideoLogId::new(1),
            product_id: PRODUCT,
            date,
            count,
            created_at: fixture_now(),
            updated_at: fixture_now(),
        }
    }

    fn service(repo: MockVideoLogRepository) -> VideoLogService<MockVideoLogRepository> {
        VideoLogService::new(Arc::new(repo), fixture_clock())
    }

    #[rstest]
    #[tokio::test]
    async fn log_video_passes_clock_and_returns_write(day: NaiveDate) {
        let mut repo = MockVideoLogRepository::new();
        let count = VideoCount::new(3).expect("valid count");
        repo.expect_record()
            .with(eq(USER), eq(PRODUCT), eq(day), eq(count), eq(fixture_now()))
            .times(1)
            .return_once(move |_, _, date, count, _| {
                Ok(VideoLogWrite {
                    log: log(date, count.get()),
                    created: true,
                    video_count: 7,
                })
            });

        let write = service(repo)
            .log_video(USER, PRODUCT, day, count)
            .await
            .expect("log succeeds");
        assert!(write.created);
        assert_eq!(write.video_count, 7);
        assert_eq!(write.log.count, 3);
    }

    #[rstest]
    #[tokio::test]
    async fn missing_day_is_a_zero_count(day: NaiveDate) {
        let mut repo = MockVideoLogRepository::new();
        repo.expect_find_for_date()
            .times(1)
            .return_once(|_, _, _| Ok(None));

        let result = service(repo)
            .video_log_for_date(USER, PRODUCT, day)
            .await
            .expect("lookup succeeds");
        assert_eq!(
            result,
            DailyVideoLog::Empty {
                product_id: PRODUCT,
                date: day
            }
        );
        assert_eq!(result.count(), 0);
    }

    #[rstest]
    #[tokio::test]
    async fn logged_day_returns_the_row(day: NaiveDate) {
        let mut repo = MockVideoLogRepository::new();
        repo.expect_find_for_date()
            .times(1)
            .return_once(move |_, _, _| Ok(Some(log(day, 3))));

        let result = service(repo)
            .video_log_for_date(USER, PRODUCT, day)
            .await
            .expect("lookup succeeds");
        assert_eq!(result.count(), 3);
    }

    #[rstest]
    #[case(VideoLogRepositoryError::product_not_found(8), ErrorCode::NotFound)]
    #[case(VideoLogRepositoryError::transaction("deadlock"), ErrorCode::InternalError)]
    #[case(VideoLogRepositoryError::connection("refused"), ErrorCode::ServiceUnavailable)]
    #[tokio::test]
    async fn record_failures_map_to_taxonomy(
        day: NaiveDate,
        #[case] failure: VideoLogRepositoryError,
        #[case] expected: ErrorCode,
    ) {
        let mut repo = MockVideoLogRepository::new();
        repo.expect_record()
            .times(1)
            .return_once(move |_, _, _, _, _| Err(failure));

        let error = service(repo)
            .log_video(USER, PRODUCT, day, VideoCount::new(1).expect("valid count"))
            .await
            .expect_err("record fails");
        assert_eq!(error.code(), expected);
    }
}
