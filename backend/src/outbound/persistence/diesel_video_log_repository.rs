//! PostgreSQL-backed `VideoLogRepository` implementation using Diesel ORM.
//!
//! Recording a log locks the product row, upserts the `(product, date)` log
//! and rewrites `products.video_count` from the sum of all its logs, all in
//! one transaction. Concurrent writers for the same product serialise on the
//! row lock, so the denormalised counter never drifts from the log rows.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use diesel::dsl::{exists, select, sum};
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, AsyncPgConnection, RunQueryDsl};

use crate::domain::ports::{VideoLogRepository, VideoLogRepositoryError};
use crate::domain::{
    ProductId, UserId, VideoCount, VideoLog, VideoLogId, VideoLogWrite,
};

use super::error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewVideoLogRow, VideoLogRow};
use super::pool::{DbPool, PoolError};
use super::schema::{products, video_logs};

/// Diesel-backed implementation of the video log repository port.
#[derive(Clone)]
pub struct DieselVideoLogRepository {
    pool: DbPool,
}

impl DieselVideoLogRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Failures raised inside the record transaction.
#[derive(Debug)]
enum RecordFailure {
    Diesel(diesel::result::Error),
    ProductNotFound(i32),
    CounterOverflow(i64),
}

impl From<diesel::result::Error> for RecordFailure {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

fn map_pool_error(error: PoolError) -> VideoLogRepositoryError {
    map_basic_pool_error(error, VideoLogRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> VideoLogRepositoryError {
    map_basic_diesel_error(
        error,
        VideoLogRepositoryError::query,
        VideoLogRepositoryError::connection,
    )
}

fn map_record_failure(failure: RecordFailure) -> VideoLogRepositoryError {
    match failure {
        RecordFailure::ProductNotFound(product_id) => {
            VideoLogRepositoryError::product_not_found(product_id)
        }
        RecordFailure::CounterOverflow(total) => {
            VideoLogRepositoryError::transaction(format!("video total {total} exceeds counter range"))
        }
        RecordFailure::Diesel(error) => map_basic_diesel_error(
            error,
            VideoLogRepositoryError::transaction,
            VideoLogRepositoryError::connection,
        ),
    }
}

fn row_to_video_log(row: VideoLogRow) -> VideoLog {
    VideoLog {
        id: VideoLogId::new(row.id),
        product_id: ProductId::new(row.product_id),
        date: row.date,
        count: row.video_total,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

async fn owns_active_product(
    conn: &mut AsyncPgConnection,
    user_id: UserId,
    product_id: ProductId,
) -> Result<bool, diesel::result::Error> {
    select(exists(
        products::table
            .filter(products::id.eq(product_id.get()))
            .filter(products::user_id.eq(user_id.get()))
            .filter(products::deleted_at.is_null()),
    ))
    .get_result(conn)
    .await
}

#[async_trait]
impl VideoLogRepository for DieselVideoLogRepository {
    async fn record(
        &self,
        user_id: UserId,
        product_id: ProductId,
        date: NaiveDate,
        count: VideoCount,
        now: DateTime<Utc>,
    ) -> Result<VideoLogWrite, VideoLogRepositoryError> {
        let id = product_id.get();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction(|conn| {
            async move {
                let locked: Option<i32> = products::table
                    .filter(products::id.eq(id))
                    .filter(products::user_id.eq(user_id.get()))
                    .filter(products::deleted_at.is_null())
                    .select(products::id)
                    .for_update()
                    .first(conn)
                    .await
                    .optional()?;
                if locked.is_none() {
                    return Err(RecordFailure::ProductNotFound(id));
                }

                let existed: bool = select(exists(
                    video_logs::table
                        .filter(video_logs::product_id.eq(id))
                        .filter(video_logs::date.eq(date)),
                ))
                .get_result(conn)
                .await?;

                let row: VideoLogRow = diesel::insert_into(video_logs::table)
                    .values(NewVideoLogRow {
                        product_id: id,
                        date,
                        video_total: count.get(),
                        created_at: now,
                        updated_at: now,
                    })
                    .on_conflict((video_logs::product_id, video_logs::date))
                    .do_update()
                    .set((
                        video_logs::video_total.eq(excluded(video_logs::video_total)),
                        video_logs::updated_at.eq(excluded(video_logs::updated_at)),
                    ))
                    .returning(VideoLogRow::as_returning())
                    .get_result(conn)
                    .await?;

                let total: Option<i64> = video_logs::table
                    .filter(video_logs::product_id.eq(id))
                    .select(sum(video_logs::video_total))
                    .get_result(conn)
                    .await?;
                let total = total.unwrap_or_default();
                let video_count =
                    i32::try_from(total).map_err(|_| RecordFailure::CounterOverflow(total))?;

                diesel::update(products::table.filter(products::id.eq(id)))
                    .set((
                        products::video_count.eq(video_count),
                        products::updated_at.eq(now),
                    ))
                    .execute(conn)
                    .await?;

                Ok(VideoLogWrite {
                    log: row_to_video_log(row),
                    created: !existed,
                    video_count,
                })
            }
            .scope_boxed()
        })
        .await
        .map_err(map_record_failure)
    }

    async fn find_for_date(
        &self,
        user_id: UserId,
        product_id: ProductId,
        date: NaiveDate,
    ) -> Result<Option<VideoLog>, VideoLogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        if !owns_active_product(&mut conn, user_id, product_id)
            .await
            .map_err(map_diesel_error)?
        {
            return Err(VideoLogRepositoryError::product_not_found(product_id.get()));
        }

        let row: Option<VideoLogRow> = video_logs::table
            .filter(video_logs::product_id.eq(product_id.get()))
            .filter(video_logs::date.eq(date))
            .select(VideoLogRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(row_to_video_log))
    }

    async fn list_for_product(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<Vec<VideoLog>, VideoLogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        if !owns_active_product(&mut conn, user_id, product_id)
            .await
            .map_err(map_diesel_error)?
        {
            return Err(VideoLogRepositoryError::product_not_found(product_id.get()));
        }

        let rows: Vec<VideoLogRow> = video_logs::table
            .filter(video_logs::product_id.eq(product_id.get()))
            .order_by(video_logs::date.desc())
            .select(VideoLogRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(row_to_video_log).collect())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for record transaction error mapping.
    use super::*;
    use diesel::result::DatabaseErrorKind;
    use rstest::rstest;

    #[rstest]
    fn missing_product_maps_to_product_not_found() {
        assert_eq!(
            map_record_failure(RecordFailure::ProductNotFound(7)),
            VideoLogRepositoryError::product_not_found(7)
        );
    }

    #[rstest]
    fn database_failure_inside_transaction_is_a_transaction_error() {
        let failure = RecordFailure::Diesel(diesel::result::Error::DatabaseError(
            DatabaseErrorKind::CheckViolation,
            Box::new("video_logs_count_check".to_owned()),
        ));
        assert!(matches!(
            map_record_failure(failure),
            VideoLogRepositoryError::Transaction { .. }
        ));
    }

    #[rstest]
    fn counter_overflow_is_a_transaction_error() {
        let mapped = map_record_failure(RecordFailure::CounterOverflow(i64::MAX));
        assert!(mapped.to_string().contains("exceeds counter range"));
    }
}
