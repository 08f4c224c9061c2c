//! PostgreSQL-backed `GoalRepository` implementation using Diesel ORM.
//!
//! Goal writes run in a single transaction: the goal row, the removal of the
//! previous category goals and the insertion of their replacements either
//! all commit or all roll back. The stored goal is reloaded after commit.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::dsl::{count_star, sum};
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, AsyncPgConnection, RunQueryDsl};

use crate::domain::ports::{GoalRepository, GoalRepositoryError, MonthActivity};
use crate::domain::{
    CategoryGoal, CategoryGoalId, Goal, GoalDraft, GoalId, GoalPeriod, TagId, UserId,
};

use super::diesel_tag_registry::find_or_create_tag;
use super::error_mapping::{is_unique_violation, map_basic_diesel_error, map_basic_pool_error};
use super::models::{
    CategoryGoalRow, GoalChangeset, GoalRow, NewCategoryGoalRow, NewGoalRow,
};
use super::pool::{DbPool, PoolError};
use super::schema::{category_goals, goals, product_tags, products, tags, video_logs};

const PERIOD_CONSTRAINT: &str = "goals_user_month_year_key";

/// Diesel-backed implementation of the goal repository port.
#[derive(Clone)]
pub struct DieselGoalRepository {
    pool: DbPool,
}

impl DieselGoalRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Failures raised inside the upsert transaction.
#[derive(Debug)]
enum UpsertFailure {
    Diesel(diesel::result::Error),
    GoalNotFound(i32),
}

impl From<diesel::result::Error> for UpsertFailure {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

fn map_pool_error(error: PoolError) -> GoalRepositoryError {
    map_basic_pool_error(error, GoalRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> GoalRepositoryError {
    map_basic_diesel_error(
        error,
        GoalRepositoryError::query,
        GoalRepositoryError::connection,
    )
}

fn map_upsert_failure(failure: UpsertFailure, period: GoalPeriod) -> GoalRepositoryError {
    match failure {
        UpsertFailure::GoalNotFound(goal_id) => GoalRepositoryError::goal_not_found(goal_id),
        UpsertFailure::Diesel(error) if is_unique_violation(&error, PERIOD_CONSTRAINT) => {
            GoalRepositoryError::period_taken(period.month(), period.year())
        }
        UpsertFailure::Diesel(error) => map_diesel_error(error),
    }
}

fn period_columns(period: GoalPeriod) -> Result<(i32, i32), GoalRepositoryError> {
    let month = i32::try_from(period.month())
        .map_err(|_| GoalRepositoryError::query("month out of range"))?;
    Ok((month, period.year()))
}

/// Attach category goals to goal rows, preserving the row order.
async fn assemble_goals(
    conn: &mut AsyncPgConnection,
    rows: Vec<GoalRow>,
) -> Result<Vec<Goal>, GoalRepositoryError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<i32> = rows.iter().map(|row| row.id).collect();

    let category_rows: Vec<CategoryGoalRow> = category_goals::table
        .inner_join(tags::table)
        .filter(category_goals::goal_id.eq_any(&ids))
        .order_by((category_goals::goal_id, tags::name))
        .select(CategoryGoalRow::as_select())
        .load(conn)
        .await
        .map_err(map_diesel_error)?;

    let mut categories: HashMap<i32, Vec<CategoryGoal>> = HashMap::new();
    for row in category_rows {
        categories
            .entry(row.goal_id)
            .or_default()
            .push(CategoryGoal {
                id: CategoryGoalId::new(row.id),
                tag: row.tag.into(),
                product_goal: row.product_goal,
            });
    }

    rows.into_iter()
        .map(|row| {
            let period = GoalPeriod::new(i64::from(row.month), i64::from(row.year))
                .map_err(|err| GoalRepositoryError::query(err.to_string()))?;
            Ok(Goal {
                id: GoalId::new(row.id),
                user_id: UserId::new(row.user_id),
                period,
                product_goal: row.product_goal,
                video_goal: row.video_goal,
                category_goals: categories.remove(&row.id).unwrap_or_default(),
            })
        })
        .collect()
}

async fn load_goal(
    conn: &mut AsyncPgConnection,
    user_id: UserId,
    goal_id: i32,
) -> Result<Option<Goal>, GoalRepositoryError> {
    let row: Option<GoalRow> = goals::table
        .filter(goals::user_id.eq(user_id.get()))
        .filter(goals::id.eq(goal_id))
        .select(GoalRow::as_select())
        .first(conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;

    match row {
        Some(row) => Ok(assemble_goals(conn, vec![row]).await?.pop()),
        None => Ok(None),
    }
}

#[async_trait]
impl GoalRepository for DieselGoalRepository {
    async fn upsert(
        &self,
        user_id: UserId,
        draft: &GoalDraft,
        now: DateTime<Utc>,
    ) -> Result<Goal, GoalRepositoryError> {
        let period = draft.period();
        let (month, year) = period_columns(period)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let goal_id = conn
            .transaction(|conn| {
                async move {
                    let goal_id: i32 = match draft.id() {
                        Some(id) => diesel::update(
                            goals::table
                                .filter(goals::id.eq(id.get()))
                                .filter(goals::user_id.eq(user_id.get())),
                        )
                        .set(GoalChangeset {
                            month,
                            year,
                            product_goal: draft.product_goal(),
                            video_goal: draft.video_goal(),
                            updated_at: now,
                        })
                        .returning(goals::id)
                        .get_result(conn)
                        .await
                        .optional()?
                        .ok_or(UpsertFailure::GoalNotFound(id.get()))?,
                        None => {
                            diesel::insert_into(goals::table)
                                .values(NewGoalRow {
                                    user_id: user_id.get(),
                                    month,
                                    year,
                                    product_goal: draft.product_goal(),
                                    video_goal: draft.video_goal(),
                                    created_at: now,
                                    updated_at: now,
                                })
                                .on_conflict((goals::user_id, goals::month, goals::year))
                                .do_update()
                                .set((
                                    goals::product_goal.eq(excluded(goals::product_goal)),
                                    goals::video_goal.eq(excluded(goals::video_goal)),
                                    goals::updated_at.eq(excluded(goals::updated_at)),
                                ))
                                .returning(goals::id)
                                .get_result(conn)
                                .await?
                        }
                    };

                    diesel::delete(category_goals::table.filter(category_goals::goal_id.eq(goal_id)))
                        .execute(conn)
                        .await?;

                    for target in draft.categories() {
                        let tag = find_or_create_tag(conn, &target.tag_name).await?;
                        diesel::insert_into(category_goals::table)
                            .values(NewCategoryGoalRow {
                                goal_id,
                                tag_id: tag.id.get(),
                                product_goal: target.product_goal,
                            })
                            .execute(conn)
                            .await?;
                    }

                    Ok::<_, UpsertFailure>(goal_id)
                }
                .scope_boxed()
            })
            .await
            .map_err(|failure| map_upsert_failure(failure, period))?;

        load_goal(&mut conn, user_id, goal_id)
            .await?
            .ok_or_else(|| GoalRepositoryError::goal_not_found(goal_id))
    }

    async fn list(&self, user_id: UserId) -> Result<Vec<Goal>, GoalRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<GoalRow> = goals::table
            .filter(goals::user_id.eq(user_id.get()))
            .order_by((goals::year.desc(), goals::month.desc()))
            .select(GoalRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        assemble_goals(&mut conn, rows).await
    }

    async fn find(
        &self,
        user_id: UserId,
        goal_id: GoalId,
    ) -> Result<Option<Goal>, GoalRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        load_goal(&mut conn, user_id, goal_id.get()).await
    }

    async fn find_for_period(
        &self,
        user_id: UserId,
        period: GoalPeriod,
    ) -> Result<Option<Goal>, GoalRepositoryError> {
        let (month, year) = period_columns(period)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<GoalRow> = goals::table
            .filter(goals::user_id.eq(user_id.get()))
            .filter(goals::month.eq(month))
            .filter(goals::year.eq(year))
            .select(GoalRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        match row {
            Some(row) => Ok(assemble_goals(&mut conn, vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn delete(&self, user_id: UserId, goal_id: GoalId) -> Result<bool, GoalRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let id = goal_id.get();

        conn.transaction(|conn| {
            async move {
                let owned = goals::table
                    .filter(goals::id.eq(id))
                    .filter(goals::user_id.eq(user_id.get()))
                    .select(goals::id);
                diesel::delete(category_goals::table.filter(category_goals::goal_id.eq_any(owned)))
                    .execute(conn)
                    .await?;
                let removed = diesel::delete(
                    goals::table
                        .filter(goals::id.eq(id))
                        .filter(goals::user_id.eq(user_id.get())),
                )
                .execute(conn)
                .await?;
                Ok::<_, diesel::result::Error>(removed > 0)
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn month_activity(
        &self,
        user_id: UserId,
        period: GoalPeriod,
        tag_ids: &[TagId],
    ) -> Result<MonthActivity, GoalRepositoryError> {
        let (start, end) = period.instant_range();
        let first_day = period.first_day();
        let last_day = period.last_day();
        let tag_ids: Vec<i32> = tag_ids.iter().map(|id| id.get()).collect();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction(|conn| {
            async move {
                let products_purchased: i64 = products::table
                    .filter(products::user_id.eq(user_id.get()))
                    .filter(products::deleted_at.is_null())
                    .filter(products::purchased.eq(true))
                    .filter(products::purchased_at.ge(start))
                    .filter(products::purchased_at.lt(end))
                    .select(count_star())
                    .get_result(conn)
                    .await?;

                let videos_logged: Option<i64> = video_logs::table
                    .inner_join(products::table)
                    .filter(products::user_id.eq(user_id.get()))
                    .filter(products::deleted_at.is_null())
                    .filter(video_logs::date.between(first_day, last_day))
                    .select(sum(video_logs::video_total))
                    .get_result(conn)
                    .await?;

                let category_purchases: Vec<(i32, i64)> = if tag_ids.is_empty() {
                    Vec::new()
                } else {
                    product_tags::table
                        .inner_join(products::table)
                        .filter(product_tags::tag_id.eq_any(&tag_ids))
                        .filter(products::user_id.eq(user_id.get()))
                        .filter(products::deleted_at.is_null())
                        .filter(products::purchased.eq(true))
                        .filter(products::purchased_at.ge(start))
                        .filter(products::purchased_at.lt(end))
                        .group_by(product_tags::tag_id)
                        .select((product_tags::tag_id, count_star()))
                        .load(conn)
                        .await?
                };

                Ok::<_, diesel::result::Error>(MonthActivity {
                    products_purchased,
                    videos_logged: videos_logged.unwrap_or_default(),
                    category_purchases: category_purchases
                        .into_iter()
                        .map(|(tag_id, count)| (TagId::new(tag_id), count))
                        .collect(),
                })
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }
}
