//! Driven port for goal persistence and monthly activity measurement.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Goal, GoalDraft, GoalId, GoalPeriod, TagId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by goal repository adapters.
    pub enum GoalRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "goal repository connection failed: {message}",
        /// Query or mutation failed; any open transaction was rolled back.
        Query { message: String } =>
            "goal repository query failed: {message}",
        /// An explicit goal id did not belong to the user.
        GoalNotFound { goal_id: i32 } =>
            "goal {goal_id} not found",
        /// Another goal already covers the month.
        PeriodTaken { month: u32, year: i32 } =>
            "a goal for {month}/{year} already exists",
    }
}

/// What the user did in one month, as measured from the store.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MonthActivity {
    /// Active products whose `purchased_at` falls in the month.
    pub products_purchased: i64,
    /// Sum of video log counts dated within the month, over active products.
    pub videos_logged: i64,
    /// Purchases in the month per requested tag. Tags with no purchases may
    /// be omitted.
    pub category_purchases: Vec<(TagId, i64)>,
}

/// Port for goal storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GoalRepository: Send + Sync {
    /// Insert or update the goal and replace its category goals, as one
    /// transaction, then reload it with tags.
    ///
    /// Without an explicit id the upsert is keyed on `(user, month, year)`.
    /// With an id, that goal must belong to the user
    /// ([`GoalRepositoryError::GoalNotFound`]) and moving it onto a month
    /// held by another goal yields [`GoalRepositoryError::PeriodTaken`].
    /// Category tags are found or created by name inside the transaction.
    /// `now` stamps `created_at` on insert and `updated_at` on every write.
    async fn upsert(
        &self,
        user_id: UserId,
        draft: &GoalDraft,
        now: DateTime<Utc>,
    ) -> Result<Goal, GoalRepositoryError>;

    /// All goals of the user, newest month first.
    async fn list(&self, user_id: UserId) -> Result<Vec<Goal>, GoalRepositoryError>;

    async fn find(&self, user_id: UserId, goal_id: GoalId)
    -> Result<Option<Goal>, GoalRepositoryError>;

    async fn find_for_period(
        &self,
        user_id: UserId,
        period: GoalPeriod,
    ) -> Result<Option<Goal>, GoalRepositoryError>;

    /// Delete the goal and its category goals. Returns `false` when the user
    /// has no such goal.
    async fn delete(&self, user_id: UserId, goal_id: GoalId) -> Result<bool, GoalRepositoryError>;

    /// Measure purchases and logged videos for the month.
    async fn month_activity(
        &self,
        user_id: UserId,
        period: GoalPeriod,
        tag_ids: &[TagId],
    ) -> Result<MonthActivity, GoalRepositoryError>;
}

/// Fixture repository holding no goals.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureGoalRepository;

#[async_trait]
impl GoalRepository for FixtureGoalRepository {
    async fn upsert(
        &self,
        _user_id: UserId,
        _draft: &GoalDraft,
        _now: DateTime<Utc>,
    ) -> Result<Goal, GoalRepositoryError> {
        Err(GoalRepositoryError::connection(
            "fixture repository cannot store goals",
        ))
    }

    async fn list(&self, _user_id: UserId) -> Result<Vec<Goal>, GoalRepositoryError> {
        Ok(Vec::new())
    }

    async fn find(
        &self,
        _user_id: UserId,
        _goal_id: GoalId,
    ) -> Result<Option<Goal>, GoalRepositoryError> {
        Ok(None)
    }

    async fn find_for_period(
        &self,
        _user_id: UserId,
        _period: GoalPeriod,
    ) -> Result<Option<Goal>, GoalRepositoryError> {
        Ok(None)
    }

    async fn delete(&self, _user_id: UserId, _goal_id: GoalId) -> Result<bool, GoalRepositoryError> {
        Ok(false)
    }

    async fn month_activity(
        &self,
        _user_id: UserId,
        _period: GoalPeriod,
        _tag_ids: &[TagId],
    ) -> Result<MonthActivity, GoalRepositoryError> {
        Ok(MonthActivity::default())
    }
}
