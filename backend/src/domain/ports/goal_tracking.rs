//! Driving port for monthly goals and their progress.

use async_trait::async_trait;

use crate::domain::{Error, Goal, GoalDraft, GoalId, GoalPeriod, GoalStats, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GoalTracking: Send + Sync {
    /// Upsert a goal and replace its category goals as one unit. Callers must
    /// not assume a fresh id is created.
    async fn create_or_update_goal(&self, user_id: UserId, draft: GoalDraft) -> Result<Goal, Error>;

    async fn list_goals(&self, user_id: UserId) -> Result<Vec<Goal>, Error>;

    async fn get_goal(&self, user_id: UserId, goal_id: GoalId) -> Result<Goal, Error>;

    async fn delete_goal(&self, user_id: UserId, goal_id: GoalId) -> Result<(), Error>;

    /// Actual-versus-target progress for the month; not found when the user
    /// set no goal for it.
    async fn goal_stats(&self, user_id: UserId, period: GoalPeriod) -> Result<GoalStats, Error>;
}
