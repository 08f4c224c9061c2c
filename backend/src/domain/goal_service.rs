//! Goal tracking service: goal upsert and the goal progress engine.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::info;

use crate::domain::ports::{GoalRepository, GoalRepositoryError, GoalTracking};
use crate::domain::{Error, Goal, GoalDraft, GoalId, GoalPeriod, GoalStats, TagId, UserId};

/// Goal service backed by a [`GoalRepository`].
#[derive(Clone)]
pub struct GoalService<R> {
    goals: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> GoalService<R> {
    /// Build the service; `clock` stamps goal writes.
    pub fn new(goals: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { goals, clock }
    }
}

fn map_repository_error(error: GoalRepositoryError) -> Error {
    match error {
        GoalRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("goal repository unavailable: {message}"))
        }
        GoalRepositoryError::Query { message } => {
            Error::internal(format!("goal repository error: {message}"))
        }
        GoalRepositoryError::GoalNotFound { goal_id } => {
            Error::not_found(format!("goal {goal_id} not found"))
        }
        GoalRepositoryError::PeriodTaken { month, year } => {
            Error::already_exists(format!("a goal for {month}/{year} already exists"))
                .with_details(json!({
                    "code": "already_exists",
                    "month": month,
                    "year": year,
                }))
        }
    }
}

fn goal_not_found(goal_id: GoalId) -> Error {
    Error::not_found(format!("goal {goal_id} not found"))
}

#[async_trait]
impl<R> GoalTracking for GoalService<R>
where
    R: GoalRepository,
{
    async fn create_or_update_goal(&self, user_id: UserId, draft: GoalDraft) -> Result<Goal, Error> {
        let goal = self
            .goals
            .upsert(user_id, &draft, self.clock.utc())
            .await
            .map_err(map_repository_error)?;
        info!(
            user_id = %user_id,
            goal_id = %goal.id,
            month = goal.period.month(),
            year = goal.period.year(),
            categories = goal.category_goals.len(),
            "goal saved"
        );
        Ok(goal)
    }

    async fn list_goals(&self, user_id: UserId) -> Result<Vec<Goal>, Error> {
        self.goals.list(user_id).await.map_err(map_repository_error)
    }

    async fn get_goal(&self, user_id: UserId, goal_id: GoalId) -> Result<Goal, Error> {
        self.goals
            .find(user_id, goal_id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| goal_not_found(goal_id))
    }

    async fn delete_goal(&self, user_id: UserId, goal_id: GoalId) -> Result<(), Error> {
        let deleted = self
            .goals
            .delete(user_id, goal_id)
            .await
            .map_err(map_repository_error)?;
        if deleted {
            Ok(())
        } else {
            Err(goal_not_found(goal_id))
        }
    }

    async fn goal_stats(&self, user_id: UserId, period: GoalPeriod) -> Result<GoalStats, Error> {
        let goal = self
            .goals
            .find_for_period(user_id, period)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| {
                Error::not_found(format!(
                    "no goal set for {}/{}",
                    period.month(),
                    period.year()
                ))
            })?;
        let tag_ids: Vec<TagId> = goal
            .category_goals
            .iter()
            .map(|category| category.tag.id)
            .collect();
        let activity = self
            .goals
            .month_activity(user_id, period, &tag_ids)
            .await
            .map_err(map_repository_error)?;
        Ok(GoalStats::compute(
            goal,
            activity.products_purchased,
            activity.videos_logged,
            &activity.category_purchases,
        ))
    }
}

#[cfg(test)]
#[path = "goal_service_tests.rs"]
mod tests;
