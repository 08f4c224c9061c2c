//! Actual-versus-target progress for a monthly goal.

use serde::Serialize;

use crate::domain::{Goal, TagId};

/// Percentage of `target` reached by `actual`; zero when the target is zero.
///
/// Values above 100 are kept so over-achievement stays visible.
///
/// # Examples
/// ```
/// use prodtrack::domain::progress_percent;
///
/// assert_eq!(progress_percent(3, 4), 75.0);
/// assert_eq!(progress_percent(5, 0), 0.0);
/// ```
#[must_use]
pub fn progress_percent(actual: i64, target: i32) -> f64 {
    if target <= 0 {
        return 0.0;
    }
    // Counts stay far below 2^52, so the conversion is exact.
    let ratio = actual as f64 / f64::from(target);
    ratio * 100.0
}

/// Purchases within the month for one category goal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryActual {
    pub tag_id: TagId,
    pub tag_name: String,
    pub product_goal: i32,
    pub products_purchased: i64,
    pub progress: f64,
}

/// What the user actually achieved in the month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalActuals {
    pub products_purchased: i64,
    pub videos_logged: i64,
    pub categories: Vec<CategoryActual>,
}

/// Overall progress percentages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GoalProgress {
    pub product_progress: f64,
    pub video_progress: f64,
}

/// Result of the goal progress engine.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalStats {
    pub goal: Goal,
    pub actual: GoalActuals,
    pub progress: GoalProgress,
}

impl GoalStats {
    /// Combine a goal with its measured actuals.
    ///
    /// `category_purchases` holds the per-tag purchase counts; tags missing
    /// from it count as zero.
    #[must_use]
    pub fn compute(
        goal: Goal,
        products_purchased: i64,
        videos_logged: i64,
        category_purchases: &[(TagId, i64)],
    ) -> Self {
        let categories = goal
            .category_goals
            .iter()
            .map(|category| {
                let purchased = category_purchases
                    .iter()
                    .find(|(tag_id, _)| *tag_id == category.tag.id)
                    .map_or(0, |(_, count)| *count);
                CategoryActual {
                    tag_id: category.tag.id,
                    tag_name: category.tag.name.clone(),
                    product_goal: category.product_goal,
                    products_purchased: purchased,
                    progress: progress_percent(purchased, category.product_goal),
                }
            })
            .collect();
        let progress = GoalProgress {
            product_progress: progress_percent(products_purchased, goal.product_goal),
            video_progress: progress_percent(videos_logged, goal.video_goal),
        };
        Self {
            goal,
            actual: GoalActuals {
                products_purchased,
                videos_logged,
                categories,
            },
            progress,
        }
    }
}
