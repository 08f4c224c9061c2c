//! Monthly goals and their per-tag category targets.

use serde::Serialize;

use crate::domain::{CategoryGoalId, GoalId, GoalPeriod, Tag, TagName, TagNameError, UserId};

/// A per-tag product target inside a goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryGoal {
    pub id: CategoryGoalId,
    pub tag: Tag,
    pub product_goal: i32,
}

/// A persisted monthly goal with its category breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Goal {
    pub id: GoalId,
    pub user_id: UserId,
    pub period: GoalPeriod,
    pub product_goal: i32,
    pub video_goal: i32,
    pub category_goals: Vec<CategoryGoal>,
}

/// Validation failures for goal input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GoalValidationError {
    #[error("{field} must be a non-negative integer, got {value}")]
    NegativeTarget { field: &'static str, value: i64 },
    #[error("{field} is too large, got {value}")]
    TargetTooLarge { field: &'static str, value: i64 },
    #[error("invalid category tag: {0}")]
    Tag(#[from] TagNameError),
    #[error("tag {0} appears more than once in category goals")]
    DuplicateCategory(String),
}

/// Checked non-negative target count that fits the storage column.
fn target(field: &'static str, value: i64) -> Result<i32, GoalValidationError> {
    if value < 0 {
        return Err(GoalValidationError::NegativeTarget { field, value });
    }
    i32::try_from(value).map_err(|_| GoalValidationError::TargetTooLarge { field, value })
}

/// One `(tag name, target)` entry of a goal upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTarget {
    pub tag_name: TagName,
    pub product_goal: i32,
}

impl CategoryTarget {
    /// Validate a raw category entry.
    pub fn new(tag_name: &str, product_goal: i64) -> Result<Self, GoalValidationError> {
        Ok(Self {
            tag_name: TagName::new(tag_name)?,
            product_goal: target("category_goals.product_goal", product_goal)?,
        })
    }
}

/// Validated input for [`crate::domain::ports::GoalTracking::create_or_update_goal`].
///
/// `categories` is a full replacement: persisting a draft removes every
/// category goal not listed here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalDraft {
    id: Option<GoalId>,
    period: GoalPeriod,
    product_goal: i32,
    video_goal: i32,
    categories: Vec<CategoryTarget>,
}

impl GoalDraft {
    /// Validate targets and reject repeated category tags.
    ///
    /// # Examples
    /// ```
    /// use prodtrack::domain::{CategoryTarget, GoalDraft, GoalPeriod};
    ///
    /// let period = GoalPeriod::new(6, 2025).expect("valid period");
    /// let shoes = CategoryTarget::new("shoes", 2).expect("valid category");
    /// let draft = GoalDraft::new(None, period, 10, 40, vec![shoes]).expect("valid draft");
    /// assert_eq!(draft.product_goal(), 10);
    /// assert!(GoalDraft::new(None, period, -1, 40, vec![]).is_err());
    /// ```
    pub fn new(
        id: Option<GoalId>,
        period: GoalPeriod,
        product_goal: i64,
        video_goal: i64,
        categories: Vec<CategoryTarget>,
    ) -> Result<Self, GoalValidationError> {
        let product_goal = target("product_goal", product_goal)?;
        let video_goal = target("video_goal", video_goal)?;
        for (index, category) in categories.iter().enumerate() {
            let repeated = categories
                .iter()
                .skip(index + 1)
                .any(|other| other.tag_name == category.tag_name);
            if repeated {
                return Err(GoalValidationError::DuplicateCategory(
                    category.tag_name.as_str().to_owned(),
                ));
            }
        }
        Ok(Self {
            id,
            period,
            product_goal,
            video_goal,
            categories,
        })
    }

    /// Explicit goal to update; `None` upserts by month.
    pub fn id(&self) -> Option<GoalId> {
        self.id
    }

    /// Month the goal applies to.
    pub fn period(&self) -> GoalPeriod {
        self.period
    }

    /// Target number of purchased products.
    pub fn product_goal(&self) -> i32 {
        self.product_goal
    }

    /// Target number of logged videos.
    pub fn video_goal(&self) -> i32 {
        self.video_goal
    }

    /// Per-tag targets that replace the stored set.
    pub fn categories(&self) -> &[CategoryTarget] {
        &self.categories
    }
}
