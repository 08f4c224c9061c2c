//! Monthly goal HTTP handlers.
//!
//! ```text
//! GET    /api/goals
//! POST   /api/goals
//! GET    /api/goals/stats?month=&year=
//! GET    /api/goals/{id}
//! DELETE /api/goals/{id}
//! ```

use actix_web::{HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    CategoryActual, CategoryGoal, CategoryTarget, Goal, GoalActuals, GoalDraft, GoalId,
    GoalPeriod, GoalProgress, GoalStats,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, goal_period_error, goal_validation_error, optional_number, require,
};

/// Per-tag purchase target inside a goal.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryGoalBody {
    pub tag_id: i32,
    pub tag_name: String,
    pub tag_color: String,
    pub product_goal: i32,
}

impl From<CategoryGoal> for CategoryGoalBody {
    fn from(category: CategoryGoal) -> Self {
        Self {
            tag_id: category.tag.id.get(),
            tag_name: category.tag.name,
            tag_color: category.tag.color,
            product_goal: category.product_goal,
        }
    }
}

/// A monthly goal with its category targets.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GoalBody {
    pub id: i32,
    #[schema(minimum = 1, maximum = 12)]
    pub month: u32,
    pub year: i32,
    pub product_goal: i32,
    pub video_goal: i32,
    pub category_goals: Vec<CategoryGoalBody>,
}

impl From<Goal> for GoalBody {
    fn from(goal: Goal) -> Self {
        Self {
            id: goal.id.get(),
            month: goal.period.month(),
            year: goal.period.year(),
            product_goal: goal.product_goal,
            video_goal: goal.video_goal,
            category_goals: goal
                .category_goals
                .into_iter()
                .map(CategoryGoalBody::from)
                .collect(),
        }
    }
}

/// Category entry of an upsert request.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CategoryGoalInput {
    pub tag_name: Option<String>,
    #[serde(default, deserialize_with = "optional_number")]
    pub product_goal: Option<i64>,
}

/// Request payload for creating or updating the goal of a month.
///
/// `category_goals` replaces the stored set; omitted targets default to 0.
/// Numeric fields also accept numeric strings, as sent by HTML form inputs.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpsertGoalBody {
    #[serde(default, deserialize_with = "optional_number")]
    pub id: Option<i32>,
    #[serde(default, deserialize_with = "optional_number")]
    pub month: Option<i64>,
    #[serde(default, deserialize_with = "optional_number")]
    pub year: Option<i64>,
    #[serde(default, deserialize_with = "optional_number")]
    pub product_goal: Option<i64>,
    #[serde(default, deserialize_with = "optional_number")]
    pub video_goal: Option<i64>,
    #[serde(default)]
    pub category_goals: Vec<CategoryGoalInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryActualBody {
    pub tag_id: i32,
    pub tag_name: String,
    pub product_goal: i32,
    pub products_purchased: i64,
    pub progress: f64,
}

impl From<CategoryActual> for CategoryActualBody {
    fn from(actual: CategoryActual) -> Self {
        Self {
            tag_id: actual.tag_id.get(),
            tag_name: actual.tag_name,
            product_goal: actual.product_goal,
            products_purchased: actual.products_purchased,
            progress: actual.progress,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GoalActualsBody {
    pub products_purchased: i64,
    pub videos_logged: i64,
    pub categories: Vec<CategoryActualBody>,
}

impl From<GoalActuals> for GoalActualsBody {
    fn from(actual: GoalActuals) -> Self {
        Self {
            products_purchased: actual.products_purchased,
            videos_logged: actual.videos_logged,
            categories: actual
                .categories
                .into_iter()
                .map(CategoryActualBody::from)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct GoalProgressBody {
    pub product_progress: f64,
    pub video_progress: f64,
}

impl From<GoalProgress> for GoalProgressBody {
    fn from(progress: GoalProgress) -> Self {
        Self {
            product_progress: progress.product_progress,
            video_progress: progress.video_progress,
        }
    }
}

/// Goal targets next to the month's actuals and percentages.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GoalStatsBody {
    pub goal: GoalBody,
    pub actual: GoalActualsBody,
    pub progress: GoalProgressBody,
}

impl From<GoalStats> for GoalStatsBody {
    fn from(stats: GoalStats) -> Self {
        Self {
            goal: stats.goal.into(),
            actual: stats.actual.into(),
            progress: stats.progress.into(),
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GoalStatsQuery {
    /// Month, 1-12.
    pub month: Option<i64>,
    /// Four-digit year.
    pub year: Option<i64>,
}

fn parse_period(month: Option<i64>, year: Option<i64>) -> ApiResult<GoalPeriod> {
    let month = require(month, FieldName::new("month"))?;
    let year = require(year, FieldName::new("year"))?;
    GoalPeriod::new(month, year).map_err(|error| goal_period_error(&error))
}

fn parse_goal_draft(body: UpsertGoalBody) -> ApiResult<GoalDraft> {
    let period = parse_period(body.month, body.year)?;
    let categories = body
        .category_goals
        .into_iter()
        .map(|entry| {
            let tag_name = require(entry.tag_name, FieldName::new("category_goals.tag_name"))?;
            CategoryTarget::new(&tag_name, entry.product_goal.unwrap_or_default())
                .map_err(|error| goal_validation_error(&error))
        })
        .collect::<ApiResult<Vec<_>>>()?;
    GoalDraft::new(
        body.id.map(GoalId::new),
        period,
        body.product_goal.unwrap_or_default(),
        body.video_goal.unwrap_or_default(),
        categories,
    )
    .map_err(|error| goal_validation_error(&error))
}

/// Goals of the caller, newest month first.
#[utoipa::path(
    get,
    path = "/api/goals",
    responses(
        (status = 200, description = "Goals", body = Vec<GoalBody>),
        (status = 401, description = "Unauthorized", body = ErrorSchema)
    ),
    tags = ["goals"],
    operation_id = "listGoals",
    security(("bearerAuth" = []))
)]
#[get("/goals")]
pub async fn list_goals(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
) -> ApiResult<web::Json<Vec<GoalBody>>> {
    let goals = state.goals.list_goals(user.user_id()).await?;
    Ok(web::Json(goals.into_iter().map(GoalBody::from).collect()))
}

/// Create or update the goal for a month and replace its category goals.
///
/// The goal row, the category deletions and the category inserts commit
/// together or not at all.
#[utoipa::path(
    post,
    path = "/api/goals",
    request_body = UpsertGoalBody,
    responses(
        (status = 200, description = "Stored goal", body = GoalBody),
        (status = 400, description = "Invalid request or month already taken", body = ErrorSchema),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 404, description = "Goal id not found", body = ErrorSchema)
    ),
    tags = ["goals"],
    operation_id = "createOrUpdateGoal",
    security(("bearerAuth" = []))
)]
#[post("/goals")]
pub async fn create_or_update_goal(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: web::Json<UpsertGoalBody>,
) -> ApiResult<web::Json<GoalBody>> {
    let draft = parse_goal_draft(payload.into_inner())?;
    let goal = state
        .goals
        .create_or_update_goal(user.user_id(), draft)
        .await?;
    Ok(web::Json(goal.into()))
}

/// Progress towards the goal of a month.
#[utoipa::path(
    get,
    path = "/api/goals/stats",
    params(GoalStatsQuery),
    responses(
        (status = 200, description = "Goal progress", body = GoalStatsBody),
        (status = 400, description = "Invalid month or year", body = ErrorSchema),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 404, description = "No goal for the month", body = ErrorSchema)
    ),
    tags = ["goals"],
    operation_id = "getGoalStats",
    security(("bearerAuth" = []))
)]
#[get("/goals/stats")]
pub async fn goal_stats(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    query: web::Query<GoalStatsQuery>,
) -> ApiResult<web::Json<GoalStatsBody>> {
    let GoalStatsQuery { month, year } = query.into_inner();
    let period = parse_period(month, year)?;
    let stats = state.goals.goal_stats(user.user_id(), period).await?;
    Ok(web::Json(stats.into()))
}

#[utoipa::path(
    get,
    path = "/api/goals/{id}",
    params(("id" = i32, Path, description = "Goal id")),
    responses(
        (status = 200, description = "Goal", body = GoalBody),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["goals"],
    operation_id = "getGoal",
    security(("bearerAuth" = []))
)]
#[get("/goals/{id}")]
pub async fn get_goal(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
) -> ApiResult<web::Json<GoalBody>> {
    let goal = state
        .goals
        .get_goal(user.user_id(), GoalId::new(path.into_inner()))
        .await?;
    Ok(web::Json(goal.into()))
}

#[utoipa::path(
    delete,
    path = "/api/goals/{id}",
    params(("id" = i32, Path, description = "Goal id")),
    responses(
        (status = 204, description = "Goal deleted"),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["goals"],
    operation_id = "deleteGoal",
    security(("bearerAuth" = []))
)]
#[delete("/goals/{id}")]
pub async fn delete_goal(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
) -> ApiResult<HttpResponse> {
    state
        .goals
        .delete_goal(user.user_id(), GoalId::new(path.into_inner()))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Register the goal routes. `stats` is registered ahead of `{id}`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_goals)
        .service(create_or_update_goal)
        .service(goal_stats)
        .service(get_goal)
        .service(delete_goal);
}

#[cfg(test)]
#[path = "goals_tests.rs"]
mod tests;
