//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversion into domain values happens in
//! the adapters, which own the validation failures that can arise.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;

use crate::domain::{Tag, TagId};

use super::schema::{category_goals, goals, product_tags, products, tags, video_logs};

// ---------------------------------------------------------------------------
// Products
// ---------------------------------------------------------------------------

/// Row struct for reading from the products table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProductRow {
    pub id: i32,
    pub user_id: i32,
    pub url: String,
    pub image_url: Option<String>,
    pub notes: String,
    pub purchased: bool,
    pub purchased_at: Option<DateTime<Utc>>,
    pub video_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = products)]
pub(crate) struct NewProductRow<'a> {
    pub user_id: i32,
    pub url: &'a str,
    pub image_url: Option<&'a str>,
    pub notes: &'a str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Changeset for the purchase toggle. `purchased_at` is written even when
/// `None` so a revert clears the stamp.
#[derive(Debug, Clone, Copy, AsChangeset)]
#[diesel(table_name = products)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct PurchaseChangeset {
    pub purchased: bool,
    pub purchased_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Insertable)]
#[diesel(table_name = product_tags)]
pub(crate) struct NewProductTagRow {
    pub product_id: i32,
    pub tag_id: i32,
}

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tags)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TagRow {
    pub id: i32,
    pub name: String,
    pub color: String,
}

impl From<TagRow> for Tag {
    fn from(row: TagRow) -> Self {
        Self {
            id: TagId::new(row.id),
            name: row.name,
            color: row.color,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tags)]
pub(crate) struct NewTagRow<'a> {
    pub name: &'a str,
    pub color: &'a str,
}

// ---------------------------------------------------------------------------
// Goals
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = goals)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct GoalRow {
    pub id: i32,
    pub user_id: i32,
    pub month: i32,
    pub year: i32,
    pub product_goal: i32,
    pub video_goal: i32,
}

#[derive(Debug, Clone, Copy, Insertable)]
#[diesel(table_name = goals)]
pub(crate) struct NewGoalRow {
    pub user_id: i32,
    pub month: i32,
    pub year: i32,
    pub product_goal: i32,
    pub video_goal: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, AsChangeset)]
#[diesel(table_name = goals)]
pub(crate) struct GoalChangeset {
    pub month: i32,
    pub year: i32,
    pub product_goal: i32,
    pub video_goal: i32,
    pub updated_at: DateTime<Utc>,
}

/// Category goal joined with its tag.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = category_goals)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CategoryGoalRow {
    pub id: i32,
    pub goal_id: i32,
    pub product_goal: i32,
    #[diesel(embed)]
    pub tag: TagRow,
}

#[derive(Debug, Clone, Copy, Insertable)]
#[diesel(table_name = category_goals)]
pub(crate) struct NewCategoryGoalRow {
    pub goal_id: i32,
    pub tag_id: i32,
    pub product_goal: i32,
}

// ---------------------------------------------------------------------------
// Video logs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = video_logs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct VideoLogRow {
    pub id: i32,
    pub product_id: i32,
    pub date: NaiveDate,
    pub video_total: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Insertable)]
#[diesel(table_name = video_logs)]
pub(crate) struct NewVideoLogRow {
    pub product_id: i32,
    pub date: NaiveDate,
    pub video_total: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
