//! PostgreSQL-backed `TagRegistry` implementation using Diesel ORM.
//!
//! Tag names are globally unique. The find-or-create helper is shared with
//! the goal repository so category goals resolve their tags inside the same
//! transaction that writes them.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::domain::ports::{TagRegistry, TagRegistryError};
use crate::domain::{DEFAULT_TAG_COLOR, Tag, TagName};

use super::error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewTagRow, TagRow};
use super::pool::DbPool;
use super::schema::tags;

/// Diesel-backed implementation of the tag registry port.
#[derive(Clone)]
pub struct DieselTagRegistry {
    pool: DbPool,
}

impl DieselTagRegistry {
    /// Create a new registry with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Resolve `name` to its tag row, inserting it with the default colour when
/// it does not exist yet.
///
/// `ON CONFLICT DO NOTHING` keeps concurrent callers from tripping the unique
/// index; whichever insert wins, the follow-up select sees the row.
pub(super) async fn find_or_create_tag(
    conn: &mut AsyncPgConnection,
    name: &TagName,
) -> Result<Tag, diesel::result::Error> {
    diesel::insert_into(tags::table)
        .values(NewTagRow {
            name: name.as_str(),
            color: DEFAULT_TAG_COLOR,
        })
        .on_conflict(tags::name)
        .do_nothing()
        .execute(conn)
        .await?;

    tags::table
        .filter(tags::name.eq(name.as_str()))
        .select(TagRow::as_select())
        .first(conn)
        .await
        .map(Tag::from)
}

#[async_trait]
impl TagRegistry for DieselTagRegistry {
    async fn find_or_create(&self, name: &TagName) -> Result<Tag, TagRegistryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|error| map_basic_pool_error(error, TagRegistryError::connection))?;

        find_or_create_tag(&mut conn, name)
            .await
            .map_err(|error| {
                map_basic_diesel_error(
                    error,
                    TagRegistryError::query,
                    TagRegistryError::connection,
                )
            })
    }
}
