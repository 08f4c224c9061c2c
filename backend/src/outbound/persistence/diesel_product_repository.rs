//! PostgreSQL-backed `ProductRepository` implementation using Diesel ORM.
//!
//! Every query starts from the owner scope. Active reads add
//! `deleted_at IS NULL`, trash reads add `deleted_at IS NOT NULL`. Listing
//! builds its predicate once per statement so the count and the page slice
//! see exactly the same filter.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::dsl::count_star;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_types::Bool;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, AsyncPgConnection, RunQueryDsl};
use pagination::{Page, PageRequest};

use crate::domain::ports::{
    NewProduct, ProductRepository, ProductRepositoryError, PurchaseUpdate,
};
use crate::domain::{
    Product, ProductId, ProductListFilter, ProductSort, StatusCounts, Tag, TagId, UserId,
};

use super::error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewProductRow, NewProductTagRow, ProductRow, PurchaseChangeset, TagRow};
use super::pool::{DbPool, PoolError};
use super::schema::{product_tags, products, tags, video_logs};

type ProductPredicate = Box<dyn BoxableExpression<products::table, Pg, SqlType = Bool>>;

/// Diesel-backed implementation of the product repository port.
#[derive(Clone)]
pub struct DieselProductRepository {
    pool: DbPool,
}

impl DieselProductRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ProductRepositoryError {
    map_basic_pool_error(error, ProductRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ProductRepositoryError {
    map_basic_diesel_error(
        error,
        ProductRepositoryError::query,
        ProductRepositoryError::connection,
    )
}

fn to_db_offset(value: u64) -> Result<i64, ProductRepositoryError> {
    i64::try_from(value)
        .map_err(|_| ProductRepositoryError::query(format!("page window {value} out of range")))
}

/// Owner plus not-trashed scope shared by every active read.
fn active_scope(user_id: UserId) -> ProductPredicate {
    Box::new(
        products::user_id
            .eq(user_id.get())
            .and(products::deleted_at.is_null()),
    )
}

/// Full listing predicate: active scope narrowed by every supplied filter.
fn listing_predicate(user_id: UserId, filter: &ProductListFilter) -> ProductPredicate {
    let mut predicate = active_scope(user_id);

    if let Some(purchased) = filter.purchased {
        predicate = Box::new(predicate.and(products::purchased.eq(purchased)));
    }

    if !filter.tag_ids.is_empty() {
        let tag_ids: Vec<i32> = filter.tag_ids.iter().map(|id| id.get()).collect();
        let tagged = product_tags::table
            .filter(product_tags::tag_id.eq_any(tag_ids))
            .select(product_tags::product_id);
        predicate = Box::new(predicate.and(products::id.eq_any(tagged)));
    }

    if let Some(search) = &filter.search {
        let pattern = search.like_pattern();
        predicate = Box::new(
            predicate.and(
                products::url
                    .ilike(pattern.clone())
                    .or(products::notes.ilike(pattern)),
            ),
        );
    }

    if let Some(start) = filter.created.start_instant() {
        predicate = Box::new(predicate.and(products::created_at.ge(start)));
    }

    if let Some(end) = filter.created.end_instant_exclusive() {
        predicate = Box::new(predicate.and(products::created_at.lt(end)));
    }

    if let Some(max) = filter.max_video_count {
        predicate = Box::new(predicate.and(products::video_count.le(max)));
    }

    predicate
}

/// Load the tags of every listed product in one round trip, grouped by
/// product id and ordered by tag name.
async fn load_tags(
    conn: &mut AsyncPgConnection,
    product_ids: &[i32],
) -> Result<HashMap<i32, Vec<Tag>>, diesel::result::Error> {
    if product_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows: Vec<(i32, TagRow)> = product_tags::table
        .inner_join(tags::table)
        .filter(product_tags::product_id.eq_any(product_ids))
        .order_by((product_tags::product_id, tags::name))
        .select((product_tags::product_id, TagRow::as_select()))
        .load(conn)
        .await?;

    let mut grouped: HashMap<i32, Vec<Tag>> = HashMap::new();
    for (product_id, tag) in rows {
        grouped.entry(product_id).or_default().push(tag.into());
    }
    Ok(grouped)
}

fn row_to_product(row: ProductRow, tags: Vec<Tag>) -> Product {
    let ProductRow {
        id,
        user_id,
        url,
        image_url,
        notes,
        purchased,
        purchased_at,
        video_count,
        created_at,
        updated_at,
        deleted_at,
    } = row;

    Product {
        id: ProductId::new(id),
        user_id: UserId::new(user_id),
        url,
        image_url,
        notes,
        purchased,
        purchased_at,
        video_count,
        created_at,
        updated_at,
        deleted_at,
        tags,
    }
}

async fn with_tags(
    conn: &mut AsyncPgConnection,
    rows: Vec<ProductRow>,
) -> Result<Vec<Product>, diesel::result::Error> {
    let ids: Vec<i32> = rows.iter().map(|row| row.id).collect();
    let mut tags = load_tags(conn, &ids).await?;
    Ok(rows
        .into_iter()
        .map(|row| {
            let product_tags = tags.remove(&row.id).unwrap_or_default();
            row_to_product(row, product_tags)
        })
        .collect())
}

async fn find_active_row(
    conn: &mut AsyncPgConnection,
    user_id: UserId,
    product_id: ProductId,
) -> Result<Option<ProductRow>, diesel::result::Error> {
    products::table
        .filter(active_scope(user_id))
        .filter(products::id.eq(product_id.get()))
        .select(ProductRow::as_select())
        .first(conn)
        .await
        .optional()
}

async fn single_with_tags(
    conn: &mut AsyncPgConnection,
    row: Option<ProductRow>,
) -> Result<Option<Product>, diesel::result::Error> {
    match row {
        Some(row) => Ok(with_tags(conn, vec![row]).await?.into_iter().next()),
        None => Ok(None),
    }
}

#[async_trait]
impl ProductRepository for DieselProductRepository {
    async fn list_active(
        &self,
        user_id: UserId,
        filter: &ProductListFilter,
        sort: ProductSort,
        page: PageRequest,
    ) -> Result<Page<Product>, ProductRepositoryError> {
        let limit = to_db_offset(page.limit())?;
        let offset = to_db_offset(page.offset())?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        // Repeatable read pins one snapshot for the count and the slice.
        let (total, items) = conn
            .build_transaction()
            .repeatable_read()
            .read_only()
            .run(|conn| {
                async move {
                    let total: i64 = products::table
                        .filter(listing_predicate(user_id, filter))
                        .select(count_star())
                        .get_result(conn)
                        .await?;

                    let query = products::table
                        .filter(listing_predicate(user_id, filter))
                        .select(ProductRow::as_select())
                        .into_boxed();
                    let query = match sort {
                        ProductSort::Newest => {
                            query.order_by((products::created_at.desc(), products::id.desc()))
                        }
                        ProductSort::Oldest => {
                            query.order_by((products::created_at.asc(), products::id.asc()))
                        }
                        ProductSort::MostVideos => {
                            query.order_by((products::video_count.desc(), products::id.desc()))
                        }
                        ProductSort::LeastVideos => {
                            query.order_by((products::video_count.asc(), products::id.asc()))
                        }
                    };
                    let rows: Vec<ProductRow> =
                        query.limit(limit).offset(offset).load(conn).await?;
                    let items = with_tags(conn, rows).await?;
                    Ok::<_, diesel::result::Error>((total, items))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        let total = u64::try_from(total).unwrap_or_default();
        Ok(Page::new(items, total, page))
    }

    async fn status_counts(&self, user_id: UserId) -> Result<StatusCounts, ProductRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let groups: Vec<(bool, i64)> = products::table
            .filter(active_scope(user_id))
            .group_by(products::purchased)
            .select((products::purchased, count_star()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let (purchased, pending) =
            groups
                .into_iter()
                .fold((0, 0), |(purchased, pending), (flag, count)| {
                    if flag {
                        (purchased + count, pending)
                    } else {
                        (purchased, pending + count)
                    }
                });
        Ok(StatusCounts::from_split(purchased, pending))
    }

    async fn find_active(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<Option<Product>, ProductRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = find_active_row(&mut conn, user_id, product_id)
            .await
            .map_err(map_diesel_error)?;
        single_with_tags(&mut conn, row)
            .await
            .map_err(map_diesel_error)
    }

    async fn insert(
        &self,
        user_id: UserId,
        product: &NewProduct,
    ) -> Result<Product, ProductRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let new_row = NewProductRow {
            user_id: user_id.get(),
            url: &product.url,
            image_url: product.image_url.as_deref(),
            notes: &product.notes,
            created_at: product.created_at,
            updated_at: product.created_at,
        };
        let links: Vec<i32> = product.tag_ids.iter().map(|id| id.get()).collect();

        conn.transaction(|conn| {
            async move {
                let row: ProductRow = diesel::insert_into(products::table)
                    .values(&new_row)
                    .returning(ProductRow::as_returning())
                    .get_result(conn)
                    .await?;

                if !links.is_empty() {
                    let link_rows: Vec<NewProductTagRow> = links
                        .iter()
                        .map(|&tag_id| NewProductTagRow {
                            product_id: row.id,
                            tag_id,
                        })
                        .collect();
                    diesel::insert_into(product_tags::table)
                        .values(&link_rows)
                        .on_conflict_do_nothing()
                        .execute(conn)
                        .await?;
                }

                let mut products = with_tags(conn, vec![row]).await?;
                products.pop().ok_or(diesel::result::Error::NotFound)
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn update_purchase(
        &self,
        user_id: UserId,
        product_id: ProductId,
        update: PurchaseUpdate,
    ) -> Result<Option<Product>, ProductRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changes = PurchaseChangeset {
            purchased: update.purchased,
            purchased_at: update.purchased_at,
            updated_at: update.updated_at,
        };

        let row = diesel::update(
            products::table
                .filter(active_scope(user_id))
                .filter(products::id.eq(product_id.get()))
                .filter(products::purchased.eq(!update.purchased)),
        )
        .set(changes)
        .returning(ProductRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;

        single_with_tags(&mut conn, row)
            .await
            .map_err(map_diesel_error)
    }

    async fn soft_delete(
        &self,
        user_id: UserId,
        product_id: ProductId,
        deleted_at: DateTime<Utc>,
    ) -> Result<bool, ProductRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(
            products::table
                .filter(active_scope(user_id))
                .filter(products::id.eq(product_id.get())),
        )
        .set((
            products::deleted_at.eq(Some(deleted_at)),
            products::updated_at.eq(deleted_at),
        ))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    async fn list_trashed(&self, user_id: UserId) -> Result<Vec<Product>, ProductRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ProductRow> = products::table
            .filter(products::user_id.eq(user_id.get()))
            .filter(products::deleted_at.is_not_null())
            .order_by((products::deleted_at.desc(), products::id.desc()))
            .select(ProductRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        with_tags(&mut conn, rows).await.map_err(map_diesel_error)
    }

    async fn restore(
        &self,
        user_id: UserId,
        product_id: ProductId,
        restored_at: DateTime<Utc>,
    ) -> Result<Option<Product>, ProductRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = diesel::update(
            products::table
                .filter(products::user_id.eq(user_id.get()))
                .filter(products::id.eq(product_id.get()))
                .filter(products::deleted_at.is_not_null()),
        )
        .set((
            products::deleted_at.eq(None::<DateTime<Utc>>),
            products::updated_at.eq(restored_at),
        ))
        .returning(ProductRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;

        single_with_tags(&mut conn, row)
            .await
            .map_err(map_diesel_error)
    }

    async fn purge(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<bool, ProductRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let id = product_id.get();

        conn.transaction(|conn| {
            async move {
                let trashed: Option<i32> = products::table
                    .filter(products::user_id.eq(user_id.get()))
                    .filter(products::id.eq(id))
                    .filter(products::deleted_at.is_not_null())
                    .select(products::id)
                    .for_update()
                    .first(conn)
                    .await
                    .optional()?;
                if trashed.is_none() {
                    return Ok(false);
                }

                diesel::delete(video_logs::table.filter(video_logs::product_id.eq(id)))
                    .execute(conn)
                    .await?;
                diesel::delete(product_tags::table.filter(product_tags::product_id.eq(id)))
                    .execute(conn)
                    .await?;
                let removed = diesel::delete(products::table.filter(products::id.eq(id)))
                    .execute(conn)
                    .await?;
                Ok::<_, diesel::result::Error>(removed > 0)
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn link_tag(
        &self,
        user_id: UserId,
        product_id: ProductId,
        tag_id: TagId,
    ) -> Result<bool, ProductRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction(|conn| {
            async move {
                if find_active_row(conn, user_id, product_id).await?.is_none() {
                    return Ok(false);
                }
                diesel::insert_into(product_tags::table)
                    .values(NewProductTagRow {
                        product_id: product_id.get(),
                        tag_id: tag_id.get(),
                    })
                    .on_conflict_do_nothing()
                    .execute(conn)
                    .await?;
                Ok::<_, diesel::result::Error>(true)
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn unlink_tag(
        &self,
        user_id: UserId,
        product_id: ProductId,
        tag_id: TagId,
    ) -> Result<bool, ProductRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction(|conn| {
            async move {
                if find_active_row(conn, user_id, product_id).await?.is_none() {
                    return Ok(false);
                }
                diesel::delete(
                    product_tags::table
                        .filter(product_tags::product_id.eq(product_id.get()))
                        .filter(product_tags::tag_id.eq(tag_id.get())),
                )
                .execute(conn)
                .await?;
                Ok::<_, diesel::result::Error>(true)
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }
}
