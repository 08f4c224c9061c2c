//! Product HTTP handlers.
//!
//! ```text
//! GET    /api/products
//! POST   /api/products
//! GET    /api/products/trash
//! GET    /api/products/{id}
//! PUT    /api/products/{id}/purchase
//! DELETE /api/products/{id}
//! POST   /api/products/{id}/restore
//! DELETE /api/products/{id}/permanent
//! POST   /api/products/{id}/tags
//! DELETE /api/products/{id}/tags/{tag_id}
//! ```
//!
//! Listing filters are parsed leniently: a malformed filter is dropped and
//! the rest of the request still runs. Mutations reject bad input with
//! `invalid_request`.

use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::{DateTime, SecondsFormat, Utc};
use pagination::PageRequest;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::ListProductsRequest;
use crate::domain::{
    CreatedDateRange, Product, ProductDraft, ProductId, ProductListFilter, ProductListing,
    ProductSort, SearchTerm, StatusCounts, Tag, TagId, TagName,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, lenient_bool, lenient_date, lenient_non_negative, lenient_positive,
    lenient_tag_ids, product_validation_error, require, tag_name_error,
};

/// RFC 3339 rendering shared by every response body.
pub(crate) fn timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Tag attached to a product.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TagBody {
    pub id: i32,
    pub name: String,
    #[schema(example = "#3B82F6")]
    pub color: String,
}

impl From<Tag> for TagBody {
    fn from(tag: Tag) -> Self {
        Self {
            id: tag.id.get(),
            name: tag.name,
            color: tag.color,
        }
    }
}

/// Product as returned by every product endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductBody {
    pub id: i32,
    pub url: String,
    pub image_url: Option<String>,
    pub notes: String,
    pub purchased: bool,
    #[schema(format = "date-time")]
    pub purchased_at: Option<String>,
    pub video_count: i32,
    #[schema(format = "date-time")]
    pub created_at: String,
    #[schema(format = "date-time")]
    pub updated_at: String,
    #[schema(format = "date-time")]
    pub deleted_at: Option<String>,
    pub tags: Vec<TagBody>,
}

impl From<Product> for ProductBody {
    fn from(product: Product) -> Self {
        Self {
            id: product.id.get(),
            url: product.url,
            image_url: product.image_url,
            notes: product.notes,
            purchased: product.purchased,
            purchased_at: product.purchased_at.map(timestamp),
            video_count: product.video_count,
            created_at: timestamp(product.created_at),
            updated_at: timestamp(product.updated_at),
            deleted_at: product.deleted_at.map(timestamp),
            tags: product.tags.into_iter().map(TagBody::from).collect(),
        }
    }
}

/// Counters over every active product of the caller.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct StatusCountsBody {
    pub total: i64,
    pub pending: i64,
    pub purchased: i64,
}

impl From<StatusCounts> for StatusCountsBody {
    fn from(counts: StatusCounts) -> Self {
        Self {
            total: counts.total,
            pending: counts.pending,
            purchased: counts.purchased,
        }
    }
}

/// Paginated listing envelope.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductListingBody {
    pub products: Vec<ProductBody>,
    pub total_products: u64,
    pub current_page: u32,
    pub total_pages: u64,
    pub stats: StatusCountsBody,
}

impl From<ProductListing> for ProductListingBody {
    fn from(listing: ProductListing) -> Self {
        let ProductListing {
            page,
            status_counts,
        } = listing;
        Self {
            total_products: page.total_count(),
            current_page: page.current_page(),
            total_pages: page.total_pages(),
            products: page.into_items().into_iter().map(ProductBody::from).collect(),
            stats: status_counts.into(),
        }
    }
}

/// Query string for the listing. Every value arrives as text so that a
/// malformed or repeated filter can be ignored instead of failing the
/// request.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct ListProductsQuery {
    /// `true` for purchased products, `false` for pending ones.
    pub purchased: Option<String>,
    /// Comma-separated tag ids; products with any of them match.
    pub tags: Option<String>,
    /// Case-insensitive substring of the url or notes.
    pub search: Option<String>,
    /// Earliest creation day, `YYYY-MM-DD`.
    pub start_date: Option<String>,
    /// Latest creation day (inclusive), `YYYY-MM-DD`.
    pub end_date: Option<String>,
    /// Maximum `video_count`.
    pub max_video_count: Option<String>,
    /// `newest`, `oldest`, `most_videos` or `least_videos`.
    pub sort: Option<String>,
    /// 1-based page number.
    pub page: Option<String>,
    /// Page size, clamped to 1..=100.
    pub limit: Option<String>,
}

impl ListProductsQuery {
    /// Collect decoded query pairs. Scalar keys keep their first value and
    /// repeated `tags` keys are merged into one list.
    fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query = Self::default();
        let mut tags: Vec<String> = Vec::new();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "tags" | "tags[]" => {
                    tags.push(value);
                    continue;
                }
                "purchased" => &mut query.purchased,
                "search" => &mut query.search,
                "startDate" => &mut query.start_date,
                "endDate" => &mut query.end_date,
                "maxVideoCount" => &mut query.max_video_count,
                "sort" => &mut query.sort,
                "page" => &mut query.page,
                "limit" => &mut query.limit,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        if !tags.is_empty() {
            query.tags = Some(tags.join(","));
        }
        query
    }

    fn into_parts(self) -> (ProductListFilter, ProductSort, PageRequest) {
        let filter = ProductListFilter {
            purchased: lenient_bool(self.purchased.as_deref()),
            tag_ids: lenient_tag_ids(self.tags.as_deref()),
            search: self.search.as_deref().and_then(SearchTerm::parse),
            created: CreatedDateRange {
                from: lenient_date(self.start_date.as_deref()),
                to: lenient_date(self.end_date.as_deref()),
            },
            max_video_count: lenient_non_negative(self.max_video_count.as_deref()),
        };
        let sort = self
            .sort
            .as_deref()
            .and_then(ProductSort::from_keyword)
            .unwrap_or_default();
        let page = PageRequest::clamped(
            lenient_positive(self.page.as_deref()),
            lenient_positive(self.limit.as_deref()),
        );
        (filter, sort, page)
    }
}

/// Request payload for creating a product.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateProductBody {
    pub url: Option<String>,
    pub image_url: Option<String>,
    pub notes: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Request payload for toggling the purchased flag.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct SetPurchasedBody {
    pub purchased: Option<bool>,
}

/// Request payload for attaching a tag by name.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct AddTagBody {
    pub tag_name: Option<String>,
}

fn parse_draft(body: CreateProductBody) -> ApiResult<ProductDraft> {
    let url = require(body.url, FieldName::new("url"))?;
    ProductDraft::new(
        &url,
        body.image_url.as_deref(),
        body.notes.as_deref(),
        body.tags.iter().filter(|name| !name.trim().is_empty()),
    )
    .map_err(|error| product_validation_error(&error))
}

/// List the caller's active products with filters, sort, pagination and
/// status counters.
#[utoipa::path(
    get,
    path = "/api/products",
    params(ListProductsQuery),
    responses(
        (status = 200, description = "Product page", body = ProductListingBody),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["products"],
    operation_id = "listProducts",
    security(("bearerAuth" = []))
)]
#[get("/products")]
pub async fn list_products(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    query: web::Query<Vec<(String, String)>>,
) -> ApiResult<web::Json<ProductListingBody>> {
    let (filter, sort, page) = ListProductsQuery::from_pairs(query.into_inner()).into_parts();
    let listing = state
        .products
        .list_products(ListProductsRequest {
            user_id: user.user_id(),
            filter,
            sort,
            page,
        })
        .await?;
    Ok(web::Json(listing.into()))
}

/// Create a product, finding or creating its tags by name.
#[utoipa::path(
    post,
    path = "/api/products",
    request_body = CreateProductBody,
    responses(
        (status = 201, description = "Product created", body = ProductBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorized", body = ErrorSchema)
    ),
    tags = ["products"],
    operation_id = "createProduct",
    security(("bearerAuth" = []))
)]
#[post("/products")]
pub async fn create_product(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: web::Json<CreateProductBody>,
) -> ApiResult<HttpResponse> {
    let draft = parse_draft(payload.into_inner())?;
    let product = state
        .products
        .create_product(user.user_id(), draft)
        .await?;
    Ok(HttpResponse::Created().json(ProductBody::from(product)))
}

/// Trashed products, most recently trashed first.
#[utoipa::path(
    get,
    path = "/api/products/trash",
    responses(
        (status = 200, description = "Trashed products", body = Vec<ProductBody>),
        (status = 401, description = "Unauthorized", body = ErrorSchema)
    ),
    tags = ["products"],
    operation_id = "listTrash",
    security(("bearerAuth" = []))
)]
#[get("/products/trash")]
pub async fn list_trash(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
) -> ApiResult<web::Json<Vec<ProductBody>>> {
    let products = state.products.list_trash(user.user_id()).await?;
    Ok(web::Json(products.into_iter().map(ProductBody::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(("id" = i32, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product", body = ProductBody),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["products"],
    operation_id = "getProduct",
    security(("bearerAuth" = []))
)]
#[get("/products/{id}")]
pub async fn get_product(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
) -> ApiResult<web::Json<ProductBody>> {
    let product = state
        .products
        .get_product(user.user_id(), ProductId::new(path.into_inner()))
        .await?;
    Ok(web::Json(product.into()))
}

/// Mark a product purchased or pending. `purchased_at` is stamped on the
/// first transition to purchased and cleared when reverted.
#[utoipa::path(
    put,
    path = "/api/products/{id}/purchase",
    params(("id" = i32, Path, description = "Product id")),
    request_body = SetPurchasedBody,
    responses(
        (status = 200, description = "Updated product", body = ProductBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["products"],
    operation_id = "setPurchased",
    security(("bearerAuth" = []))
)]
#[put("/products/{id}/purchase")]
pub async fn set_purchased(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
    payload: web::Json<SetPurchasedBody>,
) -> ApiResult<web::Json<ProductBody>> {
    let purchased = require(payload.into_inner().purchased, FieldName::new("purchased"))?;
    let product = state
        .products
        .set_purchased(user.user_id(), ProductId::new(path.into_inner()), purchased)
        .await?;
    Ok(web::Json(product.into()))
}

/// Move a product to the trash.
#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    params(("id" = i32, Path, description = "Product id")),
    responses(
        (status = 204, description = "Product trashed"),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["products"],
    operation_id = "trashProduct",
    security(("bearerAuth" = []))
)]
#[delete("/products/{id}")]
pub async fn trash_product(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
) -> ApiResult<HttpResponse> {
    state
        .products
        .trash_product(user.user_id(), ProductId::new(path.into_inner()))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    post,
    path = "/api/products/{id}/restore",
    params(("id" = i32, Path, description = "Product id")),
    responses(
        (status = 200, description = "Restored product", body = ProductBody),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 404, description = "Not in trash", body = ErrorSchema)
    ),
    tags = ["products"],
    operation_id = "restoreProduct",
    security(("bearerAuth" = []))
)]
#[post("/products/{id}/restore")]
pub async fn restore_product(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
) -> ApiResult<web::Json<ProductBody>> {
    let product = state
        .products
        .restore_product(user.user_id(), ProductId::new(path.into_inner()))
        .await?;
    Ok(web::Json(product.into()))
}

/// Permanently delete a trashed product with its logs and tag links.
#[utoipa::path(
    delete,
    path = "/api/products/{id}/permanent",
    params(("id" = i32, Path, description = "Product id")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 404, description = "Not in trash", body = ErrorSchema)
    ),
    tags = ["products"],
    operation_id = "deleteProductPermanently",
    security(("bearerAuth" = []))
)]
#[delete("/products/{id}/permanent")]
pub async fn delete_product_permanently(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
) -> ApiResult<HttpResponse> {
    state
        .products
        .delete_product_permanently(user.user_id(), ProductId::new(path.into_inner()))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    post,
    path = "/api/products/{id}/tags",
    params(("id" = i32, Path, description = "Product id")),
    request_body = AddTagBody,
    responses(
        (status = 200, description = "Tagged product", body = ProductBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["products"],
    operation_id = "addProductTag",
    security(("bearerAuth" = []))
)]
#[post("/products/{id}/tags")]
pub async fn add_tag(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
    payload: web::Json<AddTagBody>,
) -> ApiResult<web::Json<ProductBody>> {
    let field = FieldName::new("tag_name");
    let raw = require(payload.into_inner().tag_name, field)?;
    let tag_name = TagName::new(raw).map_err(|error| tag_name_error(&error, field))?;
    let product = state
        .products
        .add_tag(user.user_id(), ProductId::new(path.into_inner()), tag_name)
        .await?;
    Ok(web::Json(product.into()))
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}/tags/{tag_id}",
    params(
        ("id" = i32, Path, description = "Product id"),
        ("tag_id" = i32, Path, description = "Tag id")
    ),
    responses(
        (status = 200, description = "Untagged product", body = ProductBody),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["products"],
    operation_id = "removeProductTag",
    security(("bearerAuth" = []))
)]
#[delete("/products/{id}/tags/{tag_id}")]
pub async fn remove_tag(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<(i32, i32)>,
) -> ApiResult<web::Json<ProductBody>> {
    let (product_id, tag_id) = path.into_inner();
    let product = state
        .products
        .remove_tag(user.user_id(), ProductId::new(product_id), TagId::new(tag_id))
        .await?;
    Ok(web::Json(product.into()))
}

/// Register the product routes. `trash` is registered ahead of `{id}`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_products)
        .service(create_product)
        .service(list_trash)
        .service(get_product)
        .service(set_purchased)
        .service(trash_product)
        .service(restore_product)
        .service(delete_product_permanently)
        .service(add_tag)
        .service(remove_tag);
}

#[cfg(test)]
#[path = "products_tests.rs"]
mod tests;
