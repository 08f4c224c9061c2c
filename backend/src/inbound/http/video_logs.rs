//! Video log HTTP handlers.
//!
//! ```text
//! POST /api/products/{id}/video_logs
//! GET  /api/products/{id}/video_logs?date=YYYY-MM-DD
//! GET  /api/products/{id}/video_logs/all
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{DailyVideoLog, ProductId, VideoCount, VideoLog, VideoLogWrite};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::products::timestamp;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_date, require, video_count_error};

/// Request payload for logging a day's videos.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct LogVideoBody {
    #[schema(format = "date", example = "2025-06-09")]
    pub date: Option<String>,
    #[schema(minimum = 0)]
    pub count: Option<i64>,
}

/// A stored video log row.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VideoLogBody {
    pub id: i32,
    pub product_id: i32,
    #[schema(format = "date")]
    pub date: String,
    pub count: i32,
    #[schema(format = "date-time")]
    pub created_at: String,
    #[schema(format = "date-time")]
    pub updated_at: String,
}

impl From<VideoLog> for VideoLogBody {
    fn from(log: VideoLog) -> Self {
        Self {
            id: log.id.get(),
            product_id: log.product_id.get(),
            date: log.date.to_string(),
            count: log.count,
            created_at: timestamp(log.created_at),
            updated_at: timestamp(log.updated_at),
        }
    }
}

/// Result of a log upsert, including the product's new total.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoggedVideoBody {
    pub log: VideoLogBody,
    /// Sum of every log of the product after this write.
    pub video_count: i32,
}

impl From<VideoLogWrite> for LoggedVideoBody {
    fn from(write: VideoLogWrite) -> Self {
        Self {
            log: write.log.into(),
            video_count: write.video_count,
        }
    }
}

/// One day's count; `id` is null when nothing was logged.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DailyVideoLogBody {
    pub id: Option<i32>,
    pub product_id: i32,
    #[schema(format = "date")]
    pub date: String,
    pub count: i32,
}

impl From<DailyVideoLog> for DailyVideoLogBody {
    fn from(daily: DailyVideoLog) -> Self {
        let count = daily.count();
        match daily {
            DailyVideoLog::Logged(log) => Self {
                id: Some(log.id.get()),
                product_id: log.product_id.get(),
                date: log.date.to_string(),
                count,
            },
            DailyVideoLog::Empty { product_id, date } => Self {
                id: None,
                product_id: product_id.get(),
                date: date.to_string(),
                count,
            },
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct VideoLogDateQuery {
    /// Day to read, `YYYY-MM-DD`.
    pub date: Option<String>,
}

/// Set the number of videos made for a product on one day and recompute
/// the product's total. Replaying the same request is harmless.
#[utoipa::path(
    post,
    path = "/api/products/{id}/video_logs",
    params(("id" = i32, Path, description = "Product id")),
    request_body = LogVideoBody,
    responses(
        (status = 201, description = "Log created", body = LoggedVideoBody),
        (status = 200, description = "Existing log overwritten", body = LoggedVideoBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 404, description = "Product not found", body = ErrorSchema),
        (status = 500, description = "Transaction failed", body = ErrorSchema)
    ),
    tags = ["video-logs"],
    operation_id = "logVideo",
    security(("bearerAuth" = []))
)]
#[post("/products/{id}/video_logs")]
pub async fn log_video(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
    payload: web::Json<LogVideoBody>,
) -> ApiResult<HttpResponse> {
    let LogVideoBody { date, count } = payload.into_inner();
    let date_field = FieldName::new("date");
    let date = parse_date(&require(date, date_field)?, date_field)?;
    let count = require(count, FieldName::new("count"))?;
    let count = VideoCount::new(count).map_err(|error| video_count_error(&error))?;

    let write = state
        .video_logs
        .log_video(user.user_id(), ProductId::new(path.into_inner()), date, count)
        .await?;
    let mut response = if write.created {
        HttpResponse::Created()
    } else {
        HttpResponse::Ok()
    };
    Ok(response.json(LoggedVideoBody::from(write)))
}

/// Read one day's count; a day without a log reads as zero.
#[utoipa::path(
    get,
    path = "/api/products/{id}/video_logs",
    params(("id" = i32, Path, description = "Product id"), VideoLogDateQuery),
    responses(
        (status = 200, description = "Count for the day", body = DailyVideoLogBody),
        (status = 400, description = "Invalid date", body = ErrorSchema),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 404, description = "Product not found", body = ErrorSchema)
    ),
    tags = ["video-logs"],
    operation_id = "getVideoLogForDate",
    security(("bearerAuth" = []))
)]
#[get("/products/{id}/video_logs")]
pub async fn video_log_for_date(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
    query: web::Query<VideoLogDateQuery>,
) -> ApiResult<web::Json<DailyVideoLogBody>> {
    let field = FieldName::new("date");
    let date = parse_date(&require(query.into_inner().date, field)?, field)?;
    let daily = state
        .video_logs
        .video_log_for_date(user.user_id(), ProductId::new(path.into_inner()), date)
        .await?;
    Ok(web::Json(daily.into()))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}/video_logs/all",
    params(("id" = i32, Path, description = "Product id")),
    responses(
        (status = 200, description = "Logs, newest day first", body = Vec<VideoLogBody>),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 404, description = "Product not found", body = ErrorSchema)
    ),
    tags = ["video-logs"],
    operation_id = "listVideoLogs",
    security(("bearerAuth" = []))
)]
#[get("/products/{id}/video_logs/all")]
pub async fn list_video_logs(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
) -> ApiResult<web::Json<Vec<VideoLogBody>>> {
    let logs = state
        .video_logs
        .list_video_logs(user.user_id(), ProductId::new(path.into_inner()))
        .await?;
    Ok(web::Json(logs.into_iter().map(VideoLogBody::from).collect()))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_video_logs)
        .service(log_video)
        .service(video_log_for_date);
}

#[cfg(test)]
#[path = "video_logs_tests.rs"]
mod tests;
