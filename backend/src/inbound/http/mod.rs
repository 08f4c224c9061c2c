//! HTTP inbound adapter exposing the REST endpoints under `/api`.

pub mod auth;
pub mod error;
pub mod goals;
pub mod health;
pub mod products;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod validation;
pub mod video_logs;

pub use error::ApiResult;

use actix_web::web;

/// Register every authenticated API route on a scope.
///
/// The video log routes go first so `/products/{id}/video_logs/all` never
/// reaches a broader product pattern.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.configure(video_logs::configure)
        .configure(products::configure)
        .configure(goals::configure);
}
