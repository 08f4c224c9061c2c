//! Domain entities, services and ports.
//!
//! Purpose: hold the product-tracking rules independent of HTTP and SQL.
//! Inbound adapters call the driving ports in [`ports`]; services in this
//! module implement them on top of the driven ports that outbound adapters
//! provide.
//!
//! Public surface:
//! - [`Error`] / [`ErrorCode`]: transport-agnostic failure payload.
//! - [`TraceId`]: request correlation id in task-local storage.
//! - Aggregates: [`Product`], [`Goal`], [`VideoLog`], [`Tag`].
//! - Engines: [`ProductService`] (listing and lifecycle), [`GoalService`]
//!   (upsert and progress) and [`VideoLogService`] (per-day logs).

pub mod error;
pub mod ports;
pub mod trace_id;

mod goal;
mod goal_period;
mod goal_service;
mod goal_stats;
mod identifiers;
mod product;
mod product_listing;
mod product_service;
mod tag;
mod video_log;
mod video_log_service;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::goal::{CategoryGoal, CategoryTarget, Goal, GoalDraft, GoalValidationError};
pub use self::goal_period::{GoalPeriod, GoalPeriodError};
pub use self::goal_service::GoalService;
pub use self::goal_stats::{CategoryActual, GoalActuals, GoalProgress, GoalStats, progress_percent};
pub use self::identifiers::{CategoryGoalId, GoalId, ProductId, TagId, UserId, VideoLogId};
pub use self::product::{
    MAX_URL_CHARS, Product, ProductDraft, ProductValidationError, PurchaseTransition,
};
pub use self::product_listing::{
    CreatedDateRange, ProductListFilter, ProductListing, ProductSort, SearchTerm, StatusCounts,
};
pub use self::product_service::ProductService;
pub use self::tag::{DEFAULT_TAG_COLOR, MAX_TAG_NAME_CHARS, Tag, TagName, TagNameError};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::video_log::{DailyVideoLog, VideoCount, VideoCountError, VideoLog, VideoLogWrite};
pub use self::video_log_service::VideoLogService;
