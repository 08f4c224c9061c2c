//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the driven ports backed by PostgreSQL via
//! `diesel-async` with `bb8` connection pooling.
//!
//! - Repository implementations translate between Diesel rows and domain
//!   types. Business rules stay in the domain services.
//! - Row structs (`models.rs`) and table definitions (`schema.rs`) never
//!   leave this module.
//! - Multi-statement writes run inside a single database transaction.
//!
//! ```ignore
//! use prodtrack::outbound::persistence::{DbPool, DieselProductRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/prodtrack")).await?;
//! let products = DieselProductRepository::new(pool);
//! ```

mod diesel_goal_repository;
mod diesel_product_repository;
mod diesel_tag_registry;
mod diesel_video_log_repository;
mod error_mapping;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_goal_repository::DieselGoalRepository;
pub use diesel_product_repository::DieselProductRepository;
pub use diesel_tag_registry::DieselTagRegistry;
pub use diesel_video_log_repository::DieselVideoLogRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
