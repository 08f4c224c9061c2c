//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//! - **auth**: HTTP client for the external token introspection service
//!
//! Adapters are thin translators between domain types and infrastructure
//! representations. They contain no business logic.

pub mod auth;
pub mod persistence;
