//! Product tracking backend.
//!
//! Hexagonal layout: [`domain`] holds the entities, services and ports,
//! [`inbound`] exposes them over HTTP and [`outbound`] implements the driven
//! ports with PostgreSQL and the token-introspection collaborator.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
