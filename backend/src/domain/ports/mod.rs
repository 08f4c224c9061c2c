//! Domain ports for the hexagonal boundary.
//!
//! Driving ports ([`ProductCatalogue`], [`VideoLogging`], [`GoalTracking`])
//! are called by inbound adapters and implemented by domain services. Driven
//! ports (the repositories, [`TagRegistry`] and [`TokenVerifier`]) are
//! implemented by outbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod goal_repository;
mod goal_tracking;
mod product_catalogue;
mod product_repository;
mod tag_registry;
mod token_verifier;
mod video_log_repository;
mod video_logging;

#[cfg(test)]
pub use goal_repository::MockGoalRepository;
pub use goal_repository::{
    FixtureGoalRepository, GoalRepository, GoalRepositoryError, MonthActivity,
};
#[cfg(test)]
pub use goal_tracking::MockGoalTracking;
pub use goal_tracking::GoalTracking;
#[cfg(test)]
pub use product_catalogue::MockProductCatalogue;
pub use product_catalogue::{ListProductsRequest, ProductCatalogue};
#[cfg(test)]
pub use product_repository::MockProductRepository;
pub use product_repository::{
    FixtureProductRepository, NewProduct, ProductRepository, ProductRepositoryError,
    PurchaseUpdate,
};
#[cfg(test)]
pub use tag_registry::MockTagRegistry;
pub use tag_registry::{FixtureTagRegistry, TagRegistry, TagRegistryError};
#[cfg(test)]
pub use token_verifier::MockTokenVerifier;
pub use token_verifier::{FixtureTokenVerifier, TokenVerifier, TokenVerifierError};
#[cfg(test)]
pub use video_log_repository::MockVideoLogRepository;
pub use video_log_repository::{
    FixtureVideoLogRepository, VideoLogRepository, VideoLogRepositoryError,
};
#[cfg(test)]
pub use video_logging::MockVideoLogging;
pub use video_logging::VideoLogging;
