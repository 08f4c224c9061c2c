//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on driving ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{GoalTracking, ProductCatalogue, TokenVerifier, VideoLogging};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub products: Arc<dyn ProductCatalogue>,
    pub video_logs: Arc<dyn VideoLogging>,
    pub goals: Arc<dyn GoalTracking>,
    pub tokens: Arc<dyn TokenVerifier>,
}

impl HttpState {
    /// Bundle the driving ports and the bearer-token verifier.
    pub fn new(
        products: Arc<dyn ProductCatalogue>,
        video_logs: Arc<dyn VideoLogging>,
        goals: Arc<dyn GoalTracking>,
        tokens: Arc<dyn TokenVerifier>,
    ) -> Self {
        Self {
            products,
            video_logs,
            goals,
            tokens,
        }
    }
}
