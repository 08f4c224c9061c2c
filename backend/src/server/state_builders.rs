//! Builders wiring driving ports to repository-backed services.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use tracing::warn;

use prodtrack::domain::ports::{
    FixtureGoalRepository, FixtureProductRepository, FixtureTagRegistry, FixtureTokenVerifier,
    FixtureVideoLogRepository, GoalTracking, ProductCatalogue, TokenVerifier, VideoLogging,
};
use prodtrack::domain::{GoalService, ProductService, VideoLogService};
use prodtrack::inbound::http::state::HttpState;
use prodtrack::outbound::persistence::{
    DbPool, DieselGoalRepository, DieselProductRepository, DieselTagRegistry,
    DieselVideoLogRepository,
};

use super::ServerConfig;

struct DrivingPorts {
    products: Arc<dyn ProductCatalogue>,
    video_logs: Arc<dyn VideoLogging>,
    goals: Arc<dyn GoalTracking>,
}

fn database_ports(pool: &DbPool, clock: Arc<dyn Clock>) -> DrivingPorts {
    DrivingPorts {
        products: Arc::new(ProductService::new(
            Arc::new(DieselProductRepository::new(pool.clone())),
            Arc::new(DieselTagRegistry::new(pool.clone())),
            Arc::clone(&clock),
        )),
        video_logs: Arc::new(VideoLogService::new(
            Arc::new(DieselVideoLogRepository::new(pool.clone())),
            Arc::clone(&clock),
        )),
        goals: Arc::new(GoalService::new(
            Arc::new(DieselGoalRepository::new(pool.clone())),
            clock,
        )),
    }
}

fn fixture_ports(clock: Arc<dyn Clock>) -> DrivingPorts {
    DrivingPorts {
        products: Arc::new(ProductService::new(
            Arc::new(FixtureProductRepository),
            Arc::new(FixtureTagRegistry),
            Arc::clone(&clock),
        )),
        video_logs: Arc::new(VideoLogService::new(
            Arc::new(FixtureVideoLogRepository),
            Arc::clone(&clock),
        )),
        goals: Arc::new(GoalService::new(Arc::new(FixtureGoalRepository), clock)),
    }
}

fn token_verifier(config: &ServerConfig) -> Arc<dyn TokenVerifier> {
    config.token_verifier.clone().unwrap_or_else(|| {
        warn!("no token introspection endpoint configured; every bearer token is rejected");
        Arc::new(FixtureTokenVerifier)
    })
}

/// Build the HTTP state, using Diesel adapters when a pool is configured and
/// fixtures otherwise.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let ports = match &config.db_pool {
        Some(pool) => database_ports(pool, clock),
        None => fixture_ports(clock),
    };
    web::Data::new(HttpState::new(
        ports.products,
        ports.video_logs,
        ports.goals,
        token_verifier(config),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use prodtrack::domain::ports::TokenVerifierError;
    use rstest::rstest;
    use std::net::SocketAddr;

    #[rstest]
    #[tokio::test]
    async fn fixture_state_rejects_tokens_without_verifier() {
        let config = ServerConfig::new(SocketAddr::from(([127, 0, 0, 1], 0)));
        let state = build_http_state(&config);

        let result = state.tokens.verify("anything").await;

        assert_eq!(result, Err(TokenVerifierError::Rejected));
    }
}
