//! Server entry-point: loads settings, prepares persistence and serves the
//! REST API.

mod server;

use std::sync::Arc;

use actix_web::web;
use ortho_config::OrthoConfig as _;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use prodtrack::inbound::http::health::HealthState;
use prodtrack::outbound::auth::HttpTokenVerifier;
use prodtrack::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use server::{ServerConfig, ServerSettings, create_server};

async fn migrate(config: &PoolConfig) -> std::io::Result<()> {
    let database_url = config.database_url().to_owned();
    let applied = web::block(move || run_pending_migrations(&database_url))
        .await
        .map_err(|err| std::io::Error::other(err.to_string()))?
        .map_err(std::io::Error::other)?;
    info!(applied, "database migrations up to date");
    Ok(())
}

async fn attach_database(
    settings: &ServerSettings,
    config: ServerConfig,
) -> std::io::Result<ServerConfig> {
    let Some(pool_config) = settings.pool_config() else {
        warn!("PRODTRACK_DATABASE_URL is not set; serving fixture data");
        return Ok(config);
    };
    if settings.run_migrations() {
        migrate(&pool_config).await?;
    }
    let pool = DbPool::new(pool_config)
        .await
        .map_err(|err| std::io::Error::other(err.to_string()))?;
    Ok(config.with_db_pool(pool))
}

fn attach_token_verifier(
    settings: &ServerSettings,
    config: ServerConfig,
) -> std::io::Result<ServerConfig> {
    let endpoint = settings
        .auth_endpoint()
        .map_err(|err| std::io::Error::other(format!("invalid auth introspection url: {err}")))?;
    let Some(endpoint) = endpoint else {
        return Ok(config);
    };
    let verifier = HttpTokenVerifier::new(endpoint, settings.auth_timeout())
        .map_err(std::io::Error::other)?;
    Ok(config.with_token_verifier(Arc::new(verifier)))
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings =
        ServerSettings::load().map_err(|err| std::io::Error::other(err.to_string()))?;
    let bind_addr = settings.bind_addr();
    let config = attach_database(&settings, ServerConfig::new(bind_addr)).await?;
    let config = attach_token_verifier(&settings, config)?;

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)?;
    info!(%bind_addr, "listening");
    server.await
}
