//! Server settings loaded via OrthoConfig from CLI flags, `PRODTRACK_*`
//! environment variables and an optional config file.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use ortho_config::OrthoConfig;
use prodtrack::outbound::persistence::PoolConfig;
use serde::Deserialize;
use url::Url;

const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_MIN_IDLE: u32 = 2;
const DEFAULT_CONNECTION_TIMEOUT_SECS: u64 = 30;
const DEFAULT_AUTH_TIMEOUT_SECS: u64 = 5;

/// Runtime settings for the `prodtrack` binary.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "PRODTRACK")]
pub struct ServerSettings {
    /// Socket address to listen on. Defaults to `0.0.0.0:8080`.
    pub bind_addr: Option<SocketAddr>,
    /// PostgreSQL connection string. Fixture data is served without it.
    pub database_url: Option<String>,
    /// Upper bound on pooled connections.
    pub db_max_connections: Option<u32>,
    /// Idle connections kept open.
    pub db_min_idle: Option<u32>,
    /// Seconds to wait for a pooled connection.
    pub db_connection_timeout_secs: Option<u64>,
    /// Token introspection endpoint of the auth collaborator.
    pub auth_introspection_url: Option<String>,
    /// Seconds before an introspection call is abandoned.
    pub auth_timeout_secs: Option<u64>,
    /// Apply embedded migrations at start-up. Defaults to `true`.
    pub run_migrations: Option<bool>,
}

impl ServerSettings {
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
            .unwrap_or_else(|| SocketAddr::from((Ipv4Addr::UNSPECIFIED, 8080)))
    }

    pub fn run_migrations(&self) -> bool {
        self.run_migrations.unwrap_or(true)
    }

    /// Pool settings, or `None` when no database is configured.
    pub fn pool_config(&self) -> Option<PoolConfig> {
        let url = self.database_url.as_deref()?.trim();
        if url.is_empty() {
            return None;
        }
        Some(
            PoolConfig::new(url)
                .with_max_size(self.db_max_connections.unwrap_or(DEFAULT_MAX_CONNECTIONS))
                .with_min_idle(Some(self.db_min_idle.unwrap_or(DEFAULT_MIN_IDLE)))
                .with_connection_timeout(Duration::from_secs(
                    self.db_connection_timeout_secs
                        .unwrap_or(DEFAULT_CONNECTION_TIMEOUT_SECS),
                )),
        )
    }

    /// Parsed introspection endpoint, if one is configured.
    ///
    /// # Errors
    /// Returns the parse error for a malformed URL.
    pub fn auth_endpoint(&self) -> Result<Option<Url>, url::ParseError> {
        self.auth_introspection_url
            .as_deref()
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .map(Url::parse)
            .transpose()
    }

    pub fn auth_timeout(&self) -> Duration {
        Duration::from_secs(self.auth_timeout_secs.unwrap_or(DEFAULT_AUTH_TIMEOUT_SECS))
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for server settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 8] = [
        "PRODTRACK_BIND_ADDR",
        "PRODTRACK_DATABASE_URL",
        "PRODTRACK_DB_MAX_CONNECTIONS",
        "PRODTRACK_DB_MIN_IDLE",
        "PRODTRACK_DB_CONNECTION_TIMEOUT_SECS",
        "PRODTRACK_AUTH_INTROSPECTION_URL",
        "PRODTRACK_AUTH_TIMEOUT_SECS",
        "PRODTRACK_RUN_MIGRATIONS",
    ];

    fn load_from_empty_args() -> ServerSettings {
        ServerSettings::load_from_iter([OsString::from("prodtrack")])
            .expect("config should load")
    }

    fn with_overrides(overrides: &[(&str, &str)]) -> Vec<(&'static str, Option<String>)> {
        VARS.iter()
            .map(|name| {
                let value = overrides
                    .iter()
                    .find(|(key, _)| key == name)
                    .map(|(_, value)| (*value).to_owned());
                (*name, value)
            })
            .collect()
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let _guard = lock_env(with_overrides(&[]));

        let settings = load_from_empty_args();
        assert_eq!(settings.bind_addr(), SocketAddr::from(([0, 0, 0, 0], 8080)));
        assert!(settings.pool_config().is_none());
        assert!(settings.run_migrations());
        assert_eq!(settings.auth_endpoint().expect("no url"), None);
        assert_eq!(settings.auth_timeout(), Duration::from_secs(5));
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env(with_overrides(&[
            ("PRODTRACK_BIND_ADDR", "127.0.0.1:9000"),
            ("PRODTRACK_DATABASE_URL", "postgres://app@localhost/prodtrack"),
            ("PRODTRACK_DB_MAX_CONNECTIONS", "4"),
            ("PRODTRACK_AUTH_INTROSPECTION_URL", "http://auth.internal/introspect"),
            ("PRODTRACK_RUN_MIGRATIONS", "false"),
        ]));

        let settings = load_from_empty_args();
        assert_eq!(settings.bind_addr(), SocketAddr::from(([127, 0, 0, 1], 9000)));
        let pool = settings.pool_config().expect("database configured");
        assert_eq!(pool.database_url(), "postgres://app@localhost/prodtrack");
        assert_eq!(pool.max_size(), 4);
        assert_eq!(pool.min_idle(), Some(2));
        assert!(!settings.run_migrations());
        assert_eq!(
            settings
                .auth_endpoint()
                .expect("valid url")
                .map(|url| url.host_str().map(str::to_owned)),
            Some(Some("auth.internal".to_owned()))
        );
    }

    #[rstest]
    fn malformed_auth_url_is_an_error() {
        let _guard = lock_env(with_overrides(&[(
            "PRODTRACK_AUTH_INTROSPECTION_URL",
            "not a url",
        )]));

        assert!(load_from_empty_args().auth_endpoint().is_err());
    }
}
