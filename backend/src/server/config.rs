//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::sync::Arc;

use prodtrack::domain::ports::TokenVerifier;
use prodtrack::outbound::persistence::DbPool;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) token_verifier: Option<Arc<dyn TokenVerifier>>,
}

impl ServerConfig {
    /// Configuration without persistence or authentication collaborators.
    #[must_use]
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            db_pool: None,
            token_verifier: None,
        }
    }

    /// Attach a database connection pool for the persistence adapters.
    ///
    /// Without one, handlers run against fixture repositories.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Attach the verifier that resolves bearer tokens to user ids.
    #[must_use]
    pub fn with_token_verifier(mut self, verifier: Arc<dyn TokenVerifier>) -> Self {
        self.token_verifier = Some(verifier);
        self
    }

    /// Return the socket address the server will bind to.
    #[cfg_attr(
        not(test),
        expect(dead_code, reason = "Read by the server tests")
    )]
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
