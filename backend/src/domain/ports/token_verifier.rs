//! Driven port for the external auth collaborator.
//!
//! Token issuance lives outside this service. Inbound adapters hand the raw
//! bearer token to a [`TokenVerifier`] and trust the returned [`UserId`]
//! completely.

use async_trait::async_trait;

use crate::domain::UserId;

use super::define_port_error;

define_port_error! {
    /// Errors raised while verifying a bearer token.
    pub enum TokenVerifierError {
        /// The collaborator reported the token as invalid or expired.
        Rejected => "bearer token rejected",
        /// The collaborator could not be reached or answered unexpectedly.
        Unavailable { message: String } =>
            "token verifier unavailable: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Resolve a bearer token to the user it was issued for.
    async fn verify(&self, token: &str) -> Result<UserId, TokenVerifierError>;
}

/// Verifier used when no auth collaborator is configured; rejects every
/// token.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureTokenVerifier;

#[async_trait]
impl TokenVerifier for FixtureTokenVerifier {
    async fn verify(&self, _token: &str) -> Result<UserId, TokenVerifierError> {
        Err(TokenVerifierError::rejected())
    }
}
