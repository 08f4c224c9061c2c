//! Reqwest-backed token introspection adapter.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tracing::{debug, warn};

use super::dto::{IntrospectionRequestDto, IntrospectionResponseDto};
use crate::domain::UserId;
use crate::domain::ports::{TokenVerifier, TokenVerifierError};

const USER_AGENT: &str = concat!("prodtrack/", env!("CARGO_PKG_VERSION"));

/// Verifier that POSTs each bearer token to an introspection endpoint.
pub struct HttpTokenVerifier {
    client: Client,
    endpoint: Url,
}

impl HttpTokenVerifier {
    /// Build a verifier whose requests give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl TokenVerifier for HttpTokenVerifier {
    async fn verify(&self, token: &str) -> Result<UserId, TokenVerifierError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&IntrospectionRequestDto { token })
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(map_status_error(status));
        }

        let body = response.bytes().await.map_err(map_transport_error)?;
        parse_introspection(body.as_ref())
    }
}

fn parse_introspection(body: &[u8]) -> Result<UserId, TokenVerifierError> {
    let decoded: IntrospectionResponseDto = serde_json::from_slice(body).map_err(|error| {
        warn!(%error, "auth collaborator returned an unreadable body");
        TokenVerifierError::unavailable(format!("invalid introspection payload: {error}"))
    })?;
    decoded.into_user_id().ok_or_else(|| {
        debug!("token reported inactive");
        TokenVerifierError::rejected()
    })
}

fn map_transport_error(error: reqwest::Error) -> TokenVerifierError {
    warn!(%error, timeout = error.is_timeout(), "auth collaborator unreachable");
    TokenVerifierError::unavailable(error.to_string())
}

fn map_status_error(status: StatusCode) -> TokenVerifierError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => {
            TokenVerifierError::rejected()
        }
        _ => TokenVerifierError::unavailable(format!("status {}", status.as_u16())),
    }
}
