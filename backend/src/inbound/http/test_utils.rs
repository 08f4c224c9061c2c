//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::http::header::{AUTHORIZATION, HeaderName};
use async_trait::async_trait;

use crate::domain::UserId;
use crate::domain::ports::{
    MockGoalTracking, MockProductCatalogue, MockVideoLogging, TokenVerifier, TokenVerifierError,
};

use super::state::HttpState;

/// Bearer token accepted by [`StaticTokenVerifier`].
pub const TEST_TOKEN: &str = "test-token";
/// Identity behind [`TEST_TOKEN`].
pub const TEST_USER: UserId = UserId::new(7);

/// Accepts [`TEST_TOKEN`] and rejects everything else.
pub struct StaticTokenVerifier;

#[async_trait]
impl TokenVerifier for StaticTokenVerifier {
    async fn verify(&self, token: &str) -> Result<UserId, TokenVerifierError> {
        if token == TEST_TOKEN {
            Ok(TEST_USER)
        } else {
            Err(TokenVerifierError::rejected())
        }
    }
}

/// `Authorization` header carrying `token`.
pub fn bearer(token: &str) -> (HeaderName, String) {
    (AUTHORIZATION, format!("Bearer {token}"))
}

/// Driving-port mocks to configure before building an [`HttpState`].
#[derive(Default)]
pub struct MockPorts {
    pub products: MockProductCatalogue,
    pub video_logs: MockVideoLogging,
    pub goals: MockGoalTracking,
}

impl MockPorts {
    pub fn into_state(self) -> HttpState {
        HttpState::new(
            Arc::new(self.products),
            Arc::new(self.video_logs),
            Arc::new(self.goals),
            Arc::new(StaticTokenVerifier),
        )
    }
}

/// State whose driving ports expect no calls.
pub fn http_state() -> HttpState {
    MockPorts::default().into_state()
}
