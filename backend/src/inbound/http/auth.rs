//! Bearer-token authentication for HTTP handlers.
//!
//! Handlers take an [`AuthenticatedUser`] argument; the extractor reads the
//! `Authorization: Bearer <token>` header and asks the configured
//! [`crate::domain::ports::TokenVerifier`] for the caller's id. The domain
//! trusts the resulting [`UserId`] without further checks.

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::ports::TokenVerifierError;
use crate::domain::{Error, UserId};

use super::state::HttpState;

/// The verified identity of the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser(UserId);

impl AuthenticatedUser {
    /// The caller's user id.
    #[must_use]
    pub const fn user_id(self) -> UserId {
        self.0
    }
}

fn bearer_token(req: &HttpRequest) -> Result<String, Error> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| Error::unauthorized("missing bearer token"))?;
    let value = header
        .to_str()
        .map_err(|_| Error::unauthorized("malformed authorization header"))?;
    let token = value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| Error::unauthorized("authorization header must use the Bearer scheme"))?;
    Ok(token.to_owned())
}

fn map_verifier_error(error: TokenVerifierError) -> Error {
    match error {
        TokenVerifierError::Rejected => Error::unauthorized("invalid bearer token"),
        TokenVerifierError::Unavailable { message } => {
            warn!(%message, "token verification unavailable");
            Error::service_unavailable("authentication service unavailable")
        }
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = bearer_token(req);
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        Box::pin(async move {
            let token = token?;
            let state =
                state.ok_or_else(|| Error::internal("http state is not configured"))?;
            let user_id = state
                .tokens
                .verify(&token)
                .await
                .map_err(map_verifier_error)?;
            Ok(Self(user_id))
        })
    }
}
