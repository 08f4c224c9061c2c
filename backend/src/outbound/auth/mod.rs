//! Token verification against the external auth collaborator.
//!
//! Thin HTTP implementation of the `TokenVerifier` port. The collaborator
//! owns token issuance; this adapter only asks it who a bearer token
//! belongs to.

mod dto;
mod http_verifier;

pub use http_verifier::HttpTokenVerifier;
