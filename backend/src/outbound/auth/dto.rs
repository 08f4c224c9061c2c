//! Wire shapes for the token introspection exchange.

use serde::{Deserialize, Serialize};

use crate::domain::UserId;

#[derive(Debug, Serialize)]
pub(super) struct IntrospectionRequestDto<'a> {
    pub(super) token: &'a str,
}

#[derive(Debug, Deserialize)]
pub(super) struct IntrospectionResponseDto {
    #[serde(default)]
    pub(super) active: bool,
    pub(super) user_id: Option<i32>,
}

impl IntrospectionResponseDto {
    /// The token owner, when the collaborator vouches for the token.
    pub(super) fn into_user_id(self) -> Option<UserId> {
        match (self.active, self.user_id) {
            (true, Some(id)) if id > 0 => Some(UserId::new(id)),
            _ => None,
        }
    }
}
