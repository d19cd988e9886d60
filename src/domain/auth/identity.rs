//! Authenticated visitor identity.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::UserId;

/// The authenticated-or-created visitor record.
///
/// Set exactly once per modal session, by whichever auth sub-flow
/// completes first; `AuthState::set_identity` makes later completions
/// no-ops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
}

impl Identity {
    pub fn new(
        user_id: UserId,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        phone_number: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            phone_number: phone_number.into(),
        }
    }
}
