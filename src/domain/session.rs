use serde::{Deserialize, Serialize};

use crate::domain::user::Profile;

/// Authenticated staff session as returned by the login endpoint.
#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub token: String,
    pub user: SessionUser,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionUser {
    pub id: String,
    pub phone: String,
    #[serde(default)]
    pub profile: Option<Profile>,
}

// The token is a bearer credential and never goes to the logs.
impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .field("user", &self.user)
            .finish()
    }
}
