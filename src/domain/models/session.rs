//! Domain model for the authenticated client session.
//!
//! A session carries the short-lived access token. The `generation` counter
//! moves forward on every write so concurrent requests can tell whether the
//! token they were sent with is still the live one.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Bearer token attached to outgoing requests
    pub access_token: Option<String>,

    /// Incremented on every replace or clear
    #[serde(default)]
    pub generation: u64,

    /// When the token was last written
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Session with no token and generation 0.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    /// Next session holding `token`.
    #[must_use]
    pub fn with_token(&self, token: String) -> Self {
        Self {
            access_token: Some(token),
            generation: self.generation + 1,
            updated_at: Some(Utc::now()),
        }
    }

    /// Next session with the token removed.
    #[must_use]
    pub fn cleared(&self) -> Self {
        Self {
            access_token: None,
            generation: self.generation + 1,
            updated_at: Some(Utc::now()),
        }
    }
}

/// Login payload for the auth endpoint
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Body returned by login and refresh endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
}
