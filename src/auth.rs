//! Authentication seam: resolve an email to a signed-in session.
//!
//! Nothing downstream runs without a session — an unknown email is a typed
//! error, not an empty dashboard.

use serde::Serialize;
use thiserror::Error;

use crate::db::{DbError, WorkspaceDb};

/// Errors from the sign-in path.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("No account registered for {0}")]
    UnknownUser(String),

    #[error("Database error: {0}")]
    Db(#[from] DbError),
}

/// Opaque owner identity. Every workspace row carries one in its `user_id`
/// column; the policy layer compares row owners against it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A signed-in user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user_id: UserId,
    pub email: String,
    pub name: String,
}

/// Look up the user behind `email` and produce a session for them.
pub fn sign_in(db: &WorkspaceDb, email: &str) -> Result<Session, AuthError> {
    let user = db
        .get_user_by_email(email)?
        .ok_or_else(|| AuthError::UnknownUser(email.to_string()))?;
    Ok(Session {
        user_id: UserId::new(user.id),
        email: user.email,
        name: user.name,
    })
}
