//! Row-ownership authorization.
//!
//! Read queries filter by `user_id` in SQL; write paths call [`can_access`]
//! before touching a row. The predicate is the whole contract: a requester
//! may only act on rows whose owner column matches their identity.

use crate::auth::UserId;
use crate::db::{DbImplementation, DbProspect, DbTask};

/// A row with an owning user.
pub trait Owned {
    fn owner_id(&self) -> &str;
}

impl Owned for DbTask {
    fn owner_id(&self) -> &str {
        &self.user_id
    }
}

impl Owned for DbProspect {
    fn owner_id(&self) -> &str {
        &self.user_id
    }
}

impl Owned for DbImplementation {
    fn owner_id(&self) -> &str {
        &self.user_id
    }
}

/// Whether `user` may read or modify `row`.
pub fn can_access(user: &UserId, row: &impl Owned) -> bool {
    row.owner_id() == user.as_str()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(user_id: &str) -> DbTask {
        DbTask {
            id: "t1".to_string(),
            user_id: user_id.to_string(),
            title: "Call Acme".to_string(),
            scheduled_date: "2024-05-04".to_string(),
            status: "pending".to_string(),
            created_at: "2024-05-01T00:00:00+00:00".to_string(),
            updated_at: "2024-05-01T00:00:00+00:00".to_string(),
            completed_at: None,
        }
    }

    #[test]
    fn owner_is_granted() {
        let user = UserId::new("user-1");
        assert!(can_access(&user, &task("user-1")));
    }

    #[test]
    fn non_owner_is_rejected() {
        let user = UserId::new("user-2");
        assert!(!can_access(&user, &task("user-1")));
    }

    #[test]
    fn ownership_is_exact_match() {
        // No prefix or case leniency on identities
        let user = UserId::new("user-1");
        assert!(!can_access(&user, &task("User-1")));
        assert!(!can_access(&user, &task("user-10")));
    }
}
