//! Well-known role name and id constants.
//!
//! These must match the seed data in `20260301000001_create_roles_and_users.sql`.

use crate::types::DbId;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_AGENCY: &str = "agency";
pub const ROLE_CLIENT: &str = "client";

pub const ROLE_ADMIN_ID: DbId = 1;
pub const ROLE_AGENCY_ID: DbId = 2;
pub const ROLE_CLIENT_ID: DbId = 3;

/// All role names, in seed order.
pub const ALL_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_AGENCY, ROLE_CLIENT];

pub fn is_known_role(role: &str) -> bool {
    ALL_ROLES.contains(&role)
}

/// Agencies and admins may author projects and library content.
pub fn can_author(role: &str) -> bool {
    role == ROLE_AGENCY || role == ROLE_ADMIN
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_roles() {
        assert!(is_known_role("admin"));
        assert!(is_known_role("agency"));
        assert!(is_known_role("client"));
        assert!(!is_known_role("reviewer"));
    }

    #[test]
    fn only_agency_and_admin_author() {
        assert!(can_author(ROLE_AGENCY));
        assert!(can_author(ROLE_ADMIN));
        assert!(!can_author(ROLE_CLIENT));
    }
}
