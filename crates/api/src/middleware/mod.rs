//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a JWT Bearer token.
//! - [`rbac::RequireAdmin`] -- Requires the `admin` role.
//! - [`rbac::RequireAgency`] -- Requires `agency` or `admin` role.
//! - [`rbac::RequireClient`] -- Requires the `client` role.

pub mod auth;
pub mod rbac;
