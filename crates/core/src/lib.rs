//! Atelier domain core.
//!
//! Pure types, constants and validation helpers shared by the database,
//! event and API crates. Nothing in here performs I/O.

pub mod approval;
pub mod category_tree;
pub mod error;
pub mod notification_kinds;
pub mod prescription;
pub mod project_status;
pub mod roles;
pub mod types;
pub mod uploads;
pub mod validation;
