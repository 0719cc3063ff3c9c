//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches

use serde::{Deserialize, Deserializer};

pub mod address;
pub mod approval;
pub mod category;
pub mod comment;
pub mod event;
pub mod notification;
pub mod prescription;
pub mod project;
pub mod project_client;
pub mod resource;
pub mod role;
pub mod session;
pub mod space;
pub mod upload;
pub mod user;

/// Deserialize a nullable field so that "absent" and "explicit null" differ.
///
/// Use with `#[serde(default, deserialize_with = "double_option")]`:
/// absent -> `None`, `null` -> `Some(None)`, value -> `Some(Some(v))`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
