//! Request handlers, one submodule per resource.
//!
//! Handlers resolve access through [`crate::access`], delegate storage to the
//! repositories in `atelier_db` and map failures via [`crate::error::AppError`].

pub mod admin;
pub mod approval;
pub mod auth;
pub mod category;
pub mod client_portal;
pub mod comment;
pub mod library;
pub mod notification;
pub mod prescription;
pub mod project;
pub mod project_client;
pub mod space;
pub mod upload;
