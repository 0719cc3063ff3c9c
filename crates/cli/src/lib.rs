//! Maintenance operations behind the `atelier-admin` binary.

pub mod commands;
pub mod seed;
