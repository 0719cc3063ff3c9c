//! Notification fan-out.
//!
//! The [`Notifier`] runs inside the request that triggered it: it writes one
//! inbox row per recipient, records the activity event on the bus, and emails
//! project invitations when SMTP is configured.

pub mod notifier;

pub use notifier::{Notice, Notifier};
