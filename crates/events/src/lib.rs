//! Atelier event bus and outbound delivery.
//!
//! - [`EventBus`] -- in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`PlatformEvent`] -- the domain event envelope (project activity).
//! - [`EventPersistence`] -- background task writing every event to the
//!   `events` activity log.
//! - [`delivery`] -- outbound channels; currently SMTP email.

pub mod bus;
pub mod delivery;
pub mod persistence;

pub use bus::{EventBus, PlatformEvent};
pub use delivery::email::{EmailConfig, EmailDelivery, EmailError};
pub use persistence::EventPersistence;
