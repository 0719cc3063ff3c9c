use std::sync::Arc;

use atelier_events::{EmailDelivery, EventBus};

use crate::config::ServerConfig;
use crate::storage::LocalStorage;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    pub pool: atelier_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Activity events; drained into the `events` table.
    pub event_bus: Arc<EventBus>,
    /// `None` when SMTP is not configured.
    pub mailer: Option<Arc<EmailDelivery>>,
    /// Disk storage rooted at `config.upload_dir`.
    pub storage: Arc<LocalStorage>,
}
