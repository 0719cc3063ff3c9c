//! Activity log writer.
//!
//! [`EventPersistence`] drains the [`EventBus`](crate::bus::EventBus) and
//! appends every [`PlatformEvent`] to the `events` table. It runs as one
//! long-lived task and returns once the bus has been dropped and the
//! remaining buffered events are written.

use atelier_core::types::DbId;
use atelier_db::repositories::EventRepo;
use atelier_db::DbPool;
use tokio::sync::broadcast;

use crate::bus::PlatformEvent;

pub struct EventPersistence;

impl EventPersistence {
    /// Run the persistence loop until the channel closes.
    pub async fn run(pool: DbPool, mut receiver: broadcast::Receiver<PlatformEvent>) {
        let mut written: u64 = 0;
        loop {
            match receiver.recv().await {
                Ok(event) => match Self::persist(&pool, &event).await {
                    Ok(_) => written += 1,
                    Err(e) => {
                        tracing::error!(
                            error = %e,
                            event_type = %event.event_type,
                            project_id = ?event.project_id,
                            "Failed to persist event"
                        );
                    }
                },
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Event persistence lagged, events were dropped");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!(written, "Event bus closed, persistence shutting down");
                    break;
                }
            }
        }
    }

    /// Write a single event to the `events` table.
    pub async fn persist(pool: &DbPool, event: &PlatformEvent) -> Result<DbId, sqlx::Error> {
        EventRepo::insert(
            pool,
            &event.event_type,
            event.project_id,
            event.source_entity_type.as_deref(),
            event.source_entity_id,
            event.actor_user_id,
            &event.payload,
        )
        .await
    }
}
