//! Repository for the `events` activity log.

use atelier_core::types::DbId;
use sqlx::PgPool;

use crate::models::event::Event;

const COLUMNS: &str = "id, event_type, project_id, source_entity_type, source_entity_id, \
                        actor_user_id, payload, created_at";

pub struct EventRepo;

impl EventRepo {
    /// Append an event, returning the generated ID.
    pub async fn insert(
        pool: &PgPool,
        event_type: &str,
        project_id: Option<DbId>,
        source_entity_type: Option<&str>,
        source_entity_id: Option<DbId>,
        actor_user_id: Option<DbId>,
        payload: &serde_json::Value,
    ) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO events
                (event_type, project_id, source_entity_type, source_entity_id, actor_user_id, payload)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id",
        )
        .bind(event_type)
        .bind(project_id)
        .bind(source_entity_type)
        .bind(source_entity_id)
        .bind(actor_user_id)
        .bind(payload)
        .fetch_one(pool)
        .await
    }

    /// A project's activity, newest first.
    pub async fn list_for_project(
        pool: &PgPool,
        project_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Event>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM events
             WHERE project_id = $1
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(project_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }
}
