//! Request-scoped notification fan-out.

use std::sync::Arc;

use atelier_core::notification_kinds::{is_activity_only, PROJECT_SHARED};
use atelier_core::types::DbId;
use atelier_db::models::notification::NewNotification;
use atelier_db::repositories::{NotificationRepo, UserRepo};
use atelier_db::DbPool;
use atelier_events::{EmailDelivery, EventBus, PlatformEvent};

use crate::state::AppState;

/// One thing that happened on a project, addressed to some users.
#[derive(Debug, Clone)]
pub struct Notice {
    /// Notification kind, also used as the activity event type.
    pub kind: &'static str,
    pub project_id: DbId,
    pub entity_type: &'static str,
    pub entity_id: DbId,
    /// The user whose action triggered the notice. Never notified.
    pub actor_id: DbId,
    pub title: String,
    pub body: Option<String>,
    /// Replaces `body` in emails only (e.g. to carry sign-in details that
    /// must not be stored in the inbox).
    pub email_body: Option<String>,
}

impl Notice {
    pub fn new(
        kind: &'static str,
        project_id: DbId,
        entity_type: &'static str,
        entity_id: DbId,
        actor_id: DbId,
        title: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            project_id,
            entity_type,
            entity_id,
            actor_id,
            title: title.into(),
            body: None,
            email_body: None,
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_email_body(mut self, body: impl Into<String>) -> Self {
        self.email_body = Some(body.into());
        self
    }
}

/// Fans a [`Notice`] out to the inbox, the activity log and email.
///
/// Every failure is logged and swallowed: the action that triggered the
/// notice has already succeeded.
pub struct Notifier {
    pool: DbPool,
    event_bus: Arc<EventBus>,
    mailer: Option<Arc<EmailDelivery>>,
}

impl Notifier {
    pub fn new(state: &AppState) -> Self {
        Self {
            pool: state.pool.clone(),
            event_bus: Arc::clone(&state.event_bus),
            mailer: state.mailer.clone(),
        }
    }

    /// Record `notice` in the activity log only.
    pub fn record(&self, notice: &Notice) {
        self.event_bus.publish(to_event(notice));
    }

    /// Record `notice` and deliver it to `recipients`, minus the actor.
    ///
    /// Returns the number of inbox rows written.
    pub async fn notify(&self, notice: Notice, recipients: impl IntoIterator<Item = DbId>) -> usize {
        self.record(&notice);
        if is_activity_only(notice.kind) {
            return 0;
        }

        let targets = recipients_without_actor(recipients, notice.actor_id);
        let mut delivered = 0;
        for user_id in &targets {
            let row = NewNotification {
                user_id: *user_id,
                kind: notice.kind.to_string(),
                title: notice.title.clone(),
                body: notice.body.clone(),
                project_id: Some(notice.project_id),
                entity_type: Some(notice.entity_type.to_string()),
                entity_id: Some(notice.entity_id),
            };
            match NotificationRepo::create(&self.pool, &row).await {
                Ok(_) => delivered += 1,
                Err(e) => tracing::error!(
                    error = %e,
                    user_id,
                    kind = notice.kind,
                    "Failed to store notification"
                ),
            }
        }

        if notice.kind == PROJECT_SHARED {
            self.email(&notice, &targets).await;
        }

        tracing::debug!(
            kind = notice.kind,
            project_id = notice.project_id,
            delivered,
            "Notification fan-out complete"
        );
        delivered
    }

    /// Email each target in the background. No-op without SMTP.
    async fn email(&self, notice: &Notice, targets: &[DbId]) {
        let Some(mailer) = &self.mailer else {
            return;
        };
        let body = notice.email_body.clone().or_else(|| notice.body.clone());

        for user_id in targets {
            let user = match UserRepo::find_by_id(&self.pool, *user_id).await {
                Ok(Some(user)) => user,
                Ok(None) => continue,
                Err(e) => {
                    tracing::error!(error = %e, user_id, "Failed to load email recipient");
                    continue;
                }
            };

            let mailer = Arc::clone(mailer);
            let title = notice.title.clone();
            let body = body.clone();
            tokio::spawn(async move {
                if let Err(e) = mailer
                    .send_notification(&user.email, &title, body.as_deref())
                    .await
                {
                    tracing::warn!(error = %e, to = %user.email, "Failed to send notification email");
                }
            });
        }
    }
}

fn to_event(notice: &Notice) -> PlatformEvent {
    PlatformEvent::new(notice.kind)
        .with_project(notice.project_id)
        .with_source(notice.entity_type, notice.entity_id)
        .with_actor(notice.actor_id)
        .with_payload(serde_json::json!({ "title": notice.title }))
}

/// Deduplicated recipients in first-seen order, without the actor.
fn recipients_without_actor(recipients: impl IntoIterator<Item = DbId>, actor_id: DbId) -> Vec<DbId> {
    let mut targets: Vec<DbId> = Vec::new();
    for id in recipients {
        if id != actor_id && !targets.contains(&id) {
            targets.push(id);
        }
    }
    targets
}
