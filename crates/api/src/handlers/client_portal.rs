//! Read-only client portal (`/client/*`).
//!
//! Everything here requires the `client` role and only ever shows projects
//! the caller is assigned to.

use std::collections::HashMap;

use atelier_core::types::DbId;
use atelier_db::models::address::Address;
use atelier_db::models::prescription::{PendingPrescription, Prescription};
use atelier_db::models::project::{Project, ProjectSummary};
use atelier_db::models::space::Space;
use atelier_db::repositories::{
    AddressRepo, ApprovalRepo, PrescriptionRepo, ProjectClientRepo, ProjectRepo, SpaceRepo,
};
use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use crate::access::{load_project_for, Need};
use crate::error::AppResult;
use crate::middleware::rbac::RequireClient;
use crate::state::AppState;

/// A project as its client sees it.
#[derive(Debug, Serialize)]
pub struct ClientProjectView {
    pub project: Project,
    pub address: Option<Address>,
    pub summary: ProjectSummary,
    /// Whether the caller's decisions count towards approval.
    pub can_approve: bool,
    pub spaces: Vec<ClientSpaceView>,
}

#[derive(Debug, Serialize)]
pub struct ClientSpaceView {
    #[serde(flatten)]
    pub space: Space,
    pub prescriptions: Vec<ClientPrescriptionView>,
}

#[derive(Debug, Serialize)]
pub struct ClientPrescriptionView {
    #[serde(flatten)]
    pub prescription: Prescription,
    /// The caller's own decision, if any.
    pub my_decision: Option<String>,
}

/// GET /api/v1/client/projects
pub async fn list_projects(
    State(state): State<AppState>,
    RequireClient(client): RequireClient,
) -> AppResult<Json<Vec<Project>>> {
    let projects = ProjectRepo::list_for_client(&state.pool, client.user_id).await?;
    Ok(Json(projects))
}

/// GET /api/v1/client/projects/{id}
///
/// Project, spaces and their prescriptions in one nested document.
pub async fn get_project(
    State(state): State<AppState>,
    RequireClient(client): RequireClient,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<ClientProjectView>> {
    let access = load_project_for(&state.pool, &client, project_id, Need::View).await?;

    let address = match access.project.address_id {
        Some(address_id) => AddressRepo::find_by_id(&state.pool, address_id).await?,
        None => None,
    };
    let summary = ProjectRepo::summary(&state.pool, project_id).await?;
    let can_approve =
        ProjectClientRepo::can_approve(&state.pool, project_id, client.user_id).await?;

    let spaces = SpaceRepo::list_by_project(&state.pool, project_id).await?;
    let items = PrescriptionRepo::list_by_project(&state.pool, project_id, None).await?;
    let decisions: HashMap<DbId, String> =
        ApprovalRepo::decisions_of_user_in_project(&state.pool, project_id, client.user_id)
            .await?
            .into_iter()
            .collect();

    let spaces = nest(
        spaces,
        items.into_iter().map(|item| item.prescription).collect(),
        &decisions,
    );

    Ok(Json(ClientProjectView {
        project: access.project,
        address,
        summary,
        can_approve,
        spaces,
    }))
}

/// GET /api/v1/client/approvals/pending
///
/// Prescriptions waiting on the caller's decision, across all projects.
pub async fn pending_approvals(
    State(state): State<AppState>,
    RequireClient(client): RequireClient,
) -> AppResult<Json<Vec<PendingPrescription>>> {
    let pending = PrescriptionRepo::list_pending_for_client(&state.pool, client.user_id).await?;
    Ok(Json(pending))
}

/// Group prescriptions under their spaces, keeping both orderings.
fn nest(
    spaces: Vec<Space>,
    prescriptions: Vec<Prescription>,
    decisions: &HashMap<DbId, String>,
) -> Vec<ClientSpaceView> {
    let mut by_space: HashMap<DbId, Vec<ClientPrescriptionView>> = HashMap::new();
    for prescription in prescriptions {
        let my_decision = decisions.get(&prescription.id).cloned();
        by_space
            .entry(prescription.space_id)
            .or_default()
            .push(ClientPrescriptionView {
                prescription,
                my_decision,
            });
    }

    spaces
        .into_iter()
        .map(|space| ClientSpaceView {
            prescriptions: by_space.remove(&space.id).unwrap_or_default(),
            space,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn space(id: DbId, name: &str) -> Space {
        Space {
            id,
            project_id: 1,
            name: name.to_string(),
            description: None,
            sort_order: id as i32,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn item(id: DbId, space_id: DbId) -> Prescription {
        Prescription {
            id,
            space_id,
            resource_id: None,
            category_id: None,
            name: format!("item {id}"),
            description: None,
            brand: None,
            reference: None,
            supplier_url: None,
            image_url: None,
            quantity: 1,
            unit_price_cents: 100,
            status: "pending".to_string(),
            sort_order: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn nests_items_under_spaces_with_own_decision() {
        let decisions = HashMap::from([(11, "approved".to_string())]);
        let nested = nest(
            vec![space(1, "Kitchen"), space(2, "Bedroom")],
            vec![item(10, 1), item(11, 1), item(12, 2)],
            &decisions,
        );

        assert_eq!(nested.len(), 2);
        assert_eq!(nested[0].prescriptions.len(), 2);
        assert_eq!(nested[0].prescriptions[0].my_decision, None);
        assert_eq!(
            nested[0].prescriptions[1].my_decision.as_deref(),
            Some("approved")
        );
        assert_eq!(nested[1].prescriptions[0].prescription.id, 12);
    }

    #[test]
    fn empty_space_is_kept() {
        let nested = nest(vec![space(5, "Hall")], vec![], &HashMap::new());
        assert_eq!(nested.len(), 1);
        assert!(nested[0].prescriptions.is_empty());
    }
}
