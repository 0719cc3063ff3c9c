//! Per-project access resolution.
//!
//! Role extractors in [`crate::middleware::rbac`] only check the caller's
//! role. Whether a caller may see or change a given project depends on
//! ownership and client assignment, resolved here:
//!
//! | Caller                   | View | Manage |
//! |--------------------------|------|--------|
//! | admin                    | yes  | yes    |
//! | owning agency            | yes  | yes    |
//! | assigned client          | yes  | 403    |
//! | anyone else              | 404  | 404    |
//!
//! Hidden projects answer 404 so their existence is not leaked.

use atelier_core::error::CoreError;
use atelier_core::types::DbId;
use atelier_db::models::prescription::Prescription;
use atelier_db::models::project::Project;
use atelier_db::models::space::Space;
use atelier_db::repositories::{PrescriptionRepo, ProjectClientRepo, ProjectRepo, SpaceRepo};
use atelier_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;

/// What the caller intends to do with the project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Need {
    View,
    Manage,
}

/// How the caller relates to the project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Admin,
    Owner,
    Client,
}

/// A project the caller was allowed to reach, and why.
#[derive(Debug, Clone)]
pub struct ProjectAccess {
    pub project: Project,
    pub relation: Relation,
}

impl ProjectAccess {
    pub fn can_manage(&self) -> bool {
        matches!(self.relation, Relation::Admin | Relation::Owner)
    }

    pub fn is_client(&self) -> bool {
        self.relation == Relation::Client
    }
}

/// Load a live project and check the caller's access to it.
pub async fn load_project_for(
    pool: &DbPool,
    user: &AuthUser,
    project_id: DbId,
    need: Need,
) -> AppResult<ProjectAccess> {
    let project = ProjectRepo::find_by_id(pool, project_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Project", project_id))?;

    let relation = if user.is_admin() {
        Relation::Admin
    } else if project.owner_id == user.user_id {
        Relation::Owner
    } else if ProjectClientRepo::is_client(pool, project_id, user.user_id).await? {
        Relation::Client
    } else {
        return Err(CoreError::not_found("Project", project_id).into());
    };

    if need == Need::Manage && relation == Relation::Client {
        return Err(AppError::forbidden(
            "Clients have read-only access to this project",
        ));
    }

    Ok(ProjectAccess { project, relation })
}

/// Load a space and check access to its project.
///
/// A space on a hidden project is reported as a missing space.
pub async fn load_space_for(
    pool: &DbPool,
    user: &AuthUser,
    space_id: DbId,
    need: Need,
) -> AppResult<(Space, ProjectAccess)> {
    let space = SpaceRepo::find_by_id(pool, space_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Space", space_id))?;
    let access = load_project_for(pool, user, space.project_id, need)
        .await
        .map_err(|e| rename_not_found(e, "Space", space_id))?;
    Ok((space, access))
}

/// Load a prescription and check access to its project.
pub async fn load_prescription_for(
    pool: &DbPool,
    user: &AuthUser,
    prescription_id: DbId,
    need: Need,
) -> AppResult<(Prescription, ProjectAccess)> {
    let prescription = PrescriptionRepo::find_by_id(pool, prescription_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Prescription", prescription_id))?;
    let (_, access) = load_space_for(pool, user, prescription.space_id, need)
        .await
        .map_err(|e| rename_not_found(e, "Prescription", prescription_id))?;
    Ok((prescription, access))
}

pub(crate) fn rename_not_found(err: AppError, entity: &'static str, id: DbId) -> AppError {
    match err {
        AppError::Core(CoreError::NotFound { .. }) => CoreError::not_found(entity, id).into(),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn not_found_is_renamed_to_child_entity() {
        let err = rename_not_found(CoreError::not_found("Project", 3).into(), "Space", 9);
        assert_matches!(
            err,
            AppError::Core(CoreError::NotFound { entity: "Space", id: 9 })
        );
    }

    #[test]
    fn forbidden_passes_through() {
        let err = rename_not_found(AppError::forbidden("no"), "Space", 9);
        assert_matches!(err, AppError::Core(CoreError::Forbidden(_)));
    }
}
