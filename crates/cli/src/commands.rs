//! Subcommand implementations.

use std::collections::{HashMap, HashSet};

use anyhow::{bail, Context};
use atelier_api::auth::password::{hash_password, validate_password_strength};
use atelier_api::storage::LocalStorage;
use atelier_core::prescription::aggregate_status;
use atelier_core::roles::ROLE_ADMIN_ID;
use atelier_core::types::DbId;
use atelier_core::validation::{normalize_email, require_non_empty};
use atelier_db::models::user::CreateUser;
use atelier_db::repositories::{
    ApprovalRepo, ClientPhotoRepo, PrescriptionRepo, ProjectClientRepo, ProjectFileRepo,
    ProjectRepo, UserRepo,
};
use atelier_db::DbPool;

use crate::seed;

pub async fn migrate(pool: &DbPool) -> anyhow::Result<()> {
    atelier_db::run_migrations(pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations applied");
    Ok(())
}

pub async fn seed(pool: &DbPool, demo: bool) -> anyhow::Result<()> {
    let created = seed::seed_categories(pool).await?;
    tracing::info!(created, "Default categories seeded");

    if demo {
        seed::seed_demo(pool).await?;
    }
    Ok(())
}

pub async fn create_admin(
    pool: &DbPool,
    email: &str,
    name: &str,
    password: &str,
) -> anyhow::Result<()> {
    let email = normalize_email(email);
    require_non_empty("email", &email).map_err(anyhow::Error::msg)?;
    require_non_empty("name", name).map_err(anyhow::Error::msg)?;
    validate_password_strength(password).map_err(anyhow::Error::msg)?;

    if UserRepo::find_by_email(pool, &email).await?.is_some() {
        bail!("An account with email {email} already exists");
    }

    let password_hash =
        hash_password(password).map_err(|e| anyhow::anyhow!("Password hashing failed: {e}"))?;
    let user = UserRepo::create(
        pool,
        &CreateUser {
            email,
            name: name.trim().to_string(),
            password_hash,
            role_id: ROLE_ADMIN_ID,
            company_name: None,
            phone: None,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, email = %user.email, "Administrator created");
    Ok(())
}

pub async fn reset_password(pool: &DbPool, email: &str, password: &str) -> anyhow::Result<()> {
    let email = normalize_email(email);
    validate_password_strength(password).map_err(anyhow::Error::msg)?;

    let user = UserRepo::find_by_email(pool, &email)
        .await?
        .with_context(|| format!("No account with email {email}"))?;
    let password_hash =
        hash_password(password).map_err(|e| anyhow::anyhow!("Password hashing failed: {e}"))?;
    UserRepo::update_password(pool, user.id, &password_hash).await?;

    tracing::info!(user_id = user.id, "Password reset, account unlocked");
    Ok(())
}

/// Recompute reviewed prescriptions. Returns how many were out of step,
/// whether or not they were written back.
pub async fn repair_statuses(pool: &DbPool, dry_run: bool) -> anyhow::Result<usize> {
    let reviewed = PrescriptionRepo::list_under_review(pool).await?;
    let mut approvers_by_project: HashMap<DbId, Vec<DbId>> = HashMap::new();
    let mut fixed = 0usize;

    for (prescription_id, project_id, status) in &reviewed {
        if !approvers_by_project.contains_key(project_id) {
            let ids = ProjectClientRepo::approver_ids(pool, *project_id).await?;
            approvers_by_project.insert(*project_id, ids);
        }
        let approvers = &approvers_by_project[project_id];

        let decisions = ApprovalRepo::decisions_for_prescription(pool, *prescription_id).await?;
        let pairs: Vec<(DbId, &str)> = decisions
            .iter()
            .map(|(user_id, decision)| (*user_id, decision.as_str()))
            .collect();
        let expected = aggregate_status(&pairs, approvers);

        if expected == status.as_str() {
            continue;
        }
        fixed += 1;
        println!("prescription {prescription_id}: {status} -> {expected}");
        if !dry_run {
            PrescriptionRepo::set_status(pool, *prescription_id, expected).await?;
        }
    }

    tracing::info!(checked = reviewed.len(), fixed, dry_run, "Status repair finished");
    Ok(fixed)
}

pub async fn purge_deleted(
    pool: &DbPool,
    storage: &LocalStorage,
    older_than_days: u32,
    dry_run: bool,
) -> anyhow::Result<Vec<DbId>> {
    let cutoff = chrono::Utc::now() - chrono::Duration::days(i64::from(older_than_days));
    let projects = ProjectRepo::list_deleted_before(pool, cutoff).await?;

    for project in &projects {
        println!(
            "project {} \"{}\" deleted at {}",
            project.id,
            project.name,
            project
                .deleted_at
                .map(|at| at.to_rfc3339())
                .unwrap_or_default()
        );
        if dry_run {
            continue;
        }

        ProjectRepo::hard_delete(pool, project.id).await?;
        let had_files = storage
            .remove_project(project.id)
            .await
            .with_context(|| format!("Failed to remove files of project {}", project.id))?;
        tracing::info!(project_id = project.id, had_files, "Project purged");
    }

    tracing::info!(count = projects.len(), dry_run, "Purge finished");
    Ok(projects.into_iter().map(|p| p.id).collect())
}

pub async fn orphan_files(
    pool: &DbPool,
    storage: &LocalStorage,
    delete: bool,
) -> anyhow::Result<Vec<String>> {
    let stored = storage
        .list_keys()
        .await
        .with_context(|| format!("Failed to scan {}", storage.root().display()))?;

    let mut referenced: HashSet<String> = ClientPhotoRepo::all_paths(pool)
        .await?
        .into_iter()
        .collect();
    referenced.extend(ProjectFileRepo::all_paths(pool).await?);

    let orphans = find_orphans(stored, &referenced);
    for key in &orphans {
        println!("{key}");
        if delete {
            storage.delete(key).await?;
        }
    }

    tracing::info!(orphans = orphans.len(), deleted = delete, "Orphan scan finished");
    Ok(orphans)
}

/// Stored keys with no row pointing at them.
fn find_orphans(stored: Vec<String>, referenced: &HashSet<String>) -> Vec<String> {
    stored
        .into_iter()
        .filter(|key| !referenced.contains(key))
        .collect()
}
