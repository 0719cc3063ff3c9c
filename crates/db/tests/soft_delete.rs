//! Integration tests for project soft-delete, restore and purge helpers.

use atelier_core::roles::ROLE_AGENCY_ID;
use atelier_db::models::project::CreateProject;
use atelier_db::models::user::CreateUser;
use atelier_db::repositories::{ProjectRepo, UserRepo};
use sqlx::PgPool;

async fn owner(pool: &PgPool) -> i64 {
    UserRepo::create(
        pool,
        &CreateUser {
            email: "owner@example.com".to_string(),
            name: "Owner".to_string(),
            password_hash: "x".to_string(),
            role_id: ROLE_AGENCY_ID,
            company_name: Some("Studio".to_string()),
            phone: None,
        },
    )
    .await
    .unwrap()
    .id
}

fn new_project(name: &str) -> CreateProject {
    CreateProject {
        name: name.to_string(),
        description: Some("soft delete test".to_string()),
        status: None,
        budget_cents: Some(1_000_000),
        address: None,
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_soft_delete_hides_project(pool: PgPool) {
    let owner_id = owner(&pool).await;
    let project = ProjectRepo::create(&pool, owner_id, &new_project("Hidden"), None)
        .await
        .unwrap();

    assert!(ProjectRepo::soft_delete(&pool, project.id).await.unwrap());
    assert!(ProjectRepo::find_by_id(&pool, project.id)
        .await
        .unwrap()
        .is_none());
    assert!(ProjectRepo::list_for_owner(&pool, owner_id)
        .await
        .unwrap()
        .is_empty());
    assert!(ProjectRepo::list_all(&pool).await.unwrap().is_empty());

    // The row itself is still there.
    let raw = ProjectRepo::find_by_id_include_deleted(&pool, project.id)
        .await
        .unwrap();
    assert!(raw.is_some_and(|p| p.deleted_at.is_some()));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_soft_delete_is_idempotent_and_restorable(pool: PgPool) {
    let owner_id = owner(&pool).await;
    let project = ProjectRepo::create(&pool, owner_id, &new_project("Twice"), None)
        .await
        .unwrap();

    assert!(ProjectRepo::soft_delete(&pool, project.id).await.unwrap());
    assert!(
        !ProjectRepo::soft_delete(&pool, project.id).await.unwrap(),
        "second soft_delete should return false"
    );

    assert!(ProjectRepo::restore(&pool, project.id).await.unwrap());
    let found = ProjectRepo::find_by_id(&pool, project.id).await.unwrap();
    assert_eq!(found.map(|p| p.name), Some("Twice".to_string()));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_deleted_before_respects_cutoff(pool: PgPool) {
    let owner_id = owner(&pool).await;
    let old = ProjectRepo::create(&pool, owner_id, &new_project("Old"), None)
        .await
        .unwrap();
    let recent = ProjectRepo::create(&pool, owner_id, &new_project("Recent"), None)
        .await
        .unwrap();
    ProjectRepo::soft_delete(&pool, old.id).await.unwrap();
    ProjectRepo::soft_delete(&pool, recent.id).await.unwrap();

    sqlx::query("UPDATE projects SET deleted_at = NOW() - INTERVAL '60 days' WHERE id = $1")
        .bind(old.id)
        .execute(&pool)
        .await
        .unwrap();

    let cutoff = chrono::Utc::now() - chrono::Duration::days(30);
    let expired = ProjectRepo::list_deleted_before(&pool, cutoff).await.unwrap();
    assert_eq!(expired.len(), 1);
    assert_eq!(expired[0].id, old.id);

    assert!(ProjectRepo::hard_delete(&pool, old.id).await.unwrap());
    assert!(ProjectRepo::find_by_id_include_deleted(&pool, old.id)
        .await
        .unwrap()
        .is_none());
}
