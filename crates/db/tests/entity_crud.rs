//! Integration tests for the core entity hierarchy.
//!
//! Exercises the repository layer against a real database:
//! - User, project, space, prescription creation
//! - Cascade delete from project down to prescriptions
//! - Unique constraint violations
//! - Project summary aggregation

use assert_matches::assert_matches;
use atelier_core::roles::{ROLE_AGENCY_ID, ROLE_CLIENT_ID};
use atelier_db::models::address::AddressInput;
use atelier_db::models::prescription::CreatePrescription;
use atelier_db::models::project::{CreateProject, UpdateProject};
use atelier_db::models::space::CreateSpace;
use atelier_db::models::user::CreateUser;
use atelier_db::repositories::{
    AddressRepo, PrescriptionRepo, ProjectClientRepo, ProjectRepo, RoleRepo, SpaceRepo, UserRepo,
};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn new_user(pool: &PgPool, email: &str, role_id: i64) -> i64 {
    UserRepo::create(
        pool,
        &CreateUser {
            email: email.to_string(),
            name: email.split('@').next().unwrap_or(email).to_string(),
            password_hash: "not-a-real-hash".to_string(),
            role_id,
            company_name: None,
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
        description: None,
        status: None,
        budget_cents: None,
        address: None,
    }
}

fn new_space(name: &str) -> CreateSpace {
    CreateSpace {
        name: name.to_string(),
        description: None,
        sort_order: None,
    }
}

fn new_prescription(name: &str, quantity: i32, unit_price_cents: i64) -> CreatePrescription {
    CreatePrescription {
        name: name.to_string(),
        description: None,
        brand: None,
        reference: None,
        supplier_url: None,
        image_url: None,
        category_id: None,
        quantity: Some(quantity),
        unit_price_cents: Some(unit_price_cents),
        sort_order: None,
    }
}

// ---------------------------------------------------------------------------
// Users and roles
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_roles_are_seeded(pool: PgPool) {
    let roles = RoleRepo::list(&pool).await.unwrap();
    let names: Vec<&str> = roles.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["admin", "agency", "client"]);
    assert_eq!(RoleRepo::resolve_name(&pool, 99).await.unwrap(), "unknown");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_email_violates_unique_constraint(pool: PgPool) {
    new_user(&pool, "studio@example.com", ROLE_AGENCY_ID).await;

    let err = UserRepo::create(
        &pool,
        &CreateUser {
            email: "studio@example.com".to_string(),
            name: "Other".to_string(),
            password_hash: "x".to_string(),
            role_id: ROLE_AGENCY_ID,
            company_name: None,
            phone: None,
        },
    )
    .await
    .unwrap_err();

    assert_matches!(err, sqlx::Error::Database(ref db) if db.constraint() == Some("uq_users_email"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_find_by_email_ignores_case(pool: PgPool) {
    let id = new_user(&pool, "mixed@example.com", ROLE_CLIENT_ID).await;
    let found = UserRepo::find_by_email(&pool, "MIXED@example.com")
        .await
        .unwrap()
        .expect("user should be found");
    assert_eq!(found.id, id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_users_filters_by_role(pool: PgPool) {
    new_user(&pool, "a@example.com", ROLE_AGENCY_ID).await;
    new_user(&pool, "c1@example.com", ROLE_CLIENT_ID).await;
    new_user(&pool, "c2@example.com", ROLE_CLIENT_ID).await;

    let clients = UserRepo::list(&pool, Some(ROLE_CLIENT_ID)).await.unwrap();
    assert_eq!(clients.len(), 2);
    assert!(clients.iter().all(|u| u.role_id == ROLE_CLIENT_ID));

    let everyone = UserRepo::list(&pool, None).await.unwrap();
    assert_eq!(everyone.len(), 3);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_failed_login_counter_and_lock(pool: PgPool) {
    let id = new_user(&pool, "lock@example.com", ROLE_AGENCY_ID).await;

    assert_eq!(UserRepo::increment_failed_login(&pool, id).await.unwrap(), 1);
    assert_eq!(UserRepo::increment_failed_login(&pool, id).await.unwrap(), 2);

    let until = chrono::Utc::now() + chrono::Duration::minutes(15);
    UserRepo::lock_account(&pool, id, until).await.unwrap();
    let user = UserRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert!(user.locked_until.is_some());

    UserRepo::record_successful_login(&pool, id).await.unwrap();
    let user = UserRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(user.failed_login_count, 0);
    assert!(user.locked_until.is_none());
    assert!(user.last_login_at.is_some());
}

// ---------------------------------------------------------------------------
// Projects, spaces, prescriptions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_project_hierarchy(pool: PgPool) {
    let owner = new_user(&pool, "agency@example.com", ROLE_AGENCY_ID).await;

    let address = AddressRepo::create(
        &pool,
        &AddressInput {
            street: "12 rue des Arts".to_string(),
            extra: None,
            postal_code: "75003".to_string(),
            city: "Paris".to_string(),
            country: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(address.country, "FR");

    let project = ProjectRepo::create(&pool, owner, &new_project("Loft"), Some(address.id))
        .await
        .unwrap();
    assert_eq!(project.status, "draft");
    assert_eq!(project.address_id, Some(address.id));

    let kitchen = SpaceRepo::create(&pool, project.id, &new_space("Kitchen"))
        .await
        .unwrap();
    let bedroom = SpaceRepo::create(&pool, project.id, &new_space("Bedroom"))
        .await
        .unwrap();
    assert_eq!(kitchen.sort_order, 0);
    assert_eq!(bedroom.sort_order, 1, "new spaces are appended");

    let lamp = PrescriptionRepo::create(&pool, kitchen.id, &new_prescription("Lamp", 2, 4_500))
        .await
        .unwrap();
    assert_eq!(lamp.status, "draft");

    let listed = PrescriptionRepo::list_by_project(&pool, project.id, None)
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].space_name, "Kitchen");

    assert_eq!(
        PrescriptionRepo::project_id_of(&pool, lamp.id).await.unwrap(),
        Some(project.id)
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_project_applies_only_given_fields(pool: PgPool) {
    let owner = new_user(&pool, "agency@example.com", ROLE_AGENCY_ID).await;
    let project = ProjectRepo::create(&pool, owner, &new_project("Before"), None)
        .await
        .unwrap();

    let updated = ProjectRepo::update(
        &pool,
        project.id,
        &UpdateProject {
            status: Some("active".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(updated.name, "Before");
    assert_eq!(updated.status, "active");

    let missing = ProjectRepo::update(&pool, 9_999, &UpdateProject::default())
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_project_clears_nullable_fields(pool: PgPool) {
    let owner = new_user(&pool, "agency@example.com", ROLE_AGENCY_ID).await;
    let project = ProjectRepo::create(
        &pool,
        owner,
        &CreateProject {
            description: Some("Full renovation".to_string()),
            budget_cents: Some(500_000),
            ..new_project("Loft")
        },
        None,
    )
    .await
    .unwrap();

    let kept = ProjectRepo::update(
        &pool,
        project.id,
        &UpdateProject {
            name: Some("Loft 2".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(kept.description.as_deref(), Some("Full renovation"));
    assert_eq!(kept.budget_cents, Some(500_000));

    let cleared = ProjectRepo::update(
        &pool,
        project.id,
        &UpdateProject {
            description: Some(None),
            budget_cents: Some(None),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(cleared.name, "Loft 2");
    assert!(cleared.description.is_none());
    assert!(cleared.budget_cents.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_invalid_quantity_rejected_by_check_constraint(pool: PgPool) {
    let owner = new_user(&pool, "agency@example.com", ROLE_AGENCY_ID).await;
    let project = ProjectRepo::create(&pool, owner, &new_project("Checks"), None)
        .await
        .unwrap();
    let space = SpaceRepo::create(&pool, project.id, &new_space("Hall"))
        .await
        .unwrap();

    let result = PrescriptionRepo::create(&pool, space.id, &new_prescription("Rug", 0, 100)).await;
    assert_matches!(result, Err(sqlx::Error::Database(_)));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_deleting_space_cascades_to_prescriptions(pool: PgPool) {
    let owner = new_user(&pool, "agency@example.com", ROLE_AGENCY_ID).await;
    let project = ProjectRepo::create(&pool, owner, &new_project("Cascade"), None)
        .await
        .unwrap();
    let space = SpaceRepo::create(&pool, project.id, &new_space("Bath"))
        .await
        .unwrap();
    let tap = PrescriptionRepo::create(&pool, space.id, &new_prescription("Tap", 1, 12_000))
        .await
        .unwrap();

    assert!(SpaceRepo::delete(&pool, space.id).await.unwrap());
    assert!(PrescriptionRepo::find_by_id(&pool, tap.id)
        .await
        .unwrap()
        .is_none());
    assert!(!SpaceRepo::delete(&pool, space.id).await.unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_project_summary_aggregates_budget(pool: PgPool) {
    let owner = new_user(&pool, "agency@example.com", ROLE_AGENCY_ID).await;
    let client = new_user(&pool, "client@example.com", ROLE_CLIENT_ID).await;
    let project = ProjectRepo::create(&pool, owner, &new_project("Budget"), None)
        .await
        .unwrap();
    ProjectClientRepo::add(&pool, project.id, client, true)
        .await
        .unwrap();

    let empty = ProjectRepo::summary(&pool, project.id).await.unwrap();
    assert_eq!(empty.item_count, 0);
    assert_eq!(empty.total_cents, 0);
    assert_eq!(empty.client_count, 1);

    let space = SpaceRepo::create(&pool, project.id, &new_space("Living"))
        .await
        .unwrap();
    let sofa = PrescriptionRepo::create(&pool, space.id, &new_prescription("Sofa", 1, 150_000))
        .await
        .unwrap();
    PrescriptionRepo::create(&pool, space.id, &new_prescription("Cushion", 4, 2_500))
        .await
        .unwrap();
    PrescriptionRepo::set_status(&pool, sofa.id, "approved")
        .await
        .unwrap();

    let summary = ProjectRepo::summary(&pool, project.id).await.unwrap();
    assert_eq!(summary.space_count, 1);
    assert_eq!(summary.item_count, 2);
    assert_eq!(summary.total_cents, 160_000);
    assert_eq!(summary.approved_cents, 150_000);
    assert_eq!(summary.approved_count, 1);
    assert_eq!(summary.draft_count, 1);
}

// ---------------------------------------------------------------------------
// Client assignments
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_client_assignment_is_idempotent(pool: PgPool) {
    let owner = new_user(&pool, "agency@example.com", ROLE_AGENCY_ID).await;
    let client = new_user(&pool, "client@example.com", ROLE_CLIENT_ID).await;
    let viewer = new_user(&pool, "viewer@example.com", ROLE_CLIENT_ID).await;
    let project = ProjectRepo::create(&pool, owner, &new_project("Shared"), None)
        .await
        .unwrap();

    ProjectClientRepo::add(&pool, project.id, client, true)
        .await
        .unwrap();
    ProjectClientRepo::add(&pool, project.id, client, true)
        .await
        .unwrap();
    ProjectClientRepo::add(&pool, project.id, viewer, false)
        .await
        .unwrap();

    let clients = ProjectClientRepo::list_for_project(&pool, project.id)
        .await
        .unwrap();
    assert_eq!(clients.len(), 2);

    assert!(ProjectClientRepo::is_client(&pool, project.id, viewer)
        .await
        .unwrap());
    assert_eq!(
        ProjectClientRepo::approver_ids(&pool, project.id).await.unwrap(),
        vec![client]
    );

    let assigned = ProjectRepo::list_for_client(&pool, client).await.unwrap();
    assert_eq!(assigned.len(), 1);

    assert!(ProjectClientRepo::remove(&pool, project.id, client)
        .await
        .unwrap());
    assert!(!ProjectClientRepo::remove(&pool, project.id, client)
        .await
        .unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_account_and_assignment_roll_back_together(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let user = UserRepo::create(
        &mut *tx,
        &CreateUser {
            email: "invitee@example.com".to_string(),
            name: "Invitee".to_string(),
            password_hash: "not-a-real-hash".to_string(),
            role_id: ROLE_CLIENT_ID,
            company_name: None,
            phone: None,
        },
    )
    .await
    .unwrap();

    // Unknown project: the assignment violates its foreign key.
    let assigned = ProjectClientRepo::add(&mut *tx, 999_999, user.id, true).await;
    assert!(assigned.is_err());
    drop(tx);

    let found = UserRepo::find_by_email(&pool, "invitee@example.com")
        .await
        .unwrap();
    assert!(found.is_none());
}
