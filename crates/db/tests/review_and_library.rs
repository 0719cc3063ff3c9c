//! Integration tests for approvals, comments, notifications, categories and
//! the resource library.

use atelier_core::roles::{ROLE_AGENCY_ID, ROLE_CLIENT_ID};
use atelier_db::models::category::{CreateCategory, UpdateCategory};
use atelier_db::models::notification::NewNotification;
use atelier_db::models::prescription::{CreatePrescription, UpdatePrescription};
use atelier_db::models::project::CreateProject;
use atelier_db::models::resource::{CreateResource, ResourceSearch};
use atelier_db::models::space::CreateSpace;
use atelier_db::models::user::CreateUser;
use atelier_db::repositories::{
    ApprovalRepo, CategoryRepo, CommentRepo, NotificationRepo, PrescriptionRepo,
    ProjectClientRepo, ProjectRepo, ResourceRepo, SpaceRepo, UserRepo,
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
            name: email.to_string(),
            password_hash: "x".to_string(),
            role_id,
            company_name: None,
            phone: None,
        },
    )
    .await
    .unwrap()
    .id
}

/// Project with one space and one pending prescription, shared with a client.
struct Fixture {
    owner: i64,
    client: i64,
    project_id: i64,
    prescription_id: i64,
}

async fn fixture(pool: &PgPool) -> Fixture {
    let owner = new_user(pool, "agency@example.com", ROLE_AGENCY_ID).await;
    let client = new_user(pool, "client@example.com", ROLE_CLIENT_ID).await;
    let project = ProjectRepo::create(
        pool,
        owner,
        &CreateProject {
            name: "Apartment".to_string(),
            description: None,
            status: Some("active".to_string()),
            budget_cents: None,
            address: None,
        },
        None,
    )
    .await
    .unwrap();
    ProjectClientRepo::add(pool, project.id, client, true)
        .await
        .unwrap();
    let space = SpaceRepo::create(
        pool,
        project.id,
        &CreateSpace {
            name: "Salon".to_string(),
            description: None,
            sort_order: None,
        },
    )
    .await
    .unwrap();
    let prescription = PrescriptionRepo::create(
        pool,
        space.id,
        &CreatePrescription {
            name: "Armchair".to_string(),
            description: None,
            brand: Some("Maison".to_string()),
            reference: None,
            supplier_url: None,
            image_url: None,
            category_id: None,
            quantity: Some(2),
            unit_price_cents: Some(89_000),
            sort_order: None,
        },
    )
    .await
    .unwrap();
    PrescriptionRepo::set_status(pool, prescription.id, "pending")
        .await
        .unwrap();

    Fixture {
        owner,
        client,
        project_id: project.id,
        prescription_id: prescription.id,
    }
}

fn category(name: &str, parent_id: Option<i64>) -> CreateCategory {
    CreateCategory {
        name: name.to_string(),
        parent_id,
        sort_order: None,
    }
}

fn resource(name: &str, category_id: Option<i64>, is_public: bool) -> CreateResource {
    CreateResource {
        name: name.to_string(),
        description: None,
        brand: None,
        reference: None,
        supplier: None,
        supplier_url: None,
        image_url: None,
        unit_price_cents: Some(10_000),
        category_id,
        is_public: Some(is_public),
    }
}

// ---------------------------------------------------------------------------
// Approvals
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_approval_upsert_replaces_previous_decision(pool: PgPool) {
    let f = fixture(&pool).await;

    ApprovalRepo::upsert(&pool, f.prescription_id, f.client, "rejected", Some("too dark"))
        .await
        .unwrap();
    let second = ApprovalRepo::upsert(&pool, f.prescription_id, f.client, "approved", None)
        .await
        .unwrap();
    assert_eq!(second.decision, "approved");
    assert!(second.comment.is_none());

    let decisions = ApprovalRepo::decisions_for_prescription(&pool, f.prescription_id)
        .await
        .unwrap();
    assert_eq!(decisions, vec![(f.client, "approved".to_string())]);

    let listed = ApprovalRepo::list_for_prescription(&pool, f.prescription_id)
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].user_email, "client@example.com");

    let removed = ApprovalRepo::delete_for_prescription(&pool, f.prescription_id)
        .await
        .unwrap();
    assert_eq!(removed, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_pending_list_excludes_decided_items(pool: PgPool) {
    let f = fixture(&pool).await;

    let pending = PrescriptionRepo::list_pending_for_client(&pool, f.client)
        .await
        .unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].project_id, f.project_id);
    assert_eq!(pending[0].space_name, "Salon");

    ApprovalRepo::upsert(&pool, f.prescription_id, f.client, "approved", None)
        .await
        .unwrap();
    let pending = PrescriptionRepo::list_pending_for_client(&pool, f.client)
        .await
        .unwrap();
    assert!(pending.is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_with_reset_returns_to_draft(pool: PgPool) {
    let f = fixture(&pool).await;

    let edited = PrescriptionRepo::update(
        &pool,
        f.prescription_id,
        &UpdatePrescription {
            quantity: Some(3),
            ..Default::default()
        },
        true,
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(edited.quantity, 3);
    assert_eq!(edited.status, "draft");
    assert_eq!(edited.name, "Armchair");
}

// ---------------------------------------------------------------------------
// Comments and notifications
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_comments_carry_author_role(pool: PgPool) {
    let f = fixture(&pool).await;

    CommentRepo::create(&pool, f.prescription_id, f.owner, "Available in oak")
        .await
        .unwrap();
    let reply = CommentRepo::create(&pool, f.prescription_id, f.client, "Oak please")
        .await
        .unwrap();

    let thread = CommentRepo::list_for_prescription(&pool, f.prescription_id)
        .await
        .unwrap();
    assert_eq!(thread.len(), 2);
    assert_eq!(thread[0].author_role, "agency");
    assert_eq!(thread[1].author_role, "client");

    assert!(CommentRepo::delete(&pool, reply.id).await.unwrap());
    assert!(CommentRepo::find_by_id(&pool, reply.id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_notification_read_state(pool: PgPool) {
    let f = fixture(&pool).await;

    let mut ids = Vec::new();
    for title in ["one", "two", "three"] {
        let n = NotificationRepo::create(
            &pool,
            &NewNotification {
                user_id: f.client,
                kind: "prescription.submitted".to_string(),
                title: title.to_string(),
                body: None,
                project_id: Some(f.project_id),
                entity_type: Some("prescription".to_string()),
                entity_id: Some(f.prescription_id),
            },
        )
        .await
        .unwrap();
        ids.push(n.id);
    }

    assert_eq!(NotificationRepo::unread_count(&pool, f.client).await.unwrap(), 3);
    assert!(NotificationRepo::mark_read(&pool, ids[0], f.client).await.unwrap());
    assert!(
        !NotificationRepo::mark_read(&pool, ids[1], f.owner).await.unwrap(),
        "another user's notification is not touched"
    );

    let unread = NotificationRepo::list_for_user(&pool, f.client, true, 50, 0)
        .await
        .unwrap();
    assert_eq!(unread.len(), 2);

    assert_eq!(NotificationRepo::mark_all_read(&pool, f.client).await.unwrap(), 2);
    assert_eq!(NotificationRepo::unread_count(&pool, f.client).await.unwrap(), 0);

    assert!(NotificationRepo::delete(&pool, ids[2], f.client).await.unwrap());
    let all = NotificationRepo::list_for_user(&pool, f.client, false, 50, 0)
        .await
        .unwrap();
    assert_eq!(all.len(), 2);
}

// ---------------------------------------------------------------------------
// Categories and library
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_category_reparent_and_counts(pool: PgPool) {
    let furniture = CategoryRepo::create(&pool, &category("Furniture", None))
        .await
        .unwrap();
    let seating = CategoryRepo::create(&pool, &category("Seating", Some(furniture.id)))
        .await
        .unwrap();

    assert_eq!(CategoryRepo::child_count(&pool, furniture.id).await.unwrap(), 1);

    let moved = CategoryRepo::update(
        &pool,
        seating.id,
        &UpdateCategory {
            parent_id: Some(None),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert!(moved.parent_id.is_none());

    let renamed = CategoryRepo::update(
        &pool,
        seating.id,
        &UpdateCategory {
            name: Some("Chairs".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert!(renamed.parent_id.is_none(), "omitted parent keeps current value");
    assert_eq!(renamed.name, "Chairs");

    let owner = new_user(&pool, "agency@example.com", ROLE_AGENCY_ID).await;
    ResourceRepo::create(&pool, owner, &resource("Stool", Some(seating.id), true))
        .await
        .unwrap();
    assert_eq!(CategoryRepo::usage_count(&pool, seating.id).await.unwrap(), 1);
    assert!(CategoryRepo::delete(&pool, seating.id).await.is_err());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_library_search_filters(pool: PgPool) {
    let mine = new_user(&pool, "mine@example.com", ROLE_AGENCY_ID).await;
    let theirs = new_user(&pool, "theirs@example.com", ROLE_AGENCY_ID).await;
    let lighting = CategoryRepo::create(&pool, &category("Lighting", None))
        .await
        .unwrap();

    ResourceRepo::create(&pool, mine, &resource("Pendant lamp", Some(lighting.id), true))
        .await
        .unwrap();
    ResourceRepo::create(&pool, mine, &resource("Floor lamp", None, false))
        .await
        .unwrap();
    ResourceRepo::create(&pool, theirs, &resource("Secret lamp", None, false))
        .await
        .unwrap();
    ResourceRepo::create(&pool, theirs, &resource("100% wool rug", None, true))
        .await
        .unwrap();

    let visible = ResourceRepo::search(
        &pool,
        &ResourceSearch {
            q: Some("lamp".to_string()),
            visible_to: Some(mine),
            limit: 50,
            ..Default::default()
        },
    )
    .await
    .unwrap();
    let names: Vec<&str> = visible.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Floor lamp", "Pendant lamp"]);

    let by_category = ResourceRepo::search(
        &pool,
        &ResourceSearch {
            category_ids: Some(vec![lighting.id]),
            limit: 50,
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(by_category.len(), 1);

    let literal = ResourceRepo::search(
        &pool,
        &ResourceSearch {
            q: Some("100%".to_string()),
            limit: 50,
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(literal.len(), 1);

    let paged = ResourceRepo::search(
        &pool,
        &ResourceSearch {
            limit: 2,
            offset: 2,
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(paged.len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_from_resource_copies_fields(pool: PgPool) {
    let f = fixture(&pool).await;
    let entry = ResourceRepo::create(&pool, f.owner, &resource("Mirror", None, true))
        .await
        .unwrap();
    let spaces = SpaceRepo::list_by_project(&pool, f.project_id).await.unwrap();

    let copied = PrescriptionRepo::create_from_resource(&pool, spaces[0].id, entry.id, 3)
        .await
        .unwrap()
        .expect("resource exists");
    assert_eq!(copied.name, "Mirror");
    assert_eq!(copied.resource_id, Some(entry.id));
    assert_eq!(copied.unit_price_cents, 10_000);
    assert_eq!(copied.quantity, 3);
    assert_eq!(copied.status, "draft");

    let missing = PrescriptionRepo::create_from_resource(&pool, spaces[0].id, 9_999, 1)
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_can_clear_brand(pool: PgPool) {
    let f = fixture(&pool).await;

    let edited = PrescriptionRepo::update(
        &pool,
        f.prescription_id,
        &UpdatePrescription {
            brand: Some(None),
            ..Default::default()
        },
        false,
    )
    .await
    .unwrap()
    .unwrap();
    assert!(edited.brand.is_none());
    assert_eq!(edited.name, "Armchair");
    assert_eq!(edited.status, "pending");
}
