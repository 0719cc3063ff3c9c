//! Seed data: the default category tree and an optional demo project.

use anyhow::Context;
use atelier_api::auth::password::{generate_temporary_password, hash_password};
use atelier_core::roles::{ROLE_AGENCY_ID, ROLE_CLIENT_ID};
use atelier_core::types::DbId;
use atelier_db::models::address::AddressInput;
use atelier_db::models::category::CreateCategory;
use atelier_db::models::prescription::CreatePrescription;
use atelier_db::models::project::CreateProject;
use atelier_db::models::space::CreateSpace;
use atelier_db::models::user::{CreateUser, User};
use atelier_db::repositories::{
    AddressRepo, CategoryRepo, PrescriptionRepo, ProjectClientRepo, ProjectRepo, SpaceRepo,
    UserRepo,
};
use atelier_db::DbPool;

/// Top-level categories and their children, in display order.
pub const DEFAULT_CATEGORIES: &[(&str, &[&str])] = &[
    ("Furniture", &["Seating", "Tables", "Storage", "Beds"]),
    ("Lighting", &["Pendant lights", "Wall lights", "Floor lamps", "Table lamps"]),
    ("Textiles", &["Curtains", "Rugs", "Cushions"]),
    ("Surfaces", &["Paint", "Wallpaper", "Flooring", "Tiles"]),
    ("Bathroom", &["Sanitaryware", "Taps", "Bathroom accessories"]),
    ("Kitchen", &["Appliances", "Worktops", "Hardware"]),
    ("Decoration", &["Art", "Mirrors", "Plants"]),
];

const DEMO_AGENCY_EMAIL: &str = "agency@atelier.demo";
const DEMO_CLIENT_EMAIL: &str = "client@atelier.demo";

/// Insert missing default categories. Existing names are left alone, so
/// running it twice is harmless. Returns how many rows were inserted.
pub async fn seed_categories(pool: &DbPool) -> anyhow::Result<usize> {
    let mut created = 0;
    for (parent_order, (parent, children)) in DEFAULT_CATEGORIES.iter().enumerate() {
        let (parent_id, inserted) = ensure_category(pool, parent, None, parent_order).await?;
        created += usize::from(inserted);

        for (order, child) in children.iter().enumerate() {
            let (_, inserted) = ensure_category(pool, child, Some(parent_id), order).await?;
            created += usize::from(inserted);
        }
    }
    Ok(created)
}

async fn ensure_category(
    pool: &DbPool,
    name: &str,
    parent_id: Option<DbId>,
    order: usize,
) -> anyhow::Result<(DbId, bool)> {
    if let Some(existing) = CategoryRepo::find_by_name(pool, name).await? {
        return Ok((existing.id, false));
    }
    let category = CategoryRepo::create(
        pool,
        &CreateCategory {
            name: name.to_string(),
            parent_id,
            sort_order: Some(i32::try_from(order).unwrap_or(i32::MAX)),
        },
    )
    .await
    .with_context(|| format!("Failed to create category {name}"))?;
    Ok((category.id, true))
}

/// Create a demo agency, a client assigned to one furnished project, and
/// print their one-time passwords. Skipped when the demo agency exists.
pub async fn seed_demo(pool: &DbPool) -> anyhow::Result<()> {
    if UserRepo::find_by_email(pool, DEMO_AGENCY_EMAIL)
        .await?
        .is_some()
    {
        tracing::info!("Demo data already present, skipping");
        return Ok(());
    }

    let (agency, agency_password) =
        demo_user(pool, DEMO_AGENCY_EMAIL, "Studio Demo", ROLE_AGENCY_ID).await?;
    let (client, client_password) = match UserRepo::find_by_email(pool, DEMO_CLIENT_EMAIL).await? {
        Some(existing) => (existing, None),
        None => {
            let (user, password) =
                demo_user(pool, DEMO_CLIENT_EMAIL, "Camille Demo", ROLE_CLIENT_ID).await?;
            (user, Some(password))
        }
    };

    let address = AddressRepo::create(
        pool,
        &AddressInput {
            street: "12 rue des Martyrs".to_string(),
            extra: None,
            postal_code: "75009".to_string(),
            city: "Paris".to_string(),
            country: None,
        },
    )
    .await?;
    let project = ProjectRepo::create(
        pool,
        agency.id,
        &CreateProject {
            name: "Appartement Martyrs".to_string(),
            description: Some("Living room and kitchen refresh".to_string()),
            status: None,
            budget_cents: Some(1_500_000),
            address: None,
        },
        Some(address.id),
    )
    .await?;
    ProjectClientRepo::add(pool, project.id, client.id, true).await?;

    let lighting = CategoryRepo::find_by_name(pool, "Pendant lights")
        .await?
        .map(|c| c.id);
    let seating = CategoryRepo::find_by_name(pool, "Seating")
        .await?
        .map(|c| c.id);

    let living = demo_space(pool, project.id, "Living room").await?;
    demo_item(pool, living, "Three-seat sofa", seating, 1, 289_000).await?;
    demo_item(pool, living, "Linen pendant", lighting, 2, 18_500).await?;

    let kitchen = demo_space(pool, project.id, "Kitchen").await?;
    demo_item(pool, kitchen, "Counter stool", seating, 3, 14_900).await?;

    tracing::info!(project_id = project.id, "Demo project created");
    println!("agency: {DEMO_AGENCY_EMAIL} / {agency_password}");
    match client_password {
        Some(password) => println!("client: {DEMO_CLIENT_EMAIL} / {password}"),
        None => println!("client: {DEMO_CLIENT_EMAIL} (existing account)"),
    }
    Ok(())
}

async fn demo_user(
    pool: &DbPool,
    email: &str,
    name: &str,
    role_id: DbId,
) -> anyhow::Result<(User, String)> {
    let password = generate_temporary_password();
    let password_hash =
        hash_password(&password).map_err(|e| anyhow::anyhow!("Password hashing failed: {e}"))?;
    let user = UserRepo::create(
        pool,
        &CreateUser {
            email: email.to_string(),
            name: name.to_string(),
            password_hash,
            role_id,
            company_name: None,
            phone: None,
        },
    )
    .await?;
    Ok((user, password))
}

async fn demo_space(pool: &DbPool, project_id: DbId, name: &str) -> anyhow::Result<DbId> {
    let space = SpaceRepo::create(
        pool,
        project_id,
        &CreateSpace {
            name: name.to_string(),
            description: None,
            sort_order: None,
        },
    )
    .await?;
    Ok(space.id)
}

async fn demo_item(
    pool: &DbPool,
    space_id: DbId,
    name: &str,
    category_id: Option<DbId>,
    quantity: i32,
    unit_price_cents: i64,
) -> anyhow::Result<()> {
    PrescriptionRepo::create(
        pool,
        space_id,
        &CreatePrescription {
            name: name.to_string(),
            description: None,
            brand: None,
            reference: None,
            supplier_url: None,
            image_url: None,
            category_id,
            quantity: Some(quantity),
            unit_price_cents: Some(unit_price_cents),
            sort_order: None,
        },
    )
    .await?;
    Ok(())
}
