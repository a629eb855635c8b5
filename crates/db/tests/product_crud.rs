//! Integration tests for the product and user repositories.
//!
//! Exercises the repository layer against a real database:
//! - Owner assignment and name resolution
//! - SKU uniqueness
//! - Owner deletion nulls `created_by` without deleting products
//! - Listing filters, search, ordering and paging
//! - Partial updates and deletes

use std::str::FromStr;

use catalog_core::listing::{parse_ordering, search_terms};
use catalog_core::product::{ProductChanges, ProductDraft};
use catalog_db::models::product::ProductFilter;
use catalog_db::models::user::CreateUser;
use catalog_db::repositories::{ProductRepo, UserRepo};
use rust_decimal::Decimal;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn new_user(pool: &PgPool, email: &str, first: &str, last: &str) -> i64 {
    UserRepo::create(
        pool,
        &CreateUser {
            email: email.to_string(),
            first_name: first.to_string(),
            last_name: last.to_string(),
        },
    )
    .await
    .expect("user creation should succeed")
    .id
}

fn draft(name: &str, sku: &str, price: &str) -> ProductDraft {
    ProductDraft {
        name: name.to_string(),
        description: String::new(),
        sku: sku.to_string(),
        barcode: String::new(),
        price: Decimal::from_str(price).unwrap(),
        stock_quantity: 0,
        image: None,
    }
}

// ---------------------------------------------------------------------------
// Create / read
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_resolves_owner_name(pool: PgPool) {
    let owner = new_user(&pool, "ada@test.com", "Ada", "Lovelace").await;

    let row = ProductRepo::create(&pool, &draft("Widget", "W-1", "19.99"), owner)
        .await
        .unwrap();

    assert_eq!(row.created_by, Some(owner));
    assert_eq!(row.owner_first_name.as_deref(), Some("Ada"));
    assert_eq!(row.owner_last_name.as_deref(), Some("Lovelace"));
    assert_eq!(row.price.to_string(), "19.99");
    assert_eq!(row.created_at, row.updated_at);

    let found = ProductRepo::find_by_id(&pool, row.id).await.unwrap().unwrap();
    assert_eq!(found.sku, "W-1");
    assert_eq!(found.created_by, Some(owner));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_find_missing_returns_none(pool: PgPool) {
    assert!(ProductRepo::find_by_id(&pool, 424242).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_sku_violates_unique_constraint(pool: PgPool) {
    let owner = new_user(&pool, "dup@test.com", "D", "U").await;
    ProductRepo::create(&pool, &draft("One", "SAME", "1.00"), owner)
        .await
        .unwrap();

    assert!(ProductRepo::sku_taken(&pool, "SAME", None).await.unwrap());

    let err = ProductRepo::create(&pool, &draft("Two", "SAME", "2.00"), owner)
        .await
        .unwrap_err();
    match err {
        sqlx::Error::Database(db_err) => {
            assert_eq!(db_err.code().as_deref(), Some("23505"));
            assert_eq!(db_err.constraint(), Some("uq_products_sku"));
        }
        other => panic!("expected unique violation, got {other:?}"),
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_sku_taken_excludes_self(pool: PgPool) {
    let owner = new_user(&pool, "self@test.com", "S", "E").await;
    let row = ProductRepo::create(&pool, &draft("Mine", "MINE", "1.00"), owner)
        .await
        .unwrap();

    assert!(!ProductRepo::sku_taken(&pool, "MINE", Some(row.id)).await.unwrap());
    assert!(!ProductRepo::sku_taken(&pool, "OTHER", None).await.unwrap());
}

// ---------------------------------------------------------------------------
// Owner removal
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_deleting_owner_keeps_products(pool: PgPool) {
    let owner = new_user(&pool, "gone@test.com", "Gone", "Soon").await;
    let a = ProductRepo::create(&pool, &draft("A", "A-1", "1.00"), owner)
        .await
        .unwrap();
    let b = ProductRepo::create(&pool, &draft("B", "B-1", "2.00"), owner)
        .await
        .unwrap();

    assert!(UserRepo::delete(&pool, owner).await.unwrap());

    for id in [a.id, b.id] {
        let row = ProductRepo::find_by_id(&pool, id)
            .await
            .unwrap()
            .expect("product must survive owner deletion");
        assert_eq!(row.created_by, None);
        assert_eq!(row.owner_first_name, None);
    }
}

// ---------------------------------------------------------------------------
// Update / delete
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_partial_update_changes_only_supplied_fields(pool: PgPool) {
    let owner = new_user(&pool, "upd@test.com", "U", "P").await;
    let mut input = draft("Before", "UPD-1", "5.00");
    input.image = Some("products/before.png".to_string());
    let row = ProductRepo::create(&pool, &input, owner).await.unwrap();

    let changes = ProductChanges {
        name: Some("After".to_string()),
        stock_quantity: Some(12),
        ..ProductChanges::default()
    };
    let updated = ProductRepo::update(&pool, row.id, &changes)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.name, "After");
    assert_eq!(updated.stock_quantity, 12);
    assert_eq!(updated.sku, "UPD-1");
    assert_eq!(updated.image.as_deref(), Some("products/before.png"));
    assert_eq!(updated.created_by, Some(owner));
    assert_eq!(updated.created_at, row.created_at);
    assert!(updated.updated_at > row.updated_at);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_can_clear_image(pool: PgPool) {
    let owner = new_user(&pool, "img@test.com", "I", "M").await;
    let mut input = draft("Pic", "PIC-1", "5.00");
    input.image = Some("products/pic.png".to_string());
    let row = ProductRepo::create(&pool, &input, owner).await.unwrap();

    let changes = ProductChanges {
        image: Some(None),
        ..ProductChanges::default()
    };
    let updated = ProductRepo::update(&pool, row.id, &changes)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.image, None);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_and_delete_missing_rows(pool: PgPool) {
    let updated = ProductRepo::update(&pool, 999_999, &ProductChanges::default())
        .await
        .unwrap();
    assert!(updated.is_none());
    assert!(!ProductRepo::delete(&pool, 999_999).await.unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_removes_row(pool: PgPool) {
    let owner = new_user(&pool, "del@test.com", "D", "L").await;
    let row = ProductRepo::create(&pool, &draft("Bye", "BYE", "1.00"), owner)
        .await
        .unwrap();

    assert!(ProductRepo::delete(&pool, row.id).await.unwrap());
    assert!(ProductRepo::find_by_id(&pool, row.id).await.unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_default_listing_is_newest_first(pool: PgPool) {
    let owner = new_user(&pool, "list@test.com", "L", "I").await;
    for (name, sku) in [("First", "L-1"), ("Second", "L-2"), ("Third", "L-3")] {
        ProductRepo::create(&pool, &draft(name, sku, "1.00"), owner)
            .await
            .unwrap();
    }

    let rows = ProductRepo::list(&pool, &ProductFilter::default()).await.unwrap();
    let names: Vec<_> = rows.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Third", "Second", "First"]);
    assert!(rows.windows(2).all(|w| w[0].created_at > w[1].created_at));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_search_matches_any_field_case_insensitively(pool: PgPool) {
    let owner = new_user(&pool, "search@test.com", "S", "R").await;

    let by_name = draft("Blue WIDGET", "S-1", "1.00");
    let mut by_description = draft("Gadget", "S-2", "1.00");
    by_description.description = "pairs well with a widget".to_string();
    let by_sku = draft("Thing", "widget-3", "1.00");
    let mut by_barcode = draft("Other", "S-4", "1.00");
    by_barcode.barcode = "WiDgEt0001".to_string();
    let unrelated = draft("Sprocket", "S-5", "1.00");

    for d in [&by_name, &by_description, &by_sku, &by_barcode, &unrelated] {
        ProductRepo::create(&pool, d, owner).await.unwrap();
    }

    let filter = ProductFilter {
        search: search_terms("widget"),
        ..ProductFilter::default()
    };
    let rows = ProductRepo::list(&pool, &filter).await.unwrap();
    let mut skus: Vec<_> = rows.iter().map(|r| r.sku.clone()).collect();
    skus.sort();
    assert_eq!(skus, vec!["S-1", "S-2", "S-4", "widget-3"]);
    assert_eq!(ProductRepo::count(&pool, &filter).await.unwrap(), 4);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_search_treats_wildcards_literally(pool: PgPool) {
    let owner = new_user(&pool, "wild@test.com", "W", "C").await;
    ProductRepo::create(&pool, &draft("50% off", "P-1", "1.00"), owner)
        .await
        .unwrap();
    ProductRepo::create(&pool, &draft("500 units", "P-2", "1.00"), owner)
        .await
        .unwrap();

    let filter = ProductFilter {
        search: search_terms("50%"),
        ..ProductFilter::default()
    };
    let rows = ProductRepo::list(&pool, &filter).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].sku, "P-1");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_exact_filters_and_ordering(pool: PgPool) {
    let alice = new_user(&pool, "alice@test.com", "Alice", "A").await;
    let bob = new_user(&pool, "bob@test.com", "Bob", "B").await;

    ProductRepo::create(&pool, &draft("Cheap", "A-1", "1.00"), alice)
        .await
        .unwrap();
    ProductRepo::create(&pool, &draft("Pricey", "A-2", "99.00"), alice)
        .await
        .unwrap();
    ProductRepo::create(&pool, &draft("Middle", "B-1", "10.00"), bob)
        .await
        .unwrap();

    let filter = ProductFilter {
        created_by: Some(alice),
        ordering: parse_ordering(Some("-price")),
        ..ProductFilter::default()
    };
    let rows = ProductRepo::list(&pool, &filter).await.unwrap();
    let skus: Vec<_> = rows.iter().map(|r| r.sku.as_str()).collect();
    assert_eq!(skus, vec!["A-2", "A-1"]);

    let filter = ProductFilter {
        sku: Some("B-1".to_string()),
        ..ProductFilter::default()
    };
    let rows = ProductRepo::list(&pool, &filter).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].created_by, Some(bob));

    let filter = ProductFilter {
        ordering: parse_ordering(Some("name")),
        ..ProductFilter::default()
    };
    let rows = ProductRepo::list(&pool, &filter).await.unwrap();
    let names: Vec<_> = rows.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Cheap", "Middle", "Pricey"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_paging_window_and_count(pool: PgPool) {
    let owner = new_user(&pool, "page@test.com", "P", "G").await;
    for i in 0..5 {
        ProductRepo::create(&pool, &draft(&format!("Item {i}"), &format!("PG-{i}"), "1.00"), owner)
            .await
            .unwrap();
    }

    let filter = ProductFilter {
        limit: 2,
        offset: 1,
        ..ProductFilter::default()
    };
    let rows = ProductRepo::list(&pool, &filter).await.unwrap();
    let skus: Vec<_> = rows.iter().map(|r| r.sku.as_str()).collect();
    assert_eq!(skus, vec!["PG-3", "PG-2"]);
    assert_eq!(ProductRepo::count(&pool, &filter).await.unwrap(), 5);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_deactivated_user_is_not_active(pool: PgPool) {
    let id = new_user(&pool, "inactive@test.com", "In", "Active").await;
    assert!(UserRepo::is_active(&pool, id).await.unwrap());

    assert!(UserRepo::deactivate(&pool, id).await.unwrap());
    assert!(!UserRepo::is_active(&pool, id).await.unwrap());
    assert!(!UserRepo::is_active(&pool, 999_999).await.unwrap());

    let user = UserRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert!(!user.is_active);
}
