//! Integration tests for listing CRUD: round trips, partial updates,
//! deletes, and the list helper endpoints.

mod common;

use crate::common::{listing_row, TestHarness};
use serde_json::{json, Value};
use server_core::kernel::collections;

fn new_listing_body() -> Value {
    json!({
        "host_id": "host-9",
        "title": "Craftsman with a view",
        "description": "Original woodwork throughout",
        "property_type": "House",
        "property_listing_type": "both",
        "bedrooms": 3,
        "bathrooms": 2,
        "square_feet": 1650,
        "garage_number": 2,
        "price_per_month": 4200.0,
        "price_for_sale": 985_000.0,
        "city": "Los Angeles",
        "state": "CA",
        "country": "USA",
        "latitude": 34.09,
        "longitude": -118.28,
        "address": "742 Hillhurst Ave",
        "neighborhood": "Los Feliz",
        "has_yard": true,
        "has_parking_lot": false,
        "amenities": ["Garden", "Fireplace"],
        "images": ["a.jpg", "b.jpg"]
    })
}

#[tokio::test]
async fn create_then_fetch_round_trips() {
    let harness = TestHarness::new();

    let (status, created) = harness.post_json("/listings/", &new_listing_body()).await;
    assert_eq!(status, 200);

    let id = created["id"].as_str().unwrap();
    let (status, fetched) = harness.get(&format!("/listings/{}", id)).await;
    assert_eq!(status, 200);

    // Client fields match the input; identity and timestamps are
    // server-assigned.
    assert_eq!(fetched["title"], json!("Craftsman with a view"));
    assert_eq!(fetched["property_listing_type"], json!("both"));
    assert_eq!(fetched["price_for_sale"], json!(985_000.0));
    assert_eq!(fetched["images"], json!(["a.jpg", "b.jpg"]));
    assert_eq!(fetched["rating"], json!(0.0));
    assert_eq!(fetched["review_count"], json!(0));
    assert!(fetched["created_at"].is_string());
    assert_eq!(fetched["created_at"], fetched["updated_at"]);
}

#[tokio::test]
async fn create_rejects_prices_inconsistent_with_the_listing_type() {
    let harness = TestHarness::new();

    let mut body = new_listing_body();
    body["property_listing_type"] = json!("rent");
    // A rent listing must not carry a sale price.
    let (status, response) = harness.post_json("/listings/", &body).await;
    assert_eq!(status, 400);
    assert!(response["detail"].as_str().unwrap().contains("rent"));
}

#[tokio::test]
async fn partial_update_touches_only_supplied_fields() {
    let harness = TestHarness::new();
    let (_, created) = harness.post_json("/listings/", &new_listing_body()).await;
    let id = created["id"].as_str().unwrap().to_string();

    // Give the clock room so updated_at strictly increases.
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;

    let (status, updated) = harness
        .put_json(&format!("/listings/{}", id), &json!({ "bedrooms": 4 }))
        .await;
    assert_eq!(status, 200);

    assert_eq!(updated["bedrooms"], json!(4));
    assert_eq!(updated["description"], created["description"]);
    assert_eq!(updated["images"], created["images"]);
    assert_eq!(updated["price_for_sale"], created["price_for_sale"]);

    let before: chrono::DateTime<chrono::Utc> =
        created["updated_at"].as_str().unwrap().parse().unwrap();
    let after: chrono::DateTime<chrono::Utc> =
        updated["updated_at"].as_str().unwrap().parse().unwrap();
    assert!(after > before, "updated_at must strictly increase");
    assert_eq!(updated["created_at"], created["created_at"]);
}

#[tokio::test]
async fn update_and_delete_missing_listings_return_404() {
    let harness = TestHarness::new();

    let (status, body) = harness.get("/listings/ghost").await;
    assert_eq!(status, 404);
    assert_eq!(body["detail"], json!("Listing not found"));

    let (status, _) = harness
        .put_json("/listings/ghost", &json!({ "bedrooms": 2 }))
        .await;
    assert_eq!(status, 404);

    let (status, _) = harness.delete("/listings/ghost").await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn delete_removes_the_listing() {
    let harness = TestHarness::new();
    let (_, created) = harness.post_json("/listings/", &new_listing_body()).await;
    let id = created["id"].as_str().unwrap().to_string();

    let (status, body) = harness.delete(&format!("/listings/{}", id)).await;
    assert_eq!(status, 200);
    assert_eq!(body["message"], json!("Listing deleted successfully"));

    let (status, _) = harness.get(&format!("/listings/{}", id)).await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn host_listings_only_include_that_host() {
    let harness = TestHarness::new();
    harness.store.seed(
        collections::LISTINGS,
        vec![
            listing_row("mine-1", json!({ "host_id": "host-a" })),
            listing_row("mine-2", json!({ "host_id": "host-a" })),
            listing_row("theirs", json!({ "host_id": "host-b" })),
        ],
    );

    let (status, body) = harness.get("/listings/host/host-a").await;
    assert_eq!(status, 200);
    let listings = body.as_array().unwrap();
    assert_eq!(listings.len(), 2);
    for listing in listings {
        assert_eq!(listing["host_id"], json!("host-a"));
    }
}

#[tokio::test]
async fn city_and_type_lists_are_distinct_and_sorted() {
    let harness = TestHarness::new();
    harness.store.seed(
        collections::LISTINGS,
        vec![
            listing_row("one", json!({ "city": "San Diego", "property_type": "Condo" })),
            listing_row("two", json!({ "city": "Los Angeles", "property_type": "House" })),
            listing_row("three", json!({ "city": "Los Angeles", "property_type": "Condo" })),
        ],
    );

    let (_, cities) = harness.get("/listings/cities/list").await;
    assert_eq!(cities, json!(["Los Angeles, CA", "San Diego, CA"]));

    let (_, types) = harness.get("/listings/types/list").await;
    assert_eq!(types, json!(["Condo", "House"]));
}
