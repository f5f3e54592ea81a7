//! Integration tests for buyer and user profile endpoints.

mod common;

use crate::common::{buyer_row, profile_row, TestHarness};
use serde_json::json;
use server_core::kernel::collections;

// =============================================================================
// Buyers
// =============================================================================

#[tokio::test]
async fn buyer_list_filters_by_verification() {
    let harness = TestHarness::new();
    harness.store.seed(
        collections::BUYERS,
        vec![
            buyer_row("b-1", "one@example.com", true),
            buyer_row("b-2", "two@example.com", false),
            buyer_row("b-3", "three@example.com", true),
        ],
    );

    let (status, body) = harness.get("/buyers/?is_verified=true").await;
    assert_eq!(status, 200);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (_, body) = harness.get("/buyers/verified/list").await;
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn buyer_update_recomputes_full_name() {
    let harness = TestHarness::new();
    harness
        .store
        .seed(collections::BUYERS, vec![buyer_row("b-1", "jo@example.com", false)]);

    let (status, body) = harness
        .put_json("/buyers/b-1", &json!({ "first_name": "Josephine" }))
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["full_name"], json!("Josephine Buyer"));
    assert_eq!(body["last_name"], json!("Buyer"));
}

#[tokio::test]
async fn buyer_preferences_round_trip() {
    let harness = TestHarness::new();
    harness
        .store
        .seed(collections::BUYERS, vec![buyer_row("b-1", "jo@example.com", false)]);

    let (status, _) = harness
        .put_json(
            "/buyers/b-1/preferences",
            &json!({ "preferred_cities": ["Los Angeles"], "max_price": 750000.0 }),
        )
        .await;
    assert_eq!(status, 200);

    let (status, body) = harness.get("/buyers/b-1/preferences").await;
    assert_eq!(status, 200);
    assert_eq!(body["preferred_cities"], json!(["Los Angeles"]));
    assert_eq!(body["max_price"], json!(750000.0));
}

#[tokio::test]
async fn buyer_verify_and_unverify_toggle_the_flag() {
    let harness = TestHarness::new();
    harness
        .store
        .seed(collections::BUYERS, vec![buyer_row("b-1", "jo@example.com", false)]);

    let (status, _) = harness.put_empty("/buyers/b-1/verify").await;
    assert_eq!(status, 200);
    let (_, buyer) = harness.get("/buyers/b-1").await;
    assert_eq!(buyer["is_verified"], json!(true));

    let (status, _) = harness.put_empty("/buyers/b-1/unverify").await;
    assert_eq!(status, 200);
    let (_, buyer) = harness.get("/buyers/b-1").await;
    assert_eq!(buyer["is_verified"], json!(false));
}

#[tokio::test]
async fn missing_buyers_are_404s() {
    let harness = TestHarness::new();

    let (status, body) = harness.get("/buyers/ghost").await;
    assert_eq!(status, 404);
    assert_eq!(body["detail"], json!("Buyer not found"));

    let (status, _) = harness.get("/buyers/email/ghost@example.com").await;
    assert_eq!(status, 404);

    let (status, _) = harness.delete("/buyers/ghost").await;
    assert_eq!(status, 404);
}

// =============================================================================
// Users
// =============================================================================

#[tokio::test]
async fn user_create_then_lookup_by_email() {
    let harness = TestHarness::new();

    let (status, created) = harness
        .post_json(
            "/users/",
            &json!({
                "email": "host@example.com",
                "first_name": "Margaret",
                "last_name": "Brooke",
                "full_name": "Margaret Brooke",
                "is_host": true
            }),
        )
        .await;
    assert_eq!(status, 200);
    assert!(created["id"].is_string());

    let (status, fetched) = harness.get("/users/email/host@example.com").await;
    assert_eq!(status, 200);
    assert_eq!(fetched["id"], created["id"]);
    assert_eq!(fetched["is_host"], json!(true));
}

#[tokio::test]
async fn user_list_filters_compose() {
    let harness = TestHarness::new();
    harness.store.seed(
        collections::PROFILES,
        vec![
            profile_row("u-1", "host@example.com", true),
            profile_row("u-2", "guest@example.com", false),
        ],
    );

    let (_, hosts) = harness.get("/users/?is_host=true").await;
    assert_eq!(hosts.as_array().unwrap().len(), 1);

    let (_, hosts_list) = harness.get("/users/hosts/list").await;
    assert_eq!(hosts_list.as_array().unwrap().len(), 1);
    assert_eq!(hosts_list[0]["email"], json!("host@example.com"));
}

#[tokio::test]
async fn user_list_paginates_with_skip_and_limit() {
    let harness = TestHarness::new();
    let rows = (0..5)
        .map(|i| profile_row(&format!("u-{}", i), &format!("user{}@example.com", i), false))
        .collect();
    harness.store.seed(collections::PROFILES, rows);

    let (_, page) = harness.get("/users/?skip=2&limit=2").await;
    assert_eq!(page.as_array().unwrap().len(), 2);

    let (_, tail) = harness.get("/users/?skip=4&limit=2").await;
    assert_eq!(tail.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn user_delete_then_404() {
    let harness = TestHarness::new();
    harness
        .store
        .seed(collections::PROFILES, vec![profile_row("u-1", "x@example.com", false)]);

    let (status, body) = harness.delete("/users/u-1").await;
    assert_eq!(status, 200);
    assert_eq!(body["message"], json!("User deleted successfully"));

    let (status, _) = harness.get("/users/u-1").await;
    assert_eq!(status, 404);
}
