//! Listing fixtures for the in-memory store.

use serde_json::{json, Value};
use server_core::kernel::test_dependencies::MemoryStore;
use server_core::kernel::{collections, JsonObject};

/// A complete listing row with the given id, overlaid with `patch`.
///
/// Defaults describe a two-bedroom Los Angeles rental at $2000/month created
/// on 2025-01-01; override whatever a test cares about.
pub fn listing_row(id: &str, patch: Value) -> JsonObject {
    let mut row: JsonObject = json!({
        "id": id,
        "host_id": "host-1",
        "title": format!("Listing {}", id),
        "description": "A fine property",
        "property_type": "House",
        "property_listing_type": "rent",
        "bedrooms": 2,
        "bathrooms": 1,
        "square_feet": 900,
        "garage_number": 1,
        "price_per_month": 2000.0,
        "price_for_sale": Value::Null,
        "price_per_night": Value::Null,
        "city": "Los Angeles",
        "state": "CA",
        "country": "USA",
        "latitude": 34.05,
        "longitude": -118.24,
        "address": "1 Main St",
        "neighborhood": "Downtown",
        "has_yard": false,
        "has_parking_lot": false,
        "amenities": [],
        "images": ["https://img.example/one.jpg"],
        "is_available": true,
        "is_featured": false,
        "rating": 0.0,
        "review_count": 0,
        "created_at": "2025-01-01T00:00:00Z",
        "updated_at": "2025-01-01T00:00:00Z"
    })
    .as_object()
    .cloned()
    .unwrap();

    if let Value::Object(patch) = patch {
        for (key, value) in patch {
            row.insert(key, value);
        }
    }
    row
}

/// Seed `n` LA rentals with monthly prices climbing from `start` in `step`
/// increments; ids are `rental-00..`, creation dates stagger by day-of-month.
pub fn seed_la_rentals(store: &MemoryStore, n: usize, start: f64, step: f64) {
    let rows = (0..n)
        .map(|i| {
            listing_row(
                &format!("rental-{:02}", i),
                json!({
                    "bedrooms": 2 + (i as i64 % 3),
                    "price_per_month": start + step * i as f64,
                    "created_at": format!("2025-01-{:02}T00:00:00Z", (i % 28) + 1),
                    "updated_at": format!("2025-01-{:02}T00:00:00Z", (i % 28) + 1)
                }),
            )
        })
        .collect();
    store.seed(collections::LISTINGS, rows);
}

/// The `order` array of a pipeline response, as owned strings.
pub fn order_of(body: &Value) -> Vec<String> {
    body["order"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect()
}

/// A complete buyer row.
pub fn buyer_row(id: &str, email: &str, is_verified: bool) -> JsonObject {
    json!({
        "id": id,
        "email": email,
        "first_name": "Test",
        "last_name": "Buyer",
        "full_name": "Test Buyer",
        "phone": Value::Null,
        "preferences": {},
        "is_verified": is_verified,
        "created_at": "2025-01-01T00:00:00Z",
        "updated_at": "2025-01-01T00:00:00Z"
    })
    .as_object()
    .cloned()
    .unwrap()
}

/// A complete profile row.
pub fn profile_row(id: &str, email: &str, is_host: bool) -> JsonObject {
    json!({
        "id": id,
        "email": email,
        "first_name": "Test",
        "last_name": "User",
        "full_name": "Test User",
        "phone": Value::Null,
        "avatar_url": Value::Null,
        "bio": Value::Null,
        "is_host": is_host,
        "is_verified": false,
        "created_at": "2025-01-01T00:00:00Z",
        "updated_at": "2025-01-01T00:00:00Z"
    })
    .as_object()
    .cloned()
    .unwrap()
}
