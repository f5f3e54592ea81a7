//! The listing query pipeline: filter, sort, window.
//!
//! One implementation backs every search-shaped endpoint. Predicates push
//! down to the store whenever they can; the documented exceptions (price
//! sort, amenity intersection, effective-price bounds) fetch the full
//! filtered snapshot and finish in process. Both paths compute the match
//! count before windowing, so pages tile identically either way.

use anyhow::Result;

use super::models::Listing;
use super::query::ListingSearch;
use super::sort::{parse_direction, sort_by_effective_price, sort_by_key, SortKey};
use crate::common::{has_more, slice_window, PageRequest};
use crate::kernel::{collections, BaseRecordStore, Direction, StoreQuery};

/// An ordered, windowed slice of the filtered listing set plus its metadata.
#[derive(Debug)]
pub struct PipelineOutcome {
    pub listings: Vec<Listing>,
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub has_more: bool,
}

/// Run a search against the store.
///
/// Well-formed-but-unsatisfiable input never errors; it yields an empty,
/// valid outcome. The fetched snapshot is immutable for the duration of the
/// request - there is no cross-request state here.
pub async fn run(
    store: &dyn BaseRecordStore,
    search: &ListingSearch,
    page: PageRequest,
) -> Result<PipelineOutcome> {
    let sort_key = SortKey::parse(search.sort_by.as_deref());
    let direction = parse_direction(search.sort_order.as_deref());

    let base = StoreQuery {
        predicates: search.store_predicates(),
        ..StoreQuery::default()
    };

    if sort_key == SortKey::Price || search.needs_in_process_pass() {
        run_in_process(store, search, base, sort_key, direction, page).await
    } else {
        run_store_backed(store, base, sort_key, direction, page).await
    }
}

/// Store-backed path: exact count first, then one windowed, ordered select.
async fn run_store_backed(
    store: &dyn BaseRecordStore,
    base: StoreQuery,
    sort_key: SortKey,
    direction: Direction,
    page: PageRequest,
) -> Result<PipelineOutcome> {
    let total = store.count(collections::LISTINGS, &base).await?;

    let column = sort_key.column().unwrap_or("created_at");
    // Secondary key pins a total order; without it equal-valued rows could
    // shuffle between requests and pages would overlap.
    let mut query = base.order(column, direction).order("id", Direction::Asc);
    if let Some((offset, limit)) = page.window() {
        query = query.window(offset, limit);
    }

    let rows = store.select(collections::LISTINGS, &query).await?;
    let listings = rows
        .into_iter()
        .map(Listing::from_row)
        .collect::<Result<Vec<_>>>()?;

    Ok(finish(listings, page, total))
}

/// In-process path: fetch the full filtered snapshot in insertion order,
/// apply the cross-column filters, sort, then window.
async fn run_in_process(
    store: &dyn BaseRecordStore,
    search: &ListingSearch,
    base: StoreQuery,
    sort_key: SortKey,
    direction: Direction,
    page: PageRequest,
) -> Result<PipelineOutcome> {
    // Insertion order (created_at, then id) is the tie-break the stable
    // sorts preserve.
    let query = base
        .order("created_at", Direction::Asc)
        .order("id", Direction::Asc);
    let rows = store.select(collections::LISTINGS, &query).await?;
    let mut listings = rows
        .into_iter()
        .map(Listing::from_row)
        .collect::<Result<Vec<_>>>()?;

    search.retain_in_process(&mut listings);

    match sort_key {
        SortKey::Price => sort_by_effective_price(&mut listings, direction),
        other => sort_by_key(&mut listings, other, direction),
    }

    let total = listings.len() as u64;
    let listings = match page.window() {
        Some((offset, limit)) => slice_window(listings, offset, limit),
        None => listings,
    };

    Ok(finish(listings, page, total))
}

fn finish(listings: Vec<Listing>, page: PageRequest, total: u64) -> PipelineOutcome {
    match page {
        PageRequest::Paged { page, limit } => PipelineOutcome {
            has_more: has_more(page, limit, total),
            listings,
            page,
            limit,
            total,
        },
        PageRequest::All => PipelineOutcome {
            page: 1,
            limit: listings.len() as u32,
            total,
            has_more: false,
            listings,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::test_dependencies::MemoryStore;
    use serde_json::json;

    fn seed_rent_listings(store: &MemoryStore, prices: &[f64]) {
        let rows = prices
            .iter()
            .enumerate()
            .map(|(i, price)| {
                serde_json::from_value(json!({
                    "id": format!("listing-{:02}", i),
                    "host_id": "host-1",
                    "title": format!("Rental {}", i),
                    "property_listing_type": "rent",
                    "bedrooms": 2 + (i as i64 % 3),
                    "bathrooms": 1,
                    "city": "Los Angeles",
                    "state": "CA",
                    "price_per_month": price,
                    "created_at": format!("2025-01-{:02}T00:00:00Z", (i % 28) + 1),
                    "updated_at": format!("2025-01-{:02}T00:00:00Z", (i % 28) + 1)
                }))
                .unwrap()
            })
            .collect();
        store.seed(collections::LISTINGS, rows);
    }

    #[tokio::test]
    async fn store_backed_path_counts_before_windowing() {
        let store = MemoryStore::new();
        seed_rent_listings(&store, &[1000.0; 47]);

        let search = ListingSearch::default();
        let page = PageRequest::Paged { page: 1, limit: 20 };
        let outcome = run(&store, &search, page).await.unwrap();
        assert_eq!(outcome.total, 47);
        assert_eq!(outcome.listings.len(), 20);
        assert!(outcome.has_more);

        let page = PageRequest::Paged { page: 3, limit: 20 };
        let outcome = run(&store, &search, page).await.unwrap();
        assert_eq!(outcome.listings.len(), 7);
        assert!(!outcome.has_more);
    }

    #[tokio::test]
    async fn price_sort_windows_over_the_sorted_snapshot() {
        let store = MemoryStore::new();
        // Descending seed order so a forgotten sort would be obvious.
        let prices: Vec<f64> = (0..15).map(|i| 4000.0 - (i as f64) * 200.0).collect();
        seed_rent_listings(&store, &prices);

        let search = ListingSearch {
            sort_by: Some("price".to_string()),
            sort_order: Some("asc".to_string()),
            ..Default::default()
        };
        let outcome = run(&store, &search, PageRequest::Paged { page: 1, limit: 10 })
            .await
            .unwrap();

        assert_eq!(outcome.total, 15);
        assert!(outcome.has_more);
        let prices: Vec<f64> = outcome
            .listings
            .iter()
            .map(|l| l.price_per_month.unwrap())
            .collect();
        let mut sorted = prices.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(prices, sorted);
        assert_eq!(prices.len(), 10);
    }

    #[tokio::test]
    async fn all_mode_returns_everything() {
        let store = MemoryStore::new();
        seed_rent_listings(&store, &[1500.0; 12]);

        let outcome = run(&store, &ListingSearch::default(), PageRequest::All)
            .await
            .unwrap();
        assert_eq!(outcome.listings.len(), 12);
        assert_eq!(outcome.page, 1);
        assert_eq!(outcome.limit, 12);
        assert_eq!(outcome.total, 12);
        assert!(!outcome.has_more);
    }

    #[tokio::test]
    async fn unsatisfiable_filters_yield_an_empty_outcome() {
        let store = MemoryStore::new();
        seed_rent_listings(&store, &[1500.0; 3]);

        let search = ListingSearch {
            location: Some("Nowhere, ZZ".to_string()),
            ..Default::default()
        };
        let outcome = run(&store, &search, PageRequest::Paged { page: 1, limit: 10 })
            .await
            .unwrap();
        assert!(outcome.listings.is_empty());
        assert_eq!(outcome.total, 0);
        assert!(!outcome.has_more);
    }

    #[tokio::test]
    async fn amenity_filter_moves_total_in_process() {
        let store = MemoryStore::new();
        let rows = vec![
            serde_json::from_value(json!({
                "id": "a", "host_id": "h", "property_listing_type": "rent",
                "price_per_month": 1000.0, "amenities": ["Pool", "Gym"],
                "created_at": "2025-01-01T00:00:00Z", "updated_at": "2025-01-01T00:00:00Z"
            }))
            .unwrap(),
            serde_json::from_value(json!({
                "id": "b", "host_id": "h", "property_listing_type": "rent",
                "price_per_month": 1200.0, "amenities": ["Garden"],
                "created_at": "2025-01-02T00:00:00Z", "updated_at": "2025-01-02T00:00:00Z"
            }))
            .unwrap(),
        ];
        store.seed(collections::LISTINGS, rows);

        let search = ListingSearch {
            amenities: Some("Pool".to_string()),
            ..Default::default()
        };
        let outcome = run(&store, &search, PageRequest::Paged { page: 1, limit: 10 })
            .await
            .unwrap();
        assert_eq!(outcome.total, 1);
        assert_eq!(outcome.listings[0].id.as_str(), "a");
    }
}
