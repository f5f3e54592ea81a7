//! Hosted record store client (PostgREST dialect).
//!
//! Translates a [`StoreQuery`] into the query-string grammar the hosted
//! service understands: `column=op.value` predicates, a comma-joined `order`
//! parameter, `offset`/`limit` windowing, `Prefer: count=exact` for exact
//! counts and `Prefer: return=representation` so mutations echo the affected
//! rows back.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde_json::Value;

use super::query::{JsonObject, OrderBy, Predicate, StoreQuery};
use super::traits::BaseRecordStore;

/// Per-call timeout on store I/O. A hung store call surfaces as a retryable
/// 500 rather than stalling the request forever.
const STORE_TIMEOUT_SECS: u64 = 15;

pub struct SupabaseStore {
    base_url: String,
    service_role_key: String,
    client: reqwest::Client,
}

impl SupabaseStore {
    pub fn new(base_url: &str, service_role_key: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(STORE_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            service_role_key: service_role_key.to_string(),
            client,
        })
    }

    fn endpoint(&self, collection: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, collection)
    }

    fn request(&self, method: reqwest::Method, collection: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, self.endpoint(collection))
            .header("apikey", &self.service_role_key)
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Bearer {}", self.service_role_key),
            )
    }
}

#[async_trait]
impl BaseRecordStore for SupabaseStore {
    async fn select(&self, collection: &str, query: &StoreQuery) -> Result<Vec<JsonObject>> {
        let response = self
            .request(reqwest::Method::GET, collection)
            .query(&select_params(query))
            .send()
            .await
            .context("Record store select request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("Record store select error {}: {}", status, body);
        }

        response
            .json()
            .await
            .context("Failed to parse record store response")
    }

    async fn count(&self, collection: &str, query: &StoreQuery) -> Result<u64> {
        let mut params = filter_params(query);
        params.push(("select".to_string(), "id".to_string()));
        params.push(("limit".to_string(), "1".to_string()));

        let response = self
            .request(reqwest::Method::GET, collection)
            .header("Prefer", "count=exact")
            .query(&params)
            .send()
            .await
            .context("Record store count request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("Record store count error {}: {}", status, body);
        }

        let content_range = response
            .headers()
            .get("content-range")
            .and_then(|value| value.to_str().ok())
            .context("Record store count response missing Content-Range")?;

        parse_content_range_total(content_range)
            .with_context(|| format!("Unparseable Content-Range: {}", content_range))
    }

    async fn insert(&self, collection: &str, row: JsonObject) -> Result<JsonObject> {
        let response = self
            .request(reqwest::Method::POST, collection)
            .header("Prefer", "return=representation")
            .json(&Value::Object(row))
            .send()
            .await
            .context("Record store insert request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("Record store insert error {}: {}", status, body);
        }

        let mut rows: Vec<JsonObject> = response
            .json()
            .await
            .context("Failed to parse record store insert response")?;
        if rows.is_empty() {
            bail!("Record store insert returned no rows");
        }
        Ok(rows.remove(0))
    }

    async fn update(
        &self,
        collection: &str,
        query: &StoreQuery,
        patch: JsonObject,
    ) -> Result<Vec<JsonObject>> {
        let response = self
            .request(reqwest::Method::PATCH, collection)
            .header("Prefer", "return=representation")
            .query(&filter_params(query))
            .json(&Value::Object(patch))
            .send()
            .await
            .context("Record store update request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("Record store update error {}: {}", status, body);
        }

        response
            .json()
            .await
            .context("Failed to parse record store update response")
    }

    async fn delete(&self, collection: &str, query: &StoreQuery) -> Result<Vec<JsonObject>> {
        let response = self
            .request(reqwest::Method::DELETE, collection)
            .header("Prefer", "return=representation")
            .query(&filter_params(query))
            .send()
            .await
            .context("Record store delete request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("Record store delete error {}: {}", status, body);
        }

        response
            .json()
            .await
            .context("Failed to parse record store delete response")
    }
}

// =============================================================================
// Query rendering (pure, unit-tested)
// =============================================================================

/// Predicate parameters only, as used by count and mutations.
fn filter_params(query: &StoreQuery) -> Vec<(String, String)> {
    let mut params = Vec::new();
    for predicate in &query.predicates {
        params.push(render_predicate(predicate));
    }
    params
}

/// Full parameter set for a select: predicates, ordering, window.
fn select_params(query: &StoreQuery) -> Vec<(String, String)> {
    let mut params = vec![("select".to_string(), "*".to_string())];
    params.extend(filter_params(query));
    if !query.order.is_empty() {
        let order = query
            .order
            .iter()
            .map(render_order)
            .collect::<Vec<_>>()
            .join(",");
        params.push(("order".to_string(), order));
    }
    if let Some(offset) = query.offset {
        params.push(("offset".to_string(), offset.to_string()));
    }
    if let Some(limit) = query.limit {
        params.push(("limit".to_string(), limit.to_string()));
    }
    params
}

fn render_predicate(predicate: &Predicate) -> (String, String) {
    match predicate {
        Predicate::Eq(column, value) => (column.clone(), format!("eq.{}", literal(value))),
        Predicate::Gte(column, value) => (column.clone(), format!("gte.{}", literal(value))),
        Predicate::Lte(column, value) => (column.clone(), format!("lte.{}", literal(value))),
        Predicate::OneOf(column, values) => {
            let list = values
                .iter()
                .map(quoted_literal)
                .collect::<Vec<_>>()
                .join(",");
            (column.clone(), format!("in.({})", list))
        }
        Predicate::AnyIlike(columns, needle) => {
            let needle = sanitize_needle(needle);
            let clauses = columns
                .iter()
                .map(|column| format!("{}.ilike.*{}*", column, needle))
                .collect::<Vec<_>>()
                .join(",");
            ("or".to_string(), format!("({})", clauses))
        }
    }
}

fn render_order(order: &OrderBy) -> String {
    // Nulls always sort last, in either direction.
    format!("{}.{}.nullslast", order.column, order.direction.as_str())
}

/// A bare literal for single-value operators.
fn literal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// A literal inside an `in.(...)` list; strings are quoted so embedded
/// commas don't split the list.
fn quoted_literal(value: &Value) -> String {
    match value {
        Value::String(s) => format!("\"{}\"", s.replace('"', "\\\"")),
        other => literal(other),
    }
}

/// The `or=(...)` grammar reserves commas and parentheses; a free-text
/// needle containing them would produce an unparseable filter, so they are
/// flattened to spaces.
fn sanitize_needle(needle: &str) -> String {
    needle.replace([',', '(', ')'], " ")
}

fn parse_content_range_total(content_range: &str) -> Option<u64> {
    content_range.rsplit('/').next()?.trim().parse().ok()
}
