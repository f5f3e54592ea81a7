//! Structured description of a record-store query.
//!
//! Routes never concatenate query strings; they build a `StoreQuery` and hand
//! it to a [`BaseRecordStore`](super::traits::BaseRecordStore) implementation,
//! which translates it into its native dialect.

use serde_json::Value;

/// A raw row as the store returns it: column name -> JSON value.
pub type JsonObject = serde_json::Map<String, Value>;

/// A single predicate over one collection. All predicates on a query are
/// conjunctive; the only disjunction is the multi-column substring match.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Column equals value.
    Eq(String, Value),
    /// Column is a member of the value set.
    OneOf(String, Vec<Value>),
    /// Column >= value.
    Gte(String, Value),
    /// Column <= value.
    Lte(String, Value),
    /// Case-insensitive substring match against any of the named columns.
    AnyIlike(Vec<String>, String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }
}

/// One ordering key. Null values always sort last, in either direction.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub column: String,
    pub direction: Direction,
}

/// A composable select/count/mutation filter: conjunctive predicates plus
/// ordering and an offset/limit window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreQuery {
    pub predicates: Vec<Predicate>,
    pub order: Vec<OrderBy>,
    pub offset: Option<u64>,
    pub limit: Option<u64>,
}

impl StoreQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.predicates
            .push(Predicate::Eq(column.to_string(), value.into()));
        self
    }

    pub fn one_of(mut self, column: &str, values: Vec<Value>) -> Self {
        self.predicates
            .push(Predicate::OneOf(column.to_string(), values));
        self
    }

    pub fn gte(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.predicates
            .push(Predicate::Gte(column.to_string(), value.into()));
        self
    }

    pub fn lte(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.predicates
            .push(Predicate::Lte(column.to_string(), value.into()));
        self
    }

    /// Substring-match `needle` against any of `columns`, case-insensitively.
    pub fn any_ilike(mut self, columns: &[&str], needle: &str) -> Self {
        self.predicates.push(Predicate::AnyIlike(
            columns.iter().map(|c| c.to_string()).collect(),
            needle.to_string(),
        ));
        self
    }

    pub fn predicate(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn order(mut self, column: &str, direction: Direction) -> Self {
        self.order.push(OrderBy {
            column: column.to_string(),
            direction,
        });
        self
    }

    pub fn window(mut self, offset: u64, limit: u64) -> Self {
        self.offset = Some(offset);
        self.limit = Some(limit);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builder_accumulates_predicates_in_order() {
        let query = StoreQuery::new()
            .eq("city", "Los Angeles")
            .gte("bedrooms", 2)
            .one_of("property_listing_type", vec![json!("rent"), json!("both")]);

        assert_eq!(
            query.predicates,
            vec![
                Predicate::Eq("city".into(), json!("Los Angeles")),
                Predicate::Gte("bedrooms".into(), json!(2)),
                Predicate::OneOf(
                    "property_listing_type".into(),
                    vec![json!("rent"), json!("both")]
                ),
            ]
        );
    }

    #[test]
    fn window_sets_offset_and_limit() {
        let query = StoreQuery::new().window(40, 20);
        assert_eq!(query.offset, Some(40));
        assert_eq!(query.limit, Some(20));
    }
}
