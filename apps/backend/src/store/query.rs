use std::cmp::Ordering;

use serde_json::Value;

use super::apply::field;
use super::path::{CollectionPath, DocPath, FieldPath};
use super::{Document, Snapshot};

#[derive(Debug, Clone, PartialEq)]
pub enum QueryScope {
    /// Direct children of one collection
    Collection(CollectionPath),
    /// Every collection with this id, at any depth
    Group(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(FieldPath, Value),
    ArrayContains(FieldPath, Value),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub scope: QueryScope,
    pub filters: Vec<Filter>,
    /// Ascending; documents missing the field sort last
    pub order_by: Option<FieldPath>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn collection(collection: CollectionPath) -> Self {
        Self::new(QueryScope::Collection(collection))
    }

    pub fn group(collection_id: &str) -> Self {
        Self::new(QueryScope::Group(collection_id.to_string()))
    }

    fn new(scope: QueryScope) -> Self {
        Self {
            scope,
            filters: Vec::new(),
            order_by: None,
            limit: None,
        }
    }

    pub fn where_eq(mut self, path: FieldPath, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Eq(path, value.into()));
        self
    }

    pub fn where_array_contains(mut self, path: FieldPath, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::ArrayContains(path, value.into()));
        self
    }

    pub fn order_by(mut self, path: FieldPath) -> Self {
        self.order_by = Some(path);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn in_scope(&self, path: &DocPath) -> bool {
        match &self.scope {
            QueryScope::Collection(collection) => &path.parent() == collection,
            QueryScope::Group(id) => path.collection_id() == *id,
        }
    }

    pub fn matches(&self, data: &Document) -> bool {
        self.filters.iter().all(|filter| match filter {
            Filter::Eq(path, expected) => field(data, path) == Some(expected),
            Filter::ArrayContains(path, needle) => matches!(
                field(data, path),
                Some(Value::Array(items)) if items.contains(needle)
            ),
        })
    }

    /// Order and truncate an already filtered result set.
    ///
    /// Ties, and the whole set when unordered, fall back to path order so
    /// every store returns the same sequence.
    pub fn finish(&self, mut rows: Vec<Snapshot>) -> Vec<Snapshot> {
        rows.sort_by(|a, b| {
            let by_field = match &self.order_by {
                Some(path) => compare_values(field(&a.data, path), field(&b.data, path)),
                None => Ordering::Equal,
            };
            by_field.then_with(|| a.path.cmp(&b.path))
        });
        if let Some(limit) = self.limit {
            rows.truncate(limit);
        }
        rows
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}
