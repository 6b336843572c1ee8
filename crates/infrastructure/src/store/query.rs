use std::collections::BTreeMap;

use super::{CollectionRef, Document, FieldValue};

/// Filter key whose value names another document of the same collection.
pub const REFERENCE_FIELD: &str = "manager";

/// Equality constraint on one field.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub value: FieldValue,
}

impl Filter {
    pub fn matches(&self, document: &Document) -> bool {
        document.get(&self.field) == Some(&self.value)
    }
}

/// Collection scan narrowed by conjunctive equality filters.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub collection: String,
    pub filters: Vec<Filter>,
}

impl Query {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            filters: Vec::new(),
        }
    }

    pub fn where_eq(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.filters.push(Filter {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn matches(&self, document: &Document) -> bool {
        self.filters.iter().all(|filter| filter.matches(document))
    }
}

/// Translates flat query-string filters into a store query.
///
/// `manager` values are resolved to references into `collection`; every other
/// key becomes a plain string equality. Keys are not checked against any
/// schema, so an unknown field simply matches nothing.
pub fn build_query(collection: &CollectionRef, filters: &BTreeMap<String, String>) -> Query {
    filters
        .iter()
        .fold(collection.query(), |query, (field, value)| {
            if field == REFERENCE_FIELD {
                query.where_eq(field.as_str(), collection.doc(value.as_str()))
            } else {
                query.where_eq(field.as_str(), value.as_str())
            }
        })
}
