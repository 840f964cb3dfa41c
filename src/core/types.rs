// Copyright 2025 Mysurian
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Lowercase category slug; doubles as the store collection name.
pub type CategoryId = String;
pub type DocumentId = String;

/// Composite identity of a listing across the whole aggregate. Document ids
/// are only unique within their category's collection, so deduplication must
/// always key on this pair and never on the id alone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemKey {
    pub category: CategoryId,
    pub id: DocumentId,
}

impl ItemKey {
    pub fn new(category: impl Into<CategoryId>, id: impl Into<DocumentId>) -> Self {
        Self {
            category: category.into(),
            id: id.into(),
        }
    }
}

impl std::fmt::Display for ItemKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.category, self.id)
    }
}

/// Type tag for a category's custom field definitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Number,
    Flag,
    Url,
    List,
}

/// One typed field descriptor in a category's schema registry, consulted by
/// form rendering and by listing validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDef {
    pub key: String,
    pub label: String,
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    #[serde(default)]
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

/// A typed listing as seen by domain logic. The store encodes the boolean
/// flags as the literal strings "TRUE"/"FALSE"; that encoding lives entirely
/// in the `store::flags` adapter and never leaks past deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Listing {
    pub name: String,
    pub description: String,
    pub address: Option<String>,
    /// 0-5, one decimal of precision.
    pub rating: Option<f64>,
    pub contact: Option<String>,
    pub whatsapp: Option<String>,
    pub website: Option<String>,
    pub image: Option<String>,
    pub gallery: Vec<String>,
    #[serde(with = "crate::store::flags")]
    pub featured: bool,
    #[serde(with = "crate::store::flags", rename = "eyes")]
    pub highlight: bool,
    pub hero: Option<String>,
    #[serde(rename = "heroOrder")]
    pub hero_order: Option<i64>,
    pub keywords: Vec<String>,
    #[serde(rename = "searchcount")]
    pub search_count: Option<i64>,
}

impl Listing {
    /// Serialize into a store field map.
    pub fn to_fields(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }

    pub fn from_fields(fields: &Map<String, Value>) -> Self {
        serde_json::from_value(Value::Object(fields.clone())).unwrap_or_default()
    }
}

/// One merged item of the cross-category aggregate: the raw document fields
/// tagged with the source category. Kept as the raw field map because live
/// search matches the full breadth of text fields, not a fixed allowlist.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AggregateItem {
    pub key: ItemKey,
    pub fields: Map<String, Value>,
}

impl AggregateItem {
    pub fn new(category: impl Into<CategoryId>, id: impl Into<DocumentId>, fields: Map<String, Value>) -> Self {
        Self {
            key: ItemKey::new(category, id),
            fields,
        }
    }

    pub fn listing(&self) -> Listing {
        Listing::from_fields(&self.fields)
    }

    fn text_field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    /// Case-insensitive substring match against every text-valued field and
    /// every text element of list-valued fields.
    pub fn matches_any_field(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.fields.values().any(|v| value_contains(v, &needle))
    }

    /// The narrower match used by submitted searches: name, description,
    /// keywords and address only.
    pub fn matches_summary_fields(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        ["name", "description", "keywords", "address"]
            .iter()
            .filter_map(|k| self.fields.get(*k))
            .any(|v| value_contains(v, &needle))
    }

    /// Best-effort locality hint: the token after the first comma of the
    /// address. Heuristic only; addresses without a comma-delimited area
    /// token yield nothing, and no geocoding is attempted.
    pub fn area_hint(&self) -> Option<String> {
        let address = self.text_field("address")?;
        let token = address.split(',').nth(1)?.trim();
        if token.is_empty() {
            None
        } else {
            Some(token.to_lowercase())
        }
    }
}

fn value_contains(value: &Value, needle: &str) -> bool {
    match value {
        Value::String(s) => s.to_lowercase().contains(needle),
        Value::Array(items) => items
            .iter()
            .any(|item| matches!(item, Value::String(_)) && value_contains(item, needle)),
        _ => false,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    #[serde(rename = "authorName")]
    pub author_name: String,
    #[serde(rename = "authorId")]
    pub author_id: String,
    pub comment: String,
    #[serde(rename = "createdAt")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchLogEntry {
    pub category: String,
    pub term: String,
    pub at: chrono::DateTime<chrono::Utc>,
}
