// Copyright 2025 Mysurian
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.

//! Category catalog: directory resolution, the per-category field registry,
//! and the admin CRUD surface for categories and listings.
//!
//! Writes are rejected before any store call when no principal is signed in,
//! and listings are validated field-by-field against the category's schema
//! registry so no partial write ever happens.

use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

use crate::auth::IdentityProvider;
use crate::core::{
    AuthError, Category, CategoryId, DocumentId, FieldKind, Listing, MysurianError, Principal,
    Result, ValidationError,
};
use crate::store::{DocumentStore, CATEGORIES_COLLECTION};

pub struct CatalogService {
    store: Arc<dyn DocumentStore>,
    identity: Arc<dyn IdentityProvider>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn DocumentStore>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { store, identity }
    }

    /// The full set of category identifiers, sorted by slug. Read errors
    /// propagate; callers may cache the result themselves.
    pub async fn list_categories(&self) -> Result<Vec<CategoryId>> {
        debug!("📋 Listing categories");
        let mut ids: Vec<CategoryId> = self
            .store
            .list_documents(CATEGORIES_COLLECTION)
            .await?
            .into_iter()
            .map(|doc| doc.id)
            .collect();
        ids.sort();
        Ok(ids)
    }

    pub async fn get_category(&self, id: &str) -> Result<Option<Category>> {
        let Some(doc) = self.store.get_document(CATEGORIES_COLLECTION, id).await? else {
            return Ok(None);
        };
        let mut category: Category = serde_json::from_value(Value::Object(doc.fields))
            .map_err(|e| MysurianError::Internal(format!("bad category record '{}': {}", id, e)))?;
        category.id = doc.id;
        Ok(Some(category))
    }

    /// Create or replace a category definition. The slug is the document id.
    pub async fn save_category(&self, category: &Category) -> Result<()> {
        self.require_principal()?;
        if category.id.is_empty() {
            return Err(ValidationError::MissingField {
                field: "id".to_string(),
            }
            .into());
        }
        if category.id.to_lowercase() != category.id {
            return Err(ValidationError::InvalidField {
                field: "id".to_string(),
                message: "category slug must be lowercase".to_string(),
            }
            .into());
        }

        let fields = match serde_json::to_value(category) {
            Ok(Value::Object(mut map)) => {
                // Slug lives in the document id, not the field map.
                map.remove("id");
                map
            }
            _ => return Err(MysurianError::Internal("category did not serialize".into())),
        };
        self.store
            .upsert_document(CATEGORIES_COLLECTION, &category.id, fields)
            .await?;

        info!("✅ Saved category '{}'", category.id);
        Ok(())
    }

    pub async fn delete_category(&self, id: &str) -> Result<bool> {
        self.require_principal()?;
        let deleted = self.store.delete_document(CATEGORIES_COLLECTION, id).await?;
        if deleted {
            info!("🗑️ Deleted category '{}'", id);
        }
        Ok(deleted)
    }

    pub async fn get_listing(&self, category: &str, id: &str) -> Result<Option<Listing>> {
        let doc = self.store.get_document(category, id).await?;
        Ok(doc.map(|d| Listing::from_fields(&d.fields)))
    }

    pub async fn create_listing(&self, category: &str, listing: &Listing) -> Result<DocumentId> {
        self.require_principal()?;
        let fields = self.validated_fields(category, listing).await?;
        let id = self.store.create_document(category, fields).await?;
        info!("✅ Created listing {}/{} ('{}')", category, id, listing.name);
        Ok(id)
    }

    pub async fn update_listing(&self, category: &str, id: &str, listing: &Listing) -> Result<()> {
        self.require_principal()?;
        let fields = self.validated_fields(category, listing).await?;
        self.store.upsert_document(category, id, fields).await?;
        info!("✅ Updated listing {}/{}", category, id);
        Ok(())
    }

    pub async fn delete_listing(&self, category: &str, id: &str) -> Result<bool> {
        self.require_principal()?;
        let deleted = self.store.delete_document(category, id).await?;
        if deleted {
            info!("🗑️ Deleted listing {}/{}", category, id);
        }
        Ok(deleted)
    }

    pub(crate) fn require_principal(&self) -> Result<Principal> {
        self.identity
            .current_principal()
            .ok_or_else(|| AuthError::SignInRequired.into())
    }

    /// Validate a listing against the built-in requirements and the
    /// category's field registry, then serialize it for the store. Rating is
    /// rounded to one decimal on the way out.
    async fn validated_fields(
        &self,
        category: &str,
        listing: &Listing,
    ) -> Result<serde_json::Map<String, Value>> {
        if listing.name.trim().is_empty() {
            return Err(ValidationError::MissingField {
                field: "name".to_string(),
            }
            .into());
        }
        if listing.description.trim().is_empty() {
            return Err(ValidationError::MissingField {
                field: "description".to_string(),
            }
            .into());
        }
        if let Some(rating) = listing.rating {
            if !(0.0..=5.0).contains(&rating) {
                return Err(ValidationError::InvalidField {
                    field: "rating".to_string(),
                    message: "rating must be between 0 and 5".to_string(),
                }
                .into());
            }
        }

        let mut normalized = listing.clone();
        normalized.rating = listing.rating.map(|r| (r * 10.0).round() / 10.0);
        normalized.keywords = listing
            .keywords
            .iter()
            .map(|k| k.to_lowercase())
            .collect();
        let fields = normalized.to_fields();

        // Category-specific required fields from the registry.
        if let Some(definition) = self.get_category(category).await? {
            for field_def in definition.fields.iter().filter(|f| f.required) {
                let present = fields
                    .get(&field_def.key)
                    .map(|v| field_value_present(v, field_def.kind))
                    .unwrap_or(false);
                if !present {
                    return Err(ValidationError::MissingField {
                        field: field_def.key.clone(),
                    }
                    .into());
                }
            }
        }

        Ok(fields)
    }
}

fn field_value_present(value: &Value, kind: FieldKind) -> bool {
    match kind {
        FieldKind::Text | FieldKind::Url => value.as_str().map(|s| !s.trim().is_empty()).unwrap_or(false),
        FieldKind::Number => value.is_number(),
        FieldKind::Flag => value.is_string() || value.is_boolean(),
        FieldKind::List => value.as_array().map(|a| !a.is_empty()).unwrap_or(false),
    }
}
