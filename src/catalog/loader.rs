//! Catalog file loading.
//!
//! Parses a JSON catalog document of the form `{"skills": [ ... ]}` into a
//! [`Catalog`]. Each element is a [`CatalogEntry`]: descriptor fields at the
//! top level plus an optional `definition` object.

use crate::catalog::registry::Catalog;
use crate::catalog::types::CatalogEntry;
use crate::error::{AppError, Result};
use serde_json::Value;
use std::path::Path;

/// Build a catalog from a parsed JSON document.
///
/// # Errors
/// Returns `AppError::CatalogError` if the document has no `skills` array,
/// if every entry is malformed, or if ids collide. Individual malformed
/// entries are logged and skipped (partial success model).
pub fn catalog_from_json(json: &Value) -> Result<Catalog> {
    let skills = json
        .get("skills")
        .and_then(|s| s.as_array())
        .ok_or_else(|| AppError::CatalogError("Expected 'skills' array in catalog".into()))?;

    let mut entries = Vec::with_capacity(skills.len());

    for (idx, skill) in skills.iter().enumerate() {
        match serde_json::from_value::<CatalogEntry>(skill.clone()) {
            Ok(entry) => entries.push(entry),
            Err(e) => {
                tracing::warn!(
                    index = idx,
                    id = ?skill.get("id"),
                    error = %e,
                    "Skipping malformed skill entry"
                );
            }
        }
    }

    if entries.is_empty() && !skills.is_empty() {
        return Err(AppError::CatalogError(
            "All skill entries failed to parse".into(),
        ));
    }

    tracing::debug!(
        total = skills.len(),
        parsed = entries.len(),
        "Catalog parsed"
    );

    Catalog::new(entries)
}

/// Read and parse a catalog file.
pub fn load_catalog(path: &Path) -> Result<Catalog> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        AppError::CatalogError(format!(
            "Failed to read catalog {}: {}",
            path.display(),
            e
        ))
    })?;

    let json: Value = serde_json::from_str(&raw)
        .map_err(|e| AppError::CatalogError(format!("Invalid catalog JSON: {}", e)))?;

    let catalog = catalog_from_json(&json)?;

    tracing::info!(
        path = %path.display(),
        skills = catalog.len(),
        "Catalog loaded"
    );

    Ok(catalog)
}
