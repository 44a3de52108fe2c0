//! The in-memory skill catalog.

use crate::catalog::index::CompactIndex;
use crate::catalog::types::{CatalogEntry, FullDefinition, ToolDescriptor};
use crate::error::{AppError, Result};
use std::collections::HashMap;

/// Immutable registry of tool descriptors and their full definitions.
///
/// Built once at startup and shared by reference. Descriptors keep their
/// declaration order, which the matcher relies on for tie-breaking.
#[derive(Debug, Clone)]
pub struct Catalog {
    descriptors: Vec<ToolDescriptor>,
    positions: HashMap<String, usize>,
    definitions: HashMap<String, FullDefinition>,
}

impl Catalog {
    /// Build a catalog from entries in declaration order.
    ///
    /// # Errors
    /// Returns `AppError::CatalogError` if an id is empty or declared twice.
    pub fn new(entries: Vec<CatalogEntry>) -> Result<Self> {
        let mut descriptors = Vec::with_capacity(entries.len());
        let mut positions = HashMap::with_capacity(entries.len());
        let mut definitions = HashMap::new();

        for entry in entries {
            let id = entry.descriptor.id.clone();
            if id.trim().is_empty() {
                return Err(AppError::CatalogError(
                    "Tool id cannot be empty".to_string(),
                ));
            }
            if positions.contains_key(&id) {
                return Err(AppError::CatalogError(format!(
                    "Duplicate tool id '{}'",
                    id
                )));
            }

            positions.insert(id.clone(), descriptors.len());
            if let Some(definition) = entry.definition {
                definitions.insert(id, definition);
            }
            descriptors.push(entry.descriptor);
        }

        Ok(Self {
            descriptors,
            positions,
            definitions,
        })
    }

    /// All descriptors in declaration order.
    pub fn list_descriptors(&self) -> &[ToolDescriptor] {
        &self.descriptors
    }

    pub fn descriptor(&self, id: &str) -> Option<&ToolDescriptor> {
        self.positions.get(id).map(|&idx| &self.descriptors[idx])
    }

    /// Fetch the full definition for `id`.
    ///
    /// # Errors
    /// Returns `AppError::NotFound` if the id is absent, or declared without a
    /// full definition.
    pub fn get_full_definition(&self, id: &str) -> Result<&FullDefinition> {
        self.definitions
            .get(id)
            .ok_or_else(|| AppError::NotFound(id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Sum of every descriptor's declared cost, i.e. the cost of keeping all
    /// full definitions resident.
    pub fn total_cost(&self) -> u64 {
        self.descriptors
            .iter()
            .map(|d| u64::from(d.cost_tokens))
            .sum()
    }

    /// Compact, category-grouped view suitable for a system prompt.
    pub fn compact_index(&self) -> CompactIndex<'_> {
        CompactIndex::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, cost: u32, with_definition: bool) -> CatalogEntry {
        let descriptor = ToolDescriptor::new(id, "test", format!("{} summary", id), cost);
        let definition = with_definition.then(|| FullDefinition::new(id, "desc"));
        CatalogEntry::new(descriptor, definition)
    }

    #[test]
    fn test_list_descriptors_keeps_declaration_order() {
        let catalog = Catalog::new(vec![
            entry("zeta", 1, false),
            entry("alpha", 2, false),
            entry("mid", 3, false),
        ])
        .unwrap();

        let ids: Vec<&str> = catalog
            .list_descriptors()
            .iter()
            .map(|d| d.id.as_str())
            .collect();
        assert_eq!(ids, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let result = Catalog::new(vec![entry("dup", 1, false), entry("dup", 2, false)]);
        assert!(matches!(result, Err(AppError::CatalogError(msg)) if msg.contains("dup")));
    }

    #[test]
    fn test_empty_id_rejected() {
        let result = Catalog::new(vec![entry("  ", 1, false)]);
        assert!(matches!(result, Err(AppError::CatalogError(_))));
    }

    #[test]
    fn test_get_full_definition_unknown_id() {
        let catalog = Catalog::new(vec![entry("known", 1, true)]).unwrap();
        let err = catalog.get_full_definition("nonexistent_id").unwrap_err();
        assert!(matches!(err, AppError::NotFound(id) if id == "nonexistent_id"));
    }

    #[test]
    fn test_get_full_definition_missing_payload() {
        let catalog = Catalog::new(vec![entry("bare", 1, false)]).unwrap();
        assert!(catalog.descriptor("bare").is_some());
        assert!(matches!(
            catalog.get_full_definition("bare"),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_total_cost() {
        let catalog =
            Catalog::new(vec![entry("a", 150, false), entry("b", 120, false)]).unwrap();
        assert_eq!(catalog.total_cost(), 270);
        assert_eq!(catalog.len(), 2);
        assert!(!catalog.is_empty());
    }
}
