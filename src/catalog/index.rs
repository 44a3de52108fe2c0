//! Compact, category-grouped catalog index.
//!
//! This is the always-resident part of progressive disclosure: one line per
//! tool plus a handful of trigger phrases, grouped by category.

use crate::catalog::registry::Catalog;
use crate::catalog::types::ToolDescriptor;
use std::fmt;

/// Number of trigger phrases listed per tool in the rendered index
const TRIGGERS_PER_ENTRY: usize = 3;

#[derive(Debug)]
pub struct CategoryGroup<'a> {
    pub category: &'a str,
    pub tools: Vec<&'a ToolDescriptor>,
}

#[derive(Debug)]
pub struct CompactIndex<'a> {
    /// Categories in order of first appearance in the catalog
    pub categories: Vec<CategoryGroup<'a>>,
    pub skill_count: usize,
    /// Cost of keeping every full definition resident
    pub total_definition_cost: u64,
}

impl<'a> CompactIndex<'a> {
    pub(crate) fn new(catalog: &'a Catalog) -> Self {
        let mut categories: Vec<CategoryGroup<'a>> = Vec::new();

        for descriptor in catalog.list_descriptors() {
            match categories
                .iter_mut()
                .find(|group| group.category == descriptor.category)
            {
                Some(group) => group.tools.push(descriptor),
                None => categories.push(CategoryGroup {
                    category: &descriptor.category,
                    tools: vec![descriptor],
                }),
            }
        }

        Self {
            categories,
            skill_count: catalog.len(),
            total_definition_cost: catalog.total_cost(),
        }
    }
}

impl fmt::Display for CompactIndex<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, group) in self.categories.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            writeln!(f, "[{}]", group.category)?;
            for tool in &group.tools {
                writeln!(f, "  - {}: {}", tool.id, tool.summary)?;
                if !tool.triggers.is_empty() {
                    let shown: Vec<&str> = tool
                        .triggers
                        .iter()
                        .take(TRIGGERS_PER_ENTRY)
                        .map(String::as_str)
                        .collect();
                    writeln!(f, "    triggers: {}", shown.join(", "))?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::types::CatalogEntry;

    fn catalog() -> Catalog {
        let tools = [
            ("file_read", "files", vec!["read", "open", "view", "cat"]),
            ("exec_cmd", "system", vec!["run"]),
            ("file_write", "files", vec![]),
        ];
        let entries = tools
            .into_iter()
            .map(|(id, category, triggers)| {
                CatalogEntry::new(
                    ToolDescriptor::new(id, category, format!("{} tool", id), 10)
                        .with_triggers(triggers),
                    None,
                )
            })
            .collect();
        Catalog::new(entries).unwrap()
    }

    #[test]
    fn test_groups_by_first_seen_category() {
        let catalog = catalog();
        let index = catalog.compact_index();

        assert_eq!(index.categories.len(), 2);
        assert_eq!(index.categories[0].category, "files");
        assert_eq!(index.categories[0].tools.len(), 2);
        assert_eq!(index.categories[1].category, "system");
        assert_eq!(index.skill_count, 3);
        assert_eq!(index.total_definition_cost, 30);
    }

    #[test]
    fn test_render_limits_triggers() {
        let catalog = catalog();
        let rendered = catalog.compact_index().to_string();

        assert!(rendered.starts_with("[files]\n"));
        assert!(rendered.contains("  - file_read: file_read tool\n"));
        assert!(rendered.contains("    triggers: read, open, view\n"));
        assert!(!rendered.contains("cat"));
        // no trigger line for a tool without triggers
        assert!(rendered.contains("  - file_write: file_write tool\n\n[system]"));
    }
}
