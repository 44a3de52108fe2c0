//! Skill catalog: tool descriptors that stay resident in context, and the
//! full definitions loaded only when a tool is selected.

pub mod builtin;
pub mod index;
pub mod loader;
pub mod registry;
pub mod types;

pub use index::{CategoryGroup, CompactIndex};
pub use loader::{catalog_from_json, load_catalog};
pub use registry::Catalog;
pub use types::{CatalogEntry, FullDefinition, ParameterSpec, ToolDescriptor, UsageExample};
