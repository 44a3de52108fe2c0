//! Skillmatch - progressive-disclosure skill index
//!
//! Keeps a compact catalog of tool descriptors resident and selects, per
//! query, which full tool definitions are worth loading into a prompt
//! context. The library exposes the catalog, the embedding-provider seam and
//! the matcher; the binary wraps them in an HTTP service.

pub mod catalog;
pub mod config;
pub mod embedding;
pub mod error;
pub mod handlers;
pub mod matcher;
pub mod persistence;
pub mod state;

// Re-export key types for convenience
pub use catalog::{Catalog, CatalogEntry, FullDefinition, ToolDescriptor};
pub use config::Config;
pub use embedding::{cosine_similarity, EmbeddingProvider, EmbeddingVector, HashEmbedder, StaticEmbedder};
pub use error::{AppError, Result};
pub use handlers::{definition_handler, health_handler, index_handler, match_handler, ready_handler};
pub use matcher::{estimate_context_cost, MatchMode, MatchResult, Matcher, SavingsReport};
pub use state::AppState;
