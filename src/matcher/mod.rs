//! Skill matching: semantic ranking, trigger matching and context cost.

pub mod cost;
pub mod lexical;
pub mod semantic;

use crate::catalog::ToolDescriptor;
use serde::{Deserialize, Serialize};

pub use cost::{estimate_context_cost, SavingsReport};
pub use lexical::match_triggers;
pub use semantic::Matcher;

/// Matching strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    #[default]
    Semantic,
    Lexical,
}

/// A descriptor paired with its relevance score for one query.
///
/// Scores are cosine similarities in `[-1, 1]` (semantic mode) or `1.0`
/// (lexical mode). Not retained by the matcher.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchResult<'a> {
    pub descriptor: &'a ToolDescriptor,
    pub score: f32,
}

impl<'a> MatchResult<'a> {
    pub fn new(descriptor: &'a ToolDescriptor, score: f32) -> Self {
        Self { descriptor, score }
    }
}
