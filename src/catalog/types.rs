//! Type definitions for the skill catalog.

use serde::{Deserialize, Serialize};

/// Lightweight metadata for a tool, always resident in context.
///
/// `triggers` drive the coarse lexical mode; `exemplars` position the tool in
/// similarity space for the semantic mode. When a descriptor declares no
/// exemplars its triggers are embedded instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Unique tool identifier (e.g. "file_read")
    pub id: String,

    /// Grouping label used by the compact index
    pub category: String,

    /// One-line summary shown in the compact index
    pub summary: String,

    #[serde(default)]
    pub triggers: Vec<String>,

    #[serde(default)]
    pub exemplars: Vec<String>,

    /// Estimated token cost of materializing the full definition
    pub cost_tokens: u32,
}

impl ToolDescriptor {
    pub fn new(
        id: impl Into<String>,
        category: impl Into<String>,
        summary: impl Into<String>,
        cost_tokens: u32,
    ) -> Self {
        Self {
            id: id.into(),
            category: category.into(),
            summary: summary.into(),
            triggers: Vec::new(),
            exemplars: Vec::new(),
            cost_tokens,
        }
    }

    pub fn with_triggers<I, S>(mut self, triggers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.triggers = triggers.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_exemplars<I, S>(mut self, exemplars: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exemplars = exemplars.into_iter().map(Into::into).collect();
        self
    }

    /// Phrases embedded for semantic matching.
    pub fn semantic_phrases(&self) -> &[String] {
        if self.exemplars.is_empty() {
            &self.triggers
        } else {
            &self.exemplars
        }
    }
}

/// A single parameter in a tool's schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: String,
    #[serde(default)]
    pub description: String,
}

/// A query/invocation pair illustrating tool usage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageExample {
    pub query: String,
    pub call: String,
}

/// Expanded schema and examples for a tool, loaded only when selected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FullDefinition {
    /// Invocation name of the tool (e.g. "read_file")
    pub name: String,
    pub description: String,
    /// Parameters in declaration order
    #[serde(default)]
    pub parameters: Vec<ParameterSpec>,
    #[serde(default)]
    pub examples: Vec<UsageExample>,
}

impl FullDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
            examples: Vec::new(),
        }
    }

    pub fn param(
        mut self,
        name: impl Into<String>,
        param_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        self.parameters.push(ParameterSpec {
            name: name.into(),
            param_type: param_type.into(),
            description: description.into(),
        });
        self
    }

    pub fn example(mut self, query: impl Into<String>, call: impl Into<String>) -> Self {
        self.examples.push(UsageExample {
            query: query.into(),
            call: call.into(),
        });
        self
    }

    /// Look up a parameter by name.
    pub fn parameter(&self, name: &str) -> Option<&ParameterSpec> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

/// A descriptor together with its optional full definition, as declared in
/// a catalog file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(flatten)]
    pub descriptor: ToolDescriptor,
    #[serde(default)]
    pub definition: Option<FullDefinition>,
}

impl CatalogEntry {
    pub fn new(descriptor: ToolDescriptor, definition: Option<FullDefinition>) -> Self {
        Self {
            descriptor,
            definition,
        }
    }
}
