//! Shared fixtures: a three-tool catalog and an embedder with pinned vectors.

#![allow(dead_code)]

use skillmatch::{Catalog, CatalogEntry, FullDefinition, Matcher, StaticEmbedder, ToolDescriptor};
use std::sync::Arc;

pub const READ_QUERY: &str = "please show me the contents of notes.txt";
pub const WEATHER_QUERY: &str = "completely unrelated text about weather";

pub fn scenario_catalog() -> Catalog {
    Catalog::new(vec![
        CatalogEntry::new(
            ToolDescriptor::new("file_read", "files", "Read file contents", 150)
                .with_triggers(["read", "view file"])
                .with_exemplars(["读取文件内容", "view source code"]),
            Some(
                FullDefinition::new("read_file", "Read file contents with paging")
                    .param("path", "string", "File path")
                    .example("read config.json", "read_file(path='config.json')"),
            ),
        ),
        CatalogEntry::new(
            ToolDescriptor::new("file_write", "files", "Write files", 120)
                .with_triggers(["write", "save"])
                .with_exemplars(["写入文件", "save output"]),
            Some(FullDefinition::new("write_file", "Write a file").param(
                "path",
                "string",
                "File path",
            )),
        ),
        CatalogEntry::new(
            ToolDescriptor::new("exec_cmd", "system", "Run shell commands", 80)
                .with_triggers(["run", "exec"])
                .with_exemplars(["执行命令"]),
            None,
        ),
    ])
    .expect("scenario catalog is valid")
}

/// Four axes: file reading, file writing, commands, weather.
pub fn scenario_embedder() -> StaticEmbedder {
    StaticEmbedder::new()
        .with("读取文件内容", vec![1.0, 0.0, 0.0, 0.0])
        .with("view source code", vec![0.5, 0.5, 0.5, 0.0])
        .with("写入文件", vec![0.0, 1.0, 0.0, 0.0])
        .with("save output", vec![0.0, 0.9, 0.1, 0.0])
        .with("执行命令", vec![0.0, 0.0, 1.0, 0.0])
        .with(READ_QUERY, vec![1.0, 0.2, 0.0, 0.0])
        .with(WEATHER_QUERY, vec![0.0, 0.0, 0.0, 1.0])
        .with("warmup query", vec![0.0, 0.0, 0.0, 1.0])
}

pub async fn scenario_matcher() -> Matcher {
    Matcher::build(Arc::new(scenario_catalog()), Arc::new(scenario_embedder()))
        .await
        .expect("matcher builds")
}
