//! Default skill catalog used when no catalog file is configured.

use crate::catalog::registry::Catalog;
use crate::catalog::types::{CatalogEntry, FullDefinition, ToolDescriptor};
use crate::error::Result;

impl Catalog {
    /// The five built-in skills: file read/write/edit, command execution and
    /// tool creation.
    pub fn builtin() -> Result<Self> {
        Catalog::new(builtin_entries())
    }
}

fn builtin_entries() -> Vec<CatalogEntry> {
    vec![
        CatalogEntry::new(
            ToolDescriptor::new(
                "file_read",
                "文件操作",
                "读取文件内容，支持分页避免 context 爆炸",
                150,
            )
            .with_triggers(["读取", "打开文件", "查看", "cat", "view file"])
            .with_exemplars([
                "读取文件内容",
                "查看文件",
                "打开文件并显示",
                "cat file content",
                "view source code",
            ]),
            Some(
                FullDefinition::new(
                    "read_file",
                    "读取文件内容，支持分页避免 context 爆炸。返回文件内容、总行数、是否被截断。",
                )
                .param("path", "string", "文件路径")
                .param("page_size", "integer", "每页行数，默认 100")
                .param("page", "integer", "页码，从 1 开始")
                .example("读取 config.json", "read_file(path='config.json')")
                .example("查看 main.py 前 50 行", "read_file(path='main.py', page_size=50)"),
            ),
        ),
        CatalogEntry::new(
            ToolDescriptor::new(
                "file_write",
                "文件操作",
                "写入文件，自动创建目录，支持覆盖或追加模式",
                120,
            )
            .with_triggers(["写入", "保存", "创建文件", "write", "save"])
            .with_exemplars([
                "写入文件",
                "保存内容到文件",
                "创建新文件",
                "write to file",
                "save output",
            ]),
            Some(
                FullDefinition::new("write_file", "写入文件，自动创建目录。支持覆盖或追加模式。")
                    .param("path", "string", "文件路径")
                    .param("content", "string", "文件内容")
                    .param("mode", "string", "写入模式：overwrite(默认) 或 append")
                    .example("创建 hello.txt", "write_file(path='hello.txt', content='Hello World')")
                    .example(
                        "追加日志",
                        "write_file(path='log.txt', content='error', mode='append')",
                    ),
            ),
        ),
        CatalogEntry::new(
            ToolDescriptor::new("file_edit", "文件操作", "精确编辑文件内容，支持搜索替换", 100)
                .with_triggers(["编辑", "修改", "替换", "edit", "modify"])
                .with_exemplars([
                    "编辑文件",
                    "修改文件内容",
                    "替换文本",
                    "edit file",
                    "modify configuration",
                ]),
            Some(
                FullDefinition::new("edit_file", "精确编辑文件，按搜索文本定位并替换。")
                    .param("path", "string", "文件路径")
                    .param("search", "string", "要查找的原文")
                    .param("replace", "string", "替换后的文本")
                    .example(
                        "把端口改成 8080",
                        "edit_file(path='config.toml', search='port = 80', replace='port = 8080')",
                    ),
            ),
        ),
        CatalogEntry::new(
            ToolDescriptor::new("exec_cmd", "系统操作", "执行 shell 命令，获取 stdout/stderr", 80)
                .with_triggers(["执行", "运行", "命令", "exec", "run", "bash"])
                .with_exemplars([
                    "执行命令",
                    "运行脚本",
                    "bash 命令",
                    "terminal command",
                    "system operation",
                ]),
            Some(
                FullDefinition::new("exec", "执行 shell 命令，返回 stdout、stderr 与退出码。")
                    .param("command", "string", "要执行的命令")
                    .param("timeout_secs", "integer", "超时秒数，默认 60")
                    .example("运行 npm install", "exec(command='npm install')"),
            ),
        ),
        CatalogEntry::new(
            ToolDescriptor::new("create_tool", "工具管理", "创建新的 CLI 工具并注册到工具中心", 200)
                .with_triggers(["创建工具", "新工具", "create tool", "make tool"])
                .with_exemplars([
                    "创建工具",
                    "开发新功能",
                    "扩展能力",
                    "create utility",
                    "add new skill",
                ]),
            Some(
                FullDefinition::new("create_tool", "创建新的 CLI 工具并注册到工具中心。")
                    .param("name", "string", "工具名称")
                    .param("description", "string", "工具用途说明")
                    .param("script", "string", "工具实现脚本")
                    .example(
                        "创建一个新工具来处理 CSV",
                        "create_tool(name='csv_stats', description='统计 CSV 列', script='...')",
                    ),
            ),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_is_valid() {
        let catalog = Catalog::builtin().unwrap();
        let ids: Vec<&str> = catalog
            .list_descriptors()
            .iter()
            .map(|d| d.id.as_str())
            .collect();

        assert_eq!(
            ids,
            vec!["file_read", "file_write", "file_edit", "exec_cmd", "create_tool"]
        );
        assert_eq!(catalog.total_cost(), 650);
    }

    #[test]
    fn test_every_builtin_has_definition_and_exemplars() {
        let catalog = Catalog::builtin().unwrap();
        for descriptor in catalog.list_descriptors() {
            assert!(catalog.get_full_definition(&descriptor.id).is_ok());
            assert!(!descriptor.semantic_phrases().is_empty());
        }
    }
}
