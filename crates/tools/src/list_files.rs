//! list_files: list the entries of a workspace directory.

use std::sync::Arc;

use async_trait::async_trait;
use actloop_core::error::ToolError;
use actloop_core::tool::{Tool, ToolDefinition};
use actloop_core::Arguments;

use crate::resolve;
use crate::workspace::Workspace;

const NAME: &str = "list_files";

pub struct ListFilesTool {
    workspace: Arc<Workspace>,
}

impl ListFilesTool {
    pub fn new(workspace: Arc<Workspace>) -> Self {
        Self { workspace }
    }
}

#[async_trait]
impl Tool for ListFilesTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(NAME, "List the files in a directory").optional(
            "directory",
            "Directory path (optional, defaults to the workspace root)",
        )
    }

    async fn execute(&self, arguments: &Arguments) -> Result<String, ToolError> {
        let directory = arguments
            .get("directory")
            .and_then(|v| v.as_str())
            .unwrap_or("");
        let path = resolve(NAME, &self.workspace, directory)?;

        let mut entries = tokio::fs::read_dir(&path)
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: NAME.into(),
                reason: format!("Failed to list files in '{directory}': {e}"),
            })?;

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();

        serde_json::to_string_pretty(&names)
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: NAME.into(),
                reason: e.to_string(),
            })
    }
}
