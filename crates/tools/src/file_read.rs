//! read_file: return the UTF-8 contents of a workspace file.

use std::sync::Arc;

use async_trait::async_trait;
use actloop_core::error::ToolError;
use actloop_core::tool::{Tool, ToolDefinition};
use actloop_core::Arguments;

use crate::workspace::Workspace;
use crate::{resolve, str_arg};

const NAME: &str = "read_file";

pub struct ReadFileTool {
    workspace: Arc<Workspace>,
}

impl ReadFileTool {
    pub fn new(workspace: Arc<Workspace>) -> Self {
        Self { workspace }
    }
}

#[async_trait]
impl Tool for ReadFileTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(NAME, "Read the contents of a file")
            .required("file_path", "File path (relative to the workspace)")
    }

    async fn execute(&self, arguments: &Arguments) -> Result<String, ToolError> {
        let file_path = str_arg(NAME, arguments, "file_path")?;
        let path = resolve(NAME, &self.workspace, file_path)?;

        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: NAME.into(),
                reason: format!("Failed to read file {file_path}: {e}"),
            })
    }
}
