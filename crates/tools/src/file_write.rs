//! write_file: write text into a workspace file, creating parent directories.

use std::sync::Arc;

use async_trait::async_trait;
use actloop_core::error::ToolError;
use actloop_core::tool::{Tool, ToolDefinition};
use actloop_core::Arguments;
use tracing::debug;

use crate::workspace::Workspace;
use crate::{resolve, str_arg};

const NAME: &str = "write_file";

pub struct WriteFileTool {
    workspace: Arc<Workspace>,
}

impl WriteFileTool {
    pub fn new(workspace: Arc<Workspace>) -> Self {
        Self { workspace }
    }
}

#[async_trait]
impl Tool for WriteFileTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(NAME, "Write content to a file")
            .required("file_path", "File path (relative to the workspace)")
            .required("content", "Content to write into the file")
    }

    async fn execute(&self, arguments: &Arguments) -> Result<String, ToolError> {
        let file_path = str_arg(NAME, arguments, "file_path")?;
        let content = str_arg(NAME, arguments, "content")?;
        let path = resolve(NAME, &self.workspace, file_path)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, content).await?;

        debug!(path = %path.display(), bytes = content.len(), "File written");
        Ok(format!("Successfully wrote file: {file_path}"))
    }
}
