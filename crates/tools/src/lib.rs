//! Built-in tool implementations for actloop.
//!
//! Tools give the agent the ability to interact with its workspace:
//! read, write and list files, run code snippets, and render charts.
//! Every path a tool touches is resolved through the [`Workspace`] sandbox.

pub mod chart;
pub mod execute_code;
pub mod file_read;
pub mod file_write;
pub mod final_answer;
pub mod list_files;
pub mod workspace;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use actloop_config::ToolsConfig;
use actloop_core::error::{RegistryError, ToolError};
use actloop_core::tool::ToolRegistry;
use actloop_core::Arguments;

pub use workspace::{Workspace, WorkspaceError};

/// Create the registry with every built-in tool, in listing order.
pub fn default_registry(config: &ToolsConfig) -> Result<ToolRegistry, RegistryError> {
    let workspace = Arc::new(Workspace::new(&config.workspace));
    if let Err(e) = workspace.ensure() {
        tracing::warn!(workspace = %config.workspace.display(), error = %e, "Could not create workspace");
    }

    let mut registry = ToolRegistry::new();
    registry.register(Box::new(file_write::WriteFileTool::new(workspace.clone())))?;
    registry.register(Box::new(file_read::ReadFileTool::new(workspace.clone())))?;
    registry.register(Box::new(list_files::ListFilesTool::new(workspace.clone())))?;
    registry.register(Box::new(execute_code::ExecuteCodeTool::new(
        workspace.clone(),
        &config.interpreter,
        config.interpreter_args.clone(),
        Duration::from_secs(config.code_timeout_secs),
    )))?;
    registry.register(Box::new(final_answer::FinalAnswerTool))?;
    registry.register(Box::new(chart::ChartTool::new(workspace)))?;
    Ok(registry)
}

/// Fetch a string argument.
pub(crate) fn str_arg<'a>(
    tool: &str,
    arguments: &'a Arguments,
    key: &str,
) -> Result<&'a str, ToolError> {
    arguments
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| ToolError::InvalidArguments(format!("{tool}: '{key}' must be a string")))
}

/// Resolve a path through the sandbox, reporting violations as permission errors.
pub(crate) fn resolve(tool: &str, workspace: &Workspace, path: &str) -> Result<PathBuf, ToolError> {
    workspace.resolve(path).map_err(|e| ToolError::PermissionDenied {
        tool_name: tool.into(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(dir: &std::path::Path) -> ToolsConfig {
        ToolsConfig {
            workspace: dir.to_path_buf(),
            ..ToolsConfig::default()
        }
    }

    #[test]
    fn default_registry_has_all_tools_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let registry = default_registry(&config(dir.path())).unwrap();
        assert_eq!(
            registry.names(),
            vec![
                "write_file",
                "read_file",
                "list_files",
                "execute_code",
                "final_answer",
                "create_echarts_visualization"
            ]
        );
    }

    #[test]
    fn default_registry_creates_workspace() {
        let dir = tempfile::tempdir().unwrap();
        let ws = dir.path().join("nested/ws");
        default_registry(&config(&ws)).unwrap();
        assert!(ws.is_dir());
    }

    #[test]
    fn listing_mentions_every_parameter() {
        let dir = tempfile::tempdir().unwrap();
        let listing = default_registry(&config(dir.path())).unwrap().describe();
        for param in ["file_path", "content", "directory", "code", "answer", "chart_type", "theme"] {
            assert!(listing.contains(&format!("    - {param}:")), "missing {param}");
        }
    }

    #[tokio::test]
    async fn write_then_read_through_registry() {
        let dir = tempfile::tempdir().unwrap();
        let registry = default_registry(&config(dir.path())).unwrap();

        let args = |v: serde_json::Value| v.as_object().cloned().unwrap();
        let written = registry
            .dispatch("write_file", &args(json!({"file_path": "foo.txt", "content": "bar"})))
            .await;
        assert!(written.success);

        let read = registry
            .dispatch("read_file", &args(json!({"file_path": "foo.txt"})))
            .await;
        assert_eq!(read.output, "bar");
    }

    #[tokio::test]
    async fn sandbox_violation_is_failed_observation() {
        let dir = tempfile::tempdir().unwrap();
        let registry = default_registry(&config(dir.path())).unwrap();
        let args = json!({"file_path": "../secret"}).as_object().cloned().unwrap();
        let result = registry.dispatch("read_file", &args).await;
        assert!(!result.success);
        assert!(result.output.starts_with("Tool execution error [read_file]:"));
    }
}
