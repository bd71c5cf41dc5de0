//! execute_code: run a code snippet in a child interpreter process.
//!
//! The snippet is written to the interpreter's stdin with the workspace as
//! the working directory and `WORKSPACE_PATH` in the environment. Python
//! interpreters additionally get a prelude defining `WORKSPACE_PATH` and
//! `get_workspace_file_path(name)`. The child is killed if it outlives the
//! timeout.

use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use actloop_core::error::ToolError;
use actloop_core::tool::{Tool, ToolDefinition};
use actloop_core::Arguments;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::str_arg;
use crate::workspace::Workspace;

const NAME: &str = "execute_code";

const PYTHON_PRELUDE: &str = "\
import os, json
WORKSPACE_PATH = os.environ.get('WORKSPACE_PATH', os.getcwd())
def get_workspace_file_path(filename):
    return os.path.join(WORKSPACE_PATH, filename)
";

/// Execute code snippets in a separate process.
pub struct ExecuteCodeTool {
    workspace: Arc<Workspace>,
    program: String,
    args: Vec<String>,
    timeout: Duration,
    prelude: Option<&'static str>,
}

impl ExecuteCodeTool {
    pub fn new(
        workspace: Arc<Workspace>,
        program: impl Into<String>,
        args: Vec<String>,
        timeout: Duration,
    ) -> Self {
        let program = program.into();
        let prelude = is_python(&program).then_some(PYTHON_PRELUDE);
        Self {
            workspace,
            program,
            args,
            timeout,
            prelude,
        }
    }

    fn script(&self, code: &str) -> String {
        match self.prelude {
            Some(prelude) => format!("{prelude}{code}\n"),
            None => format!("{code}\n"),
        }
    }

    fn failed(reason: impl Into<String>) -> ToolError {
        ToolError::ExecutionFailed {
            tool_name: NAME.into(),
            reason: reason.into(),
        }
    }
}

fn is_python(program: &str) -> bool {
    std::path::Path::new(program)
        .file_name()
        .map(|n| n.to_string_lossy().starts_with("python"))
        .unwrap_or(false)
}

#[async_trait]
impl Tool for ExecuteCodeTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(NAME, "Execute Python code in the workspace and return its output")
            .required("code", "The Python code to execute; print results to stdout")
    }

    async fn execute(&self, arguments: &Arguments) -> Result<String, ToolError> {
        let code = str_arg(NAME, arguments, "code")?;
        let root = self.workspace.root();
        self.workspace.ensure()?;

        debug!(program = %self.program, bytes = code.len(), "Executing code");

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .current_dir(root)
            .env("WORKSPACE_PATH", root)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Self::failed(format!("Failed to start {}: {e}", self.program)))?;

        // The stdin write is timed too: an interpreter that never reads
        // would otherwise block it forever once the pipe buffer fills.
        let script = self.script(code);
        let stdin = child.stdin.take();
        let run = async move {
            if let Some(mut stdin) = stdin {
                match stdin.write_all(script.as_bytes()).await {
                    Ok(()) => {}
                    // the child exited without reading everything
                    Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
                    Err(e) => return Err(e),
                }
                // closing stdin lets the interpreter start running
                drop(stdin);
            }
            child.wait_with_output().await
        };

        let output = match tokio::time::timeout(self.timeout, run).await {
            Ok(result) => result?,
            Err(_) => {
                warn!(timeout_secs = self.timeout.as_secs(), "Code execution timed out");
                return Err(ToolError::Timeout {
                    tool_name: NAME.into(),
                    timeout_secs: self.timeout.as_secs(),
                });
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            let exit_code = output.status.code().unwrap_or(-1);
            warn!(exit_code, "Code exited with an error");
            let detail = if stderr.trim().is_empty() { stdout } else { stderr };
            return Err(Self::failed(format!(
                "[exit code: {exit_code}]\n{}",
                detail.trim()
            )));
        }

        let result = if stderr.trim().is_empty() {
            stdout
        } else {
            format!("{stdout}\n[stderr]: {stderr}")
        };

        if result.trim().is_empty() {
            Ok("Code executed successfully with no output".into())
        } else {
            Ok(result.trim_end().to_string())
        }
    }
}
