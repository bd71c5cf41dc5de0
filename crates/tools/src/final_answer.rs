//! final_answer: the terminal tool.
//!
//! The agent loop ends the run when it sees this action and never dispatches
//! it; the implementation only exists so the tool is declared, validated and
//! listed like any other.

use async_trait::async_trait;
use actloop_core::error::ToolError;
use actloop_core::tool::{FINAL_ANSWER, Tool, ToolDefinition};
use actloop_core::Arguments;

pub struct FinalAnswerTool;

#[async_trait]
impl Tool for FinalAnswerTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(FINAL_ANSWER, "Provide the final answer and end the task")
            .required("answer", "The final answer")
    }

    async fn execute(&self, arguments: &Arguments) -> Result<String, ToolError> {
        let answer = match arguments.get("answer") {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        };
        Ok(format!("Task complete: {answer}"))
    }
}
