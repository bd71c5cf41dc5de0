//! Agent-level streaming events.
//!
//! `AgentEvent` describes the progress of a run for an external observer.
//! The gateway forwards them to clients over SSE; the CLI prints them.

use serde::{Deserialize, Serialize};

/// Events emitted by the agent loop while a run progresses.
///
/// - `thinking_start`    : a model turn begins
/// - `thinking_stream`   : partial text from the model
/// - `thinking_complete` : the full text of the turn
/// - `tool_call`         : a tool is about to run
/// - `tool_result`       : the tool's observation
/// - `tool_end`          : tool handling finished
/// - `final_answer`      : the run's result
/// - `done`              : the run is over
/// - `error`             : the run failed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentEvent {
    ThinkingStart,

    ThinkingStream { content: String },

    ThinkingComplete { content: String },

    ToolCall {
        name: String,
        arguments: serde_json::Value,
    },

    ToolResult { content: String },

    ToolEnd,

    FinalAnswer { content: String },

    Done,

    Error { message: String },
}

impl AgentEvent {
    /// SSE event name for this event type.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::ThinkingStart => "thinking_start",
            Self::ThinkingStream { .. } => "thinking_stream",
            Self::ThinkingComplete { .. } => "thinking_complete",
            Self::ToolCall { .. } => "tool_call",
            Self::ToolResult { .. } => "tool_result",
            Self::ToolEnd => "tool_end",
            Self::FinalAnswer { .. } => "final_answer",
            Self::Done => "done",
            Self::Error { .. } => "error",
        }
    }

    /// Consumers stop waiting for progress after a terminal event.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Done | Self::Error { .. } | Self::FinalAnswer { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_serialization_stream() {
        let event = AgentEvent::ThinkingStream {
            content: "Hello".into(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"thinking_stream""#));
        assert!(json.contains(r#""content":"Hello""#));
    }

    #[test]
    fn event_serialization_tool_call() {
        let event = AgentEvent::ToolCall {
            name: "write_file".into(),
            arguments: serde_json::json!({"file_path": "a.txt"}),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"tool_call""#));
        assert!(json.contains(r#""name":"write_file""#));
    }

    #[test]
    fn unit_variants_serialize_as_bare_type() {
        assert_eq!(
            serde_json::to_string(&AgentEvent::Done).unwrap(),
            r#"{"type":"done"}"#
        );
        assert_eq!(
            serde_json::to_string(&AgentEvent::ThinkingStart).unwrap(),
            r#"{"type":"thinking_start"}"#
        );
    }

    #[test]
    fn event_type_matches_serde_tag() {
        let events = [
            AgentEvent::ThinkingStart,
            AgentEvent::ThinkingStream { content: "x".into() },
            AgentEvent::ThinkingComplete { content: "x".into() },
            AgentEvent::ToolCall {
                name: "n".into(),
                arguments: serde_json::Value::Null,
            },
            AgentEvent::ToolResult { content: "x".into() },
            AgentEvent::ToolEnd,
            AgentEvent::FinalAnswer { content: "x".into() },
            AgentEvent::Done,
            AgentEvent::Error { message: "x".into() },
        ];
        for event in events {
            let value = serde_json::to_value(&event).unwrap();
            assert_eq!(value["type"], event.event_type());
        }
    }

    #[test]
    fn terminal_events() {
        assert!(AgentEvent::Done.is_terminal());
        assert!(AgentEvent::Error { message: "x".into() }.is_terminal());
        assert!(AgentEvent::FinalAnswer { content: "x".into() }.is_terminal());
        assert!(!AgentEvent::ToolEnd.is_terminal());
        assert!(!AgentEvent::ThinkingStart.is_terminal());
    }

    #[test]
    fn event_deserialization() {
        let json = r#"{"type":"tool_result","content":"ok"}"#;
        let event: AgentEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event, AgentEvent::ToolResult { content: "ok".into() });
    }
}
