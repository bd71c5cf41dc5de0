//! The agent reasoning loop implementation.
//!
//! One run moves through Thinking → Acting → Observing until the model calls
//! `final_answer`, produces no action at all, the iteration budget runs out,
//! or the transport fails. Runs share nothing but the provider and the
//! registry, so one `AgentLoop` can serve many concurrent runs.

use std::sync::Arc;

use actloop_config::AppConfig;
use actloop_core::error::ProviderError;
use actloop_core::message::{ConversationMemory, Message};
use actloop_core::provider::{Provider, ProviderRequest};
use actloop_core::tool::{FINAL_ANSWER, ToolRegistry};
use actloop_core::Action;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::parser::{self, OBSERVATION_MARKER};
use crate::prompt;
use crate::sink::EventSink;
use crate::stream_event::AgentEvent;

/// Iteration budget when none is configured.
pub const DEFAULT_MAX_ITERATIONS: u32 = 10;

/// Sampling temperature when none is configured.
pub const DEFAULT_TEMPERATURE: f32 = 0.1;

/// Result text for runs that end without an explicit answer.
pub const IMPLICIT_COMPLETION: &str = "Task completed";

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// The model called `final_answer`
    Answered,
    /// The model produced no parseable action
    ImplicitlyCompleted,
    /// The iteration budget ran out
    BudgetExhausted,
    /// The provider failed
    Failed,
}

/// Everything a finished run leaves behind.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// The result string returned to the caller
    pub result: String,

    pub status: RunStatus,

    /// Iterations started, the final one included
    pub iterations: u32,

    /// The run's memory at the moment it ended
    pub memory: ConversationMemory,
}

/// The core agent loop that orchestrates model turns and tool execution.
pub struct AgentLoop {
    /// The LLM provider to use
    provider: Arc<dyn Provider>,

    /// Tool registry
    tools: Arc<ToolRegistry>,

    /// The model to use
    model: String,

    /// Temperature setting
    temperature: f32,

    /// Max tokens per response
    max_tokens: Option<u32>,

    /// Maximum iterations per run
    max_iterations: u32,

    /// Rendered once, sent first on every request
    system_prompt: String,
}

/// Per-run bookkeeping. Never shared between runs.
struct RunState {
    original_task: String,
    iteration: u32,
    memory: ConversationMemory,
}

impl AgentLoop {
    /// Create a new agent loop over a provider and a populated registry.
    pub fn new(
        provider: Arc<dyn Provider>,
        tools: Arc<ToolRegistry>,
        model: impl Into<String>,
    ) -> Self {
        let system_prompt = prompt::system_prompt(&tools.describe());
        Self {
            provider,
            tools,
            model: model.into(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: None,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            system_prompt,
        }
    }

    /// Create an agent loop with model settings taken from configuration.
    pub fn from_config(
        provider: Arc<dyn Provider>,
        tools: Arc<ToolRegistry>,
        config: &AppConfig,
    ) -> Self {
        let agent = Self::new(provider, tools, &config.model)
            .with_temperature(config.temperature)
            .with_max_iterations(config.agent.max_iterations);
        match config.max_tokens {
            Some(max) => agent.with_max_tokens(max),
            None => agent,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the max tokens per model response.
    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    /// Set the iteration budget. Clamped to at least one.
    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max.max(1);
        self
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    /// Run a task to completion without observing events.
    pub async fn run(&self, task: &str) -> RunOutcome {
        self.run_with_events(task, &EventSink::disabled()).await
    }

    /// Run a task to completion, publishing progress to `events`.
    ///
    /// Always returns a result string; provider failures are folded into a
    /// [`RunStatus::Failed`] outcome rather than surfaced as errors.
    pub async fn run_with_events(&self, task: &str, events: &EventSink) -> RunOutcome {
        let mut state = RunState {
            original_task: task.to_string(),
            iteration: 0,
            memory: ConversationMemory::seeded(task),
        };

        info!(
            run_id = %state.memory.run_id,
            max_iterations = self.max_iterations,
            model = %self.model,
            "Starting run"
        );

        loop {
            // ── Thinking ──
            state.iteration += 1;
            debug!(run_id = %state.memory.run_id, iteration = state.iteration, "Thinking");
            events.emit(AgentEvent::ThinkingStart);

            let text = match self.think(&state.memory, events).await {
                Ok(text) => text,
                Err(e) => {
                    warn!(run_id = %state.memory.run_id, error = %e, "Provider failed");
                    let result = format!("Task execution failed: {e}");
                    events.emit(AgentEvent::Error {
                        message: result.clone(),
                    });
                    events.emit(AgentEvent::Done);
                    return state.finish(RunStatus::Failed, result);
                }
            };

            // ── Acting ──
            let Some(action) = parser::extract_action(&text) else {
                info!(run_id = %state.memory.run_id, "No action in model output, treating as complete");
                return finish_with_answer(state, events, RunStatus::ImplicitlyCompleted, IMPLICIT_COMPLETION.into());
            };

            if action.name == FINAL_ANSWER {
                state.memory.push(Message::assistant(text));
                let answer = answer_text(&action);
                return finish_with_answer(state, events, RunStatus::Answered, answer);
            }

            events.emit(AgentEvent::ToolCall {
                name: action.name.clone(),
                arguments: Value::Object(action.arguments.clone()),
            });
            let result = self.tools.dispatch(&action.name, &action.arguments).await;
            events.emit(AgentEvent::ToolResult {
                content: result.output.clone(),
            });
            events.emit(AgentEvent::ToolEnd);

            // ── Observing ──
            state.memory.push(Message::assistant(text));
            state
                .memory
                .push(Message::assistant(prompt::observation(&result.output)));
            state
                .memory
                .push(Message::user(prompt::reminder(&state.original_task)));

            if state.iteration >= self.max_iterations {
                warn!(
                    run_id = %state.memory.run_id,
                    iterations = state.iteration,
                    "Iteration budget exhausted"
                );
                let result = format!(
                    "Reached the maximum number of iterations ({}); the task may not be fully complete",
                    self.max_iterations
                );
                return finish_with_answer(state, events, RunStatus::BudgetExhausted, result);
            }
        }
    }

    /// Stream one model turn, forwarding fragments as they arrive.
    ///
    /// Consumption stops as soon as a complete action is present or the
    /// model starts writing its own observation; the receiver is then
    /// dropped so the provider's reader task shuts down.
    async fn think(
        &self,
        memory: &ConversationMemory,
        events: &EventSink,
    ) -> Result<String, ProviderError> {
        let request = ProviderRequest {
            model: self.model.clone(),
            messages: memory.to_request_messages(&self.system_prompt),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            stream: true,
            stop: vec![OBSERVATION_MARKER.to_string()],
        };

        let mut rx = self.provider.stream(request).await?;
        let mut text = String::new();

        while let Some(chunk) = rx.recv().await {
            let chunk = chunk?;
            if let Some(content) = chunk.content.filter(|c| !c.is_empty()) {
                text.push_str(&content);
                events.emit(AgentEvent::ThinkingStream { content });

                if parser::action_ready(&text) || text.contains(OBSERVATION_MARKER) {
                    debug!(chars = text.len(), "Action complete, stopping stream early");
                    break;
                }
            }
            if chunk.done {
                break;
            }
        }
        drop(rx);

        events.emit(AgentEvent::ThinkingComplete {
            content: text.clone(),
        });
        Ok(text)
    }
}

impl RunState {
    fn finish(self, status: RunStatus, result: String) -> RunOutcome {
        info!(
            run_id = %self.memory.run_id,
            iterations = self.iteration,
            status = ?status,
            "Run finished"
        );
        RunOutcome {
            result,
            status,
            iterations: self.iteration,
            memory: self.memory,
        }
    }
}

fn finish_with_answer(
    state: RunState,
    events: &EventSink,
    status: RunStatus,
    answer: String,
) -> RunOutcome {
    events.emit(AgentEvent::FinalAnswer {
        content: answer.clone(),
    });
    events.emit(AgentEvent::Done);
    state.finish(status, answer)
}

/// The text of a `final_answer` call: strings verbatim, anything else as JSON.
fn answer_text(action: &Action) -> String {
    match action.argument("answer") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => IMPLICIT_COMPLETION.to_string(),
        Some(other) => other.to_string(),
    }
}
