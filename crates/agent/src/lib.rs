//! The agent loop of actloop.
//!
//! The agent follows a **Think → Act → Observe** cycle:
//!
//! 1. **Think**: stream a model turn over the system prompt and run memory
//! 2. **Act**: recover the `Action:` object and dispatch it through the registry
//! 3. **Observe**: record the thought, the tool result and a task reminder
//!
//! The run ends when the model calls `final_answer`, emits no action, the
//! iteration budget is spent, or the provider fails.

pub mod loop_runner;
pub mod parser;
pub mod prompt;
pub mod sink;
pub mod stream_event;

#[cfg(test)]
mod test_helpers;

pub use loop_runner::{AgentLoop, RunOutcome, RunStatus};
pub use parser::{action_ready, extract_action};
pub use sink::EventSink;
pub use stream_event::AgentEvent;
