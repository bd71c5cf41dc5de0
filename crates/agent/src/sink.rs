//! Fire-and-forget event publication.
//!
//! The loop never waits on its observer: events go through `try_send` on a
//! bounded channel and are dropped when the channel is full or closed.

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::debug;

use crate::stream_event::AgentEvent;

/// Where a run publishes its [`AgentEvent`]s.
#[derive(Debug, Clone, Default)]
pub struct EventSink {
    tx: Option<mpsc::Sender<AgentEvent>>,
}

impl EventSink {
    /// A sink that discards everything.
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    /// Wrap an existing sender.
    pub fn new(tx: mpsc::Sender<AgentEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    /// A sink and the receiver that observes it.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<AgentEvent>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self::new(tx), rx)
    }

    pub fn is_enabled(&self) -> bool {
        self.tx.is_some()
    }

    /// Publish an event without blocking.
    pub fn emit(&self, event: AgentEvent) {
        let Some(tx) = &self.tx else {
            return;
        };
        match tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                debug!(event = event.event_type(), "Observer channel full, dropping event");
            }
            Err(TrySendError::Closed(event)) => {
                debug!(event = event.event_type(), "Observer gone, dropping event");
            }
        }
    }
}
