//! Shared test helpers: a provider that plays back scripted model turns.

use std::collections::VecDeque;
use std::sync::Mutex;

use actloop_core::error::ProviderError;
use actloop_core::message::Message;
use actloop_core::provider::{
    ChunkReceiver, Provider, ProviderRequest, ProviderResponse, StreamChunk,
};

/// One scripted model turn.
#[derive(Debug, Clone)]
pub enum Turn {
    /// Stream this text, one line per fragment.
    Text(String),
    /// Refuse the request.
    RequestFails(ProviderError),
    /// Stream this text, then break the stream.
    BreaksAfter(String),
}

/// A mock provider that streams a sequence of scripted turns.
///
/// Each `stream` call plays the next turn; an exhausted script is an API
/// error. Every request is recorded for inspection.
pub struct ScriptedProvider {
    turns: Mutex<VecDeque<Turn>>,
    repeat: Option<Turn>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    pub fn new(turns: Vec<Turn>) -> Self {
        Self {
            turns: Mutex::new(turns.into()),
            repeat: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Plain text turns.
    pub fn texts(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| Turn::Text(t.to_string())).collect())
    }

    /// Answer every request with the same turn.
    pub fn repeating(turn: Turn) -> Self {
        Self {
            turns: Mutex::new(VecDeque::new()),
            repeat: Some(turn),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn next_turn(&self, request: &ProviderRequest) -> Option<Turn> {
        self.requests.lock().unwrap().push(request.clone());
        self.turns
            .lock()
            .unwrap()
            .pop_front()
            .or_else(|| self.repeat.clone())
    }
}

fn fragments(text: &str) -> Vec<String> {
    text.split_inclusive('\n').map(String::from).collect()
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        match self.next_turn(&request) {
            Some(Turn::Text(text)) => Ok(ProviderResponse {
                message: Message::assistant(text),
                usage: None,
                model: request.model,
            }),
            Some(Turn::RequestFails(e)) => Err(e),
            Some(Turn::BreaksAfter(_)) => Err(ProviderError::StreamInterrupted("scripted".into())),
            None => Err(exhausted()),
        }
    }

    async fn stream(&self, request: ProviderRequest) -> Result<ChunkReceiver, ProviderError> {
        let (text, breaks) = match self.next_turn(&request) {
            Some(Turn::Text(text)) => (text, false),
            Some(Turn::BreaksAfter(text)) => (text, true),
            Some(Turn::RequestFails(e)) => return Err(e),
            None => return Err(exhausted()),
        };

        let (tx, rx) = tokio::sync::mpsc::channel(1);
        tokio::spawn(async move {
            for fragment in fragments(&text) {
                if tx.send(Ok(StreamChunk::text(fragment))).await.is_err() {
                    return; // receiver dropped
                }
            }
            let last = if breaks {
                Err(ProviderError::StreamInterrupted("connection reset".into()))
            } else {
                Ok(StreamChunk::finished(None))
            };
            let _ = tx.send(last).await;
        });
        Ok(rx)
    }
}

fn exhausted() -> ProviderError {
    ProviderError::ApiError {
        status_code: 500,
        message: "script exhausted".into(),
    }
}

/// Model text that calls `name` with `arguments`.
pub fn action_text(thought: &str, name: &str, arguments: serde_json::Value) -> String {
    let action = serde_json::json!({ "name": name, "arguments": arguments });
    format!("{thought}\nAction:\n{action}\n")
}
