//! # actloop core
//!
//! Domain types, traits, and error definitions for the actloop agent loop.
//! This crate has **no framework dependencies**: it defines the model that
//! the provider, tool, agent and gateway crates implement against.
//!
//! ## Layout
//!
//! - [`message`]: role-tagged messages and per-run conversation memory
//! - [`provider`]: the streaming model channel
//! - [`tool`]: tool definitions, the [`Tool`] trait and the [`ToolRegistry`]
//! - [`action`]: the structured action recovered from model output
//! - [`error`]: one error enum per bounded context

pub mod action;
pub mod error;
pub mod message;
pub mod provider;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use action::{Action, Arguments};
pub use error::{Error, ProviderError, RegistryError, Result, ToolError, ValidationError};
pub use message::{ConversationMemory, Message, Role, RunId};
pub use provider::{ChunkReceiver, Provider, ProviderRequest, ProviderResponse, StreamChunk, Usage};
pub use tool::{FINAL_ANSWER, LISTING_VERSION, Parameter, Tool, ToolDefinition, ToolRegistry, ToolResult};
