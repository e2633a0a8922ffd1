//! # Coscribe Core
//!
//! Domain types, traits, and error definitions for the Coscribe writing
//! assistant. This crate has **zero framework dependencies** — it defines the
//! domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator (model provider, research backend, workflow
//! webhook) is defined as a trait here or next to its implementation.
//! Implementations live in their respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod error;
pub mod event;
pub mod message;
pub mod provider;
pub mod tool;
pub mod webhook;

// Re-export key types at crate root for ergonomics
pub use error::{Error, ProviderError, Result, ToolError, WebhookError};
pub use event::{DomainEvent, EventBus};
pub use message::{Conversation, ConversationId, Message, MessageToolCall, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse, ToolDefinition, Usage};
pub use tool::{Tool, ToolCall, ToolRegistry, ToolResult};
pub use webhook::WorkflowWebhook;
