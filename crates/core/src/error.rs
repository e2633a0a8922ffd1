//! Error types for the Coscribe domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum; the top-level `Error`
//! aggregates them so callers can hold one type.

use thiserror::Error;

/// The top-level error type for all Coscribe operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Model provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Tool errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- Workflow webhook errors ---
    #[error("Webhook error: {0}")]
    Webhook(#[from] WebhookError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Failures talking to the model provider. Transport-shaped variants
/// (`Timeout`, `Network`, `ApiError`) are retried once by the dispatch loop;
/// a content-bearing "model declined" response is not an error at all.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed provider response: {0}")]
    InvalidResponse(String),
}

/// Failures executing a tool. These never abort a dispatch round; the loop
/// converts them into failure-shaped `tool` messages so the model can react.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Tool '{tool_name}' failed: {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("Tool timed out: {tool_name} after {timeout_secs}s")]
    Timeout { tool_name: String, timeout_secs: u64 },

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),
}

/// Failures calling the workflow webhook. Never retried; the command router
/// converts them into a user-visible assistant message.
#[derive(Debug, Clone, Error)]
pub enum WebhookError {
    #[error("Webhook not configured: {0}")]
    NotConfigured(String),

    #[error("Webhook returned status {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Webhook reported an error: {0}")]
    Reported(String),

    #[error("Webhook timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Network error reaching webhook: {0}")]
    Network(String),

    #[error("Invalid webhook response: {0}")]
    InvalidResponse(String),
}
