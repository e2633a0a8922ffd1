//! Workflow webhook trait — the abstraction over the external automation
//! endpoint.
//!
//! The command router calls this synchronously for an explicit `/research`
//! command, bypassing the model entirely; the CLI also uses it for one-shot
//! prompt enhancement. One endpoint, two request types. Failures are never
//! retried — they surface as a user-visible message.

use crate::error::WebhookError;
use async_trait::async_trait;

#[async_trait]
pub trait WorkflowWebhook: Send + Sync {
    /// A human-readable name for the endpoint (for logs and diagnostics).
    fn name(&self) -> &str;

    /// Forward a research query, optionally with the current document text
    /// as context. Returns the workflow's response text.
    async fn research(
        &self,
        query: &str,
        document_context: Option<&str>,
    ) -> std::result::Result<String, WebhookError>;

    /// Ask the workflow to rewrite a prompt into a clearer one, optionally
    /// informed by the current document text.
    async fn enhance_prompt(
        &self,
        prompt: &str,
        document_context: Option<&str>,
    ) -> std::result::Result<String, WebhookError>;
}
