//! Explicit command routing — the webhook bypass for `/research`.
//!
//! A matched command skips the model entirely: the query goes to the
//! workflow webhook and its response text becomes the turn's answer. An
//! unmatched message (including any command when no webhook is configured)
//! falls through to the dispatch loop, where the model may still reach the
//! research tool on its own.

use std::sync::Arc;
use std::time::Instant;

use coscribe_config::CommandConfig;
use coscribe_core::event::{DomainEvent, EventBus};
use coscribe_core::webhook::WorkflowWebhook;
use coscribe_document::DocumentVersion;
use tracing::{debug, info, warn};

/// What routing decided for one raw user message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Ordinary chat input; hand it to the dispatch loop
    NotACommand,
    /// Command handled; the webhook's response text is the final answer
    Answered(String),
    /// Prefix matched but the query was empty; usage text, no external call
    Malformed(String),
    /// The webhook call failed; user-visible description, never retried
    Failed(String),
}

/// Inspects raw user input for the command prefix and runs the webhook leg.
pub struct CommandRouter {
    webhook: Option<Arc<dyn WorkflowWebhook>>,
    event_bus: Arc<EventBus>,
    prefix: String,
    attach_document: bool,
}

impl CommandRouter {
    pub fn new(
        webhook: Option<Arc<dyn WorkflowWebhook>>,
        config: &CommandConfig,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            webhook,
            event_bus,
            prefix: config.prefix.clone(),
            attach_document: config.attach_document,
        }
    }

    /// Route one raw user message against the given document snapshot.
    ///
    /// Matching is case-sensitive on the trimmed input, and the prefix must
    /// be a whole word: `/research batteries` matches, `/researcher` does
    /// not.
    pub async fn route(&self, raw: &str, document: &DocumentVersion) -> RouteOutcome {
        let trimmed = raw.trim();
        let Some(rest) = trimmed.strip_prefix(&self.prefix) else {
            return RouteOutcome::NotACommand;
        };
        if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
            return RouteOutcome::NotACommand;
        }

        let Some(webhook) = &self.webhook else {
            // No workflow endpoint configured: the message falls through to
            // the model, which can still use the research tool.
            debug!(prefix = %self.prefix, "Command matched but no webhook configured");
            return RouteOutcome::NotACommand;
        };

        let query = rest.trim();
        if query.is_empty() {
            return RouteOutcome::Malformed(format!("Usage: {} <query>", self.prefix));
        }

        let context = self
            .attach_document
            .then(|| document.content.as_str());

        info!(endpoint = webhook.name(), query_len = query.len(), "Routing research command to webhook");
        let started = Instant::now();
        let result = webhook.research(query, context).await;
        let duration_ms = started.elapsed().as_millis() as u64;

        self.event_bus.publish(DomainEvent::WebhookCalled {
            kind: "research".into(),
            success: result.is_ok(),
            duration_ms,
            timestamp: chrono::Utc::now(),
        });

        match result {
            Ok(text) => RouteOutcome::Answered(text),
            Err(e) => {
                warn!(error = %e, "Webhook research call failed");
                RouteOutcome::Failed(format!("Research request failed: {e}"))
            }
        }
    }
}
