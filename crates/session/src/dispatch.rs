//! The tool dispatch loop — bounded rounds of model call and tool execution.
//!
//! One turn is a small state machine: invoke the model with the assembled
//! context; a plain text response ends the turn (**Done**); a response with
//! tool calls starts a round in which every requested call is executed in
//! order, each producing a `tool` message (success output or a failure
//! description — a failed call never aborts the round), and the model is
//! re-invoked with the results. The round counter bounds the loop: a
//! tool-call request past the limit is discarded and the turn ends
//! **Aborted** with the best available text, so appended history never ends
//! with unanswered `tool_calls`.
//!
//! Model calls get one retry after a fixed backoff; tool calls are never
//! retried. Both run under their own deadline. Each round is buffered and
//! handed back whole — a cancellation observed mid-round drops that round's
//! buffer entirely, leaving earlier completed rounds intact.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use coscribe_config::AppConfig;
use coscribe_core::error::ProviderError;
use coscribe_core::event::{DomainEvent, EventBus};
use coscribe_core::message::{Message, MessageToolCall};
use coscribe_core::provider::{Provider, ProviderRequest, ProviderResponse};
use coscribe_core::tool::{ToolCall, ToolRegistry};
use coscribe_document::DocumentVersion;
use tracing::{debug, info, warn};

use crate::context::ContextAssembler;

/// Shown when the round limit is hit and the model produced no usable text.
const LOOP_EXCEEDED_NOTICE: &str =
    "I reached the research tool round limit before I could finish. \
     Try asking again, or narrow the question so one lookup is enough.";

/// Shown when a turn is cancelled mid-flight.
const CANCELLED_NOTICE: &str = "(The turn was cancelled before completion.)";

/// How the turn ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnStatus {
    /// The model answered in text within the round limit
    Done,
    /// Round limit hit, model unreachable after retry, or cancelled
    Aborted,
}

/// Everything one turn produced.
///
/// `messages` is exactly the batch the session must append to the
/// conversation: completed tool-round pairs in order, then the final
/// assistant message carrying `final_text`.
#[derive(Debug)]
pub struct TurnOutcome {
    pub final_text: String,
    pub messages: Vec<Message>,
    pub status: TurnStatus,
}

/// Cooperative cancellation signal for an in-flight turn.
///
/// Clones share the flag; setting it stops the dispatch loop from starting
/// further rounds and discards any round still in progress.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub(crate) fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Drives the model/tool exchange for one turn at a time.
pub struct DispatchLoop {
    provider: Arc<dyn Provider>,
    tools: Arc<ToolRegistry>,
    assembler: ContextAssembler,
    event_bus: Arc<EventBus>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    max_tool_rounds: usize,
    model_timeout: Duration,
    tool_timeout: Duration,
    retry_backoff: Duration,
}

impl DispatchLoop {
    pub fn new(
        provider: Arc<dyn Provider>,
        tools: Arc<ToolRegistry>,
        assembler: ContextAssembler,
        event_bus: Arc<EventBus>,
        config: &AppConfig,
    ) -> Self {
        Self {
            provider,
            tools,
            assembler,
            event_bus,
            model: config.provider.model.clone(),
            temperature: config.provider.temperature,
            max_tokens: Some(config.provider.max_tokens),
            max_tool_rounds: config.dispatch.max_tool_rounds,
            model_timeout: Duration::from_secs(config.dispatch.model_timeout_secs),
            tool_timeout: Duration::from_secs(config.dispatch.tool_timeout_secs),
            retry_backoff: Duration::from_millis(config.dispatch.retry_backoff_ms),
        }
    }

    /// Run one turn to completion. See [`Self::run_with_cancel`].
    pub async fn run(&self, history: &[Message], document: &DocumentVersion) -> TurnOutcome {
        self.run_with_cancel(history, document, &CancelFlag::new())
            .await
    }

    /// Run one turn against the given history and document snapshot.
    ///
    /// Never returns an error: every failure mode ends as an `Aborted`
    /// outcome whose final message describes what happened, so the
    /// conversation stays usable for the next turn.
    pub async fn run_with_cancel(
        &self,
        history: &[Message],
        document: &DocumentVersion,
        cancel: &CancelFlag,
    ) -> TurnOutcome {
        let mut working = self.assembler.assemble(history, document);
        let mut appended: Vec<Message> = Vec::new();
        let mut rounds_used = 0usize;

        debug!(
            history_len = history.len(),
            document_seq = document.sequence,
            "Dispatch turn started"
        );

        loop {
            if cancel.is_cancelled() {
                return self.cancelled(appended);
            }

            let response = match self.invoke_model(&working).await {
                Ok(response) => response,
                Err(e) => {
                    warn!(error = %e, "Model unreachable after retry");
                    self.event_bus.publish(DomainEvent::ErrorOccurred {
                        context: "dispatch".into(),
                        error_message: e.to_string(),
                        timestamp: chrono::Utc::now(),
                    });
                    let text = format!(
                        "I couldn't reach the language model ({e}). \
                         Your message is saved; please try again."
                    );
                    appended.push(Message::assistant(&text));
                    return TurnOutcome {
                        final_text: text,
                        messages: appended,
                        status: TurnStatus::Aborted,
                    };
                }
            };

            if !response.message.has_tool_calls() {
                let final_text = response.message.content.clone();
                appended.push(response.message);
                debug!(rounds_used, "Dispatch turn done");
                return TurnOutcome {
                    final_text,
                    messages: appended,
                    status: TurnStatus::Done,
                };
            }

            if rounds_used >= self.max_tool_rounds {
                // The over-limit request is discarded whole, never appended
                // without answers. Keep any text the model produced with it.
                warn!(
                    rounds_used,
                    limit = self.max_tool_rounds,
                    "Tool round limit exceeded"
                );
                let partial = response.message.content.trim();
                let text = if partial.is_empty() {
                    LOOP_EXCEEDED_NOTICE.to_string()
                } else {
                    partial.to_string()
                };
                appended.push(Message::assistant(&text));
                return TurnOutcome {
                    final_text: text,
                    messages: appended,
                    status: TurnStatus::Aborted,
                };
            }

            rounds_used += 1;
            let calls = response.message.tool_calls.clone();
            info!(
                round = rounds_used,
                tool_calls = calls.len(),
                "Executing tool round"
            );

            // Scratch buffer for this round: the assistant's request plus one
            // tool message per call, in request order.
            let mut round = Vec::with_capacity(1 + calls.len());
            round.push(response.message);
            for call in &calls {
                round.push(self.execute_call(call).await);
            }

            if cancel.is_cancelled() {
                // The round is discarded whole; earlier rounds stand.
                debug!(round = rounds_used, "Round discarded by cancellation");
                return self.cancelled(appended);
            }

            working.extend(round.iter().cloned());
            appended.extend(round);
        }
    }

    fn cancelled(&self, mut appended: Vec<Message>) -> TurnOutcome {
        appended.push(Message::assistant(CANCELLED_NOTICE));
        TurnOutcome {
            final_text: CANCELLED_NOTICE.to_string(),
            messages: appended,
            status: TurnStatus::Aborted,
        }
    }

    /// One model invocation with a deadline, retried exactly once.
    async fn invoke_model(&self, messages: &[Message]) -> Result<ProviderResponse, ProviderError> {
        match self.invoke_once(messages).await {
            Ok(response) => Ok(response),
            Err(first) => {
                warn!(error = %first, backoff_ms = self.retry_backoff.as_millis() as u64, "Model call failed, retrying once");
                tokio::time::sleep(self.retry_backoff).await;
                self.invoke_once(messages).await
            }
        }
    }

    async fn invoke_once(&self, messages: &[Message]) -> Result<ProviderResponse, ProviderError> {
        let request = ProviderRequest {
            model: self.model.clone(),
            messages: messages.to_vec(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            tools: self.tools.definitions(),
        };

        match tokio::time::timeout(self.model_timeout, self.provider.complete(request)).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout(format!(
                "model call exceeded {}s",
                self.model_timeout.as_secs()
            ))),
        }
    }

    /// Execute one tool call under its deadline.
    ///
    /// Always yields a `tool` message for the call's id — success output or
    /// a failure description — so the pairing invariant holds even when the
    /// tool misbehaves.
    async fn execute_call(&self, tc: &MessageToolCall) -> Message {
        let arguments = serde_json::from_str(&tc.arguments)
            .unwrap_or(serde_json::Value::Object(serde_json::Map::new()));
        let call = ToolCall {
            id: tc.id.clone(),
            name: tc.name.clone(),
            arguments,
        };

        let started = Instant::now();
        let outcome = tokio::time::timeout(self.tool_timeout, self.tools.execute(&call)).await;
        let duration_ms = started.elapsed().as_millis() as u64;

        let (success, content) = match outcome {
            Ok(Ok(result)) => (result.success, result.output),
            Ok(Err(e)) => {
                warn!(tool = %tc.name, error = %e, "Tool execution failed");
                (false, format!("Error: {e}"))
            }
            Err(_) => {
                warn!(tool = %tc.name, timeout_secs = self.tool_timeout.as_secs(), "Tool execution timed out");
                (
                    false,
                    format!(
                        "Error: tool '{}' timed out after {}s",
                        tc.name,
                        self.tool_timeout.as_secs()
                    ),
                )
            }
        };

        self.event_bus.publish(DomainEvent::ToolExecuted {
            tool_name: tc.name.clone(),
            success,
            duration_ms,
            timestamp: chrono::Utc::now(),
        });

        Message::tool_result(&tc.id, &content)
    }
}
