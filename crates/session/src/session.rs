//! The session — one conversation, one document, one turn at a time.
//!
//! `submit` owns the whole turn: append the user message, try the command
//! router, otherwise snapshot the document and run the dispatch loop, then
//! append whatever the turn produced as a single batch. The conversation
//! lock is held for the full turn, so concurrent submits serialize and a
//! reader never observes a half-appended round.
//!
//! The conversation and the document have independent lifecycles: `clear`
//! resets history and leaves every document version in place.

use std::sync::Arc;
use std::time::Instant;

use coscribe_core::event::{DomainEvent, EventBus};
use coscribe_core::message::{Conversation, Message};
use coscribe_document::DocumentHandle;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::command::{CommandRouter, RouteOutcome};
use crate::dispatch::{CancelFlag, DispatchLoop, TurnStatus};

/// Orchestrates turns for one conversation.
pub struct Session {
    conversation: Mutex<Conversation>,
    router: CommandRouter,
    dispatch: DispatchLoop,
    document: DocumentHandle,
    event_bus: Arc<EventBus>,
    cancel: CancelFlag,
}

impl Session {
    pub fn new(
        router: CommandRouter,
        dispatch: DispatchLoop,
        document: DocumentHandle,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            conversation: Mutex::new(Conversation::new()),
            router,
            dispatch,
            document,
            event_bus,
            cancel: CancelFlag::new(),
        }
    }

    /// Process one user turn and return the assistant's final text.
    ///
    /// Infallible by design: command failures, model failures surviving the
    /// retry policy, and cancellations all come back as ordinary assistant
    /// text, and the conversation stays usable for the next turn.
    pub async fn submit(&self, raw_user_text: &str) -> String {
        let mut conversation = self.conversation.lock().await;
        self.cancel.reset();

        let started = Instant::now();
        self.event_bus.publish(DomainEvent::TurnStarted {
            conversation_id: conversation.id.to_string(),
            timestamp: chrono::Utc::now(),
        });

        conversation.push(Message::user(raw_user_text));

        // One snapshot serves both the webhook leg and the dispatch leg;
        // edits landing mid-turn are picked up next turn.
        let document = self.document.current().await;

        let (final_text, status) = match self.router.route(raw_user_text, &document).await {
            RouteOutcome::Answered(text) => {
                conversation.push(Message::assistant(&text));
                (text, "command")
            }
            RouteOutcome::Malformed(text) => {
                conversation.push(Message::assistant(&text));
                (text, "malformed")
            }
            RouteOutcome::Failed(text) => {
                conversation.push(Message::assistant(&text));
                (text, "command_failed")
            }
            RouteOutcome::NotACommand => {
                let outcome = self
                    .dispatch
                    .run_with_cancel(&conversation.messages, &document, &self.cancel)
                    .await;
                conversation.extend(outcome.messages);
                let status = match outcome.status {
                    TurnStatus::Done => "done",
                    TurnStatus::Aborted => "aborted",
                };
                (outcome.final_text, status)
            }
        };

        info!(status, history_len = conversation.len(), "Turn completed");
        self.event_bus.publish(DomainEvent::TurnCompleted {
            conversation_id: conversation.id.to_string(),
            status: status.into(),
            duration_ms: started.elapsed().as_millis() as u64,
            timestamp: chrono::Utc::now(),
        });

        final_text
    }

    /// Reset the conversation history. The document keeps all its versions.
    pub async fn clear(&self) {
        let mut conversation = self.conversation.lock().await;
        conversation.clear();
        debug!("Conversation cleared");
        self.event_bus.publish(DomainEvent::ConversationCleared {
            conversation_id: conversation.id.to_string(),
            timestamp: chrono::Utc::now(),
        });
    }

    /// Request cancellation of the turn currently in flight, if any.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Handle to the shared document store (for the editor side).
    pub fn document(&self) -> DocumentHandle {
        self.document.clone()
    }

    /// Snapshot of the conversation history.
    pub async fn history(&self) -> Vec<Message> {
        self.conversation.lock().await.messages.clone()
    }

    /// Number of messages in the conversation.
    pub async fn len(&self) -> usize {
        self.conversation.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.conversation.lock().await.is_empty()
    }
}
