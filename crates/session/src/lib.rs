//! The conversation engine — the heart of Coscribe.
//!
//! A turn flows through three stages:
//!
//! 1. **Route** — the command router checks for an explicit `/research`
//!    command and, on a match, answers straight from the workflow webhook.
//! 2. **Dispatch** — otherwise the dispatch loop assembles context (system
//!    preamble + embedded document + history), invokes the model, executes
//!    any requested tools, and resubmits until the model answers in text or
//!    the round limit is hit.
//! 3. **Append** — the session appends the turn's messages to the
//!    conversation as one atomic batch and returns the final answer.
//!
//! The session holds the conversation behind a `tokio::sync::Mutex` for the
//! whole turn, so one session processes one turn at a time.

pub mod command;
pub mod context;
pub mod dispatch;
pub mod session;

pub use command::{CommandRouter, RouteOutcome};
pub use context::ContextAssembler;
pub use dispatch::{CancelFlag, DispatchLoop, TurnOutcome, TurnStatus};
pub use session::Session;
