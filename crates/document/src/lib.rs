//! # Coscribe Document
//!
//! The document side of the workspace: an append-only version store with
//! linear undo, a shared handle for concurrent editor/orchestrator access,
//! markdown processing helpers, and plain-text import.
//!
//! The store is deliberately free of conversation concerns — the orchestrator
//! only ever reads a snapshot of the current version, and the editor is the
//! only writer.

pub mod handle;
pub mod import;
pub mod markdown;
pub mod store;

pub use handle::DocumentHandle;
pub use import::{import_file, normalize_text, ImportError};
pub use markdown::{
    extract_code_blocks, extract_document_update, extract_headers, format_markdown,
    table_of_contents, CodeBlock, Header, UPDATE_MARKER,
};
pub use store::{DocumentStore, DocumentVersion, UndoStatus};
