//! Document management module.
//!
//! This module provides infrastructure for managing open documents:
//! - `uri`: URI to store-key normalization
//! - `state`: Document and server state (the document store)
//! - `changes`: Ordered application of incremental edits
//! - `lifecycle`: Document open/change/close event handling

mod changes;
mod lifecycle;
mod state;
mod uri;

// Re-export all public items from submodules
pub use changes::{ChangeOp, apply_changes};
pub use lifecycle::{handle_document_change, handle_document_close, handle_document_open};
pub use state::{Document, ServerState, SharedDocument};
pub use uri::normalize;
