//! Document lifecycle handlers.
//!
//! Every handler takes the document lock before doing anything else that
//! awaits, and holds it until the diagnostics for the new revision are
//! queued. Notifications for one document therefore take effect in the order
//! they were received.

use super::changes::{ChangeOp, apply_changes};
use super::state::{Document, ServerState};
use crate::handlers::diagnostics::refresh_diagnostics;
use crate::publisher::{DiagnosticsPublisher, PublishRequest};
use hms_core::error::Result;
use tower_lsp_server::ls_types::{Diagnostic, Uri};

fn publish_for(doc: &Document, diagnostics: Vec<Diagnostic>, publisher: &DiagnosticsPublisher) {
    publisher.publish(PublishRequest {
        uri: doc.uri.clone(),
        path: doc.path().to_string(),
        revision: doc.revision(),
        diagnostics,
    });
}

/// Handles `textDocument/didOpen`.
///
/// Stores the document (replacing any open document with the same path),
/// analyzes it and queues its diagnostics.
///
/// # Errors
///
/// Returns a URI error if the document's URI cannot be normalized.
pub async fn handle_document_open(
    uri: Uri,
    text: String,
    state: &ServerState,
    publisher: &DiagnosticsPublisher,
) -> Result<()> {
    let document = state.open(uri, text)?;
    let mut doc = document.lock().await;

    tracing::info!("opened {} (revision {})", doc.path(), doc.revision());

    let analyzer = state.analyzer();
    let diagnostics = refresh_diagnostics(&mut doc, analyzer.as_ref()).await;
    publish_for(&doc, diagnostics, publisher);

    Ok(())
}

/// Handles `textDocument/didChange`.
///
/// Applies `changes` in order under a fresh revision, waits for the
/// configured change delay, re-analyzes and queues diagnostics. Returns
/// false if the document is not open.
pub async fn handle_document_change(
    uri: &Uri,
    changes: Vec<ChangeOp>,
    state: &ServerState,
    publisher: &DiagnosticsPublisher,
) -> bool {
    let Some(document) = state.get(uri.as_str()) else {
        tracing::debug!("change for unknown document {:?} ignored", uri);
        return false;
    };

    let mut doc = document.lock().await;
    apply_changes(&mut doc, changes, state.next_revision());

    let delay = state.change_delay();
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    let analyzer = state.analyzer();
    let diagnostics = refresh_diagnostics(&mut doc, analyzer.as_ref()).await;

    // A document replaced by a reopen must not publish over its successor.
    if state.is_current(doc.path(), &document) {
        publish_for(&doc, diagnostics, publisher);
    }

    true
}

/// Handles `textDocument/didClose`.
///
/// Waits for in-flight work on the document, removes it and clears its
/// diagnostics in the editor. Returns false if the document is not open or
/// was replaced by a reopen while close waited for it.
pub async fn handle_document_close(
    uri: &Uri,
    state: &ServerState,
    publisher: &DiagnosticsPublisher,
) -> bool {
    let Some(document) = state.get(uri.as_str()) else {
        tracing::debug!("close for unknown document {:?} ignored", uri);
        return false;
    };

    let mut doc = document.lock().await;
    if !state.close_if(doc.path(), &document) {
        tracing::debug!("{} was reopened before close ran, keeping it", doc.path());
        return false;
    }

    doc.mark_changed(state.next_revision());
    tracing::info!("closed {}", doc.path());
    publish_for(&doc, Vec::new(), publisher);

    true
}
