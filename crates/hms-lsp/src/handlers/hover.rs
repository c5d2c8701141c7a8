//! Hover handler.

use crate::document::ServerState;
use crate::handlers::diagnostics::refresh_diagnostics;
use hms_core::lsp_helpers::hover_at;
use tower_lsp_server::ls_types::{Hover, HoverParams};

/// Returns the inferred type of the first symbol under the cursor.
///
/// A document edited since its last analysis is re-analyzed first; the
/// resulting diagnostics are left for the next change to publish.
pub async fn handle_hover(state: &ServerState, params: HoverParams) -> Option<Hover> {
    let uri = &params.text_document_position_params.text_document.uri;
    let position = params.text_document_position_params.position;

    let Some(document) = state.get(uri.as_str()) else {
        tracing::debug!("hover on unknown document {:?}", uri);
        return None;
    };

    let mut doc = document.lock().await;

    if doc.needs_refresh {
        let analyzer = state.analyzer();
        refresh_diagnostics(&mut doc, analyzer.as_ref()).await;
    }

    tracing::debug!(
        "hover at {}:{} on '{}'",
        position.line,
        position.character,
        doc.word_at(position)
    );

    hover_at(position, doc.symbols())
}
