//! Diagnostics refresh.

use crate::document::Document;
use hms_core::analyzer::{Analyzer, analyze_or_empty};
use hms_core::lsp_helpers::map_diagnostics;
use tower_lsp_server::ls_types::Diagnostic;

/// Re-analyzes the document's current content.
///
/// Stores the reported symbols on the document and returns the mapped
/// diagnostics, which may be empty. Must be called with the document lock
/// held so the result matches the document's revision.
pub async fn refresh_diagnostics(doc: &mut Document, analyzer: &dyn Analyzer) -> Vec<Diagnostic> {
    let analysis = analyze_or_empty(analyzer, doc.content(), doc.path()).await;
    let diagnostics = map_diagnostics(&analysis.diagnostics, &analyzer.source());

    tracing::debug!(
        "{}: {} diagnostics, {} symbols (revision {})",
        doc.path(),
        diagnostics.len(),
        analysis.symbols.len(),
        doc.revision()
    );

    doc.mark_refreshed(analysis.symbols);
    diagnostics
}
