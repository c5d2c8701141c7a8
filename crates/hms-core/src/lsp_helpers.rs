//! Shared LSP response builders.
//!
//! Analyzer spans are 1-indexed; protocol ranges are 0-indexed. Diagnostics
//! decrement both lines and the start column but keep the end column as is,
//! which turns the analyzer's inclusive last column into the exclusive end the
//! protocol expects.

use crate::analyzer::{AnalyzerDiagnostic, AnalyzerSeverity, Span, Symbol};
use tower_lsp_server::ls_types::{
    Diagnostic, DiagnosticSeverity, Hover, HoverContents, MarkupContent, MarkupKind, Position,
    Range,
};

/// Maps an analyzer severity onto the protocol severity.
///
/// `Unknown` has no protocol counterpart and is left unspecified.
pub fn map_severity(severity: AnalyzerSeverity) -> Option<DiagnosticSeverity> {
    match severity {
        AnalyzerSeverity::Error => Some(DiagnosticSeverity::ERROR),
        AnalyzerSeverity::Warning => Some(DiagnosticSeverity::WARNING),
        AnalyzerSeverity::Info => Some(DiagnosticSeverity::INFORMATION),
        AnalyzerSeverity::Unknown => None,
    }
}

/// Converts an analyzer span into a diagnostic range.
///
/// # Examples
///
/// ```
/// use hms_core::analyzer::{SourcePosition, Span};
/// use hms_core::lsp_helpers::span_to_range;
/// use tower_lsp_server::ls_types::{Position, Range};
///
/// let span = Span::new(SourcePosition::new(3, 5), SourcePosition::new(3, 9));
/// assert_eq!(
///     span_to_range(&span),
///     Range::new(Position::new(2, 4), Position::new(2, 9))
/// );
/// ```
pub fn span_to_range(span: &Span) -> Range {
    Range::new(
        Position::new(
            span.start.line.saturating_sub(1),
            span.start.column.saturating_sub(1),
        ),
        Position::new(span.end.line.saturating_sub(1), span.end.column),
    )
}

/// Renders one analyzer finding as a protocol diagnostic.
pub fn to_diagnostic(result: &AnalyzerDiagnostic, source: &str) -> Diagnostic {
    Diagnostic {
        range: span_to_range(&result.span),
        severity: map_severity(result.severity),
        source: Some(source.to_string()),
        message: format!("{}: {}", result.kind, result.message),
        ..Default::default()
    }
}

/// Maps analyzer results to diagnostics, preserving analyzer order.
///
/// An empty input yields an empty vector, which must still be published so the
/// editor clears stale diagnostics.
pub fn map_diagnostics(results: &[AnalyzerDiagnostic], source: &str) -> Vec<Diagnostic> {
    results
        .iter()
        .map(|result| to_diagnostic(result, source))
        .collect()
}

/// Checks whether a symbol touches the (0-indexed) cursor position.
///
/// Only the symbol's first and last lines are compared with the cursor line;
/// the column test is inclusive on both ends.
pub fn symbol_overlaps(symbol: &Symbol, position: Position) -> bool {
    let line = position.line + 1;
    let column = position.character + 1;

    let on_line = symbol.span.start.line == line || symbol.span.end.line == line;
    on_line && symbol.span.start.column <= column && column <= symbol.span.end.column
}

/// Builds hover content for the first symbol at `position`.
pub fn hover_at(position: Position, symbols: &[Symbol]) -> Option<Hover> {
    let symbol = symbols.iter().find(|s| symbol_overlaps(s, position))?;

    Some(Hover {
        contents: HoverContents::Markup(MarkupContent {
            kind: MarkupKind::Markdown,
            value: symbol.type_name.clone(),
        }),
        range: None,
    })
}
