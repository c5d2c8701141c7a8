//! Core abstractions for hms-lsp.
//!
//! This crate holds everything the language server needs that does not
//! depend on server state:
//!
//! - **Analyzer contract**: [`Analyzer`] trait, analysis records and the
//!   process-backed [`CommandAnalyzer`]
//! - **Position math**: UTF-16 aware position/offset conversion and clamped
//!   lexical reads ([`position`])
//! - **Protocol mapping**: analyzer findings to diagnostics and symbols to
//!   hover content ([`lsp_helpers`])
//! - **Error Types**: [`HmsError`]
//!
//! # Examples
//!
//! ```
//! use hms_core::analyzer::{AnalyzerDiagnostic, AnalyzerSeverity, SourcePosition, Span};
//! use hms_core::map_diagnostics;
//!
//! let results = vec![AnalyzerDiagnostic {
//!     severity: AnalyzerSeverity::Error,
//!     span: Span::new(SourcePosition::new(1, 1), SourcePosition::new(1, 6)),
//!     kind: "SyntaxError".into(),
//!     message: "unexpected token".into(),
//! }];
//!
//! let diagnostics = map_diagnostics(&results, "Homescript@2.0.0");
//! assert_eq!(diagnostics[0].message, "SyntaxError: unexpected token");
//! ```

pub mod analyzer;
pub mod command;
pub mod error;
pub mod lsp_helpers;
pub mod position;

// Re-export commonly used types
pub use analyzer::{
    Analysis, Analyzer, AnalyzerDiagnostic, AnalyzerSeverity, NullAnalyzer, SourcePosition, Span,
    Symbol, analyze_or_empty,
};
pub use command::CommandAnalyzer;
pub use error::{HmsError, Result};
pub use lsp_helpers::{hover_at, map_diagnostics, map_severity, span_to_range, symbol_overlaps};
pub use position::{look_behind, look_forward, position_to_offset, range_to_offsets, word_at};
