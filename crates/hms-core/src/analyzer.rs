//! Analyzer call contract.
//!
//! The Homescript analyzer (lexer, parser, type checker) lives outside this
//! workspace. The server only needs one operation from it: analyze a whole
//! buffer and report diagnostics plus a symbol table, both using 1-indexed
//! line/column spans.

use crate::error::Result;
use async_trait::async_trait;
use serde::Deserialize;

/// A 1-indexed line/column location as reported by the analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SourcePosition {
    pub line: u32,
    pub column: u32,
}

impl SourcePosition {
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// A region of text delimited by two 1-indexed positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Span {
    pub start: SourcePosition,
    pub end: SourcePosition,
}

impl Span {
    pub const fn new(start: SourcePosition, end: SourcePosition) -> Self {
        Self { start, end }
    }
}

/// Severity attached to an analyzer finding.
///
/// `Unknown` absorbs any value the analyzer is not supposed to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalyzerSeverity {
    Error,
    Warning,
    Info,
    #[serde(other)]
    Unknown,
}

/// A single finding produced by the analyzer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AnalyzerDiagnostic {
    pub severity: AnalyzerSeverity,
    pub span: Span,
    /// Error kind, e.g. `SyntaxError` or `TypeError`.
    pub kind: String,
    pub message: String,
}

/// A symbol with its inferred type.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Symbol {
    pub span: Span,
    #[serde(rename = "type")]
    pub type_name: String,
}

/// Everything one analyzer run reports, in analyzer order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Analysis {
    #[serde(default)]
    pub diagnostics: Vec<AnalyzerDiagnostic>,
    #[serde(default)]
    pub symbols: Vec<Symbol>,
}

impl Analysis {
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty() && self.symbols.is_empty()
    }
}

/// External script analyzer.
///
/// Implementations re-analyze the full buffer on every call and start from an
/// empty environment; no state is carried between calls.
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use hms_core::analyzer::{Analysis, Analyzer};
///
/// struct Silent;
///
/// #[async_trait]
/// impl Analyzer for Silent {
///     fn name(&self) -> &str {
///         "Silent"
///     }
///
///     fn version(&self) -> &str {
///         "0.1.0"
///     }
///
///     async fn analyze(&self, _content: &str, _path: &str) -> hms_core::Result<Analysis> {
///         Ok(Analysis::default())
///     }
/// }
/// ```
#[async_trait]
pub trait Analyzer: Send + Sync {
    /// Human-readable analyzer name used in the diagnostic source.
    fn name(&self) -> &str;

    /// Analyzer version used in the diagnostic source.
    fn version(&self) -> &str;

    /// Analyzes `content`, which is the text of the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error when the analyzer cannot be reached or its output
    /// cannot be understood. Findings about the script itself are never errors.
    async fn analyze(&self, content: &str, path: &str) -> Result<Analysis>;

    /// Value for the `source` field of published diagnostics.
    fn source(&self) -> String {
        format!("{}@{}", self.name(), self.version())
    }
}

/// Runs the analyzer and swallows failures into an empty analysis.
///
/// A broken analyzer must never block editing, so errors are only logged.
pub async fn analyze_or_empty(analyzer: &dyn Analyzer, content: &str, path: &str) -> Analysis {
    match analyzer.analyze(content, path).await {
        Ok(analysis) => {
            tracing::debug!(
                "analyzed {}: {} diagnostics, {} symbols",
                path,
                analysis.diagnostics.len(),
                analysis.symbols.len()
            );
            analysis
        }
        Err(e) => {
            tracing::warn!("analyzer failed for {}: {}", path, e);
            Analysis::default()
        }
    }
}

/// Analyzer used when no analyzer command is configured.
#[derive(Debug, Clone)]
pub struct NullAnalyzer {
    name: String,
    version: String,
}

impl NullAnalyzer {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

impl Default for NullAnalyzer {
    fn default() -> Self {
        Self::new("Homescript", "2.0.0")
    }
}

#[async_trait]
impl Analyzer for NullAnalyzer {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> &str {
        &self.version
    }

    async fn analyze(&self, _content: &str, _path: &str) -> Result<Analysis> {
        Ok(Analysis::default())
    }
}
