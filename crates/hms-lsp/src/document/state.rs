use super::uri::normalize;
use dashmap::DashMap;
use hms_core::analyzer::{Analyzer, NullAnalyzer, Symbol};
use hms_core::error::Result;
use hms_core::position;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock, PoisonError, RwLock};
use std::time::Duration;
use tokio::sync::Mutex;
use tower_lsp_server::ls_types::{Position, Range, Uri};

/// A document shared between handlers.
///
/// The mutex is the per-document critical section: applying changes,
/// re-running the analyzer and queueing the resulting publish all happen
/// while it is held.
pub type SharedDocument = Arc<Mutex<Document>>;

/// State for a single open document.
///
/// # Examples
///
/// ```
/// use hms_lsp::document::Document;
/// use std::str::FromStr;
/// use tower_lsp_server::ls_types::{Position, Uri};
///
/// let uri = Uri::from_str("file:///test/main.hms").unwrap();
/// let doc = Document::new(uri, "/test/main.hms".into(), "let lamp = 1;\nswitch(lamp)".into(), 1);
///
/// assert_eq!(doc.line_at(1), Some("switch(lamp)"));
/// assert_eq!(doc.word_at(Position::new(1, 8)), "lamp");
/// ```
#[derive(Debug)]
pub struct Document {
    /// URI as sent by the editor, echoed back in notifications
    pub uri: Uri,
    /// Normalized path, the store key
    path: String,
    content: String,
    /// Byte ranges of each `\n`-separated line, built on first use
    lines: OnceLock<Vec<(usize, usize)>>,
    /// Diagnostics and symbols are stale relative to `content`
    pub needs_refresh: bool,
    revision: u64,
    symbols: Vec<Symbol>,
}

impl Document {
    pub fn new(uri: Uri, path: String, content: String, revision: u64) -> Self {
        Self {
            uri,
            path,
            content,
            lines: OnceLock::new(),
            needs_refresh: true,
            revision,
            symbols: Vec::new(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Symbols from the last refresh.
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Replaces the content and drops the line index in the same step.
    pub(crate) fn replace_content(&mut self, content: String) {
        self.content = content;
        self.lines = OnceLock::new();
    }

    /// Records that the content changed under a new revision.
    pub(crate) fn mark_changed(&mut self, revision: u64) {
        self.revision = revision;
        self.needs_refresh = true;
    }

    /// Stores the results of an analyzer run on the current content.
    pub(crate) fn mark_refreshed(&mut self, symbols: Vec<Symbol>) {
        self.symbols = symbols;
        self.needs_refresh = false;
    }

    fn lines(&self) -> &[(usize, usize)] {
        self.lines.get_or_init(|| {
            // '\r' stays part of the line so columns match what the editor sent.
            let mut lines = Vec::new();
            let mut start = 0;
            for (idx, _) in self.content.match_indices('\n') {
                lines.push((start, idx));
                start = idx + 1;
            }
            lines.push((start, self.content.len()));
            lines
        })
    }

    pub fn line_count(&self) -> usize {
        self.lines().len()
    }

    /// Returns the line at `index`, or `None` past the last line.
    pub fn line_at(&self, index: usize) -> Option<&str> {
        let &(start, end) = self.lines().get(index)?;
        Some(&self.content[start..end])
    }

    /// Returns the identifier under the cursor, or an empty string.
    pub fn word_at(&self, position: Position) -> &str {
        self.line_at(position.line as usize)
            .map_or("", |line| position::word_at(line, position.character))
    }

    /// Returns up to `length` characters before the cursor on its line.
    pub fn look_behind(&self, position: Position, length: usize) -> &str {
        self.line_at(position.line as usize)
            .map_or("", |line| position::look_behind(line, position.character, length))
    }

    /// Returns up to `length` characters from the cursor on its line.
    pub fn look_forward(&self, position: Position, length: usize) -> &str {
        self.line_at(position.line as usize)
            .map_or("", |line| position::look_forward(line, position.character, length))
    }

    /// Returns the text covered by `range`, clamped to the content.
    pub fn content_at_range(&self, range: Range) -> &str {
        let (start, end) = position::range_to_offsets(&self.content, range);
        &self.content[start..end]
    }
}

struct AnalysisSettings {
    analyzer: Arc<dyn Analyzer>,
    change_delay: Duration,
}

/// Global LSP server state.
///
/// Owns the document store and the analyzer settings. Handlers share it via
/// `Arc`; the map is a `DashMap` and is never held across an await.
///
/// # Examples
///
/// ```
/// use hms_lsp::document::ServerState;
///
/// let state = ServerState::new();
/// assert_eq!(state.document_count(), 0);
/// assert!(state.get("file:///not/open.hms").is_none());
/// ```
pub struct ServerState {
    /// Open documents by normalized path
    documents: DashMap<String, SharedDocument>,
    /// Source of document revisions, shared so reopened paths never reuse one
    revisions: AtomicU64,
    settings: RwLock<AnalysisSettings>,
}

impl ServerState {
    pub fn new() -> Self {
        Self {
            documents: DashMap::new(),
            revisions: AtomicU64::new(0),
            settings: RwLock::new(AnalysisSettings {
                analyzer: Arc::new(NullAnalyzer::default()),
                change_delay: Duration::ZERO,
            }),
        }
    }

    /// Opens (or reopens) a document.
    ///
    /// # Errors
    ///
    /// Returns a URI error if `uri` cannot be normalized; nothing is stored
    /// in that case.
    pub fn open(&self, uri: Uri, content: String) -> Result<SharedDocument> {
        let path = normalize(uri.as_str())?;
        let document = Arc::new(Mutex::new(Document::new(
            uri,
            path.clone(),
            content,
            self.next_revision(),
        )));

        if self.documents.insert(path.clone(), Arc::clone(&document)).is_some() {
            tracing::debug!("reopened {}, previous content replaced", path);
        }

        Ok(document)
    }

    /// Looks up an open document by URI or normalized path.
    ///
    /// Unknown and unparsable keys both return `None`.
    pub fn get(&self, uri_or_path: &str) -> Option<SharedDocument> {
        let path = normalize(uri_or_path).ok()?;
        self.documents
            .get(&path)
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Removes a document. Returns false if it was not open.
    pub fn close(&self, uri_or_path: &str) -> bool {
        normalize(uri_or_path)
            .ok()
            .and_then(|path| self.documents.remove(&path))
            .is_some()
    }

    /// Removes the entry for `path` only if it still holds `document`.
    ///
    /// A document reopened under the same path is a different entry and is
    /// left alone.
    pub fn close_if(&self, path: &str, document: &SharedDocument) -> bool {
        self.documents
            .remove_if(path, |_, stored| Arc::ptr_eq(stored, document))
            .is_some()
    }

    /// Returns true if `document` is the entry currently stored for `path`.
    pub fn is_current(&self, path: &str, document: &SharedDocument) -> bool {
        self.documents
            .get(path)
            .is_some_and(|entry| Arc::ptr_eq(entry.value(), document))
    }

    /// Returns the number of open documents.
    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    pub fn next_revision(&self) -> u64 {
        self.revisions.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn configure(&self, analyzer: Arc<dyn Analyzer>, change_delay: Duration) {
        let mut settings = self.settings.write().unwrap_or_else(PoisonError::into_inner);
        settings.analyzer = analyzer;
        settings.change_delay = change_delay;
    }

    pub fn analyzer(&self) -> Arc<dyn Analyzer> {
        let settings = self.settings.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&settings.analyzer)
    }

    /// Delay between applying a change and analyzing the result.
    pub fn change_delay(&self) -> Duration {
        self.settings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .change_delay
    }
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new()
    }
}
