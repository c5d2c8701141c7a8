//! LSP protocol handlers.
//!
//! - [`diagnostics`]: Runs the analyzer on a document and maps its findings
//! - [`hover`]: Inferred type of the symbol under the cursor
//!
//! Handlers never fail: analyzer errors degrade to empty diagnostics and a
//! hover miss returns `None`.

pub mod diagnostics;
pub mod hover;
