use hms_core::analyzer::{Analyzer, NullAnalyzer};
use hms_core::command::CommandAnalyzer;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

/// Root configuration for the hms-lsp server.
///
/// Read from the client's initialization options. All fields use sensible
/// defaults if not specified.
///
/// # Examples
///
/// ```
/// use hms_lsp::config::HmsConfig;
///
/// let json = r#"{
///     "analyzer": { "command": ["homescript", "analyze", "--json"] },
///     "diagnostics": { "change_delay_ms": 0 }
/// }"#;
///
/// let config: HmsConfig = serde_json::from_str(json).unwrap();
/// assert_eq!(config.analyzer.command.len(), 3);
/// assert_eq!(config.analyzer.name, "Homescript");
/// assert_eq!(config.diagnostics.change_delay_ms, 0);
/// ```
#[derive(Debug, Deserialize, Default)]
pub struct HmsConfig {
    #[serde(default)]
    pub analyzer: AnalyzerConfig,
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
}

/// External analyzer settings.
///
/// # Defaults
///
/// - `command`: empty (no analysis, every document is reported clean)
/// - `name`: `"Homescript"`
/// - `version`: `"2.0.0"`
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzerConfig {
    /// Program and arguments; the document path is appended on each run.
    #[serde(default)]
    pub command: Vec<String>,
    #[serde(default = "default_analyzer_name")]
    pub name: String,
    #[serde(default = "default_analyzer_version")]
    pub version: String,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            command: Vec::new(),
            name: default_analyzer_name(),
            version: default_analyzer_version(),
        }
    }
}

impl AnalyzerConfig {
    /// Builds the analyzer these settings describe.
    pub fn build(&self) -> Arc<dyn Analyzer> {
        match CommandAnalyzer::new(&self.command, &self.name, &self.version) {
            Some(analyzer) => Arc::new(analyzer),
            None => {
                tracing::info!("no analyzer command configured, diagnostics disabled");
                Arc::new(NullAnalyzer::new(&self.name, &self.version))
            }
        }
    }
}

/// Diagnostics timing.
#[derive(Debug, Clone, Deserialize)]
pub struct DiagnosticsConfig {
    /// Pause after applying a change before analyzing it.
    #[serde(default = "default_change_delay_ms")]
    pub change_delay_ms: u64,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            change_delay_ms: default_change_delay_ms(),
        }
    }
}

impl DiagnosticsConfig {
    pub const fn change_delay(&self) -> Duration {
        Duration::from_millis(self.change_delay_ms)
    }
}

fn default_analyzer_name() -> String {
    "Homescript".to_string()
}

fn default_analyzer_version() -> String {
    "2.0.0".to_string()
}

const fn default_change_delay_ms() -> u64 {
    100
}
