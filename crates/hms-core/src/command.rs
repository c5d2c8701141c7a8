//! Analyzer backed by an external process.
//!
//! The configured command is run once per analysis with the document path
//! appended as its last argument. The document text is written to the
//! process's stdin and the process must print an [`Analysis`] as JSON on
//! stdout:
//!
//! ```json
//! {
//!   "diagnostics": [
//!     {
//!       "severity": "error",
//!       "span": {"start": {"line": 3, "column": 5}, "end": {"line": 3, "column": 9}},
//!       "kind": "SyntaxError",
//!       "message": "expected ';'"
//!     }
//!   ],
//!   "symbols": [
//!     {"span": {"start": {"line": 1, "column": 5}, "end": {"line": 1, "column": 7}}, "type": "num"}
//!   ]
//! }
//! ```

use crate::analyzer::{Analysis, Analyzer};
use crate::error::{HmsError, Result};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Runs an analyzer executable and parses its JSON report.
#[derive(Debug, Clone)]
pub struct CommandAnalyzer {
    program: String,
    args: Vec<String>,
    name: String,
    version: String,
}

impl CommandAnalyzer {
    /// Creates an analyzer from a command line (program followed by arguments).
    ///
    /// Returns `None` if `command` is empty.
    pub fn new(
        command: &[String],
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Option<Self> {
        let (program, args) = command.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
            name: name.into(),
            version: version.into(),
        })
    }

    fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[async_trait]
impl Analyzer for CommandAnalyzer {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> &str {
        &self.version
    }

    async fn analyze(&self, content: &str, path: &str) -> Result<Analysis> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| HmsError::AnalyzerSpawn {
                command: self.command_line(),
                source,
            })?;

        // stdin is written while stdout is drained; either pipe can fill up.
        let writer = child.stdin.take().map(|mut stdin| {
            let input = content.to_owned();
            tokio::spawn(async move {
                stdin.write_all(input.as_bytes()).await?;
                stdin.shutdown().await
            })
        });

        let output = child.wait_with_output().await?;

        if let Some(writer) = writer {
            match writer.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                    tracing::debug!("analyzer closed stdin early: {}", e);
                }
                Ok(Err(e)) => return Err(HmsError::Io(e)),
                Err(e) => tracing::warn!("analyzer stdin writer panicked: {}", e),
            }
        }

        if !output.status.success() {
            return Err(HmsError::AnalyzerFailed {
                command: self.command_line(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let analysis = serde_json::from_slice::<Analysis>(&output.stdout)?;
        Ok(analysis)
    }
}
