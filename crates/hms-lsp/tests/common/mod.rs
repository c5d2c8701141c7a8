//! Common test utilities for integration tests.
//!
//! This module provides shared infrastructure for LSP integration tests,
//! including the `LspClient` for communicating with the server binary.

use serde_json::{Value, json};
use std::collections::VecDeque;
use std::io::{BufRead, BufReader, Read, Write};
use std::process::{Child, Command, Stdio};

/// LSP test client for communicating with the server binary.
pub(crate) struct LspClient {
    process: Child,
    /// Notifications received while waiting for something else, oldest first.
    pending: VecDeque<Value>,
    reader: BufReader<std::process::ChildStdout>,
    next_id: i64,
}

impl LspClient {
    /// Spawn the hms-lsp binary.
    pub(crate) fn spawn() -> Self {
        let mut process = Command::new(env!("CARGO_BIN_EXE_hms-lsp"))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .expect("Failed to spawn hms-lsp binary");

        let stdout = process.stdout.take().expect("Failed to capture stdout");

        Self {
            process,
            pending: VecDeque::new(),
            reader: BufReader::new(stdout),
            next_id: 1,
        }
    }

    /// Send a JSON-RPC message to the server.
    pub(crate) fn send(&mut self, message: &Value) {
        let body = serde_json::to_string(message).unwrap();
        let header = format!("Content-Length: {}\r\n\r\n", body.len());

        let stdin = self.process.stdin.as_mut().expect("stdin not captured");
        stdin.write_all(header.as_bytes()).unwrap();
        stdin.write_all(body.as_bytes()).unwrap();
        stdin.flush().unwrap();
    }

    fn notify(&mut self, method: &str, params: Value) {
        self.send(&json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params
        }));
    }

    fn request(&mut self, method: &str, params: Value) -> Value {
        let id = self.next_id;
        self.next_id += 1;
        self.send(&json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params
        }));
        self.read_response(id)
    }

    /// Read one framed message from the server.
    fn read_message(&mut self) -> Value {
        loop {
            let mut content_length = 0;
            loop {
                let mut line = String::new();
                let bytes_read = self
                    .reader
                    .read_line(&mut line)
                    .expect("Failed to read header");

                // EOF - server closed connection
                assert!(bytes_read != 0, "Server closed connection unexpectedly");

                if line == "\r\n" || line == "\n" {
                    break;
                }

                if line.to_lowercase().starts_with("content-length:") {
                    content_length = line
                        .split(':')
                        .nth(1)
                        .unwrap()
                        .trim()
                        .parse()
                        .expect("Invalid content length");
                }
            }

            if content_length == 0 {
                continue;
            }

            let mut body = vec![0u8; content_length];
            self.reader
                .read_exact(&mut body)
                .expect("Failed to read body");

            return serde_json::from_slice(&body).unwrap_or_else(|e| {
                panic!("Invalid JSON: {e} in: {:?}", String::from_utf8_lossy(&body))
            });
        }
    }

    /// Read until the response with `id`, queueing notifications on the way.
    pub(crate) fn read_response(&mut self, id: i64) -> Value {
        loop {
            let message = self.read_message();
            match message.get("id") {
                Some(found) if *found == json!(id) => return message,
                Some(_) => {}
                None => self.pending.push_back(message),
            }
        }
    }

    /// Wait for the first notification with `method` whose params match `filter`.
    ///
    /// Already received notifications are checked first; the returned one is
    /// consumed, the rest stay queued.
    pub(crate) fn wait_for_notification(
        &mut self,
        method: &str,
        filter: impl Fn(&Value) -> bool,
    ) -> Value {
        let matches = |message: &Value| {
            message.get("method").and_then(Value::as_str) == Some(method)
                && filter(&message["params"])
        };

        if let Some(idx) = self.pending.iter().position(|m| matches(m)) {
            return self.pending.remove(idx).unwrap()["params"].clone();
        }

        loop {
            let message = self.read_message();
            if message.get("id").is_some() {
                continue;
            }
            if matches(&message) {
                return message["params"].clone();
            }
            self.pending.push_back(message);
        }
    }

    /// Wait for the next `publishDiagnostics` for `uri` and return its items.
    pub(crate) fn next_diagnostics(&mut self, uri: &str) -> Vec<Value> {
        let params = self.wait_for_notification("textDocument/publishDiagnostics", |params| {
            params["uri"] == json!(uri)
        });
        params["diagnostics"]
            .as_array()
            .cloned()
            .expect("diagnostics should be an array")
    }

    /// Initialize the LSP session with the given initialization options.
    pub(crate) fn initialize(&mut self, options: Value) -> Value {
        let response = self.request(
            "initialize",
            json!({
                "processId": null,
                "capabilities": {
                    "textDocument": {
                        "hover": {
                            "contentFormat": ["markdown", "plaintext"]
                        },
                        "publishDiagnostics": {}
                    }
                },
                "rootUri": "file:///tmp",
                "workspaceFolders": null,
                "initializationOptions": options
            }),
        );

        self.notify("initialized", json!({}));

        response
    }

    /// Open a text document.
    pub(crate) fn did_open(&mut self, uri: &str, text: &str) {
        self.notify(
            "textDocument/didOpen",
            json!({
                "textDocument": {
                    "uri": uri,
                    "languageId": "homescript",
                    "version": 1,
                    "text": text
                }
            }),
        );
    }

    /// Send incremental changes, each `(start, end, text)` with
    /// `(line, character)` positions.
    pub(crate) fn did_change(
        &mut self,
        uri: &str,
        version: i32,
        changes: &[((u32, u32), (u32, u32), &str)],
    ) {
        let content_changes: Vec<Value> = changes
            .iter()
            .map(|(start, end, text)| {
                json!({
                    "range": {
                        "start": {"line": start.0, "character": start.1},
                        "end": {"line": end.0, "character": end.1}
                    },
                    "text": text
                })
            })
            .collect();

        self.notify(
            "textDocument/didChange",
            json!({
                "textDocument": {"uri": uri, "version": version},
                "contentChanges": content_changes
            }),
        );
    }

    /// Close a text document.
    #[allow(dead_code)] // Not used in all tests
    pub(crate) fn did_close(&mut self, uri: &str) {
        self.notify(
            "textDocument/didClose",
            json!({ "textDocument": {"uri": uri} }),
        );
    }

    /// Request hover information.
    #[allow(dead_code)] // Not used in all tests
    pub(crate) fn hover(&mut self, uri: &str, line: u32, character: u32) -> Value {
        self.request(
            "textDocument/hover",
            json!({
                "textDocument": {"uri": uri},
                "position": {"line": line, "character": character}
            }),
        )
    }

    /// Shutdown the server.
    pub(crate) fn shutdown(&mut self) -> Value {
        self.send(&json!({
            "jsonrpc": "2.0",
            "id": 999,
            "method": "shutdown"
        }));
        self.read_response(999)
    }
}

impl Drop for LspClient {
    fn drop(&mut self) {
        let _ = self.process.kill();
    }
}

/// Initialization options for a `sh` analyzer that reports one error on
/// `bad` (line 1, columns 12-15) and the type of `lamp` (line 1, columns 5-9).
pub(crate) fn sh_analyzer_options() -> Value {
    let script = r#"content=$(cat)
case "$content" in
  *bad*) printf '%s' '{"diagnostics":[{"severity":"error","span":{"start":{"line":1,"column":12},"end":{"line":1,"column":15}},"kind":"ReferenceError","message":"use of undefined variable bad"}],"symbols":[]}' ;;
  *) printf '%s' '{"diagnostics":[],"symbols":[{"span":{"start":{"line":1,"column":5},"end":{"line":1,"column":9}},"type":"int"}]}' ;;
esac"#;

    json!({
        "analyzer": {
            "command": ["sh", "-c", script, "hms-analyzer"],
            "name": "Homescript",
            "version": "2.0.0"
        },
        "diagnostics": { "change_delay_ms": 0 }
    })
}
