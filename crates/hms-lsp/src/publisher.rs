//! Fire-and-forget diagnostics publication.
//!
//! Handlers queue a [`PublishRequest`] and move on; a single background task
//! delivers requests in queue order. Each request carries the revision of the
//! content it was computed from, and a request that is not newer than the last
//! one delivered for the same path is dropped, so an old snapshot can never
//! overwrite a newer one on the editor side.

use std::collections::HashMap;
use std::future::Future;
use tokio::sync::mpsc;
use tower_lsp_server::Client;
use tower_lsp_server::ls_types::{Diagnostic, Uri};

/// Diagnostics for one document snapshot.
#[derive(Debug, Clone)]
pub struct PublishRequest {
    pub uri: Uri,
    pub path: String,
    pub revision: u64,
    pub diagnostics: Vec<Diagnostic>,
}

/// Remembers the last delivered revision per path.
///
/// Entries are kept after close: revisions come from a store-wide counter, so
/// a reopened path starts above its old entry.
#[derive(Debug, Default)]
pub struct RevisionTracker {
    published: HashMap<String, u64>,
}

impl RevisionTracker {
    /// Returns true if `revision` is newer than anything delivered for `path`,
    /// and records it.
    pub fn admit(&mut self, path: &str, revision: u64) -> bool {
        match self.published.get_mut(path) {
            Some(last) if *last >= revision => false,
            Some(last) => {
                *last = revision;
                true
            }
            None => {
                self.published.insert(path.to_string(), revision);
                true
            }
        }
    }
}

/// Handle for queueing diagnostics.
#[derive(Debug, Clone)]
pub struct DiagnosticsPublisher {
    sender: mpsc::UnboundedSender<PublishRequest>,
}

impl DiagnosticsPublisher {
    /// Starts a publisher that sends `textDocument/publishDiagnostics` to `client`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(client: Client) -> Self {
        Self::with_sink(move |request: PublishRequest| {
            let client = client.clone();
            async move {
                client
                    .publish_diagnostics(request.uri, request.diagnostics, None)
                    .await;
            }
        })
    }

    /// Starts a publisher that hands admitted requests to `sink`.
    pub fn with_sink<F, Fut>(sink: F) -> Self
    where
        F: FnMut(PublishRequest) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (sender, receiver) = mpsc::unbounded_channel();
        tokio::spawn(deliver(receiver, sink));
        Self { sender }
    }

    /// Queues a request without waiting for delivery.
    pub fn publish(&self, request: PublishRequest) {
        if let Err(e) = self.sender.send(request) {
            tracing::warn!(
                "diagnostics publisher stopped, dropping revision {} for {}",
                e.0.revision,
                e.0.path
            );
        }
    }
}

async fn deliver<F, Fut>(mut receiver: mpsc::UnboundedReceiver<PublishRequest>, mut sink: F)
where
    F: FnMut(PublishRequest) -> Fut,
    Fut: Future<Output = ()>,
{
    let mut tracker = RevisionTracker::default();

    while let Some(request) = receiver.recv().await {
        if !tracker.admit(&request.path, request.revision) {
            tracing::debug!(
                "dropping stale diagnostics for {} (revision {})",
                request.path,
                request.revision
            );
            continue;
        }

        tracing::debug!(
            "publishing {} diagnostics for {} (revision {})",
            request.diagnostics.len(),
            request.path,
            request.revision
        );
        sink(request).await;
    }

    tracing::debug!("diagnostics publisher finished");
}
