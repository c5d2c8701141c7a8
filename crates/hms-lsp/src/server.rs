use crate::config::HmsConfig;
use crate::document::{
    ChangeOp, ServerState, handle_document_change, handle_document_close, handle_document_open,
};
use crate::handlers::hover;
use crate::publisher::DiagnosticsPublisher;
use std::sync::Arc;
use tower_lsp_server::ls_types::{
    DidChangeTextDocumentParams, DidCloseTextDocumentParams, DidOpenTextDocumentParams, Hover,
    HoverParams, HoverProviderCapability, InitializeParams, InitializeResult, InitializedParams,
    MessageType, ServerCapabilities, ServerInfo, TextDocumentSyncCapability, TextDocumentSyncKind,
    TextDocumentSyncOptions,
};
use tower_lsp_server::{Client, LanguageServer, jsonrpc::Result};

pub struct Backend {
    client: Client,
    state: Arc<ServerState>,
    publisher: DiagnosticsPublisher,
}

impl Backend {
    /// Creates the backend and starts its diagnostics publisher.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(client: Client) -> Self {
        Self {
            publisher: DiagnosticsPublisher::new(client.clone()),
            client,
            state: Arc::new(ServerState::new()),
        }
    }

    fn server_capabilities() -> ServerCapabilities {
        ServerCapabilities {
            text_document_sync: Some(TextDocumentSyncCapability::Options(
                TextDocumentSyncOptions {
                    open_close: Some(true),
                    change: Some(TextDocumentSyncKind::INCREMENTAL),
                    ..Default::default()
                },
            )),
            hover_provider: Some(HoverProviderCapability::Simple(true)),
            ..Default::default()
        }
    }
}

impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        tracing::info!("initializing hms-lsp server");

        let config = match params.initialization_options {
            Some(init_options) => match serde_json::from_value::<HmsConfig>(init_options) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("invalid initialization options, using defaults: {}", e);
                    HmsConfig::default()
                }
            },
            None => HmsConfig::default(),
        };
        tracing::debug!("loaded configuration: {:?}", config);

        self.state
            .configure(config.analyzer.build(), config.diagnostics.change_delay());

        Ok(InitializeResult {
            capabilities: Self::server_capabilities(),
            server_info: Some(ServerInfo {
                name: "hms-lsp".into(),
                version: Some(env!("CARGO_PKG_VERSION").into()),
            }),
            offset_encoding: None,
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        tracing::info!("hms-lsp server initialized");
        self.client
            .log_message(MessageType::INFO, "hms-lsp ready")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        tracing::info!("shutting down hms-lsp server");
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri;
        tracing::debug!("document opened: {:?}", uri);

        if let Err(e) = handle_document_open(
            uri.clone(),
            params.text_document.text,
            &self.state,
            &self.publisher,
        )
        .await
        {
            tracing::error!("failed to open document {:?}: {}", uri, e);
            self.client
                .log_message(MessageType::ERROR, format!("Cannot open document: {e}"))
                .await;
        }
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let changes: Vec<ChangeOp> = params
            .content_changes
            .into_iter()
            .map(ChangeOp::from)
            .collect();

        handle_document_change(
            &params.text_document.uri,
            changes,
            &self.state,
            &self.publisher,
        )
        .await;
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        tracing::debug!("document closed: {:?}", uri);

        handle_document_close(&uri, &self.state, &self.publisher).await;
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        Ok(hover::handle_hover(&self.state, params).await)
    }
}
