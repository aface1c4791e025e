//
// backend.rs
//
// LSP front end: protocol plumbing around the world state
//

use std::sync::Arc;

use tokio::sync::RwLock;
use tower_lsp::jsonrpc::{Error, Result};
use tower_lsp::lsp_types::*;
use tower_lsp::Client;
use tower_lsp::LanguageServer;
use tower_lsp::LspService;
use tower_lsp::Server;

use crate::config::{parse_config, TandemConfig};
use crate::handlers;
use crate::language::Language;
use crate::presenter::{self, Presentation};
use crate::session::Direction;
use crate::state::WorldState;

pub struct Backend {
    client: Client,
    state: Arc<RwLock<WorldState>>,
}

impl Backend {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            state: Arc::new(RwLock::new(WorldState::new(TandemConfig::default()))),
        }
    }

    /// Send presentations in order. Must be called without holding the state lock.
    async fn present(&self, presentations: impl IntoIterator<Item = Presentation>) {
        for presentation in presentations {
            presenter::present(&self.client, presentation).await;
        }
    }
}

fn client_supports_show_document(params: &InitializeParams) -> bool {
    params
        .capabilities
        .window
        .as_ref()
        .and_then(|window| window.show_document.as_ref())
        .map(|show| show.support)
        .unwrap_or(false)
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        log::info!("Initializing tandem");

        {
            let mut state = self.state.write().await;
            state.client_supports_show_document = client_supports_show_document(&params);
            if let Some(config) = params.initialization_options.as_ref().and_then(parse_config) {
                state.apply_config(config);
            }
        }

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::INCREMENTAL,
                )),
                document_highlight_provider: Some(OneOf::Left(true)),
                code_action_provider: Some(CodeActionProviderCapability::Options(
                    CodeActionOptions {
                        code_action_kinds: Some(vec![CodeActionKind::REFACTOR_REWRITE]),
                        ..Default::default()
                    },
                )),
                execute_command_provider: Some(ExecuteCommandOptions {
                    commands: handlers::commands(),
                    ..Default::default()
                }),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: String::from("tandem"),
                version: Some(String::from(env!("CARGO_PKG_VERSION"))),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        log::info!("tandem initialized");
    }

    async fn shutdown(&self) -> Result<()> {
        log::info!("tandem shutting down");
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let doc = params.text_document;
        let language = Language::detect(&doc.language_id, &doc.uri);

        let mut state = self.state.write().await;
        state.open_document(doc.uri, &doc.text, language, Some(doc.version));
    }

    /// Apply each change in order and forward the resulting marks.
    ///
    /// If a change cannot be applied the server's copy of the buffer is no
    /// longer trustworthy, so the remaining changes are skipped and any marks
    /// are cleared.
    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let version = params.text_document.version;

        let presentations = {
            let mut state = self.state.write().await;
            let mut presentations = Vec::new();

            for change in params.content_changes {
                match state.apply_change(&uri, change) {
                    Ok(event) => presentations.extend(handlers::apply_watch_event(&mut state, event)),
                    Err(err) => {
                        log::error!("Failed to apply change to {}: {:#}", uri, err);
                        presentations.extend(handlers::clear(&mut state));
                        break;
                    }
                }
            }
            if let Some(doc) = state.documents.get_mut(&uri) {
                doc.version = Some(version);
            }
            presentations
        };

        self.present(presentations).await;
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        let presentation = {
            let mut state = self.state.write().await;
            let event = state.close_document(&uri);
            handlers::apply_watch_event(&mut state, event)
        };
        self.present(presentation).await;
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        let Some(config) = parse_config(&params.settings) else {
            log::debug!("Configuration change without a tandem section");
            return;
        };
        let presentation = {
            let mut state = self.state.write().await;
            let event = state.apply_config(config);
            handlers::apply_watch_event(&mut state, event)
        };
        self.present(presentation).await;
    }

    async fn document_highlight(
        &self,
        params: DocumentHighlightParams,
    ) -> Result<Option<Vec<DocumentHighlight>>> {
        let state = self.state.read().await;
        let position = params.text_document_position_params;
        Ok(handlers::document_highlight(
            &state,
            &position.text_document.uri,
            position.position,
        ))
    }

    async fn code_action(&self, params: CodeActionParams) -> Result<Option<CodeActionResponse>> {
        let state = self.state.read().await;
        Ok(handlers::code_actions(&state, &params.text_document.uri))
    }

    async fn execute_command(
        &self,
        params: ExecuteCommandParams,
    ) -> Result<Option<serde_json::Value>> {
        log::debug!("Executing command {}", params.command);

        let (presentation, location) = {
            let mut state = self.state.write().await;
            let presentation = match params.command.as_str() {
                handlers::NEXT_OCCURRENCE => handlers::navigate(&mut state, Direction::Next),
                handlers::PREVIOUS_OCCURRENCE => handlers::navigate(&mut state, Direction::Previous),
                handlers::CLEAR_HIGHLIGHTS => handlers::clear(&mut state),
                other => {
                    return Err(Error::invalid_params(format!("Unknown command: {}", other)));
                }
            };
            (presentation, handlers::focused_location(&state))
        };
        self.present(presentation).await;

        Ok(location.and_then(|location| serde_json::to_value(location).ok()))
    }
}

pub async fn start_lsp() -> anyhow::Result<()> {
    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(Backend::new);
    Server::new(stdin, stdout, socket).serve(service).await;

    Ok(())
}
