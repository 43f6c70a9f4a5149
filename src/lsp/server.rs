//! Main Language Server Protocol server implementation for wpifmt.
//!
//! The server owns all presentation state for its lifetime: the client
//! handle used for diagnostics, progress, and messages, the open-document
//! store, and the per-file invocation bookkeeping. Formatting runs on
//! `textDocument/didSave` for eligible workspaces and on the explicit
//! `wpifmt.formatFile` command; line-ending normalization runs in
//! `textDocument/willSaveWaitUntil` independently of either.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::RwLock;
use tower_lsp::jsonrpc::Result as JsonRpcResult;
use tower_lsp::lsp_types::notification::Progress;
use tower_lsp::lsp_types::request::WorkDoneProgressCreate;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};

use crate::config::Config;
use crate::invoke::InvokeError;
use crate::lsp::types::{FORMAT_FILE_COMMAND, file_error_to_diagnostic, replace_whole_document};
use crate::{decode, eol, invoke, repo};

/// LSP server wrapping the external wpiformat tool.
pub struct WpifmtLanguageServer {
    client: Client,
    /// Current settings, replaced wholesale on configuration changes.
    config: Arc<RwLock<Config>>,
    /// Open documents, kept in full-text sync with the client.
    documents: Arc<RwLock<HashMap<Url, String>>>,
    /// Roots of the open workspace folders.
    workspace_folders: Arc<RwLock<Vec<PathBuf>>>,
    /// Per-file invocation counter. A completion whose generation is no
    /// longer current belongs to a superseded request and drops its results.
    generations: Arc<RwLock<HashMap<Url, u64>>>,
}

impl WpifmtLanguageServer {
    pub fn new(client: Client) -> Self {
        Self::with_config(client, Config::default())
    }

    pub fn with_config(client: Client, config: Config) -> Self {
        Self {
            client,
            config: Arc::new(RwLock::new(config)),
            documents: Arc::new(RwLock::new(HashMap::new())),
            workspace_folders: Arc::new(RwLock::new(Vec::new())),
            generations: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Whether a save of `uri` should trigger the formatter.
    ///
    /// Rules short-circuit in order: the save hook must be enabled, a
    /// workspace folder must be open, and the folder containing the document
    /// must carry a `.styleguide` marker at its root.
    async fn should_format_on_save(&self, uri: &Url) -> bool {
        if !self.config.read().await.run_format_on_save {
            return false;
        }

        let folders = self.workspace_folders.read().await;
        if folders.is_empty() {
            return false;
        }

        let Ok(path) = uri.to_file_path() else {
            return false;
        };
        folders
            .iter()
            .any(|folder| path.starts_with(folder) && repo::has_style_guide(folder))
    }

    async fn next_generation(&self, uri: &Url) -> u64 {
        let mut generations = self.generations.write().await;
        let counter = generations.entry(uri.clone()).or_insert(0);
        *counter += 1;
        *counter
    }

    async fn is_current(&self, uri: &Url, generation: u64) -> bool {
        self.generations.read().await.get(uri).copied() == Some(generation)
    }

    /// Show the busy indicator for one formatter run.
    async fn begin_busy(&self, token: NumberOrString) {
        if self
            .client
            .send_request::<WorkDoneProgressCreate>(WorkDoneProgressCreateParams { token: token.clone() })
            .await
            .is_err()
        {
            log::debug!("client does not support work done progress");
            return;
        }

        self.client
            .send_notification::<Progress>(ProgressParams {
                token,
                value: ProgressParamsValue::WorkDone(WorkDoneProgress::Begin(WorkDoneProgressBegin {
                    title: "Running wpiformat".to_string(),
                    cancellable: Some(false),
                    message: None,
                    percentage: None,
                })),
            })
            .await;
    }

    /// Hide the busy indicator, success or failure alike.
    async fn end_busy(&self, token: NumberOrString) {
        self.client
            .send_notification::<Progress>(ProgressParams {
                token,
                value: ProgressParamsValue::WorkDone(WorkDoneProgress::End(WorkDoneProgressEnd { message: None })),
            })
            .await;
    }

    /// Persist the server's buffer for `uri` to disk before formatting.
    async fn flush_document(&self, uri: &Url) {
        let Ok(path) = uri.to_file_path() else {
            return;
        };
        let text = self.documents.read().await.get(uri).cloned();
        let Some(text) = text else {
            return;
        };
        if let Err(e) = tokio::fs::write(&path, &text).await {
            log::warn!("failed to save {} before formatting: {e}", path.display());
        }
    }

    /// Run the formatter against `uri` and reflect the outcome back to the
    /// client: diagnostics replaced wholesale, error pop-ups for the two
    /// missing-tool conditions, busy indicator around the whole run.
    async fn format_file(&self, uri: Url) {
        let Ok(file) = uri.to_file_path() else {
            log::warn!("cannot format non-file URI {uri}");
            return;
        };

        let Some(root) = repo::find_repo_root(&file) else {
            self.client
                .show_message(MessageType::ERROR, "File is not in a git repo")
                .await;
            return;
        };

        let tool = self.config.read().await.tool.clone();
        let generation = self.next_generation(&uri).await;
        let token = NumberOrString::String(format!("wpifmt/format/{generation}"));

        self.begin_busy(token.clone()).await;
        let result = invoke::run_formatter(&tool, &root, &file).await;
        self.end_busy(token).await;

        if !self.is_current(&uri, generation).await {
            log::debug!("dropping superseded formatter result for {uri}");
            return;
        }

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e @ InvokeError::ToolMissing) => {
                self.client.show_message(MessageType::ERROR, e.to_string()).await;
                return;
            }
            Err(e) => {
                log::error!("formatter run failed for {uri}: {e}");
                self.client.show_message(MessageType::ERROR, e.to_string()).await;
                return;
            }
        };

        if outcome.success() {
            self.client.publish_diagnostics(uri, Vec::new(), None).await;
            return;
        }

        if decode::clang_format_missing(&outcome.stderr) {
            self.client
                .show_message(MessageType::ERROR, decode::CLANG_FORMAT_MISSING_FRAGMENT)
                .await;
        }
        if decode::wpiformat_missing(&outcome.stderr) {
            // No structured output can exist in this case, so decoding stops
            // here; diagnostics for the file stay cleared.
            self.client
                .show_message(MessageType::ERROR, "wpiformat was not found in PATH. Is it installed?")
                .await;
            self.client.publish_diagnostics(uri, Vec::new(), None).await;
            return;
        }

        let decoded = decode::decode_file_errors(&outcome.stderr, &file.to_string_lossy());
        if decoded.malformed > 0 {
            log::warn!(
                "{} stderr line(s) referencing {} had a non-numeric line field",
                decoded.malformed,
                file.display()
            );
        }

        let diagnostics: Vec<Diagnostic> = decoded.errors.iter().map(file_error_to_diagnostic).collect();
        self.client.publish_diagnostics(uri, diagnostics, None).await;
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for WpifmtLanguageServer {
    #[allow(deprecated)]
    async fn initialize(&self, params: InitializeParams) -> JsonRpcResult<InitializeResult> {
        log::info!("initializing wpifmt language server");

        if let Some(options) = params.initialization_options {
            self.config.write().await.apply_json(&options);
        }

        let mut folders = Vec::new();
        if let Some(workspace_folders) = params.workspace_folders {
            folders.extend(workspace_folders.into_iter().filter_map(|f| f.uri.to_file_path().ok()));
        } else if let Some(root_uri) = params.root_uri {
            if let Ok(path) = root_uri.to_file_path() {
                folders.push(path);
            }
        }
        *self.workspace_folders.write().await = folders;

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Options(TextDocumentSyncOptions {
                    open_close: Some(true),
                    change: Some(TextDocumentSyncKind::FULL),
                    will_save: None,
                    will_save_wait_until: Some(true),
                    save: Some(TextDocumentSyncSaveOptions::SaveOptions(SaveOptions {
                        include_text: Some(true),
                    })),
                })),
                execute_command_provider: Some(ExecuteCommandOptions {
                    commands: vec![FORMAT_FILE_COMMAND.to_string()],
                    work_done_progress_options: WorkDoneProgressOptions::default(),
                }),
                workspace: Some(WorkspaceServerCapabilities {
                    workspace_folders: Some(WorkspaceFoldersServerCapabilities {
                        supported: Some(true),
                        change_notifications: Some(OneOf::Left(true)),
                    }),
                    file_operations: None,
                }),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "wpifmt".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        log::info!("wpifmt language server initialized");

        self.client
            .log_message(MessageType::INFO, "wpifmt language server started")
            .await;
    }

    async fn shutdown(&self) -> JsonRpcResult<()> {
        log::info!("shutting down wpifmt language server");
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        self.documents
            .write()
            .await
            .insert(params.text_document.uri, params.text_document.text);
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        // Full sync: the change carries the whole document.
        if let Some(change) = params.content_changes.into_iter().next() {
            self.documents
                .write()
                .await
                .insert(params.text_document.uri, change.text);
        }
    }

    async fn will_save_wait_until(&self, params: WillSaveTextDocumentParams) -> JsonRpcResult<Option<Vec<TextEdit>>> {
        let config = self.config.read().await;
        if !config.force_lf_on_save {
            return Ok(None);
        }
        let ignore = eol::build_ignore_set(&config.ignore_force_lf_save_files);
        drop(config);

        let uri = params.text_document.uri;
        let file_name = uri
            .to_file_path()
            .ok()
            .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()));
        let Some(file_name) = file_name else {
            return Ok(None);
        };
        if ignore.is_match(&file_name) {
            return Ok(None);
        }

        let documents = self.documents.read().await;
        let Some(text) = documents.get(&uri) else {
            return Ok(None);
        };
        if !eol::has_crlf(text) {
            return Ok(None);
        }

        Ok(Some(vec![replace_whole_document(text, eol::normalize_line_endings(text))]))
    }

    async fn did_save(&self, params: DidSaveTextDocumentParams) {
        let uri = params.text_document.uri;

        if let Some(text) = params.text {
            self.documents.write().await.insert(uri.clone(), text);
        }

        if !self.should_format_on_save(&uri).await {
            log::debug!("save of {uri} is not eligible for formatting");
            return;
        }

        self.format_file(uri).await;
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        self.documents.write().await.remove(&params.text_document.uri);

        self.client
            .publish_diagnostics(params.text_document.uri, Vec::new(), None)
            .await;
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        let mut config = self.config.write().await;
        if config.apply_json(&params.settings) {
            return;
        }
        // Some clients wrap the settings in their section name.
        if let Some(section) = params.settings.get("wpifmt") {
            config.apply_json(section);
        }
    }

    async fn did_change_workspace_folders(&self, params: DidChangeWorkspaceFoldersParams) {
        let mut folders = self.workspace_folders.write().await;
        for removed in params.event.removed {
            if let Ok(path) = removed.uri.to_file_path() {
                folders.retain(|folder| folder != &path);
            }
        }
        for added in params.event.added {
            if let Ok(path) = added.uri.to_file_path()
                && !folders.contains(&path)
            {
                folders.push(path);
            }
        }
    }

    async fn execute_command(&self, params: ExecuteCommandParams) -> JsonRpcResult<Option<serde_json::Value>> {
        if params.command != FORMAT_FILE_COMMAND {
            log::warn!("unknown command {}", params.command);
            return Ok(None);
        }

        let Some(argument) = params.arguments.first() else {
            log::warn!("{FORMAT_FILE_COMMAND} called without a document argument");
            return Ok(None);
        };
        let Ok(uri) = serde_json::from_value::<Url>(argument.clone()) else {
            log::warn!("{FORMAT_FILE_COMMAND} argument is not a document URI: {argument}");
            return Ok(None);
        };

        if self.config.read().await.save_on_format_request {
            self.flush_document(&uri).await;
        }

        self.format_file(uri).await;
        Ok(None)
    }
}
