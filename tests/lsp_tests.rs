//! Tests for the wpifmt Language Server Protocol implementation: server
//! capabilities, configuration via initialization options, document
//! bookkeeping, and the pre-save line-ending normalization.

#![allow(deprecated)]

use std::fs;

use serde_json::json;
use tower_lsp::lsp_types::*;
use tower_lsp::{LanguageServer, LspService};

use wpifmt_lib::lsp::WpifmtLanguageServer;
use wpifmt_lib::lsp::types::FORMAT_FILE_COMMAND;

fn init_params(options: Option<serde_json::Value>, folders: Option<Vec<WorkspaceFolder>>) -> InitializeParams {
    InitializeParams {
        initialization_options: options,
        workspace_folders: folders,
        ..Default::default()
    }
}

fn open_document(uri: &Url, text: &str) -> DidOpenTextDocumentParams {
    DidOpenTextDocumentParams {
        text_document: TextDocumentItem {
            uri: uri.clone(),
            language_id: "cpp".to_string(),
            version: 1,
            text: text.to_string(),
        },
    }
}

fn will_save(uri: &Url) -> WillSaveTextDocumentParams {
    WillSaveTextDocumentParams {
        text_document: TextDocumentIdentifier { uri: uri.clone() },
        reason: TextDocumentSaveReason::MANUAL,
    }
}

#[tokio::test]
async fn initialize_reports_capabilities() {
    let (service, _socket) = LspService::new(WpifmtLanguageServer::new);

    let result = service.inner().initialize(init_params(None, None)).await.unwrap();

    let caps = result.capabilities;
    let Some(TextDocumentSyncCapability::Options(sync)) = caps.text_document_sync else {
        panic!("expected text document sync options");
    };
    assert_eq!(sync.change, Some(TextDocumentSyncKind::FULL));
    assert_eq!(sync.will_save_wait_until, Some(true));

    let exec = caps.execute_command_provider.expect("executeCommand capability");
    assert_eq!(exec.commands, vec![FORMAT_FILE_COMMAND.to_string()]);

    let info = result.server_info.expect("server info");
    assert_eq!(info.name, "wpifmt");
    assert!(info.version.is_some());
}

#[tokio::test]
async fn will_save_returns_lf_normalization_edit() {
    let (service, _socket) = LspService::new(WpifmtLanguageServer::new);
    let server = service.inner();
    server
        .initialize(init_params(Some(json!({ "forceLFOnSave": true })), None))
        .await
        .unwrap();
    server.initialized(InitializedParams {}).await;

    let uri = Url::parse("file:///work/a.txt").unwrap();
    server.did_open(open_document(&uri, "one\r\ntwo\r\n")).await;

    let edits = server
        .will_save_wait_until(will_save(&uri))
        .await
        .unwrap()
        .expect("a normalization edit");
    assert_eq!(edits.len(), 1);
    assert_eq!(edits[0].new_text, "one\ntwo\n");
    assert_eq!(edits[0].range.start, Position { line: 0, character: 0 });
}

#[tokio::test]
async fn will_save_skips_files_in_the_ignore_list() {
    let (service, _socket) = LspService::new(WpifmtLanguageServer::new);
    let server = service.inner();
    server
        .initialize(init_params(
            Some(json!({
                "forceLFOnSave": true,
                "ignoreForceLFSaveFiles": ["*.txt"],
            })),
            None,
        ))
        .await
        .unwrap();

    let uri = Url::parse("file:///work/a.txt").unwrap();
    server.did_open(open_document(&uri, "one\r\ntwo\r\n")).await;

    assert_eq!(server.will_save_wait_until(will_save(&uri)).await.unwrap(), None);
}

#[tokio::test]
async fn will_save_leaves_lf_documents_alone() {
    let (service, _socket) = LspService::new(WpifmtLanguageServer::new);
    let server = service.inner();
    server
        .initialize(init_params(Some(json!({ "forceLFOnSave": true })), None))
        .await
        .unwrap();

    let uri = Url::parse("file:///work/a.txt").unwrap();
    server.did_open(open_document(&uri, "one\ntwo\n")).await;

    assert_eq!(server.will_save_wait_until(will_save(&uri)).await.unwrap(), None);
}

#[tokio::test]
async fn will_save_is_off_by_default() {
    let (service, _socket) = LspService::new(WpifmtLanguageServer::new);
    let server = service.inner();
    server.initialize(init_params(None, None)).await.unwrap();

    let uri = Url::parse("file:///work/a.txt").unwrap();
    server.did_open(open_document(&uri, "one\r\ntwo\r\n")).await;

    assert_eq!(server.will_save_wait_until(will_save(&uri)).await.unwrap(), None);
}

#[tokio::test]
async fn did_change_replaces_the_stored_text() {
    let (service, _socket) = LspService::new(WpifmtLanguageServer::new);
    let server = service.inner();
    server
        .initialize(init_params(Some(json!({ "forceLFOnSave": true })), None))
        .await
        .unwrap();

    let uri = Url::parse("file:///work/a.txt").unwrap();
    server.did_open(open_document(&uri, "one\r\ntwo\r\n")).await;
    server
        .did_change(DidChangeTextDocumentParams {
            text_document: VersionedTextDocumentIdentifier {
                uri: uri.clone(),
                version: 2,
            },
            content_changes: vec![TextDocumentContentChangeEvent {
                range: None,
                range_length: None,
                text: "one\ntwo\n".to_string(),
            }],
        })
        .await;

    // Once the buffer is LF-only there is nothing to normalize.
    assert_eq!(server.will_save_wait_until(will_save(&uri)).await.unwrap(), None);
}

#[tokio::test]
async fn closed_documents_are_forgotten() {
    let (service, _socket) = LspService::new(WpifmtLanguageServer::new);
    let server = service.inner();
    server
        .initialize(init_params(Some(json!({ "forceLFOnSave": true })), None))
        .await
        .unwrap();

    let uri = Url::parse("file:///work/a.txt").unwrap();
    server.did_open(open_document(&uri, "one\r\ntwo\r\n")).await;
    server
        .did_close(DidCloseTextDocumentParams {
            text_document: TextDocumentIdentifier { uri: uri.clone() },
        })
        .await;

    assert_eq!(server.will_save_wait_until(will_save(&uri)).await.unwrap(), None);
}

#[tokio::test]
async fn save_without_style_guide_is_ignored() {
    let temp = tempfile::tempdir().unwrap();
    let root = temp.path().canonicalize().unwrap();
    fs::create_dir(root.join(".git")).unwrap();
    let file = root.join("a.cpp");
    fs::write(&file, "").unwrap();

    let (service, _socket) = LspService::new(WpifmtLanguageServer::new);
    let server = service.inner();
    server
        .initialize(init_params(
            None,
            Some(vec![WorkspaceFolder {
                uri: Url::from_file_path(&root).unwrap(),
                name: "ws".to_string(),
            }]),
        ))
        .await
        .unwrap();

    // No .styleguide marker in the folder: the save must complete without
    // any formatter run.
    server
        .did_save(DidSaveTextDocumentParams {
            text_document: TextDocumentIdentifier {
                uri: Url::from_file_path(&file).unwrap(),
            },
            text: None,
        })
        .await;
}

#[cfg(unix)]
#[tokio::test]
async fn disabled_format_on_save_never_runs_the_tool() {
    use std::os::unix::fs::PermissionsExt;

    let temp = tempfile::tempdir().unwrap();
    let root = temp.path().canonicalize().unwrap();
    fs::create_dir(root.join(".git")).unwrap();
    fs::write(root.join(".styleguide"), "").unwrap();
    let file = root.join("a.cpp");
    fs::write(&file, "").unwrap();

    // A stub that leaves a footprint if it ever runs.
    let tool = root.join("fake-wpiformat");
    fs::write(&tool, "#!/bin/sh\ntouch ran.txt\nexit 0\n").unwrap();
    let mut perms = fs::metadata(&tool).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&tool, perms).unwrap();

    let (service, _socket) = LspService::new(WpifmtLanguageServer::new);
    let server = service.inner();
    server
        .initialize(init_params(
            Some(json!({
                "runFormatOnSave": false,
                "tool": tool.to_string_lossy(),
            })),
            Some(vec![WorkspaceFolder {
                uri: Url::from_file_path(&root).unwrap(),
                name: "ws".to_string(),
            }]),
        ))
        .await
        .unwrap();

    server
        .did_save(DidSaveTextDocumentParams {
            text_document: TextDocumentIdentifier {
                uri: Url::from_file_path(&file).unwrap(),
            },
            text: None,
        })
        .await;

    assert!(!root.join("ran.txt").exists());
}

#[tokio::test]
async fn unknown_command_is_a_no_op() {
    let (service, _socket) = LspService::new(WpifmtLanguageServer::new);
    let server = service.inner();
    server.initialize(init_params(None, None)).await.unwrap();

    let result = server
        .execute_command(ExecuteCommandParams {
            command: "wpifmt.somethingElse".to_string(),
            arguments: vec![],
            work_done_progress_params: WorkDoneProgressParams::default(),
        })
        .await
        .unwrap();

    assert!(result.is_none());
}
