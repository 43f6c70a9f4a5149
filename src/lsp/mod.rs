//! Language Server Protocol implementation for wpifmt.
//!
//! This is the editor-facing half of the integration: editors launch
//! `wpifmt server` and talk to it over stdio. The server runs wpiformat on
//! save and on request, publishes the decoded diagnostics, and applies
//! pre-save line-ending normalization.

pub mod server;
pub mod types;

pub use server::WpifmtLanguageServer;
pub use types::{FORMAT_FILE_COMMAND, file_error_to_diagnostic};

use std::path::Path;

use anyhow::Result;
use tokio::net::TcpListener;
use tower_lsp::{LspService, Server};

use crate::config::Config;

/// Start the LSP server over stdio. Entry point for `wpifmt server`.
pub async fn start_server(config_path: Option<&str>) -> Result<()> {
    let config = load_startup_config(config_path)?;

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(move |client| WpifmtLanguageServer::with_config(client, config));

    log::info!("starting wpifmt language server");

    Server::new(stdin, stdout, socket).serve(service).await;

    Ok(())
}

/// Start the LSP server over TCP (useful for debugging).
pub async fn start_tcp_server(port: u16, config_path: Option<&str>) -> Result<()> {
    let config = load_startup_config(config_path)?;

    let listener = TcpListener::bind(format!("127.0.0.1:{port}")).await?;
    log::info!("wpifmt LSP server listening on 127.0.0.1:{port}");

    loop {
        let (stream, _) = listener.accept().await?;
        let config = config.clone();
        let (service, socket) = LspService::new(move |client| WpifmtLanguageServer::with_config(client, config));

        tokio::spawn(async move {
            let (read, write) = tokio::io::split(stream);
            Server::new(read, write, socket).serve(service).await;
        });
    }
}

/// Resolve the configuration the server starts with; initialization options
/// from the client may replace it once the session begins.
fn load_startup_config(config_path: Option<&str>) -> Result<Config> {
    let cwd = std::env::current_dir()?;
    let config = Config::load(config_path.map(Path::new), &cwd)?;
    Ok(config)
}
