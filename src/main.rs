use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

mod commands;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Command to run
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run wpiformat once against a file and print what it reports
    Check {
        /// File to format
        file: PathBuf,

        /// Formatter executable to run instead of `wpiformat`
        #[arg(long)]
        tool: Option<String>,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<String>,
    },
    /// Start the Language Server Protocol server
    Server {
        /// Listen on a TCP port instead of stdio (debugging)
        #[arg(long)]
        port: Option<u16>,

        /// Serve over stdio (the default; kept for editor launch configs)
        #[arg(long)]
        stdio: bool,

        /// Show debug-level logs
        #[arg(short, long)]
        verbose: bool,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<String>,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for (detected from $SHELL when omitted)
        shell: Option<Shell>,

        /// List available shells
        #[arg(long)]
        list: bool,
    },
    /// Print version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Check { file, tool, config } => commands::check::handle_check(file, tool, config),
        Commands::Server {
            port,
            stdio,
            verbose,
            config,
        } => commands::server::handle_server(port, stdio, verbose, config),
        Commands::Completions { shell, list } => commands::completions::handle_completions(shell, list),
        Commands::Version => commands::version::handle_version(),
    }
}
