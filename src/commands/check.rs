//! Handler for the `check` command.

use std::path::{Path, PathBuf};

use colored::*;

use wpifmt_lib::config::Config;
use wpifmt_lib::exit_codes::exit;
use wpifmt_lib::{decode, invoke, repo};

/// Handle the check command: run the formatter once against `file` and
/// print anything it reports about that file.
pub fn handle_check(file: PathBuf, tool: Option<String>, config: Option<String>) {
    let file = match std::fs::canonicalize(&file) {
        Ok(path) => path,
        Err(e) => {
            eprintln!("{}: {}: {}", "Error".red().bold(), file.display(), e);
            exit::tool_error();
        }
    };

    let start_dir = file.parent().unwrap_or(&file);
    let settings = match Config::load(config.as_deref().map(Path::new), start_dir) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            exit::tool_error();
        }
    };
    let tool = tool.unwrap_or(settings.tool);

    let Some(root) = repo::find_repo_root(&file) else {
        eprintln!("{}: File is not in a git repo", "Error".red().bold());
        exit::tool_error();
    };

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("{}: Failed to create Tokio runtime: {}", "Error".red().bold(), e);
        exit::tool_error();
    });

    let outcome = match runtime.block_on(invoke::run_formatter(&tool, &root, &file)) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            exit::tool_error();
        }
    };

    if outcome.success() {
        println!("{} No issues found in {}", "✓".green(), file.display());
        exit::success();
    }

    if decode::clang_format_missing(&outcome.stderr) {
        eprintln!("{}: {}", "Error".red().bold(), decode::CLANG_FORMAT_MISSING_FRAGMENT);
    }
    if decode::wpiformat_missing(&outcome.stderr) {
        eprintln!(
            "{}: wpiformat was not found in PATH. Is it installed?",
            "Error".red().bold()
        );
        exit::tool_error();
    }

    let decoded = decode::decode_file_errors(&outcome.stderr, &file.to_string_lossy());
    if decoded.malformed > 0 {
        eprintln!(
            "{}: {} line(s) about this file could not be decoded",
            "Warning".yellow().bold(),
            decoded.malformed
        );
    }

    if decoded.errors.is_empty() {
        // Non-zero exit with nothing recognizable about this file: show the
        // raw output so the information is not lost.
        eprint!("{}", outcome.stderr.dimmed());
        exit::issues_found();
    }

    for error in &decoded.errors {
        println!("{}:{}: {}", file.display(), error.line.to_string().cyan(), error.message);
    }
    println!("\nFound {} issue(s)", decoded.errors.len().to_string().red().bold());
    exit::issues_found();
}
