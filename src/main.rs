// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! pv-zone-labeler - run backup item actions over exported manifests.
//!
//! Reads `PersistentVolume` manifests (YAML or JSON, `List`s included), passes
//! each through the registered backup item actions exactly as a backup would,
//! and writes the result to standard output. Logs go to standard error.
//!
//! # Environment Variables
//!
//! - `RUST_LOG` - log filter (default `info`)
//! - `RUST_LOG_FORMAT` - `text` (default) or `json`
//! - `BACKUP_NAME` / `BACKUP_NAMESPACE` - backup the items are processed for
//!
//! # Examples
//!
//! ```bash
//! kubectl get pv -o yaml | pv-zone-labeler
//! pv-zone-labeler -f pv.json -o json
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use pv_zone_labeler::{
    action::BackupContext,
    constants::{DEFAULT_BACKUP_NAME, DEFAULT_BACKUP_NAMESPACE, STDIN_PATH},
    manifest::{process_documents, read_documents, render_documents, OutputFormat},
    registry::ActionRegistry,
};
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, info};

/// Label `PersistentVolume` manifests with their availability zone.
#[derive(Parser, Debug)]
#[command(name = "pv-zone-labeler")]
#[command(about = "Run backup item actions over PersistentVolume manifests")]
#[command(version)]
struct Cli {
    /// Manifest to read (`-` for standard input)
    #[arg(long, short, default_value = STDIN_PATH)]
    file: PathBuf,

    /// Output format
    #[arg(long, short, value_enum, default_value_t = OutputFormat::Yaml)]
    output: OutputFormat,

    /// Name of the backup the items belong to
    #[arg(long, env = "BACKUP_NAME", default_value = DEFAULT_BACKUP_NAME)]
    backup_name: String,

    /// Namespace of the backup object
    #[arg(long, env = "BACKUP_NAMESPACE", default_value = DEFAULT_BACKUP_NAMESPACE)]
    backup_namespace: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    debug!(file = %cli.file.display(), "Reading manifest");
    let documents = read_documents(&cli.file)
        .with_context(|| format!("failed to load {}", cli.file.display()))?;

    let registry = ActionRegistry::with_default_actions();
    let backup = BackupContext::new(cli.backup_name, cli.backup_namespace);
    info!(
        documents = documents.len(),
        actions = registry.len(),
        backup = %backup.name,
        "Processing manifest"
    );

    let processed = process_documents(&registry, documents, &backup)
        .context("backup item action failed")?;
    let rendered = render_documents(&processed, cli.output)?;

    std::io::stdout()
        .lock()
        .write_all(rendered.as_bytes())
        .context("failed to write output")?;

    Ok(())
}

fn init_tracing() {
    // Respects RUST_LOG if set, otherwise defaults to INFO level.
    // RUST_LOG_FORMAT=json switches to structured output.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_file(true)
                .with_line_number(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_file(true)
                .with_line_number(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }
}
