//! Deckhand MCP server binary.
//!
//! Serves the presentation tools over stdio.
//!
//! Usage:
//!   cargo run -p deckhand-mcp
//!   cargo run -p deckhand-mcp -- --output-dir ./decks --log-level debug
//!
//! Test with MCP inspector:
//!   npx @modelcontextprotocol/inspector cargo run -p deckhand-mcp

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rmcp::{ServiceExt, transport::stdio};
use tracing_subscriber::{EnvFilter, fmt};

use deckhand_kernel::DeckConfig;
use deckhand_mcp::DeckhandMcp;

/// MCP server for authoring PowerPoint decks.
#[derive(Parser, Debug)]
#[command(name = "deckhand-mcp")]
#[command(about = "MCP server for authoring PowerPoint presentations")]
struct Args {
    /// Config file (default: ~/.config/deckhand/config.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory relative save paths resolve against
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr; stdout carries the protocol
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&args.log_level)),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let config = DeckConfig::load(args.config.as_deref())
        .context("loading config")?
        .with_env_overrides()
        .with_output_dir_override(args.output_dir);
    tracing::info!(output_dir = %config.output_dir.display(), "starting deckhand-mcp");

    let service = DeckhandMcp::new(config)
        .serve(stdio())
        .await
        .inspect_err(|e| {
            tracing::error!("MCP server error: {:?}", e);
        })?;

    tracing::info!("deckhand-mcp server ready");

    service.waiting().await?;

    tracing::info!("deckhand-mcp server shutting down");
    Ok(())
}
