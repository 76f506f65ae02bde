//! Standalone Insight Rank MCP Server
//!
//! Serves ranking, trending keys and deduplication over a directory of
//! insight snapshot files using the stdio transport.

use clap::Parser;
use insight_rank::{FileSource, InsightRankServer};
use rmcp::{transport::stdio, ServiceExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "insight-rank-server")]
#[command(about = "Insight ranking and feed diversity engine - MCP Server")]
struct Args {
    /// Snapshot directory holding exported insight items as JSON files
    /// (default: ~/.insight-rank)
    #[arg(long)]
    snapshot_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Logs go to stderr; stdout carries the MCP transport
    let log_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(format!("insight_rank={}", log_level))
        .with_writer(std::io::stderr)
        .init();

    let snapshot_dir = resolve_snapshot_dir(args.snapshot_dir.as_deref());

    tracing::info!("Starting Insight Rank MCP Server");
    tracing::info!("Snapshot directory: {}", snapshot_dir.display());
    tracing::info!("Insight Rank version: {}", insight_rank::VERSION);

    let source = FileSource::new(&snapshot_dir).await?;
    let service = InsightRankServer::new(Arc::new(source))
        .serve(stdio())
        .await?;
    service.waiting().await?;

    Ok(())
}

fn home_dir() -> PathBuf {
    home::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

fn default_snapshot_dir() -> PathBuf {
    home_dir().join(".insight-rank")
}

/// Resolve the snapshot directory argument, expanding a leading `~`
fn resolve_snapshot_dir(arg: Option<&Path>) -> PathBuf {
    match arg {
        None => default_snapshot_dir(),
        Some(path) => match path.strip_prefix("~") {
            Ok(rest) => home_dir().join(rest),
            Err(_) => path.to_path_buf(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_snapshot_dir() {
        let dir = resolve_snapshot_dir(None);
        assert!(dir.ends_with(".insight-rank"));
        assert!(!dir.starts_with("~"));
    }

    #[test]
    fn test_tilde_is_expanded() {
        let dir = resolve_snapshot_dir(Some(Path::new("~/.insight-rank/today")));
        assert!(!dir.starts_with("~"));
        assert_eq!(dir, home_dir().join(".insight-rank").join("today"));
    }

    #[test]
    fn test_explicit_path_is_kept() {
        let dir = resolve_snapshot_dir(Some(Path::new("/var/lib/snapshots")));
        assert_eq!(dir, PathBuf::from("/var/lib/snapshots"));
    }

    #[test]
    fn test_cli_parses_optional_snapshot_dir() {
        let args = Args::parse_from(["insight-rank-server", "--debug"]);
        assert!(args.snapshot_dir.is_none());
        assert!(args.debug);

        let args = Args::parse_from(["insight-rank-server", "--snapshot-dir", "~/feeds"]);
        assert_eq!(args.snapshot_dir, Some(PathBuf::from("~/feeds")));
    }
}
