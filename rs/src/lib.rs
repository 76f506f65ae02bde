//! Insight Rank: insight ranking and feed diversity engine
//!
//! Merges short-lived activity events, longer-lived articles and personal
//! notes into a single relevance-ordered feed. Scoring combines time decay,
//! severity, engagement and multi-key relevance; a greedy reordering pass then
//! keeps the feed diverse.
//!
//! The engine is synchronous, pure and stateless. A file-backed snapshot
//! source and an MCP server are provided for standalone usage.

pub mod constants;
pub mod dedup;
pub mod diversity;
pub mod models;
pub mod ranking;
pub mod scoring;
pub mod server;
pub mod storage;
pub mod trending;

// Re-export main types for convenience
pub use dedup::deduplicate_items;
pub use diversity::{diversify, diversify_with, DiversityLimits};
pub use models::{InsightItem, ItemKind, RankingContext, RankingOptions, ScoredItem, Severity};
pub use ranking::{rank_by_score, rank_insights, rank_with_context};
pub use server::InsightRankServer;
pub use storage::{FileSource, InsightSource, StorageError};
pub use trending::aggregate_trending_keys;

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
