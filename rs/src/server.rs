//! MCP tool surface over an insight snapshot
//!
//! Exposes ranking, trending keys and deduplication of the current snapshot
//! as compact markdown so a feed renderer or an assistant can inspect what the
//! engine would show.

use crate::constants::DEFAULT_TRENDING_TOP_K;
use crate::dedup::deduplicate_items;
use crate::models::{RankInsightsParams, RankingOptions, TrendingKeysParams};
use crate::ranking::rank_insights;
use crate::storage::InsightSource;
use crate::trending::aggregate_trending_keys;
use anyhow::Context;
use chrono::{DateTime, Utc};
use rmcp::handler::server::{router::tool::ToolRouter, wrapper::Parameters};
use rmcp::model::{ServerCapabilities, ServerInfo};
use rmcp::{tool, tool_handler, tool_router, ServerHandler};
use std::sync::Arc;

const DEFAULT_RANK_LIMIT: usize = 20;
const MAX_RANK_LIMIT: usize = 200;
const MAX_TRENDING_TOP_K: usize = 50;

/// MCP server ranking the snapshot provided by an [`InsightSource`]
#[derive(Clone)]
pub struct InsightRankServer {
    source: Arc<dyn InsightSource>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl InsightRankServer {
    pub fn new(source: Arc<dyn InsightSource>) -> Self {
        Self {
            source,
            tool_router: Self::tool_router(),
        }
    }

    /// Rank the snapshot and return the feed as a markdown table.
    #[tool(
        description = "Rank the insight snapshot (activities, articles, notes) into feed order with scores"
    )]
    async fn rank_insights(&self, Parameters(params): Parameters<RankInsightsParams>) -> String {
        match self.rank_insights_impl(params).await {
            Ok(output) => output,
            Err(err) => format!("Error: {err:#}"),
        }
    }

    /// List the most frequent insight keys of the snapshot.
    #[tool(description = "List the most frequent insight keys across the snapshot")]
    async fn trending_keys(&self, Parameters(params): Parameters<TrendingKeysParams>) -> String {
        match self.trending_keys_impl(params).await {
            Ok(output) => output,
            Err(err) => format!("Error: {err:#}"),
        }
    }

    /// Report duplicate items in the snapshot.
    #[tool(description = "Deduplicate the snapshot by (source_type, source_id) and report the result")]
    async fn deduplicate_items(&self) -> String {
        match self.deduplicate_items_impl().await {
            Ok(output) => output,
            Err(err) => format!("Error: {err:#}"),
        }
    }
}

impl InsightRankServer {
    async fn rank_insights_impl(&self, params: RankInsightsParams) -> anyhow::Result<String> {
        let now = match params.now.as_deref() {
            Some(raw) => DateTime::parse_from_rfc3339(raw)
                .with_context(|| format!("invalid `now` timestamp '{raw}'"))?
                .with_timezone(&Utc),
            None => Utc::now(),
        };
        let limit = params
            .limit
            .unwrap_or(DEFAULT_RANK_LIMIT)
            .clamp(1, MAX_RANK_LIMIT);

        let items = deduplicate_items(self.source.load_snapshot().await?);

        let mut candidate_keys = params.candidate_keys;
        let mut key_origin = "caller";
        if candidate_keys.is_empty() && params.use_trending_fallback.unwrap_or(true) {
            candidate_keys = aggregate_trending_keys(&items, DEFAULT_TRENDING_TOP_K);
            key_origin = "trending";
        }

        let options = RankingOptions::default()
            .with_candidate_keys(candidate_keys.iter().cloned())
            .at(now)
            .with_diversity(params.apply_diversity.unwrap_or(true));
        let ranked = rank_insights(items, &options);

        let mut out = String::new();
        out.push_str("# Insight feed\n");
        out.push_str(&format!("- now: `{}`\n", now.to_rfc3339()));
        out.push_str(&format!(
            "- candidate keys ({}): {}\n",
            key_origin,
            format_keys(&candidate_keys)
        ));
        out.push_str(&format!("- diversity: {}\n", options.apply_diversity));
        out.push_str(&format!(
            "- items: {} (showing {})\n\n",
            ranked.len(),
            ranked.len().min(limit)
        ));

        out.push_str("| # | type | id | score | keys |\n");
        out.push_str("|---|------|----|-------|------|\n");
        for (idx, scored) in ranked.iter().take(limit).enumerate() {
            out.push_str(&format!(
                "| {} | {} | {} | {:.4} | {} |\n",
                idx + 1,
                scored.item.source_type(),
                scored.item.source_id.replace('|', "\\|"),
                scored.score,
                format_keys(&scored.item.insight_keys).replace('|', "\\|")
            ));
        }

        Ok(out)
    }

    async fn trending_keys_impl(&self, params: TrendingKeysParams) -> anyhow::Result<String> {
        let top_k = params
            .top_k
            .unwrap_or(DEFAULT_TRENDING_TOP_K)
            .min(MAX_TRENDING_TOP_K);
        let items = deduplicate_items(self.source.load_snapshot().await?);
        let keys = aggregate_trending_keys(&items, top_k);

        let mut out = String::new();
        out.push_str("# Trending keys\n");
        if keys.is_empty() {
            out.push_str("- none\n");
        }
        for (idx, key) in keys.iter().enumerate() {
            out.push_str(&format!("{}. `{}`\n", idx + 1, key));
        }
        Ok(out)
    }

    async fn deduplicate_items_impl(&self) -> anyhow::Result<String> {
        let items = self.source.load_snapshot().await?;
        let before = items.len();
        let unique = deduplicate_items(items);

        let mut out = String::new();
        out.push_str("# Deduplicated snapshot\n");
        out.push_str(&format!("- before: {}\n", before));
        out.push_str(&format!("- after: {}\n", unique.len()));
        out.push_str(&format!("- removed: {}\n\n", before - unique.len()));
        for item in &unique {
            out.push_str(&format!("- {}:{}\n", item.source_type(), item.source_id));
        }
        Ok(out)
    }
}

#[tool_handler]
impl ServerHandler for InsightRankServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Insight Rank MCP Server: ranks the trading-session insight snapshot into feed order. Prefer small limits to keep responses compact.".into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

fn format_keys(keys: &[String]) -> String {
    if keys.is_empty() {
        "-".to_string()
    } else {
        keys.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{InsightItem, ItemKind, Severity};
    use crate::storage::FileSource;
    use chrono::Duration;
    use tempfile::TempDir;

    async fn create_test_server(items: &[InsightItem]) -> (InsightRankServer, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let source = FileSource::new(temp_dir.path()).await.unwrap();
        source.write_items("snapshot", items).await.unwrap();
        (InsightRankServer::new(Arc::new(source)), temp_dir)
    }

    fn fixture(now: DateTime<Utc>) -> Vec<InsightItem> {
        vec![
            InsightItem::new(
                "t-1",
                ItemKind::activity(Severity::Error),
                Some(now - Duration::hours(1)),
            )
            .with_keys(["event:NFP", "currency:USD"]),
            InsightItem::new("a-1", ItemKind::article(), Some(now - Duration::hours(72)))
                .with_keys(["event:NFP"]),
            InsightItem::new("a-1", ItemKind::article(), Some(now - Duration::hours(72))),
            InsightItem::new("n-1", ItemKind::Note, Some(now)).with_keys(["currency:USD"]),
        ]
    }

    #[tokio::test]
    async fn test_rank_tool_renders_table() {
        let now = Utc::now();
        let (server, _temp_dir) = create_test_server(&fixture(now)).await;

        let params = RankInsightsParams {
            now: Some(now.to_rfc3339()),
            ..Default::default()
        };
        let output = server.rank_insights_impl(params).await.unwrap();

        assert!(output.contains("candidate keys (trending)"));
        assert!(output.contains("- items: 3 (showing 3)"));
        // The article is placed first by the diversity pass
        assert!(output.contains("| 1 | article | a-1 |"));
    }

    #[tokio::test]
    async fn test_rank_tool_rejects_bad_timestamp() {
        let (server, _temp_dir) = create_test_server(&[]).await;
        let params = RankInsightsParams {
            now: Some("yesterday".to_string()),
            ..Default::default()
        };
        let result = server.rank_insights_impl(params).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_trending_tool() {
        let (server, _temp_dir) = create_test_server(&fixture(Utc::now())).await;
        let output = server
            .trending_keys_impl(TrendingKeysParams { top_k: Some(1) })
            .await
            .unwrap();
        assert!(output.contains("1. `event:NFP`"));
        assert!(!output.contains("2."));
    }

    #[tokio::test]
    async fn test_deduplicate_tool() {
        let (server, _temp_dir) = create_test_server(&fixture(Utc::now())).await;
        let output = server.deduplicate_items_impl().await.unwrap();
        assert!(output.contains("- before: 4"));
        assert!(output.contains("- after: 3"));
        assert!(output.contains("- article:a-1"));
    }
}
