//! Ranking pipeline
//!
//! deduplicate → score → stable sort by score → diversity reorder.
//! Everything here is synchronous and pure apart from reading the wall clock
//! once when the caller did not supply `now`.

use crate::dedup::deduplicate_items;
use crate::diversity::diversify;
use crate::models::{InsightItem, RankingContext, RankingOptions, ScoredItem};
use crate::scoring::score_items;

/// Stable sort by score, highest first
///
/// Equal scores keep their input order.
pub fn rank_by_score(items: &mut [ScoredItem]) {
    items.sort_by(|a, b| b.score.total_cmp(&a.score));
}

/// Rank a snapshot of insight items into display order
///
/// Only exact-identity duplicates are dropped; every other item is returned
/// with its score.
pub fn rank_insights(items: Vec<InsightItem>, options: &RankingOptions) -> Vec<ScoredItem> {
    rank_with_context(items, &options.resolve())
}

/// Rank a snapshot against an already resolved context
pub fn rank_with_context(items: Vec<InsightItem>, ctx: &RankingContext) -> Vec<ScoredItem> {
    let input_len = items.len();
    let unique = deduplicate_items(items);

    let mut scored = score_items(unique, ctx);
    rank_by_score(&mut scored);

    let ranked = if ctx.apply_diversity {
        diversify(scored)
    } else {
        scored
    };

    tracing::debug!(
        "Ranked {} insight items ({} after dedup, {} candidate keys, diversity: {})",
        input_len,
        ranked.len(),
        ctx.candidate_keys.len(),
        ctx.apply_diversity
    );
    ranked
}
