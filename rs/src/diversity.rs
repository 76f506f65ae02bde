//! Feed diversity constraints
//!
//! Reorders an already score-ranked list so the feed does not turn into a
//! wall of one content type or one economic event. Placement is greedy: each
//! position takes the highest-scoring remaining item that satisfies every
//! constraint against the output built so far. Diversity only defers items,
//! it never changes scores.
//!
//! Constraints, in priority order:
//! 1. no run of more than two items sharing a source type;
//! 2. within the first 10 positions, an event key appears at most 3 times;
//! 3. within the first 6 positions, an article is placed before anything else
//!    while articles remain unplaced.
//!
//! When nothing satisfies all three, placement relaxes to constraint 1 only,
//! and when even that fails the highest-scoring remaining item is placed.

use crate::constants::{ARTICLE_WINDOW, EVENT_KEY_CAP, EVENT_WINDOW, MAX_CONSECUTIVE_SAME_TYPE};
use crate::models::{InsightItem, ScoredItem};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Windows and caps of the diversity pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiversityLimits {
    /// Longest allowed run of one source type
    pub max_consecutive_same_type: usize,

    /// Maximum placements of one event key inside `event_window`
    pub event_cap: usize,

    /// Number of leading positions the event cap applies to
    pub event_window: usize,

    /// Number of leading positions that must reach an article when one exists
    pub article_window: usize,
}

impl Default for DiversityLimits {
    fn default() -> Self {
        Self {
            max_consecutive_same_type: MAX_CONSECUTIVE_SAME_TYPE,
            event_cap: EVENT_KEY_CAP,
            event_window: EVENT_WINDOW,
            article_window: ARTICLE_WINDOW,
        }
    }
}

/// Accumulated facts about the output placed so far
#[derive(Debug)]
struct PlacementState<'l> {
    limits: &'l DiversityLimits,
    placed: usize,
    /// Source types of the most recent placements, oldest first
    recent_types: Vec<String>,
    event_counts: HashMap<String, usize>,
    article_placed: bool,
    articles_remaining: usize,
}

impl<'l> PlacementState<'l> {
    fn new(limits: &'l DiversityLimits, pool: &[ScoredItem]) -> Self {
        Self {
            limits,
            placed: 0,
            recent_types: Vec::with_capacity(limits.max_consecutive_same_type),
            event_counts: HashMap::new(),
            article_placed: false,
            articles_remaining: pool.iter().filter(|c| c.item.is_article()).count(),
        }
    }

    /// Placing `item` would create a run longer than allowed
    fn extends_run(&self, item: &InsightItem) -> bool {
        let max_run = self.limits.max_consecutive_same_type.max(1);
        self.recent_types.len() >= max_run
            && self
                .recent_types
                .iter()
                .all(|source_type| source_type == item.source_type())
    }

    fn exceeds_event_cap(&self, item: &InsightItem) -> bool {
        if self.placed >= self.limits.event_window {
            return false;
        }
        item.event_key()
            .and_then(|key| self.event_counts.get(key))
            .is_some_and(|count| *count >= self.limits.event_cap)
    }

    /// Placing `item` would delay the first article past the article window
    fn starves_articles(&self, item: &InsightItem) -> bool {
        self.placed < self.limits.article_window
            && !self.article_placed
            && !item.is_article()
            && self.articles_remaining > 0
    }

    fn accepts(&self, item: &InsightItem) -> bool {
        !self.extends_run(item) && !self.exceeds_event_cap(item) && !self.starves_articles(item)
    }

    fn record(&mut self, item: &InsightItem) {
        self.placed += 1;

        let max_run = self.limits.max_consecutive_same_type.max(1);
        if self.recent_types.len() == max_run {
            self.recent_types.remove(0);
        }
        self.recent_types.push(item.source_type().to_string());

        if let Some(key) = item.event_key() {
            *self.event_counts.entry(key.to_string()).or_insert(0) += 1;
        }

        if item.is_article() {
            self.article_placed = true;
            self.articles_remaining = self.articles_remaining.saturating_sub(1);
        }
    }
}

/// Reorder a score-ranked list under the default limits
pub fn diversify(ranked: Vec<ScoredItem>) -> Vec<ScoredItem> {
    diversify_with(ranked, &DiversityLimits::default())
}

/// Reorder a score-ranked list under the given limits
///
/// `ranked` must already be sorted by descending score. The output is a
/// permutation of the input.
pub fn diversify_with(ranked: Vec<ScoredItem>, limits: &DiversityLimits) -> Vec<ScoredItem> {
    let mut pool = ranked;
    let mut output = Vec::with_capacity(pool.len());
    let mut state = PlacementState::new(limits, &pool);
    let mut relaxed = 0usize;

    while !pool.is_empty() {
        let index = match pool.iter().position(|c| state.accepts(&c.item)) {
            Some(index) => index,
            None => {
                relaxed += 1;
                pool.iter()
                    .position(|c| !state.extends_run(&c.item))
                    .unwrap_or(0)
            }
        };

        let chosen = pool.remove(index);
        state.record(&chosen.item);
        output.push(chosen);
    }

    if relaxed > 0 {
        tracing::debug!(
            "Diversity constraints relaxed for {} of {} positions",
            relaxed,
            output.len()
        );
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ItemKind, Severity};

    fn scored(id: &str, kind: ItemKind, score: f64) -> ScoredItem {
        ScoredItem::new(InsightItem::new(id, kind, None), score)
    }

    fn activity(id: &str, score: f64) -> ScoredItem {
        scored(id, ItemKind::activity(Severity::Info), score)
    }

    fn note(id: &str, score: f64) -> ScoredItem {
        scored(id, ItemKind::Note, score)
    }

    fn article(id: &str, score: f64) -> ScoredItem {
        scored(id, ItemKind::article(), score)
    }

    fn ids(items: &[ScoredItem]) -> Vec<&str> {
        items.iter().map(|c| c.item.source_id.as_str()).collect()
    }

    #[test]
    fn test_breaks_runs_of_three() {
        let ranked = vec![
            activity("a1", 5.0),
            activity("a2", 4.0),
            activity("a3", 3.0),
            note("n1", 2.0),
            note("n2", 1.0),
        ];
        let output = diversify(ranked);
        assert_eq!(ids(&output), vec!["a1", "a2", "n1", "a3", "n2"]);
    }

    #[test]
    fn test_article_is_pulled_forward_while_articles_remain() {
        let ranked = vec![
            activity("a1", 5.0),
            note("n1", 4.0),
            article("r1", 0.1),
        ];
        let output = diversify(ranked);
        assert_eq!(ids(&output), vec!["r1", "a1", "n1"]);
    }

    #[test]
    fn test_article_constraint_only_consults_unplaced_pool() {
        // Once the only article is placed, later positions fall back to score order
        let ranked = vec![
            note("n1", 3.0),
            activity("a1", 2.0),
            article("r1", 1.0),
            note("n2", 0.5),
        ];
        let output = diversify(ranked);
        assert_eq!(ids(&output), vec!["r1", "n1", "a1", "n2"]);
    }

    #[test]
    fn test_event_cap_defers_fourth_occurrence() {
        let mut ranked: Vec<ScoredItem> = (0..5)
            .map(|i| {
                let kind = if i % 2 == 0 {
                    ItemKind::Note
                } else {
                    ItemKind::activity(Severity::Warning)
                };
                ScoredItem::new(
                    InsightItem::new(format!("nfp{i}"), kind, None).with_keys(["event:NFP"]),
                    10.0 - i as f64,
                )
            })
            .collect();
        ranked.push(activity("other", 1.0));

        let output = diversify(ranked);
        assert_eq!(
            ids(&output),
            vec!["nfp0", "nfp1", "nfp2", "other", "nfp3", "nfp4"]
        );
    }

    #[test]
    fn test_event_cap_stops_after_window() {
        let limits = DiversityLimits {
            event_window: 2,
            event_cap: 1,
            ..DiversityLimits::default()
        };
        let with_event = |id: &str, score: f64| {
            ScoredItem::new(
                InsightItem::new(id, ItemKind::Note, None).with_keys(["event:CPI"]),
                score,
            )
        };
        let ranked = vec![
            with_event("c1", 5.0),
            with_event("c2", 4.0),
            activity("a1", 3.0),
            activity("a2", 2.0),
        ];
        let output = diversify_with(ranked, &limits);
        // c2 waits for position 3, where the window has closed
        assert_eq!(ids(&output), vec!["c1", "a1", "c2", "a2"]);
    }

    #[test]
    fn test_relaxes_when_single_type_remains() {
        let ranked: Vec<ScoredItem> = (0..4)
            .map(|i| activity(&format!("a{i}"), 4.0 - i as f64))
            .collect();
        let output = diversify(ranked);
        assert_eq!(ids(&output), vec!["a0", "a1", "a2", "a3"]);
    }

    #[test]
    fn test_scores_are_untouched() {
        let ranked = vec![activity("a1", 2.5), article("r1", 0.25)];
        let output = diversify(ranked);
        assert_eq!(output[0].score, 0.25);
        assert_eq!(output[1].score, 2.5);
    }

    #[test]
    fn test_empty_input() {
        assert!(diversify(Vec::new()).is_empty());
    }

    #[test]
    fn test_limits_deserialize_with_defaults() {
        let limits: DiversityLimits = serde_json::from_str(r#"{"event_cap": 2}"#).unwrap();
        assert_eq!(limits.event_cap, 2);
        assert_eq!(limits.event_window, EVENT_WINDOW);
        assert_eq!(limits.article_window, ARTICLE_WINDOW);
    }
}
