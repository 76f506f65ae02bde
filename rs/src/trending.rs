//! Trending insight keys
//!
//! Frequency count of insight keys across a window of items. Used as the
//! candidate keys for the multi-match bonus when the caller has none of its
//! own, e.g. on a cold start.

use crate::models::InsightItem;
use indexmap::IndexMap;

/// Return up to `top_k` keys ordered by descending occurrence count
///
/// Ties keep the order in which keys were first encountered.
pub fn aggregate_trending_keys(items: &[InsightItem], top_k: usize) -> Vec<String> {
    if top_k == 0 {
        return Vec::new();
    }

    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for key in items.iter().flat_map(|item| item.insight_keys.iter()) {
        *counts.entry(key.as_str()).or_insert(0) += 1;
    }

    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    ranked
        .into_iter()
        .take(top_k)
        .map(|(key, _)| key.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEFAULT_TRENDING_TOP_K;
    use crate::models::ItemKind;

    fn item(keys: &[&str]) -> InsightItem {
        InsightItem::new("x", ItemKind::Note, None).with_keys(keys.iter().copied())
    }

    #[test]
    fn test_counts_across_items() {
        let items = vec![item(&["a", "a"]), item(&["b", "c"]), item(&["a", "b"])];
        assert_eq!(aggregate_trending_keys(&items, 2), vec!["a", "b"]);
    }

    #[test]
    fn test_ties_keep_first_seen_order() {
        let items = vec![item(&["z", "y"]), item(&["x", "y", "z"])];
        // z and y both occur twice; z was seen first
        assert_eq!(aggregate_trending_keys(&items, 3), vec!["z", "y", "x"]);
    }

    #[test]
    fn test_fewer_keys_than_requested() {
        let items = vec![item(&["only"])];
        assert_eq!(
            aggregate_trending_keys(&items, DEFAULT_TRENDING_TOP_K),
            vec!["only"]
        );
    }

    #[test]
    fn test_empty_inputs() {
        assert!(aggregate_trending_keys(&[], 6).is_empty());
        assert!(aggregate_trending_keys(&[item(&[])], 6).is_empty());
        assert!(aggregate_trending_keys(&[item(&["a"])], 0).is_empty());
    }
}
