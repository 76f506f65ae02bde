//! Identity-based deduplication
//!
//! The same item can reach the feed through several retrieval paths (recent
//! activity, key matches, trending fallback). Identity is the pair
//! `(source_type, source_id)`.

use crate::models::InsightItem;
use std::collections::HashSet;

/// Keep the first occurrence of every identity, preserving input order
pub fn deduplicate_items(items: Vec<InsightItem>) -> Vec<InsightItem> {
    let mut seen: HashSet<(String, String)> = HashSet::with_capacity(items.len());
    let input_len = items.len();

    let unique: Vec<InsightItem> = items
        .into_iter()
        .filter(|item| {
            let (source_type, source_id) = item.identity();
            seen.insert((source_type.to_string(), source_id.to_string()))
        })
        .collect();

    if unique.len() < input_len {
        tracing::debug!(
            "Removed {} duplicate insight items",
            input_len - unique.len()
        );
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ItemKind, Severity};

    fn note(id: &str) -> InsightItem {
        InsightItem::new(id, ItemKind::Note, None)
    }

    #[test]
    fn test_first_occurrence_wins() {
        let first = note("1").with_keys(["first"]);
        let second = note("1").with_keys(["second"]);
        let items = vec![first.clone(), note("2"), second];

        let unique = deduplicate_items(items);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0], first);
        assert_eq!(unique[1].source_id, "2");
    }

    #[test]
    fn test_identity_includes_source_type() {
        let items = vec![
            note("42"),
            InsightItem::new("42", ItemKind::article(), None),
            InsightItem::new("42", ItemKind::activity(Severity::Info), None),
            InsightItem::new("42", ItemKind::Other("lesson".into()), None),
            InsightItem::new("42", ItemKind::Other("journal".into()), None),
        ];
        assert_eq!(deduplicate_items(items).len(), 5);
    }

    #[test]
    fn test_idempotent() {
        let items = vec![note("a"), note("b"), note("a"), note("c"), note("b")];
        let once = deduplicate_items(items);
        let twice = deduplicate_items(once.clone());
        assert_eq!(once, twice);
        let ids: Vec<_> = once.iter().map(|i| i.source_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(deduplicate_items(Vec::new()).is_empty());
    }
}
