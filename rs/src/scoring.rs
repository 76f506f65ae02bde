//! Multi-factor insight scoring
//!
//! `score = recency + severity boost + engagement boost + multi-match bonus`,
//! where the severity boost only applies to activities and the engagement
//! boost only to articles. Every term is non-negative and missing optional
//! fields contribute nothing.

use crate::constants::{
    ACTIVITY_HALF_LIFE_HOURS, ARTICLE_HALF_LIFE_HOURS, ENGAGEMENT_BOOST_CAP, LIKE_BOOST_CAP,
    LIKE_BOOST_PER_LIKE, MILLIS_PER_HOUR, MULTI_MATCH_CAP, MULTI_MATCH_STEP,
    NOTE_HALF_LIFE_HOURS, SEVERITY_BOOST_ERROR, SEVERITY_BOOST_INFO, SEVERITY_BOOST_SUCCESS,
    SEVERITY_BOOST_WARNING, VIEW_BOOST_CAP, VIEW_BOOST_PER_VIEW,
};
use crate::models::{InsightItem, ItemKind, RankingContext, ScoredItem, Severity};
use chrono::{DateTime, Utc};
use std::collections::HashSet;

/// Age of a timestamp in hours relative to `now`
///
/// A missing timestamp is infinitely old, so the item decays to zero recency
/// instead of failing. Future timestamps produce negative ages; `recency`
/// clamps those.
pub fn age_hours(timestamp: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f64 {
    match timestamp {
        Some(ts) => now.signed_duration_since(ts).num_milliseconds() as f64 / MILLIS_PER_HOUR,
        None => f64::INFINITY,
    }
}

/// Exponential recency decay in [0, 1]
///
/// At `age_hours == half_life_hours` this is `e^-1` (about 0.368), not 0.5.
pub fn recency(age_hours: f64, half_life_hours: f64) -> f64 {
    if age_hours.is_nan() || half_life_hours.is_nan() || half_life_hours <= 0.0 {
        return 0.0;
    }
    let age = age_hours.max(0.0);
    (-age / half_life_hours).exp().clamp(0.0, 1.0)
}

/// Decay time constant for a source type; unknown types have none
pub fn half_life_hours(kind: &ItemKind) -> Option<f64> {
    match kind {
        ItemKind::Article { .. } => Some(ARTICLE_HALF_LIFE_HOURS),
        ItemKind::Activity { .. } => Some(ACTIVITY_HALF_LIFE_HOURS),
        ItemKind::Note => Some(NOTE_HALF_LIFE_HOURS),
        ItemKind::Other(_) => None,
    }
}

/// Activity severity boost: error 0.3, warning 0.2, success 0.1, info 0
pub fn severity_boost(severity: Option<Severity>) -> f64 {
    match severity {
        Some(Severity::Error) => SEVERITY_BOOST_ERROR,
        Some(Severity::Warning) => SEVERITY_BOOST_WARNING,
        Some(Severity::Success) => SEVERITY_BOOST_SUCCESS,
        Some(Severity::Info) => SEVERITY_BOOST_INFO,
        None => 0.0,
    }
}

/// `min(2, views * 0.01) + min(2, likes * 0.1)`, capped at 4
pub fn engagement_boost(view_count: u64, like_count: u64) -> f64 {
    let views = (view_count as f64 * VIEW_BOOST_PER_VIEW).min(VIEW_BOOST_CAP);
    let likes = (like_count as f64 * LIKE_BOOST_PER_LIKE).min(LIKE_BOOST_CAP);
    (views + likes).min(ENGAGEMENT_BOOST_CAP)
}

/// Bonus for matching more than one candidate key
///
/// The first match carries no bonus; retrieval already implies it. Duplicate
/// keys on the item count once.
pub fn multi_match_bonus(insight_keys: &[String], candidate_keys: &HashSet<String>) -> f64 {
    if candidate_keys.is_empty() {
        return 0.0;
    }

    let matched: HashSet<&str> = insight_keys
        .iter()
        .filter(|key| candidate_keys.contains(key.as_str()))
        .map(String::as_str)
        .collect();

    if matched.len() <= 1 {
        return 0.0;
    }
    ((matched.len() - 1) as f64 * MULTI_MATCH_STEP).min(MULTI_MATCH_CAP)
}

/// Score a single item against the ranking context
pub fn score_item(item: &InsightItem, ctx: &RankingContext) -> f64 {
    let recency_score = half_life_hours(&item.kind)
        .map(|half_life| recency(age_hours(item.timestamp, ctx.now), half_life))
        .unwrap_or(0.0);

    let type_boost = match &item.kind {
        ItemKind::Activity { severity } => severity_boost(*severity),
        ItemKind::Article {
            view_count,
            like_count,
        } => engagement_boost(*view_count, *like_count),
        ItemKind::Note | ItemKind::Other(_) => 0.0,
    };

    let match_bonus = multi_match_bonus(&item.insight_keys, &ctx.candidate_keys);

    recency_score + type_boost + match_bonus
}

/// Score every item, keeping input order
pub fn score_items(items: Vec<InsightItem>, ctx: &RankingContext) -> Vec<ScoredItem> {
    items
        .into_iter()
        .map(|item| {
            let score = score_item(&item, ctx);
            ScoredItem::new(item, score)
        })
        .collect()
}
