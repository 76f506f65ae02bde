//! Core data models for the insight ranking engine
//!
//! Items arrive from the retrieval layer as flat JSON records. They are
//! converted into a typed form where type-specific fields (severity for
//! activities, engagement counts for articles) only exist on the variant they
//! belong to.

use crate::constants::EVENT_KEY_PREFIX;
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Severity of an activity event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Success,
    Info,
}

impl Severity {
    /// Parse a severity name, ignoring case. Unknown names yield `None`.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "error" => Some(Self::Error),
            "warning" => Some(Self::Warning),
            "success" => Some(Self::Success),
            "info" => Some(Self::Info),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Success => "success",
            Self::Info => "info",
        }
    }
}

/// Source type of an insight item together with its type-specific fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemKind {
    /// Published article; engagement counts default to 0
    Article { view_count: u64, like_count: u64 },

    /// Activity log event (trades, alerts, journal actions)
    Activity { severity: Option<Severity> },

    /// Personal note
    Note,

    /// Any source type the engine does not know; the name is kept verbatim
    Other(String),
}

impl ItemKind {
    pub fn article() -> Self {
        Self::Article {
            view_count: 0,
            like_count: 0,
        }
    }

    pub fn activity(severity: Severity) -> Self {
        Self::Activity {
            severity: Some(severity),
        }
    }

    /// Build a kind from its wire name. Known names are matched case-insensitively.
    pub fn from_type_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "article" => Self::article(),
            "activity" => Self::Activity { severity: None },
            "note" => Self::Note,
            _ => Self::Other(name.to_string()),
        }
    }

    /// Canonical source type name
    pub fn source_type(&self) -> &str {
        match self {
            Self::Article { .. } => "article",
            Self::Activity { .. } => "activity",
            Self::Note => "note",
            Self::Other(name) => name.as_str(),
        }
    }

    pub fn is_article(&self) -> bool {
        matches!(self, Self::Article { .. })
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.source_type())
    }
}

/// A unit of content eligible for ranking
///
/// Read-only to the engine. The reference timestamp is `published_at` for
/// articles and `created_at` for everything else; the engine only ever sees it
/// as an age in hours relative to the caller's `now`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawInsightItem", into = "RawInsightItem")]
pub struct InsightItem {
    /// Opaque identifier, unique within the source type
    pub source_id: String,

    /// Source type and type-specific fields
    pub kind: ItemKind,

    /// Reference point for recency decay
    pub timestamp: Option<DateTime<Utc>>,

    /// Tag-like keys such as `event:NFP` or `currency:USD`
    pub insight_keys: Vec<String>,
}

impl InsightItem {
    pub fn new(
        source_id: impl Into<String>,
        kind: ItemKind,
        timestamp: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            kind,
            timestamp,
            insight_keys: Vec::new(),
        }
    }

    /// Replace the insight keys
    pub fn with_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insight_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    pub fn source_type(&self) -> &str {
        self.kind.source_type()
    }

    /// Composite identity used for deduplication
    pub fn identity(&self) -> (&str, &str) {
        (self.kind.source_type(), self.source_id.as_str())
    }

    pub fn is_article(&self) -> bool {
        self.kind.is_article()
    }

    /// The economic event this item belongs to, taken from the first
    /// `event:`-prefixed insight key with the prefix stripped
    pub fn event_key(&self) -> Option<&str> {
        self.insight_keys
            .iter()
            .find_map(|key| key.strip_prefix(EVENT_KEY_PREFIX))
    }
}

/// Flat wire representation of an insight item
///
/// Accepts both snake_case and the camelCase names used by the dashboard's
/// document store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RawInsightItem {
    #[serde(default, alias = "sourceType")]
    source_type: String,

    #[serde(alias = "sourceId")]
    source_id: String,

    #[serde(default, alias = "createdAt", skip_serializing_if = "Option::is_none")]
    created_at: Option<DateTime<Utc>>,

    #[serde(default, alias = "publishedAt", skip_serializing_if = "Option::is_none")]
    published_at: Option<DateTime<Utc>>,

    #[serde(default, alias = "insightKeys")]
    insight_keys: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    severity: Option<String>,

    #[serde(default, alias = "viewCount", skip_serializing_if = "Option::is_none")]
    view_count: Option<u64>,

    #[serde(default, alias = "likeCount", skip_serializing_if = "Option::is_none")]
    like_count: Option<u64>,
}

impl From<RawInsightItem> for InsightItem {
    fn from(raw: RawInsightItem) -> Self {
        let kind = match ItemKind::from_type_name(&raw.source_type) {
            ItemKind::Article { .. } => ItemKind::Article {
                view_count: raw.view_count.unwrap_or(0),
                like_count: raw.like_count.unwrap_or(0),
            },
            ItemKind::Activity { .. } => ItemKind::Activity {
                severity: raw.severity.as_deref().and_then(Severity::parse),
            },
            other => other,
        };

        let timestamp = if kind.is_article() {
            raw.published_at.or(raw.created_at)
        } else {
            raw.created_at.or(raw.published_at)
        };

        Self {
            source_id: raw.source_id,
            kind,
            timestamp,
            insight_keys: raw.insight_keys,
        }
    }
}

impl From<InsightItem> for RawInsightItem {
    fn from(item: InsightItem) -> Self {
        let mut raw = RawInsightItem {
            source_type: item.kind.source_type().to_string(),
            source_id: item.source_id,
            insight_keys: item.insight_keys,
            ..Default::default()
        };

        match item.kind {
            ItemKind::Article {
                view_count,
                like_count,
            } => {
                raw.published_at = item.timestamp;
                raw.view_count = Some(view_count);
                raw.like_count = Some(like_count);
            }
            ItemKind::Activity { severity } => {
                raw.created_at = item.timestamp;
                raw.severity = severity.map(|s| s.as_str().to_string());
            }
            ItemKind::Note | ItemKind::Other(_) => {
                raw.created_at = item.timestamp;
            }
        }

        raw
    }
}

/// An insight item annotated with its ranking score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredItem {
    /// The ranked item
    pub item: InsightItem,

    /// Combined recency and boost score (always >= 0)
    pub score: f64,
}

impl ScoredItem {
    pub fn new(item: InsightItem, score: f64) -> Self {
        Self { item, score }
    }
}

/// Caller-facing options for a ranking call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingOptions {
    /// Keys the caller is currently interested in
    #[serde(default)]
    pub candidate_keys: Vec<String>,

    /// Reference time; the wall clock is read once at the entry point when absent
    #[serde(default)]
    pub now: Option<DateTime<Utc>>,

    /// Whether the diversity constraints reorder the ranked list
    #[serde(default = "default_apply_diversity")]
    pub apply_diversity: bool,
}

fn default_apply_diversity() -> bool {
    true
}

impl Default for RankingOptions {
    fn default() -> Self {
        Self {
            candidate_keys: Vec::new(),
            now: None,
            apply_diversity: default_apply_diversity(),
        }
    }
}

impl RankingOptions {
    pub fn with_candidate_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.candidate_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    pub fn with_diversity(mut self, apply_diversity: bool) -> Self {
        self.apply_diversity = apply_diversity;
        self
    }

    /// Resolve into a per-call context
    pub fn resolve(&self) -> RankingContext {
        RankingContext {
            now: self.now.unwrap_or_else(Utc::now),
            candidate_keys: self.candidate_keys.iter().cloned().collect(),
            apply_diversity: self.apply_diversity,
        }
    }
}

/// Resolved per-call ranking context; never persisted
#[derive(Debug, Clone, PartialEq)]
pub struct RankingContext {
    pub now: DateTime<Utc>,
    pub candidate_keys: HashSet<String>,
    pub apply_diversity: bool,
}

impl RankingContext {
    /// Context at `now` with no candidate keys and diversity enabled
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now,
            candidate_keys: HashSet::new(),
            apply_diversity: true,
        }
    }
}

// MCP Tool Parameter Structs

/// Parameters for ranking the current snapshot
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct RankInsightsParams {
    /// Insight keys the caller is interested in, e.g. "event:NFP" or "currency:USD"
    #[serde(default)]
    pub candidate_keys: Vec<String>,
    /// Reference time in RFC 3339 format; defaults to the current time
    #[serde(default)]
    pub now: Option<String>,
    /// Apply feed diversity constraints (default: true)
    #[serde(default)]
    pub apply_diversity: Option<bool>,
    /// Maximum number of rows to return (default: 20)
    #[serde(default)]
    pub limit: Option<usize>,
    /// Use trending keys as candidate keys when none are given (default: true)
    #[serde(default)]
    pub use_trending_fallback: Option<bool>,
}

/// Parameters for computing trending keys over the current snapshot
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct TrendingKeysParams {
    /// Number of keys to return (default: 6)
    #[serde(default)]
    pub top_k: Option<usize>,
}
