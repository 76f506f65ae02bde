//! Constants for the insight ranking engine
//!
//! Every tunable number of the scorer, the diversity pass and the trending
//! aggregator lives here so fixtures and callers can reference them by name.

// Recency model

/// Decay time constant for articles (3 days).
pub const ARTICLE_HALF_LIFE_HOURS: f64 = 72.0;

/// Decay time constant for activity events (1 day).
pub const ACTIVITY_HALF_LIFE_HOURS: f64 = 24.0;

/// Decay time constant for personal notes (1 week).
pub const NOTE_HALF_LIFE_HOURS: f64 = 168.0;

/// Milliseconds per hour, used when turning timestamp deltas into ages.
pub const MILLIS_PER_HOUR: f64 = 3_600_000.0;

// Severity boosts (activity only)

pub const SEVERITY_BOOST_ERROR: f64 = 0.3;
pub const SEVERITY_BOOST_WARNING: f64 = 0.2;
pub const SEVERITY_BOOST_SUCCESS: f64 = 0.1;
pub const SEVERITY_BOOST_INFO: f64 = 0.0;

// Engagement boost (article only)

/// Boost per article view.
pub const VIEW_BOOST_PER_VIEW: f64 = 0.01;

/// Cap on the view component of the engagement boost.
pub const VIEW_BOOST_CAP: f64 = 2.0;

/// Boost per article like.
pub const LIKE_BOOST_PER_LIKE: f64 = 0.1;

/// Cap on the like component of the engagement boost.
pub const LIKE_BOOST_CAP: f64 = 2.0;

/// Cap on the combined engagement boost.
pub const ENGAGEMENT_BOOST_CAP: f64 = 4.0;

// Multi-match bonus

/// Bonus for every matching candidate key beyond the first.
pub const MULTI_MATCH_STEP: f64 = 0.15;

/// Cap on the multi-match bonus.
pub const MULTI_MATCH_CAP: f64 = 0.75;

// Diversity constraints

/// Insight key prefix marking the economic event an item belongs to.
pub const EVENT_KEY_PREFIX: &str = "event:";

/// Longest allowed run of items sharing a source type.
pub const MAX_CONSECUTIVE_SAME_TYPE: usize = 2;

/// Maximum placements of one event key inside the event window.
pub const EVENT_KEY_CAP: usize = 3;

/// Number of leading feed positions the event cap applies to.
pub const EVENT_WINDOW: usize = 10;

/// Number of leading feed positions that must contain an article when one exists.
pub const ARTICLE_WINDOW: usize = 6;

// Trending keys

/// Number of trending keys returned when the caller does not ask for a count.
pub const DEFAULT_TRENDING_TOP_K: usize = 6;
