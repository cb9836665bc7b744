use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ============================================================================
// Catalog Relations
// ============================================================================

/// A registered viewer. Demographics are carried through but never scored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub user_id: String,
    pub name: String,
    pub age: i64,
    pub gender: String,
    pub region: String,
}

/// A watchable catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub item_id: String,
    pub title: String,
    /// e.g. tv/movie/series/microdrama; `None` when the catalog has no such column
    pub content_type: Option<String>,
    pub genre: Option<String>,
}

impl Item {
    pub fn new(item_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            title: title.into(),
            content_type: None,
            genre: None,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }
}

/// One watch event. `watch_seconds` is already clamped to be non-negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub user_id: String,
    pub item_id: String,
    pub event_type: String,
    pub watch_seconds: i64,
    pub timestamp: Option<NaiveDateTime>,
}

impl Event {
    pub fn new(user_id: impl Into<String>, item_id: impl Into<String>, watch_seconds: i64) -> Self {
        Self {
            user_id: user_id.into(),
            item_id: item_id.into(),
            event_type: "watch".to_string(),
            watch_seconds: watch_seconds.max(0),
            timestamp: None,
        }
    }

    pub fn at(mut self, timestamp: NaiveDateTime) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

/// Full snapshot of the three cleaned relations the engine is fitted on
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub users: Vec<User>,
    pub items: Vec<Item>,
    pub events: Vec<Event>,
}

// ============================================================================
// Query Results
// ============================================================================

/// Reason attached to every popularity-derived result
pub const POPULAR_REASON: &str = "popular";

/// A single ranked item returned to the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationItem {
    pub item_id: String,
    pub title: String,
    pub score: f64,
    pub reason: Option<String>,
}

/// Output of a personalized lookup
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationResult {
    pub items: Vec<RecommendationItem>,
    /// True only when the whole list came from the popularity fallback
    pub fallback_used: bool,
}

/// Aggregated per-item watch history row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryItem {
    pub item_id: String,
    pub title: String,
    pub watch_seconds: i64,
    /// ISO-8601 text of the latest event, if any event carried a timestamp
    pub timestamp: Option<String>,
}

/// Optional categorical filters shared by popular and personalized lookups
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CatalogFilter {
    pub content_type: Option<String>,
    pub genre: Option<String>,
}

impl CatalogFilter {
    pub fn new(content_type: Option<&str>, genre: Option<&str>) -> Self {
        Self {
            content_type: content_type.map(str::to_string),
            genre: genre.map(str::to_string),
        }
    }

    /// Lowercased, trimmed content_type; empty values impose no filter
    pub fn content_type_key(&self) -> Option<String> {
        normalize_filter(self.content_type.as_deref())
    }

    pub fn genre_key(&self) -> Option<String> {
        normalize_filter(self.genre.as_deref())
    }
}

fn normalize_filter(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_lowercase)
}
