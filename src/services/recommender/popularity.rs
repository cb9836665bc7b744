use std::collections::{HashMap, HashSet};

use serde::Serialize;

use super::filter::{CatalogColumns, FilterMatcher};
use crate::models::{CatalogFilter, Event, Item, RecommendationItem, POPULAR_REASON};

/// One catalog item with its total watch time
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopularEntry {
    pub item_id: String,
    pub title: String,
    pub content_type: Option<String>,
    pub genre: Option<String>,
    pub popularity_watch_seconds: i64,
}

/// Every known item ranked by (watch seconds desc, item_id asc)
#[derive(Debug, Clone, PartialEq)]
pub struct PopularityTable {
    rows: Vec<PopularEntry>,
    columns: CatalogColumns,
}

impl PopularityTable {
    /// `items` must already be unique by item_id. Events for unknown items are ignored.
    pub fn build(items: &[Item], events: &[Event]) -> Self {
        let mut totals: HashMap<&str, i64> = HashMap::new();
        for event in events {
            let total = totals.entry(event.item_id.as_str()).or_insert(0);
            *total = total.saturating_add(event.watch_seconds);
        }

        let mut rows: Vec<PopularEntry> = items
            .iter()
            .map(|item| PopularEntry {
                item_id: item.item_id.clone(),
                title: item.title.clone(),
                content_type: item.content_type.clone(),
                genre: item.genre.clone(),
                popularity_watch_seconds: totals.get(item.item_id.as_str()).copied().unwrap_or(0),
            })
            .collect();

        rows.sort_by(|a, b| {
            b.popularity_watch_seconds
                .cmp(&a.popularity_watch_seconds)
                .then_with(|| a.item_id.cmp(&b.item_id))
        });

        Self {
            rows,
            columns: CatalogColumns::of(items),
        }
    }

    pub fn rows(&self) -> &[PopularEntry] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First `k` rows in table order that pass the filter and are not excluded
    pub fn top(
        &self,
        k: usize,
        exclude: Option<&HashSet<String>>,
        filter: &CatalogFilter,
    ) -> Vec<RecommendationItem> {
        let matcher = FilterMatcher::new(filter, self.columns);
        self.rows
            .iter()
            .filter(|row| {
                matcher.matches_parts(row.content_type.as_deref(), row.genre.as_deref())
            })
            .filter(|row| exclude.map_or(true, |ex| !ex.contains(&row.item_id)))
            .take(k)
            .map(|row| RecommendationItem {
                item_id: row.item_id.clone(),
                title: row.title.clone(),
                score: row.popularity_watch_seconds as f64,
                reason: Some(POPULAR_REASON.to_string()),
            })
            .collect()
    }
}
