//! Item-based collaborative filtering over watch time.
//!
//! A [`Recommender`] is fitted once from a full [`Dataset`] snapshot and is
//! read-only afterwards. Reflecting new events means fitting a new instance.

mod filter;
mod history;
mod matrix;
mod popularity;
mod ranking;
mod similarity;

use std::collections::{HashMap, HashSet};
use std::time::Instant;

pub use filter::CatalogColumns;
pub use matrix::InteractionMatrix;
pub use popularity::{PopularEntry, PopularityTable};
pub use similarity::SimilarityMatrix;

use crate::{
    data::{DataLoader, DataPaths},
    error::AppResult,
    models::{Dataset, Event, Item},
};

/// Items watched strictly longer than this many seconds are not recommended back
pub const DEFAULT_WATCH_EXCLUDE_THRESHOLD: i64 = 600;

/// Frozen recommendation model
#[derive(Debug, Clone)]
pub struct Recommender {
    /// Catalog aligned with the interaction matrix columns
    items: Vec<Item>,
    columns: CatalogColumns,
    popularity: PopularityTable,
    interactions: InteractionMatrix,
    similarity: SimilarityMatrix,
    events_by_user: HashMap<String, Vec<Event>>,
    watch_exclude_threshold: i64,
}

impl Recommender {
    /// Loads the CSV relations and fits on them. Nothing is kept if either step fails.
    pub fn load(paths: &DataPaths, watch_exclude_threshold: i64) -> AppResult<Self> {
        let dataset = DataLoader::new(paths.clone()).load_all()?;
        Ok(Self::fit(&dataset, watch_exclude_threshold))
    }

    pub fn fit(dataset: &Dataset, watch_exclude_threshold: i64) -> Self {
        let started = Instant::now();

        let items = unique_sorted_items(&dataset.items);
        let columns = CatalogColumns::of(&items);
        let popularity = PopularityTable::build(&items, &dataset.events);
        let interactions = InteractionMatrix::build(
            &dataset.events,
            items.iter().map(|i| i.item_id.as_str()),
        );
        let similarity = SimilarityMatrix::from_interactions(&interactions);

        let mut events_by_user: HashMap<String, Vec<Event>> = HashMap::new();
        for event in &dataset.events {
            events_by_user
                .entry(event.user_id.clone())
                .or_default()
                .push(event.clone());
        }

        let (n_users, n_items) = interactions.shape();
        tracing::info!(
            users = dataset.users.len(),
            items = n_items,
            events = dataset.events.len(),
            matrix_users = n_users,
            watch_exclude_threshold,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Recommender fitted"
        );

        Self {
            items,
            columns,
            popularity,
            interactions,
            similarity,
            events_by_user,
            watch_exclude_threshold,
        }
    }

    pub fn popularity(&self) -> &PopularityTable {
        &self.popularity
    }

    pub fn interactions(&self) -> &InteractionMatrix {
        &self.interactions
    }

    pub fn similarity(&self) -> &SimilarityMatrix {
        &self.similarity
    }

    /// Title of a catalog item, or "" for item_ids outside the catalog
    pub fn title_of(&self, item_id: &str) -> &str {
        self.interactions
            .item_index(item_id)
            .map(|idx| self.items[idx].title.as_str())
            .unwrap_or("")
    }
}

/// First occurrence wins for duplicate item_ids; result is in item_id order
fn unique_sorted_items(items: &[Item]) -> Vec<Item> {
    let mut seen = HashSet::new();
    let mut unique: Vec<Item> = items
        .iter()
        .filter(|item| seen.insert(item.item_id.as_str()))
        .cloned()
        .collect();
    unique.sort_by(|a, b| a.item_id.cmp(&b.item_id));
    unique
}
