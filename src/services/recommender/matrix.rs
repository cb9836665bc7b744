use std::collections::{BTreeSet, HashMap};

use ndarray::{Array2, ArrayView1};

use crate::models::Event;

/// Dense user x item watch-time matrix.
///
/// Rows are every user seen in the events (ascending user_id). Columns are every
/// known item (ascending item_id), including items nobody watched. Events for
/// items outside the catalog are dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionMatrix {
    user_index: HashMap<String, usize>,
    item_ids: Vec<String>,
    item_index: HashMap<String, usize>,
    values: Array2<f64>,
}

impl InteractionMatrix {
    pub fn build<'a>(events: &[Event], known_items: impl IntoIterator<Item = &'a str>) -> Self {
        let item_ids: Vec<String> = known_items
            .into_iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect();
        let item_index = index_of(&item_ids);

        let user_ids: Vec<String> = events
            .iter()
            .map(|e| e.user_id.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect();
        let user_index = index_of(&user_ids);

        let mut sums: Array2<i64> = Array2::zeros((user_ids.len(), item_ids.len()));
        for event in events {
            let Some(&col) = item_index.get(&event.item_id) else {
                continue;
            };
            let row = user_index[&event.user_id];
            let cell = &mut sums[[row, col]];
            *cell = cell.saturating_add(event.watch_seconds);
        }

        Self {
            user_index,
            item_ids,
            item_index,
            values: sums.mapv(|v| v as f64),
        }
    }

    /// (users, items)
    pub fn shape(&self) -> (usize, usize) {
        self.values.dim()
    }

    pub fn item_ids(&self) -> &[String] {
        &self.item_ids
    }

    pub fn item_index(&self, item_id: &str) -> Option<usize> {
        self.item_index.get(item_id).copied()
    }

    /// Watch seconds per item for one user, aligned with `item_ids`
    pub fn user_row(&self, user_id: &str) -> Option<ArrayView1<'_, f64>> {
        self.user_index.get(user_id).map(|&row| self.values.row(row))
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }
}

fn index_of(ids: &[String]) -> HashMap<String, usize> {
    ids.iter()
        .enumerate()
        .map(|(idx, id)| (id.clone(), idx))
        .collect()
}
