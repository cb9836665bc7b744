use std::collections::HashSet;

use super::{filter::FilterMatcher, Recommender};
use crate::models::{CatalogFilter, RecommendationItem, RecommendationResult, POPULAR_REASON};

impl Recommender {
    /// Most-watched items in popularity order, honoring filters and exclusions
    pub fn recommend_popular(
        &self,
        k: usize,
        exclude_item_ids: Option<&HashSet<String>>,
        filter: &CatalogFilter,
    ) -> Vec<RecommendationItem> {
        self.popularity.top(k, exclude_item_ids, filter)
    }

    /// Personalized ranking: similarity-weighted watch time, with popularity
    /// fallback for cold-start users and popularity top-up for short lists.
    pub fn recommend_for_user(
        &self,
        user_id: &str,
        k: usize,
        filter: &CatalogFilter,
    ) -> RecommendationResult {
        let user_vector = match self.interactions.user_row(user_id) {
            Some(row) if row.sum() > 0.0 => row,
            _ => {
                tracing::debug!(user_id, "Cold start, serving popular items");
                return self.popular_fallback(k, filter);
            }
        };

        let matcher = FilterMatcher::new(filter, self.columns);
        let allowed: Option<Vec<bool>> = matcher
            .is_active()
            .then(|| self.items.iter().map(|item| matcher.matches(item)).collect());

        let threshold = self.watch_exclude_threshold as f64;
        let excluded: Vec<bool> = user_vector.iter().map(|&w| w > threshold).collect();

        let mut scores = self.similarity.scores(user_vector);
        for (score, &is_excluded) in scores.iter_mut().zip(&excluded) {
            if is_excluded {
                *score = f64::NEG_INFINITY;
            }
        }

        // score desc, then column index asc (= item_id asc)
        let mut ranked: Vec<usize> = (0..scores.len()).collect();
        ranked.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]).then(a.cmp(&b)));

        let watched: Vec<usize> = user_vector
            .iter()
            .enumerate()
            .filter(|(_, &w)| w > 0.0)
            .map(|(idx, _)| idx)
            .collect();

        let mut results: Vec<RecommendationItem> = Vec::with_capacity(k);
        for idx in ranked {
            if results.len() >= k {
                break;
            }
            if !scores[idx].is_finite() {
                continue;
            }
            if allowed.as_ref().is_some_and(|allowed| !allowed[idx]) {
                continue;
            }
            if excluded[idx] {
                continue;
            }
            let item = &self.items[idx];
            results.push(RecommendationItem {
                item_id: item.item_id.clone(),
                title: item.title.clone(),
                score: scores[idx],
                reason: self.reason_for(idx, &watched),
            });
        }

        let personalized = results.len();
        if results.len() < k {
            let mut already: HashSet<String> =
                results.iter().map(|r| r.item_id.clone()).collect();
            already.extend(
                excluded
                    .iter()
                    .enumerate()
                    .filter(|(_, &is_excluded)| is_excluded)
                    .map(|(idx, _)| self.items[idx].item_id.clone()),
            );
            let top_up = self.recommend_popular(k - results.len(), Some(&already), filter);
            results.extend(top_up);
        }

        tracing::debug!(
            user_id,
            personalized,
            top_up = results.len() - personalized,
            "Ranked recommendations"
        );

        RecommendationResult {
            items: results,
            fallback_used: false,
        }
    }

    fn popular_fallback(&self, k: usize, filter: &CatalogFilter) -> RecommendationResult {
        let items = self
            .recommend_popular(k, None, filter)
            .into_iter()
            .map(|item| RecommendationItem {
                reason: Some(POPULAR_REASON.to_string()),
                ..item
            })
            .collect();
        RecommendationResult {
            items,
            fallback_used: true,
        }
    }

    /// Explains a candidate by the watched item it is most similar to
    fn reason_for(&self, candidate: usize, watched: &[usize]) -> Option<String> {
        let mut best: Option<(usize, f64)> = None;
        for &seed in watched {
            let sim = self.similarity.get(candidate, seed);
            if best.map_or(true, |(_, best_sim)| sim > best_sim) {
                best = Some((seed, sim));
            }
        }

        let (seed, sim) = best?;
        if sim <= 0.0 {
            return None;
        }
        let title = &self.items[seed].title;
        if title.is_empty() {
            return None;
        }
        Some(format!("similar to item you watched: {}", title))
    }
}
