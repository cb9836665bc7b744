use std::collections::BTreeMap;

use chrono::NaiveDateTime;

use super::Recommender;
use crate::models::HistoryItem;

impl Recommender {
    /// Most recently watched items for a user, aggregated per item.
    ///
    /// Ordered by latest timestamp (untimed last), then total watch seconds,
    /// then item_id. Unknown users get an empty list.
    pub fn get_user_history(&self, user_id: &str, k: usize) -> Vec<HistoryItem> {
        if k == 0 {
            return Vec::new();
        }
        let Some(events) = self.events_by_user.get(user_id) else {
            return Vec::new();
        };

        let mut per_item: BTreeMap<&str, (i64, Option<NaiveDateTime>)> = BTreeMap::new();
        for event in events {
            let entry = per_item.entry(event.item_id.as_str()).or_insert((0, None));
            entry.0 = entry.0.saturating_add(event.watch_seconds);
            // None orders below Some, so max skips null timestamps
            entry.1 = entry.1.max(event.timestamp);
        }

        let mut rows: Vec<(&str, i64, Option<NaiveDateTime>)> = per_item
            .into_iter()
            .map(|(item_id, (watch_seconds, last))| (item_id, watch_seconds, last))
            .collect();
        rows.sort_by(|a, b| {
            b.2.cmp(&a.2)
                .then_with(|| b.1.cmp(&a.1))
                .then_with(|| a.0.cmp(&b.0))
        });

        rows.into_iter()
            .take(k)
            .map(|(item_id, watch_seconds, last)| HistoryItem {
                item_id: item_id.to_string(),
                title: self.title_of(item_id).to_string(),
                watch_seconds,
                timestamp: last.map(format_timestamp),
            })
            .collect()
    }
}

fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format("%Y-%m-%dT%H:%M:%S%.f").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Dataset, Event, Item};
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn engine() -> Recommender {
        let dataset = Dataset {
            users: Vec::new(),
            items: vec![
                Item::new("i1", "Pilot"),
                Item::new("i2", "Finale"),
                Item::new("i3", "Cold Open"),
            ],
            events: vec![
                Event::new("u1", "i1", 100).at(at(1, 9)),
                Event::new("u1", "i1", 150).at(at(3, 20)),
                Event::new("u1", "i2", 400).at(at(2, 8)),
                Event::new("u1", "i3", 50),
                Event::new("u1", "ghost", 10).at(at(2, 8)),
                Event::new("u2", "i2", 999).at(at(5, 5)),
            ],
        };
        Recommender::fit(&dataset, 600)
    }

    #[test]
    fn test_history_aggregates_and_orders_by_recency() {
        let history = engine().get_user_history("u1", 20);
        let rows: Vec<(&str, i64)> = history
            .iter()
            .map(|h| (h.item_id.as_str(), h.watch_seconds))
            .collect();
        // ghost and i2 share a timestamp; i2 wins on watch seconds
        assert_eq!(
            rows,
            vec![("i1", 250), ("i2", 400), ("ghost", 10), ("i3", 50)]
        );
        assert_eq!(history[0].title, "Pilot");
        assert_eq!(history[0].timestamp.as_deref(), Some("2024-01-03T20:00:00"));
        assert_eq!(history[2].title, "");
        assert_eq!(history[3].timestamp, None);
    }

    #[test]
    fn test_history_respects_k() {
        let history = engine().get_user_history("u1", 2);
        assert_eq!(history.len(), 2);
        assert!(engine().get_user_history("u1", 0).is_empty());
    }

    #[test]
    fn test_history_for_unknown_user_is_empty() {
        assert!(engine().get_user_history("nobody", 10).is_empty());
    }

    #[test]
    fn test_history_totals_saturate() {
        let dataset = Dataset {
            users: Vec::new(),
            items: vec![Item::new("i1", "Pilot")],
            events: vec![
                Event::new("u1", "i1", i64::MAX),
                Event::new("u1", "i1", i64::MAX),
            ],
        };
        let history = Recommender::fit(&dataset, 600).get_user_history("u1", 5);
        assert_eq!(history[0].watch_seconds, i64::MAX);
    }
}
