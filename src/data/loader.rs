use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use csv::{ReaderBuilder, StringRecord};

use crate::{
    error::{AppError, AppResult},
    models::{Dataset, Event, Item, User},
};

const UNKNOWN: &str = "unknown";

const USER_COLUMNS: &[&str] = &["user_id", "name", "age", "gender", "region"];
const ITEM_COLUMNS: &[&str] = &["item_id", "title"];
const EVENT_COLUMNS: &[&str] = &["user_id", "item_id", "event_type", "watch_seconds", "timestamp"];

/// Locations of the three raw CSV relations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    pub users_csv: PathBuf,
    pub items_csv: PathBuf,
    pub events_csv: PathBuf,
}

impl DataPaths {
    pub fn from_raw_dir(raw_dir: impl AsRef<Path>) -> Self {
        let raw_dir = raw_dir.as_ref();
        Self {
            users_csv: raw_dir.join("users.csv"),
            items_csv: raw_dir.join("items.csv"),
            events_csv: raw_dir.join("events.csv"),
        }
    }
}

/// Reads and cleans users.csv, items.csv and events.csv
pub struct DataLoader {
    paths: DataPaths,
}

impl DataLoader {
    pub fn new(paths: DataPaths) -> Self {
        Self { paths }
    }

    pub fn load_all(&self) -> AppResult<Dataset> {
        let users = self.load_users()?;
        let items = self.load_items()?;
        let events = self.load_events()?;

        tracing::info!(
            users = users.len(),
            items = items.len(),
            events = events.len(),
            "Loaded raw relations"
        );

        Ok(Dataset {
            users,
            items,
            events,
        })
    }

    pub fn load_users(&self) -> AppResult<Vec<User>> {
        let table = Table::read(&self.paths.users_csv, "users.csv")?;
        table.ensure_columns(USER_COLUMNS)?;

        let mut ids = Vec::with_capacity(table.rows.len());
        let mut rest = Vec::with_capacity(table.rows.len());
        let mut ages: Vec<Option<f64>> = Vec::with_capacity(table.rows.len());
        let mut dropped = 0usize;

        for row in &table.rows {
            let Some(user_id) = table.value(row, "user_id") else {
                dropped += 1;
                continue;
            };
            ids.push(user_id.to_string());
            rest.push((
                table.value_or_unknown(row, "name"),
                table.value_or_unknown(row, "gender"),
                table.value_or_unknown(row, "region"),
            ));
            ages.push(table.value(row, "age").and_then(parse_number));
        }
        warn_dropped(dropped, "users.csv", "user_id");

        let fallback_age = median(ages.iter().flatten().copied()).unwrap_or(0.0);

        Ok(ids
            .into_iter()
            .zip(rest)
            .zip(ages)
            .map(|((user_id, (name, gender, region)), age)| User {
                user_id,
                name,
                age: age.unwrap_or(fallback_age).round_ties_even() as i64,
                gender,
                region,
            })
            .collect())
    }

    pub fn load_items(&self) -> AppResult<Vec<Item>> {
        let table = Table::read(&self.paths.items_csv, "items.csv")?;
        table.ensure_columns(ITEM_COLUMNS)?;
        let has_content_type = table.has_column("content_type");
        let has_genre = table.has_column("genre");

        let mut items = Vec::with_capacity(table.rows.len());
        let mut dropped = 0usize;

        for row in &table.rows {
            let Some(item_id) = table.value(row, "item_id") else {
                dropped += 1;
                continue;
            };
            items.push(Item {
                item_id: item_id.to_string(),
                title: table.value_or_unknown(row, "title"),
                content_type: has_content_type.then(|| table.value_or_unknown(row, "content_type")),
                genre: has_genre.then(|| table.value_or_unknown(row, "genre")),
            });
        }
        warn_dropped(dropped, "items.csv", "item_id");

        Ok(items)
    }

    pub fn load_events(&self) -> AppResult<Vec<Event>> {
        let table = Table::read(&self.paths.events_csv, "events.csv")?;
        table.ensure_columns(EVENT_COLUMNS)?;

        let mut events = Vec::with_capacity(table.rows.len());
        let mut dropped = 0usize;

        for row in &table.rows {
            let (Some(user_id), Some(item_id)) =
                (table.value(row, "user_id"), table.value(row, "item_id"))
            else {
                dropped += 1;
                continue;
            };
            events.push(Event {
                user_id: user_id.to_string(),
                item_id: item_id.to_string(),
                event_type: table.value_or_unknown(row, "event_type"),
                watch_seconds: table
                    .value(row, "watch_seconds")
                    .map(parse_watch_seconds)
                    .unwrap_or(0),
                timestamp: table.value(row, "timestamp").and_then(parse_timestamp),
            });
        }
        warn_dropped(dropped, "events.csv", "user_id/item_id");

        Ok(events)
    }
}

/// A header-indexed CSV relation with trimmed headers
struct Table {
    name: &'static str,
    headers: Vec<String>,
    rows: Vec<StringRecord>,
}

impl Table {
    fn read(path: &Path, name: &'static str) -> AppResult<Self> {
        let mut reader = ReaderBuilder::new().flexible(true).from_path(path)?;
        let headers = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        let rows = reader.records().collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            name,
            headers,
            rows,
        })
    }

    fn ensure_columns(&self, required: &[&str]) -> AppResult<()> {
        let missing: Vec<String> = required
            .iter()
            .filter(|c| !self.has_column(c))
            .map(|c| c.to_string())
            .collect();
        if missing.is_empty() {
            return Ok(());
        }
        Err(AppError::Schema {
            relation: self.name.to_string(),
            missing,
            found: self.headers.clone(),
        })
    }

    fn has_column(&self, name: &str) -> bool {
        self.headers.iter().any(|h| h == name)
    }

    /// Trimmed non-empty cell value
    fn value<'a>(&self, row: &'a StringRecord, column: &str) -> Option<&'a str> {
        let idx = self.headers.iter().position(|h| h == column)?;
        row.get(idx).map(str::trim).filter(|s| !s.is_empty())
    }

    fn value_or_unknown(&self, row: &StringRecord, column: &str) -> String {
        self.value(row, column).unwrap_or(UNKNOWN).to_string()
    }
}

fn warn_dropped(dropped: usize, relation: &str, key: &str) {
    if dropped > 0 {
        tracing::warn!(relation, key, dropped, "Dropped rows with empty key");
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Invalid, missing or negative values all become 0
pub(crate) fn parse_watch_seconds(raw: &str) -> i64 {
    parse_number(raw)
        .map(|v| v.max(0.0).round_ties_even() as i64)
        .unwrap_or(0)
}

/// Accepts RFC 3339 (normalized to UTC) and common naive layouts; anything else is null
pub(crate) fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc).naive_utc());
    }
    const LAYOUTS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ];
    LAYOUTS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(raw, layout).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn median(values: impl Iterator<Item = f64>) -> Option<f64> {
    let mut values: Vec<f64> = values.collect();
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_fixture(users: &str, items: &str, events: &str) -> (TempDir, DataLoader) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("users.csv"), users).unwrap();
        fs::write(dir.path().join("items.csv"), items).unwrap();
        fs::write(dir.path().join("events.csv"), events).unwrap();
        let loader = DataLoader::new(DataPaths::from_raw_dir(dir.path()));
        (dir, loader)
    }

    const USERS: &str = "user_id,name,age,gender,region\n\
                         u1,Ana,30,f,west\n\
                         u2,,,m,\n\
                         u3,Budi,40,,east\n";
    const ITEMS: &str = "item_id,title,content_type,genre\n\
                         i1,Pilot,Movie,Drama\n\
                         i2,,series,\n\
                         ,Orphan,tv,family\n";
    const EVENTS: &str = "user_id,item_id,event_type,watch_seconds,timestamp\n\
                          u1,i1,play,120.6,2024-01-02 10:00:00\n\
                          u1,i2,,-5,not-a-date\n\
                          u2,i1,play,abc,2024-01-03T08:30:00Z\n\
                          ,i1,play,50,2024-01-01\n";

    #[test]
    fn test_load_all_cleans_values() {
        let (_dir, loader) = write_fixture(USERS, ITEMS, EVENTS);
        let dataset = loader.load_all().unwrap();

        assert_eq!(dataset.users.len(), 3);
        assert_eq!(dataset.users[1].name, "unknown");
        assert_eq!(dataset.users[1].region, "unknown");
        // median of 30 and 40
        assert_eq!(dataset.users[1].age, 35);

        assert_eq!(dataset.items.len(), 2);
        assert_eq!(dataset.items[0].content_type.as_deref(), Some("Movie"));
        assert_eq!(dataset.items[1].title, "unknown");
        assert_eq!(dataset.items[1].genre.as_deref(), Some("unknown"));

        assert_eq!(dataset.events.len(), 3);
        assert_eq!(dataset.events[0].watch_seconds, 121);
        assert_eq!(dataset.events[1].watch_seconds, 0);
        assert_eq!(dataset.events[1].event_type, "unknown");
        assert_eq!(dataset.events[1].timestamp, None);
        assert_eq!(dataset.events[2].watch_seconds, 0);
        assert_eq!(
            dataset.events[2].timestamp.unwrap().to_string(),
            "2024-01-03 08:30:00"
        );
    }

    #[test]
    fn test_items_without_optional_columns() {
        let (_dir, loader) = write_fixture(USERS, "item_id,title\ni1,Pilot\n", EVENTS);
        let items = loader.load_items().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].content_type, None);
        assert_eq!(items[0].genre, None);
    }

    #[test]
    fn test_missing_columns_is_schema_error() {
        let (_dir, loader) = write_fixture(
            USERS,
            ITEMS,
            "user_id,item_id,watch_seconds\nu1,i1,10\n",
        );
        match loader.load_events() {
            Err(AppError::Schema {
                relation,
                missing,
                found,
            }) => {
                assert_eq!(relation, "events.csv");
                assert_eq!(missing, vec!["event_type", "timestamp"]);
                assert_eq!(found, vec!["user_id", "item_id", "watch_seconds"]);
            }
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_file_is_csv_error() {
        let dir = tempfile::tempdir().unwrap();
        let loader = DataLoader::new(DataPaths::from_raw_dir(dir.path()));
        assert!(matches!(loader.load_users(), Err(AppError::Csv(_))));
    }

    #[test]
    fn test_parse_watch_seconds() {
        assert_eq!(parse_watch_seconds("42"), 42);
        assert_eq!(parse_watch_seconds("2.5"), 2);
        assert_eq!(parse_watch_seconds("-1"), 0);
        assert_eq!(parse_watch_seconds("NaN"), 0);
        assert_eq!(parse_watch_seconds("ten"), 0);
    }

    #[test]
    fn test_parse_timestamp_layouts() {
        assert_eq!(
            parse_timestamp("2024-05-01").unwrap().to_string(),
            "2024-05-01 00:00:00"
        );
        assert_eq!(
            parse_timestamp("2024-05-01T12:00:00+02:00").unwrap().to_string(),
            "2024-05-01 10:00:00"
        );
        assert_eq!(
            parse_timestamp("2024-05-01 12:30").unwrap().to_string(),
            "2024-05-01 12:30:00"
        );
        assert!(parse_timestamp("yesterday").is_none());
    }
}
