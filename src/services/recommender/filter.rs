use crate::models::{CatalogFilter, Item};

/// Which optional categorical columns the catalog actually carries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatalogColumns {
    pub content_type: bool,
    pub genre: bool,
}

impl CatalogColumns {
    pub fn of(items: &[Item]) -> Self {
        Self {
            content_type: items.iter().any(|i| i.content_type.is_some()),
            genre: items.iter().any(|i| i.genre.is_some()),
        }
    }
}

/// Case-insensitive equality filter. A filter on a column the catalog lacks is ignored.
#[derive(Debug, Clone, Default)]
pub(crate) struct FilterMatcher {
    content_type: Option<String>,
    genre: Option<String>,
}

impl FilterMatcher {
    pub fn new(filter: &CatalogFilter, columns: CatalogColumns) -> Self {
        Self {
            content_type: filter.content_type_key().filter(|_| columns.content_type),
            genre: filter.genre_key().filter(|_| columns.genre),
        }
    }

    pub fn is_active(&self) -> bool {
        self.content_type.is_some() || self.genre.is_some()
    }

    pub fn matches(&self, item: &Item) -> bool {
        self.matches_parts(item.content_type.as_deref(), item.genre.as_deref())
    }

    pub fn matches_parts(&self, content_type: Option<&str>, genre: Option<&str>) -> bool {
        field_matches(self.content_type.as_deref(), content_type)
            && field_matches(self.genre.as_deref(), genre)
    }
}

fn field_matches(wanted: Option<&str>, actual: Option<&str>) -> bool {
    match wanted {
        None => true,
        Some(wanted) => actual.is_some_and(|v| v.to_lowercase() == wanted),
    }
}
