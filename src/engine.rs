//! Generic filter/sort/aggregate engine shared by every resource page.
//!
//! A page declares a [`ResourceConfig`] (which fields are searchable, which named
//! filters exist, how each sortable field compares, and the default ordering) and
//! hands its records plus the current [`Query`] to [`compute_view`]. The engine is a
//! pure function of those inputs: no I/O, no state kept between calls.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::warn;

/// Filter id that always passes.
pub const ALL_FILTER: &str = "all";

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Number(u64),
    Flag(bool),
    Timestamp(Option<DateTime<Utc>>),
}

/// A flat resource record that exposes its fields by name.
pub trait Record {
    fn field(&self, name: &str) -> Option<FieldValue<'_>>;
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum FieldKind {
    Text,
    Number,
    Flag,
    Timestamp,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            Self::Ascending => "▲",
            Self::Descending => "▼",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "asc" | "ascending" | "up" => Some(Self::Ascending),
            "desc" | "descending" | "down" => Some(Self::Descending),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub search: String,
    pub filter: String,
    pub sort: Option<SortSpec>,
    /// Reference instant for time-relative filters such as "recent".
    pub as_of: DateTime<Utc>,
}

impl Query {
    pub fn new(as_of: DateTime<Utc>) -> Self {
        Self {
            search: String::new(),
            filter: ALL_FILTER.to_string(),
            sort: None,
            as_of,
        }
    }

    pub fn at(&self, as_of: DateTime<Utc>) -> Self {
        Self {
            as_of,
            ..self.clone()
        }
    }

    pub fn is_default(&self) -> bool {
        self.search.is_empty() && self.filter == ALL_FILTER && self.sort.is_none()
    }
}

pub type FilterPredicate<R> = fn(&R, DateTime<Utc>) -> bool;

pub struct NamedFilter<R> {
    pub id: &'static str,
    pub label: &'static str,
    pub predicate: FilterPredicate<R>,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct SortField {
    pub id: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
}

pub struct ResourceConfig<R> {
    pub searchable: Vec<&'static str>,
    pub filters: Vec<NamedFilter<R>>,
    pub sort_fields: Vec<SortField>,
    pub default_sort: SortSpec,
}

#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum EngineError {
    #[error("unknown filter '{0}'")]
    UnknownFilter(String),
    #[error("unknown sort field '{0}'")]
    UnknownSortField(String),
    #[error("filter '{0}' is declared more than once or shadows \"all\"")]
    DuplicateFilter(String),
}

#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Summary {
    pub total: usize,
    pub counts: BTreeMap<&'static str, usize>,
}

impl Summary {
    pub fn count(&self, filter: &str) -> usize {
        if filter == ALL_FILTER {
            return self.total;
        }
        self.counts.get(filter).copied().unwrap_or(0)
    }
}

#[derive(Debug)]
pub struct View<'a, R> {
    pub rows: Vec<&'a R>,
    pub summary: Summary,
    /// Ordering that was actually applied (explicit or default).
    pub sort: SortSpec,
}

impl<R> ResourceConfig<R> {
    fn resolve_filter(&self, id: &str) -> Result<Option<FilterPredicate<R>>, EngineError> {
        if id == ALL_FILTER {
            return Ok(None);
        }
        self.filters
            .iter()
            .find(|filter| filter.id == id)
            .map(|filter| Some(filter.predicate))
            .ok_or_else(|| EngineError::UnknownFilter(id.to_string()))
    }

    fn resolve_sort(&self, id: &str) -> Result<SortField, EngineError> {
        self.sort_fields
            .iter()
            .find(|field| field.id == id)
            .copied()
            .ok_or_else(|| EngineError::UnknownSortField(id.to_string()))
    }

    /// Filter ids in display order, starting with "all".
    pub fn filter_ids(&self) -> Vec<&'static str> {
        std::iter::once(ALL_FILTER)
            .chain(self.filters.iter().map(|filter| filter.id))
            .collect()
    }

    pub fn filter_label(&self, id: &str) -> &'static str {
        self.filters
            .iter()
            .find(|filter| filter.id == id)
            .map(|filter| filter.label)
            .unwrap_or("All")
    }

    /// Checks that the declaration is self-consistent.
    pub fn validate(&self) -> Result<(), EngineError> {
        self.resolve_sort(&self.default_sort.field)?;
        for (index, filter) in self.filters.iter().enumerate() {
            let duplicate = filter.id == ALL_FILTER
                || self.filters[..index].iter().any(|seen| seen.id == filter.id);
            if duplicate {
                return Err(EngineError::DuplicateFilter(filter.id.to_string()));
            }
        }
        Ok(())
    }
}

/// Produces the filtered, sorted view plus per-filter counts.
///
/// Search and the named filter select rows; counts always describe the full record
/// set so filter tabs keep stable totals while the user types. Absent records are
/// treated as an empty collection.
pub fn compute_view<'a, R: Record>(
    records: Option<&'a [R]>,
    query: &Query,
    config: &ResourceConfig<R>,
) -> Result<View<'a, R>, EngineError> {
    let predicate = config.resolve_filter(&query.filter)?;
    let sort = query.sort.clone().unwrap_or_else(|| config.default_sort.clone());
    let field = config.resolve_sort(&sort.field)?;
    Ok(evaluate(records.unwrap_or(&[]), query, config, predicate, field, sort))
}

/// Same as [`compute_view`], but an unknown filter or sort field falls back to "all"
/// or the default ordering instead of failing the page.
pub fn compute_view_lenient<'a, R: Record>(
    records: Option<&'a [R]>,
    query: &Query,
    config: &ResourceConfig<R>,
) -> View<'a, R> {
    let predicate = config.resolve_filter(&query.filter).unwrap_or_else(|error| {
        warn!("{error}, showing all records");
        None
    });

    let requested = query.sort.clone().unwrap_or_else(|| config.default_sort.clone());
    let (field, sort) = match config.resolve_sort(&requested.field) {
        Ok(field) => (Some(field), requested),
        Err(error) => {
            warn!("{error}, using default sort");
            let fallback = config.default_sort.clone();
            (config.resolve_sort(&fallback.field).ok(), fallback)
        }
    };

    let records = records.unwrap_or(&[]);
    match field {
        Some(field) => evaluate(records, query, config, predicate, field, sort),
        None => {
            warn!("default sort field '{}' is not declared", sort.field);
            View {
                rows: select(records, query, config, predicate),
                summary: summarize(records, config, query.as_of),
                sort,
            }
        }
    }
}

fn evaluate<'a, R: Record>(
    records: &'a [R],
    query: &Query,
    config: &ResourceConfig<R>,
    predicate: Option<FilterPredicate<R>>,
    field: SortField,
    sort: SortSpec,
) -> View<'a, R> {
    let mut keyed = select(records, query, config, predicate)
        .into_iter()
        .map(|record| (sort_key(record, field), record))
        .collect::<Vec<_>>();

    // `sort_by` is stable; reversing the comparator keeps equal keys in input order.
    keyed.sort_by(|(left, _), (right, _)| match sort.direction {
        SortDirection::Ascending => left.cmp(right),
        SortDirection::Descending => right.cmp(left),
    });

    View {
        rows: keyed.into_iter().map(|(_, record)| record).collect(),
        summary: summarize(records, config, query.as_of),
        sort,
    }
}

fn select<'a, R: Record>(
    records: &'a [R],
    query: &Query,
    config: &ResourceConfig<R>,
    predicate: Option<FilterPredicate<R>>,
) -> Vec<&'a R> {
    let needle = query.search.to_lowercase();
    records
        .iter()
        .filter(|record| matches_search(*record, &needle, &config.searchable))
        .filter(|record| predicate.is_none_or(|passes| passes(*record, query.as_of)))
        .collect()
}

fn matches_search<R: Record>(record: &R, needle: &str, searchable: &[&str]) -> bool {
    if needle.is_empty() {
        return true;
    }

    searchable.iter().any(|name| match record.field(name) {
        Some(FieldValue::Text(value)) => value.to_lowercase().contains(needle),
        Some(FieldValue::Number(value)) => value.to_string().contains(needle),
        _ => false,
    })
}

fn summarize<R: Record>(
    records: &[R],
    config: &ResourceConfig<R>,
    as_of: DateTime<Utc>,
) -> Summary {
    let counts = config
        .filters
        .iter()
        .map(|filter| {
            let count = records
                .iter()
                .filter(|record| (filter.predicate)(*record, as_of))
                .count();
            (filter.id, count)
        })
        .collect();

    Summary {
        total: records.len(),
        counts,
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd)]
enum SortKey {
    Missing,
    Flag(bool),
    Number(u64),
    Instant(DateTime<Utc>),
    Text(String),
}

fn sort_key<R: Record>(record: &R, field: SortField) -> SortKey {
    match (field.kind, record.field(field.id)) {
        (FieldKind::Text, Some(FieldValue::Text(value))) => SortKey::Text(value.to_lowercase()),
        (FieldKind::Number, Some(FieldValue::Number(value))) => SortKey::Number(value),
        (FieldKind::Flag, Some(FieldValue::Flag(value))) => SortKey::Flag(value),
        (FieldKind::Timestamp, Some(FieldValue::Timestamp(Some(value)))) => {
            SortKey::Instant(value)
        }
        _ => SortKey::Missing,
    }
}
