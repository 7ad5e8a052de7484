//! Listing queries
//!
//! One filter/sort model shared by every listing view (dashboard feed,
//! document list, department queue, archive). Queries are pure functions of
//! a snapshot and a [`QuerySpec`]; they never fail and never mutate.
//!
//! # Example
//!
//! ```rust,ignore
//! use docflow_core::{QueryEngine, QuerySpec, Status, DocumentType};
//!
//! let spec = QuerySpec::new()
//!     .with_status(Status::Approved)
//!     .with_type(DocumentType::Invoice);
//! let rows = QueryEngine::query(&store.list(), &spec);
//! ```

use crate::error::{FieldIssue, ParseEnumError, ValidationError};
use crate::types::{Department, Document, DocumentType, Status};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;
use tracing::debug;

/// Either everything, or only one value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Filter<T> {
    #[default]
    All,
    Only(T),
}

impl<T> Filter<T> {
    /// Whether `value` passes, given an equality predicate
    fn admits_by(&self, value: &T, eq: impl Fn(&T, &T) -> bool) -> bool {
        match self {
            Filter::All => true,
            Filter::Only(wanted) => eq(wanted, value),
        }
    }
}

impl<T: FromStr> Filter<T> {
    /// `"all"`, blank or unrecognized input all mean no filtering
    #[must_use]
    pub fn parse_lossy(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case("all") {
            return Filter::All;
        }
        raw.parse().map_or(Filter::All, Filter::Only)
    }
}

/// Sortable field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    #[default]
    SubmittedAt,
    LastUpdated,
    Priority,
    Name,
}

impl FromStr for SortField {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "submittedat" => Ok(SortField::SubmittedAt),
            "lastupdated" => Ok(SortField::LastUpdated),
            "priority" => Ok(SortField::Priority),
            "name" => Ok(SortField::Name),
            _ => Err(ParseEnumError::new("sort field", s)),
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Asc,
    #[default]
    Desc,
}

impl FromStr for Direction {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(Direction::Asc),
            "desc" | "descending" => Ok(Direction::Desc),
            _ => Err(ParseEnumError::new("sort direction", s)),
        }
    }
}

/// Sort order; defaults to newest submission first
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: Direction,
}

impl SortSpec {
    #[inline]
    #[must_use]
    pub fn new(field: SortField, direction: Direction) -> Self {
        Self { field, direction }
    }
}

/// Restricts a listing to finalized documents last touched before
/// `as_of - min_age`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveWindow {
    pub as_of: DateTime<Utc>,
    pub min_age: Duration,
}

impl ArchiveWindow {
    /// Latest `last_updated` still old enough; `None` when the window
    /// reaches back past the earliest representable instant.
    #[must_use]
    pub fn cutoff(&self) -> Option<DateTime<Utc>> {
        self.as_of.checked_sub_signed(self.min_age)
    }

    fn admits(&self, doc: &Document) -> bool {
        doc.is_finalized() && self.cutoff().is_some_and(|cutoff| doc.last_updated <= cutoff)
    }
}

/// Filters and ordering for one listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuerySpec {
    pub text_search: Option<String>,
    pub status: Filter<Status>,
    pub doc_type: Filter<DocumentType>,
    pub department: Filter<Department>,
    pub archive: Option<ArchiveWindow>,
    pub sort: SortSpec,
}

impl QuerySpec {
    /// No filtering, newest first
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_text(mut self, term: impl Into<String>) -> Self {
        self.text_search = Some(term.into());
        self
    }

    #[must_use]
    pub fn with_status(mut self, status: Status) -> Self {
        self.status = Filter::Only(status);
        self
    }

    #[must_use]
    pub fn with_type(mut self, doc_type: DocumentType) -> Self {
        self.doc_type = Filter::Only(doc_type);
        self
    }

    #[must_use]
    pub fn with_department(mut self, department: impl AsRef<str>) -> Self {
        self.department = Filter::Only(Department::new(department));
        self
    }

    #[must_use]
    pub fn with_sort(mut self, field: SortField, direction: Direction) -> Self {
        self.sort = SortSpec::new(field, direction);
        self
    }

    /// Archive view: finalized documents older than `min_age` at `as_of`
    #[must_use]
    pub fn archived(mut self, as_of: DateTime<Utc>, min_age: Duration) -> Self {
        self.archive = Some(ArchiveWindow { as_of, min_age });
        self
    }

    /// Build from raw UI state; unrecognized values fall back to defaults
    #[must_use]
    pub fn from_raw(raw: &RawQuery) -> Self {
        let text_search = raw
            .search
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);

        let department = match raw.department.as_deref().map(str::trim) {
            None | Some("") => Filter::All,
            Some(d) if d.eq_ignore_ascii_case("all") => Filter::All,
            Some(d) => Filter::Only(Department::new(d)),
        };

        let sort = SortSpec {
            field: raw
                .sort
                .as_deref()
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
            direction: raw
                .direction
                .as_deref()
                .and_then(|d| d.parse().ok())
                .unwrap_or_default(),
        };

        Self {
            text_search,
            status: raw.status.as_deref().map_or(Filter::All, Filter::parse_lossy),
            doc_type: raw.doc_type.as_deref().map_or(Filter::All, Filter::parse_lossy),
            department,
            archive: None,
            sort,
        }
    }

    fn matches(&self, doc: &Document) -> bool {
        self.matches_text(doc)
            && self.status.admits_by(&doc.status, |a, b| a == b)
            && self.doc_type.admits_by(&doc.doc_type, |a, b| a == b)
            && self.department.admits_by(&doc.department, Department::matches)
            && self.archive.map_or(true, |w| w.admits(doc))
    }

    fn matches_text(&self, doc: &Document) -> bool {
        let Some(term) = self.text_search.as_deref().map(str::trim) else {
            return true;
        };
        if term.is_empty() {
            return true;
        }
        let needle = term.to_lowercase();
        [doc.name.as_str(), doc.submitted_by.as_str(), doc.doc_type.as_str()]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }

    fn compare(&self, a: &Document, b: &Document) -> Ordering {
        let primary = match self.sort.field {
            SortField::SubmittedAt => a.submitted_at.cmp(&b.submitted_at),
            SortField::LastUpdated => a.last_updated.cmp(&b.last_updated),
            SortField::Priority => a.priority.rank().cmp(&b.priority.rank()),
            SortField::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        };
        let primary = match self.sort.direction {
            Direction::Asc => primary,
            Direction::Desc => primary.reverse(),
        };
        // Ties always resolve by id ascending, independent of direction.
        primary.then_with(|| a.id.cmp(&b.id))
    }
}

/// Query parameters exactly as a listing screen holds them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub doc_type: Option<String>,
    pub department: Option<String>,
    pub sort: Option<String>,
    pub direction: Option<String>,
}

impl RawQuery {
    /// Strict check for callers that want unknown values reported instead
    /// of silently widened to "all"
    pub fn validate_strict(&self) -> Result<(), ValidationError> {
        let mut err = ValidationError::new();

        if let Some(status) = non_all(self.status.as_deref()) {
            if status.parse::<Status>().is_err() {
                err.push(FieldIssue::invalid("status", format!("unknown status {status:?}")));
            }
        }
        if let Some(doc_type) = non_all(self.doc_type.as_deref()) {
            if doc_type.parse::<DocumentType>().is_err() {
                err.push(FieldIssue::invalid("type", format!("unknown type {doc_type:?}")));
            }
        }
        if let Some(sort) = self.sort.as_deref().filter(|s| !s.trim().is_empty()) {
            if sort.parse::<SortField>().is_err() {
                err.push(FieldIssue::invalid("sort", format!("unknown sort field {sort:?}")));
            }
        }
        if let Some(dir) = self.direction.as_deref().filter(|s| !s.trim().is_empty()) {
            if dir.parse::<Direction>().is_err() {
                err.push(FieldIssue::invalid("direction", format!("unknown direction {dir:?}")));
            }
        }

        err.into_result()
    }
}

fn non_all(value: Option<&str>) -> Option<&str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
}

/// Derives ordered listings from snapshots
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryEngine;

impl QueryEngine {
    /// Filtered, ordered copy of the matching documents
    #[must_use]
    pub fn query(snapshot: &[Document], spec: &QuerySpec) -> Vec<Document> {
        let mut rows: Vec<&Document> = snapshot.iter().filter(|d| spec.matches(d)).collect();
        rows.sort_by(|a, b| spec.compare(a, b));
        debug!(
            total = snapshot.len(),
            matched = rows.len(),
            "listing query evaluated"
        );
        rows.into_iter().cloned().collect()
    }

    /// Number of documents the spec would return
    #[must_use]
    pub fn count(snapshot: &[Document], spec: &QuerySpec) -> usize {
        snapshot.iter().filter(|d| spec.matches(d)).count()
    }
}
