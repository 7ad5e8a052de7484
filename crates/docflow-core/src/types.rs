//! Core record types
//!
//! Defines the document record and the enumerations that describe it:
//! - Document identifiers and departments
//! - Document type, review status and priority
//! - Attachments and submissions

use crate::error::ParseEnumError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;

/// Opaque document identifier, unique for the lifetime of a store
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Wrap an existing identifier
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh identifier (ULID, lexically sortable by creation time)
    #[inline]
    #[must_use]
    pub fn generate() -> Self {
        Self(Ulid::new().to_string())
    }

    /// Borrow as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for DocumentId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Owning department. The set is open: any non-blank name is accepted.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Department(String);

impl Department {
    /// Create from a name, trimming surrounding whitespace
    #[must_use]
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(name.as_ref().trim().to_string())
    }

    /// Borrow as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-folded form shared by listing filters and stats grouping
    #[must_use]
    pub fn key(&self) -> String {
        self.0.to_lowercase()
    }

    /// Case-insensitive comparison used by listing filters
    #[must_use]
    pub fn matches(&self, other: &Department) -> bool {
        self.0 == other.0 || self.key() == other.key()
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Department {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Kind of document being submitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentType {
    Contract,
    Invoice,
    Policy,
    Report,
    Application,
    Other,
}

impl DocumentType {
    /// Every type, in display order
    pub const ALL: [DocumentType; 6] = [
        DocumentType::Contract,
        DocumentType::Invoice,
        DocumentType::Policy,
        DocumentType::Report,
        DocumentType::Application,
        DocumentType::Other,
    ];

    /// Wire name, also the term matched by text search
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DocumentType::Contract => "contract",
            DocumentType::Invoice => "invoice",
            DocumentType::Policy => "policy",
            DocumentType::Report => "report",
            DocumentType::Application => "application",
            DocumentType::Other => "other",
        }
    }

    /// Human label
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            DocumentType::Contract => "Contract",
            DocumentType::Invoice => "Invoice",
            DocumentType::Policy => "Policy Document",
            DocumentType::Report => "Report",
            DocumentType::Application => "Application",
            DocumentType::Other => "Other",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| ParseEnumError::new("document type", s))
    }
}

/// Review status of a document
///
/// `Approved` and `Rejected` are terminal. `Escalated` is a holding state
/// awaiting a higher-authority decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    Pending,
    UnderReview,
    Approved,
    Rejected,
    Escalated,
}

impl Status {
    /// Every status, in display order
    pub const ALL: [Status; 5] = [
        Status::Pending,
        Status::UnderReview,
        Status::Approved,
        Status::Rejected,
        Status::Escalated,
    ];

    /// Wire name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::UnderReview => "under-review",
            Status::Approved => "approved",
            Status::Rejected => "rejected",
            Status::Escalated => "escalated",
        }
    }

    /// Human label
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Status::Pending => "Pending Review",
            Status::UnderReview => "Under Review",
            Status::Approved => "Approved",
            Status::Rejected => "Rejected",
            Status::Escalated => "Escalated",
        }
    }

    /// No transitions leave a terminal status
    #[inline]
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Approved | Status::Rejected)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|st| st.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| ParseEnumError::new("status", s))
    }
}

/// Review priority, ordered low to urgent
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    /// Every priority, lowest first
    pub const ALL: [Priority; 4] = [
        Priority::Low,
        Priority::Medium,
        Priority::High,
        Priority::Urgent,
    ];

    /// Numeric rank used for sorting
    #[inline]
    #[must_use]
    pub fn rank(self) -> u8 {
        match self {
            Priority::Low => 0,
            Priority::Medium => 1,
            Priority::High => 2,
            Priority::Urgent => 3,
        }
    }

    /// Wire name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| ParseEnumError::new("priority", s))
    }
}

/// File attached to a submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// File name as supplied by the uploader
    pub name: String,
    /// Size in bytes
    pub size: u64,
}

impl Attachment {
    /// Create attachment descriptor
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }

    /// Lower-cased extension without the dot, if any
    #[must_use]
    pub fn extension(&self) -> Option<String> {
        let (stem, ext) = self.name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }
}

/// A document record as owned by the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: DocumentId,
    pub name: String,
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
    pub department: Department,
    pub submitted_by: String,
    pub submitted_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    pub status: Status,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewer: Option<String>,
    /// Total size of all attachments, in bytes
    pub file_size: u64,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl Document {
    /// File size rendered for display, e.g. `2.4 MB`
    #[must_use]
    pub fn display_size(&self) -> String {
        format_file_size(self.file_size)
    }

    /// Finalized documents are eligible for the archive
    #[inline]
    #[must_use]
    pub fn is_finalized(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Input to [`DocumentStore::submit`](crate::store::DocumentStore::submit)
///
/// Fields are kept loose (`Option`, plain strings) so that incomplete form
/// state can be represented and reported back as a validation error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub name: String,
    #[serde(rename = "type")]
    pub doc_type: Option<DocumentType>,
    pub department: String,
    pub submitted_by: String,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl Submission {
    /// Create submission with the required metadata
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        doc_type: DocumentType,
        department: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            doc_type: Some(doc_type),
            department: department.into(),
            ..Self::default()
        }
    }

    /// With submitter
    #[inline]
    #[must_use]
    pub fn submitted_by(mut self, who: impl Into<String>) -> Self {
        self.submitted_by = who.into();
        self
    }

    /// With priority
    #[inline]
    #[must_use]
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// With description
    #[inline]
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Attach a file
    #[inline]
    #[must_use]
    pub fn attach(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }
}

/// Render a byte count with binary multiples: `512 B`, `892 KB`, `2.4 MB`
#[must_use]
pub fn format_file_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    #[allow(clippy::cast_precision_loss)]
    match bytes {
        b if b < KB => format!("{b} B"),
        b if b < MB => format!("{} KB", (b + KB / 2) / KB),
        b if b < GB => format!("{:.1} MB", b as f64 / MB as f64),
        b => format!("{:.1} GB", b as f64 / GB as f64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_kebab_case() {
        assert_eq!("under-review".parse::<Status>().unwrap(), Status::UnderReview);
        assert_eq!("Approved".parse::<Status>().unwrap(), Status::Approved);
        assert_eq!(
            serde_json::to_string(&Status::UnderReview).unwrap(),
            "\"under-review\""
        );
        assert!("archived".parse::<Status>().is_err());
    }

    #[test]
    fn terminal_statuses() {
        assert!(Status::Approved.is_terminal());
        assert!(Status::Rejected.is_terminal());
        assert!(!Status::Escalated.is_terminal());
        assert!(!Status::Pending.is_terminal());
    }

    #[test]
    fn priority_rank_is_ordered() {
        let ranks: Vec<u8> = Priority::ALL.iter().map(|p| p.rank()).collect();
        assert_eq!(ranks, vec![0, 1, 2, 3]);
        assert_eq!(Priority::default(), Priority::Medium);
    }

    #[test]
    fn document_type_labels() {
        assert_eq!(DocumentType::Policy.label(), "Policy Document");
        assert_eq!(" invoice ".parse::<DocumentType>().unwrap(), DocumentType::Invoice);
    }

    #[test]
    fn department_matching_ignores_case() {
        let legal = Department::new(" Legal ");
        assert_eq!(legal.as_str(), "Legal");
        assert!(legal.matches(&Department::new("legal")));
        assert!(!legal.matches(&Department::new("Finance")));
    }

    #[test]
    fn attachment_extension() {
        assert_eq!(Attachment::new("a.PDF", 1).extension().as_deref(), Some("pdf"));
        assert_eq!(Attachment::new("archive.tar.gz", 1).extension().as_deref(), Some("gz"));
        assert_eq!(Attachment::new("README", 1).extension(), None);
        assert_eq!(Attachment::new(".env", 1).extension(), None);
    }

    #[test]
    fn file_size_formatting() {
        assert_eq!(format_file_size(512), "512 B");
        assert_eq!(format_file_size(892 * 1024), "892 KB");
        assert_eq!(format_file_size(2_516_582), "2.4 MB");
        assert_eq!(format_file_size(3 * 1024 * 1024 * 1024), "3.0 GB");
    }

    #[test]
    fn generated_ids_are_unique() {
        let a = DocumentId::generate();
        let b = DocumentId::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 26);
    }
}
