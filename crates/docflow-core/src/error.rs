//! Error types for docflow
//!
//! Every store error is local and recoverable:
//! - Validation failures on submit or seed
//! - Unknown document ids
//! - Status changes the review workflow does not permit

use crate::types::{DocumentId, Status};
use std::fmt;

/// Main store error type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Missing or malformed input, nothing was mutated
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Referenced document does not exist
    #[error("document not found: {0}")]
    NotFound(DocumentId),

    /// Requested status change is not an edge of the workflow
    #[error("invalid transition for {id}: {from} -> {to}")]
    InvalidTransition {
        id: DocumentId,
        from: Status,
        to: Status,
    },

    /// Seeded record reuses an identifier already in the store
    #[error("duplicate document id: {0}")]
    DuplicateId(DocumentId),
}

impl StoreError {
    /// Store errors never poison the store; callers may correct and retry
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            StoreError::Validation(_)
            | StoreError::NotFound(_)
            | StoreError::InvalidTransition { .. }
            | StoreError::DuplicateId(_) => true,
        }
    }

    /// Validation details, if this is a validation failure
    #[inline]
    #[must_use]
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            StoreError::Validation(v) => Some(v),
            _ => None,
        }
    }
}

/// Bare state-machine rejection, without a document attached
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("transition not permitted: {from} -> {to}")]
pub struct TransitionError {
    pub from: Status,
    pub to: Status,
}

impl TransitionError {
    /// Attach the document id
    #[inline]
    #[must_use]
    pub fn for_document(self, id: DocumentId) -> StoreError {
        StoreError::InvalidTransition {
            id,
            from: self.from,
            to: self.to,
        }
    }
}

/// One problem with one input field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    pub field: String,
    pub kind: IssueKind,
}

/// What is wrong with a field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueKind {
    Missing,
    Invalid(String),
}

impl FieldIssue {
    /// Required field absent or blank
    #[must_use]
    pub fn missing(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind: IssueKind::Missing,
        }
    }

    /// Field present but unacceptable
    #[must_use]
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind: IssueKind::Invalid(reason.into()),
        }
    }
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            IssueKind::Missing => write!(f, "{} is required", self.field),
            IssueKind::Invalid(reason) => write!(f, "{}: {reason}", self.field),
        }
    }
}

/// All problems found in one input, reported together
#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
pub struct ValidationError {
    pub issues: Vec<FieldIssue>,
}

impl ValidationError {
    /// Empty collector
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an issue
    pub fn push(&mut self, issue: FieldIssue) {
        self.issues.push(issue);
    }

    /// Whether no issue was recorded
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Names of fields reported as missing
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&str> {
        self.issues
            .iter()
            .filter(|i| i.kind == IssueKind::Missing)
            .map(|i| i.field.as_str())
            .collect()
    }

    /// Whether any issue mentions `field`
    #[must_use]
    pub fn mentions(&self, field: &str) -> bool {
        self.issues.iter().any(|i| i.field == field)
    }

    /// `Ok(())` when empty, otherwise `Err(self)`
    pub fn into_result(self) -> Result<(), ValidationError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("validation failed: ")?;
        for (i, issue) in self.issues.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

/// Unrecognized enumeration value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value:?}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Audit chain errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuditError {
    /// Hash chain broken at the given entry
    #[error("audit integrity violation at sequence {sequence}")]
    IntegrityViolation { sequence: u64 },
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Could not read the file
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// File is not valid TOML for [`StoreConfig`](crate::config::StoreConfig)
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Values parse but are out of range
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_display_lists_every_issue() {
        let mut err = ValidationError::new();
        err.push(FieldIssue::missing("name"));
        err.push(FieldIssue::invalid("attachments[0]", "extension exe not allowed"));
        assert_eq!(
            err.to_string(),
            "validation failed: name is required; attachments[0]: extension exe not allowed"
        );
        assert_eq!(err.missing_fields(), vec!["name"]);
        assert!(err.mentions("attachments[0]"));
    }

    #[test]
    fn empty_validation_is_ok() {
        assert!(ValidationError::new().into_result().is_ok());
    }

    #[test]
    fn transition_error_carries_document() {
        let err = TransitionError {
            from: Status::Approved,
            to: Status::Pending,
        }
        .for_document(DocumentId::new("d1"));
        assert_eq!(err.to_string(), "invalid transition for d1: approved -> pending");
        assert!(err.is_recoverable());
    }
}
