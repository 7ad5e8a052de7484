//! Document store
//!
//! Owns the canonical document collection and is the only place a status
//! may change. All mutations take the write lock, so they are serialized
//! per store; readers get cloned snapshots.

use crate::audit::AuditLog;
use crate::clock::{Clock, SystemClock};
use crate::config::StoreConfig;
use crate::error::{FieldIssue, StoreError, ValidationError};
use crate::feed::{ChangeFeed, StoreEvent, Subscription};
use crate::state_machine;
use crate::types::{Department, Document, DocumentId, DocumentType, Status, Submission};
use indexmap::IndexMap;
use parking_lot::RwLock;
use tracing::{debug, info, warn};

/// Canonical, single-writer document collection
pub struct DocumentStore {
    config: StoreConfig,
    clock: Box<dyn Clock>,
    documents: RwLock<IndexMap<DocumentId, Document>>,
    feed: ChangeFeed,
    audit: AuditLog,
}

impl DocumentStore {
    /// Create an empty store using the wall clock
    pub fn new(config: StoreConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }

    /// Create an empty store with a custom time source
    pub fn with_clock(config: StoreConfig, clock: impl Clock + 'static) -> Self {
        Self {
            config,
            clock: Box::new(clock),
            documents: RwLock::new(IndexMap::new()),
            feed: ChangeFeed::default(),
            audit: AuditLog::default(),
        }
    }

    /// Configuration the store was built with
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Read-only view of the mutation trail
    pub fn audit_log(&self) -> &AuditLog {
        &self.audit
    }

    /// Subscribe to submissions and status changes from now on
    pub fn subscribe(&self) -> Subscription {
        self.feed.subscribe()
    }

    /// Load pre-existing records.
    ///
    /// The batch is checked as a whole before anything is inserted. Seeding
    /// emits no events and writes no audit entries.
    pub fn seed(&self, documents: impl IntoIterator<Item = Document>) -> Result<(), StoreError> {
        let batch: Vec<Document> = documents.into_iter().collect();
        let mut docs = self.documents.write();

        {
            let mut issues = ValidationError::new();
            let mut seen = std::collections::HashSet::new();
            for (i, doc) in batch.iter().enumerate() {
                if docs.contains_key(&doc.id) || !seen.insert(&doc.id) {
                    return Err(StoreError::DuplicateId(doc.id.clone()));
                }
                if doc.id.as_str().trim().is_empty() {
                    issues.push(FieldIssue::missing(format!("documents[{i}].id")));
                }
                if doc.last_updated < doc.submitted_at {
                    issues.push(FieldIssue::invalid(
                        format!("documents[{i}].lastUpdated"),
                        "earlier than submittedAt",
                    ));
                }
                if doc.status == Status::Pending && doc.reviewer.is_some() {
                    issues.push(FieldIssue::invalid(
                        format!("documents[{i}].reviewer"),
                        "pending documents have no reviewer",
                    ));
                }
            }
            issues.into_result()?;
        }

        let count = batch.len();
        for doc in batch {
            docs.insert(doc.id.clone(), doc);
        }
        debug!(count, "seeded documents");
        Ok(())
    }

    /// Accept a new document in `pending` status.
    pub fn submit(&self, submission: Submission) -> Result<Document, StoreError> {
        let doc_type = match self.validate_submission(&submission) {
            Ok(doc_type) => doc_type,
            Err(err) => {
                warn!(fields = ?err.missing_fields(), "submission rejected: {err}");
                return Err(err.into());
            }
        };

        let file_size = submission
            .attachments
            .iter()
            .fold(0u64, |acc, a| acc.saturating_add(a.size));

        let mut docs = self.documents.write();
        let mut id = DocumentId::generate();
        while docs.contains_key(&id) {
            id = DocumentId::generate();
        }

        let now = self.clock.now();
        let document = Document {
            id: id.clone(),
            name: submission.name.trim().to_string(),
            doc_type,
            department: Department::new(&submission.department),
            submitted_by: submission.submitted_by.trim().to_string(),
            submitted_at: now,
            last_updated: now,
            status: Status::Pending,
            priority: submission.priority.unwrap_or_default(),
            description: submission
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            reviewer: None,
            file_size,
            attachments: submission.attachments,
        };
        docs.insert(id.clone(), document.clone());

        self.audit.record(id, None, Status::Pending, None, now);
        self.feed.publish(&StoreEvent::Submitted {
            document: document.clone(),
        });
        info!(
            document_id = %document.id,
            department = %document.department,
            doc_type = %document.doc_type,
            "document submitted"
        );
        Ok(document)
    }

    /// Move a document along the workflow.
    ///
    /// `reviewer` is recorded on the document only if none is set yet; it is
    /// always recorded as the actor in the audit log.
    pub fn transition(
        &self,
        id: &DocumentId,
        target: Status,
        reviewer: Option<&str>,
    ) -> Result<Document, StoreError> {
        let mut docs = self.documents.write();
        let doc = docs
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;

        let previous = doc.status;
        if let Err(err) = state_machine::validate_transition(previous, target) {
            warn!(document_id = %id, from = %previous, to = %target, "transition rejected");
            return Err(err.for_document(id.clone()));
        }

        let actor = reviewer
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string);

        let now = self.clock.now();
        doc.status = target;
        doc.last_updated = now.max(doc.last_updated);
        if doc.reviewer.is_none() {
            doc.reviewer.clone_from(&actor);
        }
        let document = doc.clone();

        self.audit.record(
            id.clone(),
            Some(previous),
            target,
            actor.clone(),
            document.last_updated,
        );
        self.feed.publish(&StoreEvent::StatusChanged {
            previous,
            current: target,
            actor,
            document: document.clone(),
        });
        info!(document_id = %id, from = %previous, to = %target, "document transitioned");
        Ok(document)
    }

    /// Take a pending document into review
    pub fn start_review(&self, id: &DocumentId, reviewer: &str) -> Result<Document, StoreError> {
        self.transition(id, Status::UnderReview, Some(reviewer))
    }

    /// Final approval
    pub fn approve(&self, id: &DocumentId, reviewer: Option<&str>) -> Result<Document, StoreError> {
        self.transition(id, Status::Approved, reviewer)
    }

    /// Final rejection
    pub fn reject(&self, id: &DocumentId, reviewer: Option<&str>) -> Result<Document, StoreError> {
        self.transition(id, Status::Rejected, reviewer)
    }

    /// Hand up for a higher-level decision
    pub fn escalate(&self, id: &DocumentId, reviewer: Option<&str>) -> Result<Document, StoreError> {
        self.transition(id, Status::Escalated, reviewer)
    }

    /// Current state of one document
    pub fn get(&self, id: &DocumentId) -> Result<Document, StoreError> {
        self.documents
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    /// Actions currently available for a document
    pub fn available_transitions(&self, id: &DocumentId) -> Result<&'static [Status], StoreError> {
        let status = self
            .documents
            .read()
            .get(id)
            .map(|d| d.status)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        Ok(state_machine::allowed_transitions(status))
    }

    /// Point-in-time copy of every document, in insertion order
    pub fn list(&self) -> Vec<Document> {
        self.documents.read().values().cloned().collect()
    }

    /// Number of documents held
    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    /// Whether nothing has been submitted or seeded
    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }

    fn validate_submission(&self, s: &Submission) -> Result<DocumentType, ValidationError> {
        let mut err = ValidationError::new();

        if s.name.trim().is_empty() {
            err.push(FieldIssue::missing("name"));
        }
        if s.doc_type.is_none() {
            err.push(FieldIssue::missing("type"));
        }
        if s.department.trim().is_empty() {
            err.push(FieldIssue::missing("department"));
        }
        if s.attachments.is_empty() {
            err.push(FieldIssue::missing("attachments"));
        }

        for (i, attachment) in s.attachments.iter().enumerate() {
            let field = format!("attachments[{i}]");
            if attachment.name.trim().is_empty() {
                err.push(FieldIssue::invalid(field, "file name is empty"));
                continue;
            }
            match attachment.extension() {
                Some(ext) if self.config.accepts_extension(&ext) => {}
                Some(ext) => {
                    err.push(FieldIssue::invalid(
                        field.clone(),
                        format!("file type .{ext} is not accepted"),
                    ));
                }
                None => {
                    err.push(FieldIssue::invalid(field.clone(), "file has no extension"));
                }
            }
            if attachment.size > self.config.max_attachment_bytes {
                err.push(FieldIssue::invalid(
                    field,
                    format!(
                        "{} bytes exceeds the {} byte limit",
                        attachment.size, self.config.max_attachment_bytes
                    ),
                ));
            }
        }

        err.into_result()?;
        s.doc_type.ok_or_else(|| ValidationError {
            issues: vec![FieldIssue::missing("type")],
        })
    }
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

impl std::fmt::Debug for DocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentStore")
            .field("documents", &self.len())
            .field("audit_entries", &self.audit.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Attachment, Priority};
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Clone)]
    struct StepClock(Arc<Mutex<DateTime<Utc>>>);

    impl StepClock {
        fn new() -> Self {
            Self(Arc::new(Mutex::new(Utc.timestamp_opt(1_700_000_000, 0).unwrap())))
        }

        fn advance(&self, d: Duration) {
            *self.0.lock() += d;
        }
    }

    impl Clock for StepClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock()
        }
    }

    fn contract() -> Submission {
        Submission::new("Service Contract", DocumentType::Contract, "Legal")
            .submitted_by("Sarah Johnson")
            .attach(Attachment::new("contract.pdf", 2_400_000))
    }

    #[test]
    fn submit_creates_pending_document() {
        let store = DocumentStore::default();
        let doc = store.submit(contract()).unwrap();

        assert_eq!(doc.status, Status::Pending);
        assert_eq!(doc.reviewer, None);
        assert_eq!(doc.submitted_at, doc.last_updated);
        assert_eq!(doc.priority, Priority::Medium);
        assert_eq!(doc.file_size, 2_400_000);
        assert_eq!(store.get(&doc.id).unwrap(), doc);
        assert_eq!(store.audit_log().len(), 1);
    }

    #[test]
    fn submit_reports_all_missing_fields() {
        let store = DocumentStore::default();
        let err = store.submit(Submission::default()).unwrap_err();
        let validation = err.as_validation().unwrap();
        assert_eq!(
            validation.missing_fields(),
            vec!["name", "type", "department", "attachments"]
        );
        assert!(store.is_empty());
        assert!(store.audit_log().is_empty());
    }

    #[test]
    fn submit_checks_attachments_against_config() {
        let store = DocumentStore::new(StoreConfig::new().with_max_attachment_bytes(100));
        let err = store
            .submit(
                Submission::new("x", DocumentType::Other, "IT")
                    .attach(Attachment::new("setup.exe", 10))
                    .attach(Attachment::new("big.pdf", 101))
                    .attach(Attachment::new("  ", 1)),
            )
            .unwrap_err();
        let validation = err.as_validation().unwrap();
        assert!(validation.mentions("attachments[0]"));
        assert!(validation.mentions("attachments[1]"));
        assert!(validation.mentions("attachments[2]"));
        assert!(validation.missing_fields().is_empty());
    }

    #[test]
    fn transition_stamps_and_assigns_reviewer_once() {
        let clock = StepClock::new();
        let store = DocumentStore::with_clock(StoreConfig::default(), clock.clone());
        let doc = store.submit(contract()).unwrap();

        clock.advance(Duration::minutes(5));
        let reviewed = store.start_review(&doc.id, "r1").unwrap();
        assert_eq!(reviewed.status, Status::UnderReview);
        assert_eq!(reviewed.reviewer.as_deref(), Some("r1"));
        assert_eq!(reviewed.last_updated, doc.submitted_at + Duration::minutes(5));

        clock.advance(Duration::minutes(5));
        let approved = store.approve(&doc.id, Some("r2")).unwrap();
        assert_eq!(approved.reviewer.as_deref(), Some("r1"));

        let entries = store.audit_log().entries_for(&doc.id);
        assert_eq!(entries.last().unwrap().actor.as_deref(), Some("r2"));
    }

    #[test]
    fn last_updated_never_moves_backwards() {
        let clock = StepClock::new();
        let store = DocumentStore::with_clock(StoreConfig::default(), clock.clone());
        let doc = store.submit(contract()).unwrap();

        clock.advance(Duration::hours(-1));
        let escalated = store.escalate(&doc.id, None).unwrap();
        assert_eq!(escalated.last_updated, doc.last_updated);
        assert!(escalated.last_updated >= escalated.submitted_at);
    }

    #[test]
    fn invalid_transition_leaves_record_unchanged() {
        let store = DocumentStore::default();
        let doc = store.submit(contract()).unwrap();
        let rejected = store.reject(&doc.id, Some("r1")).unwrap();

        let err = store.approve(&doc.id, None).unwrap_err();
        assert_eq!(
            err,
            StoreError::InvalidTransition {
                id: doc.id.clone(),
                from: Status::Rejected,
                to: Status::Approved,
            }
        );
        assert_eq!(store.get(&doc.id).unwrap(), rejected);
        assert_eq!(store.audit_log().len(), 2);
    }

    #[test]
    fn unknown_id_is_not_found() {
        let store = DocumentStore::default();
        let missing = DocumentId::new("nope");
        assert_eq!(
            store.transition(&missing, Status::Approved, None),
            Err(StoreError::NotFound(missing.clone()))
        );
        assert!(store.get(&missing).is_err());
        assert!(store.available_transitions(&missing).is_err());
    }

    #[test]
    fn seed_rejects_duplicates_atomically() {
        let store = DocumentStore::default();
        let doc = store.submit(contract()).unwrap();

        let mut fresh = doc.clone();
        fresh.id = DocumentId::new("fresh");
        let err = store.seed(vec![fresh, doc.clone()]).unwrap_err();
        assert_eq!(err, StoreError::DuplicateId(doc.id));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn seed_rejects_time_travel() {
        let store = DocumentStore::default();
        let mut doc = store.submit(contract()).unwrap();
        doc.id = DocumentId::new("old");
        doc.last_updated = doc.submitted_at - Duration::seconds(1);

        let err = store.seed(vec![doc]).unwrap_err();
        assert!(err.as_validation().unwrap().mentions("documents[0].lastUpdated"));
    }

    #[test]
    fn seed_rejects_reviewed_pending_record() {
        let store = DocumentStore::default();
        let mut doc = store.submit(contract()).unwrap();
        doc.id = DocumentId::new("early");
        doc.reviewer = Some("r1".to_string());

        let err = store.seed(vec![doc.clone()]).unwrap_err();
        assert!(err.as_validation().unwrap().mentions("documents[0].reviewer"));
        assert_eq!(store.len(), 1);

        doc.status = Status::UnderReview;
        assert!(store.seed(vec![doc]).is_ok());
    }

    #[test]
    fn events_follow_mutation_order() {
        let store = DocumentStore::default();
        let mut sub = store.subscribe();

        let doc = store.submit(contract()).unwrap();
        store.start_review(&doc.id, "r1").unwrap();
        store.escalate(&doc.id, None).unwrap();
        let _ = store.start_review(&doc.id, "r1");

        let changes: Vec<_> = sub.drain().iter().map(StoreEvent::status_change).collect();
        assert_eq!(
            changes,
            vec![
                None,
                Some((Status::Pending, Status::UnderReview)),
                Some((Status::UnderReview, Status::Escalated)),
            ]
        );
    }
}
