//! Testing utilities for docflow workspace
//!
//! Shared fixtures: a pinned clock, submission builders and a corpus that
//! covers every status and every document type.

#![allow(missing_docs)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use docflow_core::{
    Attachment, Clock, Department, Document, DocumentId, DocumentStore, DocumentType, Priority,
    Status, StoreConfig, Submission,
};
use parking_lot::Mutex;
use std::sync::Arc;

/// 2024-09-15T12:00:00Z
pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 9, 15, 12, 0, 0).unwrap()
}

/// Clock that only moves when told to. Clones share the same instant.
#[derive(Debug, Clone)]
pub struct ManualClock(Arc<Mutex<DateTime<Utc>>>);

impl ManualClock {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self(Arc::new(Mutex::new(at)))
    }

    pub fn advance(&self, by: Duration) {
        *self.0.lock() += by;
    }

    pub fn set(&self, at: DateTime<Utc>) {
        *self.0.lock() = at;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(epoch())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock()
    }
}

/// Store with default config driven by the returned clock
pub fn setup_store() -> (DocumentStore, ManualClock) {
    let clock = ManualClock::default();
    let store = DocumentStore::with_clock(StoreConfig::default(), clock.clone());
    (store, clock)
}

/// Valid submission with one PDF attached
pub fn submission(name: &str, doc_type: DocumentType, department: &str) -> Submission {
    Submission::new(name, doc_type, department)
        .submitted_by("Test Submitter")
        .attach(Attachment::new(format!("{}.pdf", name.replace(' ', "_")), 1024 * 1024))
}

/// Record built directly, for seeding
pub fn make_document(
    id: &str,
    doc_type: DocumentType,
    department: &str,
    status: Status,
    submitted_hours_ago: i64,
) -> Document {
    let submitted_at = epoch() - Duration::hours(submitted_hours_ago);
    Document {
        id: DocumentId::new(id),
        name: format!("{} {id}", doc_type.label()),
        doc_type,
        department: Department::new(department),
        submitted_by: "Fixture Author".to_string(),
        submitted_at,
        last_updated: submitted_at,
        status,
        priority: Priority::Medium,
        description: None,
        reviewer: (status != Status::Pending).then(|| "Fixture Reviewer".to_string()),
        file_size: 512 * 1024,
        attachments: Vec::new(),
    }
}

/// Twelve documents spanning all five statuses and all six types
pub fn corpus() -> Vec<Document> {
    use DocumentType::{Application, Contract, Invoice, Other, Policy, Report};
    use Status::{Approved, Escalated, Pending, Rejected, UnderReview};

    vec![
        make_document("d01", Contract, "Legal", Pending, 2),
        make_document("d02", Invoice, "Finance", Approved, 4),
        make_document("d03", Invoice, "Finance", Rejected, 6),
        make_document("d04", Policy, "HR", UnderReview, 8),
        make_document("d05", Report, "Compliance", Escalated, 10),
        make_document("d06", Application, "Marketing", Approved, 12),
        make_document("d07", Other, "IT", Pending, 14),
        make_document("d08", Invoice, "Finance", Approved, 16),
        make_document("d09", Contract, "Legal", Rejected, 18),
        make_document("d10", Invoice, "Operations", UnderReview, 20),
        make_document("d11", Report, "Finance", Approved, 22),
        make_document("d12", Invoice, "Finance", Escalated, 24),
    ]
}

/// Store pre-loaded with [`corpus`]
pub fn seeded_store() -> (DocumentStore, ManualClock) {
    let (store, clock) = setup_store();
    store.seed(corpus()).unwrap();
    (store, clock)
}
