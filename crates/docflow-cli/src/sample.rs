//! Demo dataset loaded into every CLI session

use chrono::{DateTime, Duration, Utc};
use docflow_core::{
    Department, Document, DocumentId, DocumentStore, DocumentType, Priority, Status, StoreError,
};

const KIB: u64 = 1024;

struct Row {
    id: &'static str,
    name: &'static str,
    doc_type: DocumentType,
    department: &'static str,
    submitted_by: &'static str,
    submitted_minutes_ago: i64,
    updated_minutes_ago: i64,
    status: Status,
    priority: Priority,
    reviewer: Option<&'static str>,
    size_kib: u64,
    description: &'static str,
}

const HOUR: i64 = 60;
const DAY: i64 = 24 * HOUR;

const ROWS: &[Row] = &[
    Row {
        id: "doc-001",
        name: "Service Contract Agreement 2024",
        doc_type: DocumentType::Contract,
        department: "Legal",
        submitted_by: "Sarah Johnson",
        submitted_minutes_ago: 2 * HOUR,
        updated_minutes_ago: HOUR,
        status: Status::UnderReview,
        priority: Priority::High,
        reviewer: Some("Michael Chen"),
        size_kib: 2458,
        description: "Annual service contract renewal with primary vendor including updated terms and conditions.",
    },
    Row {
        id: "doc-002",
        name: "Employee Handbook Update",
        doc_type: DocumentType::Policy,
        department: "HR",
        submitted_by: "David Lee",
        submitted_minutes_ago: 4 * HOUR,
        updated_minutes_ago: 30,
        status: Status::Pending,
        priority: Priority::Medium,
        reviewer: None,
        size_kib: 1843,
        description: "Updated employee handbook reflecting new remote work policies and benefits structure.",
    },
    Row {
        id: "doc-003",
        name: "Q3 Financial Report",
        doc_type: DocumentType::Report,
        department: "Finance",
        submitted_by: "Emily Rodriguez",
        submitted_minutes_ago: DAY,
        updated_minutes_ago: 6 * HOUR,
        status: Status::Approved,
        priority: Priority::Urgent,
        reviewer: Some("Robert Kim"),
        size_kib: 5325,
        description: "Quarterly financial performance report with revenue analysis and projections.",
    },
    Row {
        id: "doc-004",
        name: "Vendor Invoice #INV-2024-0912",
        doc_type: DocumentType::Invoice,
        department: "Finance",
        submitted_by: "Alex Thompson",
        submitted_minutes_ago: 3 * DAY,
        updated_minutes_ago: 2 * DAY,
        status: Status::Escalated,
        priority: Priority::Urgent,
        reviewer: Some("Jennifer Walsh"),
        size_kib: 892,
        description: "Large vendor invoice requiring additional approval due to amount exceeding standard limits.",
    },
    Row {
        id: "doc-005",
        name: "Vendor Invoice #INV-2024-0915",
        doc_type: DocumentType::Invoice,
        department: "Finance",
        submitted_by: "Alex Thompson",
        submitted_minutes_ago: 4 * HOUR,
        updated_minutes_ago: 4 * HOUR,
        status: Status::Pending,
        priority: Priority::Urgent,
        reviewer: None,
        size_kib: 892,
        description: "Office equipment invoice awaiting department sign-off.",
    },
    Row {
        id: "doc-006",
        name: "Data Privacy Compliance Report",
        doc_type: DocumentType::Report,
        department: "Compliance",
        submitted_by: "Lisa Chang",
        submitted_minutes_ago: 8 * HOUR,
        updated_minutes_ago: 6 * HOUR,
        status: Status::Pending,
        priority: Priority::High,
        reviewer: None,
        size_kib: 3174,
        description: "Quarterly data privacy compliance report including GDPR compliance status and recommendations.",
    },
    Row {
        id: "arch-001",
        name: "Q2 Financial Report 2024",
        doc_type: DocumentType::Report,
        department: "Finance",
        submitted_by: "Emily Rodriguez",
        submitted_minutes_ago: 92 * DAY,
        updated_minutes_ago: 90 * DAY,
        status: Status::Approved,
        priority: Priority::High,
        reviewer: Some("Robert Kim"),
        size_kib: 4915,
        description: "Quarterly financial performance report with revenue analysis and projections for Q2 2024.",
    },
    Row {
        id: "arch-002",
        name: "Marketing Strategy 2024",
        doc_type: DocumentType::Application,
        department: "Marketing",
        submitted_by: "Jessica Wilson",
        submitted_minutes_ago: 122 * DAY,
        updated_minutes_ago: 120 * DAY,
        status: Status::Approved,
        priority: Priority::Medium,
        reviewer: Some("Daniel Park"),
        size_kib: 6246,
        description: "Comprehensive marketing strategy for 2024 including budget allocation and campaign planning.",
    },
    Row {
        id: "arch-003",
        name: "IT Security Policy v2.1",
        doc_type: DocumentType::Policy,
        department: "IT",
        submitted_by: "Mark Stevens",
        submitted_minutes_ago: 183 * DAY,
        updated_minutes_ago: 180 * DAY,
        status: Status::Approved,
        priority: Priority::High,
        reviewer: Some("Lisa Chang"),
        size_kib: 2355,
        description: "Updated IT security policy incorporating new cybersecurity guidelines and incident response procedures.",
    },
    Row {
        id: "arch-004",
        name: "Annual Compliance Report 2023",
        doc_type: DocumentType::Report,
        department: "Compliance",
        submitted_by: "Lisa Chang",
        submitted_minutes_ago: 245 * DAY,
        updated_minutes_ago: 240 * DAY,
        status: Status::Approved,
        priority: Priority::Urgent,
        reviewer: Some("Michael Chen"),
        size_kib: 12_800,
        description: "Annual compliance report covering regulatory filings and audit findings.",
    },
    Row {
        id: "arch-005",
        name: "Employee Training Manual v1.0",
        doc_type: DocumentType::Policy,
        department: "HR",
        submitted_by: "David Lee",
        submitted_minutes_ago: 370 * DAY,
        updated_minutes_ago: 365 * DAY,
        status: Status::Rejected,
        priority: Priority::Medium,
        reviewer: Some("Sarah Mitchell"),
        size_kib: 8909,
        description: "Onboarding training manual, superseded before approval.",
    },
];

/// Sample records with times relative to `as_of`
pub(crate) fn documents(as_of: DateTime<Utc>) -> Vec<Document> {
    ROWS.iter()
        .map(|row| Document {
            id: DocumentId::new(row.id),
            name: row.name.to_string(),
            doc_type: row.doc_type,
            department: Department::new(row.department),
            submitted_by: row.submitted_by.to_string(),
            submitted_at: as_of - Duration::minutes(row.submitted_minutes_ago),
            last_updated: as_of - Duration::minutes(row.updated_minutes_ago),
            status: row.status,
            priority: row.priority,
            description: Some(row.description.to_string()),
            reviewer: row.reviewer.map(str::to_string),
            file_size: row.size_kib * KIB,
            attachments: Vec::new(),
        })
        .collect()
}

/// Scripted review pass over the open queue: every pending document is
/// taken into review, the first is approved and the second escalated.
pub(crate) fn walkthrough(store: &DocumentStore, reviewer: &str) -> Result<usize, StoreError> {
    let pending: Vec<DocumentId> = store
        .list()
        .into_iter()
        .filter(|d| d.status == Status::Pending)
        .map(|d| d.id)
        .collect();

    let mut steps = 0;
    for (i, id) in pending.iter().enumerate() {
        store.start_review(id, reviewer)?;
        steps += 1;
        match i {
            0 => store.approve(id, Some(reviewer)).map(|_| ())?,
            1 => store.escalate(id, Some(reviewer)).map(|_| ())?,
            _ => continue,
        }
        steps += 1;
    }
    Ok(steps)
}
