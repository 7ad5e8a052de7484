//! Notification inbox
//!
//! Turns store events into user-facing notifications and tracks their read
//! state. Rendering is left to the caller.

use crate::feed::StoreEvent;
use crate::types::{DocumentId, Priority, Status};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotificationKind {
    Submission,
    Review,
    Approval,
    Rejection,
    Escalation,
}

impl NotificationKind {
    fn for_status(status: Status) -> Self {
        match status {
            Status::Pending => NotificationKind::Submission,
            Status::UnderReview => NotificationKind::Review,
            Status::Approved => NotificationKind::Approval,
            Status::Rejected => NotificationKind::Rejection,
            Status::Escalated => NotificationKind::Escalation,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: u64,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub document_id: DocumentId,
    pub document_name: String,
    pub actor: Option<String>,
    pub priority: Priority,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// Read/unread selector for [`NotificationInbox::filter`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReadFilter {
    #[default]
    Any,
    Unread,
    Read,
}

/// In-memory notification list, newest first
#[derive(Debug, Default)]
pub struct NotificationInbox {
    items: Vec<Notification>,
    next_id: u64,
}

impl NotificationInbox {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a notification for the event and return its id
    pub fn ingest(&mut self, event: &StoreEvent) -> u64 {
        let doc = event.document();
        let actor = match event {
            StoreEvent::Submitted { .. } => {
                Some(doc.submitted_by.clone()).filter(|who| !who.is_empty())
            }
            StoreEvent::StatusChanged { actor, .. } => actor.clone(),
        };
        let (kind, title, message) = match event {
            StoreEvent::Submitted { .. } => (
                NotificationKind::Submission,
                "New Document Submitted".to_string(),
                format!(
                    "A new {} has been submitted to {} and requires review.",
                    doc.doc_type, doc.department
                ),
            ),
            StoreEvent::StatusChanged { current, .. } => {
                let kind = NotificationKind::for_status(*current);
                let message = match current {
                    Status::Escalated => format!(
                        "'{}' has been escalated for a higher-level decision.",
                        doc.name
                    ),
                    Status::UnderReview => format!("'{}' is now under review.", doc.name),
                    other => format!(
                        "'{}' has been {} by the {} department.",
                        doc.name,
                        other.as_str(),
                        doc.department
                    ),
                };
                (kind, format!("Document {}", current.label()), message)
            }
        };

        let id = self.next_id;
        self.next_id += 1;
        self.items.insert(
            0,
            Notification {
                id,
                kind,
                title,
                message,
                document_id: doc.id.clone(),
                document_name: doc.name.clone(),
                actor,
                priority: doc.priority,
                read: false,
                created_at: doc.last_updated,
            },
        );
        id
    }

    #[must_use]
    pub fn unread_count(&self) -> usize {
        self.items.iter().filter(|n| !n.read).count()
    }

    /// Returns false if no notification has that id
    pub fn mark_read(&mut self, id: u64) -> bool {
        match self.items.iter_mut().find(|n| n.id == id) {
            Some(n) => {
                n.read = true;
                true
            }
            None => false,
        }
    }

    pub fn mark_all_read(&mut self) {
        for n in &mut self.items {
            n.read = true;
        }
    }

    /// Returns the removed notification, if any
    pub fn dismiss(&mut self, id: u64) -> Option<Notification> {
        let pos = self.items.iter().position(|n| n.id == id)?;
        Some(self.items.remove(pos))
    }

    #[must_use]
    pub fn all(&self) -> &[Notification] {
        &self.items
    }

    #[must_use]
    pub fn filter(&self, kind: Option<NotificationKind>, read: ReadFilter) -> Vec<&Notification> {
        self.items
            .iter()
            .filter(|n| kind.map_or(true, |k| n.kind == k))
            .filter(|n| match read {
                ReadFilter::Any => true,
                ReadFilter::Unread => !n.read,
                ReadFilter::Read => n.read,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::DocumentStore;
    use crate::types::{Attachment, DocumentType, Submission};

    #[test]
    fn inbox_follows_store_events() {
        let store = DocumentStore::default();
        let mut sub = store.subscribe();
        let doc = store
            .submit(
                Submission::new("Vendor Invoice #INV-2024-0915", DocumentType::Invoice, "Finance")
                    .attach(Attachment::new("inv.pdf", 900_000)),
            )
            .unwrap();
        store.escalate(&doc.id, Some("Michael Chen")).unwrap();

        let mut inbox = NotificationInbox::new();
        for event in sub.drain() {
            inbox.ingest(&event);
        }

        assert_eq!(inbox.unread_count(), 2);
        let newest = &inbox.all()[0];
        assert_eq!(newest.kind, NotificationKind::Escalation);
        assert_eq!(newest.title, "Document Escalated");
        assert_eq!(newest.actor.as_deref(), Some("Michael Chen"));
        assert_eq!(inbox.all()[1].kind, NotificationKind::Submission);
    }

    #[test]
    fn later_decision_credits_its_own_actor() {
        let store = DocumentStore::default();
        let doc = store
            .submit(
                Submission::new("Vendor Invoice #INV-2024-0912", DocumentType::Invoice, "Finance")
                    .submitted_by("Alex Thompson")
                    .attach(Attachment::new("inv.pdf", 900_000)),
            )
            .unwrap();
        let mut sub = store.subscribe();
        store.escalate(&doc.id, Some("r1")).unwrap();
        store.approve(&doc.id, Some("Director")).unwrap();

        let mut inbox = NotificationInbox::new();
        for event in sub.drain() {
            inbox.ingest(&event);
        }

        let newest = &inbox.all()[0];
        assert_eq!(newest.kind, NotificationKind::Approval);
        assert_eq!(newest.actor.as_deref(), Some("Director"));
        assert_eq!(inbox.all()[1].actor.as_deref(), Some("r1"));
        // the document keeps its first reviewer
        assert_eq!(store.get(&doc.id).unwrap().reviewer.as_deref(), Some("r1"));

        let audit = store.audit_log().entries_for(&doc.id);
        assert_eq!(audit.last().unwrap().actor, newest.actor);
    }

    #[test]
    fn read_state_and_dismissal() {
        let store = DocumentStore::default();
        let mut sub = store.subscribe();
        for name in ["a", "b", "c"] {
            store
                .submit(
                    Submission::new(name, DocumentType::Report, "Compliance")
                        .attach(Attachment::new("r.pdf", 1)),
                )
                .unwrap();
        }
        let mut inbox = NotificationInbox::new();
        let ids: Vec<u64> = sub.drain().iter().map(|e| inbox.ingest(e)).collect();

        assert!(inbox.mark_read(ids[0]));
        assert!(!inbox.mark_read(999));
        assert_eq!(inbox.filter(None, ReadFilter::Unread).len(), 2);
        assert_eq!(inbox.filter(Some(NotificationKind::Submission), ReadFilter::Read).len(), 1);

        let removed = inbox.dismiss(ids[1]).unwrap();
        assert_eq!(removed.document_name, "b");
        assert!(inbox.dismiss(ids[1]).is_none());

        inbox.mark_all_read();
        assert_eq!(inbox.unread_count(), 0);
        assert_eq!(inbox.all().len(), 2);
    }
}
