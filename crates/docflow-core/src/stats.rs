//! Aggregations over a snapshot
//!
//! Pure counting helpers behind the dashboard tiles and analytics page.

use crate::types::{Department, Document, DocumentType, Status};
use serde::Serialize;
use std::collections::BTreeMap;

/// Documents per status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub pending: usize,
    pub under_review: usize,
    pub approved: usize,
    pub rejected: usize,
    pub escalated: usize,
}

impl StatusCounts {
    fn bump(&mut self, status: Status) {
        match status {
            Status::Pending => self.pending += 1,
            Status::UnderReview => self.under_review += 1,
            Status::Approved => self.approved += 1,
            Status::Rejected => self.rejected += 1,
            Status::Escalated => self.escalated += 1,
        }
    }

    #[must_use]
    pub fn get(&self, status: Status) -> usize {
        match status {
            Status::Pending => self.pending,
            Status::UnderReview => self.under_review,
            Status::Approved => self.approved,
            Status::Rejected => self.rejected,
            Status::Escalated => self.escalated,
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.pending + self.under_review + self.approved + self.rejected + self.escalated
    }

    /// approved / (approved + rejected); `None` until something is decided
    #[must_use]
    pub fn approval_rate(&self) -> Option<f64> {
        let decided = self.approved + self.rejected;
        #[allow(clippy::cast_precision_loss)]
        (decided > 0).then(|| self.approved as f64 / decided as f64)
    }
}

/// Per-department row of the analytics page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepartmentStats {
    pub department: Department,
    pub counts: StatusCounts,
}

/// Per-type share of all documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TypeShare {
    pub doc_type: DocumentType,
    pub count: usize,
    /// Rounded to the nearest whole percent
    pub percentage: u8,
}

#[must_use]
pub fn status_counts(snapshot: &[Document]) -> StatusCounts {
    let mut counts = StatusCounts::default();
    for doc in snapshot {
        counts.bump(doc.status);
    }
    counts
}

/// Status counts per department, departments in name order.
/// Department names are grouped case-insensitively; the first spelling seen
/// is the one reported.
#[must_use]
pub fn department_breakdown(snapshot: &[Document]) -> Vec<DepartmentStats> {
    let mut groups: BTreeMap<String, DepartmentStats> = BTreeMap::new();
    for doc in snapshot {
        groups
            .entry(doc.department.key())
            .or_insert_with(|| DepartmentStats {
                department: doc.department.clone(),
                counts: StatusCounts::default(),
            })
            .counts
            .bump(doc.status);
    }
    groups.into_values().collect()
}

/// Count and share of every type present, most common first
#[must_use]
pub fn type_distribution(snapshot: &[Document]) -> Vec<TypeShare> {
    let total = snapshot.len();
    let mut shares: Vec<TypeShare> = DocumentType::ALL
        .into_iter()
        .map(|doc_type| {
            let count = snapshot.iter().filter(|d| d.doc_type == doc_type).count();
            TypeShare {
                doc_type,
                count,
                percentage: percent(count, total),
            }
        })
        .filter(|s| s.count > 0)
        .collect();
    shares.sort_by(|a, b| b.count.cmp(&a.count).then(a.doc_type.cmp(&b.doc_type)));
    shares
}

fn percent(part: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let rounded = (part * 100 + total / 2) / total;
    u8::try_from(rounded).unwrap_or(100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DocumentId, Priority};
    use chrono::Utc;

    fn doc(id: &str, department: &str, doc_type: DocumentType, status: Status) -> Document {
        let now = Utc::now();
        Document {
            id: DocumentId::new(id),
            name: id.to_string(),
            doc_type,
            department: Department::new(department),
            submitted_by: "x".to_string(),
            submitted_at: now,
            last_updated: now,
            status,
            priority: Priority::Low,
            description: None,
            reviewer: None,
            file_size: 0,
            attachments: Vec::new(),
        }
    }

    fn corpus() -> Vec<Document> {
        vec![
            doc("1", "Legal", DocumentType::Contract, Status::Approved),
            doc("2", "legal", DocumentType::Contract, Status::Pending),
            doc("3", "Finance", DocumentType::Invoice, Status::Rejected),
            doc("4", "Finance", DocumentType::Invoice, Status::Approved),
            doc("5", "HR", DocumentType::Policy, Status::Escalated),
            doc("6", "Finance", DocumentType::Invoice, Status::UnderReview),
        ]
    }

    #[test]
    fn counts_and_rate() {
        let counts = status_counts(&corpus());
        assert_eq!(counts.total(), 6);
        assert_eq!(counts.get(Status::Approved), 2);
        assert_eq!(counts.under_review, 1);
        let rate = counts.approval_rate().unwrap();
        assert!((rate - 2.0 / 3.0).abs() < f64::EPSILON);
        assert_eq!(StatusCounts::default().approval_rate(), None);
    }

    #[test]
    fn breakdown_groups_departments_case_insensitively() {
        let rows = department_breakdown(&corpus());
        let names: Vec<&str> = rows.iter().map(|r| r.department.as_str()).collect();
        assert_eq!(names, vec!["Finance", "HR", "Legal"]);
        assert_eq!(rows[2].counts.total(), 2);
        assert_eq!(rows[0].counts.rejected, 1);
    }

    #[test]
    fn breakdown_agrees_with_department_filter() {
        let snapshot = vec![
            doc("1", "ÉTUDES", DocumentType::Report, Status::Approved),
            doc("2", "études", DocumentType::Report, Status::Pending),
        ];
        let rows = department_breakdown(&snapshot);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].counts.total(), 2);
        assert!(snapshot[0].department.matches(&snapshot[1].department));
    }

    #[test]
    fn distribution_sorted_by_count() {
        let shares = type_distribution(&corpus());
        assert_eq!(shares[0].doc_type, DocumentType::Invoice);
        assert_eq!(shares[0].count, 3);
        assert_eq!(shares[0].percentage, 50);
        assert_eq!(shares[1].percentage, 33);
        assert_eq!(shares[2].percentage, 17);
        assert!(type_distribution(&[]).is_empty());
    }
}
