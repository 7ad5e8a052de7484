//! Hash-chained audit trail of every store mutation

use crate::error::AuditError;
use crate::types::{DocumentId, Status};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// One recorded mutation. `previous` is `None` for submissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub sequence: u64,
    pub document_id: DocumentId,
    pub previous: Option<Status>,
    pub current: Status,
    pub actor: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(with = "hex_bytes")]
    pub prev_hash: [u8; 32],
    #[serde(with = "hex_bytes")]
    pub hash: [u8; 32],
}

/// Append-only mutation log, SHA-256 chained
///
/// Only the owning store appends; everyone else reads and verifies.
///
/// ```compile_fail
/// use docflow_core::{AuditLog, DocumentId, Status};
///
/// let log = AuditLog::default();
/// log.record(DocumentId::new("d1"), None, Status::Approved, None, chrono::Utc::now());
/// ```
#[derive(Debug, Default)]
pub struct AuditLog {
    inner: Mutex<Vec<AuditEntry>>,
}

impl AuditLog {
    /// Append a mutation record, chaining it to the previous entry.
    pub(crate) fn record(
        &self,
        document_id: DocumentId,
        previous: Option<Status>,
        current: Status,
        actor: Option<String>,
        timestamp: DateTime<Utc>,
    ) -> u64 {
        let mut guard = self.inner.lock();
        let prev_hash = guard.last().map_or([0u8; 32], |e| e.hash);
        let mut entry = AuditEntry {
            sequence: guard.len() as u64,
            document_id,
            previous,
            current,
            actor,
            timestamp,
            prev_hash,
            hash: [0u8; 32],
        };
        entry.hash = compute_hash(&entry);
        let sequence = entry.sequence;
        guard.push(entry);
        sequence
    }

    pub fn entries(&self) -> Vec<AuditEntry> {
        self.inner.lock().clone()
    }

    pub fn entries_for(&self, id: &DocumentId) -> Vec<AuditEntry> {
        self.inner
            .lock()
            .iter()
            .filter(|e| &e.document_id == id)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn verify_integrity(&self) -> Result<(), AuditError> {
        verify_chain(&self.inner.lock())
    }

    /// One JSON object per line, oldest first
    pub fn to_json_lines(&self) -> Result<String, serde_json::Error> {
        let guard = self.inner.lock();
        let mut out = String::new();
        for entry in guard.iter() {
            out.push_str(&serde_json::to_string(entry)?);
            out.push('\n');
        }
        Ok(out)
    }
}

/// Check a sequence of entries, e.g. one read back from an export.
pub fn verify_chain(entries: &[AuditEntry]) -> Result<(), AuditError> {
    let mut prev = [0u8; 32];
    for e in entries {
        if e.prev_hash != prev || e.hash != compute_hash(e) {
            return Err(AuditError::IntegrityViolation {
                sequence: e.sequence,
            });
        }
        prev = e.hash;
    }
    Ok(())
}

fn compute_hash(entry: &AuditEntry) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(entry.sequence.to_le_bytes());
    hasher.update(entry.document_id.as_str().as_bytes());
    hasher.update([0]);
    hasher.update(entry.previous.map_or("", |s| s.as_str()).as_bytes());
    hasher.update([0]);
    hasher.update(entry.current.as_str().as_bytes());
    hasher.update([0]);
    hasher.update(entry.actor.as_deref().unwrap_or("").as_bytes());
    hasher.update([0]);
    hasher.update(entry.timestamp.timestamp_micros().to_le_bytes());
    hasher.update(entry.prev_hash);
    hasher.finalize().into()
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(bytes: &[u8; 32], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&hex::encode(bytes))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<[u8; 32], D::Error> {
        let text = String::deserialize(d)?;
        let mut out = [0u8; 32];
        hex::decode_to_slice(&text, &mut out).map_err(serde::de::Error::custom)?;
        Ok(out)
    }
}
