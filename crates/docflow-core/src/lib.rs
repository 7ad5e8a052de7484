//! docflow Core - document review workflow
//!
//! - [`DocumentStore`]: canonical document collection; the only place a
//!   status may change, and only along the workflow table
//! - [`QueryEngine`]: pure filter/sort over snapshots for every listing view
//! - [`Subscription`]: ordered change feed of submissions and status changes
//! - [`AuditLog`]: hash-chained record of every mutation
//! - [`NotificationInbox`], [`stats`], [`UploadSimulator`]: collaborators
//!   built on the same snapshot and event contracts
//!
//! # Example
//!
//! ```rust,ignore
//! use docflow_core::prelude::*;
//!
//! let store = DocumentStore::new(StoreConfig::default());
//! let doc = store.submit(
//!     Submission::new("Service Contract", DocumentType::Contract, "Legal")
//!         .attach(Attachment::new("contract.pdf", 2_400_000)),
//! )?;
//! store.start_review(&doc.id, "r1")?;
//!
//! let pending = QueryEngine::query(&store.list(), &QuerySpec::new().with_status(Status::Pending));
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod audit;
pub mod clock;
pub mod config;
pub mod error;
pub mod feed;
pub mod inbox;
pub mod query;
pub mod state_machine;
pub mod stats;
pub mod store;
pub mod types;
pub mod upload;

pub use audit::{AuditEntry, AuditLog};
pub use clock::{Clock, SystemClock};
pub use config::{StoreConfig, UploadConfig};
pub use error::{
    AuditError, ConfigError, FieldIssue, IssueKind, ParseEnumError, StoreError, TransitionError,
    ValidationError,
};
pub use feed::{StoreEvent, Subscription};
pub use inbox::{Notification, NotificationInbox, NotificationKind, ReadFilter};
pub use query::{
    ArchiveWindow, Direction, Filter, QueryEngine, QuerySpec, RawQuery, SortField, SortSpec,
};
pub use stats::{DepartmentStats, StatusCounts, TypeShare};
pub use store::DocumentStore;
pub use types::{
    format_file_size, Attachment, Department, Document, DocumentId, DocumentType, Priority,
    Status, Submission,
};
pub use upload::{UploadError, UploadEvent, UploadHandle, UploadOutcome, UploadSimulator};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with docflow
    pub use crate::{
        Attachment, Direction, Document, DocumentId, DocumentStore, DocumentType, Priority,
        QueryEngine, QuerySpec, SortField, Status, StoreConfig, StoreError, StoreEvent,
        Submission,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
