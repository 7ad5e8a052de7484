//! Review workflow transition table

use crate::error::TransitionError;
use crate::types::Status;

/// Validates a status change against the workflow table.
pub fn validate_transition(from: Status, to: Status) -> Result<(), TransitionError> {
    if allowed(from, to) {
        Ok(())
    } else {
        Err(TransitionError { from, to })
    }
}

/// Statuses reachable from `from` in one step.
pub fn allowed_transitions(from: Status) -> &'static [Status] {
    use Status::{Approved, Escalated, Pending, Rejected, UnderReview};
    match from {
        Pending => &[UnderReview, Approved, Rejected, Escalated],
        UnderReview => &[Approved, Rejected, Escalated],
        Escalated => &[Approved, Rejected],
        Approved | Rejected => &[],
    }
}

fn allowed(from: Status, to: Status) -> bool {
    allowed_transitions(from).contains(&to)
}
