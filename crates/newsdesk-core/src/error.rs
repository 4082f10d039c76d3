//! Error types for `newsdesk-core`.
//!
//! The planner-facing half of the workflow error taxonomy: every rejected
//! transition maps to exactly one of these variants, and the HTTP layer maps
//! each variant to a distinct status code. Revision conflicts and backend
//! unavailability arise below the planners and are classified separately,
//! via [`crate::store::StoreErrorKind`].

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  /// Malformed or missing input (empty assignee, past schedule time, ...).
  #[error("validation: {0}")]
  Validation(String),

  /// The caller's role/ownership does not permit the requested action.
  #[error("forbidden: {0}")]
  Forbidden(String),

  /// The action is not legal from the record's current state.
  #[error("cannot {action} from state {from:?}")]
  InvalidTransition {
    from:   &'static str,
    action: &'static str,
  },

  #[error("draft not found: {0}")]
  DraftNotFound(Uuid),

  #[error("event not found: {0}")]
  EventNotFound(Uuid),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
