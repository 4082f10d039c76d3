//! Error type for `newsdesk-store-sqlite`.

use newsdesk_core::store::{StoreError, StoreErrorKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] newsdesk_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("draft not found: {0}")]
  DraftNotFound(uuid::Uuid),

  #[error("event not found: {0}")]
  EventNotFound(uuid::Uuid),

  /// A conditional update matched the row but not the expected revision.
  #[error("revision conflict: expected {expected}, found {actual}")]
  RevisionConflict { expected: i64, actual: i64 },
}

impl StoreError for Error {
  fn kind(&self) -> StoreErrorKind {
    match self {
      Error::DraftNotFound(_) | Error::EventNotFound(_) => StoreErrorKind::NotFound,
      Error::RevisionConflict { .. } => StoreErrorKind::Conflict,
      Error::Database(tokio_rusqlite::Error::ConnectionClosed) => {
        StoreErrorKind::Unavailable
      }
      _ => StoreErrorKind::Other,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn revision_conflict_classifies_as_conflict() {
    let err = Error::RevisionConflict { expected: 1, actual: 2 };
    assert_eq!(err.kind(), StoreErrorKind::Conflict);
  }

  #[test]
  fn lost_connection_classifies_as_unavailable() {
    let err = Error::Database(tokio_rusqlite::Error::ConnectionClosed);
    assert_eq!(err.kind(), StoreErrorKind::Unavailable);
  }

  #[test]
  fn decode_failures_classify_as_other() {
    let err = Error::DateParse("bad timestamp".into());
    assert_eq!(err.kind(), StoreErrorKind::Other);
  }
}
