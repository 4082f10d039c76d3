//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Each member of the workflow error taxonomy maps to a distinct status
//! code; the client sees a stable JSON `{"error": "..."}` body and never a
//! backtrace.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use newsdesk_core::store::{StoreError, StoreErrorKind};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("unauthorized")]
  Unauthorized,

  #[error("forbidden: {0}")]
  Forbidden(String),

  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("invalid transition: {0}")]
  InvalidTransition(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("dependency unavailable: {0}")]
  Unavailable(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Classify a backend failure into the taxonomy via [`StoreError::kind`].
  pub fn from_store<E: StoreError>(e: E) -> Self {
    match e.kind() {
      StoreErrorKind::NotFound => ApiError::NotFound(e.to_string()),
      StoreErrorKind::Conflict => ApiError::Conflict(e.to_string()),
      StoreErrorKind::Unavailable => ApiError::Unavailable(e.to_string()),
      StoreErrorKind::Other => ApiError::Store(Box::new(e)),
    }
  }
}

impl From<newsdesk_core::Error> for ApiError {
  fn from(e: newsdesk_core::Error) -> Self {
    use newsdesk_core::Error as E;
    match e {
      E::Validation(m) => ApiError::BadRequest(m),
      E::Forbidden(m) => ApiError::Forbidden(m),
      E::InvalidTransition { .. } => ApiError::InvalidTransition(e.to_string()),
      E::DraftNotFound(_) | E::EventNotFound(_) => ApiError::NotFound(e.to_string()),
      E::Serialization(inner) => ApiError::Store(Box::new(inner)),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    if let ApiError::Unauthorized = self {
      let mut res = (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "unauthorized" })),
      )
        .into_response();
      res.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Basic realm=\"newsdesk\""),
      );
      return res;
    }

    let (status, message) = match &self {
      ApiError::Unauthorized => unreachable!(),
      ApiError::Forbidden(m) => (StatusCode::FORBIDDEN, m.clone()),
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::InvalidTransition(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Conflict(m) => (StatusCode::PRECONDITION_FAILED, m.clone()),
      ApiError::Unavailable(m) => (StatusCode::SERVICE_UNAVAILABLE, m.clone()),
      ApiError::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[derive(Debug, thiserror::Error)]
  #[error("{msg}")]
  struct FakeStoreError {
    msg:  String,
    kind: StoreErrorKind,
  }

  impl StoreError for FakeStoreError {
    fn kind(&self) -> StoreErrorKind { self.kind }
  }

  #[test]
  fn store_kinds_map_to_distinct_statuses() {
    for (kind, status) in [
      (StoreErrorKind::NotFound, StatusCode::NOT_FOUND),
      (StoreErrorKind::Conflict, StatusCode::PRECONDITION_FAILED),
      (StoreErrorKind::Unavailable, StatusCode::SERVICE_UNAVAILABLE),
      (StoreErrorKind::Other, StatusCode::INTERNAL_SERVER_ERROR),
    ] {
      let err = ApiError::from_store(FakeStoreError { msg: "x".into(), kind });
      assert_eq!(err.into_response().status(), status, "kind {kind:?}");
    }
  }

  #[test]
  fn core_errors_map_to_distinct_statuses() {
    use newsdesk_core::Error as E;
    let cases: Vec<(E, StatusCode)> = vec![
      (E::Validation("x".into()), StatusCode::BAD_REQUEST),
      (E::Forbidden("x".into()), StatusCode::FORBIDDEN),
      (
        E::InvalidTransition { from: "draft", action: "publish" },
        StatusCode::CONFLICT,
      ),
      (
        E::DraftNotFound(uuid::Uuid::new_v4()),
        StatusCode::NOT_FOUND,
      ),
    ];
    for (err, status) in cases {
      assert_eq!(ApiError::from(err).into_response().status(), status);
    }
  }
}
