//! Handler for `/api/audit` — read-only access to the transition history.

use axum::{
  Json,
  extract::{Query, State},
};
use newsdesk_core::{
  audit::{AuditRecord, TargetKind},
  store::NewsStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, auth::Authed, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct AuditParams {
  pub target_kind: TargetKind,
  pub target_id:   Uuid,
}

/// `GET /api/audit?target_kind=draft&target_id=<uuid>` — records for one
/// target, oldest first.
pub async fn for_target<S>(
  State(state): State<AppState<S>>,
  _auth: Authed,
  Query(params): Query<AuditParams>,
) -> Result<Json<Vec<AuditRecord>>, ApiError>
where
  S: NewsStore + Clone + Send + Sync + 'static,
{
  let records = state
    .store
    .audit_for_target(params.target_kind, params.target_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(records))
}
