//! Handlers for `/api/events` — moderation-event ingestion and triage.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`   | `/api/events` | Internal queue; optional `?status=` |
//! | `POST`  | `/api/events` | Ingest; raw text is hashed then redacted |
//! | `GET`   | `/api/events/:id` | 404 if not found |
//! | `PATCH` | `/api/events/:id` | Triage action; returns `{ok, item}` |
//!
//! Ingestion never stores the submitted raw text. The record keeps only a
//! SHA-256 hex of it plus the redacted rendering shown to moderators.

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use newsdesk_core::{
  audit::{NewAuditRecord, StateSnapshot, TargetKind},
  event::{EventKind, EventStatus, ModerationEvent, NewEvent, Visibility},
  notify::Notice,
  policy::Caller,
  store::NewsStore,
  workflow::{EventAction, plan_event},
};
use serde::Deserialize;
use serde_json::json;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{AppState, auth::Authed, error::ApiError};

// ─── Ingestion ───────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /api/events`.
#[derive(Debug, Deserialize)]
pub struct CreateEventBody {
  pub kind:        EventKind,
  pub visibility:  Visibility,
  /// Raw submitted text; hashed and redacted, never stored as-is.
  pub text:        String,
  pub target_kind: TargetKind,
  pub target_id:   Uuid,
}

/// `POST /api/events` — returns 201 + the stored event.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Authed(_caller): Authed,
  Json(body): Json<CreateEventBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: NewsStore + Clone + Send + Sync + 'static,
{
  if body.text.trim().is_empty() {
    return Err(ApiError::BadRequest("text must not be empty".into()));
  }

  let raw_hash = hex::encode(Sha256::digest(body.text.as_bytes()));
  let event = state
    .store
    .create_event(NewEvent {
      kind:          body.kind,
      visibility:    body.visibility,
      redacted_text: redact(&body.text),
      raw_hash,
      target_kind:   body.target_kind,
      target_id:     body.target_id,
    })
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(event)))
}

/// Scrub obvious personal data before the text is persisted: any token
/// containing `@` and any digit run of 7 or more characters.
fn redact(text: &str) -> String {
  let mut out = String::with_capacity(text.len());
  for (i, token) in text.split_whitespace().enumerate() {
    if i > 0 {
      out.push(' ');
    }
    if token.contains('@') {
      out.push_str("[redacted]");
    } else {
      out.push_str(&mask_digit_runs(token));
    }
  }
  out
}

fn mask_digit_runs(token: &str) -> String {
  let mut out = String::with_capacity(token.len());
  let mut run = String::new();
  for c in token.chars() {
    if c.is_ascii_digit() {
      run.push(c);
    } else {
      flush_run(&mut out, &mut run);
      out.push(c);
    }
  }
  flush_run(&mut out, &mut run);
  out
}

fn flush_run(out: &mut String, run: &mut String) {
  if run.len() >= 7 {
    out.push_str("[redacted]");
  } else {
    out.push_str(run);
  }
  run.clear();
}

// ─── Queue & lookup ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct QueueParams {
  pub status: Option<EventStatus>,
}

/// `GET /api/events[?status=<status>]` — internal-visibility queue only.
pub async fn list<S>(
  State(state): State<AppState<S>>,
  _auth: Authed,
  Query(params): Query<QueueParams>,
) -> Result<Json<Vec<ModerationEvent>>, ApiError>
where
  S: NewsStore + Clone + Send + Sync + 'static,
{
  let events = state
    .store
    .list_queue(params.status)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(events))
}

/// `GET /api/events/:id`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  _auth: Authed,
  Path(id): Path<Uuid>,
) -> Result<Json<ModerationEvent>, ApiError>
where
  S: NewsStore + Clone + Send + Sync + 'static,
{
  let event = fetch_event(&*state.store, id).await?;
  Ok(Json(event))
}

// ─── Triage ──────────────────────────────────────────────────────────────────

/// JSON body accepted by `PATCH /api/events/:id`.
#[derive(Debug, Deserialize)]
pub struct TriageBody {
  pub action:            String,
  pub assignee:          Option<String>,
  pub expected_revision: i64,
}

/// `PATCH /api/events/:id` — apply a triage action.
pub async fn triage<S>(
  State(state): State<AppState<S>>,
  Authed(caller): Authed,
  Path(id): Path<Uuid>,
  Json(body): Json<TriageBody>,
) -> Result<Json<serde_json::Value>, ApiError>
where
  S: NewsStore + Clone + Send + Sync + 'static,
{
  let action = parse_action(&body)?;
  let event = fetch_event(&*state.store, id).await?;

  let plan = plan_event(&event, &action, &caller)?;
  let action_name = plan.action;

  let updated = state
    .store
    .apply_event_transition(id, body.expected_revision, plan)
    .await
    .map_err(ApiError::from_store)?;

  append_audit(&state, action_name, &caller, &event, &updated).await;

  if updated.status == EventStatus::Resolved {
    state.notifier.notify(Notice::EventResolved {
      event_id: updated.event_id,
      actor:    caller.id.clone(),
    });
  }

  Ok(Json(json!({ "ok": true, "item": updated })))
}

fn parse_action(body: &TriageBody) -> Result<EventAction, ApiError> {
  match body.action.as_str() {
    "assign" => {
      let assignee = body
        .assignee
        .clone()
        .ok_or_else(|| ApiError::BadRequest("assign requires an assignee".into()))?;
      Ok(EventAction::Assign { assignee })
    }
    "release" => Ok(EventAction::Release),
    "flag_second" => Ok(EventAction::FlagSecond),
    "resolve" => Ok(EventAction::Resolve),
    "reopen" => Ok(EventAction::Reopen),
    other => Err(ApiError::BadRequest(format!(
      "unknown triage action: {other:?}"
    ))),
  }
}

// ─── Shared plumbing ─────────────────────────────────────────────────────────

async fn fetch_event<S>(store: &S, id: Uuid) -> Result<ModerationEvent, ApiError>
where
  S: NewsStore,
{
  store
    .get_event(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("event {id} not found")))
}

async fn append_audit<S>(
  state:  &AppState<S>,
  action: &str,
  caller: &Caller,
  prev:   &ModerationEvent,
  next:   &ModerationEvent,
) where
  S: NewsStore,
{
  let record = NewAuditRecord {
    action:      action.to_string(),
    actor:       Some(caller.id.clone()),
    target_kind: TargetKind::Event,
    target_id:   next.event_id,
    prev:        StateSnapshot::of_event(prev),
    next:        StateSnapshot::of_event(next),
    metadata:    json!({ "revision": next.revision }),
  };
  if let Err(e) = state.store.append_audit(record).await {
    tracing::warn!(error = %e, event_id = %next.event_id, "audit append failed after triage");
  }
}

#[cfg(test)]
mod tests {
  use super::redact;

  #[test]
  fn redact_masks_email_like_tokens() {
    assert_eq!(
      redact("contact ana@example.com about this"),
      "contact [redacted] about this"
    );
  }

  #[test]
  fn redact_masks_long_digit_runs() {
    assert_eq!(redact("call 5551234567 now"), "call [redacted] now");
    assert_eq!(redact("room 404 is fine"), "room 404 is fine");
  }

  #[test]
  fn redact_handles_digits_inside_tokens() {
    assert_eq!(redact("id=1234567890;x"), "id=[redacted];x");
  }
}
