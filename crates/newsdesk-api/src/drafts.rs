//! Handlers for `/api/drafts` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`    | `/api/drafts` | Optional `?status=ready` |
//! | `POST`   | `/api/drafts` | Body: [`CreateDraftBody`]; caller becomes owner |
//! | `GET`    | `/api/drafts/:id` | 404 if not found |
//! | `PATCH`  | `/api/drafts/:id` | Content edit; owner (admin if published) |
//! | `DELETE` | `/api/drafts/:id` | Owner or admin |
//! | `POST`   | `/api/drafts/:id/submit` | Transition |
//! | `POST`   | `/api/drafts/:id/request-changes` | Transition |
//! | `POST`   | `/api/drafts/:id/schedule` | Body carries `scheduled_for` |
//! | `POST`   | `/api/drafts/:id/publish` | Returns `{ok, post_slug, post_id}` |
//! | `POST`   | `/api/drafts/:id/reopen` | Admin override |
//!
//! Every mutating body carries `expected_revision`; a stale value is a 412.

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, Utc};
use newsdesk_core::{
  audit::{NewAuditRecord, StateSnapshot, TargetKind},
  draft::{Draft, DraftPatch, DraftStatus, NewDraft},
  notify::Notice,
  policy::{self, Caller, Verb},
  store::NewsStore,
  workflow::{DraftAction, DraftOutcome, plan_draft},
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{AppState, auth::Authed, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub status: Option<DraftStatus>,
}

/// `GET /api/drafts[?status=<status>]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  _auth: Authed,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Draft>>, ApiError>
where
  S: NewsStore + Clone + Send + Sync + 'static,
{
  let drafts = state
    .store
    .list_drafts(params.status)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(drafts))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /api/drafts`.
#[derive(Debug, Deserialize)]
pub struct CreateDraftBody {
  pub title: String,
  pub body:  String,
  #[serde(default)]
  pub tags:  Vec<String>,
  #[serde(default)]
  pub second_review_required: bool,
}

/// `POST /api/drafts` — returns 201 + the stored [`Draft`].
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Authed(caller): Authed,
  Json(body): Json<CreateDraftBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: NewsStore + Clone + Send + Sync + 'static,
{
  if body.title.trim().is_empty() {
    return Err(ApiError::BadRequest("title must not be empty".into()));
  }

  let draft = state
    .store
    .create_draft(NewDraft {
      title:                  body.title,
      body:                   body.body,
      tags:                   body.tags,
      owner:                  caller.id,
      second_review_required: body.second_review_required,
    })
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(draft)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /api/drafts/:id`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  _auth: Authed,
  Path(id): Path<Uuid>,
) -> Result<Json<Draft>, ApiError>
where
  S: NewsStore + Clone + Send + Sync + 'static,
{
  let draft = fetch_draft(&*state.store, id).await?;
  Ok(Json(draft))
}

// ─── Content edit ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UpdateDraftBody {
  pub expected_revision: i64,
  pub title: Option<String>,
  pub body:  Option<String>,
  pub tags:  Option<Vec<String>>,
}

/// `PATCH /api/drafts/:id` — content only; workflow fields move via the
/// transition endpoints.
pub async fn update<S>(
  State(state): State<AppState<S>>,
  Authed(caller): Authed,
  Path(id): Path<Uuid>,
  Json(body): Json<UpdateDraftBody>,
) -> Result<Json<Draft>, ApiError>
where
  S: NewsStore + Clone + Send + Sync + 'static,
{
  let draft = fetch_draft(&*state.store, id).await?;

  // Published content is frozen except for administrative correction.
  let verb = if draft.status == DraftStatus::Published {
    Verb::CorrectPublished
  } else {
    Verb::EditDraft
  };
  policy::authorize(&caller, Some(&draft.owner), verb)?;

  let patch = DraftPatch {
    title: body.title,
    body:  body.body,
    tags:  body.tags,
  };
  if patch.is_empty() {
    return Err(ApiError::BadRequest("nothing to update".into()));
  }

  let updated = state
    .store
    .update_draft_content(id, body.expected_revision, patch)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(updated))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /api/drafts/:id` — owner or admin.
pub async fn delete_one<S>(
  State(state): State<AppState<S>>,
  Authed(caller): Authed,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: NewsStore + Clone + Send + Sync + 'static,
{
  let draft = fetch_draft(&*state.store, id).await?;
  policy::authorize(&caller, Some(&draft.owner), Verb::DeleteDraft)?;

  state
    .store
    .delete_draft(id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Transitions ──────────────────────────────────────────────────────────────

/// JSON body for transition endpoints without extra parameters.
#[derive(Debug, Deserialize)]
pub struct TransitionBody {
  pub expected_revision: i64,
}

#[derive(Debug, Deserialize)]
pub struct ScheduleBody {
  pub expected_revision: i64,
  pub scheduled_for:     DateTime<Utc>,
}

/// `POST /api/drafts/:id/submit`
pub async fn submit<S>(
  State(state): State<AppState<S>>,
  Authed(caller): Authed,
  Path(id): Path<Uuid>,
  Json(body): Json<TransitionBody>,
) -> Result<Json<Draft>, ApiError>
where
  S: NewsStore + Clone + Send + Sync + 'static,
{
  let updated =
    run_transition(&state, id, body.expected_revision, DraftAction::Submit, &caller)
      .await?;
  Ok(Json(updated))
}

/// `POST /api/drafts/:id/request-changes`
pub async fn request_changes<S>(
  State(state): State<AppState<S>>,
  Authed(caller): Authed,
  Path(id): Path<Uuid>,
  Json(body): Json<TransitionBody>,
) -> Result<Json<Draft>, ApiError>
where
  S: NewsStore + Clone + Send + Sync + 'static,
{
  let updated = run_transition(
    &state,
    id,
    body.expected_revision,
    DraftAction::RequestChanges,
    &caller,
  )
  .await?;

  state.notifier.notify(Notice::ChangesRequested {
    draft_id: updated.draft_id,
    owner:    updated.owner.clone(),
    reviewer: caller.id,
  });
  Ok(Json(updated))
}

/// `POST /api/drafts/:id/schedule`
pub async fn schedule<S>(
  State(state): State<AppState<S>>,
  Authed(caller): Authed,
  Path(id): Path<Uuid>,
  Json(body): Json<ScheduleBody>,
) -> Result<Json<Draft>, ApiError>
where
  S: NewsStore + Clone + Send + Sync + 'static,
{
  let updated = run_transition(
    &state,
    id,
    body.expected_revision,
    DraftAction::Schedule(body.scheduled_for),
    &caller,
  )
  .await?;
  Ok(Json(updated))
}

/// `POST /api/drafts/:id/publish` — materialises the public post.
///
/// Idempotent per draft: the post id and slug never change. On a draft that
/// is already published, or republished after a reopen rework, the existing
/// post's content snapshot is refreshed from the draft.
pub async fn publish<S>(
  State(state): State<AppState<S>>,
  Authed(caller): Authed,
  Path(id): Path<Uuid>,
  Json(body): Json<TransitionBody>,
) -> Result<Json<serde_json::Value>, ApiError>
where
  S: NewsStore + Clone + Send + Sync + 'static,
{
  let draft = fetch_draft(&*state.store, id).await?;

  let outcome = plan_draft(&draft, &DraftAction::Publish, &caller, Utc::now())?;

  let published = match outcome {
    DraftOutcome::AlreadyPublished => draft,
    DraftOutcome::Apply(plan) => {
      let action = plan.action;
      let updated = state
        .store
        .apply_draft_transition(id, body.expected_revision, plan)
        .await
        .map_err(ApiError::from_store)?;
      append_audit(&state, action, &caller, &draft, &updated).await;
      updated
    }
  };

  let post = state
    .store
    .publish_post(&published)
    .await
    .map_err(ApiError::from_store)?;

  state.notifier.notify(Notice::DraftPublished {
    draft_id: published.draft_id,
    slug:     post.slug.clone(),
    owner:    published.owner.clone(),
  });

  Ok(Json(json!({
    "ok": true,
    "post_slug": post.slug,
    "post_id": post.post_id,
  })))
}

/// `POST /api/drafts/:id/reopen` — admin pulls a published draft back.
pub async fn reopen<S>(
  State(state): State<AppState<S>>,
  Authed(caller): Authed,
  Path(id): Path<Uuid>,
  Json(body): Json<TransitionBody>,
) -> Result<Json<Draft>, ApiError>
where
  S: NewsStore + Clone + Send + Sync + 'static,
{
  let updated =
    run_transition(&state, id, body.expected_revision, DraftAction::Reopen, &caller)
      .await?;
  Ok(Json(updated))
}

// ─── Shared plumbing ──────────────────────────────────────────────────────────

async fn fetch_draft<S>(store: &S, id: Uuid) -> Result<Draft, ApiError>
where
  S: NewsStore,
{
  store
    .get_draft(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("draft {id} not found")))
}

/// Fetch → plan → conditional apply → audit. The audit append is
/// best-effort per the workflow contract: its failure is logged, never
/// surfaced.
async fn run_transition<S>(
  state:             &AppState<S>,
  id:                Uuid,
  expected_revision: i64,
  action:            DraftAction,
  caller:            &Caller,
) -> Result<Draft, ApiError>
where
  S: NewsStore + Clone + Send + Sync + 'static,
{
  let draft = fetch_draft(&*state.store, id).await?;

  let plan = match plan_draft(&draft, &action, caller, Utc::now())? {
    DraftOutcome::Apply(plan) => plan,
    // Only `publish` produces this, and publish has its own handler.
    DraftOutcome::AlreadyPublished => {
      return Err(ApiError::InvalidTransition(
        "draft is already published".into(),
      ));
    }
  };

  let action_name = plan.action;
  let updated = state
    .store
    .apply_draft_transition(id, expected_revision, plan)
    .await
    .map_err(ApiError::from_store)?;

  append_audit(state, action_name, caller, &draft, &updated).await;

  Ok(updated)
}

async fn append_audit<S>(
  state:  &AppState<S>,
  action: &str,
  caller: &Caller,
  prev:   &Draft,
  next:   &Draft,
) where
  S: NewsStore,
{
  let record = NewAuditRecord {
    action:      action.to_string(),
    actor:       Some(caller.id.clone()),
    target_kind: TargetKind::Draft,
    target_id:   next.draft_id,
    prev:        StateSnapshot::of_draft(prev),
    next:        StateSnapshot::of_draft(next),
    metadata:    json!({ "revision": next.revision }),
  };
  if let Err(e) = state.store.append_audit(record).await {
    tracing::warn!(error = %e, draft_id = %next.draft_id, "audit append failed after transition");
  }
}
