//! The `NewsStore` trait and supporting types.
//!
//! The trait is implemented by storage backends (e.g. `newsdesk-store-sqlite`).
//! Higher layers (`newsdesk-api`) depend on this abstraction, not on any
//! concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  audit::{AuditRecord, NewAuditRecord, TargetKind},
  draft::{Draft, DraftPatch, DraftStatus, NewDraft},
  event::{EventStatus, ModerationEvent, NewEvent},
  post::Post,
  workflow::{DraftPlan, EventPlan},
};

// ─── Error classification ────────────────────────────────────────────────────

/// Coarse classification of a store failure, so transport layers can pick a
/// status code without depending on a concrete backend's error enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
  /// The targeted record does not exist.
  NotFound,
  /// The caller's expected revision did not match the stored one.
  Conflict,
  /// The backend itself is unreachable.
  Unavailable,
  /// Anything else — query failures, corrupt rows, etc.
  Other,
}

/// Implemented by every backend's error type.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  fn kind(&self) -> StoreErrorKind;
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Newsdesk storage backend.
///
/// Workflow-state writes (`apply_*_transition`) are conditional on the
/// caller's expected revision; backends reject mismatches with a
/// [`StoreErrorKind::Conflict`] error and leave the record untouched.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait NewsStore: Send + Sync {
  type Error: StoreError;

  // ── Drafts ────────────────────────────────────────────────────────────

  /// Create a draft owned by `input.owner`, starting at status `draft`
  /// with revision 1.
  fn create_draft(
    &self,
    input: NewDraft,
  ) -> impl Future<Output = Result<Draft, Self::Error>> + Send + '_;

  /// Retrieve a draft by id. Returns `None` if not found.
  fn get_draft(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Draft>, Self::Error>> + Send + '_;

  /// List drafts, optionally filtered by status, newest first.
  fn list_drafts(
    &self,
    status: Option<DraftStatus>,
  ) -> impl Future<Output = Result<Vec<Draft>, Self::Error>> + Send + '_;

  /// Apply a content edit, bumping the revision. Fails with a `Conflict`
  /// error if `expected_revision` is stale.
  fn update_draft_content(
    &self,
    id: Uuid,
    expected_revision: i64,
    patch: DraftPatch,
  ) -> impl Future<Output = Result<Draft, Self::Error>> + Send + '_;

  /// Apply a planned status transition, bumping the revision. Fails with a
  /// `Conflict` error if `expected_revision` is stale and a `NotFound` error
  /// if the draft vanished.
  fn apply_draft_transition(
    &self,
    id: Uuid,
    expected_revision: i64,
    plan: DraftPlan,
  ) -> impl Future<Output = Result<Draft, Self::Error>> + Send + '_;

  /// Physically delete a draft. Published history (posts, audit) survives.
  fn delete_draft(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Moderation events ─────────────────────────────────────────────────

  fn create_event(
    &self,
    input: NewEvent,
  ) -> impl Future<Output = Result<ModerationEvent, Self::Error>> + Send + '_;

  fn get_event(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<ModerationEvent>, Self::Error>> + Send + '_;

  /// The moderation queue: `internal` events only, optionally filtered by
  /// status, oldest first.
  fn list_queue(
    &self,
    status: Option<EventStatus>,
  ) -> impl Future<Output = Result<Vec<ModerationEvent>, Self::Error>> + Send + '_;

  /// Apply a planned event transition; same revision contract as drafts.
  fn apply_event_transition(
    &self,
    id: Uuid,
    expected_revision: i64,
    plan: EventPlan,
  ) -> impl Future<Output = Result<ModerationEvent, Self::Error>> + Send + '_;

  // ── Posts ─────────────────────────────────────────────────────────────

  /// Materialise a public post from `draft`. Idempotent per draft id: if a
  /// post already exists its content snapshot is refreshed from the draft
  /// while post id, slug, and publication time stay stable.
  fn publish_post<'a>(
    &'a self,
    draft: &'a Draft,
  ) -> impl Future<Output = Result<Post, Self::Error>> + Send + 'a;

  fn get_post_by_slug<'a>(
    &'a self,
    slug: &'a str,
  ) -> impl Future<Output = Result<Option<Post>, Self::Error>> + Send + 'a;

  /// All published posts, newest first.
  fn list_posts(
    &self,
  ) -> impl Future<Output = Result<Vec<Post>, Self::Error>> + Send + '_;

  // ── Audit trail ───────────────────────────────────────────────────────

  /// Append one immutable audit record. Called only after the underlying
  /// document update succeeded.
  fn append_audit(
    &self,
    input: NewAuditRecord,
  ) -> impl Future<Output = Result<AuditRecord, Self::Error>> + Send + '_;

  /// All audit records for a target, ascending by creation time.
  fn audit_for_target(
    &self,
    kind: TargetKind,
    target_id: Uuid,
  ) -> impl Future<Output = Result<Vec<AuditRecord>, Self::Error>> + Send + '_;
}
