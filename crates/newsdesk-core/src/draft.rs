//! Draft — a work-in-progress article moving through the editorial pipeline.
//!
//! A draft is mutable in two disjoint ways: the owner edits its content, and
//! reviewers/admins move its status. Status changes go exclusively through
//! the planners in [`crate::workflow`]; nothing else writes the status field.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Status ──────────────────────────────────────────────────────────────────

/// Pipeline stage of a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftStatus {
  /// Being written; only the owner touches it.
  Draft,
  /// Submitted and awaiting a reviewer.
  Ready,
  /// Submitted, but a second approval gate applies before publication.
  NeedsSecondReview,
  /// A reviewer sent it back to the owner.
  ChangesRequested,
  /// Approved with a future publication timestamp.
  Scheduled,
  /// Live. Content is frozen except for administrative correction.
  Published,
}

impl DraftStatus {
  /// The string stored in the `status` column and used in audit snapshots.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Draft => "draft",
      Self::Ready => "ready",
      Self::NeedsSecondReview => "needs_second_review",
      Self::ChangesRequested => "changes_requested",
      Self::Scheduled => "scheduled",
      Self::Published => "published",
    }
  }

  pub fn parse(s: &str) -> Result<Self> {
    match s {
      "draft" => Ok(Self::Draft),
      "ready" => Ok(Self::Ready),
      "needs_second_review" => Ok(Self::NeedsSecondReview),
      "changes_requested" => Ok(Self::ChangesRequested),
      "scheduled" => Ok(Self::Scheduled),
      "published" => Ok(Self::Published),
      other => Err(Error::Validation(format!("unknown draft status: {other:?}"))),
    }
  }
}

// ─── Draft ───────────────────────────────────────────────────────────────────

/// A pre-publication article record.
///
/// `scheduled_for` is non-null only while `status` is [`DraftStatus::Scheduled`].
/// `revision` increments on every successful mutation and is the token for
/// optimistic concurrency control.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Draft {
  pub draft_id:               Uuid,
  pub title:                  String,
  /// Markdown body.
  pub body:                   String,
  pub tags:                   Vec<String>,
  pub status:                 DraftStatus,
  /// Identity of the author; ownership grants submit/edit/delete.
  pub owner:                  String,
  pub assignee:               Option<String>,
  /// The reviewer who last acted on the draft, if any.
  pub reviewer:               Option<String>,
  pub scheduled_for:          Option<DateTime<Utc>>,
  pub second_review_required: bool,
  pub revision:               i64,
  pub created_at:             DateTime<Utc>,
  pub updated_at:             DateTime<Utc>,
}

// ─── NewDraft ────────────────────────────────────────────────────────────────

/// Input to [`crate::store::NewsStore::create_draft`].
/// Identifier, revision, and timestamps are assigned by the store; status
/// always starts at [`DraftStatus::Draft`].
#[derive(Debug, Clone)]
pub struct NewDraft {
  pub title:                  String,
  pub body:                   String,
  pub tags:                   Vec<String>,
  pub owner:                  String,
  pub second_review_required: bool,
}

// ─── DraftPatch ──────────────────────────────────────────────────────────────

/// A content edit; `None` fields are left unchanged. Status and workflow
/// fields are deliberately absent — those move only via transitions.
#[derive(Debug, Clone, Default)]
pub struct DraftPatch {
  pub title: Option<String>,
  pub body:  Option<String>,
  pub tags:  Option<Vec<String>>,
}

impl DraftPatch {
  pub fn is_empty(&self) -> bool {
    self.title.is_none() && self.body.is_none() && self.tags.is_none()
  }
}
