//! Moderation events — internal records requiring triage.
//!
//! The same record shape also backs the public activity feed, but only
//! `visibility = internal` events participate in the moderation queue. Events
//! are never deleted; resolved items stay queryable for audit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, audit::TargetKind};

// ─── Kind & visibility ───────────────────────────────────────────────────────

/// The category of occurrence the event records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
  /// A reader or staff member reported the target.
  Report,
  /// Raised automatically by an ingestion collaborator.
  SystemFlag,
  /// A free-form internal note from an editor.
  EditorNote,
}

impl EventKind {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Report => "report",
      Self::SystemFlag => "system_flag",
      Self::EditorNote => "editor_note",
    }
  }

  pub fn parse(s: &str) -> Result<Self> {
    match s {
      "report" => Ok(Self::Report),
      "system_flag" => Ok(Self::SystemFlag),
      "editor_note" => Ok(Self::EditorNote),
      other => Err(Error::Validation(format!("unknown event kind: {other:?}"))),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
  Public,
  Internal,
}

impl Visibility {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Public => "public",
      Self::Internal => "internal",
    }
  }

  pub fn parse(s: &str) -> Result<Self> {
    match s {
      "public" => Ok(Self::Public),
      "internal" => Ok(Self::Internal),
      other => Err(Error::Validation(format!("unknown visibility: {other:?}"))),
    }
  }
}

// ─── Status ──────────────────────────────────────────────────────────────────

/// Triage stage of a moderation event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
  Open,
  InReview,
  Flagged,
  Resolved,
}

impl EventStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Open => "open",
      Self::InReview => "in_review",
      Self::Flagged => "flagged",
      Self::Resolved => "resolved",
    }
  }

  pub fn parse(s: &str) -> Result<Self> {
    match s {
      "open" => Ok(Self::Open),
      "in_review" => Ok(Self::InReview),
      "flagged" => Ok(Self::Flagged),
      "resolved" => Ok(Self::Resolved),
      other => Err(Error::Validation(format!("unknown event status: {other:?}"))),
    }
  }
}

// ─── ModerationEvent ─────────────────────────────────────────────────────────

/// An internal record awaiting moderation action.
///
/// `redacted_text` is the privacy-scrubbed rendering shown to moderators;
/// `raw_hash` is the SHA-256 hex of the original text, kept for dedup and
/// audit without storing the raw content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerationEvent {
  pub event_id:      Uuid,
  pub kind:          EventKind,
  pub visibility:    Visibility,
  pub status:        EventStatus,
  pub assigned_to:   Option<String>,
  pub second_review: bool,
  pub redacted_text: String,
  pub raw_hash:      String,
  pub target_kind:   TargetKind,
  pub target_id:     Uuid,
  pub revision:      i64,
  pub created_at:    DateTime<Utc>,
  pub updated_at:    DateTime<Utc>,
}

// ─── NewEvent ────────────────────────────────────────────────────────────────

/// Input to [`crate::store::NewsStore::create_event`]. Status always starts
/// at [`EventStatus::Open`] with no assignee and `second_review = false`.
#[derive(Debug, Clone)]
pub struct NewEvent {
  pub kind:          EventKind,
  pub visibility:    Visibility,
  pub redacted_text: String,
  pub raw_hash:      String,
  pub target_kind:   TargetKind,
  pub target_id:     Uuid,
}
