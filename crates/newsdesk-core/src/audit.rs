//! Audit records — the append-only history of workflow transitions.
//!
//! One record per successful transition, written after the document update
//! succeeds and never mutated or deleted afterwards. Retention is an
//! operational concern outside this crate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  draft::Draft,
  event::ModerationEvent,
};

// ─── TargetKind ──────────────────────────────────────────────────────────────

/// What kind of record a transition (or moderation event) points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
  Draft,
  Event,
  Post,
}

impl TargetKind {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Draft => "draft",
      Self::Event => "event",
      Self::Post => "post",
    }
  }

  pub fn parse(s: &str) -> Result<Self> {
    match s {
      "draft" => Ok(Self::Draft),
      "event" => Ok(Self::Event),
      "post" => Ok(Self::Post),
      other => Err(Error::Validation(format!("unknown target kind: {other:?}"))),
    }
  }
}

// ─── StateSnapshot ───────────────────────────────────────────────────────────

/// The minimal before/after view captured per transition — status plus the
/// workflow fields a transition may touch, never the full document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
  pub status:        String,
  pub assigned_to:   Option<String>,
  pub second_review: Option<bool>,
  pub scheduled_for: Option<DateTime<Utc>>,
}

impl StateSnapshot {
  pub fn of_draft(d: &Draft) -> Self {
    Self {
      status:        d.status.as_str().to_string(),
      assigned_to:   d.assignee.clone(),
      second_review: None,
      scheduled_for: d.scheduled_for,
    }
  }

  pub fn of_event(e: &ModerationEvent) -> Self {
    Self {
      status:        e.status.as_str().to_string(),
      assigned_to:   e.assigned_to.clone(),
      second_review: Some(e.second_review),
      scheduled_for: None,
    }
  }
}

// ─── AuditRecord ─────────────────────────────────────────────────────────────

/// An immutable log entry capturing one state transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
  pub audit_id:    Uuid,
  pub action:      String,
  /// `None` for system-initiated actions.
  pub actor:       Option<String>,
  pub target_kind: TargetKind,
  pub target_id:   Uuid,
  pub prev:        StateSnapshot,
  pub next:        StateSnapshot,
  pub metadata:    serde_json::Value,
  pub created_at:  DateTime<Utc>,
}

/// Input to [`crate::store::NewsStore::append_audit`]. Identifier and
/// timestamp are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewAuditRecord {
  pub action:      String,
  pub actor:       Option<String>,
  pub target_kind: TargetKind,
  pub target_id:   Uuid,
  pub prev:        StateSnapshot,
  pub next:        StateSnapshot,
  pub metadata:    serde_json::Value,
}
