//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. Tag lists and audit
//! snapshots are stored as compact JSON. UUIDs are stored as hyphenated
//! lowercase strings. Enum columns store the `as_str` discriminants defined
//! in `newsdesk-core`.

use chrono::{DateTime, Utc};
use newsdesk_core::{
  audit::{AuditRecord, StateSnapshot, TargetKind},
  draft::{Draft, DraftStatus},
  event::{EventKind, EventStatus, ModerationEvent, Visibility},
  post::Post,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Tags ────────────────────────────────────────────────────────────────────

pub fn encode_tags(tags: &[String]) -> Result<String> {
  Ok(serde_json::to_string(tags)?)
}

pub fn decode_tags(s: &str) -> Result<Vec<String>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Snapshots ───────────────────────────────────────────────────────────────

pub fn encode_snapshot(s: &StateSnapshot) -> Result<String> {
  Ok(serde_json::to_string(s)?)
}

pub fn decode_snapshot(s: &str) -> Result<StateSnapshot> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `drafts` row.
pub struct RawDraft {
  pub draft_id:               String,
  pub title:                  String,
  pub body:                   String,
  pub tags:                   String,
  pub status:                 String,
  pub owner:                  String,
  pub assignee:               Option<String>,
  pub reviewer:               Option<String>,
  pub scheduled_for:          Option<String>,
  pub second_review_required: bool,
  pub revision:               i64,
  pub created_at:             String,
  pub updated_at:             String,
}

impl RawDraft {
  pub fn into_draft(self) -> Result<Draft> {
    Ok(Draft {
      draft_id:               decode_uuid(&self.draft_id)?,
      title:                  self.title,
      body:                   self.body,
      tags:                   decode_tags(&self.tags)?,
      status:                 DraftStatus::parse(&self.status)?,
      owner:                  self.owner,
      assignee:               self.assignee,
      reviewer:               self.reviewer,
      scheduled_for:          self
        .scheduled_for
        .as_deref()
        .map(decode_dt)
        .transpose()?,
      second_review_required: self.second_review_required,
      revision:               self.revision,
      created_at:             decode_dt(&self.created_at)?,
      updated_at:             decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read directly from an `events` row.
pub struct RawEvent {
  pub event_id:      String,
  pub kind:          String,
  pub visibility:    String,
  pub status:        String,
  pub assigned_to:   Option<String>,
  pub second_review: bool,
  pub redacted_text: String,
  pub raw_hash:      String,
  pub target_kind:   String,
  pub target_id:     String,
  pub revision:      i64,
  pub created_at:    String,
  pub updated_at:    String,
}

impl RawEvent {
  pub fn into_event(self) -> Result<ModerationEvent> {
    Ok(ModerationEvent {
      event_id:      decode_uuid(&self.event_id)?,
      kind:          EventKind::parse(&self.kind)?,
      visibility:    Visibility::parse(&self.visibility)?,
      status:        EventStatus::parse(&self.status)?,
      assigned_to:   self.assigned_to,
      second_review: self.second_review,
      redacted_text: self.redacted_text,
      raw_hash:      self.raw_hash,
      target_kind:   TargetKind::parse(&self.target_kind)?,
      target_id:     decode_uuid(&self.target_id)?,
      revision:      self.revision,
      created_at:    decode_dt(&self.created_at)?,
      updated_at:    decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read directly from a `posts` row.
pub struct RawPost {
  pub post_id:      String,
  pub draft_id:     String,
  pub slug:         String,
  pub title:        String,
  pub body:         String,
  pub tags:         String,
  pub excerpt:      String,
  pub published_at: String,
}

impl RawPost {
  pub fn into_post(self) -> Result<Post> {
    Ok(Post {
      post_id:      decode_uuid(&self.post_id)?,
      draft_id:     decode_uuid(&self.draft_id)?,
      slug:         self.slug,
      title:        self.title,
      body:         self.body,
      tags:         decode_tags(&self.tags)?,
      excerpt:      self.excerpt,
      published_at: decode_dt(&self.published_at)?,
    })
  }
}

/// Raw strings read directly from an `audit` row.
pub struct RawAudit {
  pub audit_id:    String,
  pub action:      String,
  pub actor:       Option<String>,
  pub target_kind: String,
  pub target_id:   String,
  pub prev_json:   String,
  pub next_json:   String,
  pub metadata:    String,
  pub created_at:  String,
}

impl RawAudit {
  pub fn into_record(self) -> Result<AuditRecord> {
    Ok(AuditRecord {
      audit_id:    decode_uuid(&self.audit_id)?,
      action:      self.action,
      actor:       self.actor,
      target_kind: TargetKind::parse(&self.target_kind)?,
      target_id:   decode_uuid(&self.target_id)?,
      prev:        decode_snapshot(&self.prev_json)?,
      next:        decode_snapshot(&self.next_json)?,
      metadata:    serde_json::from_str(&self.metadata)?,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}
