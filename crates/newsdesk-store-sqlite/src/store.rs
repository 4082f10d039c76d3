//! [`SqliteStore`] — the SQLite implementation of [`NewsStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use newsdesk_core::{
  audit::{AuditRecord, NewAuditRecord, TargetKind},
  draft::{Draft, DraftPatch, DraftStatus, NewDraft},
  event::{EventStatus, ModerationEvent, NewEvent},
  post::Post,
  store::NewsStore,
  workflow::{DraftPlan, EventPlan},
};

use crate::{
  Error, Result,
  encode::{
    RawAudit, RawDraft, RawEvent, RawPost, encode_dt, encode_snapshot,
    encode_tags, encode_uuid,
  },
  schema::SCHEMA,
};

const DRAFT_COLS: &str = "draft_id, title, body, tags, status, owner, assignee, \
   reviewer, scheduled_for, second_review_required, revision, created_at, updated_at";

const EVENT_COLS: &str = "event_id, kind, visibility, status, assigned_to, \
   second_review, redacted_text, raw_hash, target_kind, target_id, revision, \
   created_at, updated_at";

const POST_COLS: &str =
  "post_id, draft_id, slug, title, body, tags, excerpt, published_at";

fn draft_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawDraft> {
  Ok(RawDraft {
    draft_id:               row.get(0)?,
    title:                  row.get(1)?,
    body:                   row.get(2)?,
    tags:                   row.get(3)?,
    status:                 row.get(4)?,
    owner:                  row.get(5)?,
    assignee:               row.get(6)?,
    reviewer:               row.get(7)?,
    scheduled_for:          row.get(8)?,
    second_review_required: row.get(9)?,
    revision:               row.get(10)?,
    created_at:             row.get(11)?,
    updated_at:             row.get(12)?,
  })
}

fn event_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawEvent> {
  Ok(RawEvent {
    event_id:      row.get(0)?,
    kind:          row.get(1)?,
    visibility:    row.get(2)?,
    status:        row.get(3)?,
    assigned_to:   row.get(4)?,
    second_review: row.get(5)?,
    redacted_text: row.get(6)?,
    raw_hash:      row.get(7)?,
    target_kind:   row.get(8)?,
    target_id:     row.get(9)?,
    revision:      row.get(10)?,
    created_at:    row.get(11)?,
    updated_at:    row.get(12)?,
  })
}

fn post_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawPost> {
  Ok(RawPost {
    post_id:      row.get(0)?,
    draft_id:     row.get(1)?,
    slug:         row.get(2)?,
    title:        row.get(3)?,
    body:         row.get(4)?,
    tags:         row.get(5)?,
    excerpt:      row.get(6)?,
    published_at: row.get(7)?,
  })
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Newsdesk store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

/// Result of a revision-conditional UPDATE: the fresh row on success,
/// otherwise the current revision (or `None` when the row is missing).
enum Conditional<R> {
  Updated(R),
  StaleRevision(i64),
  Missing,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── NewsStore impl ──────────────────────────────────────────────────────────

impl NewsStore for SqliteStore {
  type Error = Error;

  // ── Drafts ────────────────────────────────────────────────────────────────

  async fn create_draft(&self, input: NewDraft) -> Result<Draft> {
    let now = Utc::now();
    let draft = Draft {
      draft_id:               Uuid::new_v4(),
      title:                  input.title,
      body:                   input.body,
      tags:                   input.tags,
      status:                 DraftStatus::Draft,
      owner:                  input.owner,
      assignee:               None,
      reviewer:               None,
      scheduled_for:          None,
      second_review_required: input.second_review_required,
      revision:               1,
      created_at:             now,
      updated_at:             now,
    };

    let id_str    = encode_uuid(draft.draft_id);
    let title     = draft.title.clone();
    let body      = draft.body.clone();
    let tags_str  = encode_tags(&draft.tags)?;
    let owner     = draft.owner.clone();
    let second    = draft.second_review_required;
    let at_str    = encode_dt(now);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO drafts (
             draft_id, title, body, tags, status, owner,
             second_review_required, revision, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, 'draft', ?5, ?6, 1, ?7, ?7)",
          rusqlite::params![id_str, title, body, tags_str, owner, second, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(draft)
  }

  async fn get_draft(&self, id: Uuid) -> Result<Option<Draft>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawDraft> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {DRAFT_COLS} FROM drafts WHERE draft_id = ?1"),
              rusqlite::params![id_str],
              draft_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawDraft::into_draft).transpose()
  }

  async fn list_drafts(&self, status: Option<DraftStatus>) -> Result<Vec<Draft>> {
    let status_str = status.map(|s| s.as_str().to_owned());

    let raws: Vec<RawDraft> = self
      .conn
      .call(move |conn| {
        let rows = if let Some(s) = status_str {
          let mut stmt = conn.prepare(&format!(
            "SELECT {DRAFT_COLS} FROM drafts WHERE status = ?1
             ORDER BY created_at DESC"
          ))?;
          stmt
            .query_map(rusqlite::params![s], draft_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let mut stmt = conn.prepare(&format!(
            "SELECT {DRAFT_COLS} FROM drafts ORDER BY created_at DESC"
          ))?;
          stmt
            .query_map([], draft_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawDraft::into_draft).collect()
  }

  async fn update_draft_content(
    &self,
    id:                Uuid,
    expected_revision: i64,
    patch:             DraftPatch,
  ) -> Result<Draft> {
    let id_str = encode_uuid(id);
    let at_str = encode_dt(Utc::now());
    let title  = patch.title;
    let body   = patch.body;
    let tags   = patch.tags.as_deref().map(encode_tags).transpose()?;

    let outcome: Conditional<RawDraft> = self
      .conn
      .call(move |conn| {
        let updated = conn.execute(
          "UPDATE drafts SET
             title      = COALESCE(?2, title),
             body       = COALESCE(?3, body),
             tags       = COALESCE(?4, tags),
             revision   = revision + 1,
             updated_at = ?5
           WHERE draft_id = ?1 AND revision = ?6",
          rusqlite::params![id_str, title, body, tags, at_str, expected_revision],
        )?;

        if updated == 1 {
          let raw = conn.query_row(
            &format!("SELECT {DRAFT_COLS} FROM drafts WHERE draft_id = ?1"),
            rusqlite::params![id_str],
            draft_from_row,
          )?;
          return Ok(Conditional::Updated(raw));
        }

        let current: Option<i64> = conn
          .query_row(
            "SELECT revision FROM drafts WHERE draft_id = ?1",
            rusqlite::params![id_str],
            |r| r.get(0),
          )
          .optional()?;

        Ok(match current {
          Some(actual) => Conditional::StaleRevision(actual),
          None         => Conditional::Missing,
        })
      })
      .await?;

    match outcome {
      Conditional::Updated(raw) => raw.into_draft(),
      Conditional::StaleRevision(actual) => Err(Error::RevisionConflict {
        expected: expected_revision,
        actual,
      }),
      Conditional::Missing => Err(Error::DraftNotFound(id)),
    }
  }

  async fn apply_draft_transition(
    &self,
    id:                Uuid,
    expected_revision: i64,
    plan:              DraftPlan,
  ) -> Result<Draft> {
    let id_str        = encode_uuid(id);
    let status_str    = plan.next.as_str().to_owned();
    let scheduled_str = plan.scheduled_for.map(encode_dt);
    let reviewer      = plan.reviewer;
    let at_str        = encode_dt(Utc::now());

    let outcome: Conditional<RawDraft> = self
      .conn
      .call(move |conn| {
        let updated = conn.execute(
          "UPDATE drafts SET
             status        = ?2,
             scheduled_for = ?3,
             reviewer      = COALESCE(?4, reviewer),
             revision      = revision + 1,
             updated_at    = ?5
           WHERE draft_id = ?1 AND revision = ?6",
          rusqlite::params![
            id_str,
            status_str,
            scheduled_str,
            reviewer,
            at_str,
            expected_revision,
          ],
        )?;

        if updated == 1 {
          let raw = conn.query_row(
            &format!("SELECT {DRAFT_COLS} FROM drafts WHERE draft_id = ?1"),
            rusqlite::params![id_str],
            draft_from_row,
          )?;
          return Ok(Conditional::Updated(raw));
        }

        let current: Option<i64> = conn
          .query_row(
            "SELECT revision FROM drafts WHERE draft_id = ?1",
            rusqlite::params![id_str],
            |r| r.get(0),
          )
          .optional()?;

        Ok(match current {
          Some(actual) => Conditional::StaleRevision(actual),
          None         => Conditional::Missing,
        })
      })
      .await?;

    match outcome {
      Conditional::Updated(raw) => raw.into_draft(),
      Conditional::StaleRevision(actual) => Err(Error::RevisionConflict {
        expected: expected_revision,
        actual,
      }),
      Conditional::Missing => Err(Error::DraftNotFound(id)),
    }
  }

  async fn delete_draft(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);

    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM drafts WHERE draft_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    if deleted == 0 {
      return Err(Error::DraftNotFound(id));
    }
    Ok(())
  }

  // ── Moderation events ─────────────────────────────────────────────────────

  async fn create_event(&self, input: NewEvent) -> Result<ModerationEvent> {
    let now = Utc::now();
    let event = ModerationEvent {
      event_id:      Uuid::new_v4(),
      kind:          input.kind,
      visibility:    input.visibility,
      status:        EventStatus::Open,
      assigned_to:   None,
      second_review: false,
      redacted_text: input.redacted_text,
      raw_hash:      input.raw_hash,
      target_kind:   input.target_kind,
      target_id:     input.target_id,
      revision:      1,
      created_at:    now,
      updated_at:    now,
    };

    let id_str      = encode_uuid(event.event_id);
    let kind_str    = event.kind.as_str().to_owned();
    let vis_str     = event.visibility.as_str().to_owned();
    let text        = event.redacted_text.clone();
    let hash        = event.raw_hash.clone();
    let tkind_str   = event.target_kind.as_str().to_owned();
    let tid_str     = encode_uuid(event.target_id);
    let at_str      = encode_dt(now);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO events (
             event_id, kind, visibility, status, second_review,
             redacted_text, raw_hash, target_kind, target_id,
             revision, created_at, updated_at
           ) VALUES (?1, ?2, ?3, 'open', 0, ?4, ?5, ?6, ?7, 1, ?8, ?8)",
          rusqlite::params![id_str, kind_str, vis_str, text, hash, tkind_str, tid_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(event)
  }

  async fn get_event(&self, id: Uuid) -> Result<Option<ModerationEvent>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawEvent> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {EVENT_COLS} FROM events WHERE event_id = ?1"),
              rusqlite::params![id_str],
              event_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawEvent::into_event).transpose()
  }

  async fn list_queue(
    &self,
    status: Option<EventStatus>,
  ) -> Result<Vec<ModerationEvent>> {
    let status_str = status.map(|s| s.as_str().to_owned());

    let raws: Vec<RawEvent> = self
      .conn
      .call(move |conn| {
        let rows = if let Some(s) = status_str {
          let mut stmt = conn.prepare(&format!(
            "SELECT {EVENT_COLS} FROM events
             WHERE visibility = 'internal' AND status = ?1
             ORDER BY created_at ASC"
          ))?;
          stmt
            .query_map(rusqlite::params![s], event_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let mut stmt = conn.prepare(&format!(
            "SELECT {EVENT_COLS} FROM events
             WHERE visibility = 'internal'
             ORDER BY created_at ASC"
          ))?;
          stmt
            .query_map([], event_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEvent::into_event).collect()
  }

  async fn apply_event_transition(
    &self,
    id:                Uuid,
    expected_revision: i64,
    plan:              EventPlan,
  ) -> Result<ModerationEvent> {
    let id_str      = encode_uuid(id);
    let status_str  = plan.next.as_str().to_owned();
    let assigned_to = plan.assigned_to;
    let second      = plan.second_review;
    let at_str      = encode_dt(Utc::now());

    let outcome: Conditional<RawEvent> = self
      .conn
      .call(move |conn| {
        let updated = conn.execute(
          "UPDATE events SET
             status        = ?2,
             assigned_to   = ?3,
             second_review = ?4,
             revision      = revision + 1,
             updated_at    = ?5
           WHERE event_id = ?1 AND revision = ?6",
          rusqlite::params![id_str, status_str, assigned_to, second, at_str, expected_revision],
        )?;

        if updated == 1 {
          let raw = conn.query_row(
            &format!("SELECT {EVENT_COLS} FROM events WHERE event_id = ?1"),
            rusqlite::params![id_str],
            event_from_row,
          )?;
          return Ok(Conditional::Updated(raw));
        }

        let current: Option<i64> = conn
          .query_row(
            "SELECT revision FROM events WHERE event_id = ?1",
            rusqlite::params![id_str],
            |r| r.get(0),
          )
          .optional()?;

        Ok(match current {
          Some(actual) => Conditional::StaleRevision(actual),
          None         => Conditional::Missing,
        })
      })
      .await?;

    match outcome {
      Conditional::Updated(raw) => raw.into_event(),
      Conditional::StaleRevision(actual) => Err(Error::RevisionConflict {
        expected: expected_revision,
        actual,
      }),
      Conditional::Missing => Err(Error::EventNotFound(id)),
    }
  }

  // ── Posts ─────────────────────────────────────────────────────────────────

  async fn publish_post(&self, draft: &Draft) -> Result<Post> {
    let candidate = Post::from_draft(draft, Utc::now());

    let draft_id_str = encode_uuid(candidate.draft_id);
    let post_id_str  = encode_uuid(candidate.post_id);
    let slug         = candidate.slug.clone();
    let title        = candidate.title.clone();
    let body         = candidate.body.clone();
    let tags_str     = encode_tags(&candidate.tags)?;
    let excerpt      = candidate.excerpt.clone();
    let at_str       = encode_dt(candidate.published_at);

    let existing: Option<RawPost> = self
      .conn
      .call(move |conn| {
        let existing = conn
          .query_row(
            &format!("SELECT {POST_COLS} FROM posts WHERE draft_id = ?1"),
            rusqlite::params![draft_id_str],
            post_from_row,
          )
          .optional()?;

        if existing.is_some() {
          // Republish after rework: refresh the content snapshot in place.
          // Post id, slug, and published_at stay stable so public URLs and
          // feed ordering survive the reopen cycle.
          conn.execute(
            "UPDATE posts SET title = ?2, body = ?3, tags = ?4, excerpt = ?5
             WHERE draft_id = ?1",
            rusqlite::params![draft_id_str, title, body, tags_str, excerpt],
          )?;
          let refreshed = conn.query_row(
            &format!("SELECT {POST_COLS} FROM posts WHERE draft_id = ?1"),
            rusqlite::params![draft_id_str],
            post_from_row,
          )?;
          return Ok(Some(refreshed));
        }

        conn.execute(
          "INSERT INTO posts (
             post_id, draft_id, slug, title, body, tags, excerpt, published_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![post_id_str, draft_id_str, slug, title, body, tags_str, excerpt, at_str],
        )?;
        Ok(None)
      })
      .await?;

    match existing {
      Some(raw) => raw.into_post(),
      None      => Ok(candidate),
    }
  }

  async fn get_post_by_slug(&self, slug: &str) -> Result<Option<Post>> {
    let slug = slug.to_owned();

    let raw: Option<RawPost> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {POST_COLS} FROM posts WHERE slug = ?1"),
              rusqlite::params![slug],
              post_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPost::into_post).transpose()
  }

  async fn list_posts(&self) -> Result<Vec<Post>> {
    let raws: Vec<RawPost> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {POST_COLS} FROM posts ORDER BY published_at DESC"
        ))?;
        let rows = stmt
          .query_map([], post_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPost::into_post).collect()
  }

  // ── Audit trail ───────────────────────────────────────────────────────────

  async fn append_audit(&self, input: NewAuditRecord) -> Result<AuditRecord> {
    let record = AuditRecord {
      audit_id:    Uuid::new_v4(),
      action:      input.action,
      actor:       input.actor,
      target_kind: input.target_kind,
      target_id:   input.target_id,
      prev:        input.prev,
      next:        input.next,
      metadata:    input.metadata,
      created_at:  Utc::now(),
    };

    let id_str    = encode_uuid(record.audit_id);
    let action    = record.action.clone();
    let actor     = record.actor.clone();
    let tkind_str = record.target_kind.as_str().to_owned();
    let tid_str   = encode_uuid(record.target_id);
    let prev_str  = encode_snapshot(&record.prev)?;
    let next_str  = encode_snapshot(&record.next)?;
    let meta_str  = record.metadata.to_string();
    let at_str    = encode_dt(record.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO audit (
             audit_id, action, actor, target_kind, target_id,
             prev_json, next_json, metadata, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          rusqlite::params![id_str, action, actor, tkind_str, tid_str, prev_str, next_str, meta_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(record)
  }

  async fn audit_for_target(
    &self,
    kind:      TargetKind,
    target_id: Uuid,
  ) -> Result<Vec<AuditRecord>> {
    let kind_str = kind.as_str().to_owned();
    let tid_str  = encode_uuid(target_id);

    let raws: Vec<RawAudit> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT audit_id, action, actor, target_kind, target_id,
                  prev_json, next_json, metadata, created_at
           FROM audit
           WHERE target_kind = ?1 AND target_id = ?2
           ORDER BY created_at ASC, audit_id ASC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![kind_str, tid_str], |row| {
            Ok(RawAudit {
              audit_id:    row.get(0)?,
              action:      row.get(1)?,
              actor:       row.get(2)?,
              target_kind: row.get(3)?,
              target_id:   row.get(4)?,
              prev_json:   row.get(5)?,
              next_json:   row.get(6)?,
              metadata:    row.get(7)?,
              created_at:  row.get(8)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAudit::into_record).collect()
  }
}
