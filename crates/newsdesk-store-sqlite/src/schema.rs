//! SQL schema for the Newsdesk SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Work-in-progress articles. The revision column is the optimistic
-- concurrency token: every write is conditional on it.
CREATE TABLE IF NOT EXISTS drafts (
    draft_id               TEXT PRIMARY KEY,
    title                  TEXT NOT NULL,
    body                   TEXT NOT NULL,
    tags                   TEXT NOT NULL DEFAULT '[]',  -- JSON array
    status                 TEXT NOT NULL DEFAULT 'draft',
    owner                  TEXT NOT NULL,
    assignee               TEXT,
    reviewer               TEXT,
    scheduled_for          TEXT,            -- ISO 8601 UTC; only when scheduled
    second_review_required INTEGER NOT NULL DEFAULT 0,
    revision               INTEGER NOT NULL DEFAULT 1,
    created_at             TEXT NOT NULL,
    updated_at             TEXT NOT NULL
);

-- Moderation queue items / internal notes. Never deleted.
CREATE TABLE IF NOT EXISTS events (
    event_id      TEXT PRIMARY KEY,
    kind          TEXT NOT NULL,    -- 'report' | 'system_flag' | 'editor_note'
    visibility    TEXT NOT NULL,    -- 'public' | 'internal'
    status        TEXT NOT NULL DEFAULT 'open',
    assigned_to   TEXT,
    second_review INTEGER NOT NULL DEFAULT 0,
    redacted_text TEXT NOT NULL,
    raw_hash      TEXT NOT NULL,    -- sha256 hex of the unredacted text
    target_kind   TEXT NOT NULL,
    target_id     TEXT NOT NULL,
    revision      INTEGER NOT NULL DEFAULT 1,
    created_at    TEXT NOT NULL,
    updated_at    TEXT NOT NULL
);

-- Public materialisations of published drafts. One post per draft. Posts
-- are snapshots, so no foreign key: the draft may be deleted later while
-- the post survives.
CREATE TABLE IF NOT EXISTS posts (
    post_id      TEXT PRIMARY KEY,
    draft_id     TEXT NOT NULL UNIQUE,
    slug         TEXT NOT NULL UNIQUE,
    title        TEXT NOT NULL,
    body         TEXT NOT NULL,
    tags         TEXT NOT NULL DEFAULT '[]',
    excerpt      TEXT NOT NULL,
    published_at TEXT NOT NULL
);

-- The audit trail is strictly append-only.
-- No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS audit (
    audit_id    TEXT PRIMARY KEY,
    action      TEXT NOT NULL,
    actor       TEXT,             -- NULL for system actions
    target_kind TEXT NOT NULL,
    target_id   TEXT NOT NULL,
    prev_json   TEXT NOT NULL,    -- minimal StateSnapshot
    next_json   TEXT NOT NULL,
    metadata    TEXT NOT NULL DEFAULT '{}',
    created_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS drafts_status_idx  ON drafts(status);
CREATE INDEX IF NOT EXISTS drafts_owner_idx   ON drafts(owner);
CREATE INDEX IF NOT EXISTS events_queue_idx   ON events(visibility, status);
CREATE INDEX IF NOT EXISTS events_target_idx  ON events(target_kind, target_id);
CREATE INDEX IF NOT EXISTS posts_slug_idx     ON posts(slug);
CREATE INDEX IF NOT EXISTS audit_target_idx   ON audit(target_kind, target_id, created_at);

PRAGMA user_version = 1;
";
