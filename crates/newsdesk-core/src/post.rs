//! Post — the publicly readable materialisation of a published draft.
//!
//! Posts are copies, not views: publishing snapshots the draft's content so
//! later administrative edits to the draft do not silently rewrite the public
//! record. One post per draft, enforced by a UNIQUE constraint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum length of the slug's title-derived prefix.
const SLUG_TITLE_MAX: usize = 60;

/// Maximum length of a generated excerpt.
const EXCERPT_MAX: usize = 200;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
  pub post_id:      Uuid,
  /// The draft this post was materialised from.
  pub draft_id:     Uuid,
  pub slug:         String,
  pub title:        String,
  pub body:         String,
  pub tags:         Vec<String>,
  pub excerpt:      String,
  pub published_at: DateTime<Utc>,
}

impl Post {
  /// Snapshot `draft` into a new post. The slug is deterministic for a given
  /// draft, which keeps repeated publishes idempotent.
  pub fn from_draft(draft: &crate::draft::Draft, now: DateTime<Utc>) -> Self {
    Self {
      post_id:      Uuid::new_v4(),
      draft_id:     draft.draft_id,
      slug:         slug_for(&draft.title, draft.draft_id),
      title:        draft.title.clone(),
      body:         draft.body.clone(),
      tags:         draft.tags.clone(),
      excerpt:      excerpt_of(&draft.body),
      published_at: now,
    }
  }
}

// ─── Slug ────────────────────────────────────────────────────────────────────

/// Derive a URL slug from the title, suffixed with the first UUID segment of
/// the draft id so retitled or identically-titled drafts cannot collide.
pub fn slug_for(title: &str, draft_id: Uuid) -> String {
  let mut base = String::with_capacity(title.len());
  let mut prev_dash = true; // suppress a leading dash
  for c in title.chars() {
    if c.is_ascii_alphanumeric() {
      base.push(c.to_ascii_lowercase());
      prev_dash = false;
    } else if !prev_dash {
      base.push('-');
      prev_dash = true;
    }
    if base.len() >= SLUG_TITLE_MAX {
      break;
    }
  }
  let base = base.trim_matches('-');

  let id = draft_id.as_simple().to_string();
  let short = &id[..8];

  if base.is_empty() {
    short.to_string()
  } else {
    format!("{base}-{short}")
  }
}

/// First paragraph of the body, truncated on a char boundary.
pub fn excerpt_of(body: &str) -> String {
  let first = body.split("\n\n").next().unwrap_or("").trim();
  first.chars().take(EXCERPT_MAX).collect()
}
