//! Authorization policy — the single allow/deny decision point.
//!
//! Role checks are not scattered across handlers; every transition planner
//! and every handler that mutates state calls [`authorize`] with a [`Verb`].
//! Identity verification (sessions, password hashes) happens at the HTTP
//! boundary and is out of scope here — this module only consumes the
//! resolved caller.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Role ────────────────────────────────────────────────────────────────────

/// The staff role resolved for an authenticated caller.
///
/// Ownership is a relation between a caller and a draft, not a role: any
/// caller may own drafts, and owner-gated verbs compare identities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Admin,
  Editor,
  Moderator,
}

impl Role {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Admin => "admin",
      Self::Editor => "editor",
      Self::Moderator => "moderator",
    }
  }

  pub fn parse(s: &str) -> Result<Self> {
    match s {
      "admin" => Ok(Self::Admin),
      "editor" => Ok(Self::Editor),
      "moderator" => Ok(Self::Moderator),
      other => Err(Error::Validation(format!("unknown role: {other:?}"))),
    }
  }

  /// Editors and admins review drafts.
  pub fn can_review(self) -> bool {
    matches!(self, Self::Admin | Self::Editor)
  }

  /// Moderators and admins act on the moderation queue.
  pub fn can_moderate(self) -> bool {
    matches!(self, Self::Admin | Self::Moderator)
  }
}

// ─── Caller ──────────────────────────────────────────────────────────────────

/// An authenticated caller: resolved identity plus role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
  pub id:   String,
  pub role: Role,
}

// ─── Verb ────────────────────────────────────────────────────────────────────

/// The classes of action the policy distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
  /// Submit a draft into review — its owner or an admin.
  SubmitDraft,
  /// Edit draft content — its owner or an admin.
  EditDraft,
  /// Correct an already-published draft — admin only.
  CorrectPublished,
  /// Delete a draft — its owner or an admin.
  DeleteDraft,
  /// Request changes, schedule, or publish — editor or admin.
  ReviewDraft,
  /// Pull a published draft back to `draft` — admin only.
  ReopenDraft,
  /// Any moderation-queue action — moderator or admin.
  ModerateEvent,
}

impl Verb {
  fn describe(self) -> &'static str {
    match self {
      Self::SubmitDraft => "submit this draft",
      Self::EditDraft => "edit this draft",
      Self::CorrectPublished => "correct a published draft",
      Self::DeleteDraft => "delete this draft",
      Self::ReviewDraft => "review drafts",
      Self::ReopenDraft => "reopen a published draft",
      Self::ModerateEvent => "act on the moderation queue",
    }
  }
}

// ─── Decision ────────────────────────────────────────────────────────────────

/// `(caller role, caller id, resource owner, verb) → allow/deny`.
///
/// `owner` is the resource owner's identity where the verb is owner-gated;
/// pass `None` for verbs that are purely role-gated.
pub fn authorize(caller: &Caller, owner: Option<&str>, verb: Verb) -> Result<()> {
  let allowed = match verb {
    Verb::SubmitDraft | Verb::EditDraft | Verb::DeleteDraft => {
      caller.role == Role::Admin || owner.is_some_and(|o| o == caller.id)
    }
    Verb::ReviewDraft => caller.role.can_review(),
    Verb::CorrectPublished | Verb::ReopenDraft => caller.role == Role::Admin,
    Verb::ModerateEvent => caller.role.can_moderate(),
  };

  if allowed {
    Ok(())
  } else {
    Err(Error::Forbidden(format!(
      "{} ({}) may not {}",
      caller.id,
      caller.role.as_str(),
      verb.describe()
    )))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn caller(id: &str, role: Role) -> Caller {
    Caller { id: id.into(), role }
  }

  #[test]
  fn owner_may_submit_own_draft() {
    let c = caller("ana@example.com", Role::Editor);
    assert!(authorize(&c, Some("ana@example.com"), Verb::SubmitDraft).is_ok());
  }

  #[test]
  fn non_owner_may_not_submit() {
    let c = caller("bo@example.com", Role::Editor);
    let err = authorize(&c, Some("ana@example.com"), Verb::SubmitDraft).unwrap_err();
    assert!(matches!(err, Error::Forbidden(_)));
  }

  #[test]
  fn admin_may_submit_any_draft() {
    let c = caller("root@example.com", Role::Admin);
    assert!(authorize(&c, Some("ana@example.com"), Verb::SubmitDraft).is_ok());
  }

  #[test]
  fn moderator_may_not_review_drafts() {
    let c = caller("mo@example.com", Role::Moderator);
    assert!(authorize(&c, None, Verb::ReviewDraft).is_err());
  }

  #[test]
  fn editor_may_not_reopen_published() {
    let c = caller("ed@example.com", Role::Editor);
    assert!(authorize(&c, None, Verb::ReopenDraft).is_err());
  }

  #[test]
  fn moderator_and_admin_may_moderate() {
    assert!(authorize(&caller("m@x", Role::Moderator), None, Verb::ModerateEvent).is_ok());
    assert!(authorize(&caller("a@x", Role::Admin), None, Verb::ModerateEvent).is_ok());
    assert!(authorize(&caller("e@x", Role::Editor), None, Verb::ModerateEvent).is_err());
  }
}
