//! The workflow engine — pure transition planners for drafts and moderation
//! events.
//!
//! A planner takes the current record, the requested action, and the caller,
//! and returns either a plan (the computed next state) or a typed error. It
//! performs no I/O: the store applies plans with a conditional update, so a
//! rejected transition can never leave a partial write behind.

use chrono::{DateTime, Utc};

use crate::{
  Error, Result,
  draft::{Draft, DraftStatus},
  event::{EventStatus, ModerationEvent, Visibility},
  policy::{self, Caller, Verb},
};

// ─── Draft actions ───────────────────────────────────────────────────────────

/// An action requested against a draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftAction {
  /// Owner sends the draft into review.
  Submit,
  /// Reviewer sends it back to the owner.
  RequestChanges,
  /// Reviewer approves for publication at a future time.
  Schedule(DateTime<Utc>),
  /// Reviewer publishes now (also how a scheduled draft goes live).
  Publish,
  /// Admin pulls a published draft back to `draft`.
  Reopen,
}

impl DraftAction {
  /// The name recorded in the audit trail.
  pub fn name(&self) -> &'static str {
    match self {
      Self::Submit => "submit",
      Self::RequestChanges => "request_changes",
      Self::Schedule(_) => "schedule",
      Self::Publish => "publish",
      Self::Reopen => "reopen",
    }
  }
}

/// The computed next state of a draft transition; applied atomically by the
/// store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftPlan {
  pub action:        &'static str,
  pub next:          DraftStatus,
  pub scheduled_for: Option<DateTime<Utc>>,
  /// Reviewer identity to record, for reviewer-initiated actions.
  pub reviewer:      Option<String>,
}

/// Outcome of planning a draft transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftOutcome {
  /// Apply this plan, append an audit record, run side effects.
  Apply(DraftPlan),
  /// `publish` on an already-published draft: succeed without a new
  /// transition or audit entry; the store refreshes the post snapshot from
  /// the draft's current content.
  AlreadyPublished,
}

/// Plan a draft transition. Authorization is checked first, then the source
/// state, then action-specific validation.
pub fn plan_draft(
  draft:  &Draft,
  action: &DraftAction,
  caller: &Caller,
  now:    DateTime<Utc>,
) -> Result<DraftOutcome> {
  let invalid = || Error::InvalidTransition {
    from:   draft.status.as_str(),
    action: action.name(),
  };

  let plan = match action {
    DraftAction::Submit => {
      policy::authorize(caller, Some(&draft.owner), Verb::SubmitDraft)?;
      let next = match draft.status {
        DraftStatus::Draft | DraftStatus::ChangesRequested => {
          if draft.second_review_required {
            DraftStatus::NeedsSecondReview
          } else {
            DraftStatus::Ready
          }
        }
        _ => return Err(invalid()),
      };
      DraftPlan {
        action:        action.name(),
        next,
        scheduled_for: None,
        reviewer:      None,
      }
    }

    DraftAction::RequestChanges => {
      policy::authorize(caller, None, Verb::ReviewDraft)?;
      match draft.status {
        DraftStatus::Ready | DraftStatus::NeedsSecondReview => {}
        _ => return Err(invalid()),
      }
      DraftPlan {
        action:        action.name(),
        next:          DraftStatus::ChangesRequested,
        scheduled_for: None,
        reviewer:      Some(caller.id.clone()),
      }
    }

    DraftAction::Schedule(at) => {
      policy::authorize(caller, None, Verb::ReviewDraft)?;
      if draft.status != DraftStatus::Ready {
        return Err(invalid());
      }
      if *at <= now {
        return Err(Error::Validation(
          "scheduled_for must be in the future".to_string(),
        ));
      }
      DraftPlan {
        action:        action.name(),
        next:          DraftStatus::Scheduled,
        scheduled_for: Some(*at),
        reviewer:      Some(caller.id.clone()),
      }
    }

    DraftAction::Publish => {
      policy::authorize(caller, None, Verb::ReviewDraft)?;
      match draft.status {
        DraftStatus::Published => return Ok(DraftOutcome::AlreadyPublished),
        DraftStatus::Ready | DraftStatus::Scheduled => {}
        _ => return Err(invalid()),
      }
      DraftPlan {
        action:        action.name(),
        next:          DraftStatus::Published,
        scheduled_for: None,
        reviewer:      Some(caller.id.clone()),
      }
    }

    DraftAction::Reopen => {
      policy::authorize(caller, None, Verb::ReopenDraft)?;
      if draft.status != DraftStatus::Published {
        return Err(invalid());
      }
      DraftPlan {
        action:        action.name(),
        next:          DraftStatus::Draft,
        scheduled_for: None,
        reviewer:      None,
      }
    }
  };

  Ok(DraftOutcome::Apply(plan))
}

// ─── Event actions ───────────────────────────────────────────────────────────

/// An action requested against a moderation event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventAction {
  Assign { assignee: String },
  Release,
  FlagSecond,
  Resolve,
  Reopen,
}

impl EventAction {
  pub fn name(&self) -> &'static str {
    match self {
      Self::Assign { .. } => "assign",
      Self::Release => "release",
      Self::FlagSecond => "flag_second",
      Self::Resolve => "resolve",
      Self::Reopen => "reopen",
    }
  }
}

/// The computed next state of an event transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventPlan {
  pub action:        &'static str,
  pub next:          EventStatus,
  pub assigned_to:   Option<String>,
  pub second_review: bool,
}

/// Plan a moderation-event transition.
///
/// The transition table is explicit: the original behaviour accepted every
/// action from every state, which let a stale client silently resolve an
/// item that had been concurrently reassigned. Disallowed pairs now fail
/// with `InvalidTransition`.
pub fn plan_event(
  event:  &ModerationEvent,
  action: &EventAction,
  caller: &Caller,
) -> Result<EventPlan> {
  policy::authorize(caller, None, Verb::ModerateEvent)?;

  // Only internal events participate in the moderation queue.
  if event.visibility == Visibility::Public {
    return Err(Error::Validation(
      "public events are not subject to moderation".to_string(),
    ));
  }

  let invalid = || Error::InvalidTransition {
    from:   event.status.as_str(),
    action: action.name(),
  };

  use EventStatus::*;
  let plan = match action {
    EventAction::Assign { assignee } => {
      if assignee.trim().is_empty() {
        return Err(Error::Validation("assignee must not be empty".to_string()));
      }
      match event.status {
        Open | InReview | Flagged => {}
        Resolved => return Err(invalid()),
      }
      EventPlan {
        action:        action.name(),
        next:          InReview,
        assigned_to:   Some(assignee.clone()),
        second_review: event.second_review,
      }
    }

    EventAction::Release => {
      match event.status {
        InReview | Flagged => {}
        Open | Resolved => return Err(invalid()),
      }
      EventPlan {
        action:        action.name(),
        next:          Open,
        assigned_to:   None,
        second_review: event.second_review,
      }
    }

    EventAction::FlagSecond => {
      match event.status {
        Open | InReview => {}
        Flagged | Resolved => return Err(invalid()),
      }
      EventPlan {
        action:        action.name(),
        next:          Flagged,
        assigned_to:   event.assigned_to.clone(),
        second_review: true,
      }
    }

    EventAction::Resolve => {
      match event.status {
        Open | InReview | Flagged => {}
        Resolved => return Err(invalid()),
      }
      EventPlan {
        action:        action.name(),
        next:          Resolved,
        assigned_to:   event.assigned_to.clone(),
        second_review: event.second_review,
      }
    }

    EventAction::Reopen => {
      if event.status != Resolved {
        return Err(invalid());
      }
      EventPlan {
        action:        action.name(),
        next:          Open,
        assigned_to:   event.assigned_to.clone(),
        second_review: false,
      }
    }
  };

  Ok(plan)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
