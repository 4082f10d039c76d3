//! Side-effect dispatch for successful transitions.
//!
//! Notifications are best-effort and fire-and-forget: a missing or failing
//! notifier never fails the transition that triggered it. Implementations
//! must not block; anything slow belongs on a spawned task inside the
//! implementation.

use uuid::Uuid;

/// A notice emitted after selected successful transitions.
#[derive(Debug, Clone)]
pub enum Notice {
  DraftPublished {
    draft_id: Uuid,
    slug:     String,
    owner:    String,
  },
  ChangesRequested {
    draft_id: Uuid,
    owner:    String,
    reviewer: String,
  },
  EventResolved {
    event_id: Uuid,
    actor:    String,
  },
}

/// Receiver for workflow notices. Object-safe so app state can hold a
/// `Arc<dyn Notifier>`.
pub trait Notifier: Send + Sync {
  fn notify(&self, notice: Notice);
}

/// Discards every notice; used in tests and when notifications are disabled.
pub struct NullNotifier;

impl Notifier for NullNotifier {
  fn notify(&self, _notice: Notice) {}
}
