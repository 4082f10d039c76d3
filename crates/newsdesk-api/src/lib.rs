//! JSON REST API for Newsdesk.
//!
//! Exposes an axum [`Router`] backed by any [`newsdesk_core::store::NewsStore`].
//! All editorial and moderation routes require HTTP Basic auth; the published
//! post routes are public.

pub mod audit;
pub mod auth;
pub mod drafts;
pub mod error;
pub mod events;
pub mod posts;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post},
};
use newsdesk_core::{
  notify::{Notice, Notifier},
  policy::Role,
  store::NewsStore,
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use auth::AuthConfig;
pub use error::ApiError;

// ─── Configuration ────────────────────────────────────────────────────────────

/// One `[[users]]` entry in `config.toml`.
#[derive(Deserialize, Clone)]
pub struct UserEntry {
  pub username:      String,
  pub password_hash: String,
  pub role:          Role,
}

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
  pub users:      Vec<UserEntry>,
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: NewsStore> {
  pub store:    Arc<S>,
  pub auth:     Arc<AuthConfig>,
  pub notifier: Arc<dyn Notifier>,
}

// ─── Notifier ─────────────────────────────────────────────────────────────────

/// Notifier that records each notice on the log. Stands in for a real
/// delivery channel; swap the `Arc<dyn Notifier>` in [`AppState`] to change
/// it.
pub struct LogNotifier;

impl Notifier for LogNotifier {
  fn notify(&self, notice: Notice) {
    match notice {
      Notice::DraftPublished { draft_id, slug, owner } => {
        tracing::info!(%draft_id, %slug, %owner, "draft published");
      }
      Notice::ChangesRequested { draft_id, owner, reviewer } => {
        tracing::info!(%draft_id, %owner, %reviewer, "changes requested");
      }
      Notice::EventResolved { event_id, actor } => {
        tracing::info!(%event_id, %actor, "moderation event resolved");
      }
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: NewsStore + Clone + Send + Sync + 'static,
{
  Router::new()
    // Drafts
    .route("/api/drafts", get(drafts::list::<S>).post(drafts::create::<S>))
    .route(
      "/api/drafts/{id}",
      get(drafts::get_one::<S>)
        .patch(drafts::update::<S>)
        .delete(drafts::delete_one::<S>),
    )
    .route("/api/drafts/{id}/submit", post(drafts::submit::<S>))
    .route(
      "/api/drafts/{id}/request-changes",
      post(drafts::request_changes::<S>),
    )
    .route("/api/drafts/{id}/schedule", post(drafts::schedule::<S>))
    .route("/api/drafts/{id}/publish", post(drafts::publish::<S>))
    .route("/api/drafts/{id}/reopen", post(drafts::reopen::<S>))
    // Moderation events
    .route("/api/events", get(events::list::<S>).post(events::create::<S>))
    .route(
      "/api/events/{id}",
      get(events::get_one::<S>).patch(events::triage::<S>),
    )
    // Audit trail
    .route("/api/audit", get(audit::for_target::<S>))
    // Public posts
    .route("/api/posts", get(posts::list::<S>))
    .route("/api/posts/{slug}", get(posts::get_by_slug::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use base64::Engine as _;
  use base64::engine::general_purpose::STANDARD as B64;
  use newsdesk_core::notify::NullNotifier;
  use newsdesk_store_sqlite::SqliteStore;
  use rand_core::OsRng;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  use crate::auth::UserAccount;

  const PASS: &str = "secret";

  async fn make_state() -> AppState<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let salt  = SaltString::generate(&mut OsRng);
    let hash  = Argon2::default()
      .hash_password(PASS.as_bytes(), &salt)
      .unwrap()
      .to_string();

    let user = |username: &str, role| UserAccount {
      username:      username.to_string(),
      password_hash: hash.clone(),
      role,
    };

    AppState {
      store:    Arc::new(store),
      auth:     Arc::new(AuthConfig {
        users: vec![
          user("ana", Role::Editor),
          user("bo", Role::Editor),
          user("mo", Role::Moderator),
          user("root", Role::Admin),
        ],
      }),
      notifier: Arc::new(NullNotifier),
    }
  }

  fn auth_header(user: &str) -> String {
    format!("Basic {}", B64.encode(format!("{user}:{PASS}")))
  }

  async fn send(
    state:  AppState<SqliteStore>,
    method: &str,
    uri:    &str,
    user:   Option<&str>,
    body:   Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
      builder = builder.header(header::AUTHORIZATION, auth_header(user));
    }
    let req = match body {
      Some(v) => builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(v.to_string()))
        .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    };

    let resp   = router(state).oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes  = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    let value = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
  }

  async fn create_draft(state: &AppState<SqliteStore>, owner: &str) -> Value {
    let (status, draft) = send(
      state.clone(),
      "POST",
      "/api/drafts",
      Some(owner),
      Some(json!({
        "title": "City council approves budget",
        "body": "The vote passed late on Tuesday.\n\nDetails follow.",
        "tags": ["politics"],
      })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    draft
  }

  fn id_of(draft: &Value) -> String {
    draft["draft_id"].as_str().unwrap().to_string()
  }

  // ── Auth ────────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn unauthenticated_requests_return_401() {
    let state = make_state().await;
    let req = Request::builder()
      .method("GET")
      .uri("/api/drafts")
      .body(Body::empty())
      .unwrap();
    let resp = router(state).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.headers().contains_key(header::WWW_AUTHENTICATE));
  }

  #[tokio::test]
  async fn posts_are_public() {
    let state = make_state().await;
    let (status, body) = send(state, "GET", "/api/posts", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
  }

  // ── Draft lifecycle ─────────────────────────────────────────────────────────

  #[tokio::test]
  async fn draft_lifecycle_submit_publish() {
    let state = make_state().await;
    let draft = create_draft(&state, "ana").await;
    let id    = id_of(&draft);
    assert_eq!(draft["status"], "draft");
    assert_eq!(draft["revision"], 1);

    let (status, submitted) = send(
      state.clone(),
      "POST",
      &format!("/api/drafts/{id}/submit"),
      Some("ana"),
      Some(json!({ "expected_revision": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(submitted["status"], "ready");
    assert_eq!(submitted["revision"], 2);

    let (status, published) = send(
      state.clone(),
      "POST",
      &format!("/api/drafts/{id}/publish"),
      Some("ana"),
      Some(json!({ "expected_revision": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(published["ok"], true);
    let slug = published["post_slug"].as_str().unwrap().to_string();

    // The post is now publicly readable.
    let (status, post) =
      send(state.clone(), "GET", &format!("/api/posts/{slug}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(post["title"], "City council approves budget");

    // A repeated publish succeeds and points at the same post.
    let (status, again) = send(
      state,
      "POST",
      &format!("/api/drafts/{id}/publish"),
      Some("root"),
      Some(json!({ "expected_revision": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(again["post_slug"], slug);
  }

  #[tokio::test]
  async fn republish_after_reopen_refreshes_post() {
    let state = make_state().await;
    let draft = create_draft(&state, "ana").await;
    let id    = id_of(&draft);

    for (path, rev) in [("submit", 1), ("publish", 2)] {
      let (status, _) = send(
        state.clone(),
        "POST",
        &format!("/api/drafts/{id}/{path}"),
        Some("ana"),
        Some(json!({ "expected_revision": rev })),
      )
      .await;
      assert_eq!(status, StatusCode::OK);
    }

    // Admin pulls it back, the owner reworks and resubmits.
    let (status, _) = send(
      state.clone(),
      "POST",
      &format!("/api/drafts/{id}/reopen"),
      Some("root"),
      Some(json!({ "expected_revision": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
      state.clone(),
      "PATCH",
      &format!("/api/drafts/{id}"),
      Some("ana"),
      Some(json!({ "expected_revision": 4, "title": "Corrected headline" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
      state.clone(),
      "POST",
      &format!("/api/drafts/{id}/submit"),
      Some("ana"),
      Some(json!({ "expected_revision": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, republished) = send(
      state.clone(),
      "POST",
      &format!("/api/drafts/{id}/publish"),
      Some("ana"),
      Some(json!({ "expected_revision": 6 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let slug = republished["post_slug"].as_str().unwrap().to_string();

    // Same public URL, refreshed content, still a single post.
    let (status, post) =
      send(state.clone(), "GET", &format!("/api/posts/{slug}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(post["title"], "Corrected headline");

    let (_, all) = send(state, "GET", "/api/posts", None, None).await;
    assert_eq!(all.as_array().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn second_review_flag_routes_to_needs_second_review() {
    let state = make_state().await;
    let (status, draft) = send(
      state.clone(),
      "POST",
      "/api/drafts",
      Some("ana"),
      Some(json!({
        "title": "Investigation",
        "body": "Long read.",
        "second_review_required": true,
      })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let id = id_of(&draft);
    let (status, submitted) = send(
      state,
      "POST",
      &format!("/api/drafts/{id}/submit"),
      Some("ana"),
      Some(json!({ "expected_revision": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(submitted["status"], "needs_second_review");
  }

  #[tokio::test]
  async fn stale_revision_returns_412() {
    let state = make_state().await;
    let draft = create_draft(&state, "ana").await;
    let id    = id_of(&draft);

    let (status, body) = send(
      state,
      "POST",
      &format!("/api/drafts/{id}/submit"),
      Some("ana"),
      Some(json!({ "expected_revision": 99 })),
    )
    .await;
    assert_eq!(status, StatusCode::PRECONDITION_FAILED);
    assert!(body["error"].as_str().unwrap().contains("revision"));
  }

  #[tokio::test]
  async fn invalid_transition_returns_409() {
    let state = make_state().await;
    let draft = create_draft(&state, "ana").await;
    let id    = id_of(&draft);

    // Publish straight from `draft` is not a legal move.
    let (status, body) = send(
      state,
      "POST",
      &format!("/api/drafts/{id}/publish"),
      Some("ana"),
      Some(json!({ "expected_revision": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("publish"));
  }

  #[tokio::test]
  async fn schedule_in_the_past_is_rejected() {
    let state = make_state().await;
    let draft = create_draft(&state, "ana").await;
    let id    = id_of(&draft);

    send(
      state.clone(),
      "POST",
      &format!("/api/drafts/{id}/submit"),
      Some("ana"),
      Some(json!({ "expected_revision": 1 })),
    )
    .await;

    let (status, _) = send(
      state,
      "POST",
      &format!("/api/drafts/{id}/schedule"),
      Some("ana"),
      Some(json!({
        "expected_revision": 2,
        "scheduled_for": "2000-01-01T00:00:00Z",
      })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn non_owner_cannot_submit_or_delete() {
    let state = make_state().await;
    let draft = create_draft(&state, "ana").await;
    let id    = id_of(&draft);

    let (status, _) = send(
      state.clone(),
      "POST",
      &format!("/api/drafts/{id}/submit"),
      Some("bo"),
      Some(json!({ "expected_revision": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
      state.clone(),
      "DELETE",
      &format!("/api/drafts/{id}"),
      Some("bo"),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // An admin may do both.
    let (status, _) = send(
      state,
      "DELETE",
      &format!("/api/drafts/{id}"),
      Some("root"),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
  }

  #[tokio::test]
  async fn moderator_cannot_review_drafts() {
    let state = make_state().await;
    let draft = create_draft(&state, "ana").await;
    let id    = id_of(&draft);

    send(
      state.clone(),
      "POST",
      &format!("/api/drafts/{id}/submit"),
      Some("ana"),
      Some(json!({ "expected_revision": 1 })),
    )
    .await;

    let (status, _) = send(
      state,
      "POST",
      &format!("/api/drafts/{id}/request-changes"),
      Some("mo"),
      Some(json!({ "expected_revision": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
  }

  #[tokio::test]
  async fn published_content_edit_requires_admin() {
    let state = make_state().await;
    let draft = create_draft(&state, "ana").await;
    let id    = id_of(&draft);

    for (path, rev) in [("submit", 1), ("publish", 2)] {
      let (status, _) = send(
        state.clone(),
        "POST",
        &format!("/api/drafts/{id}/{path}"),
        Some("ana"),
        Some(json!({ "expected_revision": rev })),
      )
      .await;
      assert_eq!(status, StatusCode::OK);
    }

    // The owner may no longer edit.
    let (status, _) = send(
      state.clone(),
      "PATCH",
      &format!("/api/drafts/{id}"),
      Some("ana"),
      Some(json!({ "expected_revision": 3, "title": "Corrected" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, updated) = send(
      state,
      "PATCH",
      &format!("/api/drafts/{id}"),
      Some("root"),
      Some(json!({ "expected_revision": 3, "title": "Corrected" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "Corrected");
  }

  // ── Moderation queue ────────────────────────────────────────────────────────

  async fn create_event(state: &AppState<SqliteStore>, visibility: &str) -> Value {
    let (status, event) = send(
      state.clone(),
      "POST",
      "/api/events",
      Some("mo"),
      Some(json!({
        "kind": "report",
        "visibility": visibility,
        "text": "reader complaint, contact ana@example.com",
        "target_kind": "post",
        "target_id": uuid::Uuid::new_v4(),
      })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    event
  }

  #[tokio::test]
  async fn event_ingestion_redacts_and_hashes() {
    let state = make_state().await;
    let event = create_event(&state, "internal").await;

    assert_eq!(event["status"], "open");
    let text = event["redacted_text"].as_str().unwrap();
    assert!(!text.contains("ana@example.com"), "raw text leaked: {text}");
    assert_eq!(event["raw_hash"].as_str().unwrap().len(), 64);
  }

  #[tokio::test]
  async fn queue_shows_internal_events_only() {
    let state = make_state().await;
    create_event(&state, "internal").await;
    create_event(&state, "public").await;

    let (status, queue) =
      send(state, "GET", "/api/events", Some("mo"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(queue.as_array().unwrap().len(), 1);
    assert_eq!(queue[0]["visibility"], "internal");
  }

  #[tokio::test]
  async fn triage_assign_then_resolve() {
    let state = make_state().await;
    let event = create_event(&state, "internal").await;
    let id    = event["event_id"].as_str().unwrap().to_string();

    let (status, body) = send(
      state.clone(),
      "PATCH",
      &format!("/api/events/{id}"),
      Some("mo"),
      Some(json!({
        "action": "assign",
        "assignee": "mo",
        "expected_revision": 1,
      })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert_eq!(body["item"]["status"], "in_review");
    assert_eq!(body["item"]["assigned_to"], "mo");

    let (status, body) = send(
      state.clone(),
      "PATCH",
      &format!("/api/events/{id}"),
      Some("mo"),
      Some(json!({ "action": "resolve", "expected_revision": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["item"]["status"], "resolved");

    // Resolving twice is an invalid transition, not a silent no-op.
    let (status, _) = send(
      state,
      "PATCH",
      &format!("/api/events/{id}"),
      Some("mo"),
      Some(json!({ "action": "resolve", "expected_revision": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
  }

  #[tokio::test]
  async fn editor_cannot_triage_events() {
    let state = make_state().await;
    let event = create_event(&state, "internal").await;
    let id    = event["event_id"].as_str().unwrap().to_string();

    let (status, _) = send(
      state,
      "PATCH",
      &format!("/api/events/{id}"),
      Some("ana"),
      Some(json!({ "action": "resolve", "expected_revision": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
  }

  #[tokio::test]
  async fn public_events_cannot_be_triaged() {
    let state = make_state().await;
    let event = create_event(&state, "public").await;
    let id    = event["event_id"].as_str().unwrap().to_string();

    let (status, body) = send(
      state,
      "PATCH",
      &format!("/api/events/{id}"),
      Some("mo"),
      Some(json!({ "action": "resolve", "expected_revision": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("public"));
  }

  #[tokio::test]
  async fn unknown_triage_action_is_400() {
    let state = make_state().await;
    let event = create_event(&state, "internal").await;
    let id    = event["event_id"].as_str().unwrap().to_string();

    let (status, _) = send(
      state,
      "PATCH",
      &format!("/api/events/{id}"),
      Some("mo"),
      Some(json!({ "action": "escalate", "expected_revision": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  // ── Audit trail ─────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn audit_records_draft_transitions_in_order() {
    let state = make_state().await;
    let draft = create_draft(&state, "ana").await;
    let id    = id_of(&draft);

    for (path, rev) in [("submit", 1), ("publish", 2)] {
      send(
        state.clone(),
        "POST",
        &format!("/api/drafts/{id}/{path}"),
        Some("ana"),
        Some(json!({ "expected_revision": rev })),
      )
      .await;
    }

    let (status, records) = send(
      state,
      "GET",
      &format!("/api/audit?target_kind=draft&target_id={id}"),
      Some("root"),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let records = records.as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["action"], "submit");
    assert_eq!(records[0]["prev"]["status"], "draft");
    assert_eq!(records[0]["next"]["status"], "ready");
    assert_eq!(records[1]["action"], "publish");
    assert_eq!(records[1]["actor"], "ana");
  }

  // ── Misc ────────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn unknown_post_slug_is_404() {
    let state = make_state().await;
    let (status, body) =
      send(state, "GET", "/api/posts/no-such-slug", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
  }

  #[tokio::test]
  async fn missing_draft_is_404() {
    let state = make_state().await;
    let id    = uuid::Uuid::new_v4();
    let (status, _) = send(
      state,
      "GET",
      &format!("/api/drafts/{id}"),
      Some("ana"),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }
}
