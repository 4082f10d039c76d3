//! Handlers for `/api/posts` — the public read surface.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET` | `/api/posts` | Newest first, no auth |
//! | `GET` | `/api/posts/:slug` | 404 for unknown slugs, no auth |
//!
//! Posts are immutable snapshots; there is no write surface here. Publishing
//! happens through the draft workflow.

use axum::{
  Json,
  extract::{Path, State},
};
use newsdesk_core::{post::Post, store::NewsStore};

use crate::{AppState, error::ApiError};

/// `GET /api/posts`
pub async fn list<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<Post>>, ApiError>
where
  S: NewsStore + Clone + Send + Sync + 'static,
{
  let posts = state
    .store
    .list_posts()
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(posts))
}

/// `GET /api/posts/:slug`
pub async fn get_by_slug<S>(
  State(state): State<AppState<S>>,
  Path(slug): Path<String>,
) -> Result<Json<Post>, ApiError>
where
  S: NewsStore + Clone + Send + Sync + 'static,
{
  state
    .store
    .get_post_by_slug(&slug)
    .await
    .map_err(ApiError::from_store)?
    .map(Json)
    .ok_or_else(|| ApiError::NotFound(format!("no post with slug {slug:?}")))
}
