//! HTTP Basic-auth extractor resolving callers to roles.
//!
//! The policy layer in `newsdesk-core` only consumes a resolved
//! [`Caller`]; this module is where identities are actually verified,
//! against argon2 PHC hashes from the server config.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, request::Parts};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use newsdesk_core::{
  policy::{Caller, Role},
  store::NewsStore,
};

use crate::{AppState, error::ApiError};

/// One account the server accepts.
#[derive(Clone)]
pub struct UserAccount {
  pub username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
  pub role:          Role,
}

/// The accounts accepted as valid for this server instance.
#[derive(Clone)]
pub struct AuthConfig {
  pub users: Vec<UserAccount>,
}

/// Extractor: present in a handler means the request carried valid
/// credentials; wraps the resolved caller.
pub struct Authed(pub Caller);

/// Verify credentials directly from headers and resolve the caller.
pub fn verify_auth(headers: &HeaderMap, config: &AuthConfig) -> Result<Caller, ApiError> {
  let header_val = headers
    .get(axum::http::header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(ApiError::Unauthorized)?;

  let encoded = header_val
    .strip_prefix("Basic ")
    .ok_or(ApiError::Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| ApiError::Unauthorized)?;
  let creds   = std::str::from_utf8(&decoded).map_err(|_| ApiError::Unauthorized)?;

  let (username, password) = creds.split_once(':').ok_or(ApiError::Unauthorized)?;

  let account = config
    .users
    .iter()
    .find(|u| u.username == username)
    .ok_or(ApiError::Unauthorized)?;

  let parsed_hash =
    PasswordHash::new(&account.password_hash).map_err(|_| ApiError::Unauthorized)?;

  Argon2::default()
    .verify_password(password.as_bytes(), &parsed_hash)
    .map_err(|_| ApiError::Unauthorized)?;

  Ok(Caller {
    id:   account.username.clone(),
    role: account.role,
  })
}

impl<S> FromRequestParts<AppState<S>> for Authed
where
  S: NewsStore + Clone + Send + Sync + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let caller = verify_auth(&parts.headers, &state.auth)?;
    Ok(Authed(caller))
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
  use axum::http::header;
  use rand_core::OsRng;

  use super::*;

  fn hash(password: &str) -> String {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .unwrap()
      .to_string()
  }

  fn config() -> AuthConfig {
    AuthConfig {
      users: vec![
        UserAccount {
          username:      "ed".into(),
          password_hash: hash("editor-pass"),
          role:          Role::Editor,
        },
        UserAccount {
          username:      "mo".into(),
          password_hash: hash("mod-pass"),
          role:          Role::Moderator,
        },
      ],
    }
  }

  fn headers_with(user: &str, pass: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    let encoded = B64.encode(format!("{user}:{pass}"));
    headers.insert(
      header::AUTHORIZATION,
      format!("Basic {encoded}").parse().unwrap(),
    );
    headers
  }

  // Arc only to mirror how the config is held in AppState.
  #[test]
  fn correct_credentials_resolve_role() {
    let cfg = Arc::new(config());
    let caller = verify_auth(&headers_with("ed", "editor-pass"), &cfg).unwrap();
    assert_eq!(caller.id, "ed");
    assert_eq!(caller.role, Role::Editor);

    let caller = verify_auth(&headers_with("mo", "mod-pass"), &cfg).unwrap();
    assert_eq!(caller.role, Role::Moderator);
  }

  #[test]
  fn wrong_password_is_unauthorized() {
    let cfg = config();
    let err = verify_auth(&headers_with("ed", "wrong"), &cfg).unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized));
  }

  #[test]
  fn unknown_user_is_unauthorized() {
    let cfg = config();
    let err = verify_auth(&headers_with("nobody", "x"), &cfg).unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized));
  }

  #[test]
  fn missing_header_is_unauthorized() {
    let cfg = config();
    let err = verify_auth(&HeaderMap::new(), &cfg).unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized));
  }

  #[test]
  fn invalid_base64_is_unauthorized() {
    let cfg = config();
    let mut headers = HeaderMap::new();
    headers.insert(
      header::AUTHORIZATION,
      "Basic !!!not-base64!!!".parse().unwrap(),
    );
    let err = verify_auth(&headers, &cfg).unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized));
  }
}
