//! Core types, transition planners, and trait definitions for the Newsdesk
//! editorial workflow.
//!
//! This crate carries no HTTP or database dependencies. The API and store
//! crates both depend on it, never on each other.

// Storage backends implement `NewsStore` with native `async fn` (stabilised
// in Rust 1.75); suppress the advisory lint about `Send` bounds.
#![allow(async_fn_in_trait)]

pub mod audit;
pub mod draft;
pub mod error;
pub mod event;
pub mod notify;
pub mod policy;
pub mod post;
pub mod store;
pub mod workflow;

pub use error::{Error, Result};
