//! Shared test utilities for the github-mcp workspace.
//!
//! This crate is a dev-dependency only and is never published.
//!
//! # Modules
//!
//! - [`recording`]: [`RecordingApi`], an in-memory [`github_api::GitHubApi`]
//!   that records every call and replays a canned reply

pub mod recording;

pub use recording::{RecordedCall, RecordingApi};
