//! # png-comment
//!
//! Embed a JSON comment into the textual metadata of a PNG image, either as a library call
//! or through a small HTTP service that takes and returns base64-encoded images.
//!
//! ## Quick Start
//!
//! The core operation is [`metadata::rewrite`]: base64 PNG in, base64 PNG out, with the
//! comment stored as a `tEXt` chunk under the keyword `UserComment`.
//!
//! ```rust,no_run
//! use png_comment::metadata::{read_user_comment, rewrite};
//! use serde_json::json;
//!
//! fn main() -> anyhow::Result<()> {
//!     let image_b64 = std::fs::read_to_string("image.b64")?;
//!
//!     let updated = rewrite(&image_b64, &json!({"author": "alice", "tags": [1, 2, 3]}))?;
//!
//!     let bytes = base64::Engine::decode(
//!         &base64::engine::general_purpose::STANDARD, &updated,
//!     )?;
//!     // Some("{\"author\": \"alice\", \"tags\": [1, 2, 3]}")
//!     println!("{:?}", read_user_comment(&bytes)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Running the Service
//!
//! ```rust,no_run
//! use png_comment::{api, config::Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut config = Config::load(None)?;
//!     config.apply_env_overrides()?;
//!     api::serve(&config).await
//! }
//! ```
//!
//! ## Endpoints
//!
//! | Method | Path | Body | Response |
//! |--------|------|------|----------|
//! | `GET` | `/api/images/healthchecker` | — | `{"status": "success", "message": ...}` |
//! | `POST` | `/api/images/update_metadata` | `{"image_b64": ..., "user_comment": {...}}` | `{"updated_image": ...}` |
//!
//! Failures return `{"detail": ...}` with 400 (undecodable input), 415 (not a PNG) or
//! 422 (malformed request or comment).
//!
//! ## Modules
//!
//! - [`api`] — Router, handlers, error responses and server startup
//! - [`config`] — Configuration types and loading/saving
//! - [`metadata`] — PNG text chunk reading and writing

pub mod api;
pub mod config;
pub mod metadata;
