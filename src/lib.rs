//! # Shiori TUI
//!
//! A terminal manga reader for the MangaDex catalog.
//!
//! ## Features
//! - Home listings: latest updates, release timeline, popular titles, catalog search
//! - Local title filter with client-side pagination
//! - Manga details with a deduplicated chapter list and statistics
//! - Chapter reader with adjacent-chapter navigation and data-saver fallback
//!
//! ## Architecture
//! Actor-based with channels:
//! - UI Layer (Ratatui) - synchronous
//! - App Layer (State machine)
//! - Network Layer (Tokio runtime)

pub mod constants;
pub mod config;
pub mod error;
pub mod models;
pub mod chapters;
pub mod pagination;
pub mod reader;
pub mod routes;
pub mod ui;
pub mod messages;
pub mod app;
pub mod network;

// Re-export commonly used types
pub use models::{Chapter, Manga, MangaWithChapters, PageSet};
pub use error::{ApiError, ApiResult};
pub use routes::Route;
pub use messages::{UiEvent, NetworkCommand, NetworkResponse, RenderState};
pub use app::{AppState, AppActor};
pub use network::{MangaClient, NetworkActor};
