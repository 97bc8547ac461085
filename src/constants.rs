//! Application constants
//!
//! Centralized location for API endpoints, query limits and UI defaults.

/// Base URL of the catalog API
pub const DEFAULT_API_URL: &str = "https://api.mangadex.org";

/// Base URL for cover images (`{base}/{manga_id}/{file_name}`)
pub const DEFAULT_COVER_URL: &str = "https://uploads.mangadex.org/covers";

/// Cover file name used when a manga has no cover_art relationship
pub const FALLBACK_COVER_FILE: &str = "cover.jpg";

/// Translation language used when none is configured
pub const DEFAULT_LANGUAGE: &str = "pt-br";

/// Content ratings requested by listing endpoints
pub const DEFAULT_CONTENT_RATINGS: [&str; 3] = ["safe", "suggestive", "erotica"];

/// Maximum chapters pulled from a manga feed in one request
pub const FEED_LIMIT: u32 = 500;

/// Chapters shown under each manga card
pub const PREVIEW_CHAPTERS: u32 = 3;

/// Cap of chapters kept per manga in the recent timeline
pub const TIMELINE_CHAPTERS_PER_MANGA: usize = 5;

/// Recent chapters scanned to build the timeline
pub const TIMELINE_SCAN_LIMIT: u32 = 100;

/// Manga fetched for the home grid
pub const HOME_LIMIT: u32 = 100;

/// Largest `limit` the catalog accepts on `/manga`
pub const MANGA_PAGE_MAX: u32 = 100;

/// Manga fetched for a remote title search
pub const SEARCH_LIMIT: u32 = 25;

/// Cards per page on the home grid
pub const ITEMS_PER_PAGE: usize = 24;

/// Page numbers shown at once in the home paginator
pub const MAX_VISIBLE_PAGES: usize = 5;

/// A chapter is "new" within this many days of its publish date
pub const NEW_CHAPTER_DAYS: i64 = 7;

/// Upper bound on concurrent per-item requests during a fan-out
pub const DEFAULT_MAX_CONCURRENCY: usize = 5;

/// HTTP timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Application name
pub const APP_NAME: &str = "Shiori";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// User agent sent with every API request
pub const USER_AGENT: &str = concat!("shiori-tui/", env!("CARGO_PKG_VERSION"));
