//! Network messages - communication between App and Network layers

use std::fmt;

use crate::error::ApiError;
use crate::models::MangaWithChapters;
use crate::network::feeds::{ChapterView, MangaDetails};

/// Which listing the home view shows
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum HomeSource {
    /// Recently updated manga with their latest chapters
    #[default]
    Latest,
    /// Newest chapter releases grouped by manga
    Timeline,
    Popular,
    /// Remote title search
    Search(String),
}

impl HomeSource {
    /// Cycles the browsable sources; a search goes back to `Latest`
    pub fn next(&self) -> HomeSource {
        match self {
            HomeSource::Latest => HomeSource::Timeline,
            HomeSource::Timeline => HomeSource::Popular,
            HomeSource::Popular | HomeSource::Search(_) => HomeSource::Latest,
        }
    }

    pub fn label(&self) -> String {
        match self {
            HomeSource::Latest => String::from("Latest updates"),
            HomeSource::Timeline => String::from("Release timeline"),
            HomeSource::Popular => String::from("Popular"),
            HomeSource::Search(title) => format!("Search: {}", title),
        }
    }
}

/// A failed job, collapsed to the message shown in the error panel
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchError {
    pub message: String,
    pub not_found: bool,
}

impl From<ApiError> for FetchError {
    fn from(e: ApiError) -> Self {
        FetchError {
            not_found: e.is_not_found(),
            message: e.to_string(),
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Commands sent from App layer to Network layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkCommand {
    /// Fetch a home listing
    LoadListing {
        id: u64,
        source: HomeSource,
        limit: u32,
    },
    /// Fetch manga metadata, chapter list and statistics
    LoadManga {
        id: u64,
        manga_id: String,
    },
    /// Fetch chapter detail, pages and neighbors
    LoadChapter {
        id: u64,
        chapter_id: String,
        manga_id: Option<String>,
    },
    /// Check that a page image is reachable
    ProbePage {
        id: u64,
        url: String,
    },
    /// Cancel a pending request
    Cancel(u64),
    /// Shutdown the network actor
    Shutdown,
}

/// Responses sent from Network layer to App layer
#[derive(Debug, Clone)]
pub enum NetworkResponse {
    Listing {
        id: u64,
        result: Result<Vec<MangaWithChapters>, FetchError>,
    },
    Manga {
        id: u64,
        result: Result<MangaDetails, FetchError>,
    },
    Chapter {
        id: u64,
        result: Result<ChapterView, FetchError>,
    },
    PageProbe {
        id: u64,
        ok: bool,
    },
    /// Request was cancelled
    Cancelled {
        id: u64,
    },
}

impl NetworkResponse {
    /// Get the request ID from the response
    pub fn id(&self) -> u64 {
        match self {
            NetworkResponse::Listing { id, .. } => *id,
            NetworkResponse::Manga { id, .. } => *id,
            NetworkResponse::Chapter { id, .. } => *id,
            NetworkResponse::PageProbe { id, .. } => *id,
            NetworkResponse::Cancelled { id } => *id,
        }
    }
}
