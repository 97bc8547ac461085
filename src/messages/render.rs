//! Render state - data structure sent from App layer to UI for rendering

use crate::messages::ui_events::{InputMode, ViewKind};

/// One chapter row, already formatted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChapterLine {
    pub label: String,
    pub group: Option<String>,
    /// dd/mm/yyyy
    pub date: String,
    pub is_new: bool,
}

/// One manga card of the home grid
#[derive(Debug, Clone, Default)]
pub struct CardView {
    pub title: String,
    pub cover_url: String,
    pub chapters: Vec<ChapterLine>,
    pub has_new: bool,
}

#[derive(Debug, Clone, Default)]
pub struct HomeRender {
    pub source: String,
    pub filter: String,
    pub loading: bool,
    pub error: Option<String>,
    pub empty_message: String,
    pub cards: Vec<CardView>,
    pub selected: usize,
    /// 1-based
    pub page: usize,
    pub total_pages: usize,
    /// Page numbers shown in the paginator
    pub window: Vec<usize>,
    pub summary: String,
}

#[derive(Debug, Clone, Default)]
pub struct MangaRender {
    pub loading: bool,
    pub error: Option<String>,
    pub title: String,
    pub status: String,
    pub author: Option<String>,
    pub artist: Option<String>,
    pub genres: Vec<String>,
    pub themes: Vec<String>,
    pub description: String,
    pub cover_url: String,
    pub rating: String,
    pub follows: u64,
    pub comments: u64,
    pub chapters: Vec<ChapterLine>,
    /// Shown instead of the chapter list when it is empty
    pub empty_message: String,
    pub selected: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ReaderRender {
    pub loading: bool,
    pub error: Option<String>,
    pub manga_title: String,
    pub chapter_label: String,
    pub group: Option<String>,
    /// 1-based
    pub page: usize,
    pub total_pages: usize,
    pub url: Option<String>,
    /// HD or SD
    pub quality: String,
    pub data_saver: bool,
    pub page_state: PageCheck,
    pub page_input: String,
    pub can_prev: bool,
    pub can_next: bool,
    /// The previous/next step leaves the chapter
    pub prev_is_chapter: bool,
    pub next_is_chapter: bool,
}

/// Reachability of the page being shown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PageCheck {
    #[default]
    Unchecked,
    Checking,
    Ok,
    /// Only the data-saver copy answered
    FellBack,
    Unavailable,
}

impl PageCheck {
    pub fn label(&self) -> &'static str {
        match self {
            PageCheck::Unchecked => "",
            PageCheck::Checking => "checking...",
            PageCheck::Ok => "ok",
            PageCheck::FellBack => "ok (data-saver fallback)",
            PageCheck::Unavailable => "unavailable",
        }
    }
}

/// Complete state needed by the UI to render
#[derive(Debug, Clone, Default)]
pub struct RenderState {
    pub view: ViewKind,
    /// Current path, e.g. `/manga/abc`
    pub route: String,
    pub input_mode: InputMode,
    pub show_help: bool,
    pub status: Option<String>,

    pub home: HomeRender,
    pub manga: Option<MangaRender>,
    pub reader: Option<ReaderRender>,
}
