//! App state - pure data structure with no I/O logic

use std::collections::HashMap;

use chrono::Utc;

use crate::chapters::is_new_at;
use crate::config::Config;
use crate::constants::MAX_VISIBLE_PAGES;
use crate::messages::network::{FetchError, HomeSource};
use crate::messages::render::{
    CardView, ChapterLine, HomeRender, MangaRender, PageCheck, ReaderRender, RenderState,
};
use crate::messages::ui_events::{InputMode, ViewKind};
use crate::models::{relationship_name, Chapter, MangaWithChapters, Quality};
use crate::network::feeds::{ChapterView, MangaDetails};
use crate::pagination::Paginator;
use crate::reader::{PageTarget, ReaderState};
use crate::routes::Route;

/// `{data, loading, error}` of one view's request
#[derive(Clone, Debug, Default)]
pub enum Loadable<T> {
    #[default]
    Idle,
    Loading {
        request_id: u64,
    },
    Ready(T),
    Failed(FetchError),
}

impl<T> Loadable<T> {
    pub fn pending_id(&self) -> Option<u64> {
        match self {
            Loadable::Loading { request_id } => Some(*request_id),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Loadable::Loading { .. })
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Loadable::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&FetchError> {
        match self {
            Loadable::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// Home grid: one listing, filtered and paginated locally
#[derive(Clone, Debug, Default)]
pub struct HomeState {
    pub source: HomeSource,
    pub listing: Loadable<Vec<MangaWithChapters>>,
    /// Local title filter (the search box)
    pub filter: String,
    /// 1-based grid page
    pub page: usize,
    /// Selected card on the current page
    pub selected: usize,
}

impl HomeState {
    /// Listing entries whose display title contains the filter, ignoring case
    pub fn filtered(&self, language: &str) -> Vec<&MangaWithChapters> {
        let Some(listing) = self.listing.ready() else {
            return Vec::new();
        };
        let needle = self.filter.trim().to_lowercase();
        listing
            .iter()
            .filter(|entry| {
                needle.is_empty()
                    || entry
                        .manga
                        .display_title(language)
                        .to_lowercase()
                        .contains(&needle)
            })
            .collect()
    }
}

#[derive(Clone, Debug)]
pub struct MangaView {
    pub manga_id: String,
    pub details: Loadable<MangaDetails>,
    /// Selected chapter row
    pub selected: usize,
}

/// Reachability of a page image
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageStatus {
    Checking(Quality),
    Ok(Quality),
    Failed,
}

#[derive(Clone, Debug)]
pub struct ReaderView {
    pub manga_id: String,
    pub chapter_id: String,
    /// Page to select once the chapter has loaded
    pub target: PageTarget,
    pub chapter: Loadable<ChapterView>,
    pub reader: Option<ReaderState>,
    pub page_status: HashMap<usize, PageStatus>,
    /// Probe request id → (page index, quality probed)
    pub probes: HashMap<u64, (usize, Quality)>,
    /// Digits typed for a page jump
    pub page_input: String,
}

impl ReaderView {
    pub fn new(manga_id: String, chapter_id: String, target: PageTarget) -> Self {
        ReaderView {
            manga_id,
            chapter_id,
            target,
            chapter: Loadable::Idle,
            reader: None,
            page_status: HashMap::new(),
            probes: HashMap::new(),
            page_input: String::new(),
        }
    }
}

/// Main application state - pure data, no I/O
pub struct AppState {
    pub config: Config,

    // Routing
    pub route: Route,
    pub history: Vec<Route>,

    // Views
    pub home: HomeState,
    pub manga: Option<MangaView>,
    pub reader: Option<ReaderView>,

    // UI state
    pub input_mode: InputMode,
    pub show_help: bool,
    pub status: Option<String>,

    pub next_request_id: u64,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        AppState {
            config,
            route: Route::Home,
            history: Vec::new(),
            home: HomeState {
                page: 1,
                ..HomeState::default()
            },
            manga: None,
            reader: None,
            input_mode: InputMode::Normal,
            show_help: false,
            status: None,
            next_request_id: 1,
        }
    }

    /// Generate a unique request ID
    pub fn next_id(&mut self) -> u64 {
        let id = self.next_request_id;
        self.next_request_id += 1;
        id
    }

    pub fn view_kind(&self) -> ViewKind {
        match self.route {
            Route::Home => ViewKind::Home,
            Route::Manga { .. } => ViewKind::Manga,
            Route::Reader { .. } => ViewKind::Reader,
        }
    }

    pub fn home_paginator(&self) -> Paginator {
        let total = self.home.filtered(&self.config.language).len();
        Paginator::new(total, self.config.items_per_page)
    }

    /// Convert state to RenderState for UI
    pub fn to_render_state(&self) -> RenderState {
        RenderState {
            view: self.view_kind(),
            route: self.route.to_string(),
            input_mode: self.input_mode,
            show_help: self.show_help,
            status: self.status.clone(),
            home: self.render_home(),
            manga: self.manga.as_ref().map(|view| self.render_manga(view)),
            reader: self.reader.as_ref().map(|view| self.render_reader(view)),
        }
    }

    fn chapter_line(&self, chapter: &Chapter, now: chrono::DateTime<Utc>) -> ChapterLine {
        ChapterLine {
            label: chapter.label(),
            group: chapter.scanlation_group().map(str::to_string),
            date: chapter.publish_at().format("%d/%m/%Y").to_string(),
            is_new: is_new_at(chapter.publish_at(), now),
        }
    }

    fn render_home(&self) -> HomeRender {
        let language = &self.config.language;
        let now = Utc::now();
        let filtered = self.home.filtered(language);
        let pager = Paginator::new(filtered.len(), self.config.items_per_page);
        let page = pager.clamp(self.home.page);

        let cards: Vec<CardView> = pager
            .slice(&filtered, page)
            .iter()
            .map(|entry| {
                let chapters: Vec<ChapterLine> = entry
                    .chapters
                    .iter()
                    .map(|ch| self.chapter_line(ch, now))
                    .collect();
                CardView {
                    title: entry.manga.display_title(language).to_string(),
                    cover_url: entry.manga.cover_url(&self.config.cover_base_url),
                    has_new: chapters.iter().any(|c| c.is_new),
                    chapters,
                }
            })
            .collect();

        let summary = if !self.home.filter.trim().is_empty() {
            format!("{} result(s) for \"{}\"", filtered.len(), self.home.filter.trim())
        } else if pager.total_pages() > 1 {
            format!(
                "Showing {} of {} manga - page {} of {}",
                cards.len(),
                filtered.len(),
                page,
                pager.total_pages()
            )
        } else {
            format!("Showing {} of {} manga", cards.len(), filtered.len())
        };

        HomeRender {
            source: self.home.source.label(),
            filter: self.home.filter.clone(),
            loading: self.home.listing.is_loading(),
            error: self.home.listing.error().map(|e| e.message.clone()),
            empty_message: if self.home.filter.trim().is_empty() {
                String::from("No manga available")
            } else {
                String::from("No manga found")
            },
            selected: self.home.selected.min(cards.len().saturating_sub(1)),
            cards,
            page,
            total_pages: pager.total_pages(),
            window: pager.window(page, MAX_VISIBLE_PAGES),
            summary,
        }
    }

    fn render_manga(&self, view: &MangaView) -> MangaRender {
        let language = &self.config.language;
        let now = Utc::now();
        let mut render = MangaRender {
            loading: view.details.is_loading(),
            error: view.details.error().map(|e| e.message.clone()),
            empty_message: format!("No chapters available in {}", language),
            ..MangaRender::default()
        };

        if let Some(details) = view.details.ready() {
            let manga = &details.manga;
            render.title = manga.display_title(language).to_string();
            render.status = manga.attributes.status.label().to_string();
            render.author = manga.author().and_then(relationship_name).map(str::to_string);
            render.artist = manga.artist().and_then(relationship_name).map(str::to_string);
            render.genres = manga.genres().iter().map(|t| t.name().to_string()).collect();
            render.themes = manga.themes().iter().map(|t| t.name().to_string()).collect();
            render.description = manga.display_description(language);
            render.cover_url = manga.cover_url(&self.config.cover_base_url);
            let stats = details.statistics.clone().unwrap_or_default();
            render.rating = stats.rating_label();
            render.follows = stats.follows();
            render.comments = stats.comment_count();
            render.chapters = details
                .chapters
                .iter()
                .map(|ch| self.chapter_line(ch, now))
                .collect();
            render.selected = view.selected.min(render.chapters.len().saturating_sub(1));
        }

        render
    }

    fn render_reader(&self, view: &ReaderView) -> ReaderRender {
        let mut render = ReaderRender {
            loading: view.chapter.is_loading(),
            error: view.chapter.error().map(|e| e.message.clone()),
            page_input: view.page_input.clone(),
            ..ReaderRender::default()
        };

        if let (Some(loaded), Some(reader)) = (view.chapter.ready(), view.reader.as_ref()) {
            let index = reader.current_page();
            render.manga_title = loaded
                .chapter
                .manga_title()
                .unwrap_or("Manga")
                .to_string();
            render.chapter_label = loaded.chapter.label();
            render.group = loaded.chapter.scanlation_group().map(str::to_string);
            render.page = index + 1;
            render.total_pages = reader.len();
            render.url = reader.current_url();
            render.quality = reader.quality_for(index).to_string();
            render.data_saver = reader.data_saver();
            render.can_prev = reader.can_go_prev();
            render.can_next = reader.can_go_next();
            render.prev_is_chapter = index == 0 && reader.adjacent.prev.is_some();
            render.next_is_chapter = reader.is_last_page() && reader.adjacent.next.is_some();
            render.page_state = match view.page_status.get(&index) {
                Some(PageStatus::Checking(_)) => PageCheck::Checking,
                Some(PageStatus::Ok(_)) if reader.has_fallen_back(index) => PageCheck::FellBack,
                Some(PageStatus::Ok(_)) => PageCheck::Ok,
                Some(PageStatus::Failed) => PageCheck::Unavailable,
                None => PageCheck::Unchecked,
            };
        }

        render
    }
}
