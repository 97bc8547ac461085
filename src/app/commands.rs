//! Command handlers - business logic for processing UI events and network responses
//!
//! Every handler that may need the network returns the commands to send.

use crate::app::state::{Loadable, MangaView, PageStatus, ReaderView};
use crate::app::AppState;
use crate::messages::network::HomeSource;
use crate::messages::ui_events::InputMode;
use crate::messages::{NetworkCommand, NetworkResponse};
use crate::models::Quality;
use crate::reader::{PageTarget, ReaderState, ReaderStep};
use crate::routes::Route;

/// Digits kept for a page jump
const MAX_PAGE_INPUT: usize = 4;

impl AppState {
    // ========================
    // Routing
    // ========================

    /// Opens the initial route
    pub fn start(&mut self, route: Route) -> Vec<NetworkCommand> {
        self.route = Route::Home;
        let mut commands = Vec::new();
        if route != Route::Home {
            // `enter` only loads the home listing when arriving on it
            commands.extend(self.enter(route, PageTarget::First));
        } else {
            commands.extend(self.load_home());
        }
        commands
    }

    /// Goes to `route`, remembering the current one for `back`
    pub fn navigate(&mut self, route: Route) -> Vec<NetworkCommand> {
        if route == self.route {
            return Vec::new();
        }
        self.history.push(self.route.clone());
        self.enter(route, PageTarget::First)
    }

    /// Returns to the previous route, or to the parent of the current one
    pub fn back(&mut self) -> Vec<NetworkCommand> {
        let target = self.history.pop().or_else(|| match &self.route {
            Route::Home => None,
            Route::Manga { .. } => Some(Route::Home),
            Route::Reader { manga_id, .. } => Some(Route::Manga {
                id: manga_id.clone(),
            }),
        });
        match target {
            Some(route) => self.enter(route, PageTarget::First),
            None => Vec::new(),
        }
    }

    /// Re-issues the current view's request
    pub fn reload(&mut self) -> Vec<NetworkCommand> {
        self.status = Some(String::from("Reloading..."));
        match self.route {
            Route::Home => self.load_home(),
            Route::Manga { .. } => self.load_manga(),
            Route::Reader { .. } => {
                if let Some(view) = self.reader.as_mut() {
                    if let Some(reader) = &view.reader {
                        view.target = PageTarget::Index(reader.current_page());
                    }
                }
                self.load_chapter()
            }
        }
    }

    /// Switches views without touching history
    fn enter(&mut self, route: Route, target: PageTarget) -> Vec<NetworkCommand> {
        let mut commands = self.leave_current_view();
        self.route = route.clone();
        self.input_mode = InputMode::Normal;

        match route {
            Route::Home => {
                if matches!(self.home.listing, Loadable::Idle) {
                    commands.extend(self.load_home());
                }
            }
            Route::Manga { id } => {
                let cached = self
                    .manga
                    .as_ref()
                    .is_some_and(|view| view.manga_id == id && view.details.ready().is_some());
                if !cached {
                    self.manga = Some(MangaView {
                        manga_id: id,
                        details: Loadable::Idle,
                        selected: 0,
                    });
                    commands.extend(self.load_manga());
                }
            }
            Route::Reader {
                manga_id,
                chapter_id,
            } => {
                self.reader = Some(ReaderView::new(manga_id, chapter_id, target));
                commands.extend(self.load_chapter());
            }
        }

        commands
    }

    /// Cancels whatever the view being left is still waiting for
    fn leave_current_view(&mut self) -> Vec<NetworkCommand> {
        let mut commands = Vec::new();
        match self.route {
            Route::Home => {
                if let Some(id) = self.home.listing.pending_id() {
                    commands.push(NetworkCommand::Cancel(id));
                    self.home.listing = Loadable::Idle;
                }
            }
            Route::Manga { .. } => {
                if let Some(view) = self.manga.as_mut() {
                    if let Some(id) = view.details.pending_id() {
                        commands.push(NetworkCommand::Cancel(id));
                        view.details = Loadable::Idle;
                    }
                }
            }
            Route::Reader { .. } => {
                if let Some(view) = self.reader.take() {
                    if let Some(id) = view.chapter.pending_id() {
                        commands.push(NetworkCommand::Cancel(id));
                    }
                    commands.extend(view.probes.keys().map(|id| NetworkCommand::Cancel(*id)));
                }
            }
        }
        if !commands.is_empty() {
            tracing::debug!(count = commands.len(), route = %self.route, "Cancelling requests of view");
        }
        commands
    }

    // ========================
    // Loading
    // ========================

    fn load_home(&mut self) -> Vec<NetworkCommand> {
        let mut commands = Vec::new();
        if let Some(old) = self.home.listing.pending_id() {
            commands.push(NetworkCommand::Cancel(old));
        }
        let id = self.next_id();
        self.home.listing = Loadable::Loading { request_id: id };
        commands.push(NetworkCommand::LoadListing {
            id,
            source: self.home.source.clone(),
            limit: self.config.home_limit,
        });
        commands
    }

    fn load_manga(&mut self) -> Vec<NetworkCommand> {
        let id = self.next_id();
        let Some(view) = self.manga.as_mut() else {
            return Vec::new();
        };
        let mut commands = Vec::new();
        if let Some(old) = view.details.pending_id() {
            commands.push(NetworkCommand::Cancel(old));
        }
        view.details = Loadable::Loading { request_id: id };
        commands.push(NetworkCommand::LoadManga {
            id,
            manga_id: view.manga_id.clone(),
        });
        commands
    }

    fn load_chapter(&mut self) -> Vec<NetworkCommand> {
        let id = self.next_id();
        let Some(view) = self.reader.as_mut() else {
            return Vec::new();
        };
        let mut commands: Vec<NetworkCommand> = view
            .probes
            .drain()
            .map(|(probe, _)| NetworkCommand::Cancel(probe))
            .collect();
        if let Some(old) = view.chapter.pending_id() {
            commands.push(NetworkCommand::Cancel(old));
        }
        view.chapter = Loadable::Loading { request_id: id };
        view.reader = None;
        view.page_status.clear();
        commands.push(NetworkCommand::LoadChapter {
            id,
            chapter_id: view.chapter_id.clone(),
            manga_id: Some(view.manga_id.clone()),
        });
        commands
    }

    // ========================
    // Home
    // ========================

    fn cards_on_page(&self) -> usize {
        let pager = self.home_paginator();
        pager.range(self.home.page).len()
    }

    pub fn home_up(&mut self) {
        self.home.selected = self.home.selected.saturating_sub(1);
    }

    pub fn home_down(&mut self) {
        if self.home.selected + 1 < self.cards_on_page() {
            self.home.selected += 1;
        }
    }

    pub fn home_prev_page(&mut self) {
        let pager = self.home_paginator();
        let page = pager.clamp(self.home.page);
        if pager.has_prev(page) {
            self.home.page = page - 1;
            self.home.selected = 0;
        }
    }

    pub fn home_next_page(&mut self) {
        let pager = self.home_paginator();
        let page = pager.clamp(self.home.page);
        if pager.has_next(page) {
            self.home.page = page + 1;
            self.home.selected = 0;
        }
    }

    /// Opens the selected card's manga
    pub fn home_select(&mut self) -> Vec<NetworkCommand> {
        let pager = self.home_paginator();
        let range = pager.range(self.home.page);
        let id = self
            .home
            .filtered(&self.config.language)
            .get(range.start + self.home.selected)
            .filter(|_| self.home.selected < range.len())
            .map(|entry| entry.manga.id.clone());
        match id {
            Some(id) => self.navigate(Route::Manga { id }),
            None => Vec::new(),
        }
    }

    pub fn start_search(&mut self) {
        self.input_mode = InputMode::Editing;
    }

    pub fn stop_search(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    /// The filter narrows the loaded listing; typing returns to the first page.
    pub fn search_char(&mut self, c: char) {
        self.home.filter.push(c);
        self.home.page = 1;
        self.home.selected = 0;
    }

    pub fn search_backspace(&mut self) {
        self.home.filter.pop();
        self.home.page = 1;
        self.home.selected = 0;
    }

    /// Runs the typed title as a remote search. An empty box leaves search mode.
    pub fn submit_search(&mut self) -> Vec<NetworkCommand> {
        self.input_mode = InputMode::Normal;
        let title = self.home.filter.trim().to_string();
        if title.is_empty() {
            if matches!(self.home.source, HomeSource::Search(_)) {
                return self.set_source(HomeSource::Latest);
            }
            return Vec::new();
        }
        self.set_source(HomeSource::Search(title))
    }

    pub fn cycle_source(&mut self) -> Vec<NetworkCommand> {
        let next = self.home.source.next();
        self.set_source(next)
    }

    fn set_source(&mut self, source: HomeSource) -> Vec<NetworkCommand> {
        self.home.source = source;
        self.home.filter.clear();
        self.home.page = 1;
        self.home.selected = 0;
        self.load_home()
    }

    // ========================
    // Manga
    // ========================

    fn chapter_count(&self) -> usize {
        self.manga
            .as_ref()
            .and_then(|view| view.details.ready())
            .map(|details| details.chapters.len())
            .unwrap_or(0)
    }

    pub fn manga_up(&mut self) {
        if let Some(view) = self.manga.as_mut() {
            view.selected = view.selected.saturating_sub(1);
        }
    }

    pub fn manga_down(&mut self) {
        let count = self.chapter_count();
        if let Some(view) = self.manga.as_mut() {
            if view.selected + 1 < count {
                view.selected += 1;
            }
        }
    }

    pub fn manga_first(&mut self) {
        if let Some(view) = self.manga.as_mut() {
            view.selected = 0;
        }
    }

    pub fn manga_last(&mut self) {
        let count = self.chapter_count();
        if let Some(view) = self.manga.as_mut() {
            view.selected = count.saturating_sub(1);
        }
    }

    /// Opens the selected chapter in the reader
    pub fn manga_select(&mut self) -> Vec<NetworkCommand> {
        let route = self.manga.as_ref().and_then(|view| {
            let details = view.details.ready()?;
            let chapter = details.chapters.get(view.selected)?;
            Some(Route::Reader {
                manga_id: view.manga_id.clone(),
                chapter_id: chapter.id.clone(),
            })
        });
        match route {
            Some(route) => self.navigate(route),
            None => Vec::new(),
        }
    }

    // ========================
    // Reader
    // ========================

    pub fn reader_next(&mut self) -> Vec<NetworkCommand> {
        let step = match self.reader.as_mut().and_then(|view| view.reader.as_mut()) {
            Some(reader) => reader.next_page(),
            None => return Vec::new(),
        };
        self.apply_step(step, "Last page of the last chapter")
    }

    pub fn reader_prev(&mut self) -> Vec<NetworkCommand> {
        let step = match self.reader.as_mut().and_then(|view| view.reader.as_mut()) {
            Some(reader) => reader.prev_page(),
            None => return Vec::new(),
        };
        self.apply_step(step, "First page of the first chapter")
    }

    /// An adjacent chapter replaces the current route; the page target is
    /// applied once its pages arrive.
    fn apply_step(&mut self, step: ReaderStep, edge_message: &str) -> Vec<NetworkCommand> {
        match step {
            ReaderStep::Page(_) => self.probe_current().into_iter().collect(),
            ReaderStep::Chapter { chapter_id, target } => {
                let Some(manga_id) = self.reader.as_ref().map(|view| view.manga_id.clone()) else {
                    return Vec::new();
                };
                tracing::info!(%chapter_id, ?target, "Moving to adjacent chapter");
                self.enter(
                    Route::Reader {
                        manga_id,
                        chapter_id,
                    },
                    target,
                )
            }
            ReaderStep::Stay => {
                self.status = Some(edge_message.to_string());
                Vec::new()
            }
        }
    }

    pub fn reader_first(&mut self) -> Vec<NetworkCommand> {
        if let Some(reader) = self.reader.as_mut().and_then(|view| view.reader.as_mut()) {
            reader.first_page();
        }
        self.probe_current().into_iter().collect()
    }

    pub fn reader_last(&mut self) -> Vec<NetworkCommand> {
        if let Some(reader) = self.reader.as_mut().and_then(|view| view.reader.as_mut()) {
            reader.last_page();
        }
        self.probe_current().into_iter().collect()
    }

    pub fn page_digit(&mut self, digit: char) {
        if let Some(view) = self.reader.as_mut() {
            if view.page_input.len() < MAX_PAGE_INPUT {
                view.page_input.push(digit);
            }
        }
    }

    /// Jumps to the typed 1-based page number
    pub fn confirm_page_jump(&mut self) -> Vec<NetworkCommand> {
        let Some(view) = self.reader.as_mut() else {
            return Vec::new();
        };
        let input = std::mem::take(&mut view.page_input);
        let Some(reader) = view.reader.as_mut() else {
            return Vec::new();
        };
        match input.parse::<usize>() {
            Ok(page) if page >= 1 => reader.go_to(page - 1),
            _ => return Vec::new(),
        }
        self.probe_current().into_iter().collect()
    }

    /// Flips image quality for this and later chapters and re-checks the page.
    pub fn toggle_data_saver(&mut self) -> Vec<NetworkCommand> {
        self.config.data_saver = !self.config.data_saver;
        let mut commands = Vec::new();
        if let Some(view) = self.reader.as_mut() {
            if let Some(reader) = view.reader.as_mut() {
                reader.toggle_data_saver();
            }
            commands.extend(view.probes.drain().map(|(id, _)| NetworkCommand::Cancel(id)));
            view.page_status.clear();
        }
        self.status = Some(format!(
            "Data saver {}",
            if self.config.data_saver { "on" } else { "off" }
        ));
        commands.extend(self.probe_current());
        commands
    }

    /// Checks the current page image unless it has been checked already
    fn probe_current(&mut self) -> Option<NetworkCommand> {
        let view = self.reader.as_ref()?;
        let reader = view.reader.as_ref()?;
        let index = reader.current_page();
        if view.page_status.contains_key(&index) {
            return None;
        }
        let url = reader.current_url()?;
        let quality = reader.quality_for(index);

        let id = self.next_id();
        let view = self.reader.as_mut()?;
        view.probes.insert(id, (index, quality));
        view.page_status.insert(index, PageStatus::Checking(quality));
        Some(NetworkCommand::ProbePage { id, url })
    }

    fn on_page_probe(&mut self, id: u64, ok: bool) -> Vec<NetworkCommand> {
        let Some(view) = self.reader.as_mut() else {
            return Vec::new();
        };
        let Some((index, quality)) = view.probes.remove(&id) else {
            return Vec::new();
        };
        if ok {
            view.page_status.insert(index, PageStatus::Ok(quality));
            return Vec::new();
        }

        let fallback = match (quality, view.reader.as_mut()) {
            (Quality::Data, Some(reader)) => reader.on_image_error(index),
            _ => None,
        };
        let Some(url) = fallback else {
            view.page_status.insert(index, PageStatus::Failed);
            return Vec::new();
        };

        tracing::info!(page = index, "Full-resolution page failed, trying data-saver");
        let probe_id = self.next_id();
        if let Some(view) = self.reader.as_mut() {
            view.probes.insert(probe_id, (index, Quality::DataSaver));
            view.page_status
                .insert(index, PageStatus::Checking(Quality::DataSaver));
        }
        vec![NetworkCommand::ProbePage { id: probe_id, url }]
    }

    // ========================
    // Popups
    // ========================

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn close_help(&mut self) {
        self.show_help = false;
    }

    // ========================
    // Response handling
    // ========================

    /// Applies a response if it belongs to a pending request; stale ids are ignored.
    pub fn handle_response(&mut self, response: NetworkResponse) -> Vec<NetworkCommand> {
        let response_id = response.id();

        match response {
            NetworkResponse::Listing { id, result } => {
                if self.home.listing.pending_id() != Some(id) {
                    tracing::debug!(id, "Ignoring stale listing");
                    return Vec::new();
                }
                self.home.listing = match result {
                    Ok(listing) => Loadable::Ready(listing),
                    Err(e) => Loadable::Failed(e),
                };
                self.home.page = 1;
                self.home.selected = 0;
                self.status = None;
                Vec::new()
            }
            NetworkResponse::Manga { id, result } => {
                let Some(view) = self.manga.as_mut() else {
                    return Vec::new();
                };
                if view.details.pending_id() != Some(id) {
                    tracing::debug!(id, "Ignoring stale manga details");
                    return Vec::new();
                }
                view.details = match result {
                    Ok(details) => Loadable::Ready(details),
                    Err(e) => Loadable::Failed(e),
                };
                view.selected = 0;
                self.status = None;
                Vec::new()
            }
            NetworkResponse::Chapter { id, result } => {
                let data_saver = self.config.data_saver;
                let Some(view) = self.reader.as_mut() else {
                    return Vec::new();
                };
                if view.chapter.pending_id() != Some(id) {
                    tracing::debug!(id, "Ignoring stale chapter");
                    return Vec::new();
                }
                match result {
                    Ok(loaded) => {
                        view.reader = Some(ReaderState::new(
                            loaded.chapter.id.clone(),
                            loaded.pages.clone(),
                            loaded.adjacent.clone(),
                            view.target,
                            data_saver,
                        ));
                        view.chapter = Loadable::Ready(loaded);
                    }
                    Err(e) => view.chapter = Loadable::Failed(e),
                }
                self.status = None;
                self.probe_current().into_iter().collect()
            }
            NetworkResponse::PageProbe { id, ok } => self.on_page_probe(id, ok),
            NetworkResponse::Cancelled { .. } => {
                tracing::debug!(id = response_id, "Request cancelled");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chapters::tests::chapter;
    use crate::chapters::AdjacentChapters;
    use crate::config::Config;
    use crate::messages::network::FetchError;
    use crate::messages::render::PageCheck;
    use crate::models::{ChapterPages, Manga, MangaWithChapters, PageSet};
    use crate::network::feeds::{ChapterView, MangaDetails};

    fn manga(id: &str, title: &str) -> Manga {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "attributes": { "title": { "en": title } },
            "relationships": []
        }))
        .unwrap()
    }

    fn pages(n: usize) -> PageSet {
        PageSet {
            base_url: String::from("https://cdn.test"),
            chapter: ChapterPages {
                hash: String::from("h"),
                data: (0..n).map(|i| format!("{}.png", i)).collect(),
                data_saver: (0..n).map(|i| format!("{}.jpg", i)).collect(),
            },
        }
    }

    fn listing_id(commands: &[NetworkCommand]) -> u64 {
        commands
            .iter()
            .find_map(|cmd| match cmd {
                NetworkCommand::LoadListing { id, .. } => Some(*id),
                _ => None,
            })
            .expect("listing command")
    }

    fn chapter_id(commands: &[NetworkCommand]) -> u64 {
        commands
            .iter()
            .find_map(|cmd| match cmd {
                NetworkCommand::LoadChapter { id, .. } => Some(*id),
                _ => None,
            })
            .expect("chapter command")
    }

    fn probe_id(commands: &[NetworkCommand]) -> (u64, String) {
        commands
            .iter()
            .find_map(|cmd| match cmd {
                NetworkCommand::ProbePage { id, url } => Some((*id, url.clone())),
                _ => None,
            })
            .expect("probe command")
    }

    fn home_with(titles: &[&str]) -> AppState {
        let mut state = AppState::new(Config {
            items_per_page: 2,
            ..Config::default()
        });
        let id = listing_id(&state.start(Route::Home));
        let listing = titles
            .iter()
            .enumerate()
            .map(|(i, title)| MangaWithChapters {
                manga: manga(&format!("m{}", i), title),
                chapters: Vec::new(),
            })
            .collect();
        state.handle_response(NetworkResponse::Listing {
            id,
            result: Ok(listing),
        });
        state
    }

    fn reader_at(state: &mut AppState, chapter: &str, n: usize, adjacent: AdjacentChapters) -> Vec<NetworkCommand> {
        let id = chapter_id(&state.navigate(Route::Reader {
            manga_id: String::from("m"),
            chapter_id: chapter.to_string(),
        }));
        state.handle_response(NetworkResponse::Chapter {
            id,
            result: Ok(ChapterView {
                chapter: chapter_with_id(chapter),
                pages: pages(n),
                adjacent,
            }),
        })
    }

    fn chapter_with_id(id: &str) -> crate::models::Chapter {
        chapter(id, "1", 1, "pt-br")
    }

    #[test]
    fn test_stale_listing_ignored() {
        let mut state = AppState::new(Config::default());
        let first = listing_id(&state.start(Route::Home));
        let second = listing_id(&state.reload());
        assert_ne!(first, second);

        state.handle_response(NetworkResponse::Listing {
            id: first,
            result: Ok(Vec::new()),
        });
        assert!(state.home.listing.is_loading());

        state.handle_response(NetworkResponse::Listing {
            id: second,
            result: Err(FetchError {
                message: String::from("boom"),
                not_found: false,
            }),
        });
        assert_eq!(state.home.listing.error().unwrap().message, "boom");
    }

    #[test]
    fn test_filter_resets_page_and_paginates() {
        let mut state = home_with(&["Alpha", "Beta", "Alphabet", "Gamma"]);
        state.home_next_page();
        assert_eq!(state.home.page, 2);

        for c in "alp".chars() {
            state.search_char(c);
        }
        assert_eq!(state.home.page, 1);
        let render = state.to_render_state();
        assert_eq!(render.home.cards.len(), 2);
        assert_eq!(render.home.total_pages, 1);
        assert_eq!(render.home.summary, "2 result(s) for \"alp\"");
    }

    #[test]
    fn test_submit_search_switches_source() {
        let mut state = home_with(&["Alpha"]);
        state.start_search();
        for c in "bisque".chars() {
            state.search_char(c);
        }
        let commands = state.submit_search();
        assert!(matches!(
            &commands[..],
            [NetworkCommand::LoadListing { source: HomeSource::Search(title), .. }] if title == "bisque"
        ));
        assert!(state.home.filter.is_empty());
        assert_eq!(state.input_mode, InputMode::Normal);
    }

    #[test]
    fn test_leaving_view_cancels_pending_request() {
        let mut state = AppState::new(Config::default());
        state.start(Route::Manga { id: String::from("m1") });
        let pending = state.manga.as_ref().unwrap().details.pending_id().unwrap();

        let commands = state.back();
        assert_eq!(state.route, Route::Home);
        assert!(commands.contains(&NetworkCommand::Cancel(pending)));
        assert!(commands.iter().any(|c| matches!(c, NetworkCommand::LoadListing { .. })));

        // A late response for the abandoned request changes nothing
        state.handle_response(NetworkResponse::Manga {
            id: pending,
            result: Err(FetchError {
                message: String::from("late"),
                not_found: false,
            }),
        });
        assert!(state.manga.as_ref().unwrap().details.error().is_none());
    }

    #[test]
    fn test_manga_without_chapters_renders_empty_list() {
        let mut state = AppState::new(Config::default());
        let commands = state.start(Route::Manga { id: String::from("m1") });
        let id = match &commands[..] {
            [NetworkCommand::LoadManga { id, .. }] => *id,
            other => panic!("unexpected {:?}", other),
        };
        state.handle_response(NetworkResponse::Manga {
            id,
            result: Ok(MangaDetails {
                manga: manga("m1", "Lonely"),
                chapters: Vec::new(),
                statistics: None,
            }),
        });

        let render = state.to_render_state().manga.unwrap();
        assert_eq!(render.title, "Lonely");
        assert!(render.chapters.is_empty());
        assert_eq!(render.rating, "N/A");
        assert!(state.manga_select().is_empty());
    }

    #[test]
    fn test_previous_chapter_opens_on_last_page() {
        let mut state = AppState::new(Config::default());
        state.start(Route::Home);
        reader_at(
            &mut state,
            "c2",
            3,
            AdjacentChapters {
                prev: Some(String::from("c1")),
                next: None,
            },
        );

        let commands = state.reader_prev();
        let id = chapter_id(&commands);
        assert_eq!(
            state.route,
            Route::Reader {
                manga_id: String::from("m"),
                chapter_id: String::from("c1"),
            }
        );
        assert_eq!(state.reader.as_ref().unwrap().target, PageTarget::Last);

        state.handle_response(NetworkResponse::Chapter {
            id,
            result: Ok(ChapterView {
                chapter: chapter_with_id("c1"),
                pages: pages(5),
                adjacent: AdjacentChapters::default(),
            }),
        });
        let reader = state.reader.as_ref().unwrap().reader.as_ref().unwrap();
        assert_eq!(reader.current_page(), 4);
    }

    #[test]
    fn test_failed_page_falls_back_once() {
        let mut state = AppState::new(Config::default());
        state.start(Route::Home);
        let commands = reader_at(&mut state, "c1", 2, AdjacentChapters::default());
        let (first, url) = probe_id(&commands);
        assert_eq!(url, "https://cdn.test/data/h/0.png");

        let commands = state.handle_response(NetworkResponse::PageProbe { id: first, ok: false });
        let (second, url) = probe_id(&commands);
        assert_eq!(url, "https://cdn.test/data-saver/h/0.jpg");

        let commands = state.handle_response(NetworkResponse::PageProbe { id: second, ok: false });
        assert!(commands.is_empty());
        let view = state.reader.as_ref().unwrap();
        assert_eq!(view.page_status.get(&0), Some(&PageStatus::Failed));
        assert_eq!(state.to_render_state().reader.unwrap().page_state, PageCheck::Unavailable);
    }

    #[test]
    fn test_data_saver_fallback_is_shown_on_the_page() {
        let mut state = AppState::new(Config::default());
        state.start(Route::Home);
        let (first, _) = probe_id(&reader_at(&mut state, "c1", 2, AdjacentChapters::default()));
        assert_eq!(state.to_render_state().reader.unwrap().page_state, PageCheck::Checking);

        let (second, _) = probe_id(&state.handle_response(NetworkResponse::PageProbe { id: first, ok: false }));
        state.handle_response(NetworkResponse::PageProbe { id: second, ok: true });

        let render = state.to_render_state().reader.unwrap();
        assert_eq!(render.page_state, PageCheck::FellBack);
        assert_eq!(render.page_state.label(), "ok (data-saver fallback)");
    }

    #[test]
    fn test_page_jump() {
        let mut state = AppState::new(Config::default());
        state.start(Route::Home);
        reader_at(&mut state, "c1", 10, AdjacentChapters::default());

        state.page_digit('7');
        state.confirm_page_jump();
        let view = state.reader.as_ref().unwrap();
        assert_eq!(view.reader.as_ref().unwrap().current_page(), 6);
        assert!(view.page_input.is_empty());

        state.page_digit('0');
        assert!(state.confirm_page_jump().is_empty());
    }

    #[test]
    fn test_back_from_direct_reader_goes_to_manga() {
        let mut state = AppState::new(Config::default());
        state.start(Route::Reader {
            manga_id: String::from("m"),
            chapter_id: String::from("c"),
        });
        let commands = state.back();
        assert_eq!(state.route, Route::Manga { id: String::from("m") });
        assert!(commands.iter().any(|c| matches!(c, NetworkCommand::LoadManga { .. })));
        assert!(state.reader.is_none());
    }
}
