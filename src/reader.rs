//! Reader pagination state for one chapter

use std::collections::HashSet;

use crate::chapters::AdjacentChapters;
use crate::models::{PageSet, Quality};

/// Page to select once a chapter's pages have loaded
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PageTarget {
    #[default]
    First,
    Last,
    Index(usize),
}

impl PageTarget {
    /// Resolves against a chapter with `len` pages
    pub fn resolve(self, len: usize) -> usize {
        let last = len.saturating_sub(1);
        match self {
            PageTarget::First => 0,
            PageTarget::Last => last,
            PageTarget::Index(i) => i.min(last),
        }
    }
}

/// Outcome of a page movement
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReaderStep {
    /// Stayed inside the chapter, now on this page
    Page(usize),
    /// Left the chapter; open `chapter_id` and select `target` when it loads
    Chapter { chapter_id: String, target: PageTarget },
    /// Nowhere to go
    Stay,
}

#[derive(Clone, Debug)]
pub struct ReaderState {
    pub chapter_id: String,
    pub pages: PageSet,
    pub adjacent: AdjacentChapters,
    current: usize,
    data_saver: bool,
    /// Pages whose full-resolution image failed and now use data-saver
    fallbacks: HashSet<usize>,
}

impl ReaderState {
    /// Applies the pending `target` as soon as the page list is known.
    pub fn new(
        chapter_id: impl Into<String>,
        pages: PageSet,
        adjacent: AdjacentChapters,
        target: PageTarget,
        data_saver: bool,
    ) -> Self {
        let current = target.resolve(pages.len());
        ReaderState {
            chapter_id: chapter_id.into(),
            pages,
            adjacent,
            current,
            data_saver,
            fallbacks: HashSet::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn current_page(&self) -> usize {
        self.current
    }

    pub fn is_last_page(&self) -> bool {
        self.current + 1 >= self.len()
    }

    pub fn next_page(&mut self) -> ReaderStep {
        if !self.is_last_page() {
            self.current += 1;
            return ReaderStep::Page(self.current);
        }
        match &self.adjacent.next {
            Some(id) => ReaderStep::Chapter {
                chapter_id: id.clone(),
                target: PageTarget::First,
            },
            None => ReaderStep::Stay,
        }
    }

    pub fn prev_page(&mut self) -> ReaderStep {
        if self.current > 0 {
            self.current -= 1;
            return ReaderStep::Page(self.current);
        }
        match &self.adjacent.prev {
            Some(id) => ReaderStep::Chapter {
                chapter_id: id.clone(),
                target: PageTarget::Last,
            },
            None => ReaderStep::Stay,
        }
    }

    pub fn first_page(&mut self) {
        self.current = 0;
    }

    pub fn last_page(&mut self) {
        self.current = PageTarget::Last.resolve(self.len());
    }

    pub fn go_to(&mut self, index: usize) {
        self.current = PageTarget::Index(index).resolve(self.len());
    }

    pub fn can_go_prev(&self) -> bool {
        self.current > 0 || self.adjacent.prev.is_some()
    }

    pub fn can_go_next(&self) -> bool {
        !self.is_last_page() || self.adjacent.next.is_some()
    }

    pub fn data_saver(&self) -> bool {
        self.data_saver
    }

    pub fn toggle_data_saver(&mut self) {
        self.data_saver = !self.data_saver;
    }

    pub fn quality_for(&self, index: usize) -> Quality {
        if self.data_saver || self.fallbacks.contains(&index) {
            Quality::DataSaver
        } else {
            Quality::Data
        }
    }

    pub fn page_url(&self, index: usize) -> Option<String> {
        self.pages.page_url(index, self.quality_for(index))
    }

    pub fn current_url(&self) -> Option<String> {
        self.page_url(self.current)
    }

    /// Full-resolution image for `index` failed to load.
    ///
    /// Returns the data-saver URL the first time; `None` when already in
    /// data-saver mode or the page has fallen back before.
    pub fn on_image_error(&mut self, index: usize) -> Option<String> {
        if self.data_saver || index >= self.len() || !self.fallbacks.insert(index) {
            return None;
        }
        self.pages.page_url(index, Quality::DataSaver)
    }

    pub fn has_fallen_back(&self, index: usize) -> bool {
        self.fallbacks.contains(&index)
    }
}
