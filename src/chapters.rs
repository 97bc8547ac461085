//! Chapter list shaping: de-duplication, numeric ordering, neighbors and the "new" flag

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use crate::constants::NEW_CHAPTER_DAYS;
use crate::models::Chapter;

/// Leading numeric value of a chapter number, like `parseFloat`:
/// `"10"` → 10, `"10.5a"` → 10.5, `"-1"` → -1, `"extra"` → None.
pub fn parse_chapter_number(raw: &str) -> Option<f64> {
    let s = raw.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if frac_end > frac_start {
            digits += frac_end - frac_start;
            end = frac_end;
        }
    }

    if digits == 0 {
        return None;
    }
    s[..end].parse().ok()
}

/// Keeps one chapter per chapter-number string: the one published last.
///
/// On equal timestamps the first occurrence wins. Output preserves the order in
/// which each number was first seen.
pub fn dedupe_latest(chapters: Vec<Chapter>) -> Vec<Chapter> {
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut kept: Vec<Chapter> = Vec::with_capacity(chapters.len());

    for chapter in chapters {
        match slots.get(chapter.number()) {
            Some(&slot) => {
                if chapter.publish_at() > kept[slot].publish_at() {
                    kept[slot] = chapter;
                }
            }
            None => {
                slots.insert(chapter.number().to_string(), kept.len());
                kept.push(chapter);
            }
        }
    }

    kept
}

/// Highest chapter number first; unparseable numbers go last in input order.
pub fn sort_by_number_desc(chapters: &mut [Chapter]) {
    chapters.sort_by(|a, b| {
        match (
            parse_chapter_number(a.number()),
            parse_chapter_number(b.number()),
        ) {
            (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    });
}

/// Drops chapters not translated into `language`.
pub fn retain_language(chapters: &mut Vec<Chapter>, language: &str) {
    chapters.retain(|ch| ch.attributes.translated_language.eq_ignore_ascii_case(language));
}

/// Language filter, dedup and descending numeric sort in one pass.
pub fn prepare_chapter_list(mut chapters: Vec<Chapter>, language: &str) -> Vec<Chapter> {
    retain_language(&mut chapters, language);
    let mut unique = dedupe_latest(chapters);
    sort_by_number_desc(&mut unique);
    unique
}

/// New means published no more than seven days before `now`, boundary included.
pub fn is_new_at(publish_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now.signed_duration_since(publish_at) <= Duration::days(NEW_CHAPTER_DAYS)
}

/// Previous and next chapter ids around the current chapter in a feed
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AdjacentChapters {
    pub prev: Option<String>,
    pub next: Option<String>,
}

/// Neighbors of `current_id` in an ascending feed. Unknown ids have no neighbors.
pub fn adjacent_chapters(feed: &[Chapter], current_id: &str) -> AdjacentChapters {
    match feed.iter().position(|ch| ch.id == current_id) {
        Some(index) => AdjacentChapters {
            prev: index
                .checked_sub(1)
                .and_then(|i| feed.get(i))
                .map(|ch| ch.id.clone()),
            next: feed.get(index + 1).map(|ch| ch.id.clone()),
        },
        None => AdjacentChapters::default(),
    }
}
