//! Data jobs: API calls composed, fanned out and reshaped for the views

use std::collections::HashMap;

use futures_util::stream::{self, StreamExt};

use crate::chapters::{adjacent_chapters, prepare_chapter_list, AdjacentChapters};
use crate::constants::{
    DEFAULT_CONTENT_RATINGS, FEED_LIMIT, PREVIEW_CHAPTERS, SEARCH_LIMIT,
    TIMELINE_CHAPTERS_PER_MANGA,
};
use crate::error::{ApiError, ApiResult};
use crate::models::{Chapter, Manga, MangaStatistics, MangaWithChapters, PageSet};
use crate::network::cancel::CancelToken;
use crate::network::client::{Direction, FeedRequest, MangaClient, MangaSearch};

/// Everything the manga detail view shows
#[derive(Clone, Debug)]
pub struct MangaDetails {
    pub manga: Manga,
    /// Deduplicated, highest chapter first
    pub chapters: Vec<Chapter>,
    pub statistics: Option<MangaStatistics>,
}

/// Everything the reader needs for one chapter
#[derive(Clone, Debug)]
pub struct ChapterView {
    pub chapter: Chapter,
    pub pages: PageSet,
    pub adjacent: AdjacentChapters,
}

/// Chapters of a manga in the client's language: at most 500, one per chapter
/// number (latest publish wins), sorted by number descending.
pub async fn chapter_list(
    client: &MangaClient,
    manga_id: &str,
    cancel: &CancelToken,
) -> ApiResult<Vec<Chapter>> {
    let feed = FeedRequest {
        order: Direction::Desc,
        limit: FEED_LIMIT,
        includes: vec!["scanlation_group"],
    };
    let response = client.manga_feed(manga_id, &feed, cancel).await?;
    Ok(prepare_chapter_list(response.data, client.language()))
}

/// Manga metadata and its chapter list, fetched concurrently.
///
/// Statistics are best effort: a failure there leaves `statistics` empty.
pub async fn manga_details(
    client: &MangaClient,
    manga_id: &str,
    cancel: &CancelToken,
) -> ApiResult<MangaDetails> {
    let (manga, chapters, statistics) = tokio::join!(
        client.get_manga(manga_id, &["author", "artist", "cover_art"], cancel),
        chapter_list(client, manga_id, cancel),
        client.manga_statistics(manga_id, cancel),
    );

    let statistics = match statistics {
        Ok(stats) => Some(stats),
        Err(e) => {
            if !e.is_cancelled() {
                tracing::warn!(manga_id, error = %e, "Statistics unavailable");
            }
            None
        }
    };

    Ok(MangaDetails {
        manga: manga?,
        chapters: chapters?,
        statistics,
    })
}

/// Attaches up to `per_manga` latest chapters to each manga.
///
/// At most `client.max_concurrency()` feeds are requested at once and output
/// order matches input order. A failed feed yields an empty list for that manga.
pub async fn attach_previews(
    client: &MangaClient,
    mangas: Vec<Manga>,
    per_manga: u32,
    cancel: &CancelToken,
) -> ApiResult<Vec<MangaWithChapters>> {
    let feed = FeedRequest {
        order: Direction::Desc,
        limit: per_manga,
        includes: vec!["scanlation_group"],
    };

    let enriched: Vec<MangaWithChapters> = stream::iter(mangas)
        .map(|manga| {
            let (client, feed, cancel) = (client.clone(), feed.clone(), cancel.clone());
            async move {
                let chapters = match client.manga_feed(&manga.id, &feed, &cancel).await {
                    Ok(list) => list.data.into_iter().take(per_manga as usize).collect(),
                    Err(e) => {
                        if !e.is_cancelled() {
                            tracing::warn!(manga_id = %manga.id, error = %e, "Chapter preview failed");
                        }
                        Vec::new()
                    }
                };
                MangaWithChapters { manga, chapters }
            }
        })
        .buffered(client.max_concurrency())
        .collect()
        .await;

    if cancel.is_cancelled() {
        return Err(ApiError::Cancelled);
    }
    Ok(enriched)
}

/// Home grid: manga with chapters in the language, most recently updated first,
/// each with its three latest chapters.
pub async fn latest_updates(
    client: &MangaClient,
    limit: u32,
    cancel: &CancelToken,
) -> ApiResult<Vec<MangaWithChapters>> {
    let search = MangaSearch {
        available_language: Some(client.language().to_string()),
        content_ratings: client.content_ratings().to_vec(),
        order: Some(("latestUploadedChapter", Direction::Desc)),
        includes: vec!["cover_art", "author"],
        limit,
        ..MangaSearch::default()
    };
    let mangas = client.search_manga(&search, cancel).await?.data;
    attach_previews(client, mangas, PREVIEW_CHAPTERS, cancel).await
}

/// Title search ordered by relevance, with chapter previews.
pub async fn search_titles(
    client: &MangaClient,
    title: &str,
    cancel: &CancelToken,
) -> ApiResult<Vec<MangaWithChapters>> {
    let title = title.trim();
    if title.is_empty() {
        return Ok(Vec::new());
    }

    let search = MangaSearch {
        title: Some(title.to_string()),
        available_language: Some(client.language().to_string()),
        content_ratings: client.content_ratings().to_vec(),
        order: Some(("relevance", Direction::Desc)),
        includes: vec!["cover_art", "author"],
        limit: SEARCH_LIMIT,
        ..MangaSearch::default()
    };
    let mangas = client.search_manga(&search, cancel).await?.data;
    attach_previews(client, mangas, PREVIEW_CHAPTERS, cancel).await
}

/// Most followed safe/suggestive manga that have chapters in the language.
pub async fn popular(
    client: &MangaClient,
    limit: u32,
    cancel: &CancelToken,
) -> ApiResult<Vec<MangaWithChapters>> {
    let search = MangaSearch {
        content_ratings: DEFAULT_CONTENT_RATINGS[..2].iter().map(|s| s.to_string()).collect(),
        order: Some(("followedCount", Direction::Desc)),
        limit,
        ..MangaSearch::default()
    };
    let mangas = client.search_manga(&search, cancel).await?.data;
    let enriched = attach_previews(client, mangas, PREVIEW_CHAPTERS, cancel).await?;

    Ok(enriched
        .into_iter()
        .filter(|entry| !entry.chapters.is_empty())
        .take(limit as usize)
        .collect())
}

/// Groups chapters by manga id in first-seen order, keeping `cap` per manga.
pub fn group_by_manga(chapters: Vec<Chapter>, cap: usize) -> (Vec<String>, HashMap<String, Vec<Chapter>>) {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<Chapter>> = HashMap::new();

    for chapter in chapters {
        let Some(manga_id) = chapter.manga_id().map(str::to_string) else {
            continue;
        };
        let group = groups.entry(manga_id.clone()).or_insert_with(|| {
            order.push(manga_id);
            Vec::new()
        });
        if group.len() < cap {
            group.push(chapter);
        }
    }

    (order, groups)
}

/// Timeline of recent releases: scan the `scan_limit` newest chapters, group them
/// by manga (five per manga), then load metadata of the first `manga_limit` manga.
///
/// Manga come back in the API's order for the `ids[]` query, not release order.
pub async fn recent_timeline(
    client: &MangaClient,
    scan_limit: u32,
    manga_limit: usize,
    cancel: &CancelToken,
) -> ApiResult<Vec<MangaWithChapters>> {
    let recent = client
        .recent_chapters(scan_limit, 0, &["manga", "scanlation_group"], cancel)
        .await?
        .data;
    if recent.is_empty() {
        return Ok(Vec::new());
    }

    let (order, mut groups) = group_by_manga(recent, TIMELINE_CHAPTERS_PER_MANGA);
    let ids: Vec<String> = order.into_iter().take(manga_limit).collect();
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let search = MangaSearch {
        limit: ids.len() as u32,
        ids,
        includes: vec!["cover_art"],
        ..MangaSearch::default()
    };
    let mangas = client.search_manga(&search, cancel).await?.data;

    Ok(mangas
        .into_iter()
        .map(|manga| {
            let chapters = groups.remove(&manga.id).unwrap_or_default();
            MangaWithChapters { manga, chapters }
        })
        .collect())
}

/// Previous/next chapter ids from the ascending feed of `manga_id`.
pub async fn adjacent(
    client: &MangaClient,
    manga_id: &str,
    chapter_id: &str,
    cancel: &CancelToken,
) -> ApiResult<AdjacentChapters> {
    let feed = FeedRequest {
        order: Direction::Asc,
        limit: FEED_LIMIT,
        includes: vec!["scanlation_group"],
    };
    let response = client.manga_feed(manga_id, &feed, cancel).await?;
    Ok(adjacent_chapters(&response.data, chapter_id))
}

/// Chapter detail, page set and neighbors for the reader.
///
/// Neighbors are looked up in `manga_id`'s feed, falling back to the manga the
/// chapter belongs to; a failed lookup leaves them empty.
pub async fn chapter_view(
    client: &MangaClient,
    chapter_id: &str,
    manga_id: Option<&str>,
    cancel: &CancelToken,
) -> ApiResult<ChapterView> {
    let (chapter, pages) = tokio::try_join!(
        client.get_chapter(chapter_id, cancel),
        client.at_home_server(chapter_id, cancel),
    )?;

    let owner = manga_id
        .map(str::to_string)
        .or_else(|| chapter.manga_id().map(str::to_string));

    let adjacent = match owner {
        Some(owner) => match adjacent(client, &owner, chapter_id, cancel).await {
            Ok(adjacent) => adjacent,
            Err(ApiError::Cancelled) => return Err(ApiError::Cancelled),
            Err(e) => {
                tracing::warn!(chapter_id, error = %e, "Adjacent chapters unavailable");
                AdjacentChapters::default()
            }
        },
        None => AdjacentChapters::default(),
    };

    Ok(ChapterView {
        chapter,
        pages,
        adjacent,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChapterAttributes, Relationship, RelationshipType};
    use chrono::Utc;

    fn chapter_of(id: &str, manga: &str) -> Chapter {
        Chapter {
            id: id.to_string(),
            attributes: ChapterAttributes {
                chapter: Some(String::from("1")),
                title: None,
                publish_at: Utc::now(),
                translated_language: String::from("pt-br"),
                pages: 0,
            },
            relationships: vec![Relationship {
                id: manga.to_string(),
                kind: RelationshipType::Manga,
                attributes: None,
            }],
        }
    }

    #[test]
    fn test_group_by_manga_caps_and_keeps_first_seen_order() {
        let mut chapters: Vec<Chapter> = (0..7).map(|i| chapter_of(&format!("a{}", i), "A")).collect();
        chapters.insert(1, chapter_of("b0", "B"));
        let mut orphan = chapter_of("x", "A");
        orphan.relationships.clear();
        chapters.push(orphan);

        let (order, groups) = group_by_manga(chapters, 5);
        assert_eq!(order, vec!["A".to_string(), "B".to_string()]);
        assert_eq!(groups["A"].len(), 5);
        assert_eq!(groups["A"][0].id, "a0");
        assert_eq!(groups["B"].len(), 1);
    }
}
