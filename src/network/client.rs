//! Catalog API client - one instance per process, passed to every job

use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::constants::USER_AGENT;
use crate::error::{ApiError, ApiResult};
use crate::models::{
    ApiErrorBody, Chapter, EntityResponse, ListResponse, Manga, MangaStatistics, PageSet,
    StatisticsResponse,
};
use crate::network::cancel::CancelToken;

/// Sort direction for `order[field]=...`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    fn as_str(&self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }
}

/// Query-string builder for the API's bracketed array syntax
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Query {
    pairs: Vec<(String, String)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param(mut self, key: &str, value: impl ToString) -> Self {
        self.pairs.push((key.to_string(), value.to_string()));
        self
    }

    /// `key[]=a&key[]=b`
    pub fn list<I, S>(mut self, key: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let key = format!("{}[]", key);
        for value in values {
            self.pairs.push((key.clone(), value.as_ref().to_string()));
        }
        self
    }

    pub fn order(self, field: &str, direction: Direction) -> Self {
        self.param(&format!("order[{}]", field), direction.as_str())
    }

    pub fn includes(self, kinds: &[&str]) -> Self {
        self.list("includes", kinds.iter())
    }

    pub fn limit(self, limit: u32) -> Self {
        self.param("limit", limit)
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }
}

/// Parameters of a `/manga` listing
#[derive(Clone, Debug)]
pub struct MangaSearch {
    pub title: Option<String>,
    pub ids: Vec<String>,
    pub available_language: Option<String>,
    pub content_ratings: Vec<String>,
    pub order: Option<(&'static str, Direction)>,
    pub includes: Vec<&'static str>,
    pub limit: u32,
}

impl Default for MangaSearch {
    fn default() -> Self {
        MangaSearch {
            title: None,
            ids: Vec::new(),
            available_language: None,
            content_ratings: Vec::new(),
            order: None,
            includes: vec!["cover_art"],
            limit: 20,
        }
    }
}

impl MangaSearch {
    fn to_query(&self) -> Query {
        let mut query = Query::new().limit(self.limit).includes(&self.includes);
        if let Some(title) = &self.title {
            query = query.param("title", title);
        }
        if !self.ids.is_empty() {
            query = query.list("ids", &self.ids);
        }
        if let Some(language) = &self.available_language {
            query = query.list("availableTranslatedLanguage", [language]);
        }
        if !self.content_ratings.is_empty() {
            query = query.list("contentRating", &self.content_ratings);
        }
        if let Some((field, direction)) = self.order {
            query = query.order(field, direction);
        }
        query
    }
}

/// Parameters of a `/manga/{id}/feed` request
#[derive(Clone, Debug)]
pub struct FeedRequest {
    pub order: Direction,
    pub limit: u32,
    pub includes: Vec<&'static str>,
}

#[derive(Clone, Debug)]
pub struct MangaClient {
    http: reqwest::Client,
    base_url: String,
    language: String,
    content_ratings: Vec<String>,
    max_concurrency: usize,
}

impl MangaClient {
    pub fn new(config: &Config) -> ApiResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(MangaClient {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            language: config.language.clone(),
            content_ratings: config.content_ratings.clone(),
            max_concurrency: config.max_concurrency.max(1),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Translation language every chapter query is filtered by
    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn content_ratings(&self) -> &[String] {
        &self.content_ratings
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &Query,
        cancel: &CancelToken,
    ) -> ApiResult<T> {
        let url = format!("{}{}", self.base_url, path);
        let request = self.http.get(&url).query(query.pairs());

        cancel
            .guard(async move {
                let start = Instant::now();
                tracing::debug!(%url, "GET");
                let response = request.send().await?;
                let status = response.status();
                let body = response.text().await?;
                tracing::info!(
                    %url,
                    status = status.as_u16(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Request completed"
                );

                if status.is_success() {
                    return Ok(serde_json::from_str(&body)?);
                }

                let message = serde_json::from_str::<ApiErrorBody>(&body)
                    .ok()
                    .and_then(|err| err.message())
                    .unwrap_or_else(|| {
                        status
                            .canonical_reason()
                            .unwrap_or("Unexpected status")
                            .to_string()
                    });

                if status == reqwest::StatusCode::NOT_FOUND {
                    Err(ApiError::NotFound(message))
                } else {
                    Err(ApiError::Api {
                        status: status.as_u16(),
                        message,
                    })
                }
            })
            .await
    }

    /// Latest chapters in the configured language across the whole catalog
    pub async fn recent_chapters(
        &self,
        limit: u32,
        offset: u32,
        includes: &[&str],
        cancel: &CancelToken,
    ) -> ApiResult<ListResponse<Chapter>> {
        let query = Query::new()
            .list("translatedLanguage", [&self.language])
            .order("publishAt", Direction::Desc)
            .includes(includes)
            .list("contentRating", &self.content_ratings)
            .limit(limit)
            .param("offset", offset);
        self.get("/chapter", &query, cancel).await
    }

    /// Chapters of one manga in the configured language
    pub async fn manga_feed(
        &self,
        manga_id: &str,
        feed: &FeedRequest,
        cancel: &CancelToken,
    ) -> ApiResult<ListResponse<Chapter>> {
        let query = Query::new()
            .list("translatedLanguage", [&self.language])
            .order("chapter", feed.order)
            .limit(feed.limit)
            .includes(&feed.includes);
        self.get(&format!("/manga/{}/feed", manga_id), &query, cancel)
            .await
    }

    pub async fn search_manga(
        &self,
        search: &MangaSearch,
        cancel: &CancelToken,
    ) -> ApiResult<ListResponse<Manga>> {
        self.get("/manga", &search.to_query(), cancel).await
    }

    pub async fn get_manga(
        &self,
        manga_id: &str,
        includes: &[&str],
        cancel: &CancelToken,
    ) -> ApiResult<Manga> {
        let query = Query::new().includes(includes);
        let response: EntityResponse<Manga> = self
            .get(&format!("/manga/{}", manga_id), &query, cancel)
            .await?;
        Ok(response.data)
    }

    pub async fn get_chapter(&self, chapter_id: &str, cancel: &CancelToken) -> ApiResult<Chapter> {
        let query = Query::new().includes(&["manga", "scanlation_group"]);
        let response: EntityResponse<Chapter> = self
            .get(&format!("/chapter/{}", chapter_id), &query, cancel)
            .await?;
        Ok(response.data)
    }

    /// Image server, hash and file names for a chapter's pages
    pub async fn at_home_server(&self, chapter_id: &str, cancel: &CancelToken) -> ApiResult<PageSet> {
        self.get(&format!("/at-home/server/{}", chapter_id), &Query::new(), cancel)
            .await
    }

    pub async fn manga_statistics(
        &self,
        manga_id: &str,
        cancel: &CancelToken,
    ) -> ApiResult<MangaStatistics> {
        let mut response: StatisticsResponse = self
            .get(&format!("/statistics/manga/{}", manga_id), &Query::new(), cancel)
            .await?;
        response
            .statistics
            .remove(manga_id)
            .ok_or_else(|| ApiError::NotFound(format!("statistics for {}", manga_id)))
    }

    /// Checks that a page image can be fetched; the body is not read.
    pub async fn probe_image(&self, url: &str, cancel: &CancelToken) -> ApiResult<()> {
        let request = self.http.get(url);
        cancel
            .guard(async move {
                let response = request.send().await?;
                let status = response.status();
                if status.is_success() {
                    Ok(())
                } else if status == reqwest::StatusCode::NOT_FOUND {
                    Err(ApiError::NotFound(url.to_string()))
                } else {
                    Err(ApiError::Api {
                        status: status.as_u16(),
                        message: String::from("Image unavailable"),
                    })
                }
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_uses_bracket_arrays() {
        let query = Query::new()
            .list("translatedLanguage", ["pt-br"])
            .order("publishAt", Direction::Desc)
            .includes(&["manga", "scanlation_group"])
            .limit(5);
        assert_eq!(
            query.pairs(),
            &[
                ("translatedLanguage[]".to_string(), "pt-br".to_string()),
                ("order[publishAt]".to_string(), "desc".to_string()),
                ("includes[]".to_string(), "manga".to_string()),
                ("includes[]".to_string(), "scanlation_group".to_string()),
                ("limit".to_string(), "5".to_string()),
            ]
        );
    }

    #[test]
    fn test_manga_search_query() {
        let search = MangaSearch {
            title: Some("bisque".into()),
            ids: vec!["a".into(), "b".into()],
            available_language: Some("pt-br".into()),
            content_ratings: vec!["safe".into()],
            order: Some(("relevance", Direction::Desc)),
            includes: vec!["cover_art", "author"],
            limit: 25,
        };
        let query = search.to_query();
        let keys: Vec<&str> = query.pairs().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "limit",
                "includes[]",
                "includes[]",
                "title",
                "ids[]",
                "ids[]",
                "availableTranslatedLanguage[]",
                "contentRating[]",
                "order[relevance]",
            ]
        );
    }

    #[test]
    fn test_client_trims_base_url() {
        let config = Config {
            api_base_url: String::from("http://localhost:1234/"),
            max_concurrency: 0,
            ..Config::default()
        };
        let client = MangaClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "http://localhost:1234");
        assert_eq!(client.max_concurrency(), 1);
    }
}
