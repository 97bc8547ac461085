//! Catalog entities - serde mirrors of the MangaDex JSON shapes plus display helpers

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};

use crate::constants::FALLBACK_COVER_FILE;

/// Language code → text
pub type LocalizedString = HashMap<String, String>;

/// The API encodes an empty localized map as `[]`; accept both shapes.
fn localized<'de, D>(deserializer: D) -> Result<LocalizedString, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum MapOrSeq {
        Map(LocalizedString),
        Seq(serde::de::IgnoredAny),
    }

    Ok(match Option::<MapOrSeq>::deserialize(deserializer)? {
        Some(MapOrSeq::Map(map)) => map,
        Some(MapOrSeq::Seq(_)) | None => LocalizedString::new(),
    })
}

/// Relationship kinds we care about; everything else collapses to `Other`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipType {
    Manga,
    Author,
    Artist,
    CoverArt,
    ScanlationGroup,
    #[serde(other)]
    Other,
}

/// Expanded attributes of a related entity (present when requested via `includes[]`)
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RelationshipAttributes {
    pub name: Option<String>,
    pub file_name: Option<String>,
    #[serde(deserialize_with = "localized")]
    pub title: LocalizedString,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Relationship {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: RelationshipType,
    #[serde(default)]
    pub attributes: Option<RelationshipAttributes>,
}

fn find_relationship(relationships: &[Relationship], kind: RelationshipType) -> Option<&Relationship> {
    relationships.iter().find(|rel| rel.kind == kind)
}

/// Publication status of a manga
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MangaStatus {
    Ongoing,
    Completed,
    Hiatus,
    Cancelled,
    Unknown(String),
}

impl From<String> for MangaStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "ongoing" => MangaStatus::Ongoing,
            "completed" => MangaStatus::Completed,
            "hiatus" => MangaStatus::Hiatus,
            "cancelled" => MangaStatus::Cancelled,
            _ => MangaStatus::Unknown(value),
        }
    }
}

impl From<MangaStatus> for String {
    fn from(status: MangaStatus) -> Self {
        match status {
            MangaStatus::Ongoing => "ongoing".to_string(),
            MangaStatus::Completed => "completed".to_string(),
            MangaStatus::Hiatus => "hiatus".to_string(),
            MangaStatus::Cancelled => "cancelled".to_string(),
            MangaStatus::Unknown(raw) => raw,
        }
    }
}

impl Default for MangaStatus {
    fn default() -> Self {
        MangaStatus::Unknown(String::new())
    }
}

impl MangaStatus {
    pub fn label(&self) -> &str {
        match self {
            MangaStatus::Ongoing => "Ongoing",
            MangaStatus::Completed => "Completed",
            MangaStatus::Hiatus => "Hiatus",
            MangaStatus::Cancelled => "Cancelled",
            MangaStatus::Unknown(raw) => raw,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TagAttributes {
    #[serde(deserialize_with = "localized")]
    pub name: LocalizedString,
    pub group: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    #[serde(default)]
    pub attributes: TagAttributes,
}

impl Tag {
    pub fn name(&self) -> &str {
        self.attributes
            .name
            .get("en")
            .or_else(|| self.attributes.name.values().next())
            .map(String::as_str)
            .unwrap_or("")
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MangaAttributes {
    #[serde(deserialize_with = "localized")]
    pub title: LocalizedString,
    #[serde(deserialize_with = "localized")]
    pub description: LocalizedString,
    pub status: MangaStatus,
    pub tags: Vec<Tag>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Manga {
    pub id: String,
    #[serde(default)]
    pub attributes: MangaAttributes,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

/// Picks `en`, then `language`, then any entry; blank entries are skipped.
fn pick_localized<'a>(map: &'a LocalizedString, language: &str) -> Option<&'a str> {
    [map.get("en"), map.get(language)]
        .into_iter()
        .flatten()
        .chain(map.values())
        .map(String::as_str)
        .find(|s| !s.trim().is_empty())
}

impl Manga {
    pub fn display_title(&self, language: &str) -> &str {
        pick_localized(&self.attributes.title, language).unwrap_or("Untitled")
    }

    /// Description with markup stripped, or a placeholder
    pub fn display_description(&self, language: &str) -> String {
        match pick_localized(&self.attributes.description, language) {
            Some(text) => clean_description(text),
            None => String::from("No description available."),
        }
    }

    fn tags_in_group(&self, group: &str) -> Vec<&Tag> {
        self.attributes
            .tags
            .iter()
            .filter(|tag| tag.attributes.group == group)
            .collect()
    }

    pub fn genres(&self) -> Vec<&Tag> {
        self.tags_in_group("genre")
    }

    pub fn themes(&self) -> Vec<&Tag> {
        self.tags_in_group("theme")
    }

    pub fn author(&self) -> Option<&Relationship> {
        find_relationship(&self.relationships, RelationshipType::Author)
    }

    /// Artist, unless it is the same person as the author
    pub fn artist(&self) -> Option<&Relationship> {
        let artist = find_relationship(&self.relationships, RelationshipType::Artist)?;
        match self.author() {
            Some(author) if author.id == artist.id => None,
            _ => Some(artist),
        }
    }

    pub fn cover_file_name(&self) -> &str {
        find_relationship(&self.relationships, RelationshipType::CoverArt)
            .and_then(|rel| rel.attributes.as_ref())
            .and_then(|attrs| attrs.file_name.as_deref())
            .unwrap_or(FALLBACK_COVER_FILE)
    }

    pub fn cover_url(&self, cover_base: &str) -> String {
        format!(
            "{}/{}/{}",
            cover_base.trim_end_matches('/'),
            self.id,
            self.cover_file_name()
        )
    }
}

/// Name of a related person/group, when its attributes were expanded
pub fn relationship_name(rel: &Relationship) -> Option<&str> {
    rel.attributes.as_ref().and_then(|a| a.name.as_deref())
}

static BRACKETS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[.*?\]").expect("valid regex"));
static HTML_TAGS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<.*?>").expect("valid regex"));
static BLANK_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*\n").expect("valid regex"));

/// Strips BBCode-style `[...]` markup and HTML tags, collapses blank-line runs.
pub fn clean_description(text: &str) -> String {
    let text = BRACKETS.replace_all(text, "");
    let text = HTML_TAGS.replace_all(&text, "");
    let text = BLANK_RUNS.replace_all(&text, "\n\n");
    text.trim().to_string()
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterAttributes {
    #[serde(default)]
    pub chapter: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    pub publish_at: DateTime<Utc>,
    #[serde(default)]
    pub translated_language: String,
    #[serde(default)]
    pub pages: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Chapter {
    pub id: String,
    pub attributes: ChapterAttributes,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

impl Chapter {
    /// Chapter number string ("" when the chapter is unnumbered, e.g. a oneshot)
    pub fn number(&self) -> &str {
        self.attributes.chapter.as_deref().unwrap_or("")
    }

    pub fn publish_at(&self) -> DateTime<Utc> {
        self.attributes.publish_at
    }

    pub fn manga_id(&self) -> Option<&str> {
        find_relationship(&self.relationships, RelationshipType::Manga).map(|rel| rel.id.as_str())
    }

    pub fn scanlation_group(&self) -> Option<&str> {
        find_relationship(&self.relationships, RelationshipType::ScanlationGroup)
            .and_then(relationship_name)
    }

    /// Title of the parent manga when it was included in the response
    pub fn manga_title(&self) -> Option<&str> {
        find_relationship(&self.relationships, RelationshipType::Manga)
            .and_then(|rel| rel.attributes.as_ref())
            .and_then(|attrs| pick_localized(&attrs.title, ""))
    }

    pub fn label(&self) -> String {
        let number = match self.number() {
            "" => String::from("Oneshot"),
            n => format!("Ch. {}", n),
        };
        match self.attributes.title.as_deref().filter(|t| !t.is_empty()) {
            Some(title) => format!("{} - {}", number, title),
            None => number,
        }
    }
}

/// Image variant served by the at-home CDN
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Quality {
    Data,
    DataSaver,
}

impl Quality {
    pub fn path_segment(&self) -> &'static str {
        match self {
            Quality::Data => "data",
            Quality::DataSaver => "data-saver",
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterPages {
    pub hash: String,
    #[serde(default)]
    pub data: Vec<String>,
    #[serde(default)]
    pub data_saver: Vec<String>,
}

/// Response of `/at-home/server/{chapter_id}`
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSet {
    pub base_url: String,
    pub chapter: ChapterPages,
}

impl PageSet {
    pub fn len(&self) -> usize {
        self.chapter.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chapter.data.is_empty()
    }

    /// CDN URL of a page, `None` when the index has no file for that quality
    pub fn page_url(&self, index: usize, quality: Quality) -> Option<String> {
        let files = match quality {
            Quality::Data => &self.chapter.data,
            Quality::DataSaver => &self.chapter.data_saver,
        };
        files.get(index).map(|file| {
            format!(
                "{}/{}/{}/{}",
                self.base_url.trim_end_matches('/'),
                quality.path_segment(),
                self.chapter.hash,
                file
            )
        })
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Rating {
    pub average: Option<f64>,
    pub bayesian: Option<f64>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comments {
    #[serde(default)]
    pub replies_count: u64,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MangaStatistics {
    pub rating: Option<Rating>,
    pub follows: Option<u64>,
    pub comments: Option<Comments>,
}

impl MangaStatistics {
    pub fn rating_label(&self) -> String {
        self.rating
            .as_ref()
            .and_then(|r| r.average)
            .map(|avg| format!("{:.2}", avg))
            .unwrap_or_else(|| String::from("N/A"))
    }

    pub fn follows(&self) -> u64 {
        self.follows.unwrap_or(0)
    }

    pub fn comment_count(&self) -> u64 {
        self.comments.as_ref().map(|c| c.replies_count).unwrap_or(0)
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct StatisticsResponse {
    #[serde(default)]
    pub statistics: HashMap<String, MangaStatistics>,
}

/// `{result, data: [...], limit, offset, total}`
#[derive(Clone, Debug, Deserialize)]
pub struct ListResponse<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
    #[serde(default)]
    pub total: u32,
}

/// `{result, data: {...}}`
#[derive(Clone, Debug, Deserialize)]
pub struct EntityResponse<T> {
    pub data: T,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

/// `{result: "error", errors: [...]}`
#[derive(Clone, Debug, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub errors: Vec<ApiErrorDetail>,
}

impl ApiErrorBody {
    /// First human-readable message in the body
    pub fn message(&self) -> Option<String> {
        self.errors
            .iter()
            .find_map(|e| e.detail.clone().or_else(|| e.title.clone()))
    }
}

/// A manga with the handful of chapters shown beside it
#[derive(Clone, Debug)]
pub struct MangaWithChapters {
    pub manga: Manga,
    pub chapters: Vec<Chapter>,
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quality::Data => write!(f, "HD"),
            Quality::DataSaver => write!(f, "SD"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANGA_JSON: &str = r#"{
        "id": "m1",
        "type": "manga",
        "attributes": {
            "title": {"ja-ro": "Sono Bisque", "en": "My Dress-Up Darling"},
            "description": [],
            "status": "ongoing",
            "tags": [
                {"id": "t1", "type": "tag", "attributes": {"name": {"en": "Romance"}, "group": "genre"}},
                {"id": "t2", "type": "tag", "attributes": {"name": {"en": "School Life"}, "group": "theme"}}
            ]
        },
        "relationships": [
            {"id": "a1", "type": "author", "attributes": {"name": "Fukuda Shinichi"}},
            {"id": "a1", "type": "artist", "attributes": {"name": "Fukuda Shinichi"}},
            {"id": "c1", "type": "cover_art", "attributes": {"fileName": "cover.png"}},
            {"id": "x1", "type": "creator"}
        ]
    }"#;

    #[test]
    fn test_manga_deserializes_with_empty_description_array() {
        let manga: Manga = serde_json::from_str(MANGA_JSON).unwrap();
        assert_eq!(manga.display_title("pt-br"), "My Dress-Up Darling");
        assert_eq!(manga.display_description("pt-br"), "No description available.");
        assert_eq!(manga.attributes.status, MangaStatus::Ongoing);
        assert_eq!(manga.relationships[3].kind, RelationshipType::Other);
    }

    #[test]
    fn test_blank_english_falls_through_to_language() {
        let manga: Manga = serde_json::from_str(
            r#"{
                "id": "m2",
                "attributes": {
                    "title": {"en": "", "pt-br": "Titulo"},
                    "description": {"en": "  ", "pt-br": "Descricao"}
                }
            }"#,
        )
        .unwrap();
        assert_eq!(manga.display_title("pt-br"), "Titulo");
        assert_eq!(manga.display_description("pt-br"), "Descricao");

        let blank: Manga =
            serde_json::from_str(r#"{"id": "m3", "attributes": {"title": {"en": " "}}}"#).unwrap();
        assert_eq!(blank.display_title("pt-br"), "Untitled");
    }

    #[test]
    fn test_manga_helpers() {
        let manga: Manga = serde_json::from_str(MANGA_JSON).unwrap();
        assert_eq!(manga.genres().len(), 1);
        assert_eq!(manga.themes()[0].name(), "School Life");
        assert_eq!(manga.author().and_then(relationship_name), Some("Fukuda Shinichi"));
        // same person drawn and written
        assert!(manga.artist().is_none());
        assert_eq!(
            manga.cover_url("https://uploads.mangadex.org/covers/"),
            "https://uploads.mangadex.org/covers/m1/cover.png"
        );
    }

    #[test]
    fn test_unknown_status_is_kept_verbatim() {
        let status: MangaStatus = serde_json::from_str("\"paused\"").unwrap();
        assert_eq!(status.label(), "paused");
        assert_eq!(MangaStatus::Hiatus.label(), "Hiatus");
    }

    #[test]
    fn test_clean_description() {
        let raw = "[b]Bold[/b] text <br>line\n\n\n\nnext\n  \n  ";
        assert_eq!(clean_description(raw), "Bold text line\n\nnext");
    }

    #[test]
    fn test_chapter_helpers() {
        let json = r#"{
            "id": "ch1",
            "attributes": {
                "chapter": "12.5",
                "title": "Festival",
                "publishAt": "2024-03-01T10:00:00+00:00",
                "translatedLanguage": "pt-br"
            },
            "relationships": [
                {"id": "m1", "type": "manga", "attributes": {"title": {"en": "Darling"}}},
                {"id": "g1", "type": "scanlation_group", "attributes": {"name": "Team A"}}
            ]
        }"#;
        let chapter: Chapter = serde_json::from_str(json).unwrap();
        assert_eq!(chapter.number(), "12.5");
        assert_eq!(chapter.manga_id(), Some("m1"));
        assert_eq!(chapter.manga_title(), Some("Darling"));
        assert_eq!(chapter.scanlation_group(), Some("Team A"));
        assert_eq!(chapter.label(), "Ch. 12.5 - Festival");
    }

    #[test]
    fn test_page_urls() {
        let pages: PageSet = serde_json::from_str(
            r#"{"result":"ok","baseUrl":"https://cdn.example/","chapter":{"hash":"abc","data":["1.png","2.png"],"dataSaver":["1.jpg","2.jpg"]}}"#,
        )
        .unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(
            pages.page_url(1, Quality::Data).as_deref(),
            Some("https://cdn.example/data/abc/2.png")
        );
        assert_eq!(
            pages.page_url(0, Quality::DataSaver).as_deref(),
            Some("https://cdn.example/data-saver/abc/1.jpg")
        );
        assert!(pages.page_url(2, Quality::Data).is_none());
    }

    #[test]
    fn test_statistics_labels() {
        let stats: StatisticsResponse = serde_json::from_str(
            r#"{"statistics":{"m1":{"rating":{"average":8.4567,"bayesian":8.1},"follows":120,"comments":{"repliesCount":7}}}}"#,
        )
        .unwrap();
        let s = &stats.statistics["m1"];
        assert_eq!(s.rating_label(), "8.46");
        assert_eq!(s.follows(), 120);
        assert_eq!(s.comment_count(), 7);
        assert_eq!(MangaStatistics::default().rating_label(), "N/A");
    }

    #[test]
    fn test_error_body_message_prefers_detail() {
        let body: ApiErrorBody = serde_json::from_str(
            r#"{"result":"error","errors":[{"status":404,"title":"Not found","detail":"Manga not found"}]}"#,
        )
        .unwrap();
        assert_eq!(body.message().as_deref(), Some("Manga not found"));
    }
}
