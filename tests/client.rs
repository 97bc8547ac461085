//! Client and job behavior against a local stub of the catalog API

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use shiori::config::Config;
use shiori::error::ApiError;
use shiori::network::cancel::{cancel_pair, CancelToken};
use shiori::network::feeds;
use shiori::network::MangaClient;

/// Serves one canned JSON response per request, chosen by `handler(path, query)`.
/// A status of 0 keeps the connection open without answering.
async fn serve<F>(handler: F) -> String
where
    F: Fn(&str, &str) -> (u16, Value) + Send + Sync + 'static,
{
    let handler = Arc::new(handler);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let handler = Arc::clone(&handler);
            tokio::spawn(async move {
                let mut buf = Vec::new();
                let mut chunk = [0u8; 4096];
                while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut chunk).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => buf.extend_from_slice(&chunk[..n]),
                    }
                }

                let head = String::from_utf8_lossy(&buf).to_string();
                let target = head.split_whitespace().nth(1).unwrap_or("/").to_string();
                let (path, query) = target.split_once('?').unwrap_or((target.as_str(), ""));
                let query = query.replace("%5B", "[").replace("%5D", "]");

                let (status, body) = handler(path, &query);
                if status == 0 {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    return;
                }
                let body = body.to_string();
                let response = format!(
                    "HTTP/1.1 {} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    format!("http://{}", addr)
}

fn client_for(base: &str, max_concurrency: usize) -> MangaClient {
    let config = Config {
        api_base_url: base.to_string(),
        max_concurrency,
        timeout_secs: 5,
        ..Config::default()
    };
    MangaClient::new(&config).unwrap()
}

fn chapter_json(id: &str, number: Option<&str>, day: u32, lang: &str, manga: &str) -> Value {
    json!({
        "id": id,
        "type": "chapter",
        "attributes": {
            "chapter": number,
            "title": null,
            "publishAt": format!("2024-01-{:02}T12:00:00+00:00", day),
            "translatedLanguage": lang,
            "pages": 10
        },
        "relationships": [
            { "id": manga, "type": "manga" },
            { "id": "g1", "type": "scanlation_group", "attributes": { "name": "Group" } }
        ]
    })
}

fn manga_json(id: &str, title: &str) -> Value {
    json!({
        "id": id,
        "type": "manga",
        "attributes": {
            "title": { "en": title },
            "description": [],
            "status": "ongoing",
            "tags": []
        },
        "relationships": [
            { "id": "c1", "type": "cover_art", "attributes": { "fileName": "cover.png" } }
        ]
    })
}

fn list(data: Vec<Value>) -> Value {
    let total = data.len();
    json!({ "result": "ok", "response": "collection", "data": data, "limit": total, "offset": 0, "total": total })
}

#[tokio::test]
async fn test_not_found_uses_error_detail() {
    let base = serve(|_, _| {
        (
            404,
            json!({
                "result": "error",
                "errors": [{ "status": 404, "title": "Not Found", "detail": "Manga with id x not found" }]
            }),
        )
    })
    .await;
    let client = client_for(&base, 5);

    let err = client
        .get_manga("x", &["cover_art"], &CancelToken::never())
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "Not found: Manga with id x not found");
}

#[tokio::test]
async fn test_server_error_keeps_status() {
    let base = serve(|_, _| (503, json!({ "result": "error", "errors": [] }))).await;
    let client = client_for(&base, 5);

    let err = client
        .manga_statistics("m1", &CancelToken::never())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Api { status: 503, .. }));
}

#[tokio::test]
async fn test_chapter_list_dedupes_and_sorts() {
    let base = serve(|path, query| {
        assert_eq!(path, "/manga/m1/feed");
        assert!(query.contains("translatedLanguage[]=pt-br"));
        assert!(query.contains("order[chapter]=desc"));
        (
            200,
            list(vec![
                chapter_json("a", Some("9"), 1, "pt-br", "m1"),
                chapter_json("b", Some("10"), 2, "pt-br", "m1"),
                chapter_json("c", Some("9"), 5, "pt-br", "m1"),
                chapter_json("d", Some("11"), 3, "en", "m1"),
                chapter_json("e", None, 4, "pt-br", "m1"),
            ]),
        )
    })
    .await;
    let client = client_for(&base, 5);

    let chapters = feeds::chapter_list(&client, "m1", &CancelToken::never())
        .await
        .unwrap();
    let ids: Vec<&str> = chapters.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["b", "c", "e"]);
}

#[tokio::test]
async fn test_failed_preview_leaves_manga_without_chapters() {
    let base = serve(|path, _| match path {
        "/manga" => (
            200,
            list(vec![manga_json("m1", "One"), manga_json("m2", "Two"), manga_json("m3", "Three")]),
        ),
        "/manga/m2/feed" => (500, json!({ "result": "error", "errors": [] })),
        p if p.ends_with("/feed") => {
            let manga = p.trim_start_matches("/manga/").trim_end_matches("/feed").to_string();
            (
                200,
                list(vec![
                    chapter_json(&format!("{}-2", manga), Some("2"), 2, "pt-br", &manga),
                    chapter_json(&format!("{}-1", manga), Some("1"), 1, "pt-br", &manga),
                ]),
            )
        }
        _ => (404, json!({ "result": "error", "errors": [] })),
    })
    .await;
    let client = client_for(&base, 2);

    let listing = feeds::latest_updates(&client, 3, &CancelToken::never())
        .await
        .unwrap();
    let ids: Vec<&str> = listing.iter().map(|e| e.manga.id.as_str()).collect();
    assert_eq!(ids, vec!["m1", "m2", "m3"]);
    assert_eq!(listing[0].chapters.len(), 2);
    assert!(listing[1].chapters.is_empty());
    assert_eq!(listing[2].chapters[0].id, "m3-2");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_fan_out_respects_concurrency_limit() {
    let in_flight = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    // The handler is synchronous, so count with a short blocking window per feed
    let (f, p) = (Arc::clone(&in_flight), Arc::clone(&peak));
    let base = serve(move |path, _| {
        if path == "/manga" {
            let mangas = (0..6).map(|i| manga_json(&format!("m{}", i), "T")).collect();
            return (200, list(mangas));
        }
        let now = f.fetch_add(1, Ordering::SeqCst) + 1;
        p.fetch_max(now, Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(30));
        f.fetch_sub(1, Ordering::SeqCst);
        (200, list(Vec::new()))
    })
    .await;
    let client = client_for(&base, 2);

    let listing = feeds::latest_updates(&client, 6, &CancelToken::never())
        .await
        .unwrap();
    assert_eq!(listing.len(), 6);
    assert!(peak.load(Ordering::SeqCst) <= 2);
}

#[tokio::test]
async fn test_timeline_groups_recent_chapters() {
    let base = serve(|path, query| match path {
        "/chapter" => {
            assert!(query.contains("order[publishAt]=desc"));
            let mut chapters: Vec<Value> = (0..7)
                .map(|i| chapter_json(&format!("a{}", i), Some("1"), 20 - i, "pt-br", "A"))
                .collect();
            chapters.insert(2, chapter_json("b0", Some("3"), 19, "pt-br", "B"));
            (200, list(chapters))
        }
        "/manga" => {
            assert!(query.contains("ids[]=A"));
            assert!(query.contains("ids[]=B"));
            (200, list(vec![manga_json("B", "Bee"), manga_json("A", "Ay")]))
        }
        _ => (404, json!({ "result": "error", "errors": [] })),
    })
    .await;
    let client = client_for(&base, 5);

    let timeline = feeds::recent_timeline(&client, 100, 10, &CancelToken::never())
        .await
        .unwrap();
    assert_eq!(timeline.len(), 2);
    assert_eq!(timeline[0].manga.id, "B");
    assert_eq!(timeline[0].chapters.len(), 1);
    assert_eq!(timeline[1].chapters.len(), 5);
}

#[tokio::test]
async fn test_chapter_view_survives_missing_neighbors() {
    let base = serve(|path, _| match path {
        "/chapter/c1" => (200, json!({ "result": "ok", "data": chapter_json("c1", Some("1"), 1, "pt-br", "m1") })),
        "/at-home/server/c1" => (
            200,
            json!({
                "result": "ok",
                "baseUrl": "https://cdn.test",
                "chapter": { "hash": "h", "data": ["1.png", "2.png"], "dataSaver": ["1.jpg", "2.jpg"] }
            }),
        ),
        _ => (500, json!({ "result": "error", "errors": [{ "title": "boom" }] })),
    })
    .await;
    let client = client_for(&base, 5);

    let view = feeds::chapter_view(&client, "c1", None, &CancelToken::never())
        .await
        .unwrap();
    assert_eq!(view.pages.len(), 2);
    assert!(view.adjacent.prev.is_none());
    assert!(view.adjacent.next.is_none());
}

#[tokio::test]
async fn test_cancelled_request_returns_promptly() {
    let base = serve(|_, _| (0, Value::Null)).await;
    let client = client_for(&base, 5);
    let (handle, token) = cancel_pair();

    let request = tokio::spawn(async move { feeds::chapter_list(&client, "m1", &token).await });
    tokio::time::sleep(Duration::from_millis(50)).await;
    handle.cancel();

    let result = tokio::time::timeout(Duration::from_secs(2), request)
        .await
        .expect("cancel did not abort the request")
        .unwrap();
    assert!(matches!(result, Err(ApiError::Cancelled)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_manga_details_without_statistics() {
    let in_flight = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let (f, p) = (Arc::clone(&in_flight), Arc::clone(&peak));
    let base = serve(move |path, _| {
        let now = f.fetch_add(1, Ordering::SeqCst) + 1;
        p.fetch_max(now, Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(100));
        f.fetch_sub(1, Ordering::SeqCst);

        match path {
            "/manga/m1" => (200, json!({ "result": "ok", "data": manga_json("m1", "One") })),
            "/manga/m1/feed" => (
                200,
                list(vec![
                    chapter_json("a", Some("2"), 2, "pt-br", "m1"),
                    chapter_json("b", Some("1"), 1, "pt-br", "m1"),
                ]),
            ),
            _ => (500, json!({ "result": "error", "errors": [{ "detail": "stats down" }] })),
        }
    })
    .await;
    let client = client_for(&base, 5);

    let details = feeds::manga_details(&client, "m1", &CancelToken::never())
        .await
        .unwrap();
    assert_eq!(details.manga.display_title("pt-br"), "One");
    assert_eq!(details.chapters.len(), 2);
    assert!(details.statistics.is_none());
    // metadata, feed and statistics are requested together
    assert!(peak.load(Ordering::SeqCst) >= 2);
}

#[tokio::test]
async fn test_popular_drops_manga_without_chapters() {
    let base = serve(|path, query| match path {
        "/manga" => {
            assert!(query.contains("order[followedCount]=desc"));
            assert!(query.contains("contentRating[]=safe"));
            assert!(query.contains("contentRating[]=suggestive"));
            assert!(!query.contains("contentRating[]=erotica"));
            // more than asked for, to check the cap
            (
                200,
                list((1..=4).map(|i| manga_json(&format!("m{}", i), "T")).collect()),
            )
        }
        "/manga/m2/feed" => (200, list(Vec::new())),
        p if p.ends_with("/feed") => {
            let manga = p.trim_start_matches("/manga/").trim_end_matches("/feed").to_string();
            (200, list(vec![chapter_json(&format!("{}-1", manga), Some("1"), 1, "pt-br", &manga)]))
        }
        _ => (404, json!({ "result": "error", "errors": [] })),
    })
    .await;
    let client = client_for(&base, 5);

    let popular = feeds::popular(&client, 2, &CancelToken::never())
        .await
        .unwrap();
    let ids: Vec<&str> = popular.iter().map(|e| e.manga.id.as_str()).collect();
    assert_eq!(ids, vec!["m1", "m3"]);
}

#[tokio::test]
async fn test_search_titles_queries_by_relevance() {
    let base = serve(|path, query| match path {
        "/manga" => {
            assert!(query.contains("title=Berserk"));
            assert!(query.contains("order[relevance]=desc"));
            assert!(query.contains("limit=25"));
            assert!(query.contains("availableTranslatedLanguage[]=pt-br"));
            (200, list(vec![manga_json("m1", "Berserk")]))
        }
        _ => (200, list(Vec::new())),
    })
    .await;
    let client = client_for(&base, 5);

    let found = feeds::search_titles(&client, "  Berserk ", &CancelToken::never())
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].manga.id, "m1");
}

#[tokio::test]
async fn test_blank_search_sends_no_request() {
    let requests = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&requests);
    let base = serve(move |_, _| {
        seen.fetch_add(1, Ordering::SeqCst);
        (200, list(Vec::new()))
    })
    .await;
    let client = client_for(&base, 5);

    let found = feeds::search_titles(&client, "   ", &CancelToken::never())
        .await
        .unwrap();
    assert!(found.is_empty());
    assert_eq!(requests.load(Ordering::SeqCst), 0);
}
