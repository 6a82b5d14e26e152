mod common;

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tarnish_common::Source;
use tarnish_search::{
    dedup, dispatch, expand_queries, Search1ApiBackend, SearchBackend, TikTokBackend,
};
use wiremock::matchers::{body_json, body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn s1(server: &MockServer, service: &str) -> Search1ApiBackend {
    Search1ApiBackend::new(&server.uri(), "s1-key", service, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn search1api_posts_the_documented_body() {
    common::init_test_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .and(header("authorization", "Bearer s1-key"))
        .and(body_json(json!({
            "query": "Acme Scam",
            "search_service": "reddit",
            "max_results": 20,
            "crawl_results": 0,
            "image": false,
            "language": ""
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                { "link": "https://reddit.com/r/a", "title": "Acme is a scam?", "snippet": "Never again" },
                { "link": "https://reddit.com/r/b", "title": "Acme refunds" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let results = s1(&server, "reddit").search("Acme Scam", 20).await.unwrap();
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.source == Source::Reddit));
    assert_eq!(results[1].snippet, "");
}

#[tokio::test]
async fn search1api_without_results_field_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let results = s1(&server, "google").search("Acme Scam", 20).await.unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn backend_failure_is_recorded_and_others_continue() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "search_service": "youtube" })))
        .respond_with(ResponseTemplate::new(503).set_body_string("down"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "search_service": "google" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{ "link": "https://a.test", "title": "t", "snippet": "s" }]
        })))
        .mount(&server)
        .await;

    let backends: Vec<Arc<dyn SearchBackend>> =
        vec![Arc::new(s1(&server, "youtube")), Arc::new(s1(&server, "google"))];
    let out = dispatch(&["Acme Scam".to_string()], &backends, 20).await;
    assert_eq!(out.results.len(), 1);
    assert_eq!(out.errors.len(), 1);
    assert!(out.errors[0].contains("search1api:youtube"));
}

#[tokio::test]
async fn tiktok_maps_videos_and_attaches_transcripts() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    let subtitle_url = format!("{}/subs/1.vtt", server.uri());

    Mock::given(method("POST"))
        .and(path("/acts/clockworks~tiktok-scraper/run-sync-get-dataset-items"))
        .and(header("authorization", "Bearer apify-token"))
        .and(body_partial_json(json!({
            "searchQueries": ["Acme Scam"],
            "resultsPerPage": 10,
            "searchSection": "/video"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": "1",
                "text": "x".repeat(250),
                "webVideoUrl": "https://www.tiktok.com/@a/video/1",
                "videoMeta": { "subtitleLinks": [
                    { "language": "eng-US", "downloadLink": subtitle_url }
                ]}
            },
            { "id": "2", "text": "no url here" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/subs/1.vtt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "WEBVTT\n\n00:00.000 --> 00:01.000\nAcme stole my money\n",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let backend = TikTokBackend::new(&server.uri(), "apify-token", Duration::from_secs(5)).unwrap();
    let results = backend.search("Acme Scam", 10).await.unwrap();

    assert_eq!(results.len(), 1);
    let video = &results[0];
    assert_eq!(video.source, Source::Tiktok);
    assert_eq!(video.snippet.chars().count(), 200);
    assert_eq!(video.title.chars().count(), 250);
    assert_eq!(video.transcript.as_deref(), Some("Acme stole my money"));
}

#[tokio::test]
async fn tiktok_transcripts_can_be_disabled() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "text": "clip",
            "webVideoUrl": "https://www.tiktok.com/@a/video/9",
            "videoMeta": { "subtitleLinks": [
                { "language": "eng-US", "downloadLink": format!("{}/subs/9.vtt", server.uri()) }
            ]}
        }])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("WEBVTT\n\n00:00.000 --> 00:01.000\nhi\n"))
        .expect(0)
        .mount(&server)
        .await;

    let backend = TikTokBackend::new(&server.uri(), "t", Duration::from_secs(5))
        .unwrap()
        .with_transcripts(false);
    let results = backend.search("Acme", 5).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].transcript, None);
}

#[tokio::test]
async fn acme_duplicate_urls_collapse_to_one_item() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                { "link": "https://acme.test/review", "title": "first", "snippet": "first" },
                { "link": "https://acme.test/review", "title": "second", "snippet": "second" }
            ]
        })))
        .mount(&server)
        .await;

    let queries = expand_queries("Acme", None, &["Scam".to_string()]);
    let backends: Vec<Arc<dyn SearchBackend>> = vec![Arc::new(s1(&server, "google"))];
    let out = dispatch(&queries, &backends, 20).await;
    let unique = dedup(&out.results);

    assert_eq!(out.results.len(), 2);
    assert_eq!(unique.len(), 1);
    assert_eq!(unique[0].snippet, "first");
}
