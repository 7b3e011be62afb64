//! Client behaviour against a local mock of the Data API.

use serde_json::{Value, json};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};
use youtube_stats::{MAX_RESULTS, YoutubeClient, YoutubeError};

fn client(server: &MockServer) -> YoutubeClient {
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
    YoutubeClient::new("test-key", reqwest::Client::new())
        .with_base_url(&server.uri())
        .unwrap()
}

fn playlist_item(id: &str, title: &str) -> Value {
    json!({
        "snippet": { "title": title },
        "contentDetails": { "videoId": id }
    })
}

/// Answers `videos?id=a,b,...` with 10 views for every requested id.
struct EchoViews;

impl Respond for EchoViews {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let ids = request
            .url
            .query_pairs()
            .find(|(k, _)| k == "id")
            .map(|(_, v)| v.into_owned())
            .unwrap_or_default();
        let items: Vec<Value> = ids
            .split(',')
            .filter(|id| !id.is_empty())
            .map(|id| json!({ "id": id, "statistics": { "viewCount": "10" } }))
            .collect();
        ResponseTemplate::new(200).set_body_json(json!({ "items": items }))
    }
}

#[tokio::test]
async fn channel_statistics_parses_counts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/channels"))
        .and(query_param("id", "UC1"))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{
                "id": "UC1",
                "statistics": {
                    "subscriberCount": "1234",
                    "viewCount": "99000",
                    "videoCount": "12",
                    "hiddenSubscriberCount": false
                }
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let stats = client(&server).channel_statistics("UC1").await.unwrap();
    assert_eq!(stats.subscriber_count, 1234);
    assert_eq!(stats.view_count, 99000);
}

#[tokio::test]
async fn channel_without_items_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/channels"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
        .mount(&server)
        .await;

    let result = client(&server).channel_statistics("UCgone").await;
    assert!(matches!(result, Err(YoutubeError::ChannelNotFound(id)) if id == "UCgone"));
}

#[tokio::test]
async fn error_body_becomes_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/channels"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": { "code": 403, "message": "The request cannot be completed because you have exceeded your quota." }
        })))
        .mount(&server)
        .await;

    match client(&server).channel_statistics("UC1").await {
        Err(YoutubeError::Api { status, message }) => {
            assert_eq!(status, 403);
            assert!(message.contains("exceeded your quota"));
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn playlist_items_follows_page_tokens() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/playlistItems"))
        .and(query_param("pageToken", "page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [playlist_item("c", "Sea")]
        })))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/playlistItems"))
        .and(query_param("playlistId", "PL1"))
        .and(query_param("maxResults", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [playlist_item("a", "Ay"), playlist_item("b", "Bee")],
            "nextPageToken": "page-2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let items = client(&server).playlist_items("PL1").await.unwrap();
    let ids: Vec<&str> = items.iter().map(|i| i.video_id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
    assert_eq!(items[2].title, "Sea");
}

#[tokio::test]
async fn missing_playlist_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/playlistItems"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": { "code": 404, "message": "The playlist identified with the request's playlistId parameter cannot be found." }
        })))
        .mount(&server)
        .await;

    let result = client(&server).playlist_items("PLgone").await;
    assert!(matches!(result, Err(YoutubeError::PlaylistNotFound(id)) if id == "PLgone"));
}

#[tokio::test]
async fn video_view_counts_are_batched() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/videos"))
        .respond_with(EchoViews)
        .expect(2)
        .mount(&server)
        .await;

    let ids: Vec<String> = (0..=MAX_RESULTS).map(|i| format!("v{i}")).collect();
    let counts = client(&server).video_view_counts(&ids).await.unwrap();

    assert_eq!(counts.len(), MAX_RESULTS + 1);
    assert!(counts.values().all(|views| *views == 10));

    let requests = server.received_requests().await.unwrap();
    let batch_sizes: Vec<usize> = requests
        .iter()
        .map(|r| {
            r.url
                .query_pairs()
                .find(|(k, _)| k == "id")
                .map(|(_, v)| v.split(',').count())
                .unwrap_or(0)
        })
        .collect();
    assert_eq!(batch_sizes, vec![MAX_RESULTS, 1]);
}
