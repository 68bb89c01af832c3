//! End-to-end scans against a mocked Dropbox API.

use std::sync::Mutex;

use chrono::{TimeZone, Utc};
use futures::StreamExt;
use mockito::{Matcher, Mock, Server};
use music_page::error::DropboxError;
use music_page::{
    collect_records, record_stream, render_page, sort_newest_first, AccessToken, DropboxClient,
    LinkResolver, OutputRecord,
};
use serde_json::json;

fn client(server: &Server) -> DropboxClient {
    DropboxClient::with_base_url(reqwest::Client::new(), AccessToken::new("tok"), server.url())
}

fn file(name: &str, size: u64, modified: &str) -> serde_json::Value {
    json!({
        ".tag": "file",
        "id": format!("id:{}", name),
        "name": name,
        "path_lower": format!("/{}", name.to_lowercase()),
        "size": size,
        "client_modified": modified
    })
}

async fn existing_links(server: &mut Server, path: &str, urls: &[&str]) -> Mock {
    let links: Vec<_> = urls.iter().map(|u| json!({"url": u})).collect();
    server
        .mock("POST", "/sharing/list_shared_links")
        .match_body(Matcher::PartialJson(json!({"path": path})))
        .with_status(200)
        .with_body(json!({"links": links}).to_string())
        .create_async()
        .await
}

#[tokio::test]
async fn test_single_audio_file_is_linked() {
    let mut server = Server::new_async().await;
    let _list = server
        .mock("POST", "/files/list_folder")
        .with_status(200)
        .with_body(
            json!({
                "entries": [
                    file("song.mp3", 1048576, "2024-03-01T10:00:00Z"),
                    {".tag": "folder", "name": "sub", "path_lower": "/sub"},
                    file("notes.txt", 12, "2024-03-02T10:00:00Z")
                ],
                "has_more": false
            })
            .to_string(),
        )
        .create_async()
        .await;
    let _links = existing_links(&mut server, "/song.mp3", &["https://x/s?dl=0"]).await;
    let create = server
        .mock("POST", "/sharing/create_shared_link_with_settings")
        .expect(0)
        .create_async()
        .await;

    let records = collect_records(&client(&server), &LinkResolver::default(), "", None)
        .await
        .unwrap();

    assert_eq!(
        records,
        vec![OutputRecord {
            name: "song.mp3".to_string(),
            url: "https://x/s?dl=0".to_string(),
            size: 1048576,
            modified: Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap(),
        }]
    );
    create.assert_async().await;
}

#[tokio::test]
async fn test_unlinkable_file_is_skipped_with_notice() {
    let mut server = Server::new_async().await;
    let _list = server
        .mock("POST", "/files/list_folder")
        .with_status(200)
        .with_body(
            json!({
                "entries": [
                    file("broken.mp3", 10, "2024-03-01T10:00:00Z"),
                    file("Good.FLAC", 20, "2024-03-02T10:00:00Z")
                ],
                "has_more": false
            })
            .to_string(),
        )
        .create_async()
        .await;
    let _links = existing_links(&mut server, "/broken.mp3", &[]).await;
    let _links = existing_links(&mut server, "/good.flac", &[]).await;
    let _create = server
        .mock("POST", "/sharing/create_shared_link_with_settings")
        .match_body(Matcher::PartialJson(json!({"path": "/broken.mp3"})))
        .with_status(409)
        .with_body(json!({"error_summary": "shared_link_already_exists/"}).to_string())
        .create_async()
        .await;
    let _create = server
        .mock("POST", "/sharing/create_shared_link_with_settings")
        .match_body(Matcher::PartialJson(json!({"path": "/good.flac"})))
        .with_status(200)
        .with_body(json!({"url": "https://www.dropbox.com/s/g/Good.FLAC?dl=1"}).to_string())
        .create_async()
        .await;

    let notices = Mutex::new(Vec::new());
    let on_skip: &(dyn Fn(&str) + Send + Sync) =
        &|message: &str| notices.lock().unwrap().push(message.to_string());

    let records = collect_records(
        &client(&server),
        &LinkResolver::default(),
        "",
        Some(on_skip),
    )
    .await
    .unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "Good.FLAC");
    assert_eq!(records[0].url, "https://www.dropbox.com/s/g/Good.FLAC?dl=0");

    let notices = notices.into_inner().unwrap();
    assert_eq!(notices.len(), 1);
    assert!(notices[0].contains("broken.mp3"));
}

#[tokio::test]
async fn test_lookup_error_falls_back_to_create() {
    let mut server = Server::new_async().await;
    let _list = server
        .mock("POST", "/files/list_folder")
        .with_status(200)
        .with_body(json!({"entries": [file("a.wav", 5, "2024-03-01T10:00:00Z")], "has_more": false}).to_string())
        .create_async()
        .await;
    let _links = server
        .mock("POST", "/sharing/list_shared_links")
        .with_status(429)
        .with_body("too_many_requests")
        .create_async()
        .await;
    let create = server
        .mock("POST", "/sharing/create_shared_link_with_settings")
        .with_status(200)
        .with_body(json!({"url": "https://x/a"}).to_string())
        .expect(1)
        .create_async()
        .await;

    let records = collect_records(&client(&server), &LinkResolver::default(), "", None)
        .await
        .unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].url, "https://x/a?dl=0");
    create.assert_async().await;
}

#[tokio::test]
async fn test_records_across_pages_then_failure() {
    let mut server = Server::new_async().await;
    let _list = server
        .mock("POST", "/files/list_folder")
        .with_status(200)
        .with_body(
            json!({"entries": [file("one.mp3", 1, "2024-03-01T10:00:00Z")],
                   "has_more": true, "cursor": "c1"})
            .to_string(),
        )
        .create_async()
        .await;
    let _continue = server
        .mock("POST", "/files/list_folder/continue")
        .with_status(503)
        .with_body("unavailable")
        .create_async()
        .await;
    let _links = existing_links(&mut server, "/one.mp3", &["https://x/1"]).await;

    let client = client(&server);
    let resolver = LinkResolver::default();
    let items: Vec<_> = record_stream(&client, &resolver, "", None).collect().await;

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].as_ref().unwrap().name, "one.mp3");
    assert!(matches!(
        items[1],
        Err(DropboxError::EnumerationFailed { status: 503, .. })
    ));

    let err = collect_records(&client, &resolver, "", None).await.unwrap_err();
    assert!(matches!(err, DropboxError::EnumerationFailed { status: 503, .. }));
}

#[tokio::test]
async fn test_sorted_records_render_newest_first() {
    let mut server = Server::new_async().await;
    let _list = server
        .mock("POST", "/files/list_folder")
        .with_status(200)
        .with_body(
            json!({
                "entries": [
                    file("older.mp3", 1, "2023-01-01T00:00:00Z"),
                    file("newer.m4a", 2, "2024-01-01T00:00:00Z")
                ],
                "has_more": false
            })
            .to_string(),
        )
        .create_async()
        .await;
    let _links = existing_links(&mut server, "/older.mp3", &["https://x/old?dl=1"]).await;
    let _links = existing_links(&mut server, "/newer.m4a", &["https://x/new"]).await;

    let mut records = collect_records(&client(&server), &LinkResolver::default(), "", None)
        .await
        .unwrap();
    assert_eq!(records[0].name, "older.mp3");

    sort_newest_first(&mut records);
    let html = render_page(&records, "Music", None, Utc::now());

    assert!(html.find("newer.m4a").unwrap() < html.find("older.mp3").unwrap());
    assert!(html.contains("https://x/old?dl=0"));
}
