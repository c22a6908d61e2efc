//! Tests for the page transformer

use std::fs;
use std::path::{Path, PathBuf};

use encoding_rs::WINDOWS_1251;
use tempfile::{tempdir, TempDir};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;
use crate::app::client::ClientConfig;

fn transformer() -> PageTransformer {
    let fetcher = AssetFetcher::new(&ClientConfig::default(), false).unwrap();
    PageTransformer::new(fetcher, PageConfig::default())
}

/// Writes a page encoded the way the exporter encodes it
fn write_page(dir: &TempDir, body: &str) -> PathBuf {
    let page_dir = dir.path().join("messages").join("2000000001");
    fs::create_dir_all(&page_dir).unwrap();
    let page = page_dir.join("messages0.html");
    let html = format!(
        r#"<html><head><meta http-equiv="Content-Type" content="text/html; charset=windows-1251"></head><body><div class="item">{}</div></body></html>"#,
        body
    );
    let (bytes, _, _) = WINDOWS_1251.encode(&html);
    fs::write(&page, bytes).unwrap();
    page
}

fn attachment(href: &str) -> String {
    format!(
        r#"<div class="attachment"><div class="attachment__description">Фотография</div><a class="attachment__link" href="{}">{}</a></div>"#,
        href, href
    )
}

async fn serve_image(server: &MockServer, image_path: &str) {
    Mock::given(method("GET"))
        .and(path(image_path))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"\x89PNG-ish".to_vec()))
        .mount(server)
        .await;
}

async fn serve_status(server: &MockServer, image_path: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(image_path))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

fn read_utf8(path: &Path) -> String {
    String::from_utf8(fs::read(path).unwrap()).unwrap()
}

#[tokio::test]
async fn test_page_without_links_is_untouched() {
    let dir = tempdir().unwrap();
    let page = write_page(&dir, "<p>Привет, как дела?</p>");
    let original = fs::read(&page).unwrap();

    let report = transformer().transform(&page).await.unwrap();

    assert_eq!(report.links_found, 0);
    assert!(!report.rewritten);
    assert_eq!(fs::read(&page).unwrap(), original);
    assert!(!transformer().backup_path(&page).exists());
}

#[tokio::test]
async fn test_page_with_only_non_image_links_is_untouched() {
    let server = MockServer::start().await;
    let dir = tempdir().unwrap();
    let body = format!(
        "{}{}",
        attachment(&format!("{}/doc/report.pdf", server.uri())),
        attachment("https://vk.com/wall-1_2")
    );
    let page = write_page(&dir, &body);
    let original = fs::read(&page).unwrap();

    let report = transformer().transform(&page).await.unwrap();

    assert_eq!(report.links_found, 2);
    assert_eq!(report.image_links, 0);
    assert!(!report.rewritten);
    assert_eq!(fs::read(&page).unwrap(), original);
    assert!(!transformer().backup_path(&page).exists());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_image_link_is_embedded_and_original_backed_up() {
    let server = MockServer::start().await;
    serve_image(&server, "/img/cat.jpg").await;

    let dir = tempdir().unwrap();
    let href = format!("{}/img/cat.jpg", server.uri());
    let page = write_page(&dir, &attachment(&href));
    let original = fs::read(&page).unwrap();

    let report = transformer().transform(&page).await.unwrap();

    assert_eq!(report.image_links, 1);
    assert_eq!(report.embedded, 1);
    assert!(report.rewritten);

    let backup = transformer().backup_path(&page);
    assert_eq!(report.backup.as_deref(), Some(backup.as_path()));
    assert!(backup.to_string_lossy().ends_with("messages0.html~"));
    assert_eq!(fs::read(&backup).unwrap(), original);

    let image = page.parent().unwrap().join("img_cat.jpg");
    assert_eq!(fs::read(image).unwrap(), b"\x89PNG-ish");

    let html = read_utf8(&page);
    let expected = format!(
        r#"<a class="attachment__link" href="{href}">{href}</a><img class="attachment__local" src="img_cat.jpg">"#
    );
    assert!(html.contains(&expected), "unexpected page: {}", html);
    assert!(html.contains("Фотография"));
    assert!(html.contains("charset=utf-8"));
}

#[tokio::test]
async fn test_not_found_annotates_and_keeps_link() {
    let server = MockServer::start().await;
    serve_status(&server, "/img/gone.png", 404).await;

    let dir = tempdir().unwrap();
    let href = format!("{}/img/gone.png", server.uri());
    let page = write_page(&dir, &attachment(&href));

    let report = transformer().transform(&page).await.unwrap();

    assert_eq!(report.embedded, 0);
    assert_eq!(report.failed, 1);
    assert_eq!(report.annotated, 1);
    assert!(report.rewritten);
    assert!(!page.parent().unwrap().join("img_gone.png").exists());

    let html = read_utf8(&page);
    assert_eq!(html.matches("Couldn't download on").count(), 1);
    assert_eq!(html.matches("attachment__missing").count(), 1);
    assert!(html.contains(&format!(r#"<a class="attachment__link" href="{href}">"#)));
    assert!(!html.contains("attachment__local"));
}

#[tokio::test]
async fn test_unreachable_host_annotates_and_continues() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let dir = tempdir().unwrap();
    let href = format!("http://127.0.0.1:{}/img/cat.jpg", port);
    let page = write_page(&dir, &attachment(&href));

    let report = transformer().transform(&page).await.unwrap();

    assert_eq!(report.image_links, 1);
    assert_eq!(report.embedded, 0);
    assert_eq!(report.failed, 1);
    assert_eq!(report.annotated, 1);
    assert!(report.rewritten);
    assert!(!page.parent().unwrap().join("img_cat.jpg").exists());

    let html = read_utf8(&page);
    assert_eq!(html.matches("attachment__missing").count(), 1);
    assert!(html.contains(&href));
}

#[tokio::test]
async fn test_mixed_outcomes_in_one_page() {
    let server = MockServer::start().await;
    serve_image(&server, "/a.png").await;
    serve_status(&server, "/b.gif", 500).await;
    serve_image(&server, "/c/d.WEBP").await;

    let dir = tempdir().unwrap();
    let body = format!(
        "{}{}{}{}",
        attachment(&format!("{}/a.png?size=10x10", server.uri())),
        attachment(&format!("{}/b.gif", server.uri())),
        attachment(&format!("{}/song.mp3", server.uri())),
        attachment(&format!("{}/c/d.WEBP", server.uri())),
    );
    let page = write_page(&dir, &body);

    let report = transformer().transform(&page).await.unwrap();

    assert_eq!(report.links_found, 4);
    assert_eq!(report.image_links, 3);
    assert_eq!(report.embedded, 2);
    assert_eq!(report.failed, 1);

    let html = read_utf8(&page);
    assert!(html.contains(r#"src="a.10x10.png""#));
    assert!(html.contains(r#"src="c_d.WEBP""#));
    assert_eq!(html.matches("attachment__missing").count(), 1);
}

#[tokio::test]
async fn test_second_pass_changes_nothing() {
    let server = MockServer::start().await;
    serve_image(&server, "/img/cat.jpg").await;

    let dir = tempdir().unwrap();
    let page = write_page(&dir, &attachment(&format!("{}/img/cat.jpg", server.uri())));
    let original = fs::read(&page).unwrap();

    transformer().transform(&page).await.unwrap();
    let rewritten = fs::read(&page).unwrap();

    let report = transformer().transform(&page).await.unwrap();

    assert_eq!(report.skipped, 1);
    assert_eq!(report.embedded, 0);
    assert!(!report.rewritten);
    assert_eq!(fs::read(&page).unwrap(), rewritten);
    assert_eq!(fs::read(transformer().backup_path(&page)).unwrap(), original);
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_retry_replaces_note_and_keeps_first_backup() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/img/late.png"))
        .respond_with(ResponseTemplate::new(404))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    serve_image(&server, "/img/late.png").await;

    let dir = tempdir().unwrap();
    let page = write_page(&dir, &attachment(&format!("{}/img/late.png", server.uri())));
    let original = fs::read(&page).unwrap();

    let first = transformer().transform(&page).await.unwrap();
    assert_eq!(first.annotated, 1);

    let second = transformer().transform(&page).await.unwrap();
    assert_eq!(second.embedded, 1);
    assert!(second.rewritten);
    assert!(second.backup.is_none());

    let html = read_utf8(&page);
    assert!(!html.contains("attachment__missing"));
    assert_eq!(html.matches("attachment__local").count(), 1);
    assert_eq!(fs::read(transformer().backup_path(&page)).unwrap(), original);
}

#[tokio::test]
async fn test_repeated_failure_keeps_single_note() {
    let server = MockServer::start().await;
    serve_status(&server, "/img/gone.png", 404).await;

    let dir = tempdir().unwrap();
    let page = write_page(&dir, &attachment(&format!("{}/img/gone.png", server.uri())));

    transformer().transform(&page).await.unwrap();
    let after_first = fs::read(&page).unwrap();

    let report = transformer().transform(&page).await.unwrap();

    assert_eq!(report.failed, 1);
    assert_eq!(report.annotated, 0);
    assert!(!report.rewritten);
    assert_eq!(fs::read(&page).unwrap(), after_first);
}

#[tokio::test]
async fn test_filename_failure_is_fatal_and_page_untouched() {
    let server = MockServer::start().await;
    serve_image(&server, "/.png").await;

    let dir = tempdir().unwrap();
    let page = write_page(&dir, &attachment(&format!("{}/.png", server.uri())));
    let original = fs::read(&page).unwrap();

    let result = transformer().transform(&page).await;

    match result {
        Err(PageError::Fetch { source, .. }) => assert!(!source.is_recoverable()),
        other => panic!("Expected PageError::Fetch, got {:?}", other),
    }
    assert_eq!(fs::read(&page).unwrap(), original);
    assert!(!transformer().backup_path(&page).exists());
}

#[tokio::test]
async fn test_missing_page_is_read_error() {
    let dir = tempdir().unwrap();
    let result = transformer().transform(&dir.path().join("nope.html")).await;
    assert!(matches!(result, Err(PageError::Read { .. })));
}

#[tokio::test]
async fn test_failed_backup_rename_still_writes_page() {
    let dir = tempdir().unwrap();
    let page = dir.path().join("messages0.html");
    fs::write(&page, "<html>old</html>").unwrap();
    let backup = dir.path().join("messages0.html~");

    let mut report = PageReport::default();
    let renamed = Err(std::io::Error::new(
        std::io::ErrorKind::PermissionDenied,
        "denied",
    ));
    replace_page(&page, backup.clone(), Some(renamed), b"<html>new</html>", &mut report)
        .await
        .unwrap();

    assert!(report.rewritten);
    assert!(report.backup.is_none());
    assert!(!backup.exists());
    assert_eq!(read_utf8(&page), "<html>new</html>");
}

#[tokio::test]
async fn test_page_left_only_as_backup_is_rewritten() {
    let server = MockServer::start().await;
    serve_image(&server, "/img/cat.jpg").await;

    let dir = tempdir().unwrap();
    let page = write_page(&dir, &attachment(&format!("{}/img/cat.jpg", server.uri())));
    let original = fs::read(&page).unwrap();
    let backup = transformer().backup_path(&page);
    fs::rename(&page, &backup).unwrap();

    let report = transformer().transform(&page).await.unwrap();

    assert_eq!(report.embedded, 1);
    assert!(report.rewritten);
    assert!(report.backup.is_none());
    assert_eq!(fs::read(&backup).unwrap(), original);
    assert!(read_utf8(&page).contains("attachment__local"));
}

#[tokio::test]
async fn test_page_without_links_is_restored_from_backup() {
    let dir = tempdir().unwrap();
    let page = write_page(&dir, "<p>nothing attached</p>");
    let original = fs::read(&page).unwrap();
    let backup = transformer().backup_path(&page);
    fs::rename(&page, &backup).unwrap();

    let report = transformer().transform(&page).await.unwrap();

    assert!(!report.rewritten);
    assert_eq!(fs::read(&page).unwrap(), original);
    assert_eq!(fs::read(&backup).unwrap(), original);
}
