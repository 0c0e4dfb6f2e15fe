use std::fs;
use std::time::Duration;

use grabber_core::{AssetLink, DownloadStatus, FailureReason};
use grabber_engine::{FailureKind, FetchSettings, Fetcher, ReqwestFetcher, RetryPolicy};
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher(max_attempts: u32) -> ReqwestFetcher {
    let settings = FetchSettings {
        request_timeout: Duration::from_secs(5),
        retry: RetryPolicy {
            max_attempts,
            delay: Duration::ZERO,
        },
        ..FetchSettings::default()
    };
    ReqwestFetcher::new(settings).expect("client builds")
}

fn link(server: &MockServer, name: &str, extension_fallback: bool) -> AssetLink {
    AssetLink {
        url: format!("{}/w/{name}", server.uri()),
        file_name: name.to_string(),
        extension_fallback,
    }
}

#[tokio::test]
async fn jpg_guess_falls_back_to_png() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/w/1700000000001.jpg"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/w/1700000000001.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"png-bytes".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let outcome = fetcher(10)
        .fetch_asset(&link(&server, "1700000000001.jpg", true), dir.path(), false)
        .await;

    assert_eq!(outcome.status, DownloadStatus::Downloaded);
    assert_eq!(outcome.file_name, "1700000000001.png");
    assert_eq!(outcome.final_extension, ".png");
    assert_eq!(outcome.bytes_written, 9);
    assert_eq!(
        fs::read(dir.path().join("1700000000001.png")).unwrap(),
        b"png-bytes"
    );
    assert!(!dir.path().join("1700000000001.jpg").exists());
}

#[tokio::test]
async fn persistent_404_spends_exactly_the_attempt_budget() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/w/gone.png"))
        .respond_with(ResponseTemplate::new(404))
        .expect(10)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let outcome = fetcher(10)
        .fetch_asset(&link(&server, "gone.png", false), dir.path(), false)
        .await;

    assert_eq!(
        outcome.status,
        DownloadStatus::Failed(FailureReason::MaxRetriesExceeded)
    );
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn fallback_attempts_share_the_same_budget() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/w/42\.(jpg|png|webm|gif)$"))
        .respond_with(ResponseTemplate::new(404))
        .expect(4)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let outcome = fetcher(4)
        .fetch_asset(&link(&server, "42.jpg", true), dir.path(), false)
        .await;

    assert_eq!(
        outcome.status,
        DownloadStatus::Failed(FailureReason::MaxRetriesExceeded)
    );
    assert_eq!(outcome.file_name, "42.gif");
}

#[tokio::test]
async fn rate_limited_responses_are_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/w/busy.webm"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(2)
        .expect(2)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/w/busy.webm"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![7u8; 2048]))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let outcome = fetcher(10)
        .fetch_asset(&link(&server, "busy.webm", false), dir.path(), false)
        .await;

    assert_eq!(outcome.status, DownloadStatus::Downloaded);
    assert_eq!(outcome.bytes_written, 2048);
    assert_eq!(outcome.final_extension, ".webm");
}

#[tokio::test]
async fn other_statuses_fail_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/w/secret.png"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let outcome = fetcher(10)
        .fetch_asset(&link(&server, "secret.png", false), dir.path(), false)
        .await;

    assert_eq!(
        outcome.status,
        DownloadStatus::Failed(FailureReason::NonSuccessStatus(403))
    );
    assert!(!dir.path().join("secret.png").exists());
}

#[tokio::test]
async fn existing_file_is_skipped_without_a_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("fresh"))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("have.png"), "old").unwrap();
    let outcome = fetcher(10)
        .fetch_asset(&link(&server, "have.png", false), dir.path(), false)
        .await;

    assert_eq!(outcome.status, DownloadStatus::SkippedExisting);
    assert_eq!(fs::read_to_string(dir.path().join("have.png")).unwrap(), "old");
}

#[tokio::test]
async fn earlier_fallback_download_counts_as_existing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("77.gif"), "gif").unwrap();
    let outcome = fetcher(10)
        .fetch_asset(&link(&server, "77.jpg", true), dir.path(), false)
        .await;

    assert_eq!(outcome.status, DownloadStatus::SkippedExisting);
    assert_eq!(outcome.file_name, "77.gif");
}

#[tokio::test]
async fn force_refresh_overwrites_existing_file() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/w/have.png"))
        .respond_with(ResponseTemplate::new(200).set_body_string("fresh"))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("have.png"), "old").unwrap();
    let outcome = fetcher(10)
        .fetch_asset(&link(&server, "have.png", false), dir.path(), true)
        .await;

    assert_eq!(outcome.status, DownloadStatus::Downloaded);
    assert_eq!(
        fs::read_to_string(dir.path().join("have.png")).unwrap(),
        "fresh"
    );
}

#[tokio::test]
async fn unreachable_host_exhausts_retries() {
    // Port 9 (discard) is essentially never listening on a test machine.
    let link = AssetLink {
        url: "http://127.0.0.1:9/w/1.png".to_string(),
        file_name: "1.png".to_string(),
        extension_fallback: false,
    };
    let dir = TempDir::new().unwrap();
    let outcome = fetcher(3).fetch_asset(&link, dir.path(), false).await;

    assert_eq!(
        outcome.status,
        DownloadStatus::Failed(FailureReason::MaxRetriesExceeded)
    );
}

#[tokio::test]
async fn non_http_links_are_not_attempted() {
    let link = AssetLink {
        url: "ftp://files.example.com/1.png".to_string(),
        file_name: "1.png".to_string(),
        extension_fallback: false,
    };
    let dir = TempDir::new().unwrap();
    let outcome = fetcher(3).fetch_asset(&link, dir.path(), false).await;

    assert_eq!(outcome.status, DownloadStatus::SkippedUnsupportedSite);
}

#[tokio::test]
async fn write_failure_is_reported_per_asset() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/w/ok.png"))
        .respond_with(ResponseTemplate::new(200).set_body_string("data"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("not-created");
    let outcome = fetcher(3)
        .fetch_asset(&link(&server, "ok.png", false), &missing, false)
        .await;

    assert!(matches!(
        outcome.status,
        DownloadStatus::Failed(FailureReason::WriteError(_))
    ));
    assert!(!missing.exists());
}

#[tokio::test]
async fn page_fetch_returns_body_or_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/b/4321"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("<html>thread</html>", "text/html"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/b/404"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let fetcher = fetcher(1);
    let body = fetcher
        .fetch_page(&format!("{}/b/4321", server.uri()))
        .await
        .expect("page ok");
    assert_eq!(body, "<html>thread</html>");

    let err = fetcher
        .fetch_page(&format!("{}/b/404", server.uri()))
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(404));

    let err = fetcher.fetch_page("not a url").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidUrl);
}
