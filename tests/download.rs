use culturecoded::{Client, Error, ExportFormat, ExportResult};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const KEY: &str = "cc_test_0123456789";

fn pdf_export(download_url: Option<String>) -> ExportResult {
    ExportResult {
        format: ExportFormat::Pdf,
        download_url,
        data: None,
        cost: 1.0,
        success: Some(true),
        metadata: None,
    }
}

#[tokio::test]
async fn downloads_export_file_from_api_host() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/files/an_1.pdf"))
        .and(header("x-api-key", KEY))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.7 test".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("reports").join("an_1.pdf");
    let export = pdf_export(Some(format!("{}/v1/files/an_1.pdf", server.uri())));
    let base = format!("{}/v1", server.uri());

    let written = tokio::task::spawn_blocking({
        let target = target.clone();
        move || {
            Client::with_base_url(KEY, base)
                .unwrap()
                .download_export(&export, &target)
        }
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(written, target);
    assert_eq!(std::fs::read(&target).unwrap(), b"%PDF-1.7 test");
}

#[tokio::test]
async fn failed_download_is_a_remote_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/files/expired.pdf"))
        .respond_with(ResponseTemplate::new(410).set_body_string("gone"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("expired.pdf");
    let export = pdf_export(Some(format!("{}/v1/files/expired.pdf", server.uri())));
    let base = format!("{}/v1", server.uri());

    let err = tokio::task::spawn_blocking(move || {
        Client::with_base_url(KEY, base)
            .unwrap()
            .download_export(&export, &target)
    })
    .await
    .unwrap()
    .unwrap_err();

    assert_eq!(err.status(), Some(410));
}

#[tokio::test]
async fn api_key_is_withheld_from_other_hosts() {
    let api = MockServer::start().await;
    let cdn = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/exports/an_1.csv"))
        .respond_with(ResponseTemplate::new(200).set_body_string("category,priority\n"))
        .expect(1)
        .mount(&cdn)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("an_1.csv");
    let export = ExportResult {
        format: ExportFormat::Csv,
        ..pdf_export(Some(format!("{}/exports/an_1.csv", cdn.uri())))
    };
    let base = format!("{}/v1", api.uri());

    tokio::task::spawn_blocking({
        let target = target.clone();
        move || {
            Client::with_base_url(KEY, base)
                .unwrap()
                .download_export(&export, &target)
        }
    })
    .await
    .unwrap()
    .unwrap();

    let requests = cdn.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("x-api-key").is_none());
    assert_eq!(std::fs::read(&target).unwrap(), b"category,priority\n");
    assert!(api.received_requests().await.unwrap().is_empty());
}

#[test]
fn unusable_target_directory_is_an_io_error() {
    let client = Client::new(KEY).unwrap();
    let blocker = tempfile::NamedTempFile::new().unwrap();
    let target = blocker.path().join("reports").join("an_1.pdf");

    // Parent creation fails before any request goes out.
    let export = pdf_export(Some("http://127.0.0.1:1/files/an_1.pdf".to_string()));
    let err = client.download_export(&export, &target).unwrap_err();

    assert!(matches!(err, Error::Io { .. }), "got {err:?}");
}

#[test]
fn export_without_download_url_is_an_input_error() {
    let client = Client::new(KEY).unwrap();
    let dir = tempfile::tempdir().unwrap();

    let err = client
        .download_export(&pdf_export(None), &dir.path().join("x.pdf"))
        .unwrap_err();
    assert!(matches!(err, Error::Input(_)), "got {err:?}");
}
