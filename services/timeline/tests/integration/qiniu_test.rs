use base64::{Engine, engine::general_purpose::URL_SAFE};
use wiremock::matchers::{header, header_regex, method, path, path_regex};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use lifeline_timeline::config::QiniuSettings;
use lifeline_timeline::domain::repository::StorageService;
use lifeline_timeline::error::TimelineServiceError;
use lifeline_timeline::infra::storage::QiniuStorage;

use crate::helpers::{test_photo, test_user};

fn settings(server: &MockServer) -> QiniuSettings {
    QiniuSettings {
        access_key: "ak".to_owned(),
        secret_key: "sk".to_owned(),
        bucket: "photos".to_owned(),
        domain: "https://cdn.example.com".to_owned(),
        upload_host: server.uri(),
        rs_host: server.uri(),
    }
}

fn body_contains(needle: &'static str) -> impl Fn(&Request) -> bool {
    move |request: &Request| String::from_utf8_lossy(&request.body).contains(needle)
}

#[tokio::test]
async fn should_upload_with_form_token_and_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .and(header_regex("content-type", "^multipart/form-data"))
        .and(body_contains("name=\"token\""))
        .and(body_contains("name=\"key\""))
        .and(body_contains("fake-jpeg"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "hash": "Fh", "key": "ignored" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let storage = QiniuStorage::new(settings(&server));
    let user = test_user();
    let url = storage
        .upload_photo(&test_photo("grad.jpg"), user)
        .await
        .unwrap();
    assert!(url.starts_with(&format!("https://cdn.example.com/{user}/")));
    assert!(url.ends_with(".jpg"));
}

#[tokio::test]
async fn should_surface_upload_error_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(serde_json::json!({ "error": "bad token" })),
        )
        .mount(&server)
        .await;

    let storage = QiniuStorage::new(settings(&server));
    match storage.upload_photo(&test_photo("a.jpg"), test_user()).await {
        Err(TimelineServiceError::Upload(message)) => assert_eq!(message, "bad token"),
        other => panic!("expected Upload error, got {other:?}"),
    }
}

#[tokio::test]
async fn should_delete_entry_with_qbox_signature() {
    let server = MockServer::start().await;
    let entry = URL_SAFE.encode("photos:owner/a.jpg");
    let delete_path = format!("/delete/{entry}");
    let expected_auth = QiniuStorage::new(settings(&server))
        .management_token(&delete_path)
        .unwrap();
    Mock::given(method("POST"))
        .and(path(delete_path.as_str()))
        .and(header("authorization", expected_auth.as_str()))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let storage = QiniuStorage::new(settings(&server));
    storage
        .delete_photo("https://cdn.example.com/owner/a.jpg")
        .await
        .unwrap();
}

#[tokio::test]
async fn should_treat_missing_entry_as_deleted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path_regex("^/delete/"))
        .respond_with(
            ResponseTemplate::new(612)
                .set_body_json(serde_json::json!({ "error": "no such file or directory" })),
        )
        .mount(&server)
        .await;

    let storage = QiniuStorage::new(settings(&server));
    assert!(storage.delete_photo("https://cdn.example.com/o/gone.jpg").await.is_ok());
}

#[tokio::test]
async fn should_fail_delete_on_other_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path_regex("^/delete/"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(serde_json::json!({ "error": "bad token" })),
        )
        .mount(&server)
        .await;

    let storage = QiniuStorage::new(settings(&server));
    match storage.delete_photo("https://cdn.example.com/o/a.jpg").await {
        Err(TimelineServiceError::Delete(message)) => assert_eq!(message, "bad token"),
        other => panic!("expected Delete error, got {other:?}"),
    }
}
