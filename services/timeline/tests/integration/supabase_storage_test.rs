use wiremock::matchers::{body_json, header, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use lifeline_timeline::domain::repository::StorageService;
use lifeline_timeline::error::TimelineServiceError;
use lifeline_timeline::infra::storage::SupabaseStorage;
use lifeline_timeline::infra::supabase::SupabaseProject;

use crate::helpers::{test_photo, test_user};

async fn storage(service_key: Option<&str>) -> (MockServer, SupabaseStorage) {
    let server = MockServer::start().await;
    let project = SupabaseProject::new(&server.uri(), "anon-key").unwrap();
    let storage = SupabaseStorage::new(project, "event-photos", service_key);
    (server, storage)
}

#[tokio::test]
async fn should_upload_under_user_namespace_and_return_public_url() {
    let (server, storage) = storage(None).await;
    let storage = storage.acting_as("user-jwt");
    let user = test_user();
    Mock::given(method("POST"))
        .and(path_regex(format!(
            r"^/storage/v1/object/event-photos/{user}/[0-9a-f-]{{36}}\.jpg$"
        )))
        .and(header("authorization", "Bearer user-jwt"))
        .and(header("content-type", "image/jpeg"))
        .and(header("x-upsert", "false"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "Key": "ignored" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let url = storage
        .upload_photo(&test_photo("grad.JPG"), user)
        .await
        .unwrap();
    let prefix = format!("{}/storage/v1/object/public/event-photos/{user}/", server.uri());
    assert!(url.starts_with(&prefix), "{url} should start with {prefix}");
    assert!(url.ends_with(".jpg"));
}

#[tokio::test]
async fn should_prefer_service_key_over_user_token() {
    let (server, storage) = storage(Some("service-key")).await;
    let storage = storage.acting_as("user-jwt");
    Mock::given(method("POST"))
        .and(path_regex(r"^/storage/v1/object/event-photos/.+$"))
        .and(header("authorization", "Bearer service-key"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    storage
        .upload_photo(&test_photo("a.png"), test_user())
        .await
        .unwrap();
}

#[tokio::test]
async fn should_surface_upload_rejection_message() {
    let (server, storage) = storage(None).await;
    Mock::given(method("POST"))
        .and(path_regex(r"^/storage/v1/object/event-photos/.+$"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "statusCode": "404",
            "error": "Bucket not found",
            "message": "Bucket not found",
        })))
        .mount(&server)
        .await;

    match storage.upload_photo(&test_photo("a.png"), test_user()).await {
        Err(TimelineServiceError::Upload(message)) => assert_eq!(message, "Bucket not found"),
        other => panic!("expected Upload error, got {other:?}"),
    }
}

#[tokio::test]
async fn should_delete_by_key_recovered_from_url() {
    let (server, storage) = storage(None).await;
    let url = format!(
        "{}/storage/v1/object/public/event-photos/owner-1/photo.jpg",
        server.uri()
    );
    Mock::given(method("DELETE"))
        .and(path("/storage/v1/object/event-photos"))
        .and(body_json(serde_json::json!({ "prefixes": ["owner-1/photo.jpg"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&server)
        .await;

    storage.delete_photo(&url).await.unwrap();
}

#[tokio::test]
async fn should_fail_delete_when_store_refuses() {
    let (server, storage) = storage(None).await;
    Mock::given(method("DELETE"))
        .and(path("/storage/v1/object/event-photos"))
        .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
            "statusCode": "403",
            "error": "Unauthorized",
            "message": "new row violates row-level security policy",
        })))
        .mount(&server)
        .await;

    let result = storage
        .delete_photo("https://abc.supabase.co/storage/v1/object/public/event-photos/u/p.jpg")
        .await;
    assert!(matches!(result, Err(TimelineServiceError::Delete(_))));
}

#[tokio::test]
async fn should_reject_url_without_owner_segment() {
    let (_server, storage) = storage(None).await;
    let result = storage.delete_photo("https://cdn.example.com/p.jpg").await;
    assert!(matches!(result, Err(TimelineServiceError::Delete(_))));
}
