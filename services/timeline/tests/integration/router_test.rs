use axum::http::StatusCode;
use axum_test::TestServer;
use axum_test::multipart::{MultipartForm, Part};
use uuid::Uuid;
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use lifeline_auth_types::cookie::{LIFELINE_ACCESS_TOKEN, LIFELINE_REFRESH_TOKEN};
use lifeline_auth_types::session::JwtSecret;
use lifeline_domain::photo::MAX_PHOTO_BYTES;
use lifeline_testing::auth::{MockSession, TEST_JWT_SECRET, now};
use lifeline_timeline::infra::auth::SupabaseAuthClient;
use lifeline_timeline::infra::events::EventBackend;
use lifeline_timeline::infra::storage::{StorageBackendHandle, SupabaseStorage};
use lifeline_timeline::infra::supabase::SupabaseProject;
use lifeline_timeline::router::build_router;
use lifeline_timeline::state::AppState;

use crate::helpers::{event_row_json, token_json};

/// Router wired to a fake hosted project.
async fn app() -> (MockServer, TestServer) {
    let upstream = MockServer::start().await;
    let project = SupabaseProject::new(&upstream.uri(), "anon-key").unwrap();
    let state = AppState {
        identity: SupabaseAuthClient::new(project.clone()),
        events: EventBackend::Postgrest(project.clone()),
        storage: StorageBackendHandle::Supabase(SupabaseStorage::new(
            project,
            "event-photos",
            None,
        )),
        jwt_secret: JwtSecret::new(TEST_JWT_SECRET),
        cookie_secure: false,
    };
    let server = TestServer::new(build_router(state)).unwrap();
    (upstream, server)
}

fn graduation_form() -> MultipartForm {
    MultipartForm::new()
        .add_text("title", "Graduation")
        .add_text("event_date", "2020-06-15")
        .add_text("description", "")
}

// ── Session ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_reject_timeline_without_session() {
    let (_upstream, server) = app().await;
    let response = server.get("/timeline").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["kind"], "UNAUTHENTICATED");
    assert_eq!(body["message"], "not signed in");
}

#[tokio::test]
async fn should_reject_expired_session() {
    let (_upstream, server) = app().await;
    let session = MockSession::with_expiry(Uuid::new_v4(), now() - 600);
    let (name, value) = session.cookie_header();
    server
        .get("/timeline")
        .add_header(name, value)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_serve_health_probes() {
    let (_upstream, server) = app().await;
    server.get("/healthz").await.assert_status_ok();
    server.get("/readyz").await.assert_status_ok();
}

// ── Timeline ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_create_then_list_graduation_under_2020() {
    let (upstream, server) = app().await;
    let session = MockSession::new();
    let id = Uuid::new_v4();
    let row = event_row_json(id, session.user_id, "Graduation", "2020-06-15", None);

    Mock::given(method("POST"))
        .and(path("/rest/v1/events"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!([row.clone()])))
        .expect(1)
        .mount(&upstream)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/events"))
        .and(query_param("user_id", format!("eq.{}", session.user_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([row])))
        .mount(&upstream)
        .await;

    let (name, value) = session.cookie_header();
    let created = server
        .post("/timeline/new")
        .add_header(name.clone(), value.clone())
        .multipart(graduation_form())
        .await;
    created.assert_status(StatusCode::CREATED);
    let detail: serde_json::Value = created.json();
    assert_eq!(detail["id"], id.to_string());
    assert_eq!(detail["date_label"], "2020年6月15日");
    assert!(detail["photo_url"].is_null());

    let listed = server.get("/timeline").add_header(name, value).await;
    listed.assert_status_ok();
    let view: serde_json::Value = listed.json();
    assert_eq!(view["total"], 1);
    assert_eq!(view["years"][0]["year"], 2020);
    assert_eq!(view["years"][0]["label"], "2020 年");
    assert_eq!(view["years"][0]["events"][0]["title"], "Graduation");
    assert_eq!(view["years"][0]["events"][0]["date_label"], "2020.06.15");
}

#[tokio::test]
async fn should_reject_oversized_photo_before_any_upstream_call() {
    let (upstream, server) = app().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&upstream)
        .await;

    let (name, value) = MockSession::new().bearer_header();
    let photo = Part::bytes(vec![0u8; MAX_PHOTO_BYTES + 1])
        .file_name("huge.jpg")
        .mime_type("image/jpeg");
    let response = server
        .post("/timeline/new")
        .add_header(name, value)
        .multipart(graduation_form().add_part("photo", photo))
        .await;

    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    let body: serde_json::Value = response.json();
    assert_eq!(body["kind"], "PHOTO_TOO_LARGE");
}

#[tokio::test]
async fn should_report_body_over_limit_as_oversized_photo() {
    let (upstream, server) = app().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&upstream)
        .await;

    let (name, value) = MockSession::new().bearer_header();
    let photo = Part::bytes(vec![0u8; MAX_PHOTO_BYTES + 2 * 1024 * 1024])
        .file_name("huge.jpg")
        .mime_type("image/jpeg");
    let response = server
        .post("/timeline/new")
        .add_header(name, value)
        .multipart(graduation_form().add_part("photo", photo))
        .await;

    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    let body: serde_json::Value = response.json();
    assert_eq!(body["kind"], "PHOTO_TOO_LARGE");
}

#[tokio::test]
async fn should_reject_non_image_photo_before_any_upstream_call() {
    let (upstream, server) = app().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&upstream)
        .await;

    let (name, value) = MockSession::new().cookie_header();
    let page = Part::bytes(b"<script>alert(1)</script>".to_vec())
        .file_name("evil.html")
        .mime_type("text/html");
    let response = server
        .post("/timeline/new")
        .add_header(name, value)
        .multipart(graduation_form().add_part("photo", page))
        .await;

    response.assert_status(StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let body: serde_json::Value = response.json();
    assert_eq!(body["kind"], "UNSUPPORTED_PHOTO_TYPE");
}

#[tokio::test]
async fn should_reject_malformed_event_id_as_json_error() {
    let (_upstream, server) = app().await;
    let (name, value) = MockSession::new().cookie_header();
    let response = server
        .get("/timeline/not-a-uuid")
        .add_header(name, value)
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["kind"], "INVALID_PATH");
    assert!(body["message"].as_str().unwrap().starts_with("invalid path:"));
}

#[tokio::test]
async fn should_reject_timeline_form_without_multipart_body() {
    let (_upstream, server) = app().await;
    let (name, value) = MockSession::new().cookie_header();
    let response = server
        .post("/timeline/new")
        .add_header(name, value)
        .json(&serde_json::json!({ "title": "Graduation" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["kind"], "INVALID_FORM");
}

#[tokio::test]
async fn should_reject_missing_title_with_inline_message() {
    let (_upstream, server) = app().await;
    let (name, value) = MockSession::new().cookie_header();
    let form = MultipartForm::new()
        .add_text("title", "")
        .add_text("event_date", "2020-06-15");

    let response = server
        .post("/timeline/new")
        .add_header(name, value)
        .multipart(form)
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["kind"], "MISSING_TITLE");
    assert_eq!(body["message"], "title is required");
}

#[tokio::test]
async fn should_return_404_for_unknown_event() {
    let (upstream, server) = app().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&upstream)
        .await;

    let (name, value) = MockSession::new().cookie_header();
    let response = server
        .get(&format!("/timeline/{}", Uuid::new_v4()))
        .add_header(name, value)
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn should_delete_photo_and_row() {
    let (upstream, server) = app().await;
    let session = MockSession::new();
    let id = Uuid::new_v4();
    let photo_url = format!(
        "{}/storage/v1/object/public/event-photos/{}/p.jpg",
        upstream.uri(),
        session.user_id
    );
    let row = event_row_json(id, session.user_id, "Moved", "2018-08-01", Some(&photo_url));

    Mock::given(method("GET"))
        .and(path("/rest/v1/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([row])))
        .mount(&upstream)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/storage/v1/object/event-photos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&upstream)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/rest/v1/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{ "id": id }])))
        .expect(1)
        .mount(&upstream)
        .await;

    let (name, value) = session.cookie_header();
    server
        .delete(&format!("/timeline/{id}"))
        .add_header(name, value)
        .await
        .assert_status(StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn should_update_event_replacing_photo() {
    let (upstream, server) = app().await;
    let session = MockSession::new();
    let id = Uuid::new_v4();
    let old_url = format!(
        "{}/storage/v1/object/public/event-photos/{}/old.jpg",
        upstream.uri(),
        session.user_id
    );
    let current = event_row_json(id, session.user_id, "Graduation", "2020-06-15", Some(&old_url));

    Mock::given(method("GET"))
        .and(path("/rest/v1/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([current])))
        .mount(&upstream)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/storage/v1/object/event-photos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&upstream)
        .await;
    Mock::given(method("POST"))
        .and(path_regex(r"^/storage/v1/object/event-photos/.+\.png$"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&upstream)
        .await;
    let updated = event_row_json(
        id,
        session.user_id,
        "Graduation",
        "2020-06-15",
        Some("https://cdn.test/new.png"),
    );
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([updated])))
        .expect(1)
        .mount(&upstream)
        .await;

    let (name, value) = session.cookie_header();
    let photo = Part::bytes(b"png-bytes".to_vec())
        .file_name("new.png")
        .mime_type("image/png");
    let response = server
        .put(&format!("/timeline/{id}"))
        .add_header(name, value)
        .multipart(graduation_form().add_part("photo", photo))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["photo_url"], "https://cdn.test/new.png");
}

// ── Login ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_sign_in_and_set_session_cookies() {
    let (upstream, server) = app().await;
    let user_id = Uuid::new_v4();
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "password"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(token_json(user_id, "a@example.com", "issued-jwt")),
        )
        .mount(&upstream)
        .await;

    let response = server
        .post("/login")
        .json(&serde_json::json!({
            "mode": "sign_in",
            "email": "a@example.com",
            "password": "hunter22",
        }))
        .await;

    response.assert_status_ok();
    assert_eq!(response.cookie(LIFELINE_ACCESS_TOKEN).value(), "issued-jwt");
    assert_eq!(response.cookie(LIFELINE_REFRESH_TOKEN).value(), "refresh-abc");
    let body: serde_json::Value = response.json();
    assert_eq!(body["signed_in"], true);
    assert_eq!(body["user"]["id"], user_id.to_string());
}

#[tokio::test]
async fn should_report_manual_sign_in_after_unconfirmed_sign_up() {
    let (upstream, server) = app().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/signup"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": Uuid::new_v4(),
            "email": "new@example.com",
        })))
        .mount(&upstream)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error_code": "email_not_confirmed",
            "msg": "Email not confirmed",
        })))
        .mount(&upstream)
        .await;

    let response = server
        .post("/login")
        .json(&serde_json::json!({
            "mode": "sign_up",
            "email": "new@example.com",
            "password": "hunter22",
            "confirm_password": "hunter22",
        }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["signed_in"], false);
    assert_eq!(body["sign_in_required"], true);
    assert_eq!(body["user"]["email"], "new@example.com");
    assert!(response.maybe_cookie(LIFELINE_ACCESS_TOKEN).is_none());
}

#[tokio::test]
async fn should_reject_malformed_login_body_as_json_error() {
    let (upstream, server) = app().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&upstream)
        .await;

    let response = server
        .post("/login")
        .json(&serde_json::json!({ "mode": "magic_link", "email": "a@example.com" }))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: serde_json::Value = response.json();
    assert_eq!(body["kind"], "INVALID_BODY");
}

#[tokio::test]
async fn should_reject_short_sign_up_password_without_calling_provider() {
    let (upstream, server) = app().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&upstream)
        .await;

    let response = server
        .post("/login")
        .json(&serde_json::json!({
            "mode": "sign_up",
            "email": "a@example.com",
            "password": "short",
            "confirm_password": "short",
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["kind"], "PASSWORD_TOO_SHORT");
}

#[tokio::test]
async fn should_sign_out_and_clear_cookies() {
    let (upstream, server) = app().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/logout"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&upstream)
        .await;

    let (name, value) = MockSession::new().cookie_header();
    let response = server.delete("/login").add_header(name, value).await;

    response.assert_status(StatusCode::NO_CONTENT);
    assert_eq!(response.cookie(LIFELINE_ACCESS_TOKEN).value(), "");
}

#[tokio::test]
async fn should_reject_refresh_without_cookie() {
    let (_upstream, server) = app().await;
    let response = server.patch("/login").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["kind"], "UNAUTHENTICATED");
}
