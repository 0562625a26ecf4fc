//! `HttpBackend` against a mock server: wire formats, auth header, errors.

use domain::backend::DocumentBackend;
use domain::error::ClientError;
use domain::models::{ChatQuery, Credentials, FileId, FileUpload, Message};
use infrastructure::config::Config;
use infrastructure::http_backend::HttpBackend;
use serde_json::json;
use std::time::Duration;
use tests::{backend_for, bearer, detail_response, json_response, NoAuthorization, TOKEN};
use wiremock::matchers::{body_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn login_posts_form_and_returns_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("username=alice"))
        .and(body_string_contains("password=s3cret"))
        .respond_with(json_response(json!({ "access_token": TOKEN, "token_type": "bearer" })))
        .expect(1)
        .mount(&server)
        .await;

    let token = backend_for(&server)
        .login(&Credentials::new("alice", "s3cret"))
        .await
        .unwrap();

    assert_eq!(token, TOKEN);
}

#[tokio::test]
async fn signup_posts_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/signup"))
        .and(body_json(json!({ "username": "bob", "password": "pw" })))
        .respond_with(json_response(json!({ "msg": "User created" })))
        .expect(1)
        .mount(&server)
        .await;

    backend_for(&server)
        .signup(&Credentials::new("bob", "pw"))
        .await
        .unwrap();
}

#[tokio::test]
async fn list_files_sends_bearer_and_accepts_numeric_ids() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files"))
        .and(header("authorization", bearer().as_str()))
        .respond_with(json_response(json!([
            { "id": 1, "file_name": "faq.pdf" },
            { "id": "b2", "file_name": "terms.txt" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let files = backend_for(&server).list_files(Some(TOKEN)).await.unwrap();

    assert_eq!(files.len(), 2);
    assert_eq!(files[0].id, FileId::new("1"));
    assert_eq!(files[1].file_name, "terms.txt");
}

#[tokio::test]
async fn missing_token_sends_no_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files"))
        .and(NoAuthorization)
        .respond_with(detail_response(401, "Not authenticated"))
        .expect(1)
        .mount(&server)
        .await;

    let err = backend_for(&server).list_files(None).await.unwrap_err();

    assert_eq!(
        err,
        ClientError::Backend {
            status: 401,
            detail: Some("Not authenticated".into()),
        }
    );
}

#[tokio::test]
async fn error_without_detail_has_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files/3"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let err = backend_for(&server)
        .file_content(Some(TOKEN), &FileId::new("3"))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ClientError::Backend {
            status: 502,
            detail: None,
        }
    );
    assert_eq!(err.user_message("Error fetching details."), "Error fetching details.");
}

#[tokio::test]
async fn file_content_reads_field() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files/7"))
        .and(header("authorization", bearer().as_str()))
        .respond_with(json_response(json!({ "file_name": "faq.pdf", "file_content": "Refunds: 30 days" })))
        .mount(&server)
        .await;

    let content = backend_for(&server)
        .file_content(Some(TOKEN), &FileId::new("7"))
        .await
        .unwrap();

    assert_eq!(content, "Refunds: 30 days");
}

#[tokio::test]
async fn unexpected_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/chat/history/7"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = backend_for(&server)
        .chat_history(Some(TOKEN), &FileId::new("7"))
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Decode(_)));
}

#[tokio::test]
async fn history_parses_messages() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/chat/history/7"))
        .respond_with(json_response(json!([
            { "role": "user", "content": "hi" },
            { "role": "assistant", "content": "hello" }
        ])))
        .mount(&server)
        .await;

    let history = backend_for(&server)
        .chat_history(Some(TOKEN), &FileId::new("7"))
        .await
        .unwrap();

    assert_eq!(history, vec![Message::user("hi"), Message::assistant("hello")]);
}

#[tokio::test]
async fn query_sends_multipart_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/query"))
        .and(header("authorization", bearer().as_str()))
        .and(body_string_contains("name=\"pinecone_api_key\""))
        .and(body_string_contains("pc-key"))
        .and(body_string_contains("name=\"file_id\""))
        .and(body_string_contains("name=\"query\""))
        .and(body_string_contains("Refund window?"))
        .and(body_string_contains("user: hi\nassistant: hello"))
        .respond_with(json_response(json!({ "response": "30 days." })))
        .expect(1)
        .mount(&server)
        .await;

    let answer = backend_for(&server)
        .query(
            Some(TOKEN),
            &ChatQuery {
                file_id: FileId::new("7"),
                query: "Refund window?".into(),
                history: "user: hi\nassistant: hello".into(),
                external_api_key: "pc-key".into(),
            },
        )
        .await
        .unwrap();

    assert_eq!(answer, "30 days.");
}

#[tokio::test]
async fn upload_sends_file_part() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/files/upload"))
        .and(header("authorization", bearer().as_str()))
        .and(body_string_contains("filename=\"faq.txt\""))
        .and(body_string_contains("name=\"file_name\""))
        .and(body_string_contains("Company FAQ"))
        .and(body_string_contains("Refunds within 30 days"))
        .respond_with(json_response(json!({ "message": "File uploaded" })))
        .expect(1)
        .mount(&server)
        .await;

    backend_for(&server)
        .upload_file(
            Some(TOKEN),
            &FileUpload {
                file_name: "Company FAQ".into(),
                source_name: "faq.txt".into(),
                bytes: Some(b"Refunds within 30 days".to_vec()),
            },
            "pc-key",
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn timeout_is_a_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files"))
        .respond_with(json_response(json!([])).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;
    let config = Config {
        api_base_url: server.uri(),
        request_timeout_secs: 1,
        ..Config::default()
    };
    let backend = HttpBackend::new(&config).unwrap();

    let err = backend.list_files(Some(TOKEN)).await.unwrap_err();

    assert!(matches!(err, ClientError::Transport(_)));
    assert_eq!(err.user_message("Failed to fetch files."), "Failed to fetch files.");
}
