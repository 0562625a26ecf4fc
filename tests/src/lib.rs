//! Shared fixtures for the integration tests: a reqwest backend pointed at a
//! wiremock server and canned backend responses.

use infrastructure::config::Config;
use infrastructure::http_backend::HttpBackend;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

pub const TOKEN: &str = "abc123";

pub fn backend_for(server: &MockServer) -> HttpBackend {
    let config = Config {
        api_base_url: server.uri(),
        request_timeout_secs: 5,
        ..Config::default()
    };
    HttpBackend::new(&config).expect("http client should build")
}

pub fn json_response(body: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(body)
}

/// FastAPI-style error body.
pub fn detail_response(status: u16, detail: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(json!({ "detail": detail }))
}

pub fn bearer() -> String {
    format!("Bearer {TOKEN}")
}

pub async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(json_response(json!({ "access_token": TOKEN, "token_type": "bearer" })))
        .mount(server)
        .await;
}

/// Matches requests that carry no `Authorization` header.
pub struct NoAuthorization;

impl Match for NoAuthorization {
    fn matches(&self, request: &Request) -> bool {
        !request.headers.contains_key("authorization")
    }
}
