use crate::config::Config;
use domain::backend::{BackendResult, DocumentBackend};
use domain::error::ClientError;
use domain::models::{ChatQuery, Credentials, FileId, FileRecord, FileUpload, Message};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use shared::telemetry::Telemetry;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Deserialize)]
struct LoginResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct FileContentResponse {
    #[serde(default)]
    file_content: Option<String>,
}

#[derive(Deserialize)]
struct QueryResponse {
    response: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: Option<serde_json::Value>,
}

/// reqwest implementation of [`DocumentBackend`].
#[derive(Clone)]
pub struct HttpBackend {
    client: Arc<Client>,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &Config) -> BackendResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        Ok(Self {
            client: Arc::new(client),
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, call: &'static str, request: RequestBuilder) -> BackendResult<Response> {
        let timer = Telemetry::new();
        let response = request.send().await.map_err(|e| {
            warn!(call, error = %e, "backend unreachable");
            ClientError::Transport(e.to_string())
        })?;
        let status = response.status();
        debug!(
            call,
            status = status.as_u16(),
            elapsed_ms = timer.elapsed_ms() as u64,
            "backend call finished"
        );
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ClientError::Backend {
            status: status.as_u16(),
            detail: extract_detail(&body),
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> BackendResult<T> {
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
    }
}

/// FastAPI puts a string in `detail` for handled errors and a list for
/// request validation errors; only the string form is shown to users.
fn extract_detail(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.detail? {
        serde_json::Value::String(detail) => Some(detail),
        _ => None,
    }
}

impl DocumentBackend for HttpBackend {
    async fn signup(&self, credentials: &Credentials) -> BackendResult<()> {
        let request = self.client.post(self.url("/signup")).json(credentials);
        self.send("signup", request).await?;
        Ok(())
    }

    async fn login(&self, credentials: &Credentials) -> BackendResult<String> {
        let request = self.client.post(self.url("/login")).form(&[
            ("username", credentials.username.as_str()),
            ("password", credentials.password.as_str()),
        ]);
        let response = self.send("login", request).await?;
        let body: LoginResponse = Self::decode(response).await?;
        Ok(body.access_token)
    }

    async fn list_files(&self, token: Option<&str>) -> BackendResult<Vec<FileRecord>> {
        let request = Self::authorized(self.client.get(self.url("/files")), token);
        let response = self.send("list_files", request).await?;
        Self::decode(response).await
    }

    async fn file_content(&self, token: Option<&str>, id: &FileId) -> BackendResult<String> {
        let request = Self::authorized(self.client.get(self.url(&format!("/files/{id}"))), token);
        let response = self.send("file_content", request).await?;
        let body: FileContentResponse = Self::decode(response).await?;
        Ok(body.file_content.unwrap_or_default())
    }

    async fn upload_file(
        &self,
        token: Option<&str>,
        upload: &FileUpload,
        external_api_key: &str,
    ) -> BackendResult<()> {
        let bytes = upload
            .bytes
            .clone()
            .ok_or_else(|| ClientError::validation("No file selected for upload."))?;
        let form = Form::new()
            .text("pinecone_api_key", external_api_key.to_string())
            .text("file_name", upload.file_name.clone())
            .part("file", Part::bytes(bytes).file_name(upload.source_name.clone()));
        let request = Self::authorized(self.client.post(self.url("/files/upload")), token).multipart(form);
        self.send("upload_file", request).await?;
        Ok(())
    }

    async fn chat_history(&self, token: Option<&str>, id: &FileId) -> BackendResult<Vec<Message>> {
        let request = Self::authorized(self.client.get(self.url(&format!("/chat/history/{id}"))), token);
        let response = self.send("chat_history", request).await?;
        Self::decode(response).await
    }

    async fn query(&self, token: Option<&str>, query: &ChatQuery) -> BackendResult<String> {
        let form = Form::new()
            .text("pinecone_api_key", query.external_api_key.clone())
            .text("file_id", query.file_id.to_string())
            .text("query", query.query.clone())
            .text("history", query.history.clone());
        let request = Self::authorized(self.client.post(self.url("/chat/query")), token).multipart(form);
        let response = self.send("query", request).await?;
        let body: QueryResponse = Self::decode(response).await?;
        Ok(body.response)
    }
}
