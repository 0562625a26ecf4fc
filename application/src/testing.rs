use domain::backend::{BackendResult, DocumentBackend};
use domain::error::ClientError;
use domain::models::{ChatQuery, Credentials, FileId, FileRecord, FileUpload, Message};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

pub struct FakeState {
    pub signup: BackendResult<()>,
    pub login_token: BackendResult<String>,
    pub files: BackendResult<Vec<FileRecord>>,
    pub contents: HashMap<FileId, BackendResult<String>>,
    pub history: HashMap<FileId, BackendResult<Vec<Message>>>,
    pub upload: BackendResult<()>,
    pub answer: BackendResult<String>,
    pub calls: Vec<&'static str>,
    pub tokens_seen: Vec<Option<String>>,
    pub last_query: Option<ChatQuery>,
    pub uploads: Vec<(String, String)>,
}

impl Default for FakeState {
    fn default() -> Self {
        Self {
            signup: Ok(()),
            login_token: Ok("token".into()),
            files: Ok(Vec::new()),
            contents: HashMap::new(),
            history: HashMap::new(),
            upload: Ok(()),
            answer: Ok("answer".into()),
            calls: Vec::new(),
            tokens_seen: Vec::new(),
            last_query: None,
            uploads: Vec::new(),
        }
    }
}

/// Scripted in-memory backend that records every call.
#[derive(Clone, Default)]
pub struct FakeBackend {
    state: Arc<Mutex<FakeState>>,
}

pub fn record(id: &str, name: &str) -> FileRecord {
    FileRecord {
        id: FileId::new(id),
        file_name: name.to_string(),
    }
}

pub fn server_error() -> ClientError {
    ClientError::Backend {
        status: 500,
        detail: None,
    }
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.state().calls.clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.state().calls.iter().filter(|c| **c == call).count()
    }

    fn hit(&self, call: &'static str, token: Option<&str>) -> MutexGuard<'_, FakeState> {
        let mut state = self.state();
        state.calls.push(call);
        state.tokens_seen.push(token.map(String::from));
        state
    }
}

impl DocumentBackend for FakeBackend {
    async fn signup(&self, _credentials: &Credentials) -> BackendResult<()> {
        self.hit("signup", None).signup.clone()
    }

    async fn login(&self, _credentials: &Credentials) -> BackendResult<String> {
        self.hit("login", None).login_token.clone()
    }

    async fn list_files(&self, token: Option<&str>) -> BackendResult<Vec<FileRecord>> {
        self.hit("list_files", token).files.clone()
    }

    async fn file_content(&self, token: Option<&str>, id: &FileId) -> BackendResult<String> {
        let state = self.hit("file_content", token);
        state.contents.get(id).cloned().unwrap_or_else(|| Err(server_error()))
    }

    async fn upload_file(
        &self,
        token: Option<&str>,
        upload: &FileUpload,
        external_api_key: &str,
    ) -> BackendResult<()> {
        let mut state = self.hit("upload_file", token);
        state
            .uploads
            .push((upload.file_name.clone(), external_api_key.to_string()));
        state.upload.clone()
    }

    async fn chat_history(&self, token: Option<&str>, id: &FileId) -> BackendResult<Vec<Message>> {
        let state = self.hit("chat_history", token);
        state.history.get(id).cloned().unwrap_or(Ok(Vec::new()))
    }

    async fn query(&self, token: Option<&str>, query: &ChatQuery) -> BackendResult<String> {
        let mut state = self.hit("query", token);
        state.last_query = Some(query.clone());
        state.answer.clone()
    }
}
