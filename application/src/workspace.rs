use crate::auth_service::{AuthService, AUTH_FAILED, SIGNUP_OK};
use crate::conversation::{ConversationView, HISTORY_FAILED, QUERY_FAILED};
use crate::file_catalog::{FileCatalog, LIST_FAILED, UPLOAD_FAILED, UPLOAD_OK};
use crate::notice::Notice;
use domain::backend::DocumentBackend;
use domain::error::{ClientError, LOGIN_REQUIRED};
use domain::models::{Credentials, FileDetail, FileId, FileRecord, FileUpload};
use domain::session::SessionStore;
use tracing::{info, warn};

/// Top-level coordinator: owns the session, the catalog, the conversation
/// and the selected file.
///
/// Every operation catches its own failures and reports them as notices.
/// Apart from signup, login and logout, nothing is sent while the session
/// is anonymous.
pub struct Workspace<B> {
    session: SessionStore,
    auth: AuthService<B>,
    catalog: FileCatalog<B>,
    conversation: ConversationView<B>,
    selected: Option<FileRecord>,
}

impl<B: DocumentBackend + Clone> Workspace<B> {
    pub fn new(backend: B) -> Self {
        Self {
            session: SessionStore::new(),
            auth: AuthService::new(backend.clone()),
            catalog: FileCatalog::new(backend.clone()),
            conversation: ConversationView::new(backend),
            selected: None,
        }
    }
}

impl<B: DocumentBackend> Workspace<B> {
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn catalog(&self) -> &FileCatalog<B> {
        &self.catalog
    }

    pub fn conversation(&self) -> &ConversationView<B> {
        &self.conversation
    }

    pub fn selected(&self) -> Option<&FileRecord> {
        self.selected.as_ref()
    }

    fn require_login(&self) -> Option<Notice> {
        if self.session.is_authenticated() {
            None
        } else {
            Some(Notice::error(LOGIN_REQUIRED))
        }
    }

    pub async fn signup(&self, credentials: &Credentials) -> Notice {
        match self.auth.signup(credentials).await {
            Ok(()) => Notice::success(SIGNUP_OK),
            Err(err) => caught(&err, AUTH_FAILED),
        }
    }

    /// Logs in and loads the file list.
    pub async fn login(&mut self, credentials: &Credentials) -> Vec<Notice> {
        if let Err(err) = self.auth.login(&mut self.session, credentials).await {
            return vec![caught(&err, AUTH_FAILED)];
        }
        let mut notices = vec![Notice::success(format!("Logged in as {}.", credentials.username))];
        notices.extend(self.refresh_files().await);
        notices
    }

    pub fn set_external_api_key(&mut self, key: impl Into<String>) -> Notice {
        self.session.set_external_api_key(key);
        if self.session.external_api_key().is_empty() {
            Notice::info("External API key cleared.")
        } else {
            Notice::info("External API key set.")
        }
    }

    pub async fn refresh_files(&mut self) -> Option<Notice> {
        if let Some(notice) = self.require_login() {
            return Some(notice);
        }
        self.catalog
            .list_files(&self.session)
            .await
            .err()
            .map(|err| Notice::error(err.user_message(LIST_FAILED)))
    }

    pub async fn file_detail(&mut self, id: &FileId) -> Result<&FileDetail, Notice> {
        if let Some(notice) = self.require_login() {
            return Err(notice);
        }
        Ok(self.catalog.fetch_detail(&self.session, id).await)
    }

    /// Uploads, then refreshes the list when the upload went through.
    pub async fn upload(&mut self, upload: &FileUpload) -> Vec<Notice> {
        if let Some(notice) = self.require_login() {
            return vec![notice];
        }
        if let Err(err) = self.catalog.upload(&self.session, upload).await {
            return vec![caught(&err, UPLOAD_FAILED)];
        }
        info!(file_name = %upload.file_name, "file uploaded");
        let mut notices = vec![Notice::success(UPLOAD_OK)];
        notices.extend(self.refresh_files().await);
        notices
    }

    /// Selects a file from the last fetched list and loads its history.
    pub async fn select_file(&mut self, id: &FileId) -> Option<Notice> {
        if let Some(notice) = self.require_login() {
            return Some(notice);
        }
        let Some(record) = self.catalog.find(id).cloned() else {
            return Some(Notice::error(format!("No file with id {id}.")));
        };
        self.selected = Some(record);
        self.conversation
            .load_history(&self.session, Some(id))
            .await
            .err()
            .map(|err| Notice::error(err.user_message(HISTORY_FAILED)))
    }

    pub async fn send_query(&mut self, text: &str) -> Option<Notice> {
        if let Some(notice) = self.require_login() {
            return Some(notice);
        }
        self.conversation
            .send_query(&self.session, text)
            .await
            .err()
            .map(|err| caught(&err, QUERY_FAILED))
    }

    /// Back to the anonymous state with nothing left over from the old user.
    pub fn logout(&mut self) -> Notice {
        self.session.logout();
        self.selected = None;
        self.catalog.clear();
        self.conversation.reset();
        Notice::info("Logged out.")
    }
}

fn caught(err: &ClientError, fallback: &str) -> Notice {
    if !err.is_local() {
        warn!(error = %err, "request failed");
    }
    Notice::from_error(err, fallback)
}
