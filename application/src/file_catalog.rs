use domain::backend::DocumentBackend;
use domain::error::ClientError;
use domain::models::{FileDetail, FileId, FileRecord, FileUpload};
use domain::session::SessionStore;
use std::collections::HashMap;
use tracing::{debug, warn};

pub const LIST_FAILED: &str = "Failed to fetch files.";
pub const UPLOAD_FIELDS_MISSING: &str = "Please fill all fields.";
pub const UPLOAD_OK: &str = "File uploaded successfully.";
pub const UPLOAD_FAILED: &str = "Upload failed, either the file is too large or the API key is invalid, \
                                 or there is no space left in your vector store account.";

/// Uploaded files and their lazily fetched contents.
///
/// Details are cached per id for the life of the catalog, failures included,
/// and are not dropped when the list is refreshed.
pub struct FileCatalog<B> {
    backend: B,
    files: Vec<FileRecord>,
    details: HashMap<FileId, FileDetail>,
}

impl<B: DocumentBackend> FileCatalog<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            files: Vec::new(),
            details: HashMap::new(),
        }
    }

    pub fn files(&self) -> &[FileRecord] {
        &self.files
    }

    pub fn find(&self, id: &FileId) -> Option<&FileRecord> {
        self.files.iter().find(|f| &f.id == id)
    }

    pub fn cached_detail(&self, id: &FileId) -> Option<&FileDetail> {
        self.details.get(id)
    }

    /// Replaces the cached list on success. On failure the previous list
    /// stays in place.
    pub async fn list_files(&mut self, session: &SessionStore) -> Result<&[FileRecord], ClientError> {
        match self.backend.list_files(session.token()).await {
            Ok(files) => {
                debug!(count = files.len(), "file list refreshed");
                self.files = files;
                Ok(&self.files)
            }
            Err(err) => {
                warn!(error = %err, "file list refresh failed");
                Err(err)
            }
        }
    }

    pub async fn fetch_detail(&mut self, session: &SessionStore, id: &FileId) -> &FileDetail {
        if !self.details.contains_key(id) {
            let detail = match self.backend.file_content(session.token(), id).await {
                Ok(content) => FileDetail::Loaded(content),
                Err(err) => {
                    warn!(file_id = %id, error = %err, "file detail unavailable");
                    FileDetail::Unavailable
                }
            };
            self.details.insert(id.clone(), detail);
        }
        &self.details[id]
    }

    /// Sends the file with the session's external API key. Missing bytes,
    /// name or key are rejected before any request.
    pub async fn upload(&mut self, session: &SessionStore, upload: &FileUpload) -> Result<(), ClientError> {
        let key = session.external_api_key();
        if upload.bytes.is_none() || upload.file_name.is_empty() || key.is_empty() {
            return Err(ClientError::validation(UPLOAD_FIELDS_MISSING));
        }
        self.backend
            .upload_file(session.token(), upload, key)
            .await
            .inspect_err(|err| warn!(file_name = %upload.file_name, error = %err, "upload failed"))
    }

    pub fn clear(&mut self) {
        self.files.clear();
        self.details.clear();
    }
}
