use crate::error::ClientError;
use crate::models::{ChatQuery, Credentials, FileId, FileRecord, FileUpload, Message};
use std::future::Future;

pub type BackendResult<T> = Result<T, ClientError>;

/// The document backend as seen by the client.
///
/// `token` is the session's bearer token; `None` sends the request without
/// an `Authorization` header and lets the backend reject it.
pub trait DocumentBackend {
    fn signup(&self, credentials: &Credentials) -> impl Future<Output = BackendResult<()>> + Send;

    /// Returns the access token.
    fn login(&self, credentials: &Credentials) -> impl Future<Output = BackendResult<String>> + Send;

    fn list_files(&self, token: Option<&str>) -> impl Future<Output = BackendResult<Vec<FileRecord>>> + Send;

    fn file_content(
        &self,
        token: Option<&str>,
        id: &FileId,
    ) -> impl Future<Output = BackendResult<String>> + Send;

    fn upload_file(
        &self,
        token: Option<&str>,
        upload: &FileUpload,
        external_api_key: &str,
    ) -> impl Future<Output = BackendResult<()>> + Send;

    fn chat_history(
        &self,
        token: Option<&str>,
        id: &FileId,
    ) -> impl Future<Output = BackendResult<Vec<Message>>> + Send;

    /// Returns the assistant's answer.
    fn query(&self, token: Option<&str>, query: &ChatQuery) -> impl Future<Output = BackendResult<String>> + Send;
}
