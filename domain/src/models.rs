use serde::{Deserialize, Serialize};
use std::fmt;

/// Backend file identifier. The API has sent both numbers and strings, so
/// either form is accepted and kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "RawFileId", into = "String")]
pub struct FileId(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawFileId {
    Number(i64),
    Text(String),
}

impl From<RawFileId> for FileId {
    fn from(raw: RawFileId) -> Self {
        match raw {
            RawFileId::Number(n) => Self(n.to_string()),
            RawFileId::Text(s) => Self(s),
        }
    }
}

impl From<FileId> for String {
    fn from(id: FileId) -> Self {
        id.0
    }
}

impl FileId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One entry of `GET /files`. Content is fetched separately and cached by
/// the file catalog, keyed by `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: FileId,
    pub file_name: String,
}

pub const DETAIL_UNAVAILABLE: &str = "Error fetching details.";
pub const DETAIL_EMPTY: &str = "No content available.";

/// Cached result of a detail fetch. `Unavailable` is kept forever, same as
/// a successful fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileDetail {
    Loaded(String),
    Unavailable,
}

impl FileDetail {
    pub fn text(&self) -> &str {
        match self {
            Self::Loaded(content) if content.is_empty() => DETAIL_EMPTY,
            Self::Loaded(content) => content,
            Self::Unavailable => DETAIL_UNAVAILABLE,
        }
    }
}

impl fmt::Display for FileDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Replay format sent with every query: one `role: content` line per message.
pub fn format_history(messages: &[Message]) -> String {
    messages
        .iter()
        .map(|m| format!("{}: {}", m.role, m.content))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// A document picked for upload. `bytes` is `None` when nothing was picked.
#[derive(Clone, Default)]
pub struct FileUpload {
    pub file_name: String,
    pub source_name: String,
    pub bytes: Option<Vec<u8>>,
}

impl fmt::Debug for FileUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileUpload")
            .field("file_name", &self.file_name)
            .field("source_name", &self.source_name)
            .field("bytes", &self.bytes.as_ref().map(Vec::len))
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatQuery {
    pub file_id: FileId,
    pub query: String,
    pub history: String,
    pub external_api_key: String,
}
