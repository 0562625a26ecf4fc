use thiserror::Error;

/// Everything that can go wrong talking to the document backend.
///
/// Authorization failures arrive as `Backend` with a 401/403 status and are
/// not treated differently from any other rejection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("backend returned {status}{}", detail_suffix(.detail))]
    Backend { status: u16, detail: Option<String> },

    #[error("unexpected response body: {0}")]
    Decode(String),

    /// A local precondition failed; no request was issued.
    #[error("{0}")]
    Validation(String),

    #[error("not logged in")]
    Unauthenticated,
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail
        .as_deref()
        .map(|d| format!(": {d}"))
        .unwrap_or_default()
}

pub const LOGIN_REQUIRED: &str = "Please log in first.";

impl ClientError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Text for a user-facing notice. Backend `detail` strings and local
    /// validation messages are shown as-is; everything else uses `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Backend {
                detail: Some(detail),
                ..
            } if !detail.is_empty() => detail.clone(),
            Self::Validation(message) => message.clone(),
            Self::Unauthenticated => LOGIN_REQUIRED.to_string(),
            _ => fallback.to_string(),
        }
    }

    /// True when the failure happened before any request left the client.
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Unauthenticated)
    }
}
