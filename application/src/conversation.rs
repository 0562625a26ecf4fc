use domain::backend::DocumentBackend;
use domain::error::ClientError;
use domain::models::{format_history, ChatQuery, FileId, Message};
use domain::session::SessionStore;
use tracing::{debug, warn};

pub const QUERY_FIELDS_MISSING: &str =
    "Please ensure you have selected a file, entered a query, and set your external API key.";
pub const QUERY_FAILED: &str = "Enter the respective external API key you used to store the file";
pub const HISTORY_FAILED: &str = "Failed to fetch conversation history.";
pub const NO_HISTORY: &str = "There is no conversation for this file yet.";

/// Message history for the selected file plus the pending query text.
pub struct ConversationView<B> {
    backend: B,
    file_id: Option<FileId>,
    messages: Vec<Message>,
    draft: String,
}

impl<B: DocumentBackend> ConversationView<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            file_id: None,
            messages: Vec::new(),
            draft: String::new(),
        }
    }

    pub fn file_id(&self) -> Option<&FileId> {
        self.file_id.as_ref()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Switches to `file_id` and replaces the messages with its backend
    /// history. If the fetch fails the old messages are kept.
    pub async fn load_history(&mut self, session: &SessionStore, file_id: Option<&FileId>) -> Result<(), ClientError> {
        self.file_id = file_id.cloned();
        let Some(id) = file_id else {
            self.messages.clear();
            return Ok(());
        };
        match self.backend.chat_history(session.token(), id).await {
            Ok(history) => {
                debug!(file_id = %id, count = history.len(), "history loaded");
                self.messages = history;
                Ok(())
            }
            Err(err) => {
                warn!(file_id = %id, error = %err, "history fetch failed");
                Err(err)
            }
        }
    }

    /// Stores `text` as the draft and submits it.
    pub async fn send_query(&mut self, session: &SessionStore, text: impl Into<String>) -> Result<(), ClientError> {
        self.draft = text.into();
        self.submit(session).await
    }

    /// Appends the user message and the answer, in that order, and clears
    /// the draft. Nothing changes on failure.
    pub async fn submit(&mut self, session: &SessionStore) -> Result<(), ClientError> {
        let key = session.external_api_key();
        let file_id = match &self.file_id {
            Some(id) if !self.draft.is_empty() && !key.is_empty() => id.clone(),
            _ => return Err(ClientError::validation(QUERY_FIELDS_MISSING)),
        };
        let query = ChatQuery {
            file_id,
            query: self.draft.clone(),
            history: format_history(&self.messages),
            external_api_key: key.to_string(),
        };

        let answer = self
            .backend
            .query(session.token(), &query)
            .await
            .inspect_err(|err| warn!(file_id = %query.file_id, error = %err, "query failed"))?;

        self.messages.push(Message::user(query.query));
        self.messages.push(Message::assistant(answer));
        self.draft.clear();
        Ok(())
    }

    pub fn reset(&mut self) {
        self.file_id = None;
        self.messages.clear();
        self.draft.clear();
    }
}
