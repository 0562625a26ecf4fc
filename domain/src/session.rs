use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
}

impl User {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }
}

/// Plain view of the session, handy for display and assertions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: Option<String>,
    pub user: Option<User>,
    pub external_api_key: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Anonymous,
    Authenticated,
}

/// Authentication state shared by reference with every component that
/// talks to the backend.
///
/// `user` is set exactly when `token` is set. The only way into the
/// authenticated state is [`SessionStore::login`] and the only way out is
/// [`SessionStore::logout`]. Token lifetime is not tracked.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    session: Session,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trusts the backend's answer; nothing is validated here.
    pub fn login(&mut self, token: impl Into<String>, user: User) {
        self.session.token = Some(token.into());
        self.session.user = Some(user);
    }

    pub fn logout(&mut self) {
        self.session = Session::default();
    }

    pub fn set_external_api_key(&mut self, key: impl Into<String>) {
        self.session.external_api_key = key.into();
    }

    pub fn token(&self) -> Option<&str> {
        self.session.token.as_deref()
    }

    pub fn user(&self) -> Option<&User> {
        self.session.user.as_ref()
    }

    pub fn external_api_key(&self) -> &str {
        &self.session.external_api_key
    }

    pub fn state(&self) -> AuthState {
        if self.session.token.is_some() {
            AuthState::Authenticated
        } else {
            AuthState::Anonymous
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.state() == AuthState::Authenticated
    }

    pub fn snapshot(&self) -> &Session {
        &self.session
    }
}
