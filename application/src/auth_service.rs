use domain::backend::DocumentBackend;
use domain::error::ClientError;
use domain::models::Credentials;
use domain::session::{SessionStore, User};
use tracing::info;

pub const SIGNUP_OK: &str = "Signup successful. Please login.";
pub const AUTH_FAILED: &str = "An error occurred";

pub struct AuthService<B> {
    backend: B,
}

impl<B: DocumentBackend> AuthService<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub async fn signup(&self, credentials: &Credentials) -> Result<(), ClientError> {
        self.backend.signup(credentials).await?;
        info!(username = %credentials.username, "signed up");
        Ok(())
    }

    /// On success the session becomes authenticated as `credentials.username`.
    /// On failure the session is left as it was.
    pub async fn login(&self, session: &mut SessionStore, credentials: &Credentials) -> Result<(), ClientError> {
        let token = self.backend.login(credentials).await?;
        session.login(token, User::new(credentials.username.clone()));
        info!(username = %credentials.username, "logged in");
        Ok(())
    }
}
