use eventra_protocol::{NewUser, ProfileUpdate, User, endpoints};
use eventra_session::{AuthSuccess, SessionEvent, SessionManager, SessionState, TokenStore};
use eventra_transport::{ApiRequest, HttpTransport};
use tokio::sync::broadcast;

use super::{fetch, send};
use crate::EventraError;

/// Account endpoints and the session lifecycle.
pub struct AuthApi<'a, T, S> {
    session: &'a SessionManager<T, S>,
}

impl<'a, T: HttpTransport, S: TokenStore> AuthApi<'a, T, S> {
    pub(crate) fn new(session: &'a SessionManager<T, S>) -> Self {
        Self { session }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSuccess, EventraError> {
        Ok(self.session.login(email, password).await?)
    }

    pub async fn register(&self, user: &NewUser) -> Result<AuthSuccess, EventraError> {
        Ok(self.session.register(user).await?)
    }

    /// Always ends the local session, even if the server can't be reached.
    pub async fn logout(&self) {
        self.session.logout().await;
    }

    /// Restores the session from stored tokens. Call once at startup.
    pub async fn bootstrap(&self) -> SessionState {
        self.session.bootstrap().await
    }

    pub async fn profile(&self) -> Result<User, EventraError> {
        let request = ApiRequest::get(endpoints::AUTH_PROFILE);
        fetch(self.session, request, "Failed to load profile").await
    }

    /// Saves the profile form, then reloads the profile so the session
    /// holds what the server stored.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, EventraError> {
        let request = ApiRequest::put(endpoints::AUTH_PROFILE).multipart(update.to_form());
        send(self.session, request, "Failed to update profile").await?;

        let user = self.profile().await?;
        self.session.set_user(user.clone());
        tracing::info!(user_id = user.id, "profile updated");
        Ok(user)
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.session.subscribe()
    }
}
