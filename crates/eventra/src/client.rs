//! `EventraClient` builder and entry point.
//!
//! This ties the layers together: transport → session → typed endpoint
//! groups.

use std::path::PathBuf;
use std::time::Duration;

use eventra_protocol::Registration;
use eventra_session::{
    FileTokenStore, MemoryTokenStore, SessionError, SessionManager, TokenStore,
};
use eventra_transport::HttpTransport;
#[cfg(feature = "reqwest")]
use eventra_transport::ReqwestTransport;

use crate::api::{AuthApi, EventsApi, RegistrationsApi, SessionsApi};
use crate::{ClientConfig, dashboard};
#[cfg(feature = "reqwest")]
use crate::EventraError;

/// Builder for configuring an [`EventraClient`].
///
/// # Example
///
/// ```rust,ignore
/// use eventra::prelude::*;
///
/// let client = EventraClient::builder()
///     .api_url("https://eventra.example.com/api")
///     .token_file("/home/ada/.config/eventra/tokens.json")
///     .build()?;
/// client.auth().bootstrap().await;
/// ```
#[derive(Debug, Clone, Default)]
pub struct EventraClientBuilder {
    config: ClientConfig,
}

impl EventraClientBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole configuration, e.g. one read with
    /// [`ClientConfig::from_env`].
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_url = url.into();
        self
    }

    pub fn refresh_timeout(mut self, timeout: Duration) -> Self {
        self.config.refresh_timeout = timeout;
        self
    }

    pub fn request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Persists tokens at `path` instead of keeping them in memory.
    pub fn token_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.token_file = Some(path.into());
        self
    }

    /// Builds a client over any transport and store.
    pub fn build_with<T: HttpTransport, S: TokenStore>(
        self,
        transport: T,
        store: S,
    ) -> EventraClient<T, S> {
        let session = SessionManager::new(transport, store, self.config.session_config());
        EventraClient {
            session,
            config: self.config,
        }
    }

    /// Builds a client over HTTP, storing tokens in the configured file or
    /// in memory.
    ///
    /// # Errors
    /// Returns [`EventraError::Transport`] if the API URL is not an
    /// `http(s)` URL or the HTTP client can't be created.
    #[cfg(feature = "reqwest")]
    pub fn build(self) -> Result<EventraClient<ReqwestTransport, ClientTokenStore>, EventraError> {
        let transport = ReqwestTransport::with_timeout(&self.config.api_url, self.config.request_timeout)?;
        let store = match &self.config.token_file {
            Some(path) => ClientTokenStore::File(FileTokenStore::open(path)),
            None => ClientTokenStore::Memory(MemoryTokenStore::new()),
        };
        tracing::debug!(api_url = %self.config.api_url, persistent = self.config.token_file.is_some(), "client configured");
        Ok(self.build_with(transport, store))
    }
}

/// Builds an HTTP client from `config`. Shorthand for
/// `EventraClient::builder().config(config).build()`.
#[cfg(feature = "reqwest")]
pub fn connect(
    config: ClientConfig,
) -> Result<EventraClient<ReqwestTransport, ClientTokenStore>, EventraError> {
    EventraClientBuilder::new().config(config).build()
}

/// The token store [`EventraClientBuilder::build`] picks from the
/// configuration.
#[derive(Debug)]
pub enum ClientTokenStore {
    Memory(MemoryTokenStore),
    File(FileTokenStore),
}

impl TokenStore for ClientTokenStore {
    fn get(&self, key: &str) -> Option<String> {
        match self {
            Self::Memory(store) => store.get(key),
            Self::File(store) => store.get(key),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SessionError> {
        match self {
            Self::Memory(store) => store.set(key, value),
            Self::File(store) => store.set(key, value),
        }
    }

    fn remove(&self, key: &str) -> Result<(), SessionError> {
        match self {
            Self::Memory(store) => store.remove(key),
            Self::File(store) => store.remove(key),
        }
    }
}

/// A client for the Eventra API.
///
/// Cheap to clone; clones share one session. Endpoint calls are grouped:
/// [`auth`](Self::auth), [`events`](Self::events),
/// [`sessions`](Self::sessions), [`registrations`](Self::registrations).
pub struct EventraClient<T, S> {
    session: SessionManager<T, S>,
    config: ClientConfig,
}

impl<T, S> Clone for EventraClient<T, S> {
    fn clone(&self) -> Self {
        Self {
            session: self.session.clone(),
            config: self.config.clone(),
        }
    }
}

impl EventraClient<(), ()> {
    /// Creates a new builder.
    pub fn builder() -> EventraClientBuilder {
        EventraClientBuilder::new()
    }
}

impl<T: HttpTransport, S: TokenStore> EventraClient<T, S> {
    /// The session manager behind every call, for raw requests and state
    /// subscriptions.
    pub fn session(&self) -> &SessionManager<T, S> {
        &self.session
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn auth(&self) -> AuthApi<'_, T, S> {
        AuthApi::new(&self.session)
    }

    pub fn events(&self) -> EventsApi<'_, T, S> {
        EventsApi::new(&self.session)
    }

    pub fn sessions(&self) -> SessionsApi<'_, T, S> {
        SessionsApi::new(&self.session)
    }

    pub fn registrations(&self) -> RegistrationsApi<'_, T, S> {
        RegistrationsApi::new(&self.session)
    }

    /// Absolute URL of a registration's QR ticket image.
    pub fn qr_code_url(&self, registration: &Registration) -> Option<String> {
        dashboard::qr_code_url(registration, &self.config.media_origin())
    }
}
