//! # Eventra
//!
//! Typed client SDK for the Eventra event-management platform.
//!
//! The client keeps a user's session alive on its own: it attaches the
//! stored access token to every call, and when the server answers 401 it
//! refreshes the token once (however many calls failed at the same time)
//! and replays each failed call once. If the refresh fails the session
//! ends and subscribers receive [`SessionEvent::Expired`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use eventra::prelude::*;
//!
//! # async fn run() -> Result<(), EventraError> {
//! let client = eventra::connect(ClientConfig::from_env()?)?;
//! client.auth().bootstrap().await;
//!
//! if !client.session().is_authenticated() {
//!     client.auth().login("ada@example.com", "hunter2").await?;
//! }
//! let events = client.events().list(&EventFilters::default()).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Crates
//!
//! ```text
//! eventra            (this crate) config, client, endpoint groups, dashboard
//! eventra-session    tokens, refresh, session lifecycle
//! eventra-protocol   wire types, endpoints, error bodies
//! eventra-transport  HttpTransport trait, reqwest implementation
//! ```

mod api;
mod client;
mod config;
pub mod dashboard;
mod error;

pub use api::{AuthApi, EventsApi, RegistrationsApi, SessionsApi};
#[cfg(feature = "reqwest")]
pub use client::connect;
pub use client::{ClientTokenStore, EventraClient, EventraClientBuilder};
pub use config::ClientConfig;
pub use error::EventraError;

pub use eventra_protocol as protocol;
pub use eventra_session as session;
pub use eventra_transport as transport;

pub use eventra_session::{SessionEvent, SessionState};

/// Everything an application usually needs.
pub mod prelude {
    pub use crate::dashboard::{Dashboard, filter_events, partition_registrations};
    pub use crate::{ClientConfig, EventraClient, EventraClientBuilder, EventraError};

    pub use eventra_protocol::{
        CheckInResult, Event, EventDraft, EventFilters, EventSession, Id, NewUser, ProfileUpdate,
        Registration, Role, SessionDraft, Upload, User,
    };
    pub use eventra_session::{
        AuthSuccess, FileTokenStore, MemoryTokenStore, SessionConfig, SessionError, SessionEvent,
        SessionManager, SessionState, TokenStore,
    };
    pub use eventra_transport::{ApiRequest, ApiResponse, HttpTransport};
    #[cfg(feature = "reqwest")]
    pub use eventra_transport::ReqwestTransport;
}
