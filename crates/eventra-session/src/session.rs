//! Session types: configuration, the observable session state, and the
//! events broadcast when it changes.

use std::time::Duration;

use eventra_protocol::{TokenPair, User};

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Configuration for session behavior.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Upper bound on one refresh call. A refresh that takes longer is
    /// treated as rejected and ends the session, so queued requests are
    /// never stuck behind a hung refresh.
    ///
    /// Default: 10 seconds.
    pub refresh_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            refresh_timeout: Duration::from_secs(10),
        }
    }
}

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// Who the client is, as far as the UI should know.
///
/// ```text
///   Pending ──(bootstrap)──→ Anonymous ──(login/register)──→ Authenticated
///      │                        ↑                                 │
///      └──(bootstrap ok)────────┼─────────────────────────────────┤
///                               └──(logout / refresh failure)─────┘
/// ```
///
/// - **Pending**: bootstrap has not settled yet. Protected content must
///   not render.
/// - **Anonymous**: no usable credentials.
/// - **Authenticated**: an access token is stored and the user payload
///   came from the last successful login, registration or profile fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Pending,
    Anonymous,
    Authenticated(User),
}

impl SessionState {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            Self::Authenticated(user) => Some(user),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// SessionEvent
// ---------------------------------------------------------------------------

/// Broadcast whenever a session starts or ends.
///
/// The UI shell subscribes to these instead of the data layer navigating
/// on its own: on [`SessionEvent::Expired`] it routes to the login page.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Login or registration succeeded.
    Authenticated(User),
    /// The user logged out.
    LoggedOut,
    /// The refresh failed; tokens were cleared.
    Expired { reason: String },
}

/// Result of a successful login or registration.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthSuccess {
    pub user: User,
    pub tokens: TokenPair,
}
