//! Authenticated session management for the Eventra client.
//!
//! This crate keeps a user logged in across every request the client
//! makes:
//!
//! 1. **Token storage**: where the access/refresh pair lives
//!    ([`TokenStore`] trait, [`MemoryTokenStore`], [`FileTokenStore`])
//! 2. **Request pipeline**: attaching the bearer token, detecting 401s,
//!    refreshing once for any number of failed requests, replaying each
//!    failed request once ([`SessionManager::execute`])
//! 3. **Lifecycle**: login, registration, logout and startup bootstrap,
//!    observable through [`SessionState`] and [`SessionEvent`]
//!
//! # How it fits in the stack
//!
//! ```text
//! Client facade (above)  ← typed endpoint calls
//!     ↕
//! Session Layer (this crate)  ← credentials, refresh, replay
//!     ↕
//! Protocol + Transport (below)  ← wire types, HTTP
//! ```

mod error;
mod manager;
mod refresh;
mod session;
pub mod store;

use std::sync::{Mutex, MutexGuard, PoisonError};

pub use error::SessionError;
pub use manager::SessionManager;
pub use session::{AuthSuccess, SessionConfig, SessionEvent, SessionState};
pub use store::{FileTokenStore, MemoryTokenStore, TokenStore};

/// Locks a mutex, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
