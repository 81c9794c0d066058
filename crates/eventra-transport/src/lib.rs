//! Transport abstraction layer for the Eventra client.
//!
//! Provides the [`HttpTransport`] trait that abstracts over how a request
//! reaches the Eventra REST backend. The session layer only ever talks to
//! this trait, so tests can swap in a scripted transport.
//!
//! # Feature Flags
//!
//! - `reqwest` (default): HTTP transport via `reqwest`

mod error;
#[cfg(feature = "reqwest")]
mod http;
mod message;

pub use error::TransportError;
#[cfg(feature = "reqwest")]
pub use http::ReqwestTransport;
pub use message::{ApiRequest, ApiResponse, AUTHORIZATION, Body, FormPart, Method};

use std::future::Future;

/// Sends requests to the backend and returns whatever it answered.
///
/// Implementations resolve `request.path()` against their own base URL.
/// A response with a non-2xx status is still `Ok`; only failures to get a
/// response at all (connect, timeout, broken body) are errors.
///
/// # Trait bounds
///
/// - `Send + Sync + 'static` → one transport is shared by every request
///   the client makes, possibly from different Tokio tasks.
/// - the returned future is `Send` → the session layer boxes it into a
///   shared refresh future that any task may poll.
pub trait HttpTransport: Send + Sync + 'static {
    /// Sends one request and waits for the full response.
    fn send(
        &self,
        request: &ApiRequest,
    ) -> impl Future<Output = Result<ApiResponse, TransportError>> + Send;
}
