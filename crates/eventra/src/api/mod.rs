//! Typed endpoint groups, one per backend area.
//!
//! Each group borrows the client's [`SessionManager`], so every call goes
//! through the same bearer/refresh/replay pipeline. Non-2xx answers are
//! classified by [`EventraError::from_server`] and returned to the caller;
//! nothing here retries on its own.

mod auth;
mod events;
mod registrations;
mod sessions;

pub use auth::AuthApi;
pub use events::EventsApi;
pub use registrations::RegistrationsApi;
pub use sessions::SessionsApi;

use eventra_protocol::{Codec, JsonCodec, ServerError};
use eventra_session::{SessionManager, TokenStore};
use eventra_transport::{ApiRequest, ApiResponse, HttpTransport};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::EventraError;

/// Sends `request` and turns a non-2xx answer into an error.
/// `fallback` is the message used when the error body carries none.
async fn send<T: HttpTransport, S: TokenStore>(
    session: &SessionManager<T, S>,
    request: ApiRequest,
    fallback: &str,
) -> Result<ApiResponse, EventraError> {
    let method = request.method();
    let path = request.path().to_string();

    let response = session.execute(request).await?;
    if response.is_success() {
        tracing::debug!(%method, %path, status = response.status(), "api call succeeded");
        return Ok(response);
    }

    let err = ServerError::from_body(response.status(), response.body(), fallback);
    tracing::debug!(%method, %path, status = err.status, message = %err.message, "api call failed");
    Err(EventraError::from_server(err))
}

/// Like [`send`], decoding the success body as `R`.
async fn fetch<T: HttpTransport, S: TokenStore, R: DeserializeOwned>(
    session: &SessionManager<T, S>,
    request: ApiRequest,
    fallback: &str,
) -> Result<R, EventraError> {
    let response = send(session, request, fallback).await?;
    Ok(JsonCodec.decode(response.body())?)
}

fn with_json<B: Serialize>(request: ApiRequest, body: &B) -> Result<ApiRequest, EventraError> {
    Ok(request.json_body(JsonCodec.encode(body)?))
}
