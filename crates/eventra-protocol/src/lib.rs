//! Wire protocol for the Eventra REST API.
//!
//! This crate defines what travels between the client and the backend:
//!
//! - **Types** ([`AuthResponse`], [`Event`], [`Registration`], etc.):
//!   request and response bodies.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how bodies are converted
//!   to/from bytes.
//! - **Endpoints** ([`endpoints`]): every path the client calls, plus the
//!   predicates the session layer uses to decide on bearer tokens and
//!   refreshes.
//! - **Server errors** ([`ServerError`]): normalized non-2xx bodies.
//!
//! # Architecture
//!
//! ```text
//! Transport (bytes) → Protocol (typed bodies) → Session (credentials)
//! ```

mod codec;
pub mod endpoints;
mod error;
mod server_error;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use server_error::{FieldErrors, ServerError};
pub use types::{
    AuthResponse, CheckInRequest, CheckInResult, Credentials, Event, EventDraft, EventFilters,
    EventSession, Id, LogoutRequest, NewUser, Organizer, ProfileUpdate, RecommendationRequest,
    RefreshRequest, RefreshResponse, Registration, Role, SessionDraft, TokenPair, Upload, User,
};
