//! Paths of every backend endpoint, relative to the API base URL.
//!
//! Two predicates classify paths for the session layer:
//! - [`is_auth_endpoint`]: a 401 here means "bad credentials", never
//!   "access token expired", so it must not trigger a refresh.
//! - [`is_public_endpoint`]: no bearer token is attached.

use crate::Id;

pub const AUTH_REGISTER: &str = "/auth/register/";
pub const AUTH_LOGIN: &str = "/auth/login/";
pub const AUTH_REFRESH: &str = "/auth/refresh/";
pub const AUTH_LOGOUT: &str = "/auth/logout/";
pub const AUTH_PROFILE: &str = "/auth/profile/";

pub const EVENTS: &str = "/events/";
pub const EVENT_CREATE: &str = "/events/create/";
pub const MY_EVENTS: &str = "/events/my-events/";
pub const EVENT_RECOMMENDATIONS: &str = "/events/recommendations/";

pub const SESSION_CREATE: &str = "/sessions/create/";

pub const MY_REGISTRATIONS: &str = "/registrations/my-registrations/";
pub const CHECK_IN: &str = "/registrations/check-in/";

pub fn event_detail(id: Id) -> String {
    format!("/events/{id}/")
}

pub fn event_update(id: Id) -> String {
    format!("/events/{id}/update/")
}

pub fn event_delete(id: Id) -> String {
    format!("/events/{id}/delete/")
}

pub fn event_register(id: Id) -> String {
    format!("/events/{id}/register/")
}

pub fn event_unregister(id: Id) -> String {
    format!("/events/{id}/unregister/")
}

pub fn event_sessions(event_id: Id) -> String {
    format!("/sessions/events/{event_id}/sessions/")
}

pub fn session_detail(id: Id) -> String {
    format!("/sessions/{id}/")
}

pub fn session_update(id: Id) -> String {
    format!("/sessions/{id}/update/")
}

pub fn session_delete(id: Id) -> String {
    format!("/sessions/{id}/delete/")
}

/// Login, register and logout. Their 401s are surfaced to the caller.
pub fn is_auth_endpoint(path: &str) -> bool {
    matches_any(path, &[AUTH_LOGIN, AUTH_REGISTER, AUTH_LOGOUT])
}

/// Login, register and refresh. Called without a bearer token.
pub fn is_public_endpoint(path: &str) -> bool {
    matches_any(path, &[AUTH_LOGIN, AUTH_REGISTER, AUTH_REFRESH])
}

/// Compares paths ignoring leading/trailing slashes, so `auth/login` and
/// `/auth/login/` are the same endpoint.
fn matches_any(path: &str, candidates: &[&str]) -> bool {
    let path = path.trim_matches('/');
    candidates.iter().any(|c| c.trim_matches('/') == path)
}
