//! Wire types for the Eventra REST API.
//!
//! Auth payloads are typed strictly because the session layer depends on
//! their shape. Domain payloads (users, events, sessions, registrations)
//! type only the fields this SDK reads; every other field the backend
//! sends is kept in a flattened `extra` map so it passes through unchanged.

use std::fmt;

use chrono::NaiveDate;
use eventra_transport::FormPart;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Backend primary key.
pub type Id = u64;

// ---------------------------------------------------------------------------
// Auth payloads
// ---------------------------------------------------------------------------

/// Body of `POST /auth/login/`.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// The access/refresh pair issued together by login and registration.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access", &"<redacted>")
            .field("refresh", &"<redacted>")
            .finish()
    }
}

/// Success body of login and registration: `{user, tokens:{access,refresh}}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    pub tokens: TokenPair,
}

/// Body of `POST /auth/refresh/`.
#[derive(Debug, Clone, Serialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

/// Success body of `POST /auth/refresh/`.
///
/// `refresh` is only present when the backend rotates refresh tokens.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RefreshResponse {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

/// Body of `POST /auth/logout/`; the backend blacklists this refresh token.
#[derive(Debug, Clone, Serialize)]
pub struct LogoutRequest {
    pub refresh: String,
}

/// Account role. Decides which dashboard a user gets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Attendee,
    Organizer,
}

/// Body of `POST /auth/register/`.
#[derive(Clone, Serialize)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    /// Free-form, comma-separated interests used for recommendations.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub interests: String,
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("email", &self.email)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

/// The authenticated user as returned by login, registration and
/// `GET /auth/profile/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Id,
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub interests: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    pub fn is_organizer(&self) -> bool {
        self.role.as_deref() == Some("organizer")
    }

    /// "First Last", falling back to the email when no name is set.
    pub fn display_name(&self) -> String {
        let name = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if name.is_empty() {
            self.email.clone()
        } else {
            name
        }
    }
}

/// Form body of `PUT /auth/profile/`. Every field is sent, blank or not,
/// so a cleared field clears the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub interests: String,
}

impl ProfileUpdate {
    /// Prefills the form from the current user.
    pub fn from_user(user: &User) -> Self {
        Self {
            first_name: user.first_name.clone().unwrap_or_default(),
            last_name: user.last_name.clone().unwrap_or_default(),
            email: user.email.clone(),
            interests: user.interests.clone().unwrap_or_default(),
        }
    }

    pub fn to_form(&self) -> Vec<FormPart> {
        vec![
            FormPart::text("first_name", &self.first_name),
            FormPart::text("last_name", &self.last_name),
            FormPart::text("email", &self.email),
            FormPart::text("interests", &self.interests),
        ]
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// The organizer summary embedded in an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organizer {
    pub id: Id,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: Id,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub venue_name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub capacity: Option<u32>,
    #[serde(default)]
    pub total_registrations: Option<u32>,
    #[serde(default)]
    pub is_full: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub organizer: Option<Organizer>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Query filters for `GET /events/`. Unset filters are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilters {
    pub search: Option<String>,
    pub category: Option<String>,
    pub city: Option<String>,
}

impl EventFilters {
    /// The filters as `(name, value)` query pairs, in a stable order.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        [
            ("search", &self.search),
            ("category", &self.category),
            ("city", &self.city),
        ]
        .into_iter()
        .filter_map(|(key, value)| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| (key, v.to_string()))
        })
        .collect()
    }
}

/// A file attached to a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

/// Form body for creating or updating an event.
///
/// Sent as `multipart/form-data` because of the optional banner image.
/// Empty fields are left out of the form entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventDraft {
    pub title: String,
    pub description: String,
    pub category: String,
    pub capacity: Option<u32>,
    pub date: Option<NaiveDate>,
    pub start_time: String,
    pub end_time: String,
    pub venue_name: String,
    pub location: String,
    pub city: String,
    pub country: String,
    pub banner_image: Option<Upload>,
}

impl EventDraft {
    pub fn to_form(&self) -> Vec<FormPart> {
        let capacity = self.capacity.map(|c| c.to_string()).unwrap_or_default();
        let date = self
            .date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();

        let mut parts: Vec<FormPart> = [
            ("title", self.title.as_str()),
            ("description", self.description.as_str()),
            ("category", self.category.as_str()),
            ("capacity", capacity.as_str()),
            ("date", date.as_str()),
            ("start_time", self.start_time.as_str()),
            ("end_time", self.end_time.as_str()),
            ("venue_name", self.venue_name.as_str()),
            ("location", self.location.as_str()),
            ("city", self.city.as_str()),
            ("country", self.country.as_str()),
        ]
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(name, value)| FormPart::text(name, value))
        .collect();

        if let Some(banner) = &self.banner_image {
            parts.push(FormPart::File {
                name: "banner_image".into(),
                file_name: banner.file_name.clone(),
                content_type: banner.content_type.clone(),
                data: banner.data.clone(),
            });
        }
        parts
    }
}

/// Body of `POST /events/recommendations/`.
#[derive(Debug, Clone, Serialize)]
pub struct RecommendationRequest {
    #[serde(rename = "userInterests")]
    pub user_interests: String,
    #[serde(rename = "availableEvents")]
    pub available_events: Vec<Event>,
}

// ---------------------------------------------------------------------------
// Sessions (talks/slots inside an event)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSession {
    pub id: Id,
    #[serde(default)]
    pub event: Option<Id>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub speaker_name: Option<String>,
    #[serde(default)]
    pub speaker_bio: Option<String>,
    #[serde(default)]
    pub room: Option<String>,
    #[serde(default)]
    pub track: Option<String>,
    #[serde(default)]
    pub topics: Option<String>,
    #[serde(default)]
    pub max_attendees: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// JSON body for creating or updating a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionDraft {
    pub event: Id,
    pub title: String,
    pub description: String,
    pub start_time: String,
    pub end_time: String,
    pub speaker_name: String,
    pub speaker_bio: String,
    pub room: String,
    pub track: String,
    pub topics: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_attendees: Option<u32>,
}

// ---------------------------------------------------------------------------
// Registrations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    pub id: Id,
    pub event: Event,
    #[serde(default)]
    pub registration_code: Option<String>,
    /// Base64 or URL of the QR image encoding `registration_code`.
    #[serde(default)]
    pub qr_code: Option<String>,
    #[serde(default)]
    pub checked_in: bool,
    #[serde(default)]
    pub checked_in_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of `POST /registrations/check-in/`.
#[derive(Debug, Clone, Serialize)]
pub struct CheckInRequest {
    pub registration_code: String,
}

/// Success body of a check-in.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CheckInResult {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub event: Option<Value>,
    #[serde(default)]
    pub user: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
