//! A fake Eventra backend for client integration tests.
//!
//! It validates bearer tokens the way the real server does: one access
//! token is valid at a time, `/auth/refresh/` trades the refresh token for
//! the current access token, and any other route answers from a table.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use eventra::prelude::*;
use eventra::protocol::endpoints;
use eventra::transport::{Body, Method, TransportError};
use serde_json::{Value, json};

struct State {
    access: String,
    refresh: String,
    rotations: u32,
    routes: HashMap<(Method, String), (u16, Value)>,
    log: Vec<ApiRequest>,
}

#[derive(Clone)]
pub struct FakeBackend {
    state: Arc<Mutex<State>>,
}

impl FakeBackend {
    /// A backend that accepts access token `A1` and refresh token `R1`.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                access: "A1".into(),
                refresh: "R1".into(),
                rotations: 1,
                routes: HashMap::new(),
                log: Vec::new(),
            })),
        }
    }

    /// Answers `method path` with `status` and `body` from now on.
    pub fn on(&self, method: Method, path: impl Into<String>, status: u16, body: Value) -> &Self {
        self.state
            .lock()
            .unwrap()
            .routes
            .insert((method, path.into()), (status, body));
        self
    }

    /// Invalidates the current access token, as if it timed out. The next
    /// refresh hands out `A2`, then `A3`, ...
    pub fn expire_access(&self) {
        let mut state = self.state.lock().unwrap();
        state.rotations += 1;
        state.access = format!("A{}", state.rotations);
    }

    /// Blacklists the refresh token.
    pub fn revoke_refresh(&self) {
        self.state.lock().unwrap().refresh = "revoked".into();
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.state.lock().unwrap().log.clone()
    }

    pub fn last(&self, path: &str) -> Option<ApiRequest> {
        self.requests().into_iter().rev().find(|r| r.path() == path)
    }

    pub fn count(&self, path: &str) -> usize {
        self.requests().iter().filter(|r| r.path() == path).count()
    }

    fn answer(&self, request: &ApiRequest) -> ApiResponse {
        let mut state = self.state.lock().unwrap();
        state.log.push(request.clone());

        if request.path() == endpoints::AUTH_REFRESH {
            let sent = json_body(request)["refresh"].as_str().map(str::to_string);
            return if sent.as_deref() == Some(state.refresh.as_str()) {
                respond(200, &json!({"access": state.access}))
            } else {
                respond(401, &json!({"detail": "Token is blacklisted", "code": "token_not_valid"}))
            };
        }

        if !endpoints::is_public_endpoint(request.path())
            && request.bearer_token() != Some(state.access.as_str())
        {
            return respond(
                401,
                &json!({"detail": "Given token not valid for any token type"}),
            );
        }

        match state
            .routes
            .get(&(request.method(), request.path().to_string()))
        {
            Some((status, body)) => respond(*status, body),
            None => respond(404, &json!({"detail": "Not found."})),
        }
    }
}

impl HttpTransport for FakeBackend {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        Ok(self.answer(request))
    }
}

fn respond(status: u16, body: &Value) -> ApiResponse {
    if body.is_null() {
        return ApiResponse::new(status, Vec::new());
    }
    ApiResponse::new(status, body.to_string())
}

/// The JSON body of `request`, or `null`.
pub fn json_body(request: &ApiRequest) -> Value {
    match request.body() {
        Body::Json(bytes) => serde_json::from_slice(bytes).unwrap_or(Value::Null),
        _ => Value::Null,
    }
}

pub fn user_json(id: u64, email: &str) -> Value {
    json!({"id": id, "email": email, "first_name": "Ada", "last_name": "Lovelace", "role": "attendee"})
}

pub fn event_json(id: u64, title: &str, date: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "category": "Technology",
        "date": date,
        "city": "Lagos",
        "capacity": 100,
        "total_registrations": 12,
        "is_full": false,
        "organizer": {"id": 9, "full_name": "Grace Hopper"},
    })
}

/// A client whose store already holds the backend's current tokens.
pub fn client(backend: &FakeBackend) -> EventraClient<FakeBackend, MemoryTokenStore> {
    EventraClient::builder().build_with(backend.clone(), MemoryTokenStore::with_tokens("A1", "R1"))
}

pub fn anonymous_client(backend: &FakeBackend) -> EventraClient<FakeBackend, MemoryTokenStore> {
    EventraClient::builder().build_with(backend.clone(), MemoryTokenStore::new())
}
