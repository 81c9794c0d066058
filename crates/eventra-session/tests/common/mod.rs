//! Shared helpers for session integration tests: a scripted transport and
//! canned backend bodies.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use eventra_session::{MemoryTokenStore, SessionConfig, SessionManager};
use eventra_transport::{ApiRequest, ApiResponse, HttpTransport, TransportError};
use serde_json::{Value, json};

/// What the scripted backend answers to one request.
#[derive(Clone)]
pub struct Reply {
    result: Result<ApiResponse, TransportError>,
    delay: Duration,
}

impl Reply {
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            result: Ok(ApiResponse::new(status, body.to_string())),
            delay: Duration::ZERO,
        }
    }

    pub fn empty(status: u16) -> Self {
        Self {
            result: Ok(ApiResponse::new(status, Vec::new())),
            delay: Duration::ZERO,
        }
    }

    pub fn fail(error: TransportError) -> Self {
        Self {
            result: Err(error),
            delay: Duration::ZERO,
        }
    }

    /// Answers only after `delay` (virtual time under `start_paused`).
    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

type Handler = dyn Fn(&ApiRequest) -> Reply + Send + Sync;

/// A transport that answers from a closure and records every request.
#[derive(Clone)]
pub struct MockTransport {
    handler: Arc<Handler>,
    log: Arc<Mutex<Vec<ApiRequest>>>,
}

impl MockTransport {
    pub fn new(handler: impl Fn(&ApiRequest) -> Reply + Send + Sync + 'static) -> Self {
        Self {
            handler: Arc::new(handler),
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.log.lock().unwrap().clone()
    }

    /// Number of requests sent to `path`.
    pub fn count(&self, path: &str) -> usize {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.path() == path)
            .count()
    }
}

impl HttpTransport for MockTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        self.log.lock().unwrap().push(request.clone());
        let reply = (self.handler)(request);
        if !reply.delay.is_zero() {
            tokio::time::sleep(reply.delay).await;
        }
        reply.result
    }
}

pub fn user_json(id: u64, email: &str) -> Value {
    json!({
        "id": id,
        "email": email,
        "first_name": "Ada",
        "last_name": "Lovelace",
        "role": "attendee",
    })
}

pub fn auth_json(access: &str, refresh: &str) -> Value {
    json!({
        "user": user_json(1, "ada@example.com"),
        "tokens": {"access": access, "refresh": refresh},
    })
}

/// A manager over `transport` whose store starts with `A1`/`R1`.
pub fn logged_in(transport: MockTransport) -> SessionManager<MockTransport, MemoryTokenStore> {
    SessionManager::new(
        transport,
        MemoryTokenStore::with_tokens("A1", "R1"),
        SessionConfig::default(),
    )
}

pub fn anonymous(transport: MockTransport) -> SessionManager<MockTransport, MemoryTokenStore> {
    SessionManager::new(transport, MemoryTokenStore::new(), SessionConfig::default())
}
