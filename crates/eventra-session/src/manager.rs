//! The session manager: owns the credential pair and keeps the session
//! alive for every request the client sends.
//!
//! # Request pipeline
//!
//! ```text
//! execute(request)
//!   │ attach bearer (unless public endpoint)
//!   ▼
//! transport.send ──→ 2xx/4xx/5xx ──────────────────────────→ return response
//!   │ 401 on a non-auth endpoint
//!   ▼
//! already retried? ── yes ──→ Err(Unauthorized)
//!   │ no: mark retried
//!   ▼
//! token changed since send? ── yes ──→ replay with current token
//!   │ no
//!   ▼
//! join or start the single refresh flight
//!   │ ok                                  │ err
//!   ▼                                     ▼
//! reattach, replay once             tokens cleared, Expired broadcast,
//!                                   error returned to every waiter
//! ```
//!
//! # Locks
//!
//! Two `std::sync::Mutex`es, never held across an `.await`:
//! - `flight`: the [`RefreshFlight`] state machine.
//! - `epoch`: the token-write lock. Every write of the credential pair
//!   (login, register, refresh result, logout, expiry) happens while it is
//!   held. Login, logout and expiry bump the counter, so a refresh that
//!   started in an older epoch can tell its result is stale and drops it.
//!   They also reset `flight`, so the next 401 refreshes with the new
//!   session's token.
//!
//! Lock order is `epoch` then `flight`.

use std::sync::{Arc, Mutex};

use eventra_protocol::{
    AuthResponse, Codec, Credentials, JsonCodec, LogoutRequest, RefreshRequest, RefreshResponse,
    ServerError, User, endpoints,
};
use eventra_transport::{ApiRequest, ApiResponse, HttpTransport};
use futures_util::FutureExt;
use serde::Serialize;
use tokio::sync::{broadcast, watch};

use crate::refresh::{RefreshFlight, RefreshOutcome, Ticket};
use crate::store::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, TokenStore};
use crate::{AuthSuccess, SessionConfig, SessionError, SessionEvent, SessionState, lock};

/// Capacity of the [`SessionEvent`] channel. Events are rare; a
/// subscriber that falls this far behind only misses old ones.
const EVENT_CAPACITY: usize = 16;

/// Keeps one user's session alive across all requests of a client.
///
/// Cheap to clone: clones share the same tokens, refresh flight and
/// state channels.
///
/// ## Example
///
/// ```rust,ignore
/// let manager = SessionManager::new(transport, FileTokenStore::open(path), SessionConfig::default());
/// manager.bootstrap().await;
///
/// let response = manager.execute(ApiRequest::get("/events/my-events/")).await?;
/// ```
pub struct SessionManager<T, S> {
    inner: Arc<Inner<T, S>>,
}

impl<T, S> Clone for SessionManager<T, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<T, S> {
    transport: T,
    store: S,
    codec: JsonCodec,
    config: SessionConfig,
    flight: Mutex<RefreshFlight>,
    epoch: Mutex<u64>,
    state: watch::Sender<SessionState>,
    events: broadcast::Sender<SessionEvent>,
}

impl<T: HttpTransport, S: TokenStore> SessionManager<T, S> {
    /// Creates a manager in the [`SessionState::Pending`] state. Call
    /// [`bootstrap`](Self::bootstrap) once at startup to settle it.
    pub fn new(transport: T, store: S, config: SessionConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                transport,
                store,
                codec: JsonCodec,
                config,
                flight: Mutex::new(RefreshFlight::new()),
                epoch: Mutex::new(0),
                state: watch::Sender::new(SessionState::Pending),
                events,
            }),
        }
    }

    pub fn transport(&self) -> &T {
        &self.inner.transport
    }

    pub fn store(&self) -> &S {
        &self.inner.store
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    /// A snapshot of the current session state.
    pub fn state(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    /// A receiver that observes every state change.
    pub fn watch_state(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    /// Subscribes to [`SessionEvent`]s sent from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.state.borrow().is_authenticated()
    }

    pub fn current_user(&self) -> Option<User> {
        self.inner.state.borrow().user().cloned()
    }

    /// Waits until bootstrap has settled, then returns the state.
    pub async fn wait_until_ready(&self) -> SessionState {
        let mut rx = self.watch_state();
        match rx.wait_for(|state| !state.is_pending()).await {
            Ok(state) => state.clone(),
            // The sender lives as long as `self`; this arm is unreachable
            // in practice.
            Err(_) => self.state(),
        }
    }

    /// The stored access token, if any.
    pub fn access_token(&self) -> Option<String> {
        self.inner.store.get(ACCESS_TOKEN_KEY)
    }

    /// Sets or strips the bearer header on `request` from the stored
    /// access token. Returns the token that was attached.
    ///
    /// Public endpoints (login, register, refresh) never carry one.
    pub fn attach(&self, request: &mut ApiRequest) -> Option<String> {
        if endpoints::is_public_endpoint(request.path()) {
            request.clear_bearer();
            return None;
        }
        match self.access_token() {
            Some(token) => {
                request.set_bearer(&token);
                Some(token)
            }
            None => {
                request.clear_bearer();
                None
            }
        }
    }

    /// Sends `request` with the current credentials, refreshing and
    /// replaying it once if the server answers 401.
    ///
    /// Any response other than a recoverable 401 is returned as is,
    /// including 4xx/5xx; callers decide what those mean.
    ///
    /// # Errors
    /// - [`SessionError::NetworkFailure`]: no response. Never refreshes.
    /// - [`SessionError::Unauthorized`]: the replay got a 401 again, or
    ///   the request had already been replayed.
    /// - Any refresh failure, shared by every request waiting on it.
    pub async fn execute(&self, mut request: ApiRequest) -> Result<ApiResponse, SessionError> {
        let used = self.attach(&mut request);
        let response = self.inner.transport.send(&request).await?;

        if !response.is_unauthorized() || endpoints::is_auth_endpoint(request.path()) {
            return Ok(response);
        }
        if request.is_retry() {
            return Err(SessionError::Unauthorized);
        }
        request.mark_retried();

        tracing::debug!(path = request.path(), "401 received, recovering access token");
        self.refresh_after_failure(used.as_deref()).await?;

        // Reread the store: a logout since the refresh means the replay
        // goes out anonymous.
        self.attach(&mut request);
        let replay = self.inner.transport.send(&request).await?;
        if replay.is_unauthorized() {
            tracing::warn!(path = request.path(), "replayed request rejected again");
            return Err(SessionError::Unauthorized);
        }
        Ok(replay)
    }

    /// Obtains a new access token, joining the refresh already in flight
    /// if there is one.
    ///
    /// # Errors
    /// - [`SessionError::RefreshTokenMissing`]: nothing stored; no request
    ///   is made.
    /// - [`SessionError::RefreshRejected`]: the server refused the token,
    ///   the call timed out, or the session ended meanwhile.
    ///
    /// Every failure except the last clears the session.
    pub async fn refresh(&self) -> Result<String, SessionError> {
        let ticket = self.join_flight();
        self.await_flight(ticket).await
    }

    /// Like [`refresh`](Self::refresh), but first checks whether a refresh
    /// that finished after `used` was sent already replaced the token.
    async fn refresh_after_failure(&self, used: Option<&str>) -> Result<String, SessionError> {
        let ticket = {
            let mut flight = lock(&self.inner.flight);
            if !flight.is_refreshing() {
                if let Some(current) = self.access_token() {
                    if used != Some(current.as_str()) {
                        tracing::debug!("token already refreshed, replaying");
                        return Ok(current);
                    }
                }
            }
            let inner = Arc::clone(&self.inner);
            flight.join_or_start(move || run_refresh(inner).boxed())
        };
        self.await_flight(ticket).await
    }

    fn join_flight(&self) -> Ticket {
        let inner = Arc::clone(&self.inner);
        lock(&self.inner.flight).join_or_start(move || run_refresh(inner).boxed())
    }

    async fn await_flight(&self, ticket: Ticket) -> RefreshOutcome {
        if ticket.started {
            tracing::debug!(generation = ticket.generation, "refresh started");
        }
        let outcome = ticket.pending.await;
        lock(&self.inner.flight).settle(ticket.generation);
        outcome
    }

    /// Logs in with email and password.
    ///
    /// On success both tokens are stored and the state becomes
    /// [`SessionState::Authenticated`]. On failure stored tokens are left
    /// untouched.
    ///
    /// # Errors
    /// - [`SessionError::InvalidCredentials`] for 401/403 or a bare 400.
    /// - [`SessionError::ValidationFailure`] for a 400 with field errors.
    /// - [`SessionError::Server`] for any other status.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSuccess, SessionError> {
        let body = self.inner.codec.encode(&Credentials {
            email: email.to_string(),
            password: password.to_string(),
        })?;
        let request = ApiRequest::post(endpoints::AUTH_LOGIN).json_body(body);
        self.authenticate(request, "Login failed").await
    }

    /// Creates an account and starts a session for it.
    ///
    /// `payload` is usually a [`NewUser`](eventra_protocol::NewUser), but
    /// any serializable registration body is accepted. Errors as for
    /// [`login`](Self::login).
    pub async fn register<B: Serialize>(&self, payload: &B) -> Result<AuthSuccess, SessionError> {
        let body = self.inner.codec.encode(payload)?;
        let request = ApiRequest::post(endpoints::AUTH_REGISTER).json_body(body);
        self.authenticate(request, "Registration failed").await
    }

    async fn authenticate(
        &self,
        request: ApiRequest,
        fallback: &str,
    ) -> Result<AuthSuccess, SessionError> {
        let response = self.execute(request).await?;
        if !response.is_success() {
            let err = ServerError::from_body(response.status(), response.body(), fallback);
            tracing::info!(status = err.status, "authentication rejected");
            return Err(auth_failure(err));
        }

        let auth: AuthResponse = self.inner.codec.decode(response.body())?;
        self.inner.begin_session(&auth)?;
        tracing::info!(user_id = auth.user.id, "session started");

        Ok(AuthSuccess {
            user: auth.user,
            tokens: auth.tokens,
        })
    }

    /// Ends the session.
    ///
    /// Tells the server to blacklist the refresh token, but only on a best
    /// effort basis: whatever the server says, both tokens are cleared, the
    /// state becomes [`SessionState::Anonymous`] and
    /// [`SessionEvent::LoggedOut`] is broadcast.
    pub async fn logout(&self) {
        if let Some(refresh) = self.inner.store.get(REFRESH_TOKEN_KEY) {
            if let Err(e) = self.revoke(refresh).await {
                tracing::warn!(error = %e, "logout request failed, clearing local session anyway");
            }
        }

        self.inner.end_session(None);
        let _ = self.inner.events.send(SessionEvent::LoggedOut);
        tracing::info!("logged out");
    }

    async fn revoke(&self, refresh: String) -> Result<(), SessionError> {
        let body = self.inner.codec.encode(&LogoutRequest { refresh })?;
        let request = ApiRequest::post(endpoints::AUTH_LOGOUT).json_body(body);
        let response = self.execute(request).await?;
        if !response.is_success() {
            let err = ServerError::from_body(response.status(), response.body(), "Logout failed");
            return Err(SessionError::Server {
                status: err.status,
                message: err.message,
            });
        }
        Ok(())
    }

    /// Restores the session from stored tokens at startup.
    ///
    /// With an access token, the profile is fetched: success means
    /// [`SessionState::Authenticated`], any failure clears the tokens.
    /// Without one the client is [`SessionState::Anonymous`]. Either way
    /// the state leaves `Pending`.
    pub async fn bootstrap(&self) -> SessionState {
        if self.access_token().is_none() {
            tracing::debug!("no stored access token");
            self.inner.state.send_replace(SessionState::Anonymous);
            return SessionState::Anonymous;
        }

        let epoch = self.inner.current_epoch();
        match self.fetch_profile().await {
            Ok(user) => {
                let guard = lock(&self.inner.epoch);
                if *guard == epoch {
                    tracing::info!(user_id = user.id, "session restored");
                    self.inner
                        .state
                        .send_replace(SessionState::Authenticated(user));
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "stored session is not usable");
                self.inner.end_session(Some(epoch));
            }
        }
        self.state()
    }

    /// Fetches the profile of the current user.
    ///
    /// # Errors
    /// Returns [`SessionError::Server`] for a non-2xx answer, besides the
    /// errors of [`execute`](Self::execute).
    pub async fn fetch_profile(&self) -> Result<User, SessionError> {
        let response = self.execute(ApiRequest::get(endpoints::AUTH_PROFILE)).await?;
        if !response.is_success() {
            let err =
                ServerError::from_body(response.status(), response.body(), "Failed to load profile");
            return Err(SessionError::Server {
                status: err.status,
                message: err.message,
            });
        }
        Ok(self.inner.codec.decode(response.body())?)
    }

    /// Replaces the user of an authenticated session, e.g. after a profile
    /// update. Ignored when no access token is stored.
    pub fn set_user(&self, user: User) {
        if self.access_token().is_none() {
            tracing::debug!("set_user ignored without a session");
            return;
        }
        self.inner
            .state
            .send_replace(SessionState::Authenticated(user));
    }
}

impl<T: HttpTransport, S: TokenStore> Inner<T, S> {
    fn current_epoch(&self) -> u64 {
        *lock(&self.epoch)
    }

    /// Stores a freshly issued pair and moves to `Authenticated`. If the
    /// store fails, the client ends up `Anonymous` with no tokens.
    fn begin_session(&self, auth: &AuthResponse) -> Result<(), SessionError> {
        {
            let mut epoch = lock(&self.epoch);
            *epoch += 1;
            lock(&self.flight).reset();
            if let Err(e) = self.write_tokens(&auth.tokens.access, Some(&auth.tokens.refresh)) {
                self.state.send_replace(SessionState::Anonymous);
                return Err(e);
            }
            self.state
                .send_replace(SessionState::Authenticated(auth.user.clone()));
        }
        let _ = self
            .events
            .send(SessionEvent::Authenticated(auth.user.clone()));
        Ok(())
    }

    /// Clears both tokens and moves to `Anonymous`, returning the previous
    /// state. With `expected`, does nothing (and returns `None`) if the
    /// epoch has moved on since.
    fn end_session(&self, expected: Option<u64>) -> Option<SessionState> {
        let mut epoch = lock(&self.epoch);
        if expected.is_some_and(|e| e != *epoch) {
            return None;
        }
        *epoch += 1;
        lock(&self.flight).reset();
        self.clear_tokens();
        Some(self.state.send_replace(SessionState::Anonymous))
    }

    /// Writes the access token and, if given, the refresh token. If either
    /// write fails both keys are cleared.
    fn write_tokens(&self, access: &str, refresh: Option<&str>) -> Result<(), SessionError> {
        let written = self
            .store
            .set(ACCESS_TOKEN_KEY, access)
            .and_then(|()| match refresh {
                Some(refresh) => self.store.set(REFRESH_TOKEN_KEY, refresh),
                None => Ok(()),
            });
        if let Err(e) = &written {
            tracing::warn!(error = %e, "token write failed, clearing stored tokens");
            self.clear_tokens();
        }
        written
    }

    fn clear_tokens(&self) {
        for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY] {
            if let Err(e) = self.store.remove(key) {
                tracing::warn!(key, error = %e, "failed to remove token");
            }
        }
    }

    /// Ends the session after a failed refresh, unless it already ended
    /// for another reason. `Expired` is only sent for a session that was
    /// authenticated.
    fn expire(&self, epoch: u64, reason: &SessionError) {
        let Some(previous) = self.end_session(Some(epoch)) else {
            return;
        };
        tracing::warn!(error = %reason, "session expired");
        if previous.is_authenticated() {
            let _ = self.events.send(SessionEvent::Expired {
                reason: reason.to_string(),
            });
        }
    }

    /// One refresh call: read the refresh token, ask the server, decode.
    async fn request_access_token(&self) -> Result<RefreshResponse, SessionError> {
        let refresh = self
            .store
            .get(REFRESH_TOKEN_KEY)
            .ok_or(SessionError::RefreshTokenMissing)?;

        let body = self.codec.encode(&RefreshRequest { refresh })?;
        let request = ApiRequest::post(endpoints::AUTH_REFRESH).json_body(body);
        let response = self.transport.send(&request).await?;

        if !response.is_success() {
            let err = ServerError::from_body(
                response.status(),
                response.body(),
                "refresh token rejected",
            );
            return Err(SessionError::RefreshRejected(err.message));
        }
        self.codec
            .decode(response.body())
            .map_err(|e| SessionError::RefreshRejected(format!("malformed refresh response: {e}")))
    }
}

/// Body of a refresh flight. Runs at most once per flight, however many
/// requests await it.
async fn run_refresh<T: HttpTransport, S: TokenStore>(inner: Arc<Inner<T, S>>) -> RefreshOutcome {
    let epoch = inner.current_epoch();

    let result = match tokio::time::timeout(
        inner.config.refresh_timeout,
        inner.request_access_token(),
    )
    .await
    {
        Ok(result) => result,
        Err(_) => Err(SessionError::RefreshRejected("refresh timed out".into())),
    };

    match result {
        Ok(reply) => {
            let guard = lock(&inner.epoch);
            if *guard != epoch {
                tracing::info!("session ended while refreshing, discarding new token");
                return Err(SessionError::RefreshRejected(
                    "session ended while refreshing".into(),
                ));
            }
            let written = inner.write_tokens(&reply.access, reply.refresh.as_deref());
            drop(guard);
            match written {
                Ok(()) => {
                    tracing::info!("access token refreshed");
                    Ok(reply.access)
                }
                Err(err) => {
                    inner.expire(epoch, &err);
                    Err(err)
                }
            }
        }
        Err(err) => {
            inner.expire(epoch, &err);
            Err(err)
        }
    }
}

/// Maps a rejected login/registration to the error callers match on.
fn auth_failure(err: ServerError) -> SessionError {
    match err.status {
        401 | 403 => SessionError::InvalidCredentials(err.message),
        _ if err.is_validation() => SessionError::ValidationFailure {
            message: err.message,
            fields: err.fields,
        },
        400 => SessionError::InvalidCredentials(err.message),
        status => SessionError::Server {
            status,
            message: err.message,
        },
    }
}
