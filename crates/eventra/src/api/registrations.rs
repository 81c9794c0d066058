use eventra_protocol::{
    CheckInRequest, CheckInResult, Codec, FieldErrors, Id, JsonCodec, Registration, endpoints,
};
use eventra_session::{SessionManager, TokenStore};
use eventra_transport::{ApiRequest, HttpTransport};
use serde_json::Value;

use super::{fetch, send, with_json};
use crate::EventraError;

/// Attendee registrations and organizer check-in.
pub struct RegistrationsApi<'a, T, S> {
    session: &'a SessionManager<T, S>,
}

impl<'a, T: HttpTransport, S: TokenStore> RegistrationsApi<'a, T, S> {
    pub(crate) fn new(session: &'a SessionManager<T, S>) -> Self {
        Self { session }
    }

    /// Registrations of the current user, each with its event embedded.
    pub async fn mine(&self) -> Result<Vec<Registration>, EventraError> {
        let request = ApiRequest::get(endpoints::MY_REGISTRATIONS);
        fetch(self.session, request, "Failed to load registrations").await
    }

    /// Registers the current user for an event. Returns the server's
    /// confirmation body.
    pub async fn register(&self, event_id: Id) -> Result<Value, EventraError> {
        let request = ApiRequest::post(endpoints::event_register(event_id));
        let response = send(self.session, request, "Failed to register for the event").await?;
        tracing::info!(event_id, "registered for event");
        if response.body().is_empty() {
            return Ok(Value::Null);
        }
        Ok(JsonCodec.decode(response.body())?)
    }

    pub async fn unregister(&self, event_id: Id) -> Result<(), EventraError> {
        let request = ApiRequest::delete(endpoints::event_unregister(event_id));
        send(self.session, request, "Failed to unregister from the event").await?;
        tracing::info!(event_id, "unregistered from event");
        Ok(())
    }

    /// Checks an attendee in by the code printed in their QR ticket.
    /// Surrounding whitespace is ignored; a blank code is rejected without
    /// a request.
    pub async fn check_in(&self, registration_code: &str) -> Result<CheckInResult, EventraError> {
        let code = registration_code.trim();
        if code.is_empty() {
            let mut fields = FieldErrors::new();
            fields.insert("registration_code", "This field may not be blank.");
            return Err(EventraError::Validation {
                message: "Please enter a registration code".into(),
                fields,
            });
        }
        let body = CheckInRequest {
            registration_code: code.to_string(),
        };
        let request = with_json(ApiRequest::post(endpoints::CHECK_IN), &body)?;
        fetch(self.session, request, "Check-in failed").await
    }
}
