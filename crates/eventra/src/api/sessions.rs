use eventra_protocol::{EventSession, Id, SessionDraft, endpoints};
use eventra_session::{SessionManager, TokenStore};
use eventra_transport::{ApiRequest, HttpTransport};

use super::{fetch, send, with_json};
use crate::EventraError;

/// Sessions (talks, workshops) scheduled inside an event.
pub struct SessionsApi<'a, T, S> {
    session: &'a SessionManager<T, S>,
}

impl<'a, T: HttpTransport, S: TokenStore> SessionsApi<'a, T, S> {
    pub(crate) fn new(session: &'a SessionManager<T, S>) -> Self {
        Self { session }
    }

    pub async fn for_event(&self, event_id: Id) -> Result<Vec<EventSession>, EventraError> {
        let request = ApiRequest::get(endpoints::event_sessions(event_id));
        fetch(self.session, request, "Failed to load sessions").await
    }

    pub async fn detail(&self, id: Id) -> Result<EventSession, EventraError> {
        let request = ApiRequest::get(endpoints::session_detail(id));
        fetch(self.session, request, "Failed to load session").await
    }

    pub async fn create(&self, draft: &SessionDraft) -> Result<EventSession, EventraError> {
        let request = with_json(ApiRequest::post(endpoints::SESSION_CREATE), draft)?;
        let created: EventSession = fetch(self.session, request, "Failed to save session").await?;
        tracing::info!(session_id = created.id, event_id = draft.event, "session created");
        Ok(created)
    }

    pub async fn update(&self, id: Id, draft: &SessionDraft) -> Result<EventSession, EventraError> {
        let request = with_json(ApiRequest::put(endpoints::session_update(id)), draft)?;
        fetch(self.session, request, "Failed to save session").await
    }

    pub async fn delete(&self, id: Id) -> Result<(), EventraError> {
        let request = ApiRequest::delete(endpoints::session_delete(id));
        send(self.session, request, "Failed to delete session").await?;
        Ok(())
    }
}
