use eventra_protocol::{Event, EventDraft, EventFilters, Id, RecommendationRequest, endpoints};
use eventra_session::{SessionManager, TokenStore};
use eventra_transport::{ApiRequest, HttpTransport};
use serde_json::Value;

use super::{fetch, send, with_json};
use crate::EventraError;

/// Event catalog and organizer event management.
pub struct EventsApi<'a, T, S> {
    session: &'a SessionManager<T, S>,
}

impl<'a, T: HttpTransport, S: TokenStore> EventsApi<'a, T, S> {
    pub(crate) fn new(session: &'a SessionManager<T, S>) -> Self {
        Self { session }
    }

    /// Lists events. Filtering happens on the server; unset filters are
    /// not sent.
    pub async fn list(&self, filters: &EventFilters) -> Result<Vec<Event>, EventraError> {
        let request = filters
            .query_pairs()
            .into_iter()
            .fold(ApiRequest::get(endpoints::EVENTS), |req, (key, value)| {
                req.query(key, value)
            });
        fetch(self.session, request, "Failed to load events").await
    }

    pub async fn detail(&self, id: Id) -> Result<Event, EventraError> {
        let request = ApiRequest::get(endpoints::event_detail(id));
        fetch(self.session, request, "Failed to load event").await
    }

    /// Creates an event. Sent as a multipart form because of the banner.
    pub async fn create(&self, draft: &EventDraft) -> Result<Event, EventraError> {
        let request = ApiRequest::post(endpoints::EVENT_CREATE).multipart(draft.to_form());
        let event: Event = fetch(self.session, request, "Failed to create event").await?;
        tracing::info!(event_id = event.id, "event created");
        Ok(event)
    }

    pub async fn update(&self, id: Id, draft: &EventDraft) -> Result<Event, EventraError> {
        let request = ApiRequest::put(endpoints::event_update(id)).multipart(draft.to_form());
        fetch(self.session, request, "Failed to update event").await
    }

    pub async fn delete(&self, id: Id) -> Result<(), EventraError> {
        let request = ApiRequest::delete(endpoints::event_delete(id));
        send(self.session, request, "Failed to delete event").await?;
        tracing::info!(event_id = id, "event deleted");
        Ok(())
    }

    /// Events organized by the current user.
    pub async fn my_events(&self) -> Result<Vec<Event>, EventraError> {
        let request = ApiRequest::get(endpoints::MY_EVENTS);
        fetch(self.session, request, "Failed to load your events").await
    }

    /// Asks the server to rank `available` against the user's interests.
    ///
    /// The answer is returned as raw JSON; its shape is up to the
    /// recommendation backend.
    pub async fn recommendations(
        &self,
        interests: &str,
        available: Vec<Event>,
    ) -> Result<Value, EventraError> {
        let body = RecommendationRequest {
            user_interests: interests.to_string(),
            available_events: available,
        };
        let request = with_json(ApiRequest::post(endpoints::EVENT_RECOMMENDATIONS), &body)?;
        fetch(self.session, request, "Failed to get recommendations").await
    }
}
