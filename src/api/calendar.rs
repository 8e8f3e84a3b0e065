//! School events shown on the calendar

use super::client::{ApiClient, PendingRequest};
use super::models::{Event, NewEvent, UpcomingEvent};
use crate::error::Result;

const EVENTS_PATH: &str = "/api/events/";

impl ApiClient {
    pub async fn list_events(&self) -> Result<Vec<Event>> {
        self.get_json(EVENTS_PATH).await
    }

    pub async fn create_event(&self, event: &NewEvent) -> Result<Event> {
        self.request_json(PendingRequest::post(EVENTS_PATH).json(event)?)
            .await
    }

    pub async fn update_event(&self, id: i64, event: &NewEvent) -> Result<Event> {
        self.request_json(PendingRequest::put(format!("{}{}/", EVENTS_PATH, id)).json(event)?)
            .await
    }

    pub async fn delete_event(&self, id: i64) -> Result<()> {
        self.request_empty(PendingRequest::delete(format!("{}{}/", EVENTS_PATH, id)))
            .await
    }

    /// Next five events; empty if unavailable
    pub async fn upcoming_events(&self) -> Vec<UpcomingEvent> {
        self.get_list_or_empty("/api/events/upcoming/").await
    }
}
