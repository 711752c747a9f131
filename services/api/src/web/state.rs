//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use postcraft_core::domain::AuthEvent;
use postcraft_core::ports::DatabaseService;
use postcraft_core::{ContentPipeline, TrendFeed};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Buffered auth events per subscriber before the slowest one lags.
pub const AUTH_EVENT_CAPACITY: usize = 64;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DatabaseService>,
    pub pipeline: ContentPipeline,
    pub trends: TrendFeed,
    /// Sign-in and sign-out events, fanned out to `/auth/events` subscribers.
    pub auth_events: broadcast::Sender<AuthEvent>,
}

impl AppState {
    pub fn new(
        db: Arc<dyn DatabaseService>,
        pipeline: ContentPipeline,
        trends: TrendFeed,
    ) -> Self {
        let (auth_events, _) = broadcast::channel(AUTH_EVENT_CAPACITY);
        Self {
            db,
            pipeline,
            trends,
            auth_events,
        }
    }

    /// Publishes an auth event. Having no subscribers is not an error.
    pub fn publish(&self, event: AuthEvent) {
        let _ = self.auth_events.send(event);
    }
}
