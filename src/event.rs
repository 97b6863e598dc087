//! Typed notification bus.
//!
//! Completion events flow out of the client as a typed [`Notification`]
//! enum over a broadcast channel: any number of subscribers, fire-and-forget,
//! no acknowledgement. Publishing with zero subscribers is fine.

use tokio::sync::broadcast;

use crate::model::{GenreCategory, SearchResults, Song, Station, StationDetail};

const BUS_CAPACITY: usize = 64;

/// Events published by the client.
///
/// This is `#[non_exhaustive]` - new variants may be added in future
/// versions. Always include a `_ =>` catch-all in your match.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum Notification {
    /// Full login chain completed (including subscription resolution).
    Authenticated,

    /// Session was explicitly logged out.
    LoggedOut,

    /// Station list fetched.
    StationsLoaded(Vec<Station>),

    /// Genre station catalog fetched.
    GenreStationsLoaded(Vec<GenreCategory>),

    /// A new station was created.
    StationCreated(Station),

    /// A station was deleted.
    StationDeleted { station_token: String },

    /// A station was renamed.
    StationRenamed(Station),

    /// Extended station attributes fetched.
    StationInfoLoaded(StationDetail),

    /// Playlist fragment fetched for a station.
    PlaylistFetched {
        station_token: String,
        songs: Vec<Song>,
    },

    /// A feedback entry was deleted.
    FeedbackDeleted { feedback_id: String },

    /// A seed was added to a station.
    SeedAdded { seed_id: String },

    /// A seed was removed from a station.
    SeedDeleted { seed_id: String },

    /// A song was rated (thumbs up or down).
    SongRated {
        track_token: String,
        is_positive: bool,
    },

    /// A song was put to sleep for a month.
    SongTired { track_token: String },

    /// Search results fetched.
    SearchResultsLoaded(SearchResults),

    /// A remote call failed terminally.
    Error {
        /// Method name of the originating request.
        method: String,
        message: String,
        /// Protocol error code, when the server supplied one.
        code: Option<u32>,
    },
}

/// Broadcast bus carrying [`Notification`]s to any number of listeners.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<Notification>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BUS_CAPACITY);
        Self { tx }
    }

    /// Subscribe to notifications published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }

    /// Publish a notification. Fire-and-forget: a bus with no subscribers
    /// silently drops the event.
    pub fn publish(&self, notification: Notification) {
        let _ = self.tx.send(notification);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_without_subscribers_is_silent() {
        let bus = EventBus::new();
        bus.publish(Notification::Authenticated);
    }

    #[tokio::test]
    async fn all_subscribers_see_events() {
        let bus = EventBus::new();
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();

        bus.publish(Notification::LoggedOut);

        assert!(matches!(a.recv().await.unwrap(), Notification::LoggedOut));
        assert!(matches!(b.recv().await.unwrap(), Notification::LoggedOut));
    }
}
