//! Public client surface.
//!
//! [`Client`] exposes one method per remote operation. Each method builds a
//! [`RequestEnvelope`] with a fixed method name and a one-to-one parameter
//! mapping, submits it through the pipeline, folds the parsed result into
//! the domain records and publishes the matching [`Notification`]. Terminal
//! failures are both returned and published as an error event.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::debug;

use crate::config::{Credentials, DeviceProfile};
use crate::crypto::{BlowfishCipher, BodyCipher};
use crate::envelope::RequestEnvelope;
use crate::event::{EventBus, Notification};
use crate::model::{
    GenreCategory, SearchResults, Seed, Song, Station, StationDetail, parse_playlist,
};
use crate::pipeline::Pipeline;
use crate::session::SessionManager;
use crate::transport::{HttpTransport, Transport};
use crate::{Error, Result};

/// Quality tiers requested for every playlist fetch (low, medium, high).
const ADDITIONAL_AUDIO_URLS: &str = "HTTP_32_AACPLUS,HTTP_64_AAC,HTTP_192_MP3";

/// What a search hit seeds a new station from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedKind {
    Song,
    Artist,
}

impl SeedKind {
    fn as_str(self) -> &'static str {
        match self {
            SeedKind::Song => "song",
            SeedKind::Artist => "artist",
        }
    }
}

/// Radio service client.
///
/// # Example
///
/// ```ignore
/// use pianoforte::{Client, Credentials, Notification};
///
/// #[tokio::main]
/// async fn main() -> pianoforte::Result<()> {
///     let client = Client::new(Credentials::new("listener@example.com", "secret"))?;
///     let mut events = client.subscribe();
///
///     let stations = client.station_list().await?;
///     let songs = client.playlist(&stations[0].station_token).await?;
///
///     while let Ok(event) = events.recv().await {
///         if let Notification::PlaylistFetched { station_token, .. } = event {
///             println!("playlist ready for {station_token}");
///         }
///     }
///     Ok(())
/// }
/// ```
pub struct Client {
    pipeline: Pipeline,
    events: EventBus,
}

impl Client {
    /// New client with the default restricted profile, HTTP transport and
    /// Blowfish payload cipher.
    pub fn new(credentials: Credentials) -> Result<Self> {
        Ok(Self::with_collaborators(
            DeviceProfile::default(),
            credentials,
            Arc::new(HttpTransport::new()?),
            Arc::new(BlowfishCipher),
        ))
    }

    /// New client with explicit collaborators (transport, cipher, profile).
    pub fn with_collaborators(
        profile: DeviceProfile,
        credentials: Credentials,
        transport: Arc<dyn Transport>,
        cipher: Arc<dyn BodyCipher>,
    ) -> Self {
        let events = EventBus::new();
        let session = SessionManager::new(profile, credentials);
        Self {
            pipeline: Pipeline::new(transport, cipher, session, events.clone()),
            events,
        }
    }

    /// Subscribe to completion notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.events.subscribe()
    }

    /// Run the login chain now instead of lazily on the first call.
    ///
    /// A chain failure is published under the neutral `login` marker, since
    /// any of its stages (partner login, user login, subscription probe)
    /// may be the one that failed.
    pub async fn login(&self) -> Result<()> {
        match self.pipeline.ensure_authenticated().await {
            Ok(()) => Ok(()),
            Err(e) => {
                self.publish_error("login", &e);
                Err(e)
            }
        }
    }

    /// Drop the session; the next call re-runs the full login chain.
    pub async fn logout(&self) {
        self.pipeline.logout().await;
    }

    /// Fetch the listener's stations.
    pub async fn station_list(&self) -> Result<Vec<Station>> {
        let result = self.submit(RequestEnvelope::new("user.getStationList")).await?;
        let stations: Vec<Station> = field(&result, "stations")?;
        debug!(count = stations.len(), "stations loaded");
        self.events.publish(Notification::StationsLoaded(stations.clone()));
        Ok(stations)
    }

    /// Fetch the curated genre station catalog.
    pub async fn genre_stations(&self) -> Result<Vec<GenreCategory>> {
        let result = self
            .submit(RequestEnvelope::new("station.getGenreStations"))
            .await?;
        let categories: Vec<GenreCategory> = field(&result, "categories")?;
        self.events
            .publish(Notification::GenreStationsLoaded(categories.clone()));
        Ok(categories)
    }

    /// Fetch the next playlist fragment for a station. Ad entries are
    /// filtered out; each song carries three ranked stream URLs.
    pub async fn playlist(&self, station_token: &str) -> Result<Vec<Song>> {
        let result = self
            .submit(
                RequestEnvelope::new("station.getPlaylist")
                    .param("stationToken", station_token)
                    .param("additionalAudioUrl", ADDITIONAL_AUDIO_URLS),
            )
            .await?;
        let items: Vec<Value> = field(&result, "items")?;
        let songs = parse_playlist(items);
        debug!(station_token, count = songs.len(), "playlist fetched");
        self.events.publish(Notification::PlaylistFetched {
            station_token: station_token.to_string(),
            songs: songs.clone(),
        });
        Ok(songs)
    }

    /// Create a station from a search-result music token.
    pub async fn create_station(&self, music_token: &str) -> Result<Station> {
        let result = self
            .submit(RequestEnvelope::new("station.createStation").param("musicToken", music_token))
            .await?;
        let station: Station = serde_json::from_value(result)?;
        self.events
            .publish(Notification::StationCreated(station.clone()));
        Ok(station)
    }

    /// Create a station seeded from a playing track.
    pub async fn create_station_from_track(
        &self,
        track_token: &str,
        kind: SeedKind,
    ) -> Result<Station> {
        let result = self
            .submit(
                RequestEnvelope::new("station.createStation")
                    .param("trackToken", track_token)
                    .param("musicType", kind.as_str()),
            )
            .await?;
        let station: Station = serde_json::from_value(result)?;
        self.events
            .publish(Notification::StationCreated(station.clone()));
        Ok(station)
    }

    /// Delete a station.
    pub async fn delete_station(&self, station_token: &str) -> Result<()> {
        self.submit(
            RequestEnvelope::new("station.deleteStation").param("stationToken", station_token),
        )
        .await?;
        self.events.publish(Notification::StationDeleted {
            station_token: station_token.to_string(),
        });
        Ok(())
    }

    /// Rename a station.
    pub async fn rename_station(&self, station_token: &str, name: &str) -> Result<Station> {
        let result = self
            .submit(
                RequestEnvelope::new("station.renameStation")
                    .param("stationToken", station_token)
                    .param("stationName", name),
            )
            .await?;
        let station: Station = serde_json::from_value(result)?;
        self.events
            .publish(Notification::StationRenamed(station.clone()));
        Ok(station)
    }

    /// Fetch extended station attributes (seeds and feedback lists).
    pub async fn station_detail(&self, station_token: &str) -> Result<StationDetail> {
        let result = self.submit(station_detail_envelope(station_token)).await?;
        let detail: StationDetail = serde_json::from_value(result)?;
        self.events
            .publish(Notification::StationInfoLoaded(detail.clone()));
        Ok(detail)
    }

    /// Delete a feedback entry by id.
    pub async fn delete_feedback(&self, feedback_id: &str) -> Result<()> {
        self.submit(
            RequestEnvelope::new("station.deleteFeedback").param("feedbackId", feedback_id),
        )
        .await?;
        self.events.publish(Notification::FeedbackDeleted {
            feedback_id: feedback_id.to_string(),
        });
        Ok(())
    }

    /// Add a seed to a station.
    pub async fn add_seed(&self, station_token: &str, music_token: &str) -> Result<Seed> {
        let result = self
            .submit(
                RequestEnvelope::new("station.addMusic")
                    .param("stationToken", station_token)
                    .param("musicToken", music_token),
            )
            .await?;
        let seed: Seed = serde_json::from_value(result)?;
        self.events.publish(Notification::SeedAdded {
            seed_id: seed.seed_id.clone(),
        });
        Ok(seed)
    }

    /// Remove a seed from its station.
    pub async fn delete_seed(&self, seed_id: &str) -> Result<()> {
        self.submit(RequestEnvelope::new("station.deleteMusic").param("seedId", seed_id))
            .await?;
        self.events.publish(Notification::SeedDeleted {
            seed_id: seed_id.to_string(),
        });
        Ok(())
    }

    /// Rate a song thumbs-up or thumbs-down.
    pub async fn rate_song(
        &self,
        station_token: &str,
        track_token: &str,
        is_positive: bool,
    ) -> Result<()> {
        self.submit(
            RequestEnvelope::new("station.addFeedback")
                .param("stationToken", station_token)
                .param("trackToken", track_token)
                .param("isPositive", is_positive),
        )
        .await?;
        self.events.publish(Notification::SongRated {
            track_token: track_token.to_string(),
            is_positive,
        });
        Ok(())
    }

    /// Remove an existing rating by song title.
    ///
    /// The protocol has no direct un-rate call: this refetches the station
    /// detail and scans the liked list, then the disliked list, for the
    /// first feedback entry whose song title matches, and deletes it by id.
    pub async fn unrate_song(&self, station_token: &str, song_name: &str) -> Result<()> {
        let result = self.submit(station_detail_envelope(station_token)).await?;
        let detail: StationDetail = serde_json::from_value(result)?;

        let entry = detail
            .feedback
            .thumbs_up
            .iter()
            .chain(detail.feedback.thumbs_down.iter())
            .find(|f| f.song_name == song_name)
            .ok_or_else(|| Error::Protocol(format!("no feedback entry for '{song_name}'")))?;

        self.delete_feedback(&entry.feedback_id).await
    }

    /// Put a song to sleep for a month.
    pub async fn sleep_song(&self, track_token: &str) -> Result<()> {
        self.submit(RequestEnvelope::new("user.sleepSong").param("trackToken", track_token))
            .await?;
        self.events.publish(Notification::SongTired {
            track_token: track_token.to_string(),
        });
        Ok(())
    }

    /// Search the catalog for songs and artists.
    pub async fn search(&self, text: &str) -> Result<SearchResults> {
        let result = self
            .submit(RequestEnvelope::new("music.search").param("searchText", text))
            .await?;
        let results: SearchResults = serde_json::from_value(result)?;
        self.events
            .publish(Notification::SearchResultsLoaded(results.clone()));
        Ok(results)
    }

    /// Submit through the pipeline, publishing an error event on terminal
    /// failure.
    async fn submit(&self, env: RequestEnvelope) -> Result<Value> {
        let method = env.method.clone();
        match self.pipeline.submit(env).await {
            Ok(value) => Ok(value),
            Err(e) => {
                self.publish_error(&method, &e);
                Err(e)
            }
        }
    }

    fn publish_error(&self, method: &str, error: &Error) {
        self.events.publish(Notification::Error {
            method: method.to_string(),
            message: error.to_string(),
            code: error.code(),
        });
    }
}

fn station_detail_envelope(station_token: &str) -> RequestEnvelope {
    RequestEnvelope::new("station.getStation")
        .param("stationToken", station_token)
        .param("includeExtendedAttributes", true)
}

/// Deserialize one field of a result payload.
fn field<T: DeserializeOwned>(result: &Value, key: &str) -> Result<T> {
    let value = result
        .get(key)
        .cloned()
        .ok_or_else(|| Error::InvalidResponse(format!("missing field: {key}")))?;
    Ok(serde_json::from_value(value)?)
}
