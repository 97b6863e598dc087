//! Async client for a JSON-over-HTTP internet radio service.
//!
//! The service speaks a versioned JSON protocol: every call is a POST to a
//! single endpoint with the method name in the query string and a Blowfish
//! encrypted JSON body. Authentication is a two-stage chain (partner login
//! identifies the client software, user login identifies the listener),
//! with a subscription probe deciding which device profile the session runs
//! under. This crate owns that whole negotiation: callers construct a
//! [`Client`], invoke typed operations and optionally listen for
//! [`Notification`]s on the broadcast bus.
//!
//! Expired credentials are handled transparently: a call rejected for a
//! stale token triggers one re-authentication and one replay before the
//! failure surfaces.
//!
//! # Example
//!
//! ```ignore
//! use pianoforte::{Client, Credentials, StationOrder, sort_stations};
//!
//! #[tokio::main]
//! async fn main() -> pianoforte::Result<()> {
//!     let client = Client::new(Credentials::new("listener@example.com", "secret"))?;
//!
//!     let mut stations = client.station_list().await?;
//!     sort_stations(&mut stations, StationOrder::NameAsc);
//!
//!     for song in client.playlist(&stations[0].station_token).await? {
//!         println!("{} - {:?}", song.song_name, song.artist_name);
//!     }
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod crypto;
pub mod envelope;
pub mod error;
pub mod event;
pub mod model;
pub mod session;
pub mod transport;

pub(crate) mod pipeline;

#[cfg(test)]
pub(crate) mod testutil;

pub use api::{Client, SeedKind};
pub use catalog::ErrorClass;
pub use clock::SyncClock;
pub use config::{Credentials, DeviceProfile};
pub use crypto::{BlowfishCipher, BodyCipher};
pub use envelope::RequestEnvelope;
pub use error::Error;
pub use event::{EventBus, Notification};
pub use model::{
    Feedback, GenreCategory, GenreStation, SearchResults, Seed, Song, Station, StationDetail,
    StationOrder, StreamUrls, sort_stations,
};
pub use session::SessionManager;
pub use transport::{HttpTransport, Transport};

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
