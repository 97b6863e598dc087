//! Domain records populated from server responses.
//!
//! These are plain passthrough shapes: fields map one-to-one to the server
//! JSON and absent optional fields stay unset. The only processing that
//! happens here is playlist parsing (ad filtering, stream URL tiering) and
//! station sorting.

use std::cmp::Reverse;

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

/// A listener station.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Station {
    pub station_token: String,
    #[serde(default)]
    pub station_id: Option<String>,
    pub station_name: String,
    #[serde(default)]
    pub is_quick_mix: bool,
    /// Creation time in epoch milliseconds. The server wraps this in a
    /// `{"time": ...}` object.
    #[serde(default, deserialize_with = "de_date_created")]
    pub date_created: Option<u64>,
    #[serde(default)]
    pub art_url: Option<String>,
}

#[derive(Deserialize)]
struct DateCreated {
    time: u64,
}

fn de_date_created<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let wrapped = Option::<DateCreated>::deserialize(deserializer)?;
    Ok(wrapped.map(|d| d.time))
}

/// Station sort orders. Name orders compare case-insensitively; time orders
/// leave ties in their original relative order (stable sort).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StationOrder {
    NameAsc,
    NameDesc,
    DateAsc,
    DateDesc,
}

/// Sort stations in place. Name keys are lowercased once per station, not
/// once per comparison.
pub fn sort_stations(stations: &mut [Station], order: StationOrder) {
    match order {
        StationOrder::NameAsc => stations.sort_by_cached_key(name_key),
        StationOrder::NameDesc => stations.sort_by_cached_key(|s| Reverse(name_key(s))),
        StationOrder::DateAsc => stations.sort_by_key(date_key),
        StationOrder::DateDesc => stations.sort_by_key(|s| Reverse(date_key(s))),
    }
}

fn name_key(station: &Station) -> String {
    station.station_name.to_lowercase()
}

fn date_key(station: &Station) -> u64 {
    station.date_created.unwrap_or(0)
}

/// The alternate-quality URL field arrives as a single value or a list of
/// up to three.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AdditionalUrls {
    One(String),
    Many(Vec<String>),
}

/// Ranked stream URLs by quality tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamUrls {
    pub low: String,
    pub medium: String,
    pub high: String,
}

impl StreamUrls {
    /// Derive the three tiers with graceful degradation: a missing medium
    /// falls back to low, a missing high falls back to medium-or-low; a
    /// single scalar aliases all three tiers.
    pub fn from_field(field: &AdditionalUrls) -> Option<Self> {
        let urls: Vec<&str> = match field {
            AdditionalUrls::One(url) => vec![url.as_str()],
            AdditionalUrls::Many(list) => list.iter().map(String::as_str).collect(),
        };

        let low = urls.first()?;
        let medium = urls.get(1).unwrap_or(low);
        let high = urls.get(2).unwrap_or(medium);
        Some(Self {
            low: low.to_string(),
            medium: medium.to_string(),
            high: high.to_string(),
        })
    }
}

/// A playable track from a station playlist.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    pub track_token: String,
    pub song_name: String,
    #[serde(default)]
    pub artist_name: Option<String>,
    #[serde(default)]
    pub album_name: Option<String>,
    #[serde(default)]
    pub station_id: Option<String>,
    #[serde(default)]
    pub album_art_url: Option<String>,
    /// 1 for thumbs-up, -1 for thumbs-down, 0/absent for unrated.
    #[serde(default)]
    pub song_rating: Option<i64>,
    #[serde(default)]
    additional_audio_url: Option<AdditionalUrls>,
}

impl Song {
    /// Ranked stream URLs, when the server included the alternate-URL field.
    pub fn stream_urls(&self) -> Option<StreamUrls> {
        self.additional_audio_url.as_ref().and_then(StreamUrls::from_field)
    }
}

/// Parse a playlist result into songs.
///
/// Entries carrying an `adToken` marker are dropped entirely (they are ads,
/// not songs); order of the remaining entries is preserved.
pub fn parse_playlist(items: Vec<Value>) -> Vec<Song> {
    let mut songs = Vec::with_capacity(items.len());
    for item in items {
        if item.get("adToken").is_some() {
            continue;
        }
        match serde_json::from_value::<Song>(item) {
            Ok(song) => songs.push(song),
            Err(e) => warn!(error = %e, "skipping malformed playlist entry"),
        }
    }
    songs
}

/// One feedback entry (a previous thumbs-up or thumbs-down).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub feedback_id: String,
    pub song_name: String,
    #[serde(default)]
    pub artist_name: Option<String>,
    #[serde(default)]
    pub is_positive: bool,
}

/// Liked and disliked feedback lists from extended station attributes.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackLists {
    #[serde(default)]
    pub thumbs_up: Vec<Feedback>,
    #[serde(default)]
    pub thumbs_down: Vec<Feedback>,
}

/// A station seed (song or artist the station grows from).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seed {
    pub seed_id: String,
    #[serde(default)]
    pub song_name: Option<String>,
    #[serde(default)]
    pub artist_name: Option<String>,
}

/// Seed lists from extended station attributes.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedLists {
    #[serde(default)]
    pub songs: Vec<Seed>,
    #[serde(default)]
    pub artists: Vec<Seed>,
}

/// Extended station attributes: the station plus its feedback and seeds.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationDetail {
    #[serde(flatten)]
    pub station: Station,
    #[serde(default)]
    pub feedback: FeedbackLists,
    #[serde(default)]
    pub music: SeedLists,
}

/// A song hit from `music.search`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchSong {
    pub music_token: String,
    pub song_name: String,
    #[serde(default)]
    pub artist_name: Option<String>,
    #[serde(default)]
    pub score: Option<i64>,
}

/// An artist hit from `music.search`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchArtist {
    pub music_token: String,
    pub artist_name: String,
    #[serde(default)]
    pub score: Option<i64>,
}

/// Combined search results.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    #[serde(default)]
    pub songs: Vec<SearchSong>,
    #[serde(default)]
    pub artists: Vec<SearchArtist>,
}

/// A curated genre station.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenreStation {
    pub station_token: String,
    pub station_name: String,
}

/// A genre category and its stations.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenreCategory {
    pub category_name: String,
    #[serde(default)]
    pub stations: Vec<GenreStation>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn station(name: &str, created_ms: u64) -> Station {
        Station {
            station_token: format!("tok-{name}"),
            station_id: None,
            station_name: name.to_string(),
            is_quick_mix: false,
            date_created: Some(created_ms),
            art_url: None,
        }
    }

    #[test]
    fn station_parses_wrapped_creation_date() {
        let parsed: Station = serde_json::from_value(json!({
            "stationToken": "t1",
            "stationName": "Jazz",
            "dateCreated": { "time": 1234567u64 },
            "isQuickMix": true
        }))
        .unwrap();
        assert_eq!(parsed.date_created, Some(1234567));
        assert!(parsed.is_quick_mix);
        assert!(parsed.art_url.is_none());
    }

    #[test]
    fn playlist_filters_ad_entries_preserving_order() {
        let items = vec![
            json!({"trackToken": "t1", "songName": "first"}),
            json!({"adToken": "ad-1"}),
            json!({"trackToken": "t2", "songName": "second"}),
        ];
        let songs = parse_playlist(items);
        assert_eq!(songs.len(), 2);
        assert_eq!(songs[0].song_name, "first");
        assert_eq!(songs[1].song_name, "second");
    }

    #[test]
    fn single_url_aliases_all_tiers() {
        let song: Song = serde_json::from_value(json!({
            "trackToken": "t",
            "songName": "s",
            "additionalAudioUrl": "http://a"
        }))
        .unwrap();
        let urls = song.stream_urls().unwrap();
        assert_eq!(urls.low, "http://a");
        assert_eq!(urls.medium, "http://a");
        assert_eq!(urls.high, "http://a");
    }

    #[test]
    fn two_urls_high_falls_back_to_medium() {
        let field = AdditionalUrls::Many(vec!["http://lo".into(), "http://med".into()]);
        let urls = StreamUrls::from_field(&field).unwrap();
        assert_eq!(urls.low, "http://lo");
        assert_eq!(urls.medium, "http://med");
        assert_eq!(urls.high, "http://med");
    }

    #[test]
    fn three_urls_are_positional() {
        let field = AdditionalUrls::Many(vec![
            "http://lo".into(),
            "http://med".into(),
            "http://hi".into(),
        ]);
        let urls = StreamUrls::from_field(&field).unwrap();
        assert_eq!(urls.low, "http://lo");
        assert_eq!(urls.medium, "http://med");
        assert_eq!(urls.high, "http://hi");
    }

    #[test]
    fn empty_url_list_yields_none() {
        assert!(StreamUrls::from_field(&AdditionalUrls::Many(vec![])).is_none());
    }

    #[test]
    fn date_descending_sort() {
        let mut stations = vec![station("a", 30), station("b", 10), station("c", 20)];
        sort_stations(&mut stations, StationOrder::DateDesc);
        let dates: Vec<u64> = stations.iter().filter_map(|s| s.date_created).collect();
        assert_eq!(dates, vec![30, 20, 10]);
    }

    #[test]
    fn name_sort_is_case_insensitive() {
        let mut stations = vec![station("b", 0), station("A", 0)];
        sort_stations(&mut stations, StationOrder::NameAsc);
        assert_eq!(stations[0].station_name, "A");
        assert_eq!(stations[1].station_name, "b");

        sort_stations(&mut stations, StationOrder::NameDesc);
        assert_eq!(stations[0].station_name, "b");
    }

    #[test]
    fn sort_ties_keep_original_order() {
        // "Mix" and "mix" compare equal case-insensitively in both
        // directions; the earlier station must stay first.
        let mut stations = vec![station("Mix", 10), station("mix", 20)];
        sort_stations(&mut stations, StationOrder::NameAsc);
        assert_eq!(stations[0].date_created, Some(10));
        sort_stations(&mut stations, StationOrder::NameDesc);
        assert_eq!(stations[0].date_created, Some(10));

        let mut stations = vec![station("a", 5), station("b", 5)];
        sort_stations(&mut stations, StationOrder::DateDesc);
        assert_eq!(stations[0].station_name, "a");
    }

    #[test]
    fn station_detail_flattens_station_fields() {
        let detail: StationDetail = serde_json::from_value(json!({
            "stationToken": "t1",
            "stationName": "Jazz",
            "feedback": {
                "thumbsUp": [{"feedbackId": "f1", "songName": "Liked", "isPositive": true}],
                "thumbsDown": []
            },
            "music": {
                "songs": [{"seedId": "s1", "songName": "Seeded"}]
            }
        }))
        .unwrap();
        assert_eq!(detail.station.station_name, "Jazz");
        assert_eq!(detail.feedback.thumbs_up[0].feedback_id, "f1");
        assert_eq!(detail.music.songs[0].seed_id, "s1");
        assert!(detail.music.artists.is_empty());
    }
}
