//! List stations and fetch a playlist for the first one.
//!
//! Run with: PIANOFORTE_USER=you@example.com PIANOFORTE_PASS=secret \
//!   cargo run --example stations
//! Run with debug: RUST_LOG=pianoforte=debug cargo run --example stations

use pianoforte::{Client, Credentials, Notification, StationOrder, sort_stations};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Initialize tracing from RUST_LOG env var
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let username = match std::env::var("PIANOFORTE_USER") {
        Ok(u) => u,
        Err(_) => {
            eprintln!("Set PIANOFORTE_USER and PIANOFORTE_PASS");
            std::process::exit(1);
        }
    };
    let password = std::env::var("PIANOFORTE_PASS").unwrap_or_default();

    let client = match Client::new(Credentials::new(username, password)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to build client: {e}");
            std::process::exit(1);
        }
    };

    let mut events = client.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            if let Notification::Error { method, message, code } = event {
                eprintln!("call failed: {method}: {message} (code {code:?})");
            }
        }
    });

    let mut stations = match client.station_list().await {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Login or station fetch failed: {e}");
            std::process::exit(1);
        }
    };
    sort_stations(&mut stations, StationOrder::NameAsc);

    println!("{} stations:", stations.len());
    for station in &stations {
        println!("  {}  {}", station.station_token, station.station_name);
    }

    let Some(first) = stations.first() else {
        return;
    };

    match client.playlist(&first.station_token).await {
        Ok(songs) => {
            println!("\nPlaylist for {}:", first.station_name);
            for song in songs {
                let artist = song.artist_name.as_deref().unwrap_or("?");
                println!("  {artist} - {}", song.song_name);
            }
        }
        Err(e) => eprintln!("Playlist fetch failed: {e}"),
    }
}
