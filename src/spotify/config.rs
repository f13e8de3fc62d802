use serde::{Deserialize, Serialize};

pub const PLAYLIST_PAGE_SIZE: u32 = 50;
pub const TRACK_PAGE_SIZE: u32 = 100;
/// Spotify rejects add-items requests carrying more than 100 URIs.
pub const ADD_BATCH_SIZE: usize = 100;

pub const SCOPES: &[&str] = &[
    "user-read-private",
    "user-read-email",
    "playlist-read-private",
    "playlist-read-collaborative",
    "playlist-modify-public",
    "playlist-modify-private",
];

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SpotifyConfig {
    pub client_id: String,
    pub redirect_uri: String,
    pub api_base: String,
    pub authorize_url: String,
}

impl Default for SpotifyConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            redirect_uri: "http://localhost:8888/callback".to_string(),
            api_base: "https://api.spotify.com/v1".to_string(),
            authorize_url: "https://accounts.spotify.com/authorize".to_string(),
        }
    }
}
