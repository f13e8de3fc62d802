use serde::{Deserialize, Serialize};

pub const CONTENT_TYPE: &str = "application/vnd.tidal.v1+json";
pub const SCOPES: &str = "r_usr w_usr w_sub";
/// Tracks per add-items request.
pub const ADD_BATCH_SIZE: usize = 20;
/// Top tracks pulled per seed artist when standing in for recommendations.
pub const ARTIST_TRACKS_LIMIT: u32 = 10;
pub const COVER_SIZE: u32 = 750;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TidalConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub api_base: String,
    pub auth_base: String,
    pub login_url: String,
}

impl Default for TidalConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: "http://localhost:8888/callback".to_string(),
            api_base: "https://openapi.tidal.com/v2".to_string(),
            auth_base: "https://auth.tidal.com".to_string(),
            login_url: "https://login.tidal.com/authorize".to_string(),
        }
    }
}
