use serde::{Deserialize, Deserializer};

use super::config::COVER_SIZE;
use crate::models::{ArtistRef, PlaylistRef, ResolvedTrack};

/// Ids arrive as strings from the v2 API and as numbers from older payloads.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(u64),
}

fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}

fn optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RawId>::deserialize(deserializer)?.map(|id| match id {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    }))
}

#[derive(Debug, Clone, Deserialize)]
pub struct Artist {
    #[serde(default, deserialize_with = "optional_id")]
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Album {
    pub title: Option<String>,
    #[serde(rename = "imageCover")]
    pub image_cover: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Track {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub artists: Vec<Artist>,
    pub album: Option<Album>,
}

impl From<Track> for ResolvedTrack {
    fn from(t: Track) -> Self {
        let artist = t
            .artists
            .first()
            .map(|a| a.name.clone())
            .unwrap_or_else(|| "Unknown Artist".to_string());

        ResolvedTrack {
            external_url: Some(format!("https://listen.tidal.com/track/{}", t.id)),
            id: t.id,
            name: t.title,
            artist,
            artists: t
                .artists
                .into_iter()
                .map(|a| ArtistRef {
                    id: a.id,
                    name: a.name,
                })
                .collect(),
            album: t
                .album
                .as_ref()
                .and_then(|a| a.title.clone())
                .unwrap_or_default(),
            image_url: t
                .album
                .and_then(|a| a.image_cover)
                .map(|c| get_cover_url(&c, COVER_SIZE)),
            uri: None,
            preview_url: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Playlist {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    #[serde(rename = "numberOfTracks")]
    pub number_of_tracks: Option<u32>,
}

impl From<Playlist> for PlaylistRef {
    fn from(p: Playlist) -> Self {
        PlaylistRef {
            external_url: Some(format!("https://listen.tidal.com/playlist/{}", p.id)),
            id: p.id,
            name: p.name,
            description: p.description.unwrap_or_default(),
            image_url: p.image.map(|c| get_cover_url(&c, COVER_SIZE)),
            track_count: p.number_of_tracks.unwrap_or(0),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Resource<T> {
    pub resource: Option<T>,
}

/// Playlist entry: `{ "item": { "resource": <track> } }`.
#[derive(Debug, Deserialize)]
pub struct PlaylistItem {
    pub item: Option<Resource<Track>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Links {
    pub next: Option<String>,
}

/// `{ "data": [...], "links": { "next": ... } }`
#[derive(Debug, Deserialize)]
pub struct DataPage<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub links: Links,
}

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub tracks: Vec<Resource<Track>>,
}

#[derive(Debug, Deserialize)]
pub struct Created<T> {
    pub data: T,
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    #[serde(default = "default_expires_in")]
    pub expires_in: i64,
}

fn default_expires_in() -> i64 {
    3600
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub errors: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    pub detail: Option<String>,
}

// Helper function to build cover art URLs
pub fn get_cover_url(cover_id: &str, size: u32) -> String {
    let normalized = cover_id.replace('-', "/");
    format!(
        "https://resources.tidal.com/images/{}/{}x{}.jpg",
        normalized, size, size
    )
}
