use serde::Deserialize;

use crate::models::{ArtistRef, PlaylistRef, ResolvedTrack};

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyImage {
    pub url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExternalUrls {
    pub spotify: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyArtist {
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpotifyAlbum {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub images: Vec<SpotifyImage>,
}

/// A track object. `id` is null for local files and unavailable tracks.
#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyTrack {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<SpotifyArtist>,
    #[serde(default)]
    pub album: Option<SpotifyAlbum>,
    pub uri: Option<String>,
    pub preview_url: Option<String>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

impl SpotifyTrack {
    pub fn into_resolved(self) -> Option<ResolvedTrack> {
        let id = self.id?;
        let artist = self.artists.first()?.name.clone();
        let album = self.album.unwrap_or_default();

        Some(ResolvedTrack {
            id,
            name: self.name,
            artist,
            artists: self
                .artists
                .into_iter()
                .map(|a| ArtistRef {
                    id: a.id,
                    name: a.name,
                })
                .collect(),
            image_url: album.images.into_iter().next().map(|i| i.url),
            album: album.name,
            uri: self.uri,
            external_url: self.external_urls.spotify,
            preview_url: self.preview_url,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct Paging<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    pub next: Option<String>,
}

/// Playlist entry; `track` is null once the track was removed from the catalog.
#[derive(Debug, Deserialize)]
pub struct PlaylistItem {
    pub track: Option<SpotifyTrack>,
}

#[derive(Debug, Deserialize)]
pub struct TrackTotal {
    #[serde(default)]
    pub total: u32,
}

#[derive(Debug, Deserialize)]
pub struct SpotifyPlaylist {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub images: Option<Vec<SpotifyImage>>,
    pub tracks: Option<TrackTotal>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

impl From<SpotifyPlaylist> for PlaylistRef {
    fn from(p: SpotifyPlaylist) -> Self {
        PlaylistRef {
            id: p.id,
            name: p.name,
            description: p.description.unwrap_or_default(),
            image_url: p
                .images
                .and_then(|images| images.into_iter().next())
                .map(|i| i.url),
            track_count: p.tracks.map(|t| t.total).unwrap_or(0),
            external_url: p.external_urls.spotify,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub tracks: Paging<SpotifyTrack>,
}

#[derive(Debug, Deserialize)]
pub struct RecommendationsResponse {
    #[serde(default)]
    pub tracks: Vec<SpotifyTrack>,
}

#[derive(Debug, Deserialize)]
pub struct UserProfile {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    pub message: Option<String>,
}
