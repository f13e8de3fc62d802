mod seeds;

use chrono::Utc;
use serde::{Deserialize, Serialize};

pub use seeds::{SeedError, SeedSelection};

/// A `(name, artist)` pair read from an import file, before catalog matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTrackRef {
    pub name: String,
    pub artist: String,
}

impl RawTrackRef {
    /// Trims both fields; `None` when either ends up empty.
    pub fn new(name: &str, artist: &str) -> Option<Self> {
        let name = name.trim();
        let artist = artist.trim();
        if name.is_empty() || artist.is_empty() {
            return None;
        }
        Some(Self {
            name: name.to_string(),
            artist: artist.to_string(),
        })
    }

    /// Free-text query sent to a provider's search endpoint.
    pub fn search_query(&self) -> String {
        format!("{} {}", self.name, self.artist)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistRef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
}

/// A track matched against one provider's catalog.
///
/// `id` is scoped to the provider that produced it; tracks from different
/// providers are never compared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedTrack {
    pub id: String,
    pub name: String,
    pub artist: String,
    pub artists: Vec<ArtistRef>,
    pub album: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<String>,
}

impl ResolvedTrack {
    /// Id of the first credited artist, used by artist-based fallbacks.
    pub fn primary_artist_id(&self) -> Option<&str> {
        self.artists.first().and_then(|a| a.id.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistRef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub track_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_url: Option<String>,
}

/// Tunable targets forwarded to a recommendation endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterParameters {
    pub energy: f32,
    pub danceability: f32,
    pub popularity: u8,
    pub instrumentalness: f32,
    pub limit: u32,
}

impl Default for FilterParameters {
    fn default() -> Self {
        Self {
            energy: 0.5,
            danceability: 0.5,
            popularity: 50,
            instrumentalness: 0.5,
            limit: crate::config::DEFAULT_RECOMMENDATION_LIMIT,
        }
    }
}

/// A single filter a provider may or may not accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterField {
    Energy,
    Danceability,
    Popularity,
    Instrumentalness,
}

impl FilterField {
    pub const ALL: [FilterField; 4] = [
        FilterField::Energy,
        FilterField::Danceability,
        FilterField::Popularity,
        FilterField::Instrumentalness,
    ];

    pub fn query_name(&self) -> &'static str {
        match self {
            FilterField::Energy => "target_energy",
            FilterField::Danceability => "target_danceability",
            FilterField::Popularity => "target_popularity",
            FilterField::Instrumentalness => "target_instrumentalness",
        }
    }
}

impl FilterParameters {
    /// Forces every field into its valid range. `limit` is at least 1.
    pub fn clamped(self) -> Self {
        Self {
            energy: self.energy.clamp(0.0, 1.0),
            danceability: self.danceability.clamp(0.0, 1.0),
            popularity: self.popularity.min(100),
            instrumentalness: self.instrumentalness.clamp(0.0, 1.0),
            limit: self.limit.max(1),
        }
    }

    pub fn value_of(&self, field: FilterField) -> String {
        match field {
            FilterField::Energy => self.energy.to_string(),
            FilterField::Danceability => self.danceability.to_string(),
            FilterField::Popularity => self.popularity.to_string(),
            FilterField::Instrumentalness => self.instrumentalness.to_string(),
        }
    }

    /// Query pairs for the fields in `supported`; everything else is omitted.
    pub fn query_pairs(&self, supported: &[FilterField]) -> Vec<(&'static str, String)> {
        FilterField::ALL
            .iter()
            .filter(|f| supported.contains(f))
            .map(|f| (f.query_name(), self.value_of(*f)))
            .collect()
    }
}

/// Credentials for one provider, persisted by a `SessionStore`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub expires_at_epoch_ms: i64,
}

impl AuthSession {
    pub fn expiring_in(access_token: String, refresh_token: Option<String>, expires_in_secs: i64) -> Self {
        Self {
            access_token,
            refresh_token,
            expires_at_epoch_ms: now_epoch_ms() + expires_in_secs * 1000,
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.access_token.is_empty() && now_epoch_ms() < self.expires_at_epoch_ms
    }
}

pub fn now_epoch_ms() -> i64 {
    Utc::now().timestamp_millis()
}
