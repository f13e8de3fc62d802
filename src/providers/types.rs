use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Spotify,
    Tidal,
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderId::Spotify => write!(f, "spotify"),
            ProviderId::Tidal => write!(f, "tidal"),
        }
    }
}

impl FromStr for ProviderId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "spotify" => Ok(ProviderId::Spotify),
            "tidal" => Ok(ProviderId::Tidal),
            _ => Err(AppError::InvalidProvider(format!(
                "'{}'. Valid: spotify, tidal",
                s
            ))),
        }
    }
}

impl ProviderId {
    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderId::Spotify => "Spotify",
            ProviderId::Tidal => "Tidal",
        }
    }

    /// Key under which the provider's session is persisted.
    pub fn session_key(&self) -> String {
        format!("{}_session", self)
    }
}

/// Whether recommendations came from a real recommendation endpoint or from a
/// provider-side substitute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationQuality {
    Native,
    Degraded,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Recommendations {
    pub tracks: Vec<crate::models::ResolvedTrack>,
    pub quality: RecommendationQuality,
}

impl Recommendations {
    pub fn native(tracks: Vec<crate::models::ResolvedTrack>) -> Self {
        Self {
            tracks,
            quality: RecommendationQuality::Native,
        }
    }

    pub fn degraded(tracks: Vec<crate::models::ResolvedTrack>) -> Self {
        Self {
            tracks,
            quality: RecommendationQuality::Degraded,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}
