use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::ResolvedTrack;
use crate::config::MAX_SEEDS;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SeedError {
    #[error("You can select at most {0} seed tracks")]
    Full(usize),

    #[error("Track is already selected")]
    AlreadySelected,
}

/// Ordered seed tracks, never more than `MAX_SEEDS`.
///
/// The cap is enforced when a track is added; an add beyond it fails and
/// leaves the selection untouched. Deserializing goes through `from_tracks`,
/// so stored selections are held to the same cap.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<ResolvedTrack>", into = "Vec<ResolvedTrack>")]
pub struct SeedSelection {
    tracks: Vec<ResolvedTrack>,
}

impl SeedSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a selection from stored tracks, keeping the first `MAX_SEEDS`.
    pub fn from_tracks(tracks: Vec<ResolvedTrack>) -> Self {
        let mut selection = Self::new();
        for track in tracks {
            if let Err(SeedError::Full(_)) = selection.add(track) {
                break;
            }
        }
        selection
    }

    pub fn add(&mut self, track: ResolvedTrack) -> Result<(), SeedError> {
        if self.contains(&track.id) {
            return Err(SeedError::AlreadySelected);
        }
        if self.tracks.len() >= MAX_SEEDS {
            return Err(SeedError::Full(MAX_SEEDS));
        }
        self.tracks.push(track);
        Ok(())
    }

    /// Removes the track with `id`; returns whether it was selected.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.tracks.len();
        self.tracks.retain(|t| t.id != id);
        self.tracks.len() != before
    }

    pub fn contains(&self, id: &str) -> bool {
        self.tracks.iter().any(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.tracks.len() >= MAX_SEEDS
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
    }

    pub fn tracks(&self) -> &[ResolvedTrack] {
        &self.tracks
    }

    pub fn ids(&self) -> Vec<&str> {
        self.tracks.iter().map(|t| t.id.as_str()).collect()
    }
}

impl From<Vec<ResolvedTrack>> for SeedSelection {
    fn from(tracks: Vec<ResolvedTrack>) -> Self {
        Self::from_tracks(tracks)
    }
}

impl From<SeedSelection> for Vec<ResolvedTrack> {
    fn from(selection: SeedSelection) -> Self {
        selection.tracks
    }
}
