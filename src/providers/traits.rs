use async_trait::async_trait;
use std::sync::Arc;

use super::types::{ProviderId, Recommendations};
use crate::errors::ProviderError;
use crate::models::{FilterField, FilterParameters, PlaylistRef, RawTrackRef, ResolvedTrack, SeedSelection};
use crate::notifier::{LoadingGuard, Notifier};

/// A streaming service the recommender can drive.
///
/// The high-level operations never fail: remote errors have already been
/// logged and reported by the time they return, and come back as an empty
/// list, `None` or `false`.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    fn id(&self) -> ProviderId;

    fn name(&self) -> &str {
        self.id().display_name()
    }

    /// Filters the recommendation endpoint understands; the rest are never sent.
    fn supported_filters(&self) -> &'static [FilterField];

    /// Most tracks a single add-to-playlist request may carry.
    fn add_batch_size(&self) -> usize;

    fn notifier(&self) -> Arc<dyn Notifier>;

    /// Sends the user agent to the provider's authorization page.
    fn login(&self);

    /// Completes a pending auth callback or restores a stored session.
    async fn check_session(&self) -> bool;

    fn is_authenticated(&self) -> bool;

    fn logout(&self);

    /// Top catalog match for one ref, `Ok(None)` when nothing matched.
    async fn search_track(&self, track: &RawTrackRef) -> Result<Option<ResolvedTrack>, ProviderError>;

    async fn get_user_playlists(&self) -> Vec<PlaylistRef>;

    async fn get_playlist_tracks(&self, playlist_id: &str) -> Vec<ResolvedTrack>;

    async fn get_recommendations(
        &self,
        seeds: &SeedSelection,
        filters: &FilterParameters,
        limit: u32,
    ) -> Recommendations;

    /// Creates an empty playlist owned by the current user.
    async fn create_empty_playlist(&self, name: &str) -> Result<PlaylistRef, ProviderError>;

    /// Appends one batch (at most `add_batch_size`) to a playlist.
    async fn add_playlist_tracks(&self, playlist_id: &str, batch: &[ResolvedTrack]) -> Result<(), ProviderError>;

    /// Resolves the first `cap` refs one at a time. Refs without a match, or
    /// whose search failed, are skipped. Stops early once the session is gone.
    async fn search_tracks(&self, refs: &[RawTrackRef], cap: usize) -> Vec<ResolvedTrack> {
        let mut results = Vec::new();

        for track in refs.iter().take(cap) {
            match self.search_track(track).await {
                Ok(Some(found)) => results.push(found),
                Ok(None) => {
                    log::debug!("No {} match for '{}'", self.name(), track.search_query());
                }
                Err(e) if e.is_auth() => {
                    log::warn!("Search stopped, {} session lost: {}", self.name(), e);
                    break;
                }
                Err(e) => {
                    log::warn!("Search for '{}' failed: {}", track.search_query(), e);
                }
            }
        }

        log::info!(
            "Matched {}/{} tracks on {}",
            results.len(),
            refs.len().min(cap),
            self.name()
        );
        results
    }

    /// Creates a playlist and fills it batch by batch, sequentially.
    /// `None` if creation or any batch fails.
    async fn create_playlist(&self, name: &str, tracks: &[ResolvedTrack]) -> Option<PlaylistRef> {
        let _loading = LoadingGuard::new(self.notifier(), "Creating your playlist...");

        let playlist = match self.create_empty_playlist(name).await {
            Ok(playlist) => playlist,
            Err(e) => {
                log::error!("Creating {} playlist '{}' failed: {}", self.name(), name, e);
                return None;
            }
        };

        for (idx, batch) in tracks.chunks(self.add_batch_size().max(1)).enumerate() {
            if let Err(e) = self.add_playlist_tracks(&playlist.id, batch).await {
                log::error!(
                    "Adding batch {} to playlist {} failed: {}",
                    idx + 1,
                    playlist.id,
                    e
                );
                return None;
            }
        }

        log::info!(
            "Created {} playlist {} with {} tracks",
            self.name(),
            playlist.id,
            tracks.len()
        );
        Some(PlaylistRef {
            track_count: tracks.len() as u32,
            ..playlist
        })
    }
}
