//! Drives one recommendation session: authenticate, gather candidate tracks
//! from a playlist or an uploaded file, pick seeds, tune filters, generate,
//! and optionally write the result back as a playlist.

mod types;

pub use types::{FlowError, ImportMethod, SessionState};

use chrono::Utc;
use std::sync::Arc;

use crate::config::SEARCH_CAP;
use crate::history::{default_playlist_name, HistoryRecord, HistoryStore};
use crate::models::{FilterParameters, PlaylistRef, ResolvedTrack, SeedError, SeedSelection};
use crate::notifier::{Notifier, ToastLevel};
use crate::parser;
use crate::providers::{ProviderClient, ProviderId, ProviderRegistry, RecommendationQuality};

pub struct Orchestrator {
    registry: ProviderRegistry,
    provider: Arc<dyn ProviderClient>,
    notifier: Arc<dyn Notifier>,
    history: Arc<dyn HistoryStore>,
    state: SessionState,
    playlists: Vec<PlaylistRef>,
    candidates: Vec<ResolvedTrack>,
    seeds: SeedSelection,
    filters: FilterParameters,
    recommendations: Vec<ResolvedTrack>,
    last_record: Option<String>,
}

impl Orchestrator {
    pub fn new(
        registry: ProviderRegistry,
        provider: ProviderId,
        notifier: Arc<dyn Notifier>,
        history: Arc<dyn HistoryStore>,
    ) -> Result<Self, FlowError> {
        let provider = registry
            .get(provider)
            .ok_or(FlowError::UnknownProvider(provider))?;

        Ok(Self {
            registry,
            provider,
            notifier,
            history,
            state: SessionState::Unauthenticated,
            playlists: Vec::new(),
            candidates: Vec::new(),
            seeds: SeedSelection::new(),
            filters: FilterParameters::default(),
            recommendations: Vec::new(),
            last_record: None,
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn active_provider(&self) -> ProviderId {
        self.provider.id()
    }

    pub fn provider(&self) -> &Arc<dyn ProviderClient> {
        &self.provider
    }

    pub fn playlists(&self) -> &[PlaylistRef] {
        &self.playlists
    }

    pub fn candidates(&self) -> &[ResolvedTrack] {
        &self.candidates
    }

    pub fn seeds(&self) -> &SeedSelection {
        &self.seeds
    }

    pub fn filters(&self) -> &FilterParameters {
        &self.filters
    }

    pub fn recommendations(&self) -> &[ResolvedTrack] {
        &self.recommendations
    }

    fn toast(&self, level: ToastLevel, message: &str) {
        self.notifier.toast(level, message);
    }

    fn require(&self, operation: &'static str, allowed: bool) -> Result<(), FlowError> {
        if allowed {
            Ok(())
        } else {
            Err(FlowError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }

    fn reset_session_data(&mut self) {
        self.playlists.clear();
        self.candidates.clear();
        self.seeds.clear();
        self.filters = FilterParameters::default();
        self.recommendations.clear();
        self.last_record = None;
    }

    /// A provider logs itself out when its session is rejected. Mirror that
    /// here: drop everything gathered and return to `Unauthenticated`.
    fn check_session_lost(&mut self) -> Result<(), FlowError> {
        if self.provider.is_authenticated() {
            return Ok(());
        }
        log::warn!("{} session lost, resetting", self.provider.name());
        self.reset_session_data();
        self.state = SessionState::Unauthenticated;
        Err(FlowError::SessionExpired)
    }

    /// Sends the user to the active provider's login page.
    pub fn login(&self) {
        self.provider.login();
    }

    /// Completes a pending callback or restores a stored session.
    pub async fn authenticate(&mut self) -> bool {
        if !self.provider.check_session().await {
            log::info!("No {} session available", self.provider.name());
            return false;
        }

        if self.state == SessionState::Unauthenticated {
            self.state = SessionState::Authenticated;
            self.toast(
                ToastLevel::Success,
                &format!("Connected to {}!", self.provider.name()),
            );
        }
        true
    }

    pub fn logout(&mut self) {
        self.provider.logout();
        self.reset_session_data();
        self.state = SessionState::Unauthenticated;
    }

    /// Picks the import path. For playlists this also loads the user's
    /// playlists; an empty listing is reported but still enters the state.
    pub async fn choose_import(&mut self, method: ImportMethod) -> Result<&[PlaylistRef], FlowError> {
        self.require("choose an import method", self.state.is_authenticated())?;
        self.state = SessionState::ImportMethodChosen(method);
        self.playlists.clear();

        if method == ImportMethod::Playlist {
            self.playlists = self.provider.get_user_playlists().await;
            self.check_session_lost()?;
            if self.playlists.is_empty() {
                self.toast(
                    ToastLevel::Warning,
                    &format!("No playlists found on {}", self.provider.name()),
                );
            }
        }
        Ok(&self.playlists)
    }

    fn accept_candidates(&mut self, tracks: Vec<ResolvedTrack>) -> usize {
        self.candidates = tracks;
        self.seeds.clear();
        self.recommendations.clear();
        self.state = SessionState::SeedsPending;
        log::info!("{} candidate tracks ready for seed selection", self.candidates.len());
        self.candidates.len()
    }

    /// Loads a playlist's tracks as candidates. Returns how many were loaded;
    /// zero leaves the state unchanged.
    pub async fn select_playlist(&mut self, playlist_id: &str) -> Result<usize, FlowError> {
        self.require("import a playlist", self.state.is_authenticated())?;

        let tracks = self.provider.get_playlist_tracks(playlist_id).await;
        self.check_session_lost()?;
        if tracks.is_empty() {
            self.toast(ToastLevel::Warning, "This playlist is empty");
            return Ok(0);
        }
        Ok(self.accept_candidates(tracks))
    }

    /// Parses an uploaded file and resolves its first tracks on the active
    /// provider. Returns how many candidates were resolved; zero leaves the
    /// state unchanged.
    pub async fn upload_file(&mut self, content: &str, filename: &str) -> Result<usize, FlowError> {
        self.require("upload a file", self.state.is_authenticated())?;
        if self.state == SessionState::Authenticated {
            self.state = SessionState::ImportMethodChosen(ImportMethod::File);
        }

        let refs = parser::parse(content, filename);
        if refs.is_empty() {
            self.toast(ToastLevel::Warning, "No tracks found in the file");
            return Ok(0);
        }
        log::info!("Parsed {} tracks from {}", refs.len(), filename);

        let tracks = self.provider.search_tracks(&refs, SEARCH_CAP).await;
        self.check_session_lost()?;
        if tracks.is_empty() {
            self.toast(
                ToastLevel::Warning,
                &format!("No tracks found on {}", self.provider.name()),
            );
            return Ok(0);
        }
        Ok(self.accept_candidates(tracks))
    }

    /// Adds a candidate to the seeds. A sixth seed is refused with a warning
    /// and `Ok(false)`; the selection is left as it was.
    pub fn select_seed(&mut self, track_id: &str) -> Result<bool, FlowError> {
        self.require("select seeds", self.state == SessionState::SeedsPending)?;

        let track = self
            .candidates
            .iter()
            .find(|t| t.id == track_id)
            .cloned()
            .ok_or_else(|| FlowError::UnknownTrack(track_id.to_string()))?;

        match self.seeds.add(track) {
            Ok(()) => Ok(true),
            Err(e @ SeedError::Full(_)) => {
                self.toast(ToastLevel::Warning, &e.to_string());
                Ok(false)
            }
            Err(SeedError::AlreadySelected) => Ok(false),
        }
    }

    pub fn deselect_seed(&mut self, track_id: &str) -> Result<bool, FlowError> {
        self.require("deselect seeds", self.state == SessionState::SeedsPending)?;
        Ok(self.seeds.remove(track_id))
    }

    pub fn confirm_seeds(&mut self) -> Result<(), FlowError> {
        self.require("confirm seeds", self.state == SessionState::SeedsPending)?;
        if self.seeds.is_empty() {
            self.toast(ToastLevel::Warning, "Select at least one track");
            return Err(FlowError::NoSeeds);
        }
        self.state = SessionState::SeedsConfirmed;
        Ok(())
    }

    /// Out-of-range values are clamped.
    pub fn set_filters(&mut self, filters: FilterParameters) -> Result<(), FlowError> {
        self.require(
            "choose filters",
            matches!(
                self.state,
                SessionState::SeedsConfirmed
                    | SessionState::FiltersChosen
                    | SessionState::RecommendationsReady
            ),
        )?;
        self.filters = filters.clamped();
        self.state = SessionState::FiltersChosen;
        Ok(())
    }

    /// Requests recommendations for the confirmed seeds. The previous set is
    /// replaced; an empty result stays at `FiltersChosen`.
    pub async fn generate(&mut self) -> Result<&[ResolvedTrack], FlowError> {
        self.require(
            "generate recommendations",
            matches!(
                self.state,
                SessionState::FiltersChosen | SessionState::RecommendationsReady
            ),
        )?;

        let result = self
            .provider
            .get_recommendations(&self.seeds, &self.filters, self.filters.limit)
            .await;
        self.check_session_lost()?;

        if result.is_empty() {
            self.recommendations.clear();
            self.state = SessionState::FiltersChosen;
            self.toast(ToastLevel::Warning, "No recommendations found");
            return Ok(&self.recommendations);
        }

        if result.quality == RecommendationQuality::Degraded {
            self.toast(
                ToastLevel::Info,
                &format!(
                    "{} has no recommendation service; showing top tracks from your seed artists instead",
                    self.provider.name()
                ),
            );
        }

        self.recommendations = result.tracks;
        self.state = SessionState::RecommendationsReady;
        self.toast(
            ToastLevel::Success,
            &format!("{} recommendations generated", self.recommendations.len()),
        );
        self.record_history().await;

        Ok(&self.recommendations)
    }

    async fn record_history(&mut self) {
        let record = HistoryRecord::new(
            self.provider.id(),
            self.seeds.tracks().to_vec(),
            self.filters,
            self.recommendations.clone(),
            default_playlist_name(Utc::now()),
        );
        let id = record.id.clone();

        match self.history.save(record).await {
            Ok(()) => self.last_record = Some(id),
            Err(e) => log::error!("Failed to save history: {}", e),
        }
    }

    /// Writes the current recommendations to a new playlist. The session
    /// state is unchanged either way.
    pub async fn create_playlist(&mut self, name: Option<&str>) -> Result<Option<PlaylistRef>, FlowError> {
        self.require(
            "create a playlist",
            self.state == SessionState::RecommendationsReady,
        )?;

        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(String::from)
            .unwrap_or_else(|| default_playlist_name(Utc::now()));

        let Some(playlist) = self
            .provider
            .create_playlist(&name, &self.recommendations)
            .await
        else {
            self.check_session_lost()?;
            self.toast(ToastLevel::Error, "Failed to create playlist");
            return Ok(None);
        };

        self.toast(
            ToastLevel::Success,
            &format!("Playlist \"{}\" created on {}", playlist.name, self.provider.name()),
        );
        self.rename_last_record(&playlist.name).await;
        Ok(Some(playlist))
    }

    async fn rename_last_record(&self, name: &str) {
        let Some(id) = &self.last_record else {
            return;
        };
        let result = match self.history.get(id).await {
            Ok(Some(mut record)) => {
                record.playlist_name = name.to_string();
                self.history.save(record).await
            }
            Ok(None) => Ok(()),
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            log::warn!("Could not update history record {}: {}", id, e);
        }
    }

    /// Makes another registered provider active. Everything gathered from
    /// the previous provider is dropped, since track ids do not carry over.
    pub fn switch_provider(&mut self, id: ProviderId) -> Result<(), FlowError> {
        let provider = self
            .registry
            .get(id)
            .ok_or(FlowError::UnknownProvider(id))?;

        log::info!("Switching provider {} -> {}", self.provider.id(), id);
        self.provider = provider;
        self.reset_session_data();
        self.state = SessionState::Unauthenticated;
        Ok(())
    }

    pub async fn history(&self) -> Result<Vec<HistoryRecord>, FlowError> {
        Ok(self.history.list().await?)
    }

    /// Restores a saved generation, switching to its provider if needed.
    /// The restored session lands in `RecommendationsReady`.
    pub async fn load_history(&mut self, id: &str) -> Result<(), FlowError> {
        let record = self
            .history
            .get(id)
            .await?
            .ok_or_else(|| FlowError::RecordNotFound(id.to_string()))?;

        if record.platform != self.provider.id() {
            self.switch_provider(record.platform)?;
        }

        self.reset_session_data();
        self.seeds = SeedSelection::from_tracks(record.seed_tracks.clone());
        self.candidates = record.seed_tracks;
        self.filters = record.filters;
        self.recommendations = record.recommendations;
        self.last_record = Some(record.id);
        self.state = SessionState::RecommendationsReady;
        self.toast(ToastLevel::Success, "History loaded");
        Ok(())
    }

    pub async fn delete_history(&mut self, id: &str) -> Result<(), FlowError> {
        if !self.history.delete(id).await? {
            return Err(FlowError::RecordNotFound(id.to_string()));
        }
        if self.last_record.as_deref() == Some(id) {
            self.last_record = None;
        }
        self.toast(ToastLevel::Success, "History record deleted");
        Ok(())
    }

    pub async fn clear_history(&mut self) -> Result<(), FlowError> {
        self.history.clear().await?;
        self.last_record = None;
        self.toast(ToastLevel::Success, "History cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::MemoryHistoryStore;
    use crate::providers::Recommendations;
    use crate::testing::{resolved, RecordingNotifier, StubProvider};

    struct Fixture {
        orchestrator: Orchestrator,
        spotify: Arc<StubProvider>,
        tidal: Arc<StubProvider>,
        notifier: Arc<RecordingNotifier>,
        history: Arc<MemoryHistoryStore>,
    }

    fn fixture() -> Fixture {
        let notifier = Arc::new(RecordingNotifier::default());
        let history = Arc::new(MemoryHistoryStore::new());
        let spotify = Arc::new(StubProvider::new(ProviderId::Spotify, notifier.clone()));
        let tidal = Arc::new(StubProvider::new(ProviderId::Tidal, notifier.clone()));

        let mut registry = ProviderRegistry::new();
        registry.register(spotify.clone());
        registry.register(tidal.clone());

        let orchestrator =
            Orchestrator::new(registry, ProviderId::Spotify, notifier.clone(), history.clone()).unwrap();
        Fixture {
            orchestrator,
            spotify,
            tidal,
            notifier,
            history,
        }
    }

    fn candidates(n: usize) -> Vec<ResolvedTrack> {
        (0..n).map(|i| resolved(&format!("c{}", i), "Artist")).collect()
    }

    /// Authenticated with `n` candidates from a playlist.
    async fn with_candidates(n: usize) -> Fixture {
        let mut f = fixture();
        f.spotify.set_playlist_tracks(candidates(n));
        assert!(f.orchestrator.authenticate().await);
        assert_eq!(f.orchestrator.select_playlist("p1").await.unwrap(), n);
        f
    }

    async fn ready(f: &mut Fixture) {
        f.orchestrator.select_seed("c0").unwrap();
        f.orchestrator.confirm_seeds().unwrap();
        f.orchestrator.set_filters(FilterParameters::default()).unwrap();
        f.orchestrator.generate().await.unwrap();
    }

    #[tokio::test]
    async fn test_authenticate_transitions_and_toasts() {
        let mut f = fixture();
        f.spotify.set_session(false);
        assert!(!f.orchestrator.authenticate().await);
        assert_eq!(f.orchestrator.state(), SessionState::Unauthenticated);

        f.spotify.set_session(true);
        assert!(f.orchestrator.authenticate().await);
        assert_eq!(f.orchestrator.state(), SessionState::Authenticated);
        assert!(f.notifier.has_toast(ToastLevel::Success, "Connected to Spotify!"));
    }

    #[tokio::test]
    async fn test_steps_require_authentication() {
        let mut f = fixture();
        assert!(matches!(
            f.orchestrator.upload_file("A - B", "list.txt").await,
            Err(FlowError::InvalidState { .. })
        ));
        assert!(matches!(
            f.orchestrator.choose_import(ImportMethod::Playlist).await,
            Err(FlowError::InvalidState { .. })
        ));
    }

    #[tokio::test]
    async fn test_playlist_import_path() {
        let mut f = fixture();
        f.spotify.set_playlists(vec![PlaylistRef {
            id: "p1".into(),
            name: "Mine".into(),
            description: String::new(),
            image_url: None,
            track_count: 3,
            external_url: None,
        }]);
        f.spotify.set_playlist_tracks(candidates(3));
        f.orchestrator.authenticate().await;

        let playlists = f.orchestrator.choose_import(ImportMethod::Playlist).await.unwrap();
        assert_eq!(playlists.len(), 1);
        assert_eq!(
            f.orchestrator.state(),
            SessionState::ImportMethodChosen(ImportMethod::Playlist)
        );

        assert_eq!(f.orchestrator.select_playlist("p1").await.unwrap(), 3);
        assert_eq!(f.orchestrator.state(), SessionState::SeedsPending);
    }

    #[tokio::test]
    async fn test_empty_playlist_stays_put() {
        let mut f = fixture();
        f.orchestrator.authenticate().await;
        f.orchestrator.choose_import(ImportMethod::Playlist).await.unwrap();

        assert_eq!(f.orchestrator.select_playlist("empty").await.unwrap(), 0);
        assert_eq!(
            f.orchestrator.state(),
            SessionState::ImportMethodChosen(ImportMethod::Playlist)
        );
        assert!(f.notifier.has_toast(ToastLevel::Warning, "This playlist is empty"));
    }

    #[tokio::test]
    async fn test_file_upload_resolves_first_five() {
        let mut f = fixture();
        f.orchestrator.authenticate().await;
        let content = (0..8)
            .map(|i| format!("Artist - Song {}", i))
            .collect::<Vec<_>>()
            .join("\n");

        assert_eq!(f.orchestrator.upload_file(&content, "songs.txt").await.unwrap(), 5);
        assert_eq!(f.spotify.searched().len(), 5);
        assert_eq!(f.orchestrator.state(), SessionState::SeedsPending);
    }

    #[tokio::test]
    async fn test_unparsable_and_unmatched_uploads() {
        let mut f = fixture();
        f.orchestrator.authenticate().await;

        assert_eq!(f.orchestrator.upload_file("{not json", "x.json").await.unwrap(), 0);
        assert!(f.notifier.has_toast(ToastLevel::Warning, "No tracks found in the file"));
        assert!(f.spotify.searched().is_empty());

        f.spotify.set_search_misses(true);
        assert_eq!(f.orchestrator.upload_file("A - B", "x.txt").await.unwrap(), 0);
        assert!(f.notifier.has_toast(ToastLevel::Warning, "No tracks found on Spotify"));
        assert_eq!(
            f.orchestrator.state(),
            SessionState::ImportMethodChosen(ImportMethod::File)
        );
    }

    #[tokio::test]
    async fn test_sixth_seed_is_refused_with_warning() {
        let mut f = with_candidates(6).await;
        for i in 0..5 {
            assert!(f.orchestrator.select_seed(&format!("c{}", i)).unwrap());
        }

        assert!(!f.orchestrator.select_seed("c5").unwrap());
        assert_eq!(f.orchestrator.seeds().len(), 5);
        assert!(!f.orchestrator.seeds().contains("c5"));
        assert!(f.notifier.has_level(ToastLevel::Warning));

        assert!(f.orchestrator.deselect_seed("c4").unwrap());
        assert!(f.orchestrator.select_seed("c5").unwrap());
        assert_eq!(f.orchestrator.seeds().len(), 5);
    }

    #[tokio::test]
    async fn test_seed_selection_checks_candidates() {
        let mut f = with_candidates(2).await;
        assert!(matches!(
            f.orchestrator.select_seed("nope"),
            Err(FlowError::UnknownTrack(_))
        ));
        assert!(matches!(f.orchestrator.confirm_seeds(), Err(FlowError::NoSeeds)));
        assert_eq!(f.orchestrator.state(), SessionState::SeedsPending);
    }

    #[tokio::test]
    async fn test_generate_saves_history() {
        let mut f = with_candidates(3).await;
        f.spotify
            .set_recommendations(Recommendations::native(candidates(4)));
        ready(&mut f).await;

        assert_eq!(f.orchestrator.state(), SessionState::RecommendationsReady);
        assert_eq!(f.orchestrator.recommendations().len(), 4);
        assert!(f.notifier.has_toast(ToastLevel::Success, "4 recommendations generated"));

        let saved = f.history.list().await.unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].platform, ProviderId::Spotify);
        assert_eq!(saved[0].seed_tracks.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_generation_stays_at_filters_chosen() {
        let mut f = with_candidates(2).await;
        ready(&mut f).await;

        assert_eq!(f.orchestrator.state(), SessionState::FiltersChosen);
        assert!(f.notifier.has_toast(ToastLevel::Warning, "No recommendations found"));
        assert!(f.history.list().await.unwrap().is_empty());
        assert!(matches!(
            f.orchestrator.create_playlist(None).await,
            Err(FlowError::InvalidState { .. })
        ));
    }

    #[tokio::test]
    async fn test_degraded_recommendations_inform() {
        let mut f = fixture();
        f.orchestrator.switch_provider(ProviderId::Tidal).unwrap();
        f.tidal.set_playlist_tracks(candidates(1));
        f.tidal
            .set_recommendations(Recommendations::degraded(candidates(2)));
        f.orchestrator.authenticate().await;
        f.orchestrator.select_playlist("p").await.unwrap();
        ready(&mut f).await;

        assert_eq!(f.orchestrator.state(), SessionState::RecommendationsReady);
        assert!(f.notifier.has_level(ToastLevel::Info));
    }

    #[tokio::test]
    async fn test_create_playlist_is_reentrant() {
        let mut f = with_candidates(1).await;
        f.spotify
            .set_recommendations(Recommendations::native(candidates(3)));
        ready(&mut f).await;

        let created = f.orchestrator.create_playlist(Some("Road trip")).await.unwrap();
        assert_eq!(created.map(|p| p.name).as_deref(), Some("Road trip"));
        assert_eq!(f.orchestrator.state(), SessionState::RecommendationsReady);
        assert_eq!(f.history.list().await.unwrap()[0].playlist_name, "Road trip");

        f.spotify.set_create_fails(true);
        assert!(f.orchestrator.create_playlist(None).await.unwrap().is_none());
        assert!(f.notifier.has_toast(ToastLevel::Error, "Failed to create playlist"));
        assert_eq!(f.orchestrator.state(), SessionState::RecommendationsReady);
    }

    #[tokio::test]
    async fn test_switching_provider_clears_state() {
        let mut f = with_candidates(2).await;
        f.spotify
            .set_recommendations(Recommendations::native(candidates(2)));
        ready(&mut f).await;

        f.orchestrator.switch_provider(ProviderId::Tidal).unwrap();
        assert_eq!(f.orchestrator.active_provider(), ProviderId::Tidal);
        assert_eq!(f.orchestrator.state(), SessionState::Unauthenticated);
        assert!(f.orchestrator.seeds().is_empty());
        assert!(f.orchestrator.recommendations().is_empty());
        assert!(f.orchestrator.candidates().is_empty());
    }

    #[tokio::test]
    async fn test_history_round_trip_restores_provider_and_recommendations() {
        let mut f = fixture();
        f.orchestrator.switch_provider(ProviderId::Tidal).unwrap();
        f.tidal.set_playlist_tracks(candidates(2));
        f.tidal
            .set_recommendations(Recommendations::degraded(candidates(3)));
        f.orchestrator.authenticate().await;
        f.orchestrator.select_playlist("p").await.unwrap();
        ready(&mut f).await;
        let generated = f.orchestrator.recommendations().to_vec();
        let record_id = f.orchestrator.history().await.unwrap()[0].id.clone();

        f.orchestrator.switch_provider(ProviderId::Spotify).unwrap();
        f.orchestrator.load_history(&record_id).await.unwrap();

        assert_eq!(f.orchestrator.active_provider(), ProviderId::Tidal);
        assert_eq!(f.orchestrator.recommendations(), generated.as_slice());
        assert_eq!(f.orchestrator.state(), SessionState::RecommendationsReady);
        assert_eq!(f.orchestrator.seeds().ids(), vec!["c0"]);

        assert!(matches!(
            f.orchestrator.load_history("missing").await,
            Err(FlowError::RecordNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_logout_resets() {
        let mut f = with_candidates(2).await;
        f.orchestrator.logout();
        assert_eq!(f.orchestrator.state(), SessionState::Unauthenticated);
        assert!(f.orchestrator.candidates().is_empty());
        assert!(!f.spotify.is_authenticated());
    }

    #[tokio::test]
    async fn test_rejected_session_returns_to_unauthenticated() {
        use crate::spotify::{SpotifyClient, SpotifyConfig};
        use crate::testing::{ok, status, FakeTransport, Harness};
        use serde_json::json;

        let harness = Harness::new(FakeTransport::new(|req| {
            if req.url.path() == "/v1/search" {
                ok(json!({"tracks": {"items": [{
                    "id": "t1",
                    "name": "One More Time",
                    "artists": [{"id": "a1", "name": "Daft Punk"}],
                    "album": {"name": "Discovery", "images": []}
                }], "next": null}}))
            } else {
                status(401, "")
            }
        }));
        harness.store_live_session(ProviderId::Spotify);

        let mut registry = ProviderRegistry::new();
        registry.register(Arc::new(SpotifyClient::new(
            SpotifyConfig::default(),
            harness.context(),
        )));
        let mut orchestrator = Orchestrator::new(
            registry,
            ProviderId::Spotify,
            harness.notifier.clone(),
            Arc::new(MemoryHistoryStore::new()),
        )
        .unwrap();

        assert!(orchestrator.authenticate().await);
        assert_eq!(
            orchestrator.upload_file("Daft Punk - One More Time", "list.txt").await.unwrap(),
            1
        );
        orchestrator.select_seed("t1").unwrap();
        orchestrator.confirm_seeds().unwrap();
        orchestrator.set_filters(FilterParameters::default()).unwrap();

        assert!(matches!(
            orchestrator.generate().await,
            Err(FlowError::SessionExpired)
        ));
        assert_eq!(orchestrator.state(), SessionState::Unauthenticated);
        assert!(orchestrator.seeds().is_empty());
        assert!(orchestrator.candidates().is_empty());
        assert!(harness.notifier.has_level(ToastLevel::Error));
        assert!(!harness
            .notifier
            .has_toast(ToastLevel::Warning, "No recommendations found"));
    }

    #[tokio::test]
    async fn test_rejected_session_during_import() {
        let mut f = fixture();
        f.orchestrator.authenticate().await;
        f.spotify.logout();

        assert!(matches!(
            f.orchestrator.choose_import(ImportMethod::Playlist).await,
            Err(FlowError::SessionExpired)
        ));
        assert_eq!(f.orchestrator.state(), SessionState::Unauthenticated);
        assert!(!f
            .notifier
            .has_toast(ToastLevel::Warning, "No playlists found on Spotify"));
    }

    #[tokio::test]
    async fn test_history_load_and_delete_notify() {
        let mut f = with_candidates(1).await;
        f.spotify
            .set_recommendations(Recommendations::native(candidates(2)));
        ready(&mut f).await;
        let id = f.orchestrator.history().await.unwrap()[0].id.clone();

        f.orchestrator.load_history(&id).await.unwrap();
        assert!(f.notifier.has_toast(ToastLevel::Success, "History loaded"));

        f.orchestrator.delete_history(&id).await.unwrap();
        assert!(f.notifier.has_toast(ToastLevel::Success, "History record deleted"));
        assert!(f.history.list().await.unwrap().is_empty());
        assert!(matches!(
            f.orchestrator.delete_history(&id).await,
            Err(FlowError::RecordNotFound(_))
        ));
    }
}
