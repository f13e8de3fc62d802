//! Test doubles for the host collaborators and the HTTP transport.

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::{Method, Url};
use serde_json::Value;
use std::sync::Arc;

use crate::errors::ProviderError;
use crate::models::{
    ArtistRef, AuthSession, FilterField, FilterParameters, PlaylistRef, RawTrackRef, ResolvedTrack, SeedSelection,
};
use crate::notifier::{Notifier, ToastLevel};
use crate::providers::http::{ApiRequest, ApiResponse, Transport};
use crate::providers::{
    MemorySessionStore, ProviderClient, ProviderContext, ProviderId, Recommendations, SessionStore, StaticAgent,
};

type Handler = dyn Fn(&ApiRequest) -> Result<ApiResponse, ProviderError> + Send + Sync;

/// Answers every request through a closure and records what was sent.
pub struct FakeTransport {
    handler: Box<Handler>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl FakeTransport {
    pub fn new(handler: impl Fn(&ApiRequest) -> Result<ApiResponse, ProviderError> + Send + Sync + 'static) -> Self {
        Self {
            handler: Box::new(handler),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().clone()
    }

    pub fn requests_to(&self, method: Method, path: &str) -> Vec<ApiRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.url.path() == path)
            .collect()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, ProviderError> {
        let response = (self.handler)(&request);
        self.requests.lock().push(request);
        response
    }
}

pub fn ok(body: Value) -> Result<ApiResponse, ProviderError> {
    status(200, &body.to_string())
}

pub fn status(code: u16, body: &str) -> Result<ApiResponse, ProviderError> {
    Ok(ApiResponse {
        status: code,
        body: body.to_string(),
    })
}

#[derive(Default)]
pub struct RecordingNotifier {
    toasts: Mutex<Vec<(ToastLevel, String)>>,
    labels: Mutex<Vec<String>>,
    loading_depth: Mutex<i32>,
}

impl RecordingNotifier {
    pub fn toasts(&self) -> Vec<(ToastLevel, String)> {
        self.toasts.lock().clone()
    }

    pub fn has_toast(&self, level: ToastLevel, message: &str) -> bool {
        self.toasts
            .lock()
            .iter()
            .any(|(l, m)| *l == level && m == message)
    }

    pub fn has_level(&self, level: ToastLevel) -> bool {
        self.toasts.lock().iter().any(|(l, _)| *l == level)
    }

    pub fn is_loading(&self) -> bool {
        *self.loading_depth.lock() > 0
    }

    pub fn loading_labels(&self) -> Vec<String> {
        self.labels.lock().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn toast(&self, level: ToastLevel, message: &str) {
        self.toasts.lock().push((level, message.to_string()));
    }

    fn show_loading(&self, label: &str) {
        self.labels.lock().push(label.to_string());
        *self.loading_depth.lock() += 1;
    }

    fn hide_loading(&self) {
        *self.loading_depth.lock() -= 1;
    }
}

pub const CALLBACK_URL: &str = "http://localhost:8888/callback";

pub struct Harness {
    pub transport: Arc<FakeTransport>,
    pub notifier: Arc<RecordingNotifier>,
    pub agent: Arc<StaticAgent>,
    pub sessions: Arc<MemorySessionStore>,
}

impl Harness {
    pub fn new(transport: FakeTransport) -> Self {
        Self {
            transport: Arc::new(transport),
            notifier: Arc::new(RecordingNotifier::default()),
            agent: Arc::new(StaticAgent::new(Url::parse(CALLBACK_URL).unwrap())),
            sessions: Arc::new(MemorySessionStore::new()),
        }
    }

    pub fn context(&self) -> ProviderContext {
        ProviderContext {
            transport: self.transport.clone(),
            sessions: self.sessions.clone(),
            agent: self.agent.clone(),
            notifier: self.notifier.clone(),
        }
    }

    pub fn set_url(&self, url: &str) {
        self.agent.set_current(Url::parse(url).unwrap());
    }

    pub fn store_live_session(&self, provider: ProviderId) {
        self.sessions
            .save(
                provider,
                &AuthSession::expiring_in("live-token".into(), Some("refresh-token".into()), 3600),
            )
            .unwrap();
    }

    pub async fn authenticate(&self, provider: &dyn ProviderClient) {
        self.store_live_session(provider.id());
        assert!(provider.check_session().await);
    }
}

/// A resolved track whose primary artist id is the lowercased artist name.
pub fn resolved(id: &str, artist: &str) -> ResolvedTrack {
    ResolvedTrack {
        id: id.to_string(),
        name: format!("Track {}", id),
        artist: artist.to_string(),
        artists: vec![ArtistRef {
            id: Some(artist.to_lowercase()),
            name: artist.to_string(),
        }],
        album: "Album".to_string(),
        image_url: None,
        uri: None,
        external_url: None,
        preview_url: None,
    }
}

/// A provider with canned answers, for driving the orchestrator without HTTP.
pub struct StubProvider {
    id: ProviderId,
    notifier: Arc<RecordingNotifier>,
    session: Mutex<bool>,
    authenticated: Mutex<bool>,
    playlists: Mutex<Vec<PlaylistRef>>,
    playlist_tracks: Mutex<Vec<ResolvedTrack>>,
    recommendations: Mutex<Recommendations>,
    search_misses: Mutex<bool>,
    create_fails: Mutex<bool>,
    searched: Mutex<Vec<RawTrackRef>>,
}

impl StubProvider {
    pub fn new(id: ProviderId, notifier: Arc<RecordingNotifier>) -> Self {
        Self {
            id,
            notifier,
            session: Mutex::new(true),
            authenticated: Mutex::new(false),
            playlists: Mutex::new(Vec::new()),
            playlist_tracks: Mutex::new(Vec::new()),
            recommendations: Mutex::new(Recommendations::native(Vec::new())),
            search_misses: Mutex::new(false),
            create_fails: Mutex::new(false),
            searched: Mutex::new(Vec::new()),
        }
    }

    pub fn set_session(&self, available: bool) {
        *self.session.lock() = available;
    }

    pub fn set_playlists(&self, playlists: Vec<PlaylistRef>) {
        *self.playlists.lock() = playlists;
    }

    pub fn set_playlist_tracks(&self, tracks: Vec<ResolvedTrack>) {
        *self.playlist_tracks.lock() = tracks;
    }

    pub fn set_recommendations(&self, recommendations: Recommendations) {
        *self.recommendations.lock() = recommendations;
    }

    pub fn set_search_misses(&self, misses: bool) {
        *self.search_misses.lock() = misses;
    }

    pub fn set_create_fails(&self, fails: bool) {
        *self.create_fails.lock() = fails;
    }

    pub fn searched(&self) -> Vec<RawTrackRef> {
        self.searched.lock().clone()
    }
}

#[async_trait]
impl ProviderClient for StubProvider {
    fn id(&self) -> ProviderId {
        self.id
    }

    fn supported_filters(&self) -> &'static [FilterField] {
        &FilterField::ALL
    }

    fn add_batch_size(&self) -> usize {
        100
    }

    fn notifier(&self) -> Arc<dyn Notifier> {
        self.notifier.clone()
    }

    fn login(&self) {}

    async fn check_session(&self) -> bool {
        let available = *self.session.lock();
        *self.authenticated.lock() = available;
        available
    }

    fn is_authenticated(&self) -> bool {
        *self.authenticated.lock()
    }

    fn logout(&self) {
        *self.authenticated.lock() = false;
    }

    async fn search_track(&self, track: &RawTrackRef) -> Result<Option<ResolvedTrack>, ProviderError> {
        let mut searched = self.searched.lock();
        searched.push(track.clone());
        if *self.search_misses.lock() {
            return Ok(None);
        }
        Ok(Some(resolved(&format!("s{}", searched.len()), &track.artist)))
    }

    async fn get_user_playlists(&self) -> Vec<PlaylistRef> {
        self.playlists.lock().clone()
    }

    async fn get_playlist_tracks(&self, _playlist_id: &str) -> Vec<ResolvedTrack> {
        self.playlist_tracks.lock().clone()
    }

    async fn get_recommendations(
        &self,
        _seeds: &SeedSelection,
        _filters: &FilterParameters,
        _limit: u32,
    ) -> Recommendations {
        self.recommendations.lock().clone()
    }

    async fn create_empty_playlist(&self, name: &str) -> Result<PlaylistRef, ProviderError> {
        if *self.create_fails.lock() {
            return Err(ProviderError::Http {
                status: 500,
                message: "unavailable".into(),
            });
        }
        Ok(PlaylistRef {
            id: "created".into(),
            name: name.to_string(),
            description: String::new(),
            image_url: None,
            track_count: 0,
            external_url: None,
        })
    }

    async fn add_playlist_tracks(&self, _playlist_id: &str, _batch: &[ResolvedTrack]) -> Result<(), ProviderError> {
        Ok(())
    }
}
