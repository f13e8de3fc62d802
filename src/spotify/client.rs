use async_trait::async_trait;
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;

use super::config::*;
use super::models::*;
use crate::config::{MAX_SEEDS, PLAYLIST_DESCRIPTION};
use crate::errors::ProviderError;
use crate::models::{AuthSession, FilterField, FilterParameters, PlaylistRef, RawTrackRef, ResolvedTrack, SeedSelection};
use crate::notifier::{LoadingGuard, Notifier, ToastLevel};
use crate::providers::agent::parse_fragment;
use crate::providers::http::{endpoint_url, ApiRequest};
use crate::providers::{AuthSlot, ProviderClient, ProviderContext, ProviderId, Recommendations};

const SESSION_EXPIRED: &str = "Your session has expired. Please log in again.";
/// Token lifetime assumed when the callback omits `expires_in`.
const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

/// Provider A: implicit-grant bearer auth, offset pagination and a native
/// recommendation endpoint.
pub struct SpotifyClient {
    config: SpotifyConfig,
    ctx: ProviderContext,
    auth: AuthSlot,
}

impl SpotifyClient {
    pub fn new(config: SpotifyConfig, ctx: ProviderContext) -> Self {
        let auth = AuthSlot::new(ProviderId::Spotify, ctx.sessions.clone());
        Self { config, ctx, auth }
    }

    pub fn authorize_url(&self) -> Result<Url, ProviderError> {
        Url::parse_with_params(
            &self.config.authorize_url,
            &[
                ("client_id", self.config.client_id.as_str()),
                ("response_type", "token"),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("scope", SCOPES.join(" ").as_str()),
            ],
        )
        .map_err(|e| ProviderError::Network(format!("URL parse error: {}", e)))
    }

    fn toast(&self, level: ToastLevel, message: &str) {
        self.ctx.notifier.toast(level, message);
    }

    fn expire_session(&self) {
        self.toast(ToastLevel::Error, SESSION_EXPIRED);
        self.logout();
    }

    /// Authenticated call against the Web API. A missing/expired session or a
    /// 401 logs the user out; other failures are reported with Spotify's own
    /// error message when it sends one.
    async fn request(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, String)],
        body: Option<Value>,
    ) -> Result<Value, ProviderError> {
        let Some(token) = self.auth.valid_token() else {
            self.expire_session();
            return Err(ProviderError::NoSession);
        };

        let url = endpoint_url(&self.config.api_base, path, params)?;
        let mut request = ApiRequest::new(method, url)
            .bearer(&token)
            .header("Content-Type", "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = match self.ctx.transport.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                log::error!("Spotify request {} failed: {}", path, e);
                self.toast(ToastLevel::Error, &format!("Error: {}", e));
                return Err(e);
            }
        };

        if response.status == 401 {
            log::warn!("Spotify rejected token for {}", path);
            self.expire_session();
            return Err(ProviderError::Unauthorized);
        }

        if !response.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&response.body)
                .ok()
                .and_then(|b| b.error.message)
                .unwrap_or_else(|| "Request failed".to_string());
            log::warn!("Spotify {} returned {}: {}", path, response.status, message);
            self.toast(ToastLevel::Error, &format!("Error: {}", message));
            return Err(ProviderError::Http {
                status: response.status,
                message,
            });
        }

        response.json()
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, params: &[(&str, String)]) -> Result<T, ProviderError> {
        let data = self.request(Method::GET, path, params, None).await?;
        serde_json::from_value(data).map_err(ProviderError::from)
    }

    /// Follows offset pagination until `next` is null or a page fails; pages
    /// fetched before a failure are kept.
    async fn get_all_pages<T: DeserializeOwned>(&self, path: &str, page_size: u32) -> Vec<T> {
        let mut all = Vec::new();
        let mut offset = 0;

        loop {
            let params = [("limit", page_size.to_string()), ("offset", offset.to_string())];
            let page: Paging<T> = match self.get(path, &params).await {
                Ok(page) => page,
                Err(e) => {
                    log::warn!("Stopping pagination of {} at offset {}: {}", path, offset, e);
                    break;
                }
            };

            all.extend(page.items);
            if page.next.is_none() {
                break;
            }
            offset += page_size;
        }

        all
    }
}

#[async_trait]
impl ProviderClient for SpotifyClient {
    fn id(&self) -> ProviderId {
        ProviderId::Spotify
    }

    fn supported_filters(&self) -> &'static [FilterField] {
        &FilterField::ALL
    }

    fn add_batch_size(&self) -> usize {
        ADD_BATCH_SIZE
    }

    fn notifier(&self) -> Arc<dyn Notifier> {
        self.ctx.notifier.clone()
    }

    fn login(&self) {
        match self.authorize_url() {
            Ok(url) => self.ctx.agent.navigate(&url),
            Err(e) => log::error!("Cannot build Spotify authorize URL: {}", e),
        }
    }

    async fn check_session(&self) -> bool {
        let url = self.ctx.agent.current_url();

        if let Some(fragment) = url.fragment() {
            let params = parse_fragment(fragment);
            let value = |key: &str| {
                params
                    .iter()
                    .find(|(k, _)| k == key)
                    .map(|(_, v)| v.clone())
            };

            if let Some(token) = value("access_token").filter(|t| !t.is_empty()) {
                let expires_in = value("expires_in")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_EXPIRES_IN_SECS);
                self.auth
                    .set(AuthSession::expiring_in(token, None, expires_in));

                let mut clean = url.clone();
                clean.set_fragment(None);
                self.ctx.agent.replace_url(&clean);

                log::info!("Spotify session established from callback");
                return true;
            }
        }

        match self.auth.stored() {
            Some(stored) if stored.is_valid() => {
                self.auth.adopt(stored);
                true
            }
            _ => false,
        }
    }

    fn is_authenticated(&self) -> bool {
        self.auth.is_valid()
    }

    fn logout(&self) {
        self.auth.clear();
        self.ctx.agent.reload();
    }

    async fn search_track(&self, track: &RawTrackRef) -> Result<Option<ResolvedTrack>, ProviderError> {
        let params = [
            ("q", track.search_query()),
            ("type", "track".to_string()),
            ("limit", "1".to_string()),
        ];
        let response: SearchResponse = self.get("/search", &params).await?;
        Ok(response
            .tracks
            .items
            .into_iter()
            .next()
            .and_then(SpotifyTrack::into_resolved))
    }

    async fn get_user_playlists(&self) -> Vec<PlaylistRef> {
        let _loading = LoadingGuard::new(self.notifier(), "Loading your playlists...");
        self.get_all_pages::<SpotifyPlaylist>("/me/playlists", PLAYLIST_PAGE_SIZE)
            .await
            .into_iter()
            .map(PlaylistRef::from)
            .collect()
    }

    async fn get_playlist_tracks(&self, playlist_id: &str) -> Vec<ResolvedTrack> {
        let _loading = LoadingGuard::new(self.notifier(), "Fetching playlist tracks...");
        let path = format!("/playlists/{}/tracks", urlencoding::encode(playlist_id));
        self.get_all_pages::<PlaylistItem>(&path, TRACK_PAGE_SIZE)
            .await
            .into_iter()
            .filter_map(|item| item.track)
            .filter_map(SpotifyTrack::into_resolved)
            .collect()
    }

    async fn get_recommendations(
        &self,
        seeds: &SeedSelection,
        filters: &FilterParameters,
        limit: u32,
    ) -> Recommendations {
        if seeds.is_empty() {
            return Recommendations::native(Vec::new());
        }

        let _loading = LoadingGuard::new(self.notifier(), "Generating recommendations...");

        let seed_ids: Vec<&str> = seeds.ids().into_iter().take(MAX_SEEDS).collect();
        let mut params = vec![("seed_tracks", seed_ids.join(",")), ("limit", limit.to_string())];
        params.extend(filters.query_pairs(self.supported_filters()));

        match self
            .get::<RecommendationsResponse>("/recommendations", &params)
            .await
        {
            Ok(response) => Recommendations::native(
                response
                    .tracks
                    .into_iter()
                    .filter_map(SpotifyTrack::into_resolved)
                    .collect(),
            ),
            Err(e) => {
                log::error!("Spotify recommendations failed: {}", e);
                Recommendations::native(Vec::new())
            }
        }
    }

    async fn create_empty_playlist(&self, name: &str) -> Result<PlaylistRef, ProviderError> {
        let user: UserProfile = self.get("/me", &[]).await?;

        let path = format!("/users/{}/playlists", urlencoding::encode(&user.id));
        let body = json!({
            "name": name,
            "description": PLAYLIST_DESCRIPTION,
            "public": false,
        });
        let created = self.request(Method::POST, &path, &[], Some(body)).await?;
        let playlist: SpotifyPlaylist = serde_json::from_value(created)?;
        Ok(playlist.into())
    }

    async fn add_playlist_tracks(&self, playlist_id: &str, batch: &[ResolvedTrack]) -> Result<(), ProviderError> {
        let uris: Vec<String> = batch
            .iter()
            .map(|t| {
                t.uri
                    .clone()
                    .unwrap_or_else(|| format!("spotify:track:{}", t.id))
            })
            .collect();

        let path = format!("/playlists/{}/tracks", urlencoding::encode(playlist_id));
        self.request(Method::POST, &path, &[], Some(json!({ "uris": uris })))
            .await?;
        Ok(())
    }
}
