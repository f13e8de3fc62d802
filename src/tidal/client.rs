use async_trait::async_trait;
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Arc;

use super::config::*;
use super::models::*;
use crate::config::{MAX_SEEDS, PLAYLIST_DESCRIPTION};
use crate::errors::ProviderError;
use crate::models::{AuthSession, FilterField, FilterParameters, PlaylistRef, RawTrackRef, ResolvedTrack, SeedSelection};
use crate::notifier::{LoadingGuard, Notifier, ToastLevel};
use crate::providers::http::{endpoint_url, ApiRequest, ApiResponse};
use crate::providers::{AuthSlot, ProviderClient, ProviderContext, ProviderId, Recommendations};

const SESSION_EXPIRED: &str = "Your Tidal session has expired. Please log in again.";

/// Provider B: authorization-code auth with refresh tokens, JSON:API style
/// payloads, and no recommendation endpoint.
pub struct TidalClient {
    config: TidalConfig,
    ctx: ProviderContext,
    auth: AuthSlot,
}

impl TidalClient {
    pub fn new(config: TidalConfig, ctx: ProviderContext) -> Self {
        let auth = AuthSlot::new(ProviderId::Tidal, ctx.sessions.clone());
        Self { config, ctx, auth }
    }

    pub fn authorize_url(&self) -> Result<Url, ProviderError> {
        Url::parse_with_params(
            &self.config.login_url,
            &[
                ("response_type", "code"),
                ("client_id", self.config.client_id.as_str()),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("scope", SCOPES),
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

    async fn token_request(&self, fields: &[(&str, &str)]) -> Result<TokenResponse, ProviderError> {
        let url = endpoint_url(&self.config.auth_base, "/v1/oauth2/token", &[])?;
        let request = ApiRequest::post(url)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .form(fields);

        let response = self.ctx.transport.execute(request).await?;
        if !response.is_success() {
            return Err(ProviderError::Http {
                status: response.status,
                message: format!("Token endpoint returned HTTP {}", response.status),
            });
        }
        serde_json::from_str(&response.body).map_err(ProviderError::from)
    }

    /// Trades an authorization code for a session.
    pub async fn exchange_code_for_token(&self, code: &str) -> bool {
        let fields = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
        ];

        match self.token_request(&fields).await {
            Ok(token) => {
                self.auth.set(AuthSession::expiring_in(
                    token.access_token,
                    token.refresh_token,
                    token.expires_in,
                ));
                log::info!("Tidal session established from authorization code");
                true
            }
            Err(e) => {
                log::error!("Tidal code exchange failed: {}", e);
                self.toast(ToastLevel::Error, "Could not authenticate with Tidal");
                false
            }
        }
    }

    /// Replaces the access token using the stored refresh token. The refresh
    /// token is kept when the response does not rotate it.
    pub async fn refresh_access_token(&self) -> Result<String, ProviderError> {
        let refresh_token = self
            .auth
            .get()
            .or_else(|| self.auth.stored())
            .and_then(|s| s.refresh_token)
            .ok_or_else(|| ProviderError::Refresh("no refresh token".to_string()))?;

        let fields = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token.as_str()),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
        ];
        let token = self
            .token_request(&fields)
            .await
            .map_err(|e| ProviderError::Refresh(e.to_string()))?;

        let access_token = token.access_token.clone();
        self.auth.set(AuthSession::expiring_in(
            token.access_token,
            token.refresh_token.or(Some(refresh_token)),
            token.expires_in,
        ));
        log::debug!("Refreshed Tidal access token");
        Ok(access_token)
    }

    /// A usable access token, refreshing first if the current one expired.
    async fn ensure_token(&self) -> Result<String, ProviderError> {
        if let Some(token) = self.auth.valid_token() {
            return Ok(token);
        }

        match self.refresh_access_token().await {
            Ok(token) => Ok(token),
            Err(e) => {
                log::warn!("Tidal session unusable: {}", e);
                self.expire_session();
                Err(ProviderError::NoSession)
            }
        }
    }

    fn error_message(response: &ApiResponse) -> String {
        serde_json::from_str::<ErrorBody>(&response.body)
            .ok()
            .and_then(|b| b.errors.into_iter().find_map(|e| e.detail))
            .unwrap_or_else(|| format!("HTTP {}", response.status))
    }

    /// Authenticated call. A 401 gets one refresh-and-retry; a second 401 or
    /// a failed refresh logs the user out.
    async fn request(&self, method: Method, url: Url, body: Option<Value>) -> Result<Value, ProviderError> {
        let mut token = self.ensure_token().await?;
        let mut retried = false;

        loop {
            let mut request = ApiRequest::new(method.clone(), url.clone())
                .bearer(&token)
                .header("Content-Type", CONTENT_TYPE)
                .header("Accept", CONTENT_TYPE);
            if let Some(body) = &body {
                request = request.json(body.clone());
            }

            let response = match self.ctx.transport.execute(request).await {
                Ok(response) => response,
                Err(e) => {
                    log::error!("Tidal request {} failed: {}", url.path(), e);
                    self.toast(ToastLevel::Error, &format!("Error: {}", e));
                    return Err(e);
                }
            };

            if response.status == 401 {
                if !retried {
                    retried = true;
                    log::warn!("Tidal rejected token for {}, refreshing", url.path());
                    match self.refresh_access_token().await {
                        Ok(fresh) => {
                            token = fresh;
                            continue;
                        }
                        Err(e) => log::warn!("Tidal refresh after 401 failed: {}", e),
                    }
                }
                self.expire_session();
                return Err(ProviderError::Unauthorized);
            }

            if !response.is_success() {
                let message = Self::error_message(&response);
                log::warn!("Tidal {} returned {}: {}", url.path(), response.status, message);
                self.toast(ToastLevel::Error, &format!("Error: {}", message));
                return Err(ProviderError::Http {
                    status: response.status,
                    message,
                });
            }

            return response.json();
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, params: &[(&str, String)]) -> Result<T, ProviderError> {
        let url = endpoint_url(&self.config.api_base, path, params)?;
        let data = self.request(Method::GET, url, None).await?;
        serde_json::from_value(data).map_err(ProviderError::from)
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value, ProviderError> {
        let url = endpoint_url(&self.config.api_base, path, &[])?;
        self.request(Method::POST, url, Some(body)).await
    }

    /// Resolves a `links.next` value, which may be absolute or API-relative.
    fn next_url(&self, next: &str) -> Option<Url> {
        if next.starts_with("http://") || next.starts_with("https://") {
            Url::parse(next).ok()
        } else {
            endpoint_url(&self.config.api_base, next, &[]).ok()
        }
    }

    /// Reads `data` pages, following `links.next` when the API provides one.
    /// Pages fetched before a failure are kept.
    async fn get_all_data<T: DeserializeOwned>(&self, path: &str) -> Vec<T> {
        let mut all = Vec::new();
        let mut url = match endpoint_url(&self.config.api_base, path, &[]) {
            Ok(url) => url,
            Err(e) => {
                log::error!("Bad Tidal path {}: {}", path, e);
                return all;
            }
        };
        let mut seen = HashSet::new();

        loop {
            seen.insert(url.to_string());
            let page: DataPage<T> = match self
                .request(Method::GET, url.clone(), None)
                .await
                .and_then(|v| serde_json::from_value(v).map_err(ProviderError::from))
            {
                Ok(page) => page,
                Err(e) => {
                    log::warn!("Stopping pagination of {}: {}", path, e);
                    break;
                }
            };

            all.extend(page.data);
            match page.links.next.as_deref().and_then(|n| self.next_url(n)) {
                Some(next) if !seen.contains(next.as_str()) => url = next,
                _ => break,
            }
        }

        all
    }
}

#[async_trait]
impl ProviderClient for TidalClient {
    fn id(&self) -> ProviderId {
        ProviderId::Tidal
    }

    /// The artist-based fallback takes no audio targets.
    fn supported_filters(&self) -> &'static [FilterField] {
        &[]
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
            Err(e) => log::error!("Cannot build Tidal authorize URL: {}", e),
        }
    }

    async fn check_session(&self) -> bool {
        let url = self.ctx.agent.current_url();
        let code = url
            .query_pairs()
            .find(|(k, _)| k == "code")
            .map(|(_, v)| v.into_owned());

        if let Some(code) = code {
            let established = self.exchange_code_for_token(&code).await;
            let mut clean = url.clone();
            clean.set_query(None);
            self.ctx.agent.replace_url(&clean);
            return established;
        }

        let Some(stored) = self.auth.stored() else {
            return false;
        };

        if stored.is_valid() {
            self.auth.adopt(stored);
            return true;
        }

        if stored.refresh_token.is_some() {
            self.auth.adopt(stored);
            return match self.refresh_access_token().await {
                Ok(_) => true,
                Err(e) => {
                    log::warn!("Stored Tidal session could not be refreshed: {}", e);
                    self.logout();
                    false
                }
            };
        }

        false
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
            ("query", track.search_query()),
            ("type", "TRACKS".to_string()),
            ("limit", "1".to_string()),
        ];
        let response: SearchResponse = self.get("/search", &params).await?;
        Ok(response
            .tracks
            .into_iter()
            .next()
            .and_then(|r| r.resource)
            .map(ResolvedTrack::from))
    }

    async fn get_user_playlists(&self) -> Vec<PlaylistRef> {
        let _loading = LoadingGuard::new(self.notifier(), "Loading your Tidal playlists...");
        self.get_all_data::<Playlist>("/playlists")
            .await
            .into_iter()
            .map(PlaylistRef::from)
            .collect()
    }

    async fn get_playlist_tracks(&self, playlist_id: &str) -> Vec<ResolvedTrack> {
        let _loading = LoadingGuard::new(self.notifier(), "Fetching playlist tracks...");
        let path = format!("/playlists/{}/items", urlencoding::encode(playlist_id));
        self.get_all_data::<PlaylistItem>(&path)
            .await
            .into_iter()
            .filter_map(|entry| entry.item?.resource)
            .map(ResolvedTrack::from)
            .collect()
    }

    /// Tidal has no recommendation endpoint: collect each seed artist's top
    /// tracks instead, skipping the seeds themselves and duplicates.
    async fn get_recommendations(
        &self,
        seeds: &SeedSelection,
        _filters: &FilterParameters,
        limit: u32,
    ) -> Recommendations {
        let _loading = LoadingGuard::new(self.notifier(), "Generating recommendations...");
        let limit = limit as usize;

        let mut seen: HashSet<String> = seeds.ids().into_iter().map(String::from).collect();
        let mut tracks = Vec::new();

        for seed in seeds.tracks().iter().take(MAX_SEEDS) {
            if tracks.len() >= limit {
                break;
            }
            let Some(artist_id) = seed.primary_artist_id() else {
                log::debug!("Seed {} has no artist id, skipping", seed.id);
                continue;
            };

            let path = format!("/artists/{}/tracks", urlencoding::encode(artist_id));
            let params = [("limit", ARTIST_TRACKS_LIMIT.to_string())];
            match self.get::<DataPage<Track>>(&path, &params).await {
                Ok(page) => {
                    for track in page.data {
                        if seen.insert(track.id.clone()) {
                            tracks.push(ResolvedTrack::from(track));
                        }
                    }
                }
                Err(e) => log::warn!("Top tracks for artist {} failed: {}", artist_id, e),
            }
        }

        tracks.truncate(limit);
        Recommendations::degraded(tracks)
    }

    async fn create_empty_playlist(&self, name: &str) -> Result<PlaylistRef, ProviderError> {
        let created = self
            .post(
                "/playlists",
                json!({ "name": name, "description": PLAYLIST_DESCRIPTION }),
            )
            .await?;
        let created: Created<Playlist> = serde_json::from_value(created)?;
        Ok(created.data.into())
    }

    async fn add_playlist_tracks(&self, playlist_id: &str, batch: &[ResolvedTrack]) -> Result<(), ProviderError> {
        let ids: Vec<&str> = batch.iter().map(|t| t.id.as_str()).collect();
        let path = format!("/playlists/{}/items", urlencoding::encode(playlist_id));
        self.post(&path, json!({ "trackIds": ids })).await?;
        Ok(())
    }
}
