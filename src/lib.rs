pub mod config;
pub mod errors;
pub mod history;
pub mod models;
pub mod notifier;
pub mod orchestrator;
pub mod parser;
pub mod providers;
pub mod spotify;
pub mod tidal;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use config::AppConfig;
use providers::{ProviderContext, ProviderRegistry};
use spotify::SpotifyClient;
use tidal::TidalClient;

/// Registers both provider clients over one set of host collaborators.
pub fn provider_registry(config: &AppConfig, ctx: &ProviderContext) -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();
    registry.register(Arc::new(SpotifyClient::new(config.spotify.clone(), ctx.clone())));
    registry.register(Arc::new(TidalClient::new(config.tidal.clone(), ctx.clone())));
    registry
}
