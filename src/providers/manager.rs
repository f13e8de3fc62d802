use std::collections::HashMap;
use std::sync::Arc;

use super::traits::ProviderClient;
use super::types::ProviderId;

/// Provider clients available to the recommender, keyed by id.
#[derive(Default, Clone)]
pub struct ProviderRegistry {
    providers: HashMap<ProviderId, Arc<dyn ProviderClient>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, provider: Arc<dyn ProviderClient>) {
        let id = provider.id();
        log::info!("Registering provider: {} ({})", provider.name(), id);
        self.providers.insert(id, provider);
    }

    pub fn get(&self, id: ProviderId) -> Option<Arc<dyn ProviderClient>> {
        self.providers.get(&id).cloned()
    }

    pub fn list(&self) -> Vec<ProviderId> {
        let mut ids: Vec<_> = self.providers.keys().copied().collect();
        ids.sort_by_key(|id| id.to_string());
        ids
    }
}
