pub mod agent;
pub mod context;
pub mod http;
pub mod manager;
pub mod session;
pub mod traits;
pub mod types;

pub use agent::{StaticAgent, UserAgent};
pub use context::{AuthSlot, ProviderContext};
pub use http::{ApiRequest, ApiResponse, ReqwestTransport, Transport};
pub use manager::ProviderRegistry;
pub use session::{FileSessionStore, MemorySessionStore, SessionStore};
pub use traits::ProviderClient;
pub use types::{ProviderId, RecommendationQuality, Recommendations};
