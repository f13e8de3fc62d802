pub mod client;
pub mod config;
pub mod models;

pub use client::TidalClient;
pub use config::TidalConfig;
pub use models::get_cover_url;
