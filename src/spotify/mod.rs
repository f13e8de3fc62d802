pub mod client;
pub mod config;
pub mod models;

pub use client::SpotifyClient;
pub use config::SpotifyConfig;
