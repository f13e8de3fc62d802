use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::errors::AppError;
use crate::providers::ProviderId;

/// Where the candidate tracks come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportMethod {
    Playlist,
    File,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "method", rename_all = "snake_case")]
pub enum SessionState {
    Unauthenticated,
    Authenticated,
    ImportMethodChosen(ImportMethod),
    SeedsPending,
    SeedsConfirmed,
    FiltersChosen,
    RecommendationsReady,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        !matches!(self, SessionState::Unauthenticated)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Unauthenticated => write!(f, "unauthenticated"),
            SessionState::Authenticated => write!(f, "authenticated"),
            SessionState::ImportMethodChosen(ImportMethod::Playlist) => write!(f, "importing a playlist"),
            SessionState::ImportMethodChosen(ImportMethod::File) => write!(f, "importing a file"),
            SessionState::SeedsPending => write!(f, "selecting seeds"),
            SessionState::SeedsConfirmed => write!(f, "seeds confirmed"),
            SessionState::FiltersChosen => write!(f, "filters chosen"),
            SessionState::RecommendationsReady => write!(f, "recommendations ready"),
        }
    }
}

/// A step requested out of order, or against data the session does not have.
/// Remote failures never show up here; they come back as sentinels.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("Cannot {operation} while {state}")]
    InvalidState {
        operation: &'static str,
        state: SessionState,
    },

    #[error("Session expired, log in again")]
    SessionExpired,

    #[error("Select at least one seed track")]
    NoSeeds,

    #[error("Unknown track: {0}")]
    UnknownTrack(String),

    #[error("Provider not registered: {0}")]
    UnknownProvider(ProviderId),

    #[error("History record not found: {0}")]
    RecordNotFound(String),

    #[error(transparent)]
    Storage(#[from] AppError),
}
