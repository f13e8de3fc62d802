use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{FilterParameters, ResolvedTrack};
use crate::providers::ProviderId;

/// One completed generation: enough to restore the recommendation view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub platform: ProviderId,
    pub seed_tracks: Vec<ResolvedTrack>,
    pub filters: FilterParameters,
    pub recommendations: Vec<ResolvedTrack>,
    pub playlist_name: String,
}

impl HistoryRecord {
    pub fn new(
        platform: ProviderId,
        seed_tracks: Vec<ResolvedTrack>,
        filters: FilterParameters,
        recommendations: Vec<ResolvedTrack>,
        playlist_name: String,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            platform,
            seed_tracks,
            filters,
            recommendations,
            playlist_name,
        }
    }
}

/// Name offered for a playlist created on `date`.
pub fn default_playlist_name(date: DateTime<Utc>) -> String {
    format!("Recommendations {}", date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_default_playlist_name() {
        let date = Utc.with_ymd_and_hms(2024, 3, 9, 22, 15, 0).unwrap();
        assert_eq!(default_playlist_name(date), "Recommendations 2024-03-09");
    }

    #[test]
    fn test_record_serializes_platform_tag() {
        let record = HistoryRecord::new(
            ProviderId::Tidal,
            Vec::new(),
            FilterParameters::default(),
            Vec::new(),
            "Mix".into(),
        );
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["platform"], "tidal");
        assert_eq!(value["playlist_name"], "Mix");
    }
}
