use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::spotify::Track;

/// One song-of-the-day pick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SotdEntry {
    #[serde(default, alias = "user_id")]
    pub user_id: String,
    #[serde(default, alias = "track_id")]
    pub track_id: String,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub mood: String,
    #[serde(default, alias = "created_at", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "updated_at", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track: Option<Track>,
}

/// A user's history, keyed by date (`YYYY-MM-DD`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SotdEntries {
    #[serde(default)]
    pub entries: BTreeMap<String, Vec<SotdEntry>>,
}

impl SotdEntries {
    pub fn is_empty(&self) -> bool {
        self.entries.values().all(Vec::is_empty)
    }

    /// Dates newest first, each with its picks.
    pub fn newest_first(&self) -> impl Iterator<Item = (&str, &[SotdEntry])> {
        self.entries
            .iter()
            .rev()
            .map(|(date, picks)| (date.as_str(), picks.as_slice()))
    }
}

/// Body the select page submits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSotd {
    pub track_id: String,
    pub note: String,
    pub mood: String,
}
