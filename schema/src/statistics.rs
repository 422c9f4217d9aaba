use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One week of aggregated listening, computed upstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WeeklyStatistics {
    #[serde(alias = "week_start", skip_serializing_if = "Option::is_none")]
    pub week_start: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vibe: Option<String>,
    #[serde(alias = "total_tracks")]
    pub total_tracks: u32,
    #[serde(alias = "total_duration")]
    pub total_duration: u32, // minutes
    #[serde(alias = "unique_artists")]
    pub unique_artists: u32,
    #[serde(alias = "top_artists")]
    pub top_artists: Vec<NamedItem>,
    #[serde(alias = "top_albums")]
    pub top_albums: Vec<NamedItem>,
    #[serde(alias = "top_tracks")]
    pub top_tracks: Vec<NamedItem>,
}

/// Top lists come either as bare names or as objects carrying a name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NamedItem {
    Name(String),
    Object { name: String },
}

impl NamedItem {
    pub fn name(&self) -> &str {
        match self {
            NamedItem::Name(name) | NamedItem::Object { name } => name,
        }
    }
}

impl WeeklyStatistics {
    /// Most recent week: latest `week_start`, falling back to list order.
    pub fn latest(weeks: &[WeeklyStatistics]) -> Option<&WeeklyStatistics> {
        if weeks.iter().all(|w| w.week_start.is_some()) {
            weeks.iter().max_by_key(|w| w.week_start)
        } else {
            weeks.last()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn top_items_accept_names_and_objects() {
        let week: WeeklyStatistics = serde_json::from_value(json!({
            "totalTracks": 286,
            "topArtists": ["Lany", {"name": "Benson Boone", "plays": 12}]
        }))
        .unwrap();

        let names: Vec<&str> = week.top_artists.iter().map(NamedItem::name).collect();
        assert_eq!(names, ["Lany", "Benson Boone"]);
        assert_eq!(week.total_tracks, 286);
        assert_eq!(week.unique_artists, 0);
    }

    #[test]
    fn latest_prefers_week_start() {
        let weeks: Vec<WeeklyStatistics> = serde_json::from_value(json!([
            {"weekStart": "2025-03-10", "totalTracks": 2},
            {"weekStart": "2025-03-03", "totalTracks": 1}
        ]))
        .unwrap();
        assert_eq!(WeeklyStatistics::latest(&weeks).unwrap().total_tracks, 2);
    }

    #[test]
    fn latest_falls_back_to_last_entry() {
        let weeks: Vec<WeeklyStatistics> =
            serde_json::from_value(json!([{"totalTracks": 1}, {"totalTracks": 3}])).unwrap();
        assert_eq!(WeeklyStatistics::latest(&weeks).unwrap().total_tracks, 3);
        assert!(WeeklyStatistics::latest(&[]).is_none());
    }
}
