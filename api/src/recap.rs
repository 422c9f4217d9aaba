use sotd_schema::{NamedItem, WeeklyStatistics};
use std::{fmt, str::FromStr};

pub const DEFAULT_VIBE: &str = "spending nights collecting memories";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecapTab {
    #[default]
    Artists,
    Albums,
    Tracks,
}

impl RecapTab {
    pub const ALL: [RecapTab; 3] = [RecapTab::Artists, RecapTab::Albums, RecapTab::Tracks];

    pub fn label(self) -> &'static str {
        match self {
            RecapTab::Artists => "artists",
            RecapTab::Albums => "albums",
            RecapTab::Tracks => "tracks",
        }
    }
}

impl fmt::Display for RecapTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RecapTab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RecapTab::ALL
            .into_iter()
            .find(|tab| tab.label() == s)
            .ok_or_else(|| format!("unknown recap tab '{}'", s))
    }
}

/// The weekly recap card: headline numbers plus one top list at a time.
#[derive(Debug, Clone, PartialEq)]
pub struct RecapView {
    pub vibe: String,
    pub total_tracks: u32,
    pub total_duration: u32,
    pub unique_artists: u32,
    pub top_artists: Vec<String>,
    pub top_albums: Vec<String>,
    pub top_tracks: Vec<String>,
    pub tab: RecapTab,
}

fn names(items: &[NamedItem]) -> Vec<String> {
    items.iter().map(|item| item.name().to_string()).collect()
}

impl RecapView {
    /// Built from the most recent week; `None` when there are no weeks yet.
    pub fn from_weeks(weeks: &[WeeklyStatistics]) -> Option<Self> {
        WeeklyStatistics::latest(weeks).map(Self::from_week)
    }

    pub fn from_week(week: &WeeklyStatistics) -> Self {
        Self {
            vibe: week
                .vibe
                .clone()
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_VIBE.to_string()),
            total_tracks: week.total_tracks,
            total_duration: week.total_duration,
            unique_artists: week.unique_artists,
            top_artists: names(&week.top_artists),
            top_albums: names(&week.top_albums),
            top_tracks: names(&week.top_tracks),
            tab: RecapTab::default(),
        }
    }

    pub fn select(&mut self, tab: RecapTab) {
        self.tab = tab;
    }

    /// Items of the selected tab.
    pub fn items(&self) -> &[String] {
        match self.tab {
            RecapTab::Artists => &self.top_artists,
            RecapTab::Albums => &self.top_albums,
            RecapTab::Tracks => &self.top_tracks,
        }
    }
}
