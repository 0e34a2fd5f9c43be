//! Filtering and ordering for the league table.

use std::{cmp::Ordering, sync::Arc};

use crate::models::{League, LeagueStatus};

/// Column the table is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LeagueSort {
    /// By display id.
    #[default]
    Default,
    /// Alphabetical by name.
    Name,
    /// Most competitions first.
    Competitions,
    /// Alphabetical by status label.
    Status,
}

impl LeagueSort {
    const ALL: [LeagueSort; 4] = [
        LeagueSort::Default,
        LeagueSort::Name,
        LeagueSort::Competitions,
        LeagueSort::Status,
    ];

    /// Label shown in the filter bar.
    pub fn label(self) -> &'static str {
        match self {
            LeagueSort::Default => "Default",
            LeagueSort::Name => "Name",
            LeagueSort::Competitions => "Competitions",
            LeagueSort::Status => "Status",
        }
    }

    /// Next sort key, wrapping around.
    pub fn next(self) -> Self {
        let index = Self::ALL.iter().position(|s| *s == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }

    fn compare(self, a: &League, b: &League) -> Ordering {
        match self {
            LeagueSort::Default => a.display_id().cmp(b.display_id()),
            LeagueSort::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            LeagueSort::Competitions => b.competitions_count.cmp(&a.competitions_count),
            LeagueSort::Status => a.status.label().cmp(b.status.label()),
        }
    }
}

/// Table filters. Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeagueQuery {
    /// Case-insensitive match on name or display id.
    pub search: String,
    /// Exact country, if set.
    pub country: Option<String>,
    /// Exact season, if set.
    pub season: Option<String>,
    /// Ordering.
    pub sort: LeagueSort,
}

impl LeagueQuery {
    /// Whether `league` passes every filter.
    pub fn matches(&self, league: &League) -> bool {
        let needle = self.search.trim().to_lowercase();
        if !needle.is_empty()
            && !league.name.to_lowercase().contains(&needle)
            && !league.display_id().to_lowercase().contains(&needle)
        {
            return false;
        }
        if let Some(country) = &self.country {
            if &league.country != country {
                return false;
            }
        }
        if let Some(season) = &self.season {
            if &league.season != season {
                return false;
            }
        }
        true
    }

    /// Filtered and sorted rows. Shares the cached entries.
    pub fn apply(&self, leagues: &[Arc<League>]) -> Vec<Arc<League>> {
        let mut rows: Vec<_> = leagues
            .iter()
            .filter(|league| self.matches(league))
            .cloned()
            .collect();
        rows.sort_by(|a, b| self.sort.compare(a, b));
        rows
    }

    /// Drop every filter but keep the sort.
    pub fn reset_filters(&mut self) {
        self.search.clear();
        self.country = None;
        self.season = None;
    }
}

/// Countries present in `leagues`, in first-seen order.
pub fn distinct_countries(leagues: &[Arc<League>]) -> Vec<String> {
    distinct(leagues.iter().map(|league| league.country.as_str()))
}

/// Seasons present in `leagues`, in first-seen order.
pub fn distinct_seasons(leagues: &[Arc<League>]) -> Vec<String> {
    distinct(leagues.iter().map(|league| league.season.as_str()))
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for value in values {
        if !value.is_empty() && !seen.iter().any(|existing| existing == value) {
            seen.push(value.to_string());
        }
    }
    seen
}

/// Step an optional filter through `options`: none, each option, then none.
pub fn cycle_option(current: Option<&str>, options: &[String]) -> Option<String> {
    match current {
        None => options.first().cloned(),
        Some(value) => options
            .iter()
            .position(|option| option == value)
            .and_then(|index| options.get(index + 1))
            .cloned(),
    }
}

/// Placeholder rows shown while the cache is empty.
pub fn sample_leagues() -> Vec<Arc<League>> {
    [("1", "01", "2024", 20), ("2", "02", "2023", 18)]
        .into_iter()
        .map(|(server_id, id, season, competitions_count)| {
            let name = format!("Alberta Australian Football {season}");
            Arc::new(League {
                server_id: server_id.to_string(),
                id: id.to_string(),
                description: Some(format!("Sample description for {name}.")),
                name,
                country: "England".to_string(),
                season: season.to_string(),
                competitions_count,
                status: LeagueStatus::Active,
                created_by: "system".to_string(),
                created_at: None,
                updated_at: None,
            })
        })
        .collect()
}
