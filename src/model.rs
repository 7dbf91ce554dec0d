use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MIN_GAMEWEEK: u32 = 1;
pub const MAX_GAMEWEEK: u32 = 38;

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 7;
pub const DEFAULT_RATING: u8 = 3;

const CREST_URL_BASE: &str = "https://resources.premierleague.com/premierleague/badges/50/t";
const UNKNOWN_SHORT_NAME: &str = "UNK";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: u32,
    pub name: String,
    pub short_name: String,
    /// Crest code; differs from `id` and is stable across seasons.
    pub code: u32,
}

impl Team {
    pub fn crest_url(&self) -> String {
        format!("{CREST_URL_BASE}{}.png", self.code)
    }
}

/// A gameweek as reported by the source. Only used to pick a default window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: u32,
    pub finished: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixture {
    pub id: u32,
    /// `None` for postponed or not yet scheduled fixtures.
    pub gameweek: Option<u32>,
    pub home_team_id: u32,
    pub away_team_id: u32,
    pub kickoff_time: Option<String>,
}

impl Fixture {
    pub fn kickoff(&self) -> Option<DateTime<Utc>> {
        parse_kickoff(self.kickoff_time.as_deref()?)
    }
}

/// One complete, already decoded batch handed over by a [`crate::source::SeasonSource`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeasonData {
    pub teams: Vec<Team>,
    pub events: Vec<Event>,
    pub fixtures: Vec<Fixture>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Home,
    Away,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortMode {
    #[default]
    ById,
    ByEase,
    ByHardness,
}

impl SortMode {
    pub fn next(self) -> Self {
        match self {
            SortMode::ById => SortMode::ByEase,
            SortMode::ByEase => SortMode::ByHardness,
            SortMode::ByHardness => SortMode::ById,
        }
    }
}

/// How the grid treats teams whose visibility flag is off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HiddenTeamMode {
    /// Hidden teams are left out of the row sequence.
    #[default]
    Remove,
    /// Hidden teams keep their row, flagged with `visible == false`.
    Dim,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FixtureCell {
    pub fixture_id: u32,
    pub opponent_id: u32,
    pub opponent_short_name: String,
    /// The opponent's rating for the side it plays on.
    pub difficulty: u8,
    pub is_home: bool,
    pub kickoff: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridRow {
    pub team: Team,
    pub average_difficulty: f64,
    /// One entry per gameweek of the active window, in ascending order.
    pub cells_by_gameweek: Vec<Vec<FixtureCell>>,
    pub visible: bool,
}

impl GridRow {
    pub fn fixture_count(&self) -> usize {
        self.cells_by_gameweek.iter().map(Vec::len).sum()
    }
}

pub fn clamp_rating(value: i64) -> u8 {
    value.clamp(MIN_RATING as i64, MAX_RATING as i64) as u8
}

pub fn clamp_gameweek(value: i64) -> u32 {
    value.clamp(MIN_GAMEWEEK as i64, MAX_GAMEWEEK as i64) as u32
}

pub fn parse_kickoff(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

pub fn difficulty_label(value: i64) -> &'static str {
    match clamp_rating(value) {
        1 => "very easy",
        2 => "easy",
        3 => "below average",
        4 => "average",
        5 => "above average",
        6 => "hard",
        _ => "very hard",
    }
}

pub fn sort_label(mode: SortMode) -> &'static str {
    match mode {
        SortMode::ById => "Team ID",
        SortMode::ByEase => "Easiest fixtures",
        SortMode::ByHardness => "Hardest fixtures",
    }
}

pub(crate) fn unknown_short_name() -> String {
    UNKNOWN_SHORT_NAME.to_string()
}
