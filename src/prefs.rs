use std::collections::{BTreeMap, HashMap};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::grid::Window;
use crate::model::{DEFAULT_RATING, MAX_GAMEWEEK, MIN_GAMEWEEK, SortMode};
use crate::ratings::{RatingStore, TeamRating};
use crate::state::GridState;
use crate::visibility::VisibilityStore;

pub const KEY_RATINGS: &str = "fdr.team_ratings";
pub const KEY_VISIBILITY: &str = "fdr.team_visibility";
pub const KEY_HIDDEN_TEAMS: &str = "fdr.hidden_teams";
pub const KEY_START_GW: &str = "fdr.start_gw";
pub const KEY_END_GW: &str = "fdr.end_gw";
pub const KEY_SORT: &str = "fdr.sort";

/// String key-value store the preferences are persisted in.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: String);

    /// Makes previous `set` calls durable. Stores without a backing medium do nothing.
    fn commit(&mut self) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.values.insert(key.to_string(), value);
    }
}

/// Everything the user can change, in a serializable shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefSnapshot {
    pub ratings: BTreeMap<u32, TeamRating>,
    pub visibility: BTreeMap<u32, bool>,
    pub start_gameweek: u32,
    pub end_gameweek: u32,
    pub sort: SortMode,
}

impl Default for PrefSnapshot {
    fn default() -> Self {
        Self {
            ratings: BTreeMap::new(),
            visibility: BTreeMap::new(),
            start_gameweek: MIN_GAMEWEEK,
            end_gameweek: MAX_GAMEWEEK,
            sort: SortMode::default(),
        }
    }
}

pub fn snapshot(state: &GridState) -> PrefSnapshot {
    PrefSnapshot {
        ratings: state
            .ratings()
            .entries()
            .iter()
            .map(|(id, r)| (*id, *r))
            .collect(),
        visibility: state
            .visibility()
            .entries()
            .iter()
            .map(|(id, v)| (*id, *v))
            .collect(),
        start_gameweek: state.window().start(),
        end_gameweek: state.window().end(),
        sort: state.sort(),
    }
}

/// Seeds the stores, window and sort mode from a snapshot, then recomputes once.
pub fn apply_snapshot(state: &mut GridState, prefs: PrefSnapshot) {
    let mut ratings = RatingStore::new();
    for (id, rating) in prefs.ratings {
        ratings.insert(id, rating);
    }
    let mut visibility = VisibilityStore::new();
    for (id, visible) in prefs.visibility {
        visibility.set(id, visible);
    }
    let window = Window::new(
        i64::from(prefs.start_gameweek),
        i64::from(prefs.end_gameweek),
    );
    state.restore(ratings, visibility, window, prefs.sort);
}

pub fn save_prefs<S: PreferenceStore + ?Sized>(
    store: &mut S,
    prefs: &PrefSnapshot,
) -> Result<()> {
    let ratings = serde_json::to_string(&prefs.ratings).context("serialize ratings")?;
    let visibility = serde_json::to_string(&prefs.visibility).context("serialize visibility")?;
    let sort = serde_json::to_string(&prefs.sort).context("serialize sort mode")?;
    store.set(KEY_RATINGS, ratings);
    store.set(KEY_VISIBILITY, visibility);
    store.set(KEY_START_GW, prefs.start_gameweek.to_string());
    store.set(KEY_END_GW, prefs.end_gameweek.to_string());
    store.set(KEY_SORT, sort);
    store.commit().context("commit preferences")
}

/// Reads whatever subset is present. Missing or malformed values fall back to defaults,
/// independently per key.
pub fn load_prefs<S: PreferenceStore + ?Sized>(store: &S) -> PrefSnapshot {
    let defaults = PrefSnapshot::default();

    let ratings = store
        .get(KEY_RATINGS)
        .map(|raw| parse_ratings(&raw))
        .unwrap_or_default();

    let mut visibility = store
        .get(KEY_VISIBILITY)
        .map(|raw| parse_visibility(&raw))
        .unwrap_or_default();
    if let Some(raw) = store.get(KEY_HIDDEN_TEAMS) {
        for id in parse_hidden_teams(&raw) {
            visibility.insert(id, false);
        }
    }

    let start_gameweek = store
        .get(KEY_START_GW)
        .and_then(|raw| parse_gameweek(&raw))
        .unwrap_or(defaults.start_gameweek);
    let end_gameweek = store
        .get(KEY_END_GW)
        .and_then(|raw| parse_gameweek(&raw))
        .unwrap_or(defaults.end_gameweek);
    let sort = store
        .get(KEY_SORT)
        .and_then(|raw| parse_sort(&raw))
        .unwrap_or(defaults.sort);

    PrefSnapshot {
        ratings,
        visibility,
        start_gameweek,
        end_gameweek,
        sort,
    }
}

#[derive(Debug, Deserialize)]
struct RawRating {
    #[serde(default)]
    home: Option<i64>,
    #[serde(default)]
    away: Option<i64>,
}

fn parse_ratings(raw: &str) -> BTreeMap<u32, TeamRating> {
    let Ok(map) = serde_json::from_str::<HashMap<String, Value>>(raw.trim()) else {
        return BTreeMap::new();
    };
    map.into_iter()
        .filter_map(|(key, value)| {
            let id = key.trim().parse::<u32>().ok()?;
            let rating = serde_json::from_value::<RawRating>(value).ok()?;
            Some((
                id,
                TeamRating::new(
                    rating.home.unwrap_or(i64::from(DEFAULT_RATING)),
                    rating.away.unwrap_or(i64::from(DEFAULT_RATING)),
                ),
            ))
        })
        .collect()
}

fn parse_visibility(raw: &str) -> BTreeMap<u32, bool> {
    let Ok(map) = serde_json::from_str::<HashMap<String, Value>>(raw.trim()) else {
        return BTreeMap::new();
    };
    map.into_iter()
        .filter_map(|(key, value)| {
            let id = key.trim().parse::<u32>().ok()?;
            Some((id, value.as_bool()?))
        })
        .collect()
}

fn parse_hidden_teams(raw: &str) -> Vec<u32> {
    serde_json::from_str::<Vec<Value>>(raw.trim())
        .map(|ids| {
            ids.iter()
                .filter_map(|v| v.as_u64())
                .filter_map(|v| u32::try_from(v).ok())
                .collect()
        })
        .unwrap_or_default()
}

/// Zero or negative means "never stored".
fn parse_gameweek(raw: &str) -> Option<u32> {
    let value = raw.trim().parse::<i64>().ok()?;
    if value <= 0 {
        return None;
    }
    u32::try_from(value.min(i64::from(MAX_GAMEWEEK))).ok()
}

fn parse_sort(raw: &str) -> Option<SortMode> {
    let trimmed = raw.trim();
    if let Ok(mode) = serde_json::from_str::<SortMode>(trimmed) {
        return Some(mode);
    }
    // Older stores kept a "sort by ease" flag.
    match trimmed {
        "true" => Some(SortMode::ByEase),
        "false" => Some(SortMode::ById),
        _ => None,
    }
}
