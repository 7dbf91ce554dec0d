use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use fdr_grid::model::{SeasonData, Side, SortMode, Team};
use fdr_grid::persist::JsonFileStore;
use fdr_grid::prefs::{
    KEY_END_GW, KEY_HIDDEN_TEAMS, KEY_RATINGS, KEY_SORT, KEY_START_GW, KEY_VISIBILITY,
    MemoryStore, PrefSnapshot, PreferenceStore, apply_snapshot, load_prefs, save_prefs, snapshot,
};
use fdr_grid::ratings::TeamRating;
use fdr_grid::state::{GridState, Mutation, apply_mutation};

fn team(id: u32) -> Team {
    Team {
        id,
        name: format!("Team {id}"),
        short_name: format!("T{id:02}"),
        code: id,
    }
}

fn customised_state() -> GridState {
    let mut state = GridState::new();
    apply_mutation(
        &mut state,
        Mutation::ReplaceRecords(SeasonData {
            teams: (1..=4).map(team).collect(),
            events: Vec::new(),
            fixtures: Vec::new(),
        }),
    );
    apply_mutation(
        &mut state,
        Mutation::SetRating {
            team_id: 2,
            side: Side::Home,
            value: 6,
        },
    );
    apply_mutation(
        &mut state,
        Mutation::SetRating {
            team_id: 3,
            side: Side::Away,
            value: 1,
        },
    );
    apply_mutation(&mut state, Mutation::ToggleVisibility(4));
    apply_mutation(&mut state, Mutation::SetWindow { start: 9, end: 14 });
    apply_mutation(&mut state, Mutation::SetSortMode(SortMode::ByHardness));
    state
}

fn temp_prefs_path(tag: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    std::env::temp_dir()
        .join(format!("fdr_grid_test_{tag}_{}_{nanos}", std::process::id()))
        .join("prefs.json")
}

#[test]
fn snapshot_round_trips_through_memory_store() {
    let state = customised_state();
    let before = snapshot(&state);

    let mut store = MemoryStore::new();
    save_prefs(&mut store, &before).expect("memory store never fails");

    let mut fresh = GridState::new();
    apply_snapshot(&mut fresh, load_prefs(&store));
    assert_eq!(snapshot(&fresh), before);
    assert_eq!(fresh.ratings().get(2, Side::Home), 6);
    assert!(!fresh.visibility().is_visible(4));
    assert_eq!((fresh.window().start(), fresh.window().end()), (9, 14));
    assert_eq!(fresh.sort(), SortMode::ByHardness);
}

#[test]
fn snapshot_round_trips_through_json_file() {
    let path = temp_prefs_path("roundtrip");
    let before = snapshot(&customised_state());

    let mut store = JsonFileStore::open(Some(path.clone()));
    save_prefs(&mut store, &before).expect("temp dir should be writable");

    let reopened = JsonFileStore::open(Some(path.clone()));
    assert_eq!(load_prefs(&reopened), before);

    if let Some(dir) = path.parent() {
        let _ = std::fs::remove_dir_all(dir);
    }
}

#[test]
fn empty_store_gives_defaults() {
    let store = MemoryStore::new();
    assert_eq!(load_prefs(&store), PrefSnapshot::default());
}

#[test]
fn malformed_values_fall_back_per_key() {
    let mut store = MemoryStore::new();
    store.set(KEY_RATINGS, "not json".to_string());
    store.set(KEY_VISIBILITY, r#"{"5": false, "6": "maybe"}"#.to_string());
    store.set(KEY_START_GW, "zero".to_string());
    store.set(KEY_END_GW, "20".to_string());
    store.set(KEY_SORT, "\"Sideways\"".to_string());

    let prefs = load_prefs(&store);
    assert!(prefs.ratings.is_empty());
    assert_eq!(prefs.visibility.len(), 1);
    assert_eq!(prefs.visibility.get(&5), Some(&false));
    assert_eq!(prefs.start_gameweek, 1);
    assert_eq!(prefs.end_gameweek, 20);
    assert_eq!(prefs.sort, SortMode::ById);
}

#[test]
fn legacy_shapes_are_understood() {
    let mut store = MemoryStore::new();
    store.set(
        KEY_RATINGS,
        r#"{"1": {"home": 5, "away": 2}, "2": {"home": 0}}"#.to_string(),
    );
    store.set(KEY_HIDDEN_TEAMS, "[7, 8]".to_string());
    store.set(KEY_SORT, "true".to_string());

    let prefs = load_prefs(&store);
    assert_eq!(prefs.ratings.get(&1), Some(&TeamRating { home: 5, away: 2 }));
    assert_eq!(prefs.ratings.get(&2), Some(&TeamRating { home: 1, away: 3 }));
    assert_eq!(prefs.visibility.get(&7), Some(&false));
    assert_eq!(prefs.visibility.get(&8), Some(&false));
    assert_eq!(prefs.sort, SortMode::ByEase);
}

#[test]
fn stored_inverted_window_is_corrected_on_apply() {
    let mut store = MemoryStore::new();
    store.set(KEY_START_GW, "30".to_string());
    store.set(KEY_END_GW, "10".to_string());

    let mut state = GridState::new();
    apply_snapshot(&mut state, load_prefs(&store));
    assert_eq!((state.window().start(), state.window().end()), (10, 10));
}

#[test]
fn foreign_file_loads_empty() {
    let path = temp_prefs_path("foreign");
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).expect("temp dir should be writable");
    }
    std::fs::write(&path, "{\"version\": 99, \"values\": {\"fdr.sort\": \"\\\"ByEase\\\"\"}}")
        .expect("temp file should be writable");

    let store = JsonFileStore::open(Some(path.clone()));
    assert_eq!(load_prefs(&store), PrefSnapshot::default());

    if let Some(dir) = path.parent() {
        let _ = std::fs::remove_dir_all(dir);
    }
}
