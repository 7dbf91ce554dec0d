use std::cell::RefCell;

use anyhow::{Result, anyhow};

use fdr_grid::fake_feed::FakeSource;
use fdr_grid::fpl_fetch::{parse_bootstrap_json, parse_fixtures_json};
use fdr_grid::model::{Event, Fixture, SeasonData, Side, Team};
use fdr_grid::prefs::{KEY_RATINGS, KEY_START_GW, MemoryStore, PreferenceStore, load_prefs};
use fdr_grid::session::Session;
use fdr_grid::source::SeasonSource;
use fdr_grid::state::Mutation;

/// Hands out queued responses in order.
struct ScriptedSource {
    responses: RefCell<Vec<Result<SeasonData>>>,
}

impl ScriptedSource {
    fn new(mut responses: Vec<Result<SeasonData>>) -> Self {
        responses.reverse();
        Self {
            responses: RefCell::new(responses),
        }
    }
}

impl SeasonSource for ScriptedSource {
    fn fetch(&self) -> Result<SeasonData> {
        self.responses
            .borrow_mut()
            .pop()
            .unwrap_or_else(|| Err(anyhow!("no more responses")))
    }
}

/// Decodes queued (bootstrap, fixtures) bodies the way the live source does.
struct RawBodySource {
    bodies: RefCell<Vec<(String, String)>>,
}

impl RawBodySource {
    fn new(mut bodies: Vec<(&str, &str)>) -> Self {
        bodies.reverse();
        Self {
            bodies: RefCell::new(
                bodies
                    .into_iter()
                    .map(|(b, f)| (b.to_string(), f.to_string()))
                    .collect(),
            ),
        }
    }
}

impl SeasonSource for RawBodySource {
    fn fetch(&self) -> Result<SeasonData> {
        let (bootstrap, fixtures) = self
            .bodies
            .borrow_mut()
            .pop()
            .ok_or_else(|| anyhow!("no more responses"))?;
        let (teams, events) = parse_bootstrap_json(&bootstrap)?;
        let fixtures = parse_fixtures_json(&fixtures)?;
        Ok(SeasonData {
            teams,
            events,
            fixtures,
        })
    }
}

const BOOTSTRAP_BODY: &str = r#"{"teams": [
    {"id": 1, "name": "Arsenal", "short_name": "ARS", "code": 3},
    {"id": 2, "name": "Aston Villa", "short_name": "AVL", "code": 7}
], "events": []}"#;

const FIXTURES_BODY: &str =
    r#"[{"id": 11, "event": 3, "team_h": 1, "team_a": 2, "kickoff_time": "2024-08-31T14:00:00Z"}]"#;

fn season(events: Vec<Event>) -> SeasonData {
    let teams = (1..=3)
        .map(|id| Team {
            id,
            name: format!("Team {id}"),
            short_name: format!("T{id}"),
            code: id,
        })
        .collect();
    SeasonData {
        teams,
        events,
        fixtures: vec![Fixture {
            id: 1,
            gameweek: Some(5),
            home_team_id: 1,
            away_team_id: 2,
            kickoff_time: Some("2024-09-21T14:00:00Z".to_string()),
        }],
    }
}

fn events(first_unfinished: u32) -> Vec<Event> {
    (1..=38)
        .map(|id| Event {
            id,
            finished: id < first_unfinished,
        })
        .collect()
}

#[test]
fn failed_refresh_keeps_last_good_grid() {
    let source = ScriptedSource::new(vec![
        Ok(season(Vec::new())),
        Err(anyhow!("connection reset by peer")),
    ]);
    let mut session = Session::new(source, MemoryStore::new());

    session.refresh().expect("first fetch succeeds");
    let before = session.rows();
    assert_eq!(before.len(), 3);

    let err = session.refresh().expect_err("second fetch fails");
    assert_eq!(err.to_string(), "connection reset by peer");
    assert_eq!(
        session.state().error_message(),
        Some("connection reset by peer")
    );
    assert_eq!(session.state().teams().len(), 3);
    assert_eq!(session.rows().as_ref(), before.as_ref());
    assert!(
        session
            .state()
            .logs()
            .iter()
            .any(|l| l.starts_with("[WARN]"))
    );
}

#[test]
fn successful_refresh_clears_error() {
    let source = ScriptedSource::new(vec![Err(anyhow!("timed out")), Ok(season(Vec::new()))]);
    let mut session = Session::new(source, MemoryStore::new());
    assert!(session.refresh().is_err());
    assert!(session.rows().is_empty());
    session.refresh().expect("second fetch succeeds");
    assert!(session.state().error_message().is_none());
    assert_eq!(session.rows().len(), 3);
}

#[test]
fn first_unfinished_event_moves_start_forward() {
    let source = ScriptedSource::new(vec![Ok(season(events(7)))]);
    let mut session = Session::new(source, MemoryStore::new());
    session.refresh().expect("fetch succeeds");
    assert_eq!(session.state().window().start(), 7);
    assert_eq!(session.state().events().first().map(|e| e.id), Some(7));
    assert_eq!(session.state().events().len(), 32);
}

#[test]
fn later_persisted_start_is_kept() {
    let mut store = MemoryStore::new();
    store.set(KEY_START_GW, "12".to_string());
    let source = ScriptedSource::new(vec![Ok(season(events(7)))]);
    let mut session = Session::new(source, store);
    session.refresh().expect("fetch succeeds");
    assert_eq!(session.state().window().start(), 12);
}

#[test]
fn construction_loads_preferences() {
    let mut store = MemoryStore::new();
    store.set(KEY_RATINGS, r#"{"2": {"home": 6, "away": 5}}"#.to_string());
    let source = ScriptedSource::new(vec![Ok(season(Vec::new()))]);
    let mut session = Session::new(source, store);
    session.refresh().expect("fetch succeeds");

    // Team 1 hosts team 2, so it faces team 2's away rating.
    let cells = session.state().cells_for(1, 5);
    assert_eq!(cells[0].difficulty, 5);
}

#[test]
fn mutations_are_saved_to_the_store() {
    let source = ScriptedSource::new(vec![Ok(season(Vec::new()))]);
    let mut session = Session::new(source, MemoryStore::new());
    session.refresh().expect("fetch succeeds");
    session.apply(Mutation::SetRating {
        team_id: 3,
        side: Side::Away,
        value: 7,
    });
    session.apply(Mutation::ToggleVisibility(1));

    let saved = load_prefs(session.store());
    assert_eq!(saved.ratings.get(&3).map(|r| r.away), Some(7));
    assert_eq!(saved.visibility.get(&1), Some(&false));
    assert_eq!(saved.ratings.len(), 3);
}

#[test]
fn fake_source_fills_a_full_grid() {
    let mut session = Session::new(FakeSource::new(5, 20), MemoryStore::new());
    session.refresh().expect("fake source never fails");
    let rows = session.rows();
    assert_eq!(rows.len(), 20);
    let window_len = session.state().window().len();
    assert!(rows.iter().all(|r| r.cells_by_gameweek.len() == window_len));
    assert!(rows.iter().all(|r| r.average_difficulty == 3.0 || r.fixture_count() == 0));
}

#[test]
fn blank_fixtures_body_keeps_last_good_grid() {
    for blank in ["", "null", "[]"] {
        let source = RawBodySource::new(vec![
            (BOOTSTRAP_BODY, FIXTURES_BODY),
            (BOOTSTRAP_BODY, blank),
        ]);
        let mut session = Session::new(source, MemoryStore::new());
        session.refresh().expect("first fetch succeeds");
        let before = session.rows();
        assert_eq!(session.state().fixtures().len(), 1);

        assert!(session.refresh().is_err(), "{blank:?} should be rejected");
        assert_eq!(session.state().fixtures().len(), 1);
        assert_eq!(session.state().cells_for(1, 3).len(), 1);
        assert_eq!(session.rows().as_ref(), before.as_ref());
        assert!(session.state().error_message().is_some());
    }
}

#[test]
fn smallest_unfinished_event_wins_regardless_of_order() {
    let shuffled = vec![
        Event {
            id: 9,
            finished: false,
        },
        Event {
            id: 3,
            finished: true,
        },
        Event {
            id: 7,
            finished: false,
        },
        Event {
            id: 8,
            finished: false,
        },
    ];
    let source = ScriptedSource::new(vec![Ok(season(shuffled))]);
    let mut session = Session::new(source, MemoryStore::new());
    session.refresh().expect("fetch succeeds");
    assert_eq!(session.state().window().start(), 7);
    let ids: Vec<u32> = session.state().events().iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![7, 8, 9]);
}
