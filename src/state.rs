use std::collections::VecDeque;
use std::sync::Arc;

use crate::fixture_index::FixtureIndex;
use crate::grid::{self, GridInputs, Window};
use crate::model::{
    Event, Fixture, FixtureCell, GridRow, HiddenTeamMode, SeasonData, Side, SortMode, Team,
    sort_label,
};
use crate::ratings::RatingStore;
use crate::visibility::VisibilityStore;

const MAX_LOGS: usize = 200;

/// The derived fixture-difficulty view plus everything it is computed from.
///
/// All writes go through [`apply_mutation`], which rebuilds the published rows before it
/// returns. Readers take [`GridState::rows`], a shared snapshot that is swapped wholesale.
#[derive(Debug, Clone)]
pub struct GridState {
    teams: Vec<Team>,
    /// Unfinished events only.
    events: Vec<Event>,
    fixtures: Vec<Fixture>,
    index: FixtureIndex,
    ratings: RatingStore,
    visibility: VisibilityStore,
    window: Window,
    sort: SortMode,
    hidden_mode: HiddenTeamMode,
    error_message: Option<String>,
    logs: VecDeque<String>,
    rows: Arc<[GridRow]>,
    recompute_count: u64,
}

impl Default for GridState {
    fn default() -> Self {
        Self::new()
    }
}

impl GridState {
    pub fn new() -> Self {
        Self::with_hidden_mode(HiddenTeamMode::default())
    }

    pub fn with_hidden_mode(hidden_mode: HiddenTeamMode) -> Self {
        Self {
            teams: Vec::new(),
            events: Vec::new(),
            fixtures: Vec::new(),
            index: FixtureIndex::default(),
            ratings: RatingStore::new(),
            visibility: VisibilityStore::new(),
            window: Window::default(),
            sort: SortMode::default(),
            hidden_mode,
            error_message: None,
            logs: VecDeque::with_capacity(MAX_LOGS),
            rows: Arc::from(Vec::new()),
            recompute_count: 0,
        }
    }

    /// Current published rows. Cloning the `Arc` pins a consistent snapshot.
    pub fn rows(&self) -> Arc<[GridRow]> {
        Arc::clone(&self.rows)
    }

    pub fn row_for(&self, team_id: u32) -> Option<&GridRow> {
        self.rows.iter().find(|r| r.team.id == team_id)
    }

    pub fn average_for(&self, team_id: u32) -> Option<f64> {
        self.row_for(team_id).map(|r| r.average_difficulty)
    }

    /// Cells for any team and gameweek, independent of the window and visibility.
    pub fn cells_for(&self, team_id: u32, gameweek: u32) -> Vec<FixtureCell> {
        let short_names = grid::short_name_map(&self.teams);
        grid::build_cells(
            &self.index,
            &self.ratings,
            &short_names,
            team_id,
            gameweek,
        )
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn fixtures(&self) -> &[Fixture] {
        &self.fixtures
    }

    pub fn index(&self) -> &FixtureIndex {
        &self.index
    }

    pub fn ratings(&self) -> &RatingStore {
        &self.ratings
    }

    pub fn visibility(&self) -> &VisibilityStore {
        &self.visibility
    }

    pub fn window(&self) -> Window {
        self.window
    }

    pub fn sort(&self) -> SortMode {
        self.sort
    }

    pub fn hidden_mode(&self) -> HiddenTeamMode {
        self.hidden_mode
    }

    /// Message of the last failed fetch, cleared by the next successful one.
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn logs(&self) -> &VecDeque<String> {
        &self.logs
    }

    pub fn team(&self, team_id: u32) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == team_id)
    }

    pub fn recompute_count(&self) -> u64 {
        self.recompute_count
    }

    pub fn recompute(&mut self) {
        let rows = grid::build_rows(GridInputs {
            teams: &self.teams,
            index: &self.index,
            ratings: &self.ratings,
            visibility: &self.visibility,
            window: self.window,
            sort: self.sort,
            hidden_mode: self.hidden_mode,
        });
        self.rows = Arc::from(rows);
        self.recompute_count += 1;
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    /// Keeps every record and row as they were; only the message changes.
    pub fn record_fetch_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.push_log(format!("[WARN] Fetch failed: {message}"));
        self.error_message = Some(message);
    }

    /// Swaps in persisted user choices and recomputes once.
    pub(crate) fn restore(
        &mut self,
        ratings: RatingStore,
        visibility: VisibilityStore,
        window: Window,
        sort: SortMode,
    ) {
        self.ratings = ratings;
        self.visibility = visibility;
        self.window = window;
        self.sort = sort;
        self.recompute();
    }

    fn set_window(&mut self, next: Window, requested: (i64, i64)) {
        let (start, end) = requested;
        if i64::from(next.start()) != start || i64::from(next.end()) != end {
            self.push_log(format!(
                "[INFO] Window {start}..{end} corrected to {}..{}",
                next.start(),
                next.end()
            ));
        }
        self.window = next;
    }

    fn replace_records(&mut self, data: SeasonData) {
        let SeasonData {
            teams,
            events,
            fixtures,
        } = data;

        let index = FixtureIndex::build(&fixtures);
        let mut created = 0usize;
        for team in &teams {
            let new_rating = self.ratings.ensure(team.id);
            let new_flag = self.visibility.ensure(team.id);
            if new_rating || new_flag {
                created += 1;
            }
        }

        let mut active: Vec<Event> = events.into_iter().filter(|e| !e.finished).collect();
        active.sort_by_key(|e| e.id);
        if let Some(first) = active.first()
            && first.id > self.window.start()
        {
            let next = self.window.with_start(i64::from(first.id));
            self.push_log(format!(
                "[INFO] Start gameweek moved to {} (first unfinished is {})",
                next.start(),
                first.id
            ));
            self.window = next;
        }

        self.push_log(format!(
            "[INFO] Loaded {} teams, {} fixtures ({} unscheduled), {} new team entries",
            teams.len(),
            index.indexed_count(),
            index.skipped_count(),
            created
        ));

        self.teams = teams;
        self.events = active;
        self.fixtures = fixtures;
        self.index = index;
        self.error_message = None;
    }
}

#[derive(Debug, Clone)]
pub enum Mutation {
    SetRating {
        team_id: u32,
        side: Side,
        value: i64,
    },
    ResetRatings,
    ToggleVisibility(u32),
    SetWindow {
        start: i64,
        end: i64,
    },
    SetStartGameweek(i64),
    SetEndGameweek(i64),
    SetSortMode(SortMode),
    CycleSortMode,
    ReplaceRecords(SeasonData),
}

/// Applies one mutation, then recomputes the rows exactly once.
pub fn apply_mutation(state: &mut GridState, mutation: Mutation) {
    match mutation {
        Mutation::SetRating {
            team_id,
            side,
            value,
        } => {
            let stored = state.ratings.set(team_id, side, value);
            if i64::from(stored) != value {
                state.push_log(format!(
                    "[INFO] Rating {value} for team {team_id} clamped to {stored}"
                ));
            }
        }
        Mutation::ResetRatings => {
            state.ratings.clear();
            let ids: Vec<u32> = state.teams.iter().map(|t| t.id).collect();
            for id in ids {
                state.ratings.ensure(id);
            }
            state.push_log("[INFO] Ratings reset to defaults");
        }
        Mutation::ToggleVisibility(team_id) => {
            state.visibility.toggle(team_id);
        }
        Mutation::SetWindow { start, end } => {
            state.set_window(Window::new(start, end), (start, end));
        }
        Mutation::SetStartGameweek(start) => {
            let next = state.window.with_start(start);
            let end = i64::from(state.window.end());
            state.set_window(next, (start, end));
        }
        Mutation::SetEndGameweek(end) => {
            let next = state.window.with_end(end);
            let start = i64::from(state.window.start());
            state.set_window(next, (start, end));
        }
        Mutation::SetSortMode(mode) => {
            state.sort = mode;
        }
        Mutation::CycleSortMode => {
            state.sort = state.sort.next();
            let label = sort_label(state.sort);
            state.push_log(format!("[INFO] Sort: {label}"));
        }
        Mutation::ReplaceRecords(data) => state.replace_records(data),
    }
    state.recompute();
}
