use std::collections::HashMap;

use crate::fixture_index::FixtureIndex;
use crate::model::{
    FixtureCell, GridRow, HiddenTeamMode, MAX_GAMEWEEK, MIN_GAMEWEEK, Side, SortMode, Team,
    clamp_gameweek, unknown_short_name,
};
use crate::ratings::RatingStore;
use crate::visibility::VisibilityStore;

/// Inclusive gameweek range. Always satisfies `1 <= start <= end <= 38`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    start: u32,
    end: u32,
}

impl Default for Window {
    fn default() -> Self {
        Self {
            start: MIN_GAMEWEEK,
            end: MAX_GAMEWEEK,
        }
    }
}

impl Window {
    /// Clamps both bounds into range; an inverted pair pulls `start` down to `end`.
    pub fn new(start: i64, end: i64) -> Self {
        let end = clamp_gameweek(end);
        let start = clamp_gameweek(start).min(end);
        Self { start, end }
    }

    /// Moves `start`, clamping it to `end` when it would cross.
    pub fn with_start(self, start: i64) -> Self {
        Self {
            start: clamp_gameweek(start).min(self.end),
            end: self.end,
        }
    }

    /// Moves `end`, clamping it to `start` when it would cross.
    pub fn with_end(self, end: i64) -> Self {
        Self {
            start: self.start,
            end: clamp_gameweek(end).max(self.start),
        }
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        (self.end - self.start + 1) as usize
    }

    pub fn gameweeks(self) -> impl Iterator<Item = u32> {
        self.start..=self.end
    }

    pub fn contains(&self, gameweek: u32) -> bool {
        (self.start..=self.end).contains(&gameweek)
    }
}

/// Everything a recompute reads. Borrowed so a rebuild never copies the stores.
#[derive(Debug, Clone, Copy)]
pub struct GridInputs<'a> {
    pub teams: &'a [Team],
    pub index: &'a FixtureIndex,
    pub ratings: &'a RatingStore,
    pub visibility: &'a VisibilityStore,
    pub window: Window,
    pub sort: SortMode,
    pub hidden_mode: HiddenTeamMode,
}

pub fn build_rows(inputs: GridInputs<'_>) -> Vec<GridRow> {
    let short_names = short_name_map(inputs.teams);

    let mut rows: Vec<GridRow> = inputs
        .teams
        .iter()
        .filter_map(|team| {
            let visible = inputs.visibility.is_visible(team.id);
            if !visible && inputs.hidden_mode == HiddenTeamMode::Remove {
                return None;
            }
            Some(build_row(team, visible, &inputs, &short_names))
        })
        .collect();

    sort_rows(&mut rows, inputs.sort);
    rows
}

fn build_row(
    team: &Team,
    visible: bool,
    inputs: &GridInputs<'_>,
    short_names: &HashMap<u32, &str>,
) -> GridRow {
    let mut sum = 0u32;
    let mut count = 0u32;
    let mut cells_by_gameweek = Vec::with_capacity(inputs.window.len());

    for gameweek in inputs.window.gameweeks() {
        let cells = build_cells(
            inputs.index,
            inputs.ratings,
            short_names,
            team.id,
            gameweek,
        );

        for cell in &cells {
            sum += cell.difficulty as u32;
            count += 1;
        }
        cells_by_gameweek.push(cells);
    }

    let average_difficulty = if count > 0 {
        sum as f64 / count as f64
    } else {
        0.0
    };

    GridRow {
        team: team.clone(),
        average_difficulty,
        cells_by_gameweek,
        visible,
    }
}

/// Cells for one team in one gameweek, in kickoff order.
pub fn build_cells(
    index: &FixtureIndex,
    ratings: &RatingStore,
    short_names: &HashMap<u32, &str>,
    team_id: u32,
    gameweek: u32,
) -> Vec<FixtureCell> {
    index
        .cells_for(team_id, gameweek)
        .iter()
        .map(|entry| {
            let fixture = &entry.fixture;
            let is_home = fixture.home_team_id == team_id;
            let opponent_id = if is_home {
                fixture.away_team_id
            } else {
                fixture.home_team_id
            };
            // The opponent plays the other side of the match.
            let opponent_side = if is_home { Side::Away } else { Side::Home };
            FixtureCell {
                fixture_id: fixture.id,
                opponent_id,
                opponent_short_name: short_names
                    .get(&opponent_id)
                    .map(|s| s.to_string())
                    .unwrap_or_else(unknown_short_name),
                difficulty: ratings.get(opponent_id, opponent_side),
                is_home,
                kickoff: entry.kickoff,
            }
        })
        .collect()
}

pub fn short_name_map(teams: &[Team]) -> HashMap<u32, &str> {
    teams
        .iter()
        .map(|t| (t.id, t.short_name.as_str()))
        .collect()
}

pub fn sort_rows(rows: &mut [GridRow], mode: SortMode) {
    match mode {
        SortMode::ById => rows.sort_by_key(|r| r.team.id),
        SortMode::ByEase => rows.sort_by(|a, b| {
            a.average_difficulty
                .total_cmp(&b.average_difficulty)
                .then_with(|| a.team.id.cmp(&b.team.id))
        }),
        SortMode::ByHardness => rows.sort_by(|a, b| {
            b.average_difficulty
                .total_cmp(&a.average_difficulty)
                .then_with(|| a.team.id.cmp(&b.team.id))
        }),
    }
}
