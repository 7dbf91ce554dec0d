use anyhow::Result;

use fdr_grid::config::{Config, SourceKind};
use fdr_grid::fake_feed::FakeSource;
use fdr_grid::fpl_fetch::FplSource;
use fdr_grid::model::{FixtureCell, GridRow, sort_label};
use fdr_grid::persist::JsonFileStore;
use fdr_grid::session::Session;
use fdr_grid::source::SeasonSource;

const TEAM_COL: usize = 6;
const AVG_COL: usize = 6;
const CELL_COL: usize = 12;
const LOG_TAIL: usize = 8;

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let config = Config::from_env();
    let source: Box<dyn SeasonSource> = match config.source {
        SourceKind::Fpl => Box::new(FplSource::from_config(&config)),
        SourceKind::Fake => Box::new(FakeSource::from_config(&config)),
    };
    let store = JsonFileStore::open(config.prefs_path.clone());
    let mut session = Session::with_hidden_mode(source, store, config.hidden_mode);

    if let Err(err) = session.refresh() {
        eprintln!("Failed to load data: {err:#}");
    }

    let state = session.state();
    println!(
        "Gameweeks {}-{} | sort: {}",
        state.window().start(),
        state.window().end(),
        sort_label(state.sort())
    );
    print_header(state.window().gameweeks());
    for row in session.rows().iter() {
        print_row(row);
    }

    let skip = state.logs().len().saturating_sub(LOG_TAIL);
    for line in state.logs().iter().skip(skip) {
        eprintln!("{line}");
    }
    Ok(())
}

fn print_header(gameweeks: impl Iterator<Item = u32>) {
    let mut line = format!("{:<TEAM_COL$}{:>AVG_COL$} ", "TEAM", "AVG");
    for gw in gameweeks {
        line.push_str(&format!("{:<CELL_COL$}", format!("GW{gw}")));
    }
    println!("{}", line.trim_end());
}

fn print_row(row: &GridRow) {
    let marker = if row.visible { "" } else { "~" };
    let team = format!("{marker}{}", row.team.short_name);
    let mut line = format!("{team:<TEAM_COL$}{:>AVG_COL$.2} ", row.average_difficulty);
    for cells in &row.cells_by_gameweek {
        let text = if cells.is_empty() {
            "-".to_string()
        } else {
            cells.iter().map(cell_text).collect::<Vec<_>>().join("/")
        };
        line.push_str(&format!("{text:<CELL_COL$}"));
    }
    println!("{}", line.trim_end());
}

fn cell_text(cell: &FixtureCell) -> String {
    let venue = if cell.is_home { 'H' } else { 'A' };
    format!("{}{}{}", cell.opponent_short_name, venue, cell.difficulty)
}
