use std::sync::Arc;

use anyhow::Result;

use crate::model::{GridRow, HiddenTeamMode};
use crate::prefs::{self, PreferenceStore};
use crate::source::SeasonSource;
use crate::state::{GridState, Mutation, apply_mutation};

/// A grid engine wired to its data source and preference store.
///
/// Preferences are loaded on construction and saved after every user mutation. A failed
/// fetch keeps the last good records and rows.
pub struct Session<S, P> {
    state: GridState,
    source: S,
    store: P,
}

impl<S: SeasonSource, P: PreferenceStore> Session<S, P> {
    pub fn new(source: S, store: P) -> Self {
        Self::with_hidden_mode(source, store, HiddenTeamMode::default())
    }

    pub fn with_hidden_mode(source: S, store: P, hidden_mode: HiddenTeamMode) -> Self {
        let mut state = GridState::with_hidden_mode(hidden_mode);
        let loaded = prefs::load_prefs(&store);
        prefs::apply_snapshot(&mut state, loaded);
        Self {
            state,
            source,
            store,
        }
    }

    /// Pulls fresh records. On failure the error is returned and recorded; nothing else changes.
    pub fn refresh(&mut self) -> Result<()> {
        match self.source.fetch() {
            Ok(data) => {
                apply_mutation(&mut self.state, Mutation::ReplaceRecords(data));
                self.persist();
                Ok(())
            }
            Err(err) => {
                self.state.record_fetch_error(format!("{err:#}"));
                Err(err)
            }
        }
    }

    pub fn apply(&mut self, mutation: Mutation) {
        apply_mutation(&mut self.state, mutation);
        self.persist();
    }

    pub fn state(&self) -> &GridState {
        &self.state
    }

    pub fn rows(&self) -> Arc<[GridRow]> {
        self.state.rows()
    }

    pub fn store(&self) -> &P {
        &self.store
    }

    pub fn into_parts(self) -> (GridState, S, P) {
        (self.state, self.source, self.store)
    }

    fn persist(&mut self) {
        let snapshot = prefs::snapshot(&self.state);
        if let Err(err) = prefs::save_prefs(&mut self.store, &snapshot) {
            self.state
                .push_log(format!("[WARN] Saving preferences failed: {err:#}"));
        }
    }
}
