use std::env;
use std::path::PathBuf;

use crate::fpl_fetch::{FPL_BOOTSTRAP_URL, FPL_FIXTURES_URL};
use crate::model::HiddenTeamMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Fpl,
    Fake,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub source: SourceKind,
    pub bootstrap_url: String,
    pub fixtures_url: String,
    pub http_timeout_secs: u64,
    pub hidden_mode: HiddenTeamMode,
    pub fake_seed: u64,
    pub fake_teams: u32,
    pub prefs_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: SourceKind::Fpl,
            bootstrap_url: FPL_BOOTSTRAP_URL.to_string(),
            fixtures_url: FPL_FIXTURES_URL.to_string(),
            http_timeout_secs: 10,
            hidden_mode: HiddenTeamMode::Remove,
            fake_seed: 7,
            fake_teams: 20,
            prefs_path: None,
        }
    }
}

impl Config {
    /// Reads `FDR_*` / `FPL_*` variables. Anything unset or unparseable keeps its default.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).and_then(non_empty);

        let source = match get("FDR_SOURCE").map(|s| s.to_ascii_lowercase()).as_deref() {
            Some("fake") => SourceKind::Fake,
            _ => SourceKind::Fpl,
        };
        let hidden_mode = match get("FDR_HIDDEN_TEAMS")
            .map(|s| s.to_ascii_lowercase())
            .as_deref()
        {
            Some("dim") => HiddenTeamMode::Dim,
            _ => HiddenTeamMode::Remove,
        };

        Self {
            source,
            bootstrap_url: get("FPL_BOOTSTRAP_URL").unwrap_or(defaults.bootstrap_url),
            fixtures_url: get("FPL_FIXTURES_URL").unwrap_or(defaults.fixtures_url),
            http_timeout_secs: get("FDR_HTTP_TIMEOUT_SECS")
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(defaults.http_timeout_secs)
                .clamp(1, 120),
            hidden_mode,
            fake_seed: get("FDR_FAKE_SEED")
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(defaults.fake_seed),
            fake_teams: get("FDR_FAKE_TEAMS")
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(defaults.fake_teams)
                .clamp(2, 40),
            prefs_path: get("FDR_PREFS_PATH").map(PathBuf::from),
        }
    }
}

fn non_empty(raw: String) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
