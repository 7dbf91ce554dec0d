use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::prefs::PreferenceStore;

const PREFS_DIR: &str = "fdr_grid";
const PREFS_FILE: &str = "prefs.json";
const PREFS_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PrefsFile {
    version: u32,
    #[serde(default)]
    values: BTreeMap<String, String>,
}

/// Preference store kept in one JSON file. An unreadable or foreign-version file loads empty.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: Option<PathBuf>,
    values: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Opens the store at `path`, or the default cache location when `None`.
    pub fn open(path: Option<PathBuf>) -> Self {
        let path = path.or_else(default_prefs_path);
        let values = path
            .as_deref()
            .and_then(load_prefs_file)
            .map(|file| file.values)
            .unwrap_or_default();
        Self { path, values }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl PreferenceStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.values.insert(key.to_string(), value);
    }

    fn commit(&mut self) -> Result<()> {
        let Some(path) = self.path.as_ref() else {
            return Ok(());
        };
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).context("create preferences dir")?;
        }
        let file = PrefsFile {
            version: PREFS_VERSION,
            values: self.values.clone(),
        };
        let json = serde_json::to_string_pretty(&file).context("serialize preferences")?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).context("write preferences")?;
        fs::rename(&tmp, path).context("swap preferences file")?;
        Ok(())
    }
}

fn load_prefs_file(path: &Path) -> Option<PrefsFile> {
    let raw = fs::read_to_string(path).ok()?;
    let file = serde_json::from_str::<PrefsFile>(&raw).ok()?;
    if file.version != PREFS_VERSION {
        return None;
    }
    Some(file)
}

fn default_prefs_path() -> Option<PathBuf> {
    if let Ok(base) = std::env::var("XDG_CACHE_HOME")
        && !base.trim().is_empty()
    {
        return Some(PathBuf::from(base).join(PREFS_DIR).join(PREFS_FILE));
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(
        PathBuf::from(home)
            .join(".cache")
            .join(PREFS_DIR)
            .join(PREFS_FILE),
    )
}
