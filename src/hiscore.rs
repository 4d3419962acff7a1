//! High score record.
//!
//! Scores live in a sectioned TOML file through [`ConfigStore`], a small
//! key/value store that keeps any sections it does not know about intact.
//! The table itself sits under `[hiscore]` as `score1..score8` and
//! `name1..name8`.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_HISCORE_NAME, DEFAULT_SCORES, HISCORE_SECTION, MAX_NAME_LEN, NUM_SCORES};
use crate::error::GameError;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigStore {
    sections: BTreeMap<String, toml::Table>,
}

impl ConfigStore {
    /// Reads `path`. A missing file is an empty store.
    pub fn load(path: &Path) -> Result<Self, GameError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(ConfigStore::default()),
            Err(source) => return Err(GameError::HiscoreIo { path: path.to_path_buf(), source }),
        };
        toml::from_str(&contents).map_err(|source| GameError::HiscoreParse { path: path.to_path_buf(), source })
    }

    pub fn save(&self, path: &Path) -> Result<(), GameError> {
        let serialized = toml::to_string_pretty(self)?;
        fs::write(path, serialized).map_err(|source| GameError::HiscoreIo { path: path.to_path_buf(), source })
    }

    pub fn get_int(&self, section: &str, key: &str) -> Option<i64> {
        self.sections.get(section)?.get(key)?.as_integer()
    }

    pub fn get_string(&self, section: &str, key: &str) -> Option<&str> {
        self.sections.get(section)?.get(key)?.as_str()
    }

    pub fn set_int(&mut self, section: &str, key: &str, value: i64) {
        self.section_mut(section).insert(key.to_string(), toml::Value::Integer(value));
    }

    pub fn set_string(&mut self, section: &str, key: &str, value: &str) {
        self.section_mut(section).insert(key.to_string(), toml::Value::String(value.to_string()));
    }

    fn section_mut(&mut self, section: &str) -> &mut toml::Table {
        self.sections.entry(section.to_string()).or_default()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HiscoreEntry {
    pub score: u32,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HiscoreTable {
    entries: Vec<HiscoreEntry>,
}

pub fn truncate_name(name: &str) -> String {
    name.chars().take(MAX_NAME_LEN).collect()
}

impl Default for HiscoreTable {
    fn default() -> Self {
        HiscoreTable {
            entries: DEFAULT_SCORES
                .iter()
                .map(|&score| HiscoreEntry { score, name: DEFAULT_HISCORE_NAME.to_string() })
                .collect(),
        }
    }
}

impl HiscoreTable {
    /// Builds the table from `store`; absent or unusable keys keep their
    /// default value.
    pub fn from_store(store: &ConfigStore) -> Self {
        let mut table = HiscoreTable::default();
        for (i, entry) in table.entries.iter_mut().enumerate() {
            let n = i + 1;
            if let Some(score) = store
                .get_int(HISCORE_SECTION, &format!("score{}", n))
                .and_then(|s| u32::try_from(s).ok())
            {
                entry.score = score;
            }
            if let Some(name) = store.get_string(HISCORE_SECTION, &format!("name{}", n)) {
                entry.name = truncate_name(name);
            }
        }
        table
    }

    pub fn write_to(&self, store: &mut ConfigStore) {
        for (i, entry) in self.entries.iter().enumerate() {
            let n = i + 1;
            store.set_int(HISCORE_SECTION, &format!("score{}", n), entry.score as i64);
            store.set_string(HISCORE_SECTION, &format!("name{}", n), &entry.name);
        }
    }

    pub fn load_or_default(path: &Path) -> Self {
        match ConfigStore::load(path) {
            Ok(store) => {
                info!("Loaded high scores from {}", path.display());
                HiscoreTable::from_store(&store)
            }
            Err(e) => {
                warn!("{}; using default high scores", e);
                HiscoreTable::default()
            }
        }
    }

    /// Writes the table into `path`, keeping other sections of an existing
    /// file. An unreadable file is replaced.
    pub fn save(&self, path: &Path) -> Result<(), GameError> {
        let mut store = ConfigStore::load(path).unwrap_or_else(|e| {
            warn!("{}; rewriting it", e);
            ConfigStore::default()
        });
        self.write_to(&mut store);
        store.save(path)?;
        info!("Saved high scores to {}", path.display());
        Ok(())
    }

    /// Places `score` in the table if it beats an entry. Returns its rank
    /// (0 is best) when it made it in.
    pub fn submit(&mut self, score: u32, name: &str) -> Option<usize> {
        let rank = self.entries.iter().position(|entry| score > entry.score)?;
        self.entries.insert(rank, HiscoreEntry { score, name: truncate_name(name) });
        self.entries.truncate(NUM_SCORES);
        Some(rank)
    }

    pub fn lines(&self) -> Vec<String> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, entry)| format!("{:>2}. {:<width$} {:>7}", i + 1, entry.name, entry.score, width = MAX_NAME_LEN))
            .collect()
    }
}
