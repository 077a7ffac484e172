//! The saved stopwatch.
//!
//! `durfmt` keeps at most one stopwatch per user, stored as JSON in
//! `state.json` inside the state directory. Every change goes through
//! [`StopwatchStore::update`], which holds an exclusive `fs2` lock on
//! `state.lock` so overlapping runs apply their changes one after another.

use crate::config::{APP_DIR, Config};
use crate::stopwatch::StopwatchState;
use anyhow::{Context, Result};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

const FILE_VERSION: &str = "1.0.0";
const STATE_FILE: &str = "state.json";
const LOCK_FILE: &str = "state.lock";

/// On-disk layout of `state.json`.
#[derive(Debug, Serialize, Deserialize)]
struct SavedFile {
    version: String,
    stopwatch: Option<StopwatchState>,
}

/// Location of the saved stopwatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopwatchStore {
    dir: PathBuf,
}

impl StopwatchStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The configured `state.state_dir_override`, or `~/.durfmt`.
    pub fn for_config(config: &Config) -> Result<Self> {
        let dir = match &config.state.state_dir_override {
            Some(dir) => dir.clone(),
            None => home::home_dir()
                .context("Could not find home directory; set state.state_dir_override")?
                .join(APP_DIR),
        };
        Ok(Self::new(dir))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn state_path(&self) -> PathBuf {
        self.dir.join(STATE_FILE)
    }

    /// Reads the saved stopwatch without taking the lock.
    ///
    /// A missing or blank file means no stopwatch.
    pub fn load(&self) -> Result<Option<StopwatchState>> {
        let path = self.state_path();
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()));
            }
        };
        if content.trim().is_empty() {
            return Ok(None);
        }

        let saved: SavedFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(saved.stopwatch)
    }

    fn write(&self, stopwatch: Option<StopwatchState>) -> Result<()> {
        let saved = SavedFile {
            version: FILE_VERSION.to_string(),
            stopwatch,
        };
        let content = serde_json::to_string_pretty(&saved).context("Failed to serialize stopwatch")?;

        let path = self.state_path();
        let partial = path.with_extension("json.partial");
        fs::write(&partial, content)
            .with_context(|| format!("Failed to write {}", partial.display()))?;
        fs::rename(&partial, &path)
            .with_context(|| format!("Failed to replace {}", path.display()))?;
        Ok(())
    }

    /// Applies `change` to the saved stopwatch under the lock.
    ///
    /// The result is written back only when `change` succeeds and actually
    /// modified the stopwatch.
    pub fn update<F, R>(&self, change: F) -> Result<R>
    where
        F: FnOnce(&mut Option<StopwatchState>) -> Result<R>,
    {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create {}", self.dir.display()))?;
        let lock = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(self.dir.join(LOCK_FILE))
            .context("Failed to open stopwatch lock")?;
        lock.lock_exclusive().context("Failed to lock stopwatch")?;

        let before = self.load()?;
        let mut stopwatch = before.clone();
        let result = change(&mut stopwatch);

        if result.is_ok() && stopwatch != before {
            debug!(dir = %self.dir.display(), running = stopwatch.is_some(), "saving stopwatch");
            self.write(stopwatch)?;
        }

        FileExt::unlock(&lock).context("Failed to unlock stopwatch")?;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stopwatch::TickUnit;
    use tempfile::TempDir;

    #[test]
    fn test_for_config_uses_override() {
        let temp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.state.state_dir_override = Some(temp.path().to_path_buf());

        let store = StopwatchStore::for_config(&config).unwrap();
        assert_eq!(store.dir(), temp.path());
        assert_eq!(store.state_path(), temp.path().join("state.json"));
    }

    #[test]
    fn test_update_creates_directory() {
        let temp = TempDir::new().unwrap();
        let store = StopwatchStore::new(temp.path().join("nested").join("durfmt"));

        store
            .update(|saved| {
                *saved = Some(StopwatchState::started(TickUnit::Millis, 0, 0));
                Ok(())
            })
            .unwrap();

        assert!(store.state_path().exists());
    }

    #[test]
    fn test_unchanged_update_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let store = StopwatchStore::new(temp.path());

        let found = store.update(|saved| Ok(saved.is_some())).unwrap();
        assert!(!found);
        assert!(!store.state_path().exists());
    }

    #[test]
    fn test_saved_file_records_version() {
        let temp = TempDir::new().unwrap();
        let store = StopwatchStore::new(temp.path());
        store
            .update(|saved| {
                *saved = Some(StopwatchState::started(TickUnit::Nanos, 5, 0));
                Ok(())
            })
            .unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(store.state_path()).unwrap()).unwrap();
        assert_eq!(raw["version"], FILE_VERSION);
        assert_eq!(raw["stopwatch"]["unit"], "nanos");
    }
}
