use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use crate::{
    generation::{GenerationDelays, DEFAULT_QUIZ_QUESTIONS},
    page::{ObserveScope, WatchPattern},
    storage::{open_storage, DurableStorage, MemoryStorage, StorageBackend},
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct LearnerSettings {
    pub watch_pattern: WatchPattern,
    pub observe_scope: ObserveScope,
    pub storage_backend: StorageBackend,
    /// Where file-backed storage lives. Without one, state is kept in memory.
    pub data_dir: Option<PathBuf>,
    pub generation: GenerationDelays,
    pub default_quiz_questions: usize,
}

impl Default for LearnerSettings {
    fn default() -> Self {
        Self {
            watch_pattern: WatchPattern::default(),
            observe_scope: ObserveScope::default(),
            storage_backend: StorageBackend::default(),
            data_dir: None,
            generation: GenerationDelays::default(),
            default_quiz_questions: DEFAULT_QUIZ_QUESTIONS,
        }
    }
}

impl LearnerSettings {
    /// Apply `LEARNER_*` environment overrides.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("LEARNER_WATCH_HOST").filter(|h| !h.trim().is_empty()) {
            self.watch_pattern.host = host.trim().to_string();
        }

        if let Some(raw) = lookup("LEARNER_OBSERVE_SCOPE") {
            match ObserveScope::parse(&raw) {
                Some(scope) => self.observe_scope = scope,
                None => log::warn!("ignoring unknown LEARNER_OBSERVE_SCOPE '{raw}'"),
            }
        }

        if let Some(dir) = lookup("LEARNER_DATA_DIR").filter(|d| !d.trim().is_empty()) {
            self.data_dir = Some(PathBuf::from(dir.trim()));
        }

        let debug_mode = lookup("LEARNER_DEBUG")
            .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        if debug_mode {
            self.generation = GenerationDelays::instant();
        }

        self
    }

    /// Open the configured backend under `data_dir`.
    pub fn open_storage(&self) -> Arc<dyn DurableStorage> {
        match self.data_dir.as_deref() {
            Some(dir) => open_storage(self.storage_backend, dir),
            None => {
                log::debug!("no data directory configured; keeping state in memory");
                Arc::new(MemoryStorage::new())
            }
        }
    }

    pub fn data_dir(&self) -> Option<&Path> {
        self.data_dir.as_deref()
    }
}

/// Settings persisted as pretty JSON next to the extension's other data.
pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<LearnerSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_default()
        } else {
            LearnerSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn settings(&self) -> LearnerSettings {
        self.read().clone()
    }

    pub fn update(&self, settings: LearnerSettings) -> Result<()> {
        let mut guard = self.write();
        *guard = settings;
        self.persist(&guard)
    }

    pub fn reload(&self) -> Result<()> {
        let contents = fs::read_to_string(&self.path)?;
        let data: LearnerSettings = serde_json::from_str(&contents)?;
        *self.write() = data;
        Ok(())
    }

    fn persist(&self, data: &LearnerSettings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }

    fn read(&self) -> RwLockReadGuard<'_, LearnerSettings> {
        match self.data.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, LearnerSettings> {
        match self.data.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
