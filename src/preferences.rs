use anyhow::{anyhow, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::options::{Language, Theme};

pub const THEME_KEY: &str = "gita-theme";
pub const LANGUAGE_KEY: &str = "gita-lang";

/// Narrow key/value interface over wherever preferences live
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Preferences kept in a flat JSON object on disk, rewritten on every change
#[derive(Debug)]
pub struct FilePreferences {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FilePreferences {
    /// Open the store at the default location in the user's config directory
    pub fn open_default() -> Result<Self> {
        Self::open(Self::default_path()?)
    }

    /// Open the store at `path`. A missing or unparseable file is an empty
    /// store; entries whose value is not a string are skipped.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let values = if path.exists() {
            let content = fs::read_to_string(&path)?;
            Self::parse(&content).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "preferences file unreadable, using defaults");
                BTreeMap::new()
            })
        } else {
            BTreeMap::new()
        };

        Ok(Self { path, values })
    }

    fn parse(content: &str) -> serde_json::Result<BTreeMap<String, String>> {
        let raw: BTreeMap<String, serde_json::Value> = serde_json::from_str(content)?;
        Ok(raw
            .into_iter()
            .filter_map(|(key, value)| match value {
                serde_json::Value::String(s) => Some((key, s)),
                _ => None,
            })
            .collect())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(&self.values)?;
        fs::write(&self.path, content)?;
        Ok(())
    }

    fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("gitaguide").join("preferences.json"))
    }
}

impl PreferenceStore for FilePreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        self.save()?;
        debug!(key, value, path = %self.path.display(), "preference saved");
        Ok(())
    }
}

/// Process-local store, used by `--ephemeral` runs and tests
#[derive(Debug, Default, Clone)]
pub struct MemoryPreferences {
    values: BTreeMap<String, String>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Typed view of the persisted preferences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Preferences {
    pub language: Language,
    pub theme: Theme,
}

impl Preferences {
    /// Read both values, falling back to defaults for absent or unknown ones
    pub fn load(store: &dyn PreferenceStore) -> Self {
        let language = store
            .get(LANGUAGE_KEY)
            .and_then(|v| Language::from_str(&v))
            .unwrap_or_default();
        let theme = store
            .get(THEME_KEY)
            .and_then(|v| Theme::from_str(&v))
            .unwrap_or_default();

        Self { language, theme }
    }

    pub fn set_theme(&mut self, store: &mut dyn PreferenceStore, theme: Theme) -> Result<()> {
        self.theme = theme;
        store.set(THEME_KEY, theme.as_str())
    }

    pub fn set_language(
        &mut self,
        store: &mut dyn PreferenceStore,
        language: Language,
    ) -> Result<()> {
        self.language = language;
        store.set(LANGUAGE_KEY, language.as_str())
    }
}
