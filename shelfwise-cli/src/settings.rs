//! Settings file (`~/.config/shelfwise/settings.toml`) and value resolution.
//!
//! Every tunable resolves through the same chain: command-line flag, then
//! the settings file, then the built-in default.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use shelfwise_import::{BatchOptions, DEFAULT_CHUNK_SIZE, DEFAULT_FUZZY_THRESHOLD, ReconcileOptions};

use crate::CliError;

/// Canonical path to the settings file.
pub(crate) fn settings_path() -> PathBuf {
    let config = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    config.join("shelfwise").join("settings.toml")
}

/// Database location used when neither a flag nor the settings file gives one.
pub(crate) fn default_db_path() -> PathBuf {
    let data = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    data.join("shelfwise").join("catalog.db")
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    pub catalog: CatalogSettings,
    pub matching: MatchingSettings,
    pub batch: BatchSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct CatalogSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct MatchingSettings {
    pub fuzzy_threshold: f64,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct BatchSettings {
    pub chunk_size: usize,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl Settings {
    /// Load from the canonical path. A missing file yields defaults.
    pub(crate) fn load() -> Result<Self, CliError> {
        Self::load_from(&settings_path())
    }

    pub(crate) fn load_from(path: &Path) -> Result<Self, CliError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };
        let settings: Self = toml::from_str(&contents)
            .map_err(|e| CliError::config(format!("{}: {}", path.display(), e)))?;
        settings.validate()?;
        Ok(settings)
    }

    pub(crate) fn save(&self) -> Result<(), CliError> {
        self.save_to(&settings_path())
    }

    /// Write atomically: serialize to a temp file, then rename over the target.
    pub(crate) fn save_to(&self, path: &Path) -> Result<(), CliError> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let serialized = toml::to_string_pretty(self).map_err(|e| CliError::config(e.to_string()))?;
        let tmp = path.with_extension("toml.tmp");
        std::fs::write(&tmp, &serialized)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }

    fn validate(&self) -> Result<(), CliError> {
        let threshold = self.matching.fuzzy_threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(CliError::config(format!(
                "matching.fuzzy_threshold must be in (0, 1], got {threshold}"
            )));
        }
        if self.batch.chunk_size == 0 {
            return Err(CliError::config("batch.chunk_size must be at least 1"));
        }
        Ok(())
    }

    /// Set one dotted key from its string form.
    pub(crate) fn set(&mut self, key: &str, value: &str) -> Result<(), CliError> {
        let empty_as_none = |v: &str| (!v.trim().is_empty()).then(|| v.trim().to_string());
        match key {
            "catalog.db_path" => self.catalog.db_path = empty_as_none(value).map(PathBuf::from),
            "catalog.organization_id" => self.catalog.organization_id = empty_as_none(value),
            "matching.fuzzy_threshold" => {
                self.matching.fuzzy_threshold = value
                    .trim()
                    .parse()
                    .map_err(|_| CliError::config(format!("not a number: {value}")))?;
            }
            "batch.chunk_size" => {
                self.batch.chunk_size = value
                    .trim()
                    .parse()
                    .map_err(|_| CliError::config(format!("not a whole number: {value}")))?;
            }
            _ => return Err(CliError::config(format!("unknown setting: {key}"))),
        }
        self.validate()
    }

    // ── Resolution ──────────────────────────────────────────────────────────

    pub(crate) fn resolve_db_path(&self, cli_override: Option<PathBuf>) -> PathBuf {
        cli_override
            .or_else(|| self.catalog.db_path.clone())
            .unwrap_or_else(default_db_path)
    }

    pub(crate) fn resolve_org(&self, cli_override: Option<String>) -> Result<String, CliError> {
        cli_override
            .or_else(|| self.catalog.organization_id.clone())
            .filter(|org| !org.trim().is_empty())
            .ok_or_else(|| {
                CliError::config(
                    "no organization given; pass --org or run \
                     'shelfwise config set catalog.organization_id <id>'",
                )
            })
    }

    pub(crate) fn reconcile_options(&self, threshold: Option<f64>) -> ReconcileOptions {
        ReconcileOptions {
            fuzzy_threshold: threshold.unwrap_or(self.matching.fuzzy_threshold),
        }
    }

    pub(crate) fn batch_options(&self, chunk_size: Option<usize>) -> BatchOptions {
        BatchOptions {
            chunk_size: chunk_size.unwrap_or(self.batch.chunk_size),
        }
    }
}
