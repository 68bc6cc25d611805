use crate::error::ConfigError;
use core_types::{Collation, FilterGroup, Page, SortKey, SortOrder, SortSpec};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub engine: EngineSettings,
    #[serde(default)]
    pub search: SearchSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
    pub datasets: Vec<DatasetConfig>,
    /// Directory of the file the settings were loaded from. Relative dataset
    /// paths are resolved against it.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

/// Parameters for the query engine itself.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineSettings {
    /// How text fields are ordered when sorting.
    #[serde(default)]
    pub collation: Collation,
    /// Rows per page when a request does not say otherwise.
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,
}

/// Parameters for interactive, as-you-type searching.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchSettings {
    /// Quiet period after the last keystroke before a search runs.
    #[serde(with = "humantime_serde", default = "default_debounce")]
    pub debounce: Duration,
    /// Number of recent search terms to remember.
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    /// Default `EnvFilter` directive; `RUST_LOG` takes precedence.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// When set, logs are also written to a daily-rolling file in this directory.
    pub directory: Option<PathBuf>,
    #[serde(default = "default_log_prefix")]
    pub file_prefix: String,
}

/// Everything the dashboard knows about one dataset.
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetConfig {
    pub name: String,
    /// JSON array of records.
    pub path: PathBuf,
    #[serde(default = "default_id_field")]
    pub id_field: String,
    /// Fields matched by the free-text term. Empty means every text field.
    #[serde(default)]
    pub search_fields: Vec<String>,
    /// Field whose matches rank first under relevance ordering.
    pub primary_field: Option<String>,
    /// Columns shown when rendering results.
    #[serde(default)]
    pub display_fields: Vec<String>,
    /// Field holding the publication date, for time-range filtering.
    pub date_field: Option<String>,
    /// Sort key used when the request names none: a preset name or a field.
    pub default_sort: Option<String>,
    #[serde(default)]
    pub sort_presets: Vec<SortPreset>,
    #[serde(default)]
    pub filter_groups: Vec<FilterGroup>,
}

/// A named sort such as "latest" (date, descending) or "popular".
#[derive(Debug, Clone, Deserialize)]
pub struct SortPreset {
    pub name: String,
    pub field: String,
    #[serde(default)]
    pub order: SortOrder,
}

impl Settings {
    pub fn dataset(&self, name: &str) -> Option<&DatasetConfig> {
        self.datasets.iter().find(|d| d.name == name)
    }

    pub fn dataset_path(&self, dataset: &DatasetConfig) -> PathBuf {
        if dataset.path.is_absolute() {
            dataset.path.clone()
        } else {
            self.base_dir.join(&dataset.path)
        }
    }

    /// Checks the invariants serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.check().map_err(ConfigError::ValidationError)
    }

    fn check(&self) -> Result<(), String> {
        if self.engine.default_page_size == 0 {
            return Err("engine.default_page_size must be at least 1".to_string());
        }
        if self.search.history_capacity == 0 {
            return Err("search.history_capacity must be at least 1".to_string());
        }
        if self.datasets.is_empty() {
            return Err("at least one [[datasets]] entry is required".to_string());
        }
        for (i, dataset) in self.datasets.iter().enumerate() {
            if self.datasets[..i].iter().any(|d| d.name == dataset.name) {
                return Err(format!("dataset '{}' is declared twice", dataset.name));
            }
            dataset.validate()?;
        }
        Ok(())
    }
}

impl DatasetConfig {
    fn validate(&self) -> Result<(), String> {
        for preset in &self.sort_presets {
            if preset.field.trim().is_empty() {
                return Err(format!(
                    "sort preset '{}' of dataset '{}' has an empty field",
                    preset.name, self.name
                ));
            }
        }
        for (i, group) in self.filter_groups.iter().enumerate() {
            if self.filter_groups[..i].iter().any(|g| g.id == group.id) {
                return Err(format!(
                    "filter group '{}' of dataset '{}' is declared twice",
                    group.id, self.name
                ));
            }
            if group.fields.is_empty() {
                return Err(format!(
                    "filter group '{}' of dataset '{}' targets no fields",
                    group.id, self.name
                ));
            }
        }
        Ok(())
    }

    /// Resolves a requested sort key (preset name, `relevance`, or field name)
    /// into a `SortSpec`. An explicit `order` overrides the preset's direction.
    pub fn sort_spec(&self, key: Option<&str>, order: Option<SortOrder>) -> SortSpec {
        let key = key.or(self.default_sort.as_deref()).unwrap_or("relevance");
        match self.sort_presets.iter().find(|p| p.name == key) {
            Some(preset) => SortSpec::field(preset.field.clone(), order.unwrap_or(preset.order)),
            None => {
                let key: SortKey = key.parse().unwrap_or_default();
                SortSpec::new(key, order.unwrap_or_default())
            }
        }
    }
}

fn default_page_size() -> usize {
    Page::DEFAULT_SIZE
}

fn default_debounce() -> Duration {
    Duration::from_millis(300)
}

fn default_history_capacity() -> usize {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_prefix() -> String {
    "finboard.log".to_string()
}

fn default_id_field() -> String {
    "id".to_string()
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            collation: Collation::default(),
            default_page_size: default_page_size(),
        }
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            debounce: default_debounce(),
            history_capacity: default_history_capacity(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: None,
            file_prefix: default_log_prefix(),
        }
    }
}

pub(crate) fn parent_dir(path: &Path) -> PathBuf {
    path.parent()
        .map(Path::to_path_buf)
        .unwrap_or_default()
}
