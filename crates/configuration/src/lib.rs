//! # Finboard Configuration
//!
//! Loads the strongly typed `Settings` from `config.toml` (plus `FINBOARD__*`
//! environment overrides) and owns logging initialisation.

use crate::error::ConfigError;
use crate::settings::parent_dir;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_tracing;
pub use settings::{
    DatasetConfig, EngineSettings, LoggingSettings, SearchSettings, Settings, SortPreset,
};

/// Loads the application configuration from the given TOML file.
///
/// Environment variables prefixed with `FINBOARD__` override file values, using
/// `__` as the nesting separator (e.g. `FINBOARD__ENGINE__DEFAULT_PAGE_SIZE=20`).
pub fn load_config(path: &Path) -> Result<Settings, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(
            config::Environment::with_prefix("FINBOARD")
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Settings` struct
    let mut settings = builder.try_deserialize::<Settings>()?;
    settings.base_dir = parent_dir(path);
    settings.validate()?;

    tracing::debug!(
        path = %path.display(),
        datasets = settings.datasets.len(),
        "Configuration loaded."
    );
    Ok(settings)
}
