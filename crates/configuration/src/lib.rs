use crate::error::ConfigError;
use config::{Environment, File, FileFormat};
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
#[cfg(feature = "clap")]
pub mod overrides;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use error::ConfigError as Error;
#[cfg(feature = "clap")]
pub use overrides::Overrides;
pub use settings::{AnalysisSettings, Config, DataSettings, ForecastSettings};

/// Default file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "folio.toml";

/// Prefix for environment overrides, e.g. `FOLIO_ANALYSIS__WINDOW=5Y`.
pub const ENV_PREFIX: &str = "FOLIO";

/// Loads the application configuration.
///
/// Reads `path` when given (it must exist), otherwise `folio.toml` if present,
/// then layers `FOLIO_*` environment variables on top and validates the result.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let file = match path {
        Some(path) => {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            File::from(path).required(true)
        }
        None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };

    let builder = config::Config::builder()
        .add_source(file)
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    tracing::debug!(?config, "Configuration loaded.");
    Ok(config)
}

/// Parses a configuration from TOML text, without file or environment lookups.
pub fn parse_config(toml: &str) -> Result<Config, ConfigError> {
    let config = config::Config::builder()
        .add_source(File::from_str(toml, FileFormat::Toml))
        .build()?
        .try_deserialize::<Config>()?;
    config.validate()?;
    Ok(config)
}
