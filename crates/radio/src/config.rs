use crate::error::{Error, ErrorExt};
use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::info;

const DEFAULT_CONFIG: &str = "radio";
const ENV_PREFIX: &str = "RADIO";

/// Loads a configuration file layered with environment overrides.
///
/// 1. **Base File**: `path` (default `radio`), format picked from the extension;
///    without one, `radio.toml`, `radio.json`, ... are probed.
/// 2. **Environment Overrides**: variables prefixed with `RADIO__`, nested with
///    double underscores (`RADIO__LOGGING__LEVEL` maps to `logging.level`).
///    `RADIO__TUNE_IN` takes a comma-separated list.
///
/// # Errors
/// Returns [`Error::Config`] when the file is missing or the merged values do
/// not match `T`.
///
/// # Example
/// ```rust
/// use radio::{RadioConfig, load_config};
///
/// let config: RadioConfig = load_config(Some("config/local")).unwrap_or_default();
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, Error>
where
    T: DeserializeOwned,
{
    let effective_path =
        path.map_or_else(|| PathBuf::from(DEFAULT_CONFIG), |p| p.as_ref().to_path_buf());

    let builder = Config::builder()
        .add_source(File::from(effective_path.as_path()).required(true))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .convert_case(config::Case::Snake)
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("tune_in"),
        );

    info!("Loading config from {}", effective_path.display());

    let config = builder
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}
