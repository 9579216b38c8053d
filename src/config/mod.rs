pub mod schema;
pub mod validation;

pub use schema::*;
pub use validation::*;

use crate::error::{ProbeError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "acmeprobe.toml";

/// Resolve the configuration file path. `ACMEPROBE_CONFIG` wins over the
/// default file in the working directory.
pub fn config_path() -> PathBuf {
    match std::env::var("ACMEPROBE_CONFIG") {
        Ok(p) if !p.is_empty() => PathBuf::from(p),
        _ => PathBuf::from(CONFIG_FILE),
    }
}

/// Load configuration. A missing file is not an error: the defaults target
/// the hosted deployment of the demo app. Environment overrides
/// (`ACMEPROBE_BASE_URL`, `CHROME_PATH`) are applied after the file.
pub fn load_config() -> Result<HarnessConfig> {
    let path = config_path();
    let mut config = if path.exists() {
        load_from(&path)?
    } else {
        tracing::debug!("Config file not found at {:?}, using defaults", path);
        HarnessConfig::default()
    };
    config.apply_env_overrides();
    config.validate()?;
    Ok(config)
}

/// Load configuration from an explicit file, without env overrides.
pub fn load_from(path: &Path) -> Result<HarnessConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        ProbeError::Config(format!("Failed to read config from {:?}: {}", path, e))
    })?;

    let config: HarnessConfig = toml::from_str(&content)?;

    tracing::info!("Loaded config from {:?}", path);
    Ok(config)
}
