//! Client settings shared by every document operation.
//!
//! Settings are layered: an optional TOML file first, then `SYNAPSE_*`
//! environment variables on top (e.g. `SYNAPSE_LOG_PAYLOADS=true`).

use std::path::Path;

use serde::Deserialize;

use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
  /// Log full request payloads at `debug` level. Payloads carry personal
  /// data, so only field names are logged unless this is set.
  pub log_payloads:   bool,
  /// Earliest birth year accepted when validating a new base document.
  pub min_birth_year: i32,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      log_payloads:   false,
      min_birth_year: 1900,
    }
  }
}

impl Settings {
  /// Load settings from `path` (if given and present) and the environment.
  pub fn load(path: Option<&Path>) -> Result<Self> {
    let mut builder = config::Config::builder();
    if let Some(path) = path {
      builder = builder.add_source(config::File::from(path).required(false));
    }
    let settings = builder
      .add_source(config::Environment::with_prefix("SYNAPSE"))
      .build()?
      .try_deserialize()?;
    Ok(settings)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_file_yields_defaults() {
    let path = std::env::temp_dir().join("synapse-settings-does-not-exist.toml");
    let settings = Settings::load(Some(&path)).unwrap();
    assert_eq!(settings, Settings::default());
  }

  #[test]
  fn file_values_override_defaults() {
    let path = std::env::temp_dir()
      .join(format!("synapse-settings-{}.toml", uuid::Uuid::new_v4()));
    std::fs::write(&path, "log_payloads = true\nmin_birth_year = 1920\n").unwrap();

    let settings = Settings::load(Some(&path)).unwrap();
    std::fs::remove_file(&path).ok();

    assert!(settings.log_payloads);
    assert_eq!(settings.min_birth_year, 1920);
  }
}
