//! User settings, read from `~/.config/skytag/skytag.yaml`.
//!
//! ```yaml
//! log_level: warn
//! distance:
//!   steps: 10000
//!   rmin: 0.0
//! output:
//!   format: sentence
//! ```
//!
//! Every field is optional; missing ones take the defaults shown.

use crate::distance::DEFAULT_STEPS;
use crate::lookup::LookupOptions;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const SETTINGS_DIR: &str = ".config/skytag";
pub const SETTINGS_FILE: &str = "skytag.yaml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One plain-language sentence per position
    #[default]
    Sentence,
    /// Results as a JSON array
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistanceSection {
    /// Grid points for distance integration.
    pub steps: usize,
    /// Lower integration bound in Mpc.
    pub rmin: f64,
}

impl Default for DistanceSection {
    fn default() -> Self {
        Self {
            steps: DEFAULT_STEPS,
            rmin: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    pub format: OutputFormat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Default `env_logger` filter; `RUST_LOG` overrides it.
    pub log_level: String,
    pub distance: DistanceSection,
    pub output: OutputSection,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            distance: DistanceSection::default(),
            output: OutputSection::default(),
        }
    }
}

/// `~/.config/skytag/skytag.yaml`, if a home directory is known.
pub fn default_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(SETTINGS_DIR).join(SETTINGS_FILE))
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            Error::Settings(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&contents).map_err(|e| match e {
            Error::Settings(reason) => Error::Settings(format!("{}: {}", path.display(), reason)),
            other => other,
        })
    }

    /// Loads the default settings file, or the defaults when it does not exist.
    pub fn load_default() -> Result<Self> {
        match default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let settings: Self =
            serde_yaml::from_str(yaml).map_err(|e| Error::Settings(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| Error::Settings(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        log::LevelFilter::from_str(&self.log_level).map_err(|_| {
            Error::Settings(format!("unknown log_level '{}'", self.log_level))
        })?;
        if self.distance.steps < 2 {
            return Err(Error::Settings(format!(
                "distance.steps must be at least 2, got {}",
                self.distance.steps
            )));
        }
        if !self.distance.rmin.is_finite() || self.distance.rmin < 0.0 {
            return Err(Error::Settings(format!(
                "distance.rmin must be a non-negative number, got {}",
                self.distance.rmin
            )));
        }
        Ok(())
    }

    /// Lookup options carrying this file's integration grid.
    pub fn lookup_options(&self) -> LookupOptions {
        LookupOptions::default().with_distance_grid(self.distance.rmin, self.distance.steps)
    }

    /// Writes the default settings to `path` unless a file is already there.
    /// Returns whether a file was written.
    pub fn init(path: &Path) -> Result<bool> {
        if path.exists() {
            return Ok(false);
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, Self::default().to_yaml()?)?;
        log::info!("Wrote default settings to {}", path.display());
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.log_level, "warn");
        assert_eq!(settings.distance.steps, 10_000);
        assert_eq!(settings.distance.rmin, 0.0);
        assert_eq!(settings.output.format, OutputFormat::Sentence);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let settings = Settings::from_yaml("distance:\n  steps: 2000\noutput:\n  format: json\n").unwrap();
        assert_eq!(settings.distance.steps, 2000);
        assert_eq!(settings.distance.rmin, 0.0);
        assert_eq!(settings.output.format, OutputFormat::Json);
        assert_eq!(settings.log_level, "warn");

        let options = settings.lookup_options();
        assert_eq!(options.distance_steps, 2000);
        assert!(!options.distance && !options.probability_density);
    }

    #[test]
    fn test_yaml_roundtrip() {
        let settings = Settings::default();
        let parsed = Settings::from_yaml(&settings.to_yaml().unwrap()).unwrap();
        assert_eq!(parsed, settings);
    }

    #[test]
    fn test_invalid_values() {
        for yaml in [
            "log_level: loud",
            "distance:\n  steps: 1",
            "distance:\n  rmin: -5.0",
            "output:\n  format: xml",
            "distance: [1, 2]",
        ] {
            assert!(
                matches!(Settings::from_yaml(yaml), Err(Error::Settings(_))),
                "{}",
                yaml
            );
        }
    }

    #[test]
    fn test_init_writes_once() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join(SETTINGS_FILE);

        assert!(Settings::init(&path).unwrap());
        assert_eq!(Settings::load(&path).unwrap(), Settings::default());

        fs::write(&path, "log_level: debug\n").unwrap();
        assert!(!Settings::init(&path).unwrap());
        assert_eq!(Settings::load(&path).unwrap().log_level, "debug");
    }

    #[test]
    fn test_load_errors_name_the_file() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("absent.yaml");
        let err = Settings::load(&missing).unwrap_err();
        assert!(err.to_string().contains("absent.yaml"));

        let bad = dir.path().join("bad.yaml");
        fs::write(&bad, "log_level: [").unwrap();
        let err = Settings::load(&bad).unwrap_err();
        assert!(matches!(err, Error::Settings(_)));
        assert!(err.to_string().contains("bad.yaml"));
    }

    #[test]
    fn test_default_path_layout() {
        if let Some(path) = default_path() {
            assert!(path.ends_with(".config/skytag/skytag.yaml"));
        }
    }
}
