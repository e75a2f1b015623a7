use std::{
    num::NonZeroU8,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

/// Configuration for a tracker.
///
/// Stored as TOML in `.efor/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// Hours in one man-day.
    ///
    /// Total hours are divided by this to get man-days, which in turn decide
    /// the T-shirt size. Schedule risk does not use it.
    workday_hours: NonZeroU8,

    /// How many days ahead the report looks for upcoming deadlines.
    upcoming_days: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workday_hours: default_workday_hours(),
            upcoming_days: default_upcoming_days(),
        }
    }
}

impl Config {
    /// Default configuration with a different workday length.
    #[must_use]
    pub fn with_workday_hours(workday_hours: NonZeroU8) -> Self {
        Self {
            workday_hours,
            ..Self::default()
        }
    }

    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Hours in one man-day.
    #[must_use]
    pub fn workday_hours(&self) -> f64 {
        f64::from(self.workday_hours.get())
    }

    /// Days ahead that count as an upcoming deadline in reports.
    #[must_use]
    pub const fn upcoming_days(&self) -> u32 {
        self.upcoming_days
    }

    /// Sets the workday length.
    pub const fn set_workday_hours(&mut self, hours: NonZeroU8) {
        self.workday_hours = hours;
    }

    /// Sets the upcoming-deadline window.
    pub const fn set_upcoming_days(&mut self, days: u32) {
        self.upcoming_days = days;
    }
}

const fn default_workday_hours() -> NonZeroU8 {
    NonZeroU8::MIN.saturating_add(7)
}

const fn default_upcoming_days() -> u32 {
    7
}

/// Reading or writing the configuration failed.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        /// Config file location.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The file is not valid configuration.
    #[error("failed to parse config file {}: {source}", path.display())]
    Parse {
        /// Config file location.
        path: PathBuf,
        /// Underlying error.
        source: toml::de::Error,
    },

    /// The configuration could not be encoded.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// The file could not be written.
    #[error("failed to write config file {}: {source}", path.display())]
    Write {
        /// Config file location.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_workday_hours")]
        workday_hours: NonZeroU8,

        #[serde(default = "default_upcoming_days")]
        upcoming_days: u32,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                workday_hours,
                upcoming_days,
            } => Self {
                workday_hours,
                upcoming_days,
            },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            workday_hours: config.workday_hours,
            upcoming_days: config.upcoming_days,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn load_reads_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"_version = \"1\"\nworkday_hours = 7\nupcoming_days = 14\n")
            .unwrap();

        let config = Config::load(file.path()).unwrap();

        assert!((config.workday_hours() - 7.0).abs() < f64::EPSILON);
        assert_eq!(config.upcoming_days(), 14);
    }

    #[test]
    fn load_missing_file_returns_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing.toml");

        let error = Config::load(&missing).unwrap_err();
        assert!(matches!(error, ConfigError::Read { .. }));
        assert!(error.to_string().starts_with("failed to read config file"));
    }

    #[test]
    fn load_invalid_toml_returns_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"_version = \"1\"\nworkday_hours = \"eight\"\n")
            .unwrap();

        let error = Config::load(file.path()).unwrap_err();
        assert!(matches!(error, ConfigError::Parse { .. }));
    }

    #[test]
    fn zero_workday_is_rejected() {
        let error = toml::from_str::<Config>("_version = \"1\"\nworkday_hours = 0\n");
        assert!(error.is_err());
    }

    #[test]
    fn empty_file_returns_default() {
        // Tests that deserialising an empty file returns the default configuration.
        let expected = Config::default();
        let actual: Config = toml::from_str(r#"_version = "1""#).unwrap();
        assert_eq!(actual, expected);
        assert!((actual.workday_hours() - 8.0).abs() < f64::EPSILON);
    }

    #[test]
    fn save_then_load_preserves_settings() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");

        let mut config = Config::default();
        config.set_upcoming_days(10);
        config.save(&path).unwrap();

        assert_eq!(Config::load(&path).unwrap(), config);
    }
}
