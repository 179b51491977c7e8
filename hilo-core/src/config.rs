// Engine and poller configuration: compiled defaults, optional hilo.toml, HILO__ env overrides.

use config::{Config, ConfigError, Environment, File, FileFormat, FileSourceFile};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct EngineSettings {
    pub pattern_window: usize,
    pub trend_window: usize,
    pub defensive_loss_streak: u32,
    pub history_length: usize,
    pub seed: Option<u64>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            pattern_window: 30,
            trend_window: 20,
            defensive_loss_streak: 2,
            history_length: 20,
            seed: None,
        }
    }
}

impl EngineSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pattern_window < 5 {
            return Err(ConfigError::Message(format!(
                "engine.pattern_window must be at least 5, got {}",
                self.pattern_window
            )));
        }
        if self.trend_window < 20 {
            return Err(ConfigError::Message(format!(
                "engine.trend_window must be at least 20, got {}",
                self.trend_window
            )));
        }
        if self.defensive_loss_streak == 0 {
            return Err(ConfigError::Message(
                "engine.defensive_loss_streak must be at least 1".to_string(),
            ));
        }
        if !(10..=50).contains(&self.history_length) {
            return Err(ConfigError::Message(format!(
                "engine.history_length must be within 10..=50, got {}",
                self.history_length
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct PollerSettings {
    pub refresh_interval_secs: u64,
    pub source_path: Option<String>,
}

impl Default for PollerSettings {
    fn default() -> Self {
        Self {
            refresh_interval_secs: 60,
            source_path: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct Settings {
    pub engine: EngineSettings,
    pub poller: PollerSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::load(File::with_name("hilo").required(false))
    }

    /// Loads defaults plus an explicit TOML file.
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        Self::load(File::with_name(path))
    }

    fn load(file: File<FileSourceFile, FileFormat>) -> Result<Self, ConfigError> {
        let defaults = EngineSettings::default();
        let s = Config::builder()
            .set_default("engine.pattern_window", defaults.pattern_window as u64)?
            .set_default("engine.trend_window", defaults.trend_window as u64)?
            .set_default(
                "engine.defensive_loss_streak",
                defaults.defensive_loss_streak as u64,
            )?
            .set_default("engine.history_length", defaults.history_length as u64)?
            .set_default("poller.refresh_interval_secs", 60)?
            .add_source(file)
            .add_source(Environment::with_prefix("HILO").separator("__"))
            .build()?;

        let settings: Settings = s.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine.validate()?;
        if !(10..=120).contains(&self.poller.refresh_interval_secs) {
            return Err(ConfigError::Message(format!(
                "poller.refresh_interval_secs must be within 10..=120, got {}",
                self.poller.refresh_interval_secs
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.engine.pattern_window, 30);
        assert_eq!(settings.engine.trend_window, 20);
    }

    #[test]
    fn test_validation_rejects_short_trend_window() {
        let engine = EngineSettings {
            trend_window: 10,
            ..EngineSettings::default()
        };
        assert!(engine.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_interval_out_of_range() {
        let settings = Settings {
            poller: PollerSettings {
                refresh_interval_secs: 5,
                source_path: None,
            },
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_from_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[engine]\nhistory_length = 40\nseed = 9\n").unwrap();

        let settings = Settings::from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(settings.engine.history_length, 40);
        assert_eq!(settings.engine.seed, Some(9));
        assert_eq!(settings.engine.pattern_window, 30);
        assert_eq!(settings.poller.refresh_interval_secs, 60);
    }
}
