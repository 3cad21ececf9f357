//! Transfer and toolchain settings.
//!
//! Defaults match the reference board: four delivery channels with an
//! eight-word quota each, channel 0 as the primary, and a 5 MHz serial
//! clock. The configuration length is fixed at [`CONFIG_WORDS`] by the
//! device and is not a setting. A YAML file and `PAL_*` environment
//! variables override the defaults, in that order.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;
use crate::target::CONFIG_WORDS;

/// Largest channel bank the settings accept.
pub const MAX_CHANNELS: usize = 64;

/// Largest per-channel quota the settings accept.
pub const MAX_QUOTA: usize = 4096;

/// Settings for the configuration transfer and the external assembler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PalSettings {
    /// Number of parallel delivery channels.
    pub channels: usize,
    /// Words each channel accepts per configuration.
    pub quota: usize,
    /// Channel that receives the commit signal.
    pub primary_channel: usize,
    /// Serial shift clock of the execution units, in Hz.
    pub serial_hz: u32,
    /// Command line of the external bitstream assembler. The equation file
    /// path is appended as the last argument.
    pub assembler: Option<Vec<String>>,
}

impl Default for PalSettings {
    fn default() -> Self {
        Self {
            channels: 4,
            quota: 8,
            primary_channel: 0,
            serial_hz: 5_000_000,
            assembler: None,
        }
    }
}

impl PalSettings {
    /// Resolve settings: defaults, then the optional YAML file, then the
    /// environment. The result is validated.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        let settings = match path {
            Some(path) => Self::from_yaml_file(path)?,
            None => Self::default(),
        };
        let settings = settings.with_env()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Parse a YAML settings file. Missing keys take their defaults.
    pub fn from_yaml_file(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Parse YAML settings text.
    pub fn from_yaml_str(text: &str) -> Result<Self, SettingsError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    /// Apply `PAL_*` environment overrides.
    ///
    /// Variables:
    /// - `PAL_CHANNELS`, `PAL_QUOTA`, `PAL_PRIMARY_CHANNEL`
    /// - `PAL_SERIAL_HZ`
    /// - `PAL_ASSEMBLER` (whitespace-separated command line)
    pub fn with_env(mut self) -> Result<Self, SettingsError> {
        if let Some(v) = env_parse("PAL_CHANNELS")? {
            self.channels = v;
        }
        if let Some(v) = env_parse("PAL_QUOTA")? {
            self.quota = v;
        }
        if let Some(v) = env_parse("PAL_PRIMARY_CHANNEL")? {
            self.primary_channel = v;
        }
        if let Some(v) = env_parse("PAL_SERIAL_HZ")? {
            self.serial_hz = v;
        }
        if let Ok(cmd) = std::env::var("PAL_ASSEMBLER") {
            let parts: Vec<String> = cmd.split_whitespace().map(str::to_string).collect();
            self.assembler = (!parts.is_empty()).then_some(parts);
        }
        Ok(self)
    }

    /// Total words the channel bank can hold.
    pub fn capacity(&self) -> usize {
        self.channels.saturating_mul(self.quota)
    }

    /// Check the settings are internally consistent.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.channels == 0 || self.quota == 0 {
            return Err(SettingsError::Invalid(
                "channels and quota must be non-zero".to_string(),
            ));
        }
        if self.channels > MAX_CHANNELS || self.quota > MAX_QUOTA {
            return Err(SettingsError::Invalid(format!(
                "{} channels x quota {} exceeds the {MAX_CHANNELS} x {MAX_QUOTA} limit",
                self.channels, self.quota
            )));
        }
        if self.primary_channel >= self.channels {
            return Err(SettingsError::Invalid(format!(
                "primary channel {} out of range for {} channels",
                self.primary_channel, self.channels
            )));
        }
        if self.capacity() < CONFIG_WORDS {
            return Err(SettingsError::Invalid(format!(
                "{} channels x quota {} cannot hold {CONFIG_WORDS} words",
                self.channels, self.quota
            )));
        }
        if self.serial_hz == 0 {
            return Err(SettingsError::Invalid("serial clock must be non-zero".to_string()));
        }
        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(var: &str) -> Result<Option<T>, SettingsError> {
    match std::env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| SettingsError::InvalidEnv {
                var: var.to_string(),
                value: raw,
            }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_board() {
        let s = PalSettings::default();
        assert_eq!(s.channels, 4);
        assert_eq!(s.quota, 8);
        assert_eq!(s.capacity(), 32);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn yaml_overrides_only_given_keys() {
        let s = PalSettings::from_yaml_str("quota: 7\nassembler: [bitgen, --multi]\n").unwrap();
        assert_eq!(s.quota, 7);
        assert_eq!(s.channels, 4);
        assert_eq!(
            s.assembler,
            Some(vec!["bitgen".to_string(), "--multi".to_string()])
        );
        assert!(s.validate().is_ok());
    }

    #[test]
    fn empty_yaml_is_defaults() {
        assert_eq!(PalSettings::from_yaml_str("  \n").unwrap(), PalSettings::default());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(PalSettings::from_yaml_str("chanels: 4\n").is_err());
    }

    #[test]
    fn yaml_file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pal.yaml");
        std::fs::write(&path, "channels: 7\nquota: 4\n").unwrap();
        let s = PalSettings::from_yaml_file(&path).unwrap();
        assert_eq!(s.capacity(), 28);
    }

    #[test]
    fn validate_rejects_small_capacity() {
        let s = PalSettings {
            channels: 3,
            ..PalSettings::default()
        };
        assert!(matches!(s.validate(), Err(SettingsError::Invalid(_))));
    }

    #[test]
    fn validate_rejects_primary_out_of_range() {
        let s = PalSettings {
            primary_channel: 4,
            ..PalSettings::default()
        };
        assert!(s.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_quota() {
        let s = PalSettings {
            quota: 0,
            ..PalSettings::default()
        };
        assert!(s.validate().is_err());
    }

    #[test]
    fn validate_bounds_quota_and_channels() {
        let huge_quota = PalSettings {
            quota: 3_000_000_000,
            ..PalSettings::default()
        };
        assert!(matches!(huge_quota.validate(), Err(SettingsError::Invalid(_))));

        let huge_bank = PalSettings {
            channels: usize::MAX,
            quota: usize::MAX,
            ..PalSettings::default()
        };
        assert_eq!(huge_bank.capacity(), usize::MAX);
        assert!(huge_bank.validate().is_err());

        let widest = PalSettings {
            channels: MAX_CHANNELS,
            quota: MAX_QUOTA,
            ..PalSettings::default()
        };
        assert!(widest.validate().is_ok());
    }

    #[test]
    fn config_words_is_not_a_setting() {
        assert!(PalSettings::from_yaml_str("config_words: 30\n").is_err());
    }

    #[test]
    fn env_parse_reports_bad_values() {
        std::env::set_var("PAL_TEST_BAD_NUMBER", "four");
        let result = env_parse::<usize>("PAL_TEST_BAD_NUMBER");
        std::env::remove_var("PAL_TEST_BAD_NUMBER");
        assert!(matches!(result, Err(SettingsError::InvalidEnv { .. })));
    }

    #[test]
    fn env_parse_absent_is_none() {
        assert_eq!(env_parse::<usize>("PAL_TEST_SURELY_UNSET_VAR").unwrap(), None);
    }
}
