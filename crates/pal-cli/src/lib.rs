//! # pal-cli: the `palc` tool
//!
//! ## Subcommands
//!
//! - `palc compile`: compile a string, write its equations, run the
//!   bitstream assembler and persist the resulting record.
//! - `palc emit`: print the equations for a string.
//! - `palc records`: list the records in a directory of persisted modules.
//! - `palc verify`: program the simulated board with a persisted record and
//!   run the conformance suite against it.
//!
//! ```bash
//! palc compile "Hello" out/hello.txt
//! palc records out/
//! palc verify out/hello.json --decoy HELP --decoy HELLO!
//! ```

pub mod compile;
pub mod records;
pub mod verify;

use std::path::Path;

use anyhow::{Context, Result};
use pal_core::PalSettings;

/// Success.
pub const EXIT_OK: u8 = 0;

/// I/O, assembler, lookup or verification failure.
pub const EXIT_FAILURE: u8 = 1;

/// The target string was rejected by the compiler.
pub const EXIT_REJECTED: u8 = 2;

/// Resolve settings: defaults, then the YAML file at `path`, then `PAL_*`
/// environment overrides.
pub fn load_settings(path: Option<&Path>) -> Result<PalSettings> {
    let settings = PalSettings::load(path).with_context(|| match path {
        Some(p) => format!("failed to load settings from {}", p.display()),
        None => "failed to load settings".to_string(),
    })?;
    tracing::debug!(?settings, "resolved settings");
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pal.yaml");
        std::fs::write(&path, "serial_hz: 1000000\n").unwrap();
        let settings = load_settings(Some(&path)).unwrap();
        assert_eq!(settings.serial_hz, 1_000_000);
    }

    #[test]
    fn missing_settings_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_settings(Some(&dir.path().join("absent.yaml"))).unwrap_err();
        assert!(format!("{err:#}").contains("absent.yaml"));
    }
}
