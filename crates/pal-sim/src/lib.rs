//! # pal-sim: Simulated Board
//!
//! Software stand-ins for the hardware side of the transfer protocol, so
//! that programming and conformance runs work without a board attached.
//!
//! - [`SimulatedPal`]: the device. Control lines, probe inputs and outputs,
//!   and the receiving end of the serial configuration lanes.
//! - [`SimulatedSequencers`]: the autonomous execution units, one thread
//!   per channel, released together by a one-shot start signal.
//!
//! [`rig`] wires both to a [`Loader`] the way the board does.

pub mod device;
pub mod sequencer;

pub use device::{ShiftSink, Signal, SimulatedPal};
pub use sequencer::SimulatedSequencers;

use pal_core::{LoaderError, PalSettings};
use pal_loader::Loader;
use pal_record::ConfigurationRecord;

/// A loader over simulated sequencers feeding a simulated device.
pub type SimulatedLoader = Loader<SimulatedSequencers<SimulatedPal>>;

/// A blank device built for `record` and a loader wired to it.
pub fn rig(
    record: &ConfigurationRecord,
    settings: &PalSettings,
) -> Result<(SimulatedPal, SimulatedLoader), LoaderError> {
    let device = SimulatedPal::new(record);
    let bank = SimulatedSequencers::from_settings(device.clone(), settings);
    let loader = Loader::from_settings(bank, settings)?;
    Ok((device, loader))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pal_core::{TargetString, CONFIG_WORDS};
    use pal_loader::DeviceControl;
    use pal_verify::{run_suite, DEFAULT_DECOYS};

    fn record(msg: &str) -> ConfigurationRecord {
        let words = (0..CONFIG_WORDS as u8).map(|i| i ^ 0x3c).collect();
        ConfigurationRecord::new(TargetString::parse(msg).unwrap(), words).unwrap()
    }

    #[test]
    fn programmed_device_passes_suite() {
        let rec = record("HELLO");
        let (mut device, mut loader) = rig(&rec, &PalSettings::default()).unwrap();
        let suite = run_suite(&mut device, &mut loader, &rec, &DEFAULT_DECOYS).unwrap();

        assert!(suite.passed(), "{:#?}", suite.reports);
        assert_eq!(device.received(), rec.words());
        assert_eq!(loader.bank().commits(), &[0]);
        assert_eq!(
            loader.bank().last_pass().iter().map(Vec::len).collect::<Vec<_>>(),
            vec![8, 8, 8, 4]
        );
    }

    #[test]
    fn enable_follows_commit() {
        let rec = record("HI");
        let (mut device, mut loader) = rig(&rec, &PalSettings::default()).unwrap();
        loader.program(&mut device, &rec).unwrap();
        loader.wait_idle().unwrap();

        let signals = device.signals();
        assert_eq!(
            signals,
            vec![
                Signal::Enable(false),
                Signal::Clock(false),
                Signal::Reset(true),
                Signal::Reset(false),
                Signal::Enable(true),
            ]
        );
        assert!(device.is_configured());
    }

    #[test]
    fn device_for_other_record_stays_dark() {
        let built_for = record("HELLO");
        let mut other_words = built_for.words().to_vec();
        other_words[0] ^= 1;
        let loaded = ConfigurationRecord::new(built_for.source().clone(), other_words).unwrap();

        let (mut device, mut loader) = rig(&built_for, &PalSettings::default()).unwrap();
        let suite = run_suite(&mut device, &mut loader, &loaded, &[]).unwrap();
        assert!(!suite.passed());
        assert!(suite.reports[0].diagnostics.is_empty());
    }

    #[test]
    fn reprogramming_replaces_configuration() {
        let rec = record("HI");
        let (mut device, mut loader) = rig(&rec, &PalSettings::default()).unwrap();
        for _ in 0..2 {
            loader.program(&mut device, &rec).unwrap();
            loader.wait_idle().unwrap();
            assert_eq!(device.received(), rec.words());
        }
        device.set_enable(false);
        assert!(!device.is_enabled());
    }
}
