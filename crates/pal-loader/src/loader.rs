//! The loader: one [`ProgrammingPass`] per record, with the running word
//! index and channel plan kept between passes.

use std::time::Duration;

use pal_core::{LoaderError, PalSettings};
use pal_record::ConfigurationRecord;

use crate::channel::ChannelPlan;
use crate::pass::ProgrammingPass;
use crate::signals::{DeviceControl, SequencerBank};

/// Outcome of a successful programming pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassSummary {
    /// Words streamed.
    pub words: usize,
    /// Words queued on each channel.
    pub per_channel: Vec<usize>,
    /// Phases entered, in order.
    pub phases: Vec<&'static str>,
    /// Time the sequencers need to shift one full quota at the serial rate.
    pub shift_time: Duration,
}

/// Drives programming passes against a sequencer bank it owns.
#[derive(Debug)]
pub struct Loader<B: SequencerBank> {
    bank: B,
    plan: ChannelPlan,
    primary: usize,
    serial_hz: u32,
    index: usize,
}

impl<B: SequencerBank> Loader<B> {
    /// A loader for `plan`, committing through channel `primary`.
    pub fn new(bank: B, plan: ChannelPlan, primary: usize, serial_hz: u32) -> Result<Self, LoaderError> {
        if bank.channel_count() < plan.channels() {
            return Err(LoaderError::Sequencer(format!(
                "bank has {} channels; plan needs {}",
                bank.channel_count(),
                plan.channels()
            )));
        }
        if bank.quota() < plan.quota() {
            return Err(LoaderError::Sequencer(format!(
                "bank quota is {} words; plan needs {}",
                bank.quota(),
                plan.quota()
            )));
        }
        if primary >= plan.channels() {
            return Err(LoaderError::NoSuchChannel {
                primary,
                channels: plan.channels(),
            });
        }
        if serial_hz == 0 {
            return Err(LoaderError::Sequencer("serial rate must be non-zero".to_string()));
        }
        Ok(Self {
            bank,
            plan,
            primary,
            serial_hz,
            index: 0,
        })
    }

    /// A loader shaped by `settings`.
    pub fn from_settings(bank: B, settings: &PalSettings) -> Result<Self, LoaderError> {
        let plan = ChannelPlan::from_settings(settings)?;
        Self::new(bank, plan, settings.primary_channel, settings.serial_hz)
    }

    /// Run one programming pass for `record`.
    ///
    /// The shape check happens before any signal is touched, so a rejected
    /// record leaves the device exactly as it was. Returns once the commit
    /// signal is raised and enable re-asserted; the sequencers may still be
    /// shifting (see [`Loader::wait_idle`]).
    pub fn program<D: DeviceControl>(
        &mut self,
        device: &mut D,
        record: &ConfigurationRecord,
    ) -> Result<PassSummary, LoaderError> {
        let words = record.words();
        if words.len() != self.plan.config_words() {
            return Err(LoaderError::ShapeMismatch {
                expected: self.plan.config_words(),
                actual: words.len(),
            });
        }

        tracing::info!(msg = record.source().as_str(), words = words.len(), "programming device");
        let pass = ProgrammingPass::quiesce(device, &mut self.bank)?;
        let pass = pass.reset();
        let pass = pass.stream(words, &self.plan, &mut self.index)?;
        let pass = pass.commit(self.primary)?;
        let log = pass.enable();

        let shift_time = self.shift_time();
        tracing::info!(
            per_channel = ?log.queued,
            shift_us = shift_time.as_micros() as u64,
            "configuration committed"
        );
        Ok(PassSummary {
            words: words.len(),
            per_channel: log.queued,
            phases: log.phases,
            shift_time,
        })
    }

    /// Whether the previous pass is still shifting.
    pub fn is_busy(&self) -> bool {
        self.bank.is_busy()
    }

    /// Block until the previous pass has drained.
    pub fn wait_idle(&mut self) -> Result<(), LoaderError> {
        self.bank.wait_idle()
    }

    /// Time to shift `quota` words of 8 bits at the serial rate, saturating
    /// at `u64::MAX` nanoseconds.
    pub fn shift_time(&self) -> Duration {
        let bits = self.plan.quota() as u128 * 8;
        let nanos = bits * 1_000_000_000 / u128::from(self.serial_hz);
        Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
    }

    /// Channel plan.
    pub fn plan(&self) -> &ChannelPlan {
        &self.plan
    }

    /// Address of the next word to be streamed.
    pub fn next_index(&self) -> usize {
        self.index
    }

    /// The sequencer bank.
    pub fn bank(&self) -> &B {
        &self.bank
    }

    /// The sequencer bank, mutably.
    pub fn bank_mut(&mut self) -> &mut B {
        &mut self.bank
    }
}
