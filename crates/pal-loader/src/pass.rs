//! # Programming Pass Typestate
//!
//! One programming pass walks five steps in a fixed order. Each phase is a
//! distinct type and every step consumes the pass, so the order is checked
//! at compile time.
//!
//! ```text
//! quiesce ─▶ Quiesced ─reset()─▶ Reset ─stream()─▶ Streamed ─commit()─▶ Committed ─enable()─▶ PassLog
//! ```
//!
//! The following will NOT compile because a `Reset` pass has no `enable()`:
//!
//! ```compile_fail
//! use pal_loader::pass::*;
//! use pal_loader::signals::*;
//!
//! fn skip<D: DeviceControl, B: SequencerBank>(d: &mut D, b: &mut B) {
//!     let pass = ProgrammingPass::quiesce(d, b).unwrap().reset();
//!     // ERROR: no method named `enable` found for `ProgrammingPass<'_, D, B, Reset>`
//!     let _ = pass.enable();
//! }
//! ```

use std::marker::PhantomData;

use pal_core::{ConfigWord, LoaderError};

use crate::channel::ChannelPlan;
use crate::signals::{DeviceControl, SequencerBank};

// ─── Phase Types ─────────────────────────────────────────────────────

/// Enable and clock are low; nothing has been reset yet.
#[derive(Debug, Clone, Copy)]
pub struct Quiesced;

/// The reset pulse has been issued.
#[derive(Debug, Clone, Copy)]
pub struct Reset;

/// Every word is queued on its channel.
#[derive(Debug, Clone, Copy)]
pub struct Streamed;

/// The start signal has been raised on the primary channel.
#[derive(Debug, Clone, Copy)]
pub struct Committed;

mod private {
    pub trait Sealed {}
    impl Sealed for super::Quiesced {}
    impl Sealed for super::Reset {}
    impl Sealed for super::Streamed {}
    impl Sealed for super::Committed {}
}

/// Marker trait for the phases of a programming pass.
pub trait PassPhase: private::Sealed + std::fmt::Debug {
    /// Canonical phase name (e.g. "QUIESCED").
    fn name() -> &'static str;
}

impl PassPhase for Quiesced {
    fn name() -> &'static str {
        "QUIESCED"
    }
}
impl PassPhase for Reset {
    fn name() -> &'static str {
        "RESET"
    }
}
impl PassPhase for Streamed {
    fn name() -> &'static str {
        "STREAMED"
    }
}
impl PassPhase for Committed {
    fn name() -> &'static str {
        "COMMITTED"
    }
}

/// What a finished pass did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassLog {
    /// Phases entered, in order, ending with "ENABLED".
    pub phases: Vec<&'static str>,
    /// Words queued on each channel.
    pub queued: Vec<usize>,
}

// ─── The Pass ────────────────────────────────────────────────────────

/// A programming pass holding exclusive access to the device and the
/// sequencer bank for its whole duration.
#[derive(Debug)]
pub struct ProgrammingPass<'a, D, B, P: PassPhase> {
    device: &'a mut D,
    bank: &'a mut B,
    phases: Vec<&'static str>,
    queued: Vec<usize>,
    _phase: PhantomData<P>,
}

impl<'a, D: DeviceControl, B: SequencerBank, P: PassPhase> ProgrammingPass<'a, D, B, P> {
    /// Current phase name.
    pub fn phase_name(&self) -> &'static str {
        P::name()
    }

    /// Phases entered so far.
    pub fn phases(&self) -> &[&'static str] {
        &self.phases
    }

    fn transition_to<T: PassPhase>(mut self) -> ProgrammingPass<'a, D, B, T> {
        tracing::debug!(from = P::name(), to = T::name(), "programming pass transition");
        self.phases.push(T::name());
        ProgrammingPass {
            device: self.device,
            bank: self.bank,
            phases: self.phases,
            queued: self.queued,
            _phase: PhantomData,
        }
    }
}

impl<'a, D: DeviceControl, B: SequencerBank> ProgrammingPass<'a, D, B, Quiesced> {
    /// Start a pass: refuse if the bank is still shifting a previous
    /// configuration, otherwise drop anything left queued and drive enable
    /// and clock low.
    pub fn quiesce(device: &'a mut D, bank: &'a mut B) -> Result<Self, LoaderError> {
        if bank.is_busy() {
            return Err(LoaderError::PassInProgress);
        }
        bank.discard();
        device.set_enable(false);
        device.set_clock(false);
        let channels = bank.channel_count();
        Ok(Self {
            device,
            bank,
            phases: vec![Quiesced::name()],
            queued: vec![0; channels],
            _phase: PhantomData,
        })
    }

    /// Pulse the reset line (assert, then release).
    pub fn reset(self) -> ProgrammingPass<'a, D, B, Reset> {
        self.device.set_reset(true);
        self.device.set_reset(false);
        self.transition_to()
    }
}

impl<'a, D: DeviceControl, B: SequencerBank> ProgrammingPass<'a, D, B, Reset> {
    /// Queue every word on its channel.
    ///
    /// `index` is the running word address. It wraps to 0 once a full
    /// configuration has been addressed. If a push fails, the words queued
    /// so far are discarded and `index` is cleared, so nothing of the
    /// aborted pass reaches the device and the next pass starts from word 0.
    pub fn stream(
        mut self,
        words: &[ConfigWord],
        plan: &ChannelPlan,
        index: &mut usize,
    ) -> Result<ProgrammingPass<'a, D, B, Streamed>, LoaderError> {
        for &word in words {
            let channel = plan.channel_for(*index);
            if let Err(e) = self.bank.push(channel, word) {
                tracing::warn!(index = *index, channel, error = %e, "push failed; discarding queued words");
                self.bank.discard();
                *index = 0;
                return Err(e);
            }
            tracing::trace!(index = *index, channel, word, "queued word");
            if let Some(count) = self.queued.get_mut(channel) {
                *count += 1;
            }
            *index += 1;
            if *index == plan.config_words() {
                *index = 0;
            }
        }
        Ok(self.transition_to())
    }
}

impl<'a, D: DeviceControl, B: SequencerBank> ProgrammingPass<'a, D, B, Streamed> {
    /// Raise the start signal on the primary channel. The sequencers run
    /// on their own from here; this does not wait for them.
    pub fn commit(self, primary: usize) -> Result<ProgrammingPass<'a, D, B, Committed>, LoaderError> {
        self.bank.commit(primary)?;
        Ok(self.transition_to())
    }
}

impl<'a, D: DeviceControl, B: SequencerBank> ProgrammingPass<'a, D, B, Committed> {
    /// Re-assert enable and finish the pass.
    pub fn enable(self) -> PassLog {
        self.device.set_enable(true);
        let mut phases = self.phases;
        phases.push("ENABLED");
        PassLog {
            phases,
            queued: self.queued,
        }
    }
}
