//! Controller-side views of the board.
//!
//! The physical pin and register layer is out of scope; these traits are
//! the minimum the transfer protocol needs from it.

use pal_core::{ConfigWord, LoaderError};

/// Write-only control lines of the device.
pub trait DeviceControl {
    /// Drive the enable line.
    fn set_enable(&mut self, high: bool);

    /// Drive the clock / strobe line.
    fn set_clock(&mut self, high: bool);

    /// Drive the reset line (`true` = asserted).
    fn set_reset(&mut self, asserted: bool);
}

/// A bank of autonomous execution units, each with its own input queue.
///
/// Words pushed before [`commit`](SequencerBank::commit) are only queued;
/// the commit signal starts every unit, and each shifts its queue out to
/// the device least-significant bit first until its quota is exhausted.
pub trait SequencerBank {
    /// Number of delivery channels.
    fn channel_count(&self) -> usize;

    /// Words each channel accepts before its next commit.
    fn quota(&self) -> usize;

    /// Queue one word on `channel`.
    fn push(&mut self, channel: usize, word: ConfigWord) -> Result<(), LoaderError>;

    /// Drop every word queued since the last commit.
    fn discard(&mut self);

    /// Raise the one-shot start signal on the `primary` channel.
    fn commit(&mut self, primary: usize) -> Result<(), LoaderError>;

    /// Whether any unit is still shifting a committed configuration.
    fn is_busy(&self) -> bool;

    /// Block until every unit has drained its queue.
    fn wait_idle(&mut self) -> Result<(), LoaderError>;
}
