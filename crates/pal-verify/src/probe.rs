//! Device read side.

use pal_compiler::OutputBits;
use pal_core::{Code, State};

/// The combined output register as read back from the device.
pub type DeviceOutputs = OutputBits;

/// Evaluate the device at one address.
///
/// `present` drives the 3-bit state and 5-bit code inputs; `outputs` reads
/// the register those inputs currently produce. The two are separate
/// because real boards settle between the write and the read.
pub trait DeviceProbe {
    /// Drive the state and code inputs.
    fn present(&mut self, state: State, code: Code);

    /// Read the combined output register.
    fn outputs(&self) -> DeviceOutputs;

    /// Present an address and read the result.
    fn probe(&mut self, state: State, code: Code) -> DeviceOutputs {
        self.present(state, code);
        self.outputs()
    }
}
