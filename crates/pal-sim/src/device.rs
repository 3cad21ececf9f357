//! # Behavioral Device Model
//!
//! [`SimulatedPal`] stands in for the programmable logic part. It listens
//! on the serial configuration lanes, rebuilds the bytes it receives (least
//! significant bit first, lanes concatenated in channel order) and, once
//! the received stream equals the configuration it was built for and
//! enable is high, answers probes with the compiled recognizer logic.
//! Otherwise every output reads zero.
//!
//! The handle is cheap to clone; all clones share one device.

use std::collections::BTreeMap;
use std::sync::Arc;

use pal_compiler::{compile_target, Compilation};
use pal_core::{Code, ConfigWord, State};
use pal_loader::DeviceControl;
use pal_record::ConfigurationRecord;
use pal_verify::{DeviceOutputs, DeviceProbe};
use parking_lot::Mutex;

/// Receiving end of the serial configuration lanes.
pub trait ShiftSink: Send + Sync {
    /// Clock one data bit in on `channel`.
    fn shift_bit(&self, channel: usize, bit: bool);
}

/// A controller-side signal change, as seen by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// Enable line driven.
    Enable(bool),
    /// Clock / strobe line driven.
    Clock(bool),
    /// Reset line driven (`true` = asserted).
    Reset(bool),
}

#[derive(Debug)]
struct DeviceInner {
    logic: Compilation,
    expected: Vec<ConfigWord>,
    lanes: BTreeMap<usize, Vec<bool>>,
    enabled: bool,
    address: (State, Code),
    signals: Vec<Signal>,
}

impl DeviceInner {
    fn received(&self) -> Vec<ConfigWord> {
        self.lanes
            .values()
            .flat_map(|bits| {
                bits.chunks_exact(8).map(|byte| {
                    byte.iter()
                        .enumerate()
                        .fold(0u8, |acc, (k, &bit)| acc | (u8::from(bit) << k))
                })
            })
            .collect()
    }

    fn configured(&self) -> bool {
        self.received() == self.expected
    }
}

/// Shared handle to a simulated device.
#[derive(Debug, Clone)]
pub struct SimulatedPal {
    inner: Arc<Mutex<DeviceInner>>,
}

impl SimulatedPal {
    /// A blank device that will only come alive when loaded with `record`.
    pub fn new(record: &ConfigurationRecord) -> Self {
        let inner = DeviceInner {
            logic: compile_target(record.source()),
            expected: record.words().to_vec(),
            lanes: BTreeMap::new(),
            enabled: false,
            address: (State::INITIAL, Code::DEFAULT),
            signals: Vec::new(),
        };
        Self {
            inner: Arc::new(Mutex::new(inner)),
        }
    }

    /// Bytes rebuilt from the lanes so far, in channel order.
    pub fn received(&self) -> Vec<ConfigWord> {
        self.inner.lock().received()
    }

    /// Whether the received stream equals the expected configuration.
    pub fn is_configured(&self) -> bool {
        self.inner.lock().configured()
    }

    /// Whether enable is high.
    pub fn is_enabled(&self) -> bool {
        self.inner.lock().enabled
    }

    /// Every control signal change since construction.
    pub fn signals(&self) -> Vec<Signal> {
        self.inner.lock().signals.clone()
    }
}

impl DeviceControl for SimulatedPal {
    fn set_enable(&mut self, high: bool) {
        let mut inner = self.inner.lock();
        inner.enabled = high;
        inner.signals.push(Signal::Enable(high));
    }

    fn set_clock(&mut self, high: bool) {
        self.inner.lock().signals.push(Signal::Clock(high));
    }

    fn set_reset(&mut self, asserted: bool) {
        let mut inner = self.inner.lock();
        if asserted {
            inner.lanes.clear();
        }
        inner.signals.push(Signal::Reset(asserted));
    }
}

impl DeviceProbe for SimulatedPal {
    fn present(&mut self, state: State, code: Code) {
        self.inner.lock().address = (state, code);
    }

    fn outputs(&self) -> DeviceOutputs {
        let inner = self.inner.lock();
        if !inner.enabled || !inner.configured() {
            return DeviceOutputs::default();
        }
        let (state, code) = inner.address;
        inner.logic.evaluate(state, code)
    }
}

impl ShiftSink for SimulatedPal {
    fn shift_bit(&self, channel: usize, bit: bool) {
        self.inner.lock().lanes.entry(channel).or_default().push(bit);
    }
}
