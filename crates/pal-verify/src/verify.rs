//! # Single Verification Run
//!
//! A run walks `msg` symbol by symbol from state 0. Symbols outside the
//! code table are presented as code 0 rather than rejected, which drives
//! the device down its mismatch path.
//!
//! | outputs read | next local state | trail |
//! |--------------|------------------|-------|
//! | valid        | device's state   | ✅    |
//! | not valid    | 0                | ❌    |
//!
//! `done` seen on any valid step marks the string as recognized.

use std::fmt;

use pal_core::{lookup_or_default, Code, State};
use pal_record::ConfigurationRecord;
use serde::Serialize;

use crate::probe::{DeviceOutputs, DeviceProbe};

/// One presented symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Step {
    /// The probe symbol.
    pub symbol: char,
    /// Code presented (0 for symbols outside the table).
    pub code: Code,
    /// State presented.
    pub state: State,
    /// Register read back.
    pub outputs: DeviceOutputs,
}

impl Step {
    /// Whether the device asserted `valid` for this step.
    pub fn passed(&self) -> bool {
        self.outputs.valid()
    }
}

/// A nonzero register reading found by the diagnostic sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DiagnosticReading {
    /// State presented.
    pub state: State,
    /// Code presented.
    pub code: Code,
    /// Register read back.
    pub outputs: DeviceOutputs,
}

impl fmt::Display for DiagnosticReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "S:{} I:{:02x}  O:{:02x}",
            self.state.value(),
            self.code.value(),
            self.outputs.raw()
        )
    }
}

/// Why a run failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Failure {
    /// The record's own message never asserted `done`.
    MissedRecognition,
    /// A decoy asserted `done`.
    FalseRecognition,
}

/// Outcome of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// The device behaved as expected.
    Pass,
    /// The device did not.
    Fail(Failure),
}

/// Everything one run observed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationReport {
    /// String the device was programmed for.
    pub expected: String,
    /// Probe string.
    pub msg: String,
    /// Whether `msg` was expected to be recognized.
    pub should_match: bool,
    /// One entry per symbol of `msg`.
    pub steps: Vec<Step>,
    /// Whether `done` was asserted on any valid step.
    pub done_seen: bool,
    /// Result.
    pub verdict: Verdict,
    /// Nonzero readings from the exhaustive sweep. Only populated on a
    /// missed recognition.
    pub diagnostics: Vec<DiagnosticReading>,
}

impl VerificationReport {
    /// Whether the verdict is [`Verdict::Pass`].
    pub fn passed(&self) -> bool {
        self.verdict == Verdict::Pass
    }

    /// Steps where `valid` was not asserted.
    pub fn failed_steps(&self) -> usize {
        self.steps.iter().filter(|s| !s.passed()).count()
    }

    /// The per-step trail, one `<symbol> ✅` / `<symbol> ❌` line each.
    pub fn trail(&self) -> String {
        self.steps
            .iter()
            .map(|s| format!("{} {}", s.symbol, if s.passed() { '✅' } else { '❌' }))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for VerificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let expectation = if self.should_match { "match" } else { "no match" };
        writeln!(f, "{:?} (expect {expectation})", self.msg)?;
        if !self.steps.is_empty() {
            writeln!(f, "{}", self.trail())?;
        }
        match self.verdict {
            Verdict::Pass => writeln!(f, "PASS")?,
            Verdict::Fail(Failure::MissedRecognition) => {
                writeln!(f, "FAIL: {:?} was not recognized", self.msg)?;
                writeln!(f, "diagnostics ({} nonzero readings):", self.diagnostics.len())?;
                for reading in &self.diagnostics {
                    writeln!(f, "{reading}")?;
                }
            }
            Verdict::Fail(Failure::FalseRecognition) => {
                writeln!(f, "FAIL: decoy {:?} was recognized as {:?}", self.msg, self.expected)?;
            }
        }
        Ok(())
    }
}

/// Probe `device`, which has been programmed with `record`, with `msg`.
pub fn verify<P: DeviceProbe + ?Sized>(
    device: &mut P,
    record: &ConfigurationRecord,
    msg: &str,
    should_match: bool,
) -> VerificationReport {
    let mut state = State::INITIAL;
    let mut done_seen = false;
    let mut steps = Vec::with_capacity(msg.len());

    for symbol in msg.chars() {
        let code = lookup_or_default(symbol);
        let outputs = device.probe(state, code);
        steps.push(Step {
            symbol,
            code,
            state,
            outputs,
        });
        if outputs.valid() {
            state = outputs.state();
            done_seen |= outputs.done();
        } else {
            state = State::INITIAL;
        }
    }

    let verdict = match (should_match, done_seen) {
        (true, false) => Verdict::Fail(Failure::MissedRecognition),
        (false, true) => Verdict::Fail(Failure::FalseRecognition),
        _ => Verdict::Pass,
    };

    let diagnostics = if verdict == Verdict::Fail(Failure::MissedRecognition) {
        diagnostic_sweep(device)
    } else {
        Vec::new()
    };

    match verdict {
        Verdict::Pass => tracing::info!(msg, should_match, "verification passed"),
        Verdict::Fail(failure) => tracing::warn!(
            msg,
            expected = record.source().as_str(),
            ?failure,
            "verification failed"
        ),
    }

    VerificationReport {
        expected: record.source().as_str().to_string(),
        msg: msg.to_string(),
        should_match,
        steps,
        done_seen,
        verdict,
        diagnostics,
    }
}

/// Present every `(state, code)` pair and keep the nonzero readings.
pub fn diagnostic_sweep<P: DeviceProbe + ?Sized>(device: &mut P) -> Vec<DiagnosticReading> {
    let mut readings = Vec::new();
    for state in State::all() {
        for code in Code::all() {
            let outputs = device.probe(state, code);
            if outputs.raw() != 0 {
                let reading = DiagnosticReading {
                    state,
                    code,
                    outputs,
                };
                tracing::warn!(%reading, "diagnostic reading");
                readings.push(reading);
            }
        }
    }
    readings
}
