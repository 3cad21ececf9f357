//! # pal-verify: Conformance Tester
//!
//! Drives a programmed device one symbol at a time and checks that it
//! recognizes its own string and nothing else.
//!
//! - **probe** (`probe.rs`): the read side of the device: present an
//!   `(state, code)` address, read the combined output register.
//! - **verify** (`verify.rs`): one probe run, its per-step trail, the
//!   verdict, and the exhaustive diagnostic sweep on a missed recognition.
//! - **suite** (`suite.rs`): program, then verify the record's own message
//!   and a list of decoys.
//!
//! A failed verification is a result, not an error: it comes back as
//! [`Verdict::Fail`] inside a [`VerificationReport`].

pub mod probe;
pub mod suite;
pub mod verify;

pub use probe::{DeviceOutputs, DeviceProbe};
pub use suite::{run_suite, SuiteReport, DEFAULT_DECOYS};
pub use verify::{diagnostic_sweep, verify, DiagnosticReading, Failure, Step, VerificationReport, Verdict};
