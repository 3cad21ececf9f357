//! Conformance suite: program once, then probe the record's own message
//! and every decoy.

use pal_core::LoaderError;
use pal_loader::{DeviceControl, Loader, PassSummary, SequencerBank};
use pal_record::ConfigurationRecord;
use serde::Serialize;

use crate::probe::DeviceProbe;
use crate::verify::{verify, VerificationReport};

/// Decoys used when the caller supplies none.
pub const DEFAULT_DECOYS: [&str; 3] = ["DUBIOUS", "NOPE!", "DON'T BOTHER"];

/// Results of one suite run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuiteReport {
    /// The programming pass.
    #[serde(skip)]
    pub pass: PassSummary,
    /// The record's own message first, then one report per decoy.
    pub reports: Vec<VerificationReport>,
}

impl SuiteReport {
    /// Whether every run passed.
    pub fn passed(&self) -> bool {
        self.reports.iter().all(VerificationReport::passed)
    }

    /// Number of failed runs.
    pub fn failures(&self) -> usize {
        self.reports.iter().filter(|r| !r.passed()).count()
    }
}

/// Program `device` with `record`, wait for the sequencers to drain, then
/// verify the record's message (expected to match) and each decoy
/// (expected not to).
pub fn run_suite<D, B>(
    device: &mut D,
    loader: &mut Loader<B>,
    record: &ConfigurationRecord,
    decoys: &[&str],
) -> Result<SuiteReport, LoaderError>
where
    D: DeviceControl + DeviceProbe,
    B: SequencerBank,
{
    let pass = loader.program(device, record)?;
    loader.wait_idle()?;

    let mut reports = Vec::with_capacity(decoys.len() + 1);
    reports.push(verify(device, record, record.source().as_str(), true));
    for decoy in decoys {
        reports.push(verify(device, record, decoy, false));
    }

    let report = SuiteReport { pass, reports };
    tracing::info!(
        msg = record.source().as_str(),
        runs = report.reports.len(),
        failures = report.failures(),
        "conformance suite finished"
    );
    Ok(report)
}
