//! `palc verify`: program the simulated board with a persisted record and
//! run the conformance suite.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use pal_core::PalSettings;
use pal_record::{PersistedModule, RegistryBuilder};
use pal_verify::{run_suite, SuiteReport, DEFAULT_DECOYS};

use crate::{EXIT_FAILURE, EXIT_OK};

/// Arguments for `palc verify`.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Persisted module holding the record.
    pub module: PathBuf,

    /// Record id within the module (accessor-name order, from 0).
    #[arg(long, conflicts_with = "key")]
    pub id: Option<u32>,

    /// Record key (e.g. `hello_world`).
    #[arg(long)]
    pub key: Option<String>,

    /// Decoy string expected NOT to be recognized. Repeatable; defaults to
    /// DUBIOUS, NOPE! and DON'T BOTHER.
    #[arg(long = "decoy")]
    pub decoys: Vec<String>,

    /// Print the suite report as JSON instead of the step trail.
    #[arg(long)]
    pub json: bool,
}

/// Execute `palc verify`.
pub fn run_verify(args: &VerifyArgs, settings: &PalSettings) -> Result<u8> {
    let module = PersistedModule::read(&args.module)
        .with_context(|| format!("failed to open module {}", args.module.display()))?;
    let mut builder = RegistryBuilder::new();
    builder.register_module(&module)?;
    let registry = builder.build();

    let by_key = args
        .key
        .as_deref()
        .map(|key| registry.get_by_key(key))
        .transpose()?;
    let id = match (args.id, by_key) {
        (None, None) => Some(0),
        (id, _) => id,
    };
    let record = registry
        .resolve(id, by_key)
        .with_context(|| format!("no such record in {}", args.module.display()))?;

    let decoys: Vec<&str> = if args.decoys.is_empty() {
        DEFAULT_DECOYS.to_vec()
    } else {
        args.decoys.iter().map(String::as_str).collect()
    };

    let (mut device, mut loader) = pal_sim::rig(record, settings)?;
    let suite = run_suite(&mut device, &mut loader, record, &decoys)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&suite)?);
    } else {
        print_suite(&suite);
    }

    if suite.passed() {
        Ok(EXIT_OK)
    } else {
        Ok(EXIT_FAILURE)
    }
}

fn print_suite(suite: &SuiteReport) {
    println!(
        "programmed {} words across {} channels",
        suite.pass.words,
        suite.pass.per_channel.len()
    );
    println!();
    for report in &suite.reports {
        println!("{report}");
    }
    println!(
        "{} of {} runs passed",
        suite.reports.len() - suite.failures(),
        suite.reports.len()
    );
}
