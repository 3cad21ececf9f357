//! `palc records`: list persisted records.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use pal_record::{ConfigRegistry, RegistryBuilder};

use crate::EXIT_OK;

/// Arguments for `palc records`.
#[derive(Args, Debug)]
pub struct RecordsArgs {
    /// Directory of persisted `*.json` modules.
    pub dir: PathBuf,
}

/// Load every module in `dir` into a registry. Ids are assigned in
/// file-name order, then accessor-name order within a file.
pub fn load_registry(dir: &std::path::Path) -> Result<ConfigRegistry> {
    let mut builder = RegistryBuilder::new();
    builder
        .register_dir(dir)
        .with_context(|| format!("failed to load records from {}", dir.display()))?;
    Ok(builder.build())
}

/// Execute `palc records`.
pub fn run_records(args: &RecordsArgs) -> Result<u8> {
    let registry = load_registry(&args.dir)?;
    if registry.is_empty() {
        println!("no records in {}", args.dir.display());
        return Ok(EXIT_OK);
    }
    println!("  {:>3}  {:<16} MESSAGE", "ID", "KEY");
    for (id, record) in registry.iter() {
        println!("  {id:>3}  {:<16} {}", record.key(), record.source());
    }
    println!();
    println!("Total: {} records", registry.len());
    Ok(EXIT_OK)
}
