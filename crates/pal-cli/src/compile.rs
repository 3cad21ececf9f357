//! `palc compile` and `palc emit`.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use pal_compiler::{compile, emit};
use pal_core::{PalError, PalSettings};
use pal_record::{compile_and_build, module_path_for, CommandAssembler, PersistedModule};

use crate::{EXIT_OK, EXIT_REJECTED};

/// Arguments for `palc compile`.
#[derive(Args, Debug)]
pub struct CompileArgs {
    /// String to recognize: up to 11 symbols from A-Z, space, ! - . _ '
    pub string: String,

    /// Equation file to write. The persisted module is written next to it
    /// with a `.json` extension.
    pub output: PathBuf,

    /// Write the equations only; do not run the assembler.
    #[arg(long)]
    pub no_assemble: bool,
}

/// Arguments for `palc emit`.
#[derive(Args, Debug)]
pub struct EmitArgs {
    /// String to recognize.
    pub string: String,
}

/// Execute `palc compile`.
pub fn run_compile(args: &CompileArgs, settings: &PalSettings) -> Result<u8> {
    let module_path = module_path_for(&args.output);
    if module_path == args.output {
        bail!(
            "output {} would be overwritten by the persisted module; choose another extension",
            args.output.display()
        );
    }

    let command = match (&settings.assembler, args.no_assemble) {
        (Some(command), false) => Some(CommandAssembler::from_command_line(command)?),
        _ => None,
    };

    let Some(assembler) = command else {
        return write_equations_only(args);
    };

    let (compilation, record) = match compile_and_build(&args.string, &args.output, &assembler) {
        Ok(built) => built,
        Err(PalError::Compile(e)) => {
            eprintln!("error: {e}");
            return Ok(EXIT_REJECTED);
        }
        Err(e) => {
            return Err(e).with_context(|| format!("failed to build a record for {:?}", args.string))
        }
    };
    println!("equations: {} ({} terms)", args.output.display(), compilation.terms().len());

    let mut module = PersistedModule::new();
    let accessor = module.insert(&record);
    module
        .write(&module_path)
        .with_context(|| format!("failed to persist {}", module_path.display()))?;
    println!("record:    {accessor} -> {}", module_path.display());
    Ok(EXIT_OK)
}

fn write_equations_only(args: &CompileArgs) -> Result<u8> {
    let compilation = match compile(&args.string) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return Ok(EXIT_REJECTED);
        }
    };
    std::fs::write(&args.output, emit(&compilation))
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    println!("equations: {} ({} terms)", args.output.display(), compilation.terms().len());
    if !args.no_assemble {
        tracing::warn!("no assembler configured; skipping record generation");
    }
    Ok(EXIT_OK)
}

/// Execute `palc emit`.
pub fn run_emit(args: &EmitArgs) -> Result<u8> {
    match compile(&args.string) {
        Ok(compilation) => {
            print!("{}", emit(&compilation));
            Ok(EXIT_OK)
        }
        Err(e) => {
            eprintln!("error: {e}");
            Ok(EXIT_REJECTED)
        }
    }
}
