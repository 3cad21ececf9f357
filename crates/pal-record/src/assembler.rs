//! # Bitstream Assembler Seam
//!
//! The minimizer / bitstream assembler is an external tool. It reads the
//! equation file and reports, among other lines, one of the form
//!
//! ```text
//! 'prog' : [0x1f, 0x00, ...],
//! ```
//!
//! This module only runs it and hands back its output; parsing lives in
//! [`crate::record::extract_program`].

use std::path::Path;
use std::process::Command;

use pal_core::RecordError;

/// Turns an equation file into the assembler's textual result.
pub trait BitstreamAssembler {
    /// Run the assembler on `equations` and return its output.
    fn assemble(&self, equations: &Path) -> Result<String, RecordError>;
}

/// Runs an external command, appending the equation file path as the last
/// argument, and captures its standard output.
#[derive(Debug, Clone)]
pub struct CommandAssembler {
    program: String,
    args: Vec<String>,
}

impl CommandAssembler {
    /// Build from a full command line (`program arg...`).
    pub fn from_command_line(parts: &[String]) -> Result<Self, RecordError> {
        let (program, args) = parts
            .split_first()
            .ok_or_else(|| RecordError::Assembler("empty assembler command".to_string()))?;
        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }

    /// The executable that will be invoked.
    pub fn program(&self) -> &str {
        &self.program
    }
}

impl BitstreamAssembler for CommandAssembler {
    fn assemble(&self, equations: &Path) -> Result<String, RecordError> {
        tracing::info!(program = %self.program, equations = %equations.display(), "running bitstream assembler");
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(equations)
            .output()
            .map_err(|e| RecordError::Assembler(format!("cannot run {}: {e}", self.program)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RecordError::Assembler(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
