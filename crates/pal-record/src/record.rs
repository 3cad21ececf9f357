//! # Configuration Record Builder
//!
//! A [`ConfigurationRecord`] pairs the uppercased source string with the 28
//! opaque configuration words the assembler produced for it.
//!
//! ## Keys
//!
//! Records are named by a key derived from the message: lowercase, spaces
//! become `_`, and `'`, `!`, `.`, `-` are dropped. The derivation is lossy
//! (`"DON'T"` and `"DONT"` share a key); the registry rejects such
//! collisions rather than overwriting.

use std::path::Path;

use pal_compiler::{compile, emit, Compilation};
use pal_core::{ConfigWord, PalError, RecordError, TargetString, CONFIG_WORDS};

use crate::assembler::BitstreamAssembler;

/// The compiled, ready-to-program form of one target string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationRecord {
    source: TargetString,
    words: Vec<ConfigWord>,
    key: String,
}

impl ConfigurationRecord {
    /// Wrap a word list, which must hold exactly one configuration.
    pub fn new(source: TargetString, words: Vec<ConfigWord>) -> Result<Self, RecordError> {
        if words.len() != CONFIG_WORDS {
            return Err(RecordError::MalformedExternalOutput(format!(
                "expected {CONFIG_WORDS} configuration words, found {}",
                words.len()
            )));
        }
        let key = derive_key(&source);
        Ok(Self { source, words, key })
    }

    /// The uppercased message the record recognizes.
    pub fn source(&self) -> &TargetString {
        &self.source
    }

    /// The configuration words, in transfer order.
    pub fn words(&self) -> &[ConfigWord] {
        &self.words
    }

    /// Registry key derived from the message.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Name of the persisted accessor for this record.
    pub fn accessor_name(&self) -> String {
        accessor_name(&self.key)
    }
}

/// Derive the registry key for a message.
pub fn derive_key(source: &TargetString) -> String {
    source
        .as_str()
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, '\'' | '!' | '.' | '-'))
        .map(|c| if c == ' ' { '_' } else { c })
        .collect()
}

/// Accessor name under which a key is persisted.
pub fn accessor_name(key: &str) -> String {
    format!("{key}_config")
}

/// Locate the `'prog'` entry in assembler output and parse its word list.
pub fn extract_program(output: &str) -> Result<Vec<ConfigWord>, RecordError> {
    let line = output
        .lines()
        .map(str::trim)
        .find(|l| l.starts_with("'prog'"))
        .ok_or(RecordError::MissingCompiledOutput)?;

    let open = line
        .find('[')
        .ok_or_else(|| malformed(format!("no '[' in {line:?}")))?;
    let close = line
        .rfind(']')
        .filter(|&close| close > open)
        .ok_or_else(|| malformed(format!("no closing ']' in {line:?}")))?;

    line[open + 1..close]
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(parse_word)
        .collect()
}

fn parse_word(item: &str) -> Result<ConfigWord, RecordError> {
    let value = match item
        .strip_prefix("0x")
        .or_else(|| item.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => item.parse::<u64>(),
    }
    .map_err(|_| malformed(format!("{item:?} is not an integer")))?;

    ConfigWord::try_from(value)
        .map_err(|_| malformed(format!("{item} does not fit a configuration word")))
}

fn malformed(msg: String) -> RecordError {
    RecordError::MalformedExternalOutput(msg)
}

/// Build a record from a source string and the assembler's output.
pub fn build(source: &TargetString, assembler_output: &str) -> Result<ConfigurationRecord, RecordError> {
    let words = extract_program(assembler_output)?;
    ConfigurationRecord::new(source.clone(), words)
}

/// Run the whole compile pipeline: compile `raw`, write the equation text
/// to `equations`, run the assembler on it, and build the record.
pub fn compile_and_build(
    raw: &str,
    equations: &Path,
    assembler: &dyn BitstreamAssembler,
) -> Result<(Compilation, ConfigurationRecord), PalError> {
    let compilation = compile(raw)?;
    std::fs::write(equations, emit(&compilation))?;
    tracing::info!(path = %equations.display(), terms = compilation.terms().len(), "wrote equations");

    let output = assembler.assemble(equations)?;
    let record = build(compilation.target(), &output)?;
    tracing::info!(key = record.key(), words = record.words().len(), "built configuration record");
    Ok((compilation, record))
}
