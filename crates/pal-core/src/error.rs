//! # Error Types: Structured Error Hierarchy
//!
//! One error enum per pipeline stage, all derived with `thiserror`, plus the
//! top-level [`PalError`] that wraps them for callers that span stages.
//!
//! ## Taxonomy
//!
//! - Compile rejections (too long, unsupported symbol) pre-empt all
//!   downstream work.
//! - Collaborator failures mean the external bitstream assembler produced
//!   nothing usable. They are never retried: the assembler is deterministic.
//! - Shape mismatches abort a transfer before any device signal is touched.
//! - Registry misses and key collisions are reported, never papered over.
//!
//! A failed conformance check is a test result, not an error, and has no
//! variant here.

use thiserror::Error;

/// Top-level error type for the PAL toolchain.
#[derive(Error, Debug)]
pub enum PalError {
    /// The target string was rejected before compilation.
    #[error("compile rejected: {0}")]
    Compile(#[from] CompileError),

    /// The external assembler output could not be turned into a record.
    #[error("record error: {0}")]
    Record(#[from] RecordError),

    /// Registry lookup or registration failed.
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    /// The configuration transfer could not be performed.
    #[error("loader error: {0}")]
    Loader(#[from] LoaderError),

    /// Settings could not be loaded or are inconsistent.
    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Rejection of a target string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// More symbols than the recognizer has product terms for.
    #[error("string is {len} characters long; at most {max} are supported")]
    TooLong {
        /// Length after case normalization.
        len: usize,
        /// Maximum supported length.
        max: usize,
    },

    /// An empty string has no product terms and can never assert `done`.
    #[error("string is empty")]
    Empty,

    /// A symbol outside the 32-symbol alphabet.
    #[error("character {symbol:?} at position {position} is not supported")]
    UnsupportedSymbol {
        /// The offending symbol (after case normalization).
        symbol: char,
        /// Zero-based position in the string.
        position: usize,
    },
}

/// Failure turning assembler output into a configuration record.
#[derive(Error, Debug)]
pub enum RecordError {
    /// No `'prog'` line in the assembler output.
    #[error("assembler output contains no 'prog' entry")]
    MissingCompiledOutput,

    /// A `'prog'` line was present but its word list is unusable.
    #[error("malformed assembler output: {0}")]
    MalformedExternalOutput(String),

    /// The assembler could not be run or exited unsuccessfully.
    #[error("assembler failed: {0}")]
    Assembler(String),

    /// A persisted module could not be read or written.
    #[error("persisted module error: {0}")]
    Persist(String),

    /// The stored message of a record no longer compiles.
    #[error("record message rejected: {0}")]
    Message(#[from] CompileError),
}

/// Failure registering or looking up configuration records.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// No record under the requested id or key.
    #[error("configuration {0} not found")]
    NotFound(String),

    /// The numeric id is already taken.
    #[error("configuration id {0} is already registered")]
    DuplicateId(u32),

    /// Two distinct messages derive the same lookup key.
    #[error("key {key:?} for {incoming:?} collides with existing record {existing:?}")]
    KeyCollision {
        /// The derived key.
        key: String,
        /// Message already registered under the key.
        existing: String,
        /// Message that was being registered.
        incoming: String,
    },
}

/// Failure of a configuration transfer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoaderError {
    /// The record's word count does not match the configuration length.
    #[error("configuration has {actual} words; exactly {expected} are required")]
    ShapeMismatch {
        /// Configuration length the loader streams.
        expected: usize,
        /// Words present in the record.
        actual: usize,
    },

    /// The delivery channels cannot hold a full configuration.
    #[error("{channels} channels x quota {quota} cannot hold {required} words")]
    InsufficientCapacity {
        /// Number of delivery channels.
        channels: usize,
        /// Per-channel quota.
        quota: usize,
        /// Words per configuration.
        required: usize,
    },

    /// The primary channel index is outside the channel bank.
    #[error("primary channel {primary} out of range for {channels} channels")]
    NoSuchChannel {
        /// Requested channel.
        primary: usize,
        /// Number of channels available.
        channels: usize,
    },

    /// A previous programming pass is still shifting data.
    #[error("a programming pass is still in progress")]
    PassInProgress,

    /// The sequencer bank refused a word or the commit signal.
    #[error("sequencer fault: {0}")]
    Sequencer(String),
}

/// Failure loading [`crate::PalSettings`].
#[derive(Error, Debug)]
pub enum SettingsError {
    /// The settings file could not be read.
    #[error("cannot read settings file: {0}")]
    Io(#[from] std::io::Error),

    /// The settings file is not valid YAML for the settings schema.
    #[error("cannot parse settings file: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// An environment override is not a valid value.
    #[error("invalid value {value:?} for {var}")]
    InvalidEnv {
        /// Variable name.
        var: String,
        /// Offending value.
        value: String,
    },

    /// The values are individually valid but inconsistent.
    #[error("invalid settings: {0}")]
    Invalid(String),
}
