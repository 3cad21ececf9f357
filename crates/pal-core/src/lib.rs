#![deny(missing_docs)]

//! # pal-core: Foundational Types for the PAL String Detector
//!
//! Every other crate in the workspace depends on `pal-core`; it depends on
//! nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtypes for bounded integers.** `Code` (0..=31) and `State` (0..=7)
//!    can only be built through checked constructors, so a 6-bit code or a
//!    9th state cannot reach the compiler or the device.
//!
//! 2. **Validated `TargetString`.** Length and alphabet are checked once, at
//!    construction. Downstream code never re-validates.
//!
//! 3. **One static code table.** `CODE_TABLE` is the single alphabet
//!    definition shared by the compiler and the conformance tester.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `pal-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod code_table;
pub mod error;
pub mod settings;
pub mod target;

pub use code_table::{lookup, lookup_or_default, symbol_for, Code, CODE_TABLE, SYMBOL_COUNT};
pub use error::{CompileError, LoaderError, PalError, RecordError, RegistryError, SettingsError};
pub use settings::{PalSettings, MAX_CHANNELS, MAX_QUOTA};
pub use target::{ConfigWord, State, TargetString, CONFIG_WORDS, MAX_TARGET_LEN, STATE_COUNT};
