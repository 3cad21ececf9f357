//! # pal-record: Configuration Records
//!
//! Wraps the configuration words returned by the external bitstream
//! assembler, together with the string they were compiled from, into named
//! [`ConfigurationRecord`]s, and keeps them in a read-only registry.
//!
//! ## Modules
//!
//! - **assembler** (`assembler.rs`): the seam to the external minimizer /
//!   bitstream tool. Equation text in, textual result out.
//! - **record** (`record.rs`): extracting the `'prog'` word list, key
//!   derivation, and the compile → emit → assemble → record pipeline.
//! - **persist** (`persist.rs`): the JSON module format shared between a
//!   compile session and later programming sessions.
//! - **registry** (`registry.rs`): id- and key-indexed lookup, built once
//!   and frozen. Key collisions are rejected.

pub mod assembler;
pub mod persist;
pub mod record;
pub mod registry;

pub use assembler::{BitstreamAssembler, CommandAssembler};
pub use persist::{module_path_for, PersistedModule, PersistedRecord};
pub use record::{accessor_name, build, compile_and_build, derive_key, extract_program, ConfigurationRecord};
pub use registry::{ConfigRegistry, RegistryBuilder};
