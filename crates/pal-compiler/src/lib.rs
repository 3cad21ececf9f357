//! # pal-compiler: String-to-FSM Compiler
//!
//! Turns a target string into the two-level logic of a cyclic 8-state
//! exact-match recognizer, and serializes that logic as equation text for
//! the external bitstream assembler.
//!
//! ## Pipeline
//!
//! ```text
//! "HI" ──compile()──▶ Compilation { terms: [T0, T1], outputs: [O0..O4] } ──emit()──▶ text
//! ```
//!
//! - **compile** (`compile.rs`): one product term per character, each
//!   matching the (state, code) pair at that step; membership of every term
//!   in the five output equations is decided once and returned by value.
//! - **emit** (`emit.rs`): deterministic, order-preserving text rendering.
//!
//! ## Design
//!
//! There is no accumulator shared between compilations. Every call builds
//! its own [`Compilation`], so two compilations of the same string are
//! structurally identical and nothing leaks between them.

pub mod compile;
pub mod emit;

pub use compile::{
    compile, compile_target, Compilation, InputLine, Literal, OutputBits, OutputEquation,
    OutputKind, ProductTerm,
};
pub use emit::emit;
