//! # Equation Emitter
//!
//! Renders a [`Compilation`] as the line-oriented equation text the
//! bitstream assembler consumes:
//!
//! ```text
//! T0  = ~I7 & ~I6 & ~I5 & ~I4 &  I3 & ~I2 & ~I1 & ~I0      # S:0  H (8)
//! T1  = ~I7 & ~I6 &  I5 & ~I4 &  I3 & ~I2 & ~I1 &  I0      # S:1  I (9)
//!
//! O0 = T0
//! O1 = T1
//! O2 =
//! O3 = T0 | T1
//! O4 = T1
//! ```
//!
//! The trailing `#` comment is ignored by the assembler. An output with no
//! member terms is written with an empty right-hand side.

use std::fmt::Write;

use crate::compile::{Compilation, Literal, ProductTerm};

/// Serialize a compilation to equation text.
pub fn emit(compilation: &Compilation) -> String {
    let mut out = String::new();
    for term in compilation.terms() {
        push_term(&mut out, term);
    }
    out.push('\n');
    for eq in compilation.outputs() {
        let rhs = eq
            .terms()
            .iter()
            .map(|t| format!("T{t}"))
            .collect::<Vec<_>>()
            .join(" | ");
        // Infallible: writing to a String.
        let _ = writeln!(out, "{} = {rhs}", eq.kind());
    }
    out
}

fn push_term(out: &mut String, term: &ProductTerm) {
    let _ = write!(out, "T{:<2} = ", term.index());
    for (i, lit) in term.literals().iter().enumerate() {
        if i > 0 {
            out.push_str(" & ");
        }
        push_literal(out, lit);
    }
    let _ = writeln!(
        out,
        "      # S:{}  {} ({})",
        term.state(),
        term.symbol(),
        term.code()
    );
}

fn push_literal(out: &mut String, lit: &Literal) {
    out.push(if lit.asserted { ' ' } else { '~' });
    let _ = write!(out, "{}", lit.line);
}
