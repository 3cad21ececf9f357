//! # FSM Compiler
//!
//! Compiles a target string into product terms and output equations.
//!
//! ## Algorithm
//!
//! Starting from state 0, character `i` of the string yields product term
//! `Ti`, the conjunction of the current state's three bits and the
//! character's five code bits. The term then joins:
//!
//! - `O0`..`O2` (next-state bits) for every 1 bit of `(state + 1) mod 8`,
//! - `O3` (valid) always,
//! - `O4` (done) only for the last character.
//!
//! A wrong symbol matches no term, so every output reads 0 and the
//! controller falls back to state 0 for the next step.
//!
//! ## Input Lines
//!
//! ```text
//!  I7  I6  I5 | I4  I3  I2  I1  I0
//! s2  s1  s0  | c4  c3  c2  c1  c0
//! ```

use pal_core::{Code, CompileError, State, TargetString};
use serde::Serialize;

/// One of the eight device input lines, `I0`..`I7`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct InputLine(u8);

impl InputLine {
    /// Number of input lines a product term spans.
    pub const COUNT: usize = 8;

    /// Input line `n`, if it exists.
    pub fn new(n: u8) -> Option<Self> {
        ((n as usize) < Self::COUNT).then_some(Self(n))
    }

    /// Line number.
    pub fn number(self) -> u8 {
        self.0
    }

    /// Line carrying state bit `k`.
    fn state_bit(k: u32) -> Self {
        Self(Code::BITS as u8 + k as u8)
    }

    /// Line carrying code bit `k`.
    fn code_bit(k: u32) -> Self {
        Self(k as u8)
    }
}

impl std::fmt::Display for InputLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "I{}", self.0)
    }
}

/// An affirmative or negated reference to an input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Literal {
    /// The referenced line.
    pub line: InputLine,
    /// `true` for `In`, `false` for `~In`.
    pub asserted: bool,
}

/// One AND-of-literals term, matching one (state, symbol) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductTerm {
    index: usize,
    state: State,
    symbol: char,
    code: Code,
    next_state: State,
}

impl ProductTerm {
    fn new(index: usize, state: State, symbol: char, code: Code) -> Self {
        Self {
            index,
            state,
            symbol,
            code,
            next_state: state.next(),
        }
    }

    /// Position of the originating character in the target string.
    pub fn index(&self) -> usize {
        self.index
    }

    /// State this term matches.
    pub fn state(&self) -> State {
        self.state
    }

    /// Symbol this term matches.
    pub fn symbol(&self) -> char {
        self.symbol
    }

    /// Code of the symbol this term matches.
    pub fn code(&self) -> Code {
        self.code
    }

    /// State the recognizer moves to when this term fires.
    pub fn next_state(&self) -> State {
        self.next_state
    }

    /// The eight literals, state bits high-to-low then code bits high-to-low.
    pub fn literals(&self) -> [Literal; InputLine::COUNT] {
        let state_bits = (0..State::BITS).rev().map(|k| Literal {
            line: InputLine::state_bit(k),
            asserted: self.state.bit(k),
        });
        let code_bits = (0..Code::BITS).rev().map(|k| Literal {
            line: InputLine::code_bit(k),
            asserted: self.code.bit(k),
        });
        let mut out = [Literal {
            line: InputLine(0),
            asserted: false,
        }; InputLine::COUNT];
        for (slot, lit) in out.iter_mut().zip(state_bits.chain(code_bits)) {
            *slot = lit;
        }
        out
    }

    /// Whether the term is true for the given inputs.
    pub fn matches(&self, state: State, code: Code) -> bool {
        self.state == state && self.code == code
    }
}

/// The five device outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum OutputKind {
    /// Bit 0 of the next state (`O0`).
    NextStateBit0,
    /// Bit 1 of the next state (`O1`).
    NextStateBit1,
    /// Bit 2 of the next state (`O2`).
    NextStateBit2,
    /// A known (state, symbol) pair was presented (`O3`).
    Valid,
    /// The final character was accepted (`O4`).
    Done,
}

impl OutputKind {
    /// All outputs in register order.
    pub const ALL: [OutputKind; 5] = [
        Self::NextStateBit0,
        Self::NextStateBit1,
        Self::NextStateBit2,
        Self::Valid,
        Self::Done,
    ];

    /// Bit position in the combined output register, and the `On` name.
    pub fn index(self) -> usize {
        match self {
            Self::NextStateBit0 => 0,
            Self::NextStateBit1 => 1,
            Self::NextStateBit2 => 2,
            Self::Valid => 3,
            Self::Done => 4,
        }
    }

    /// Membership rule for a term of a string with `len` characters.
    fn includes(self, term: &ProductTerm, len: usize) -> bool {
        match self {
            Self::NextStateBit0 => term.next_state.bit(0),
            Self::NextStateBit1 => term.next_state.bit(1),
            Self::NextStateBit2 => term.next_state.bit(2),
            Self::Valid => true,
            Self::Done => term.index + 1 == len,
        }
    }
}

impl std::fmt::Display for OutputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "O{}", self.index())
    }
}

/// An OR over a subset of product terms, referenced by ascending index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputEquation {
    kind: OutputKind,
    terms: Vec<usize>,
}

impl OutputEquation {
    /// Which output this equation drives.
    pub fn kind(&self) -> OutputKind {
        self.kind
    }

    /// Member term indices, ascending. Empty means constant 0.
    pub fn terms(&self) -> &[usize] {
        &self.terms
    }
}

/// The combined output register: next state in bits 0..=2, valid in bit 3,
/// done in bit 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct OutputBits(u8);

impl OutputBits {
    /// Wrap a raw register value (bits above 4 are dropped).
    pub fn from_raw(raw: u8) -> Self {
        Self(raw & 0b1_1111)
    }

    /// The raw 5-bit value.
    pub fn raw(self) -> u8 {
        self.0
    }

    /// Next-state field.
    pub fn state(self) -> State {
        State::from_bits(self.0)
    }

    /// Valid bit.
    pub fn valid(self) -> bool {
        self.0 & (1 << OutputKind::Valid.index()) != 0
    }

    /// Done bit.
    pub fn done(self) -> bool {
        self.0 & (1 << OutputKind::Done.index()) != 0
    }
}

/// Result of compiling one target string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Compilation {
    target: TargetString,
    terms: Vec<ProductTerm>,
    outputs: Vec<OutputEquation>,
}

impl Compilation {
    /// The (uppercased) source string.
    pub fn target(&self) -> &TargetString {
        &self.target
    }

    /// Product terms, one per character, in input order.
    pub fn terms(&self) -> &[ProductTerm] {
        &self.terms
    }

    /// The five output equations, `O0`..`O4`.
    pub fn outputs(&self) -> &[OutputEquation] {
        &self.outputs
    }

    /// The equation driving `kind`.
    pub fn output(&self, kind: OutputKind) -> &OutputEquation {
        &self.outputs[kind.index()]
    }

    /// Evaluate the sum-of-products logic for one input presentation.
    pub fn evaluate(&self, state: State, code: Code) -> OutputBits {
        let raw = self
            .outputs
            .iter()
            .filter(|eq| eq.terms.iter().any(|&t| self.terms[t].matches(state, code)))
            .fold(0u8, |acc, eq| acc | (1 << eq.kind.index()));
        OutputBits(raw)
    }
}

/// Validate and compile a raw string.
pub fn compile(raw: &str) -> Result<Compilation, CompileError> {
    let target = TargetString::parse(raw)?;
    Ok(compile_target(&target))
}

/// Compile an already validated target string. Never fails.
pub fn compile_target(target: &TargetString) -> Compilation {
    let mut state = State::INITIAL;
    let mut terms = Vec::with_capacity(target.len());
    for (index, (symbol, code)) in target.codes().enumerate() {
        let term = ProductTerm::new(index, state, symbol, code);
        tracing::debug!(
            term = index,
            state = %state,
            symbol = %symbol,
            code = %code,
            next = %term.next_state,
            "product term"
        );
        state = term.next_state;
        terms.push(term);
    }

    let len = terms.len();
    let outputs = OutputKind::ALL
        .iter()
        .map(|&kind| OutputEquation {
            kind,
            terms: terms
                .iter()
                .filter(|t| kind.includes(t, len))
                .map(ProductTerm::index)
                .collect(),
        })
        .collect();

    Compilation {
        target: target.clone(),
        terms,
        outputs,
    }
}
