//! # Code Table
//!
//! The fixed mapping from the 32-symbol alphabet to 5-bit codes.
//!
//! ```text
//! ' '  → 0
//! 'A'..'Z' → 1..26
//! '!' → 27   '-' → 28   '.' → 29   '_' → 30   '\'' → 31
//! ```
//!
//! The table is injective and total over 0..=31, so every code has exactly
//! one symbol and the reverse lookup never fails.

use serde::{Deserialize, Serialize};

/// Number of symbols in the alphabet (and distinct codes).
pub const SYMBOL_COUNT: usize = 32;

/// A 5-bit input code for one alphabet symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Code(u8);

impl Code {
    /// Number of bits in a code.
    pub const BITS: u32 = 5;

    /// Largest valid code value.
    pub const MAX: u8 = 31;

    /// The code presented for symbols outside the table during testing.
    pub const DEFAULT: Code = Code(0);

    /// Build a code from its raw value, rejecting anything wider than 5 bits.
    pub fn new(value: u8) -> Option<Self> {
        (value <= Self::MAX).then_some(Self(value))
    }

    /// The raw 5-bit value.
    pub fn value(self) -> u8 {
        self.0
    }

    /// Bit `k` of the code (0 = least significant).
    pub fn bit(self, k: u32) -> bool {
        (self.0 >> k) & 1 == 1
    }

    /// Every code, in ascending order.
    pub fn all() -> impl Iterator<Item = Code> {
        (0..=Self::MAX).map(Code)
    }
}

impl TryFrom<u8> for Code {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Code::new(value).ok_or_else(|| format!("code {value} exceeds {}", Code::MAX))
    }
}

impl From<Code> for u8 {
    fn from(code: Code) -> u8 {
        code.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The alphabet, indexed by code.
pub const CODE_TABLE: [char; SYMBOL_COUNT] = [
    ' ', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R',
    'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', '!', '-', '.', '_', '\'',
];

/// Look up the code for a symbol. Symbols are matched exactly; callers
/// uppercase first.
pub fn lookup(symbol: char) -> Option<Code> {
    match symbol {
        ' ' => Some(Code(0)),
        'A'..='Z' => Some(Code(symbol as u8 - b'A' + 1)),
        '!' => Some(Code(27)),
        '-' => Some(Code(28)),
        '.' => Some(Code(29)),
        '_' => Some(Code(30)),
        '\'' => Some(Code(31)),
        _ => None,
    }
}

/// Best-effort lookup used when probing a device: unknown symbols map to
/// [`Code::DEFAULT`] so they drive the mismatch path instead of aborting.
pub fn lookup_or_default(symbol: char) -> Code {
    lookup(symbol).unwrap_or(Code::DEFAULT)
}

/// The symbol a code stands for.
pub fn symbol_for(code: Code) -> char {
    CODE_TABLE[code.0 as usize]
}
