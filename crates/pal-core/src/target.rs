//! # Target Strings and Recognizer States
//!
//! A [`TargetString`] is the validated input of the compiler: uppercase,
//! 1..=11 symbols, every symbol in the code table. A [`State`] is the
//! 3-bit progress counter of the recognizer, cycling 0 → 7 → 0.

use serde::{Deserialize, Serialize};

use crate::code_table::{lookup, Code};
use crate::error::CompileError;

/// Longest string the 8-state recognizer is compiled for.
pub const MAX_TARGET_LEN: usize = 11;

/// Number of recognizer states.
pub const STATE_COUNT: u8 = 8;

/// One configuration word as produced by the bitstream assembler.
pub type ConfigWord = u8;

/// Words in one complete device configuration.
pub const CONFIG_WORDS: usize = 28;

/// A 3-bit recognizer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct State(u8);

impl State {
    /// Number of bits in a state.
    pub const BITS: u32 = 3;

    /// Initial state, also the state a mismatch resets to.
    pub const INITIAL: State = State(0);

    /// Build a state from its raw value.
    pub fn new(value: u8) -> Option<Self> {
        (value < STATE_COUNT).then_some(Self(value))
    }

    /// Build a state from the low three bits of a device register.
    pub fn from_bits(raw: u8) -> Self {
        Self(raw & 0b111)
    }

    /// The raw value.
    pub fn value(self) -> u8 {
        self.0
    }

    /// Bit `k` of the state (0 = least significant).
    pub fn bit(self, k: u32) -> bool {
        (self.0 >> k) & 1 == 1
    }

    /// The successor state, wrapping 7 → 0.
    pub fn next(self) -> Self {
        Self((self.0 + 1) % STATE_COUNT)
    }

    /// Every state, in ascending order.
    pub fn all() -> impl Iterator<Item = State> {
        (0..STATE_COUNT).map(State)
    }
}

impl std::fmt::Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated, uppercase string the recognizer can be compiled for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TargetString(String);

impl TargetString {
    /// Normalize `raw` to uppercase and validate it.
    ///
    /// The length limit is checked first, then every symbol; the first
    /// unsupported symbol is reported.
    pub fn parse(raw: &str) -> Result<Self, CompileError> {
        let upper = raw.to_uppercase();
        if upper != raw {
            tracing::info!(original = raw, converted = %upper, "converted to uppercase");
        }

        let len = upper.chars().count();
        if len > MAX_TARGET_LEN {
            return Err(CompileError::TooLong {
                len,
                max: MAX_TARGET_LEN,
            });
        }
        if let Some((position, symbol)) = upper.chars().enumerate().find(|(_, c)| lookup(*c).is_none()) {
            return Err(CompileError::UnsupportedSymbol { symbol, position });
        }
        if len == 0 {
            return Err(CompileError::Empty);
        }
        Ok(Self(upper))
    }

    /// The normalized text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of symbols.
    pub fn len(&self) -> usize {
        self.0.chars().count()
    }

    /// Always false: construction rejects empty strings.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Symbols paired with their codes, in input order.
    pub fn codes(&self) -> impl Iterator<Item = (char, Code)> + '_ {
        self.0
            .chars()
            .filter_map(|c| lookup(c).map(|code| (c, code)))
    }
}

impl TryFrom<String> for TargetString {
    type Error = CompileError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        TargetString::parse(&value)
    }
}

impl From<TargetString> for String {
    fn from(target: TargetString) -> String {
        target.0
    }
}

impl std::fmt::Display for TargetString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_wraps_after_seven() {
        let mut s = State::INITIAL;
        for expected in [1, 2, 3, 4, 5, 6, 7, 0, 1] {
            s = s.next();
            assert_eq!(s.value(), expected);
        }
    }

    #[test]
    fn state_rejects_out_of_range() {
        assert!(State::new(7).is_some());
        assert!(State::new(8).is_none());
        assert_eq!(State::from_bits(0b1111_1101).value(), 5);
    }

    #[test]
    fn parse_uppercases() {
        let t = TargetString::parse("Hello").unwrap();
        assert_eq!(t.as_str(), "HELLO");
        assert_eq!(t.len(), 5);
    }

    #[test]
    fn parse_accepts_eleven_symbols() {
        let t = TargetString::parse("DON'T PANIC").unwrap();
        assert_eq!(t.len(), 11);
    }

    #[test]
    fn parse_rejects_twelve_symbols() {
        let err = TargetString::parse("DON'T BOTHER").unwrap_err();
        assert_eq!(err, CompileError::TooLong { len: 12, max: 11 });
    }

    #[test]
    fn length_is_checked_before_symbols() {
        let err = TargetString::parse("123456789012").unwrap_err();
        assert!(matches!(err, CompileError::TooLong { .. }));
    }

    #[test]
    fn parse_names_first_unsupported_symbol() {
        let err = TargetString::parse("HI?7").unwrap_err();
        assert_eq!(
            err,
            CompileError::UnsupportedSymbol {
                symbol: '?',
                position: 2
            }
        );
    }

    #[test]
    fn parse_rejects_empty() {
        assert_eq!(TargetString::parse("").unwrap_err(), CompileError::Empty);
    }

    #[test]
    fn codes_follow_input_order() {
        let t = TargetString::parse("hi!").unwrap();
        let codes: Vec<u8> = t.codes().map(|(_, c)| c.value()).collect();
        assert_eq!(codes, vec![8, 9, 27]);
    }

    #[test]
    fn serde_round_trip_revalidates() {
        let t: TargetString = serde_yaml::from_str("\"hello\"").unwrap();
        assert_eq!(t.as_str(), "HELLO");
        assert!(serde_yaml::from_str::<TargetString>("\"TOO LONG STRING\"").is_err());
    }
}
