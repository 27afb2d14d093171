//! This file contains the transition for binary Turing machines. \
//! Contrary to a more natural setup, this transition does not use Enums. Instead the data
//! is packed into one byte. This allows a number of very fast bit operations for comparison
//! and array index access. \
//! While the actual data is in one byte only, i16 is used, as this seems faster when the CPU
//! needs to convert the number into a 32 bit number internally. \
//! In debug mode the transition is also carried as chars to allow an easy understanding of the
//! data in the debugger.
//!
//! Bit setup:
//! - symbol:     bit 0: write symbol, allows check with just AND 0b0000_0001.
//!   In combination with state the last 5 bits directly give the transition array id.
//! - direction:  bits 6, 7: value right 3, left 1 and undefined 2 (because -2 = 0, no change in
//!   direction). The direction can be retrieved with an AND operation and subtracting 2, which is
//!   then -1 or 1 and can be directly added to the head position avoiding costly if operations.
//! - next state: bits 1-4: The value is naturally doubled for faster array id calculation.
//!   Value 0 represents halt.
//!
//! The seed database stores R as 0 and L as 1; [TransitionBinary::try_new] accepts both the raw
//! seed bytes and the human readable text characters.

use crate::config::{DIR_LEFT_SEED, DIR_RIGHT_SEED, MAX_STATES};

/// Number format to represent a transition (lower 8 bit used for state, symbol and direction).
/// Can be any type other than i8/u8 (potential extra info per transition). i16 seems fastest.
pub type TransitionType = i16;
/// Number format for direction which is either -1 or 1. Can be any iXX type, i16 seems fastest.
pub type DirectionType = i16;

pub const TRANSITION_BINARY_UNUSED: TransitionBinary = TransitionBinary {
    transition: TR_BINARY_UNUSED,
    #[cfg(debug_assertions)]
    text: ['_', '_', '_'],
};
// This is the undefined ('---'), where the machine halts.
pub const TRANSITION_BINARY_UNDEFINED: TransitionBinary = TransitionBinary {
    transition: TR_BINARY_UNDEFINED,
    #[cfg(debug_assertions)]
    text: ['-', '-', '-'],
};

const FILTER_SYMBOL: TransitionType = 0b0000_0001;
const FILTER_DIR: TransitionType = 0b1100_0000;
pub const FILTER_STATE: TransitionType = 0b0001_1110;
pub const TR_BINARY_UNDEFINED: TransitionType = DIRECTION_UNDEFINED;
pub const TR_BINARY_UNUSED: TransitionType = 0b0000_0000;
const SYMBOL_ZERO: TransitionType = 0b0000_0000;
const SYMBOL_ONE: TransitionType = 0b0000_0001;
const DIRECTION_UNDEFINED: TransitionType = 0b1000_0000;
const TO_RIGHT: TransitionType = 0b1100_0000;
const TO_LEFT: TransitionType = 0b0100_0000;
pub const STATE_HALT_BINARY: TransitionType = 0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionBinary {
    /// Packed transition, see module doc for the bit setup.
    pub transition: TransitionType,
    /// transition as text for debugging
    #[cfg(debug_assertions)]
    pub text: [char; 3],
}

impl TransitionBinary {
    /// New transition from human readable format, e.g. 1RB, 1RZ or ---, or from the three raw
    /// bytes of a seed database record. \
    /// \[symbol,direction,status\] \
    /// First char is the symbol to write on the tape, 0 or 1, or '-' for the undefined halt. \
    /// Second char is L or R for the direction (or the raw bytes 1 and 0). \
    /// Third char is the next state, either as number 1-9 (0 = halt, used by the seed database)
    /// or as letter A-Y (Z = halt). \
    /// An all-zero byte triple is treated as the undefined transition, which halts.
    pub fn try_new(transition_text: [u8; 3]) -> Result<Self, TransitionError> {
        if transition_text == [0, 0, 0] {
            return Ok(TRANSITION_BINARY_UNDEFINED);
        }
        // Symbol
        let mut transition_bits = match transition_text[0] {
            b'0' | 0 => SYMBOL_ZERO,
            b'1' | 1 => SYMBOL_ONE,
            // No undefined symbol on its own, the full transition is undefined.
            b'-' => return Ok(TRANSITION_BINARY_UNDEFINED),
            _ => return Err(TransitionError::InvalidSymbol(transition_text[0])),
        };

        let state_char = transition_text[2];
        match state_char {
            // Numeric 0 or char Z means halt. Nothing to do, the state bits are 0 already.
            0 | b'Z' => {}
            // Numeric states (number from seed database)
            1..=9 => {
                if state_char > MAX_STATES as u8 {
                    return Err(TransitionError::StateOutOfRange(state_char));
                } else {
                    transition_bits |= (state_char as TransitionType) << 1;
                }
            }
            // Numeric states (char)
            b'1'..=b'9' => {
                let num_state = state_char - b'0';
                if num_state > MAX_STATES as u8 {
                    return Err(TransitionError::StateOutOfRange(num_state));
                } else {
                    transition_bits |= (num_state as TransitionType) << 1;
                }
            }
            // Alphabetic states A-Y (up to MAX_STATES)
            b'A'..=b'Y' => {
                let num_state = state_char - b'A' + 1;
                if num_state > MAX_STATES as u8 {
                    return Err(TransitionError::StateOutOfRange(num_state));
                }
                transition_bits |= (num_state as TransitionType) << 1;
            }
            // '-' is an error as it cannot be undefined if the symbol is defined.
            _ => return Err(TransitionError::InvalidStateChar(state_char)),
        }

        // direction, the seed database stores R as 0 and L as 1
        match transition_text[1] {
            b'L' | DIR_LEFT_SEED => transition_bits |= TO_LEFT,
            b'R' | DIR_RIGHT_SEED => transition_bits |= TO_RIGHT,
            _ => return Err(TransitionError::InvalidDirection(transition_text[1])),
        };

        Ok(Self::new_packed(transition_bits))
    }

    /// New transition from the packed bits, filling the debug text in debug builds.
    fn new_packed(transition_bits: TransitionType) -> Self {
        #[cfg(debug_assertions)]
        {
            let mut t = Self {
                transition: transition_bits,
                text: ['_'; 3],
            };
            let tx = t.to_string().into_bytes();
            t.text = [tx[0] as char, tx[1] as char, tx[2] as char];
            t
        }

        #[cfg(not(debug_assertions))]
        Self {
            transition: transition_bits,
        }
    }

    pub fn is_dir_right(&self) -> bool {
        self.transition & FILTER_DIR == TO_RIGHT
    }

    pub fn is_dir_left(&self) -> bool {
        self.transition & FILTER_DIR == TO_LEFT
    }

    /// returns direction for left = -1, for right 1
    pub fn direction(&self) -> DirectionType {
        ((self.transition & FILTER_DIR) >> 6) as DirectionType - 2
    }

    /// Returns the direction as char (L,R,-).
    pub fn direction_to_char(&self) -> char {
        match self.transition & FILTER_DIR {
            TO_LEFT => 'L',
            TO_RIGHT => 'R',
            _ => '-',
        }
    }

    pub fn state(&self) -> TransitionType {
        (self.transition & FILTER_STATE) >> 1
    }

    /// returns the state doubled as usize for array access
    pub fn state_x2(&self) -> usize {
        (self.transition & FILTER_STATE) as usize
    }

    /// Returns the state as char (A,B,C,...)
    pub fn state_to_char(&self) -> char {
        if self.transition & FILTER_STATE == 0 {
            'Z'
        } else {
            (((self.transition & FILTER_STATE) >> 1) as u8 + b'A' - 1) as char
        }
    }

    /// returns only 0 or 1, not undefined
    pub fn symbol(&self) -> TransitionType {
        self.transition & FILTER_SYMBOL
    }

    /// returns only 0 or 1, not undefined
    pub fn symbol_usize(&self) -> usize {
        (self.transition & FILTER_SYMBOL) as usize
    }

    pub fn is_halt(&self) -> bool {
        self.transition & FILTER_STATE == STATE_HALT_BINARY
    }

    pub fn is_symbol_one(&self) -> bool {
        self.transition & FILTER_SYMBOL != 0
    }

    pub fn is_symbol_zero(&self) -> bool {
        self.transition & FILTER_SYMBOL == 0
    }

    pub fn is_symbol_undefined(&self) -> bool {
        // Filter on direction is correct, as direction and symbol are always together defined or undefined.
        self.transition & FILTER_DIR == DIRECTION_UNDEFINED
    }

    pub fn is_unused(&self) -> bool {
        self.transition == TR_BINARY_UNUSED
    }

    /// Returns the transition with L and R swapped, which runs the machine on the
    /// horizontally mirrored tape. Undefined transitions are unchanged.
    pub fn mirrored(&self) -> Self {
        let bits = match self.transition & FILTER_DIR {
            TO_LEFT => (self.transition & !FILTER_DIR) | TO_RIGHT,
            TO_RIGHT => (self.transition & !FILTER_DIR) | TO_LEFT,
            _ => return *self,
        };
        Self::new_packed(bits)
    }
}

impl Default for TransitionBinary {
    fn default() -> Self {
        TRANSITION_BINARY_UNUSED
    }
}

impl TryFrom<&str> for TransitionBinary {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        if value.len() != 3 {
            return Err("Transition must have length of 3".to_string());
        }
        let r = TransitionBinary::try_new(value.as_bytes().try_into().unwrap());
        match r {
            Ok(t) => Ok(t),
            Err(e) => Err(e.to_string()),
        }
    }
}

/// Displays the transition in standard format, e.g. 1RB
impl std::fmt::Display for TransitionBinary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.transition {
            TR_BINARY_UNDEFINED => write!(f, "---"),
            TR_BINARY_UNUSED => write!(f, "   "),
            _ => {
                let write_symbol = match self.transition & FILTER_SYMBOL {
                    SYMBOL_ONE => '1',
                    _ => '0',
                };
                let direction = match self.transition & FILTER_DIR {
                    TO_LEFT => 'L',
                    TO_RIGHT => 'R',
                    _ => return write!(f, "---"),
                };
                let next_state = self.state_to_char();
                write!(f, "{write_symbol}{direction}{next_state}")
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TransitionError {
    InvalidSymbol(u8),
    InvalidDirection(u8),
    InvalidStateChar(u8),
    StateOutOfRange(u8),
}
impl std::error::Error for TransitionError {}

impl std::fmt::Display for TransitionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransitionError::InvalidSymbol(s) => {
                write!(f, "Invalid symbol: '{}'", *s as char)
            }
            TransitionError::InvalidDirection(d) => {
                write!(f, "Invalid direction: '{}'", *d as char)
            }
            TransitionError::InvalidStateChar(s) => {
                write!(f, "Invalid state character: '{}'", *s as char)
            }
            TransitionError::StateOutOfRange(s) => {
                write!(f, "State {s} out of range (max {MAX_STATES})")
            }
        }
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn transition_from_text_and_seed_bytes_is_identical() {
        let from_text = TransitionBinary::try_from("1LC").unwrap();
        // seed bytes: symbol 1, direction L = 1, state C = 3
        let from_seed = TransitionBinary::try_new([1, 1, 3]).unwrap();
        assert_eq!(from_text, from_seed);
        assert_eq!(-1, from_text.direction());
        assert_eq!(3, from_text.state());
        assert_eq!("1LC", from_text.to_string());
    }

    #[test]
    fn transition_all_zero_bytes_is_undefined_halt() {
        let t = TransitionBinary::try_new([0, 0, 0]).unwrap();
        assert!(t.is_halt());
        assert!(t.is_symbol_undefined());
        assert_eq!("---", t.to_string());
    }

    #[test]
    fn transition_mirrored_swaps_direction_only() {
        let t = TransitionBinary::try_from("1RB").unwrap();
        let m = t.mirrored();
        assert_eq!("1LB", m.to_string());
        assert_eq!(t.state(), m.state());
        assert_eq!(t.symbol(), m.symbol());
        assert_eq!(t, m.mirrored());
        assert_eq!(TRANSITION_BINARY_UNDEFINED, TRANSITION_BINARY_UNDEFINED.mirrored());
    }
}
