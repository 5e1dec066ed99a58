//! Context keys and the consistency filter. A key is a fixed-width
//! hypothesis about 'level' consecutive bits; the filter prunes hypotheses
//! that contradict bits which are already fixed, either because they were
//! guessed earlier in the active run or because they were already committed
//! to the stream.

use crate::bitstream::BitBuf;
use std::fmt;

/// A combination key: exactly 'level' bits, most significant first. Keys
/// are kept as packed integers rather than strings; the canonical
/// bit-string form is only materialized for display.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct Key {
    level: u8,
    bits: u32,
}

impl Key {
    /// Build the key for 'value' at context length 'level'. The value must
    /// fit in 'level' bits.
    pub fn new(level: usize, value: u32) -> Self {
        debug_assert!(level >= 1 && level <= 32);
        debug_assert!(level == 32 || value < (1 << level), "Value too wide");
        Self {
            level: level as u8,
            bits: value,
        }
    }

    pub fn level(&self) -> usize {
        self.level as usize
    }

    /// The bit at 'pos', where position zero is the most significant bit.
    pub fn bit(&self, pos: usize) -> u8 {
        debug_assert!(pos < self.level());
        ((self.bits >> (self.level() - 1 - pos)) & 1) as u8
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:0width$b}", self.bits, width = self.level())
    }
}

/// A read-only view of every bit that is already fixed at some point of a
/// guess run: the bits guessed so far in the run, backed by the committed
/// stream history behind them.
pub struct FixedBits<'a> {
    history: &'a BitBuf,
    /// Absolute index of the first uncommitted bit. Only history bits
    /// below this index may be consulted.
    input: usize,
    guessed: &'a [u8],
}

impl<'a> FixedBits<'a> {
    pub fn new(history: &'a BitBuf, input: usize, guessed: &'a [u8]) -> Self {
        debug_assert!(input <= history.len());
        Self {
            history,
            input,
            guessed,
        }
    }

    /// The fixed bit 'distance' positions before the bit under prediction,
    /// or None when the distance reaches past the start of the stream.
    /// Distance one is the most recent fixed bit.
    pub fn bit_back(&self, distance: usize) -> Option<u8> {
        debug_assert!(distance >= 1);
        let current = self.input + self.guessed.len();
        if distance > current {
            return None;
        }
        let abs = current - distance;
        if abs >= self.input {
            Some(self.guessed[abs - self.input])
        } else {
            Some(self.history.get(abs))
        }
    }
}

/// Build the key of the 'level' fixed bits that end 'skip' positions
/// before the bit under prediction. With a skip of zero this is the most
/// recent context window: guessed-run bits where the run covers the
/// distance, committed stream bits beyond it. Returns None when the
/// window would reach past the start of the stream.
pub fn historic_key(
    level: usize,
    skip: usize,
    fixed: &FixedBits,
) -> Option<Key> {
    let mut bits: u32 = 0;
    for pos in 0..level {
        let distance = skip + level - pos;
        bits = (bits << 1) | fixed.bit_back(distance)? as u32;
    }
    Some(Key::new(level, bits))
}

/// Decide whether the hypothesis 'key' is still compatible with the bits
/// already fixed, assuming its bit at 'offset' lines up with the bit under
/// prediction. Walks backward from the offset; any mismatch against a
/// fixed bit invalidates the hypothesis. Distances that reach past the
/// start of the stream are unconstrained.
pub fn consistent(key: Key, offset: usize, fixed: &FixedBits) -> bool {
    debug_assert!(offset < key.level());
    for distance in 1..=offset {
        match fixed.bit_back(distance) {
            Some(bit) => {
                if key.bit(offset - distance) != bit {
                    return false;
                }
            }
            // Past the stream start; nothing to contradict.
            None => break,
        }
    }
    true
}
