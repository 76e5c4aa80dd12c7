use crate::constants::{
    layout, ADDRESS_BYTES, ADDRESS_CAPACITY, BYTE_BASE, WORD_BYTES, WORD_CAPACITY,
};
use core::ops::Range;

/// Sign of a MIX quantity. Stored apart from the magnitude, so a zero
/// magnitude may still carry `Minus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sign {
    #[default]
    Plus,
    Minus,
}

impl Sign {
    /// Sign of a native integer; zero is `Plus`
    pub fn of(value: i64) -> Sign {
        if value < 0 {
            Sign::Minus
        } else {
            Sign::Plus
        }
    }

    /// Decodes the `+1` / `-1` convention used by memory images
    pub fn from_i8(value: i8) -> Sign {
        if value < 0 {
            Sign::Minus
        } else {
            Sign::Plus
        }
    }

    pub fn as_i8(self) -> i8 {
        match self {
            Sign::Plus => 1,
            Sign::Minus => -1,
        }
    }

    pub fn negate(self) -> Sign {
        match self {
            Sign::Plus => Sign::Minus,
            Sign::Minus => Sign::Plus,
        }
    }

    /// Sign of a product or quotient of two signed quantities
    pub fn combine(self, other: Sign) -> Sign {
        if self == other {
            Sign::Plus
        } else {
            Sign::Minus
        }
    }

    pub fn apply(self, magnitude: i64) -> i64 {
        match self {
            Sign::Plus => magnitude,
            Sign::Minus => -magnitude,
        }
    }
}

/// Field specification `(L:R)`, packed in an instruction as `8*L + R`.
/// Position 0 is the sign, positions 1..=5 the bytes from most significant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    lo: u8,
    hi: u8,
}

impl FieldSpec {
    pub const FULL: FieldSpec = FieldSpec {
        lo: 0,
        hi: layout::FIELD_MAX,
    };

    pub fn new(lo: u8, hi: u8) -> Option<FieldSpec> {
        if lo <= hi && hi <= layout::FIELD_MAX {
            Some(FieldSpec { lo, hi })
        } else {
            None
        }
    }

    pub fn from_byte(byte: u8) -> Option<FieldSpec> {
        Self::new(byte / layout::FIELD_RADIX, byte % layout::FIELD_RADIX)
    }

    pub fn to_byte(self) -> u8 {
        self.lo * layout::FIELD_RADIX + self.hi
    }

    pub fn lo(self) -> u8 {
        self.lo
    }

    pub fn hi(self) -> u8 {
        self.hi
    }

    pub fn includes_sign(self) -> bool {
        self.lo == 0
    }

    /// Indices into `Word::bytes` covered by this field
    fn byte_range(self) -> Range<usize> {
        let first = self.lo.max(1) as usize - 1;
        first..self.hi as usize
    }
}

/// A MIX word: a sign and five base-64 bytes, most significant first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Word {
    pub sign: Sign,
    pub bytes: [u8; WORD_BYTES],
}

impl Word {
    pub const ZERO: Word = Word {
        sign: Sign::Plus,
        bytes: [0; WORD_BYTES],
    };

    pub const fn new(sign: Sign, bytes: [u8; WORD_BYTES]) -> Word {
        Word { sign, bytes }
    }

    /// Encodes a native integer. Digits beyond the fifth are dropped; callers
    /// that care about overflow compare against `WORD_CAPACITY` first.
    pub fn from_value(value: i64) -> Word {
        Self::from_magnitude(Sign::of(value), value.unsigned_abs())
    }

    pub fn from_magnitude(sign: Sign, magnitude: u64) -> Word {
        let base = BYTE_BASE as u64;
        let mut bytes = [0u8; WORD_BYTES];
        let mut rest = magnitude;
        for byte in bytes.iter_mut().rev() {
            *byte = (rest % base) as u8;
            rest /= base;
        }
        Word { sign, bytes }
    }

    /// Packs the decoded parts of an instruction back into a word
    pub fn instruction(address: Address, index: u8, field: u8, opcode: u8) -> Word {
        let mut bytes = [0u8; WORD_BYTES];
        bytes[layout::ADDRESS_HIGH] = address.bytes[0];
        bytes[layout::ADDRESS_LOW] = address.bytes[1];
        bytes[layout::INDEX] = index;
        bytes[layout::FIELD] = field;
        bytes[layout::OPCODE] = opcode;
        Word {
            sign: address.sign,
            bytes,
        }
    }

    /// Value of the selected field. Only fields that include position 0
    /// carry the sign; every other field decodes as a non-negative magnitude.
    pub fn decode(&self, field: FieldSpec) -> i64 {
        let magnitude = self.bytes[field.byte_range()]
            .iter()
            .fold(0i64, |acc, &byte| acc * BYTE_BASE + byte as i64);

        if field.includes_sign() {
            self.sign.apply(magnitude)
        } else {
            magnitude
        }
    }

    pub fn value(&self) -> i64 {
        self.decode(FieldSpec::FULL)
    }

    pub fn magnitude(&self) -> u64 {
        self.value().unsigned_abs()
    }

    pub fn with_sign(self, sign: Sign) -> Word {
        Word { sign, ..self }
    }

    pub fn negated(self) -> Word {
        self.with_sign(self.sign.negate())
    }

    /// Address part of an instruction word: the sign and bytes 1..=2
    pub fn address(&self) -> Address {
        Address {
            sign: self.sign,
            bytes: [
                self.bytes[layout::ADDRESS_HIGH],
                self.bytes[layout::ADDRESS_LOW],
            ],
        }
    }

    pub fn index(&self) -> u8 {
        self.bytes[layout::INDEX]
    }

    pub fn field(&self) -> u8 {
        self.bytes[layout::FIELD]
    }

    pub fn opcode(&self) -> u8 {
        self.bytes[layout::OPCODE]
    }

    /// Load view of a field: the selected bytes shifted to the right end of
    /// an otherwise zero word. The sign survives only when the field
    /// includes it, so `(0:5)` keeps a negative zero intact.
    pub fn field_of(&self, field: FieldSpec) -> Word {
        let range = field.byte_range();
        let mut bytes = [0u8; WORD_BYTES];
        bytes[WORD_BYTES - range.len()..].copy_from_slice(&self.bytes[range]);

        let sign = if field.includes_sign() {
            self.sign
        } else {
            Sign::Plus
        };
        Word { sign, bytes }
    }

    /// Store into a field: the rightmost bytes of `source` overwrite the
    /// field's positions, everything outside the field is left alone. The
    /// sign is copied when the field includes it and forced to `Plus`
    /// otherwise.
    pub fn set_field(&mut self, field: FieldSpec, source: &Word) {
        let range = field.byte_range();
        let width = range.len();
        self.bytes[range].copy_from_slice(&source.bytes[WORD_BYTES - width..]);

        self.sign = if field.includes_sign() {
            source.sign
        } else {
            Sign::Plus
        };
    }
}

/// Two-byte signed quantity held by the index and jump registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Address {
    pub sign: Sign,
    pub bytes: [u8; ADDRESS_BYTES],
}

impl Address {
    pub const ZERO: Address = Address {
        sign: Sign::Plus,
        bytes: [0; ADDRESS_BYTES],
    };

    pub const fn new(sign: Sign, bytes: [u8; ADDRESS_BYTES]) -> Address {
        Address { sign, bytes }
    }

    pub fn fits(value: i64) -> bool {
        value.unsigned_abs() < ADDRESS_CAPACITY as u64
    }

    /// Encodes a native integer, wrapping magnitudes of 4096 and above
    pub fn from_value(value: i64) -> Address {
        let base = BYTE_BASE as u64;
        let magnitude = value.unsigned_abs();
        Address {
            sign: Sign::of(value),
            bytes: [((magnitude / base) % base) as u8, (magnitude % base) as u8],
        }
    }

    pub fn value(&self) -> i64 {
        let magnitude = self.bytes[0] as i64 * BYTE_BASE + self.bytes[1] as i64;
        self.sign.apply(magnitude)
    }

    /// Widens to a word with the two bytes in positions 4 and 5
    pub fn to_word(self) -> Word {
        let mut bytes = [0u8; WORD_BYTES];
        bytes[WORD_BYTES - ADDRESS_BYTES..].copy_from_slice(&self.bytes);
        Word {
            sign: self.sign,
            bytes,
        }
    }

    /// Narrows a word back to two bytes; `None` if positions 1..=3 are in use
    pub fn try_from_word(word: &Word) -> Option<Address> {
        let (high, low) = word.bytes.split_at(WORD_BYTES - ADDRESS_BYTES);
        if high.iter().any(|&byte| byte != 0) {
            return None;
        }
        Some(Address {
            sign: word.sign,
            bytes: [low[0], low[1]],
        })
    }
}

/// True when a magnitude no longer fits in a single word
pub fn exceeds_word(value: i64) -> bool {
    value.unsigned_abs() >= WORD_CAPACITY as u64
}
