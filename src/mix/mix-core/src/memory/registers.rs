use crate::constants::layout;
use crate::error::Fault;
use crate::word::{Address, Word};
use core::cmp::Ordering;
use log::warn;

/// Registers addressable by the load, store, jump, immediate and compare
/// groups, in opcode-offset order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Register {
    A,
    I1,
    I2,
    I3,
    I4,
    I5,
    I6,
    X,
}

impl Register {
    pub const ALL: [Register; 8] = [
        Register::A,
        Register::I1,
        Register::I2,
        Register::I3,
        Register::I4,
        Register::I5,
        Register::I6,
        Register::X,
    ];

    /// Register selected by an opcode's offset from its group base
    pub fn from_offset(offset: u8) -> Option<Register> {
        Self::ALL.get(offset as usize).copied()
    }

    /// Index register selected by an instruction's index byte (1..=6)
    pub fn index(selector: u8) -> Option<Register> {
        match selector {
            1..=layout::INDEX_MAX => Self::from_offset(selector),
            _ => None,
        }
    }

    pub fn is_index(self) -> bool {
        !matches!(self, Register::A | Register::X)
    }

    pub fn name(self) -> &'static str {
        match self {
            Register::A => "A",
            Register::I1 => "I1",
            Register::I2 => "I2",
            Register::I3 => "I3",
            Register::I4 => "I4",
            Register::I5 => "I5",
            Register::I6 => "I6",
            Register::X => "X",
        }
    }
}

/// Comparison indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Comparison {
    Less,
    #[default]
    Equal,
    Greater,
}

impl From<Ordering> for Comparison {
    fn from(ordering: Ordering) -> Self {
        match ordering {
            Ordering::Less => Comparison::Less,
            Ordering::Equal => Comparison::Equal,
            Ordering::Greater => Comparison::Greater,
        }
    }
}

/// Storage behind a register: full words for A and X, two-byte addresses
/// for the index registers
pub enum RegisterSlot<'a> {
    Word(&'a mut Word),
    Address(&'a mut Address),
}

/// Always reads as +0; nothing can name it as a destination
pub const ZERO_REGISTER: Address = Address::ZERO;

/// MIX register file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registers {
    pub a: Word,
    pub x: Word,
    index: [Address; 6],
    pub j: Address,
    pub comparison: Comparison,
    pub overflow: bool,
}

impl Registers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Typed access to the storage behind a register
    pub fn slot(&mut self, reg: Register) -> RegisterSlot<'_> {
        match reg {
            Register::A => RegisterSlot::Word(&mut self.a),
            Register::X => RegisterSlot::Word(&mut self.x),
            Register::I1 => RegisterSlot::Address(&mut self.index[0]),
            Register::I2 => RegisterSlot::Address(&mut self.index[1]),
            Register::I3 => RegisterSlot::Address(&mut self.index[2]),
            Register::I4 => RegisterSlot::Address(&mut self.index[3]),
            Register::I5 => RegisterSlot::Address(&mut self.index[4]),
            Register::I6 => RegisterSlot::Address(&mut self.index[5]),
        }
    }

    /// Full-word view of a register; index registers occupy bytes 4..=5
    pub fn read(&self, reg: Register) -> Word {
        match reg {
            Register::A => self.a,
            Register::X => self.x,
            Register::I1 => self.index[0].to_word(),
            Register::I2 => self.index[1].to_word(),
            Register::I3 => self.index[2].to_word(),
            Register::I4 => self.index[3].to_word(),
            Register::I5 => self.index[4].to_word(),
            Register::I6 => self.index[5].to_word(),
        }
    }

    pub fn value(&self, reg: Register) -> i64 {
        self.read(reg).value()
    }

    /// Writes a full word. Index registers only accept words whose value
    /// fits in two bytes.
    pub fn write(&mut self, reg: Register, word: Word) -> Result<(), Fault> {
        match self.slot(reg) {
            RegisterSlot::Word(w) => *w = word,
            RegisterSlot::Address(r) => {
                *r = Address::try_from_word(&word).ok_or(Fault::AddressViolation(word.value()))?;
            }
        }
        Ok(())
    }

    /// Stores a native integer through the register's own codec: words
    /// drop digits beyond the fifth, index registers beyond the second.
    pub fn assign(&mut self, reg: Register, value: i64) {
        match self.slot(reg) {
            RegisterSlot::Word(w) => *w = Word::from_value(value),
            RegisterSlot::Address(r) => {
                if !Address::fits(value) {
                    warn!("{} wraps {} to two bytes", reg.name(), value);
                }
                *r = Address::from_value(value);
            }
        }
    }

    /// Index register named by an instruction's index byte; 0 is the zero
    /// register
    pub fn index_register(&self, selector: u8) -> Result<Address, Fault> {
        if selector == 0 {
            return Ok(ZERO_REGISTER);
        }
        let reg = Register::index(selector).ok_or(Fault::InvalidIndex { index: selector })?;
        // I1..I6 sit at discriminants 1..6
        Ok(self.index[reg as usize - 1])
    }
}

#[cfg(test)]
mod register_tests {
    use super::*;
    use crate::word::Sign;

    #[test]
    fn test_offsets() {
        assert_eq!(Register::from_offset(0), Some(Register::A));
        assert_eq!(Register::from_offset(3), Some(Register::I3));
        assert_eq!(Register::from_offset(7), Some(Register::X));
        assert_eq!(Register::from_offset(8), None);
        assert_eq!(Register::index(0), None);
        assert_eq!(Register::index(6), Some(Register::I6));
        assert_eq!(Register::index(7), None);
    }

    #[test]
    fn test_index_registers_are_distinct() {
        let mut regs = Registers::new();
        for (n, reg) in Register::ALL.iter().enumerate() {
            regs.assign(*reg, n as i64 + 10);
        }
        for (n, reg) in Register::ALL.iter().enumerate() {
            assert_eq!(regs.value(*reg), n as i64 + 10);
        }
        for selector in 1..=6u8 {
            assert_eq!(
                regs.index_register(selector),
                Ok(Address::from_value(selector as i64 + 10))
            );
        }
    }

    #[test]
    fn test_zero_register() {
        let mut regs = Registers::new();
        regs.assign(Register::I1, 99);
        assert_eq!(regs.index_register(0), Ok(ZERO_REGISTER));
        assert_eq!(
            regs.index_register(7),
            Err(Fault::InvalidIndex { index: 7 })
        );
    }

    #[test]
    fn test_index_write_must_fit() {
        let mut regs = Registers::new();
        assert_eq!(
            regs.write(Register::I2, Word::from_value(4096)),
            Err(Fault::AddressViolation(4096))
        );
        regs.write(Register::I2, Word::new(Sign::Minus, [0, 0, 0, 1, 1]))
            .unwrap();
        assert_eq!(regs.value(Register::I2), -65);

        regs.assign(Register::I3, 4096 + 5);
        assert_eq!(regs.value(Register::I3), 5);
    }

    #[test]
    fn test_comparison_from_ordering() {
        assert_eq!(Comparison::from(5.cmp(&3)), Comparison::Greater);
        assert_eq!(Comparison::from(3.cmp(&3)), Comparison::Equal);
        assert_eq!(Comparison::from(1.cmp(&5)), Comparison::Less);
        assert_eq!(Comparison::default(), Comparison::Equal);
    }
}
