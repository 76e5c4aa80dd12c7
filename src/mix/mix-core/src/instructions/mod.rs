pub mod instructions;

// Import trait implementations for CPU instruction categories
pub use instructions::Arithmetic;
pub use instructions::Compare;
pub use instructions::ControlFlow;
pub use instructions::Immediate;
pub use instructions::LoadStore;

#[cfg(test)]
pub use instructions::tests;

use crate::constants::jumps;
use crate::memory::{Comparison, Register};
use crate::word::{Address, FieldSpec, Word};

/// Source of a store instruction: the eight loadable registers plus J and
/// the zero register, which only STJ and STZ can name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreSource {
    Register(Register),
    Jump,
    Zero,
}

/// Variants of opcode 39, selected by the field byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpCondition {
    Always,         // JMP
    AlwaysNoSave,   // JSJ
    Overflow,       // JOV
    NoOverflow,     // JNOV
    Less,           // JL
    Equal,          // JE
    Greater,        // JG
    GreaterOrEqual, // JGE
    NotEqual,       // JNE
    LessOrEqual,    // JLE
}

impl JumpCondition {
    pub fn from_field(field: u8) -> Option<JumpCondition> {
        let cond = match field {
            jumps::JMP => JumpCondition::Always,
            jumps::JSJ => JumpCondition::AlwaysNoSave,
            jumps::JOV => JumpCondition::Overflow,
            jumps::JNOV => JumpCondition::NoOverflow,
            jumps::JL => JumpCondition::Less,
            jumps::JE => JumpCondition::Equal,
            jumps::JG => JumpCondition::Greater,
            jumps::JGE => JumpCondition::GreaterOrEqual,
            jumps::JNE => JumpCondition::NotEqual,
            jumps::JLE => JumpCondition::LessOrEqual,
            _ => return None,
        };
        Some(cond)
    }

    /// Whether a taken jump records the current location in J
    pub fn saves_return(self) -> bool {
        !matches!(
            self,
            JumpCondition::AlwaysNoSave | JumpCondition::Overflow | JumpCondition::NoOverflow
        )
    }

    /// Whether the jump reads (and therefore clears) the overflow toggle
    pub fn clears_overflow(self) -> bool {
        matches!(self, JumpCondition::Overflow | JumpCondition::NoOverflow)
    }

    pub fn holds(self, comparison: Comparison, overflow: bool) -> bool {
        match self {
            JumpCondition::Always | JumpCondition::AlwaysNoSave => true,
            JumpCondition::Overflow => overflow,
            JumpCondition::NoOverflow => !overflow,
            JumpCondition::Less => comparison == Comparison::Less,
            JumpCondition::Equal => comparison == Comparison::Equal,
            JumpCondition::Greater => comparison == Comparison::Greater,
            JumpCondition::GreaterOrEqual => comparison != Comparison::Less,
            JumpCondition::NotEqual => comparison != Comparison::Equal,
            JumpCondition::LessOrEqual => comparison != Comparison::Greater,
        }
    }
}

/// Variants of opcodes 40..=47, selected by the field byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignCondition {
    Negative,
    Zero,
    Positive,
    NonNegative,
    NonZero,
    NonPositive,
}

impl SignCondition {
    pub fn from_field(field: u8) -> Option<SignCondition> {
        let cond = match field {
            jumps::NEGATIVE => SignCondition::Negative,
            jumps::ZERO => SignCondition::Zero,
            jumps::POSITIVE => SignCondition::Positive,
            jumps::NON_NEGATIVE => SignCondition::NonNegative,
            jumps::NON_ZERO => SignCondition::NonZero,
            jumps::NON_POSITIVE => SignCondition::NonPositive,
            _ => return None,
        };
        Some(cond)
    }

    /// Negative zero counts as zero
    pub fn holds(self, value: i64) -> bool {
        match self {
            SignCondition::Negative => value < 0,
            SignCondition::Zero => value == 0,
            SignCondition::Positive => value > 0,
            SignCondition::NonNegative => value >= 0,
            SignCondition::NonZero => value != 0,
            SignCondition::NonPositive => value <= 0,
        }
    }
}

/// Variants of opcodes 48..=55, selected by the field byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImmediateMode {
    Enter,
    EnterNegative,
    Increment,
    Decrement,
}

/// Decoded operation. Every opcode lands on exactly one variant; the stubs
/// (NUM, CHAR, unknown specials, shifts, MOVE, device I/O) keep their own
/// variants so the executor can report them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Nop,
    Add(FieldSpec),
    Sub(FieldSpec),
    Mul(FieldSpec),
    Div(FieldSpec),
    Num,
    Char,
    Halt,
    Special,
    Shift,
    Move,
    Load {
        reg: Register,
        negate: bool,
        field: FieldSpec,
    },
    Store {
        source: StoreSource,
        field: FieldSpec,
    },
    Io,
    Jump(JumpCondition),
    JumpOnSign {
        reg: Register,
        condition: SignCondition,
    },
    Immediate {
        reg: Register,
        mode: ImmediateMode,
    },
    Compare {
        reg: Register,
        field: FieldSpec,
    },
}

impl Operation {
    /// Jump groups leave the program counter where they want it; everything
    /// else falls through to the next location
    pub fn sets_pc(&self) -> bool {
        matches!(self, Operation::Jump(_) | Operation::JumpOnSign { .. })
    }
}

/// A decoded MIX instruction and where it was fetched from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub pc: usize,     // Location the word was fetched from
    pub word: Word,    // Raw instruction word
    pub op: Operation, // Decoded operation
}

impl Instruction {
    /// Opcode byte (position 5)
    pub fn get_opcode(&self) -> u8 {
        self.word.opcode()
    }

    /// Signed address part (sign and positions 1..=2), before indexing
    pub fn get_address(&self) -> Address {
        self.word.address()
    }

    /// Index register selector (position 3)
    pub fn get_index(&self) -> u8 {
        self.word.index()
    }

    /// Raw field byte (position 4)
    pub fn get_field(&self) -> u8 {
        self.word.field()
    }
}
