use thiserror::Error;

/// Conditions that stop the machine. Halting is not one of them: a halted
/// machine reports `State::Halted` instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Fault {
    /// Effective address, program counter or index-register value outside
    /// the range it has to fit in.
    #[error("address violation: {0} is out of range")]
    AddressViolation(i64),

    /// The opcode decoded to a stub (NUM/CHAR, shifts, MOVE, device I/O).
    #[error(
        "opcode {opcode} not yet implemented at location {pc} \
         (address {address}, index {index}, field {field})"
    )]
    UnimplementedOpcode {
        opcode: u8,
        pc: usize,
        address: i64,
        index: u8,
        field: u8,
    },

    /// Field byte that is not a valid `(L:R)` pair, or a variant selector the
    /// opcode does not define.
    #[error("opcode {opcode} cannot use field {field}")]
    InvalidField { opcode: u8, field: u8 },

    #[error("index register {index} does not exist")]
    InvalidIndex { index: u8 },

    #[error("image of {len} words does not fit at origin {origin}")]
    ImageTooLarge { origin: usize, len: usize },
}
