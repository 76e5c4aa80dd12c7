use crate::constants::{immediates, opcodes, special};
use crate::error::Fault;
use crate::instructions::{
    ImmediateMode, Instruction, JumpCondition, Operation, SignCondition, StoreSource,
};
use crate::memory::Register;
use crate::word::{FieldSpec, Word};
use log::error;

/// Field byte as an `(L:R)` specification
fn field_spec(word: &Word) -> Result<FieldSpec, Fault> {
    FieldSpec::from_byte(word.field()).ok_or_else(|| invalid_field(word))
}

fn invalid_field(word: &Word) -> Fault {
    error!("Invalid field {} for opcode {}", word.field(), word.opcode());
    Fault::InvalidField {
        opcode: word.opcode(),
        field: word.field(),
    }
}

/// Register picked by the opcode's offset inside its group of eight
fn group_register(opcode: u8, base: u8) -> Register {
    // `% GROUP_SIZE` keeps the offset inside Register::ALL
    Register::from_offset((opcode - base) % opcodes::GROUP_SIZE).unwrap_or(Register::A)
}

/// Opcodes 0..=7: arithmetic and the special group
fn decoder_arithmetic(word: &Word) -> Result<Operation, Fault> {
    let op = match word.opcode() {
        opcodes::NOP => Operation::Nop,
        opcodes::ADD => Operation::Add(field_spec(word)?),
        opcodes::SUB => Operation::Sub(field_spec(word)?),
        opcodes::MUL => Operation::Mul(field_spec(word)?),
        opcodes::DIV => Operation::Div(field_spec(word)?),
        opcodes::SPECIAL => match word.field() {
            special::NUM => Operation::Num,
            special::CHAR => Operation::Char,
            special::HALT => Operation::Halt,
            _ => Operation::Special,
        },
        opcodes::SHIFT => Operation::Shift,
        _ => Operation::Move,
    };
    Ok(op)
}

/// Opcodes 8..=33: loads, negated loads and stores
fn decoder_load_store(word: &Word) -> Result<Operation, Fault> {
    let opcode = word.opcode();
    let field = field_spec(word)?;

    let op = match opcode {
        opcodes::LOAD..=15 => Operation::Load {
            reg: group_register(opcode, opcodes::LOAD),
            negate: false,
            field,
        },
        opcodes::LOAD_NEGATIVE..=23 => Operation::Load {
            reg: group_register(opcode, opcodes::LOAD_NEGATIVE),
            negate: true,
            field,
        },
        opcodes::STORE_J => Operation::Store {
            source: StoreSource::Jump,
            field,
        },
        opcodes::STORE_ZERO => Operation::Store {
            source: StoreSource::Zero,
            field,
        },
        _ => Operation::Store {
            source: StoreSource::Register(group_register(opcode, opcodes::STORE)),
            field,
        },
    };
    Ok(op)
}

/// Opcodes 39..=63: jumps, immediates and comparisons
fn decoder_control(word: &Word) -> Result<Operation, Fault> {
    let opcode = word.opcode();

    let op = match opcode {
        opcodes::JUMP => Operation::Jump(
            JumpCondition::from_field(word.field()).ok_or_else(|| invalid_field(word))?,
        ),
        opcodes::JUMP_REGISTER..=47 => Operation::JumpOnSign {
            reg: group_register(opcode, opcodes::JUMP_REGISTER),
            condition: SignCondition::from_field(word.field())
                .ok_or_else(|| invalid_field(word))?,
        },
        opcodes::IMMEDIATE..=55 => {
            let mode = match word.field() {
                immediates::ENTER => ImmediateMode::Enter,
                immediates::ENTER_NEGATIVE => ImmediateMode::EnterNegative,
                immediates::INCREMENT => ImmediateMode::Increment,
                immediates::DECREMENT => ImmediateMode::Decrement,
                _ => return Err(invalid_field(word)),
            };
            Operation::Immediate {
                reg: group_register(opcode, opcodes::IMMEDIATE),
                mode,
            }
        }
        _ => Operation::Compare {
            reg: group_register(opcode, opcodes::COMPARE),
            field: field_spec(word)?,
        },
    };
    Ok(op)
}

/// Splits a fetched word into its operation. Opcodes above 63 cannot come
/// from a well-formed image and are reported like any other stub.
pub fn decoder(pc: usize, word: Word) -> Result<Instruction, Fault> {
    let op = match word.opcode() {
        opcodes::NOP..=opcodes::MOVE => decoder_arithmetic(&word)?,
        opcodes::LOAD..=opcodes::STORE_ZERO => decoder_load_store(&word)?,
        opcodes::JBUS..=opcodes::JRED => Operation::Io,
        opcodes::JUMP..=opcodes::MAX => decoder_control(&word)?,
        opcode => {
            error!("Opcode {} does not fit in six bits", opcode);
            return Err(Fault::UnimplementedOpcode {
                opcode,
                pc,
                address: word.address().value(),
                index: word.index(),
                field: word.field(),
            });
        }
    };

    Ok(Instruction { pc, word, op })
}

#[cfg(test)]
mod decoder_tests {
    use super::*;
    use crate::word::Address;

    fn decode(opcode: u8, field: u8) -> Result<Operation, Fault> {
        let word = Word::instruction(Address::from_value(100), 0, field, opcode);
        decoder(0, word).map(|i| i.op)
    }

    #[test]
    fn test_every_opcode_decodes() {
        for opcode in 0..=opcodes::MAX {
            let field = match opcode {
                opcodes::SPECIAL => special::HALT,
                opcodes::JUMP..=opcodes::MAX => 1,
                _ => 5,
            };
            assert!(decode(opcode, field).is_ok(), "opcode {}", opcode);
        }
    }

    #[test]
    fn test_register_groups() {
        assert_eq!(
            decode(10, 5),
            Ok(Operation::Load {
                reg: Register::I2,
                negate: false,
                field: FieldSpec::FULL
            })
        );
        assert_eq!(
            decode(23, 13),
            Ok(Operation::Load {
                reg: Register::X,
                negate: true,
                field: FieldSpec::new(1, 5).unwrap()
            })
        );
        assert_eq!(
            decode(30, 5),
            Ok(Operation::Store {
                source: StoreSource::Register(Register::I6),
                field: FieldSpec::FULL
            })
        );
        assert_eq!(
            decode(32, 2),
            Ok(Operation::Store {
                source: StoreSource::Jump,
                field: FieldSpec::new(0, 2).unwrap()
            })
        );
        assert_eq!(
            decode(33, 5),
            Ok(Operation::Store {
                source: StoreSource::Zero,
                field: FieldSpec::FULL
            })
        );
        assert_eq!(
            decode(47, 4),
            Ok(Operation::JumpOnSign {
                reg: Register::X,
                condition: SignCondition::NonZero
            })
        );
        assert_eq!(
            decode(49, 3),
            Ok(Operation::Immediate {
                reg: Register::I1,
                mode: ImmediateMode::Decrement
            })
        );
        assert_eq!(
            decode(56, 5),
            Ok(Operation::Compare {
                reg: Register::A,
                field: FieldSpec::FULL
            })
        );
    }

    #[test]
    fn test_special_group() {
        assert_eq!(decode(5, 2), Ok(Operation::Halt));
        assert_eq!(decode(5, 0), Ok(Operation::Num));
        assert_eq!(decode(5, 1), Ok(Operation::Char));
        assert_eq!(decode(5, 9), Ok(Operation::Special));
        assert_eq!(decode(6, 0), Ok(Operation::Shift));
        assert_eq!(decode(7, 1), Ok(Operation::Move));
        assert_eq!(decode(36, 0), Ok(Operation::Io));
    }

    #[test]
    fn test_invalid_fields() {
        let invalid = |opcode, field| Err(Fault::InvalidField { opcode, field });
        assert_eq!(decode(1, 8 * 3 + 1), invalid(1, 25));
        assert_eq!(decode(8, 6), invalid(8, 6));
        assert_eq!(decode(39, 10), invalid(39, 10));
        assert_eq!(decode(40, 6), invalid(40, 6));
        assert_eq!(decode(48, 4), invalid(48, 4));
        assert_eq!(decode(60, 7), invalid(60, 7));
    }

    #[test]
    fn test_opcode_out_of_range() {
        let word = Word::new(crate::word::Sign::Plus, [0, 1, 2, 3, 64]);
        assert_eq!(
            decoder(7, word).map(|i| i.op),
            Err(Fault::UnimplementedOpcode {
                opcode: 64,
                pc: 7,
                address: 1,
                index: 2,
                field: 3
            })
        );
    }

    #[test]
    fn test_jump_groups_set_pc() {
        assert!(decode(39, 0).unwrap().sets_pc());
        assert!(decode(42, 2).unwrap().sets_pc());
        assert!(!decode(48, 0).unwrap().sets_pc());
        assert!(!decode(5, 2).unwrap().sets_pc());
    }
}
