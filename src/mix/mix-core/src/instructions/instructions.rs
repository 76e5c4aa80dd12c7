use super::{ImmediateMode, Instruction, JumpCondition, SignCondition, StoreSource};
use crate::constants::WORD_CAPACITY;
use crate::cpu::Cpu;
use crate::error::Fault;
use crate::memory::{Comparison, Register, ZERO_REGISTER};
use crate::word::{exceeds_word, Address, FieldSpec, Sign, Word};
use log::{debug, warn};

/// Sign a memory operand contributes to MUL and DIV: partial fields count as
/// positive magnitudes
fn operand_sign(source: &Word, field: FieldSpec) -> Sign {
    if field.includes_sign() {
        source.sign
    } else {
        Sign::Plus
    }
}

/// MIX arithmetic (sign-magnitude implementation)
pub trait Arithmetic {
    fn add(&mut self, cmd: &Instruction, field: FieldSpec) -> Result<(), Fault>; // Add
    fn sub(&mut self, cmd: &Instruction, field: FieldSpec) -> Result<(), Fault>; // Subtract
    fn mul(&mut self, cmd: &Instruction, field: FieldSpec) -> Result<(), Fault>; // Multiply
    fn div(&mut self, cmd: &Instruction, field: FieldSpec) -> Result<(), Fault>; // Divide
}

impl Arithmetic for Cpu {
    fn add(&mut self, cmd: &Instruction, field: FieldSpec) -> Result<(), Fault> {
        let operand = self.operand(cmd)?.decode(field);
        let sum = self.regs.a.value() + operand;

        // Toggle reflects this result only
        self.regs.overflow = exceeds_word(sum);
        self.regs.a = Word::from_value(sum);
        Ok(())
    }

    fn sub(&mut self, cmd: &Instruction, field: FieldSpec) -> Result<(), Fault> {
        // A - M = -(-A + M)
        self.regs.a = self.regs.a.negated();
        let result = self.add(cmd, field);
        self.regs.a = self.regs.a.negated();
        result
    }

    fn mul(&mut self, cmd: &Instruction, field: FieldSpec) -> Result<(), Fault> {
        let source = self.operand(cmd)?;
        let sign = self.regs.a.sign.combine(operand_sign(&source, field));

        let capacity = WORD_CAPACITY as u64;
        let product = self.regs.a.magnitude() * source.decode(field).unsigned_abs();

        // Ten-byte product: high half in A, low half in X, both signed alike
        self.regs.overflow = product >= capacity * capacity;
        self.regs.a = Word::from_magnitude(sign, product / capacity);
        self.regs.x = Word::from_magnitude(sign, product % capacity);
        Ok(())
    }

    fn div(&mut self, cmd: &Instruction, field: FieldSpec) -> Result<(), Fault> {
        let source = self.operand(cmd)?;
        let divisor = source.decode(field).unsigned_abs();

        if divisor == 0 {
            // A and X keep whatever they held
            warn!("Division by zero at {}", cmd.pc);
            self.regs.overflow = true;
            return Ok(());
        }

        let capacity = WORD_CAPACITY as u64;
        let a_sign = self.regs.a.sign;
        let high = self.regs.a.magnitude();
        let dividend = high * capacity + self.regs.x.magnitude();

        self.regs.overflow = high >= divisor;
        self.regs.a = Word::from_magnitude(
            operand_sign(&source, field).combine(a_sign),
            dividend / divisor,
        );
        self.regs.x = Word::from_magnitude(a_sign, dividend % divisor);
        Ok(())
    }
}

/// Loads and stores between registers and memory fields
pub trait LoadStore {
    fn load(
        &mut self,
        cmd: &Instruction,
        reg: Register,
        negate: bool,
        field: FieldSpec,
    ) -> Result<(), Fault>;
    fn store(&mut self, cmd: &Instruction, source: StoreSource, field: FieldSpec)
        -> Result<(), Fault>;
}

impl LoadStore for Cpu {
    // LDA..LDX and LDAN..LDXN
    fn load(
        &mut self,
        cmd: &Instruction,
        reg: Register,
        negate: bool,
        field: FieldSpec,
    ) -> Result<(), Fault> {
        let loaded = self.operand(cmd)?.field_of(field);
        let loaded = if negate { loaded.negated() } else { loaded };
        self.regs.write(reg, loaded)
    }

    // STA..STX, STJ and STZ
    fn store(
        &mut self,
        cmd: &Instruction,
        source: StoreSource,
        field: FieldSpec,
    ) -> Result<(), Fault> {
        let value = match source {
            StoreSource::Register(reg) => self.regs.read(reg),
            StoreSource::Jump => self.regs.j.to_word(),
            StoreSource::Zero => ZERO_REGISTER.to_word(),
        };

        let address = self.effective_address(cmd)?;
        self.mem.word_mut(address)?.set_field(field, &value);
        Ok(())
    }
}

/// Transfers of control and the halt instruction
pub trait ControlFlow {
    fn jump(&mut self, cmd: &Instruction, condition: JumpCondition) -> Result<(), Fault>;
    fn jump_on_sign(
        &mut self,
        cmd: &Instruction,
        reg: Register,
        condition: SignCondition,
    ) -> Result<(), Fault>;
    fn halt(&mut self, cmd: &Instruction);
}

impl ControlFlow for Cpu {
    fn jump(&mut self, cmd: &Instruction, condition: JumpCondition) -> Result<(), Fault> {
        let target = self.effective_address(cmd)?;
        let taken = condition.holds(self.regs.comparison, self.regs.overflow);

        // JOV and JNOV consume the toggle either way
        if condition.clears_overflow() {
            self.regs.overflow = false;
        }

        if !taken {
            self.fall_through();
            return Ok(());
        }

        if condition.saves_return() {
            self.regs.j = Address::from_value(self.pc as i64);
        }
        self.jump_to(target)
    }

    fn jump_on_sign(
        &mut self,
        cmd: &Instruction,
        reg: Register,
        condition: SignCondition,
    ) -> Result<(), Fault> {
        let target = self.effective_address(cmd)?;
        if condition.holds(self.regs.value(reg)) {
            self.jump_to(target)
        } else {
            self.fall_through();
            Ok(())
        }
    }

    fn halt(&mut self, cmd: &Instruction) {
        debug!("HLT at {}", cmd.pc);
        self.stop();
    }
}

/// ENTr, ENNr, INCr, DECr
pub trait Immediate {
    fn immediate(
        &mut self,
        cmd: &Instruction,
        reg: Register,
        mode: ImmediateMode,
    ) -> Result<(), Fault>;
}

impl Immediate for Cpu {
    fn immediate(
        &mut self,
        cmd: &Instruction,
        reg: Register,
        mode: ImmediateMode,
    ) -> Result<(), Fault> {
        // The indexed address is the operand itself, never dereferenced
        let operand = self.effective_address(cmd)?;
        let value = match mode {
            ImmediateMode::Enter => operand,
            ImmediateMode::EnterNegative => -operand,
            ImmediateMode::Increment => self.regs.value(reg) + operand,
            ImmediateMode::Decrement => self.regs.value(reg) - operand,
        };
        self.regs.assign(reg, value);
        Ok(())
    }
}

/// CMPA..CMPX
pub trait Compare {
    fn compare(&mut self, cmd: &Instruction, reg: Register, field: FieldSpec)
        -> Result<(), Fault>;
}

impl Compare for Cpu {
    fn compare(
        &mut self,
        cmd: &Instruction,
        reg: Register,
        field: FieldSpec,
    ) -> Result<(), Fault> {
        // The field narrows the memory side only
        let memory_value = self.operand(cmd)?.decode(field);
        let register_value = self.regs.value(reg);
        self.regs.comparison = Comparison::from(memory_value.cmp(&register_value));
        Ok(())
    }
}
