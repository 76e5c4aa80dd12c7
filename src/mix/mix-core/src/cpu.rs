use crate::decoder::decoder;
use crate::error::Fault;
use crate::instructions::{Arithmetic, Compare, ControlFlow, Immediate, LoadStore};
use crate::instructions::{Instruction, Operation};
use crate::memory::{Memory, Registers};
use crate::word::Word;
use log::{debug, error, trace};

const HISTORY_LEN: usize = 8;

/// Where the fetch-execute loop stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Running,
    Halted,
    Faulted,
}

/// Struct representing the MIX machine and its state
pub struct Cpu {
    pub(crate) mem: Memory, // Main storage
    pub regs: Registers,    // Register file
    pub pc: usize,          // Location of the next instruction
    state: State,
    fault: Option<Fault>, // Set once the machine has faulted
    executed: usize,      // Instructions retired since reset

    history: heapless::Deque<Instruction, HISTORY_LEN>, // Most recent instructions
}

impl Cpu {
    /// Creates a machine over a loaded memory, ready to run from location 0
    pub fn new(mem: Memory) -> Cpu {
        Cpu {
            mem,
            regs: Registers::new(),
            pc: 0,
            state: State::Running,
            fault: None,
            executed: 0,
            history: heapless::Deque::new(),
        }
    }

    /// Back to power-on registers and PC=0. Memory is left as loaded.
    pub fn reset(&mut self) {
        self.regs.reset();
        self.pc = 0;
        self.state = State::Running;
        self.fault = None;
        self.executed = 0;
        self.history = heapless::Deque::new();
    }

    pub fn memory(&self) -> &Memory {
        &self.mem
    }

    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.mem
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// The fault that stopped the machine, if any
    pub fn fault(&self) -> Option<Fault> {
        self.fault
    }

    pub fn executed(&self) -> usize {
        self.executed
    }

    /// Recently executed instructions, oldest first
    pub fn history(&self) -> impl Iterator<Item = &Instruction> + '_ {
        self.history.iter()
    }

    // Operand helpers shared by the micro-ops

    /// Address part plus the selected index register. Not bounds-checked:
    /// immediates use it as a plain value.
    pub(crate) fn effective_address(&self, cmd: &Instruction) -> Result<i64, Fault> {
        let index = self.regs.index_register(cmd.get_index())?;
        Ok(cmd.get_address().value() + index.value())
    }

    /// Memory word at the effective address
    pub(crate) fn operand(&self, cmd: &Instruction) -> Result<Word, Fault> {
        self.mem.read(self.effective_address(cmd)?)
    }

    pub(crate) fn jump_to(&mut self, target: i64) -> Result<(), Fault> {
        self.pc = Memory::locate(target)?;
        debug!("Jump to {}", self.pc);
        Ok(())
    }

    pub(crate) fn fall_through(&mut self) {
        self.pc += 1;
    }

    pub(crate) fn stop(&mut self) {
        self.state = State::Halted;
    }

    fn unimplemented(&self, cmd: &Instruction) -> Fault {
        Fault::UnimplementedOpcode {
            opcode: cmd.get_opcode(),
            pc: cmd.pc,
            address: cmd.get_address().value(),
            index: cmd.get_index(),
            field: cmd.get_field(),
        }
    }

    /// Dispatches one decoded instruction to its micro-op
    pub fn execute(&mut self, inst: &Instruction) -> Result<(), Fault> {
        match inst.op {
            Operation::Nop => Ok(()),
            Operation::Add(field) => self.add(inst, field),
            Operation::Sub(field) => self.sub(inst, field),
            Operation::Mul(field) => self.mul(inst, field),
            Operation::Div(field) => self.div(inst, field),
            Operation::Halt => {
                self.halt(inst);
                Ok(())
            }
            Operation::Load { reg, negate, field } => self.load(inst, reg, negate, field),
            Operation::Store { source, field } => self.store(inst, source, field),
            Operation::Jump(condition) => self.jump(inst, condition),
            Operation::JumpOnSign { reg, condition } => self.jump_on_sign(inst, reg, condition),
            Operation::Immediate { reg, mode } => self.immediate(inst, reg, mode),
            Operation::Compare { reg, field } => self.compare(inst, reg, field),
            Operation::Num
            | Operation::Char
            | Operation::Special
            | Operation::Shift
            | Operation::Move
            | Operation::Io => Err(self.unimplemented(inst)),
        }
    }

    fn remember(&mut self, inst: Instruction) {
        if self.history.is_full() {
            self.history.pop_front();
        }
        // Cannot fail: a slot was just freed
        let _ = self.history.push_back(inst);
    }

    /// Fetch, decode, execute, then advance the PC unless the operation
    /// placed it itself
    fn step_programmed(&mut self) -> Result<(), Fault> {
        let word = self.mem.read(self.pc as i64)?;
        let inst = decoder(self.pc, word)?;
        trace!("{:04}: {:?}", inst.pc, inst.op);

        self.remember(inst);
        self.execute(&inst)?;
        self.executed += 1;

        // HLT leaves the PC on itself
        if self.state == State::Halted {
            return Ok(());
        }

        if !inst.op.sets_pc() {
            self.fall_through();
        }
        Memory::locate(self.pc as i64)?;
        Ok(())
    }

    /// Executes one instruction. A machine that already stopped stays where
    /// it is and reports the same outcome again.
    pub fn step(&mut self) -> Result<State, Fault> {
        if let Some(fault) = self.fault {
            return Err(fault);
        }
        if self.state == State::Halted {
            return Ok(State::Halted);
        }

        match self.step_programmed() {
            Ok(()) => {
                if self.state == State::Halted {
                    debug!("Halted after {} instructions", self.executed);
                }
                Ok(self.state)
            }
            Err(fault) => {
                error!("Fault at {}: {}", self.pc, fault);
                self.state = State::Faulted;
                self.fault = Some(fault);
                Err(fault)
            }
        }
    }

    /// Runs until the machine halts or faults
    pub fn run(&mut self) -> Result<(), Fault> {
        while self.step()? == State::Running {}
        Ok(())
    }

    /// Runs at most `limit` instructions; `Running` means the budget ran out
    pub fn run_for(&mut self, limit: usize) -> Result<State, Fault> {
        for _ in 0..limit {
            if self.step()? != State::Running {
                break;
            }
        }
        Ok(self.state)
    }
}

#[cfg(test)]
mod cpu_tests {
    use super::*;
    use crate::constants::{opcodes, MEMORY_SIZE};
    use crate::instructions::tests::{init_cpu, op};
    use crate::word::Sign;

    /// Memory holding one of the raw images from mix-programs
    fn load_program(image: &[mix_programs::Cell]) -> Cpu {
        let mut mem = Memory::new();
        for &(address, (sign, bytes)) in image {
            mem.write(address as i64, Word::new(Sign::from_i8(sign), bytes))
                .unwrap();
        }
        Cpu::new(mem)
    }

    #[test]
    fn test_halt_word_halts_after_one_cycle() {
        let mut cpu = load_program(mix_programs::HALT.image);
        assert_eq!(cpu.state(), State::Running);
        assert_eq!(cpu.step(), Ok(State::Halted));
        assert_eq!(cpu.executed(), 1);
        assert_eq!(cpu.pc, 0);

        // Halted machines stay halted
        assert_eq!(cpu.step(), Ok(State::Halted));
        assert_eq!(cpu.run(), Ok(()));
        assert_eq!(cpu.executed(), 1);
    }

    #[test]
    fn test_pc_runs_off_the_end() {
        let mut cpu = init_cpu();
        cpu.pc = MEMORY_SIZE - 1;
        assert_eq!(
            cpu.step(),
            Err(Fault::AddressViolation(MEMORY_SIZE as i64))
        );
        assert_eq!(cpu.state(), State::Faulted);
        assert_eq!(cpu.executed(), 1);
    }

    #[test]
    fn test_fault_is_sticky() {
        let mut cpu = init_cpu();
        cpu.memory_mut().write(0, op(opcodes::SHIFT, 0, 0, 1)).unwrap();
        let fault = cpu.run().unwrap_err();
        assert!(matches!(fault, Fault::UnimplementedOpcode { opcode: 6, pc: 0, .. }));
        assert_eq!(cpu.step(), Err(fault));
        assert_eq!(cpu.fault(), Some(fault));
        assert_eq!(cpu.executed(), 0);
    }

    #[test]
    fn test_jump_does_not_advance() {
        let mut cpu = init_cpu();
        cpu.memory_mut().write(0, op(opcodes::JUMP, 10, 0, 0)).unwrap();
        cpu.memory_mut().write(10, op(opcodes::JUMP, 0, 0, 1)).unwrap();
        assert_eq!(cpu.step(), Ok(State::Running));
        assert_eq!(cpu.pc, 10);
        assert_eq!(cpu.step(), Ok(State::Running));
        assert_eq!(cpu.pc, 0);
        assert_eq!(cpu.regs.j.value(), 0);
    }

    #[test]
    fn test_run_for_budget() {
        // JMP 0 forever
        let mut cpu = init_cpu();
        cpu.memory_mut().write(0, op(opcodes::JUMP, 0, 0, 0)).unwrap();
        assert_eq!(cpu.run_for(50), Ok(State::Running));
        assert_eq!(cpu.executed(), 50);
        assert_eq!(cpu.history().count(), HISTORY_LEN);
        assert!(cpu.history().all(|inst| inst.pc == 0));
    }

    #[test]
    fn test_history_keeps_latest() {
        let mut cpu = init_cpu();
        cpu.memory_mut().write(12, Word::new(Sign::Plus, [0, 0, 0, 2, 5])).unwrap();
        cpu.run().unwrap();
        let pcs: Vec<usize> = cpu.history().map(|inst| inst.pc).collect();
        assert_eq!(pcs, (5..=12).collect::<Vec<_>>());
    }

    #[test]
    fn test_reset_keeps_memory() {
        let mut cpu = load_program(mix_programs::SUM.image);
        cpu.run().unwrap();
        cpu.reset();
        assert_eq!(cpu.state(), State::Running);
        assert_eq!(cpu.pc, 0);
        assert_eq!(cpu.executed(), 0);
        assert_eq!(cpu.regs, Registers::new());
        assert_eq!(cpu.history().count(), 0);
        assert_eq!(
            cpu.memory().read(mix_programs::SUM.result as i64),
            Ok(Word::from_value(55))
        );
    }

    #[test]
    fn test_builtin_programs() {
        let expected = [
            (&mix_programs::SUM, 55),
            (&mix_programs::FACTORIAL, 120),
            (&mix_programs::GCD, 12),
            (&mix_programs::MAX, 42),
        ];
        for (program, value) in expected.iter() {
            let mut cpu = load_program(program.image);
            assert_eq!(cpu.run(), Ok(()), "{}", program.name);
            assert_eq!(
                cpu.memory().read(program.result as i64),
                Ok(Word::from_value(*value)),
                "{}",
                program.name
            );
        }
    }

    #[test]
    fn test_every_program_is_listed() {
        let names: Vec<&str> = mix_programs::PROGRAMS.iter().map(|p| p.name).collect();
        assert_eq!(names, ["halt", "sum", "factorial", "gcd", "max"]);
    }
}
