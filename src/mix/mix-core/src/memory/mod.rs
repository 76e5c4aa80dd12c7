mod memory;
mod registers;

pub use self::memory::Memory;
pub use self::registers::{Comparison, Register, RegisterSlot, Registers, ZERO_REGISTER};
