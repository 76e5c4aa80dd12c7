// Radix of a single MIX byte and the number of bytes in each register shape
pub const BYTE_BASE: i64 = 64;
pub const WORD_BYTES: usize = 5;
pub const ADDRESS_BYTES: usize = 2;

// Magnitudes must stay strictly below these
pub const WORD_CAPACITY: i64 = 1 << 30; // 64^5
pub const ADDRESS_CAPACITY: i64 = 1 << 12; // 64^2

// Main storage, in words
pub const MEMORY_SIZE: usize = 4000;

pub mod layout {
    // Byte positions of an instruction word (sign excluded)
    pub const ADDRESS_HIGH: usize = 0;
    pub const ADDRESS_LOW: usize = 1;
    pub const INDEX: usize = 2;
    pub const FIELD: usize = 3;
    pub const OPCODE: usize = 4;

    // Largest position a field specification can name
    pub const FIELD_MAX: u8 = 5;
    pub const FIELD_RADIX: u8 = 8;

    // Index selector 0 reads the zero register
    pub const INDEX_MAX: u8 = 6;
}

pub mod opcodes {
    pub const NOP: u8 = 0;
    pub const ADD: u8 = 1;
    pub const SUB: u8 = 2;
    pub const MUL: u8 = 3;
    pub const DIV: u8 = 4;
    pub const SPECIAL: u8 = 5; // NUM, CHAR, HLT
    pub const SHIFT: u8 = 6;
    pub const MOVE: u8 = 7;

    // Register groups: base opcode followed by A, I1..I6, X
    pub const LOAD: u8 = 8;
    pub const LOAD_NEGATIVE: u8 = 16;
    pub const STORE: u8 = 24;
    pub const STORE_J: u8 = 32;
    pub const STORE_ZERO: u8 = 33;

    // Device instructions
    pub const JBUS: u8 = 34;
    pub const IOC: u8 = 35;
    pub const IN: u8 = 36;
    pub const OUT: u8 = 37;
    pub const JRED: u8 = 38;

    pub const JUMP: u8 = 39;
    pub const JUMP_REGISTER: u8 = 40;
    pub const IMMEDIATE: u8 = 48;
    pub const COMPARE: u8 = 56;

    pub const GROUP_SIZE: u8 = 8;
    pub const MAX: u8 = 63;
}

pub mod special {
    // Field values of opcode 5
    pub const NUM: u8 = 0;
    pub const CHAR: u8 = 1;
    pub const HALT: u8 = 2;
}

pub mod jumps {
    // Field values of opcode 39
    pub const JMP: u8 = 0;
    pub const JSJ: u8 = 1;
    pub const JOV: u8 = 2;
    pub const JNOV: u8 = 3;
    pub const JL: u8 = 4;
    pub const JE: u8 = 5;
    pub const JG: u8 = 6;
    pub const JGE: u8 = 7;
    pub const JNE: u8 = 8;
    pub const JLE: u8 = 9;

    // Field values of opcodes 40..=47
    pub const NEGATIVE: u8 = 0;
    pub const ZERO: u8 = 1;
    pub const POSITIVE: u8 = 2;
    pub const NON_NEGATIVE: u8 = 3;
    pub const NON_ZERO: u8 = 4;
    pub const NON_POSITIVE: u8 = 5;
}

pub mod immediates {
    // Field values of opcodes 48..=55
    pub const ENTER: u8 = 0;
    pub const ENTER_NEGATIVE: u8 = 1;
    pub const INCREMENT: u8 = 2;
    pub const DECREMENT: u8 = 3;
}
