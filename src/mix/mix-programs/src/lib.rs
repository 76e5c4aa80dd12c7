#![no_std]

/// A word as it sits in an image: sign (+1 or -1) and five base-64 bytes
pub type RawWord = (i8, [u8; 5]);

/// One populated memory location
pub type Cell = (usize, RawWord);

/// Built-in program image, executed from location 0
pub struct Program {
    pub name: &'static str,
    pub about: &'static str,
    pub image: &'static [Cell],
    pub result: usize, // Location holding the answer after HLT
}

const HLT: RawWord = (1, [0, 0, 0, 2, 5]);

pub static HALT: Program = Program {
    name: "halt",
    about: "a single halt instruction",
    image: &[(0, HLT)],
    result: 0,
};

/// 1 + 2 + ... + 10 into location 100
pub static SUM: Program = Program {
    name: "sum",
    about: "sum of 1..=10 into location 100",
    image: &[
        (0, (1, [0, 10, 0, 0, 49])), // ENT1 10
        (1, (1, [0, 0, 0, 0, 48])),  // ENTA 0
        (2, (1, [0, 0, 1, 2, 48])),  // INCA 0,1
        (3, (1, [0, 1, 0, 3, 49])),  // DEC1 1
        (4, (1, [0, 2, 0, 2, 41])),  // J1P 2
        (5, (1, [1, 36, 0, 5, 24])), // STA 100
        (6, HLT),
    ],
    result: 100,
};

/// 5! into location 202, using 200 and 201 as scratch
pub static FACTORIAL: Program = Program {
    name: "factorial",
    about: "5! into location 202",
    image: &[
        (0, (1, [0, 1, 0, 0, 48])),  // ENTA 1
        (1, (1, [0, 5, 0, 0, 49])),  // ENT1 5
        (2, (1, [3, 8, 0, 5, 25])),  // ST1 200
        (3, (1, [3, 8, 0, 5, 3])),   // MUL 200
        (4, (1, [3, 9, 0, 5, 31])),  // STX 201
        (5, (1, [3, 9, 0, 5, 8])),   // LDA 201
        (6, (1, [0, 1, 0, 3, 49])),  // DEC1 1
        (7, (1, [0, 2, 0, 2, 41])),  // J1P 2
        (8, (1, [3, 10, 0, 5, 24])), // STA 202
        (9, HLT),
    ],
    result: 202,
};

/// Euclid on 84 and 36 by repeated DIV; the answer replaces location 300
pub static GCD: Program = Program {
    name: "gcd",
    about: "gcd(84, 36) into location 300",
    image: &[
        (0, (1, [4, 44, 0, 5, 15])), // LDX 300
        (1, (1, [0, 0, 0, 0, 48])),  // ENTA 0
        (2, (1, [4, 45, 0, 5, 4])),  // DIV 301
        (3, (1, [4, 45, 0, 5, 8])),  // LDA 301
        (4, (1, [4, 44, 0, 5, 24])), // STA 300
        (5, (1, [4, 45, 0, 5, 31])), // STX 301
        (6, (1, [4, 44, 0, 5, 15])), // LDX 300
        (7, (1, [4, 45, 0, 5, 8])),  // LDA 301
        (8, (1, [0, 1, 0, 4, 40])),  // JANZ 1
        (9, HLT),
        (300, (1, [0, 0, 0, 1, 20])), // 84
        (301, (1, [0, 0, 0, 0, 36])), // 36
    ],
    result: 300,
};

/// Larger of locations 300 and 301 into 302, through CMPA and JLE
pub static MAX: Program = Program {
    name: "max",
    about: "max(17, 42) into location 302",
    image: &[
        (0, (1, [4, 44, 0, 5, 8])),  // LDA 300
        (1, (1, [4, 45, 0, 5, 56])), // CMPA 301
        (2, (1, [0, 4, 0, 9, 39])),  // JLE 4
        (3, (1, [4, 45, 0, 5, 8])),  // LDA 301
        (4, (1, [4, 46, 0, 5, 24])), // STA 302
        (5, HLT),
        (300, (1, [0, 0, 0, 0, 17])),
        (301, (1, [0, 0, 0, 0, 42])),
    ],
    result: 302,
};

pub static PROGRAMS: [&Program; 5] = [&HALT, &SUM, &FACTORIAL, &GCD, &MAX];
