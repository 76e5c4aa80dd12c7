use mix_core::constants::MEMORY_SIZE;
use mix_core::memory::{Comparison, Memory, Register, Registers};
use mix_core::word::Word;
use std::fmt;

/// Octal rendering of a word: `+1 00 00 00 02 05`
pub struct Octal(pub Word);

impl fmt::Display for Octal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:+}", self.0.sign.as_i8())?;
        for byte in self.0.bytes.iter() {
            write!(f, " {:02o}", byte)?;
        }
        Ok(())
    }
}

/// Parses `START:COUNT` and checks it against memory bounds
pub fn parse_range(text: &str) -> Result<(usize, usize), String> {
    let (start, count) = text
        .split_once(':')
        .ok_or_else(|| format!("expected START:COUNT, got {:?}", text))?;
    let start: usize = start
        .trim()
        .parse()
        .map_err(|_| format!("bad start {:?}", start))?;
    let count: usize = count
        .trim()
        .parse()
        .map_err(|_| format!("bad count {:?}", count))?;

    if start.checked_add(count).map_or(true, |end| end > MEMORY_SIZE) {
        return Err(format!(
            "{}:{} runs past the last location {}",
            start,
            count,
            MEMORY_SIZE - 1
        ));
    }
    Ok((start, count))
}

/// Memory lines in image format, so a dump can be loaded back
pub fn memory_lines(mem: &Memory, start: usize, count: usize) -> Vec<String> {
    mem.as_slice()
        .iter()
        .enumerate()
        .skip(start)
        .take(count)
        .map(|(address, word)| format!("{:04}: {}", address, Octal(*word)))
        .collect()
}

pub fn register_lines(regs: &Registers) -> Vec<String> {
    let mut lines: Vec<String> = Register::ALL
        .iter()
        .map(|&reg| {
            let word = regs.read(reg);
            format!("{:<3}{}  ({})", reg.name(), Octal(word), word.value())
        })
        .collect();

    lines.push(format!("{:<3}{}  ({})", "J", Octal(regs.j.to_word()), regs.j.value()));

    let comparison = match regs.comparison {
        Comparison::Less => "LESS",
        Comparison::Equal => "EQUAL",
        Comparison::Greater => "GREATER",
    };
    lines.push(format!("CI {}  OV {}", comparison, if regs.overflow { "ON" } else { "OFF" }));
    lines
}

#[cfg(test)]
mod dump_tests {
    use super::*;
    use crate::loader::Image;
    use mix_core::word::Sign;

    #[test]
    fn test_octal_word() {
        assert_eq!(
            Octal(Word::new(Sign::Plus, [0, 0, 0, 2, 5])).to_string(),
            "+1 00 00 00 02 05"
        );
        assert_eq!(
            Octal(Word::new(Sign::Minus, [63, 8, 0, 0, 1])).to_string(),
            "-1 77 10 00 00 01"
        );
    }

    #[test]
    fn test_parse_range() {
        assert_eq!(parse_range("100:5"), Ok((100, 5)));
        assert_eq!(parse_range("3999:1"), Ok((3999, 1)));
        assert!(parse_range("3999:2").is_err());
        assert!(parse_range("100").is_err());
        assert!(parse_range("a:1").is_err());
    }

    #[test]
    fn test_dump_reloads() {
        let mut mem = Memory::new();
        mem.write(7, Word::new(Sign::Minus, [1, 2, 3, 4, 5])).unwrap();
        mem.write(8, Word::from_value(55)).unwrap();

        let lines = memory_lines(&mem, 7, 2);
        assert_eq!(lines, ["0007: -1 01 02 03 04 05", "0008: +1 00 00 00 00 67"]);

        let image = Image::parse(&lines.join("\n")).unwrap();
        let mut reloaded = Memory::new();
        image.load_into(&mut reloaded).unwrap();
        assert_eq!(reloaded.as_slice()[7..9], mem.as_slice()[7..9]);
    }

    #[test]
    fn test_register_lines() {
        let mut regs = Registers::new();
        regs.assign(Register::I2, -65);
        regs.overflow = true;
        let lines = register_lines(&regs);
        assert_eq!(lines.len(), 10);
        assert_eq!(lines[0], "A  +1 00 00 00 00 00  (0)");
        assert_eq!(lines[2], "I2 -1 00 00 00 01 01  (-65)");
        assert_eq!(lines[9], "CI EQUAL  OV ON");
    }
}
