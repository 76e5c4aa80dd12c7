use mix_core::error::Fault;
use mix_core::memory::Memory;
use mix_core::word::{Sign, Word};
use std::path::Path;
use thiserror::Error;

/// Problems with a memory image, reported with the 1-based line number
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read image: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: {text:?} is not a decimal address")]
    BadAddress { line: usize, text: String },

    #[error("line {line}: expected a sign and 5 bytes, found {found} fields")]
    WrongFieldCount { line: usize, found: usize },

    #[error("line {line}: {text:?} is not a sign (+1, -1, + or -)")]
    BadSign { line: usize, text: String },

    #[error("line {line}: {text:?} is not an octal byte in 00..=77")]
    BadByte { line: usize, text: String },

    #[error("{0}")]
    Placement(#[from] Fault),
}

/// Consecutive words starting at `origin`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub origin: usize,
    pub words: Vec<Word>,
}

/// A sparse memory image, kept as runs of consecutive locations
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Image {
    segments: Vec<Segment>,
}

impl Image {
    pub fn new() -> Self {
        Self::default()
    }

    /// Location right after the last word pushed
    fn next_address(&self) -> usize {
        self.segments
            .last()
            .map_or(0, |seg| seg.origin + seg.words.len())
    }

    pub fn push(&mut self, address: usize, word: Word) {
        match self.segments.last_mut() {
            Some(seg) if seg.origin + seg.words.len() == address => seg.words.push(word),
            _ => self.segments.push(Segment {
                origin: address,
                words: vec![word],
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.segments.iter().map(|seg| seg.words.len()).sum()
    }

    /// Image of one of the built-in programs
    pub fn from_cells(cells: &[mix_programs::Cell]) -> Self {
        let mut image = Self::new();
        for &(address, (sign, bytes)) in cells {
            image.push(address, Word::new(Sign::from_i8(sign), bytes));
        }
        image
    }

    /// Parses `ADDR: SIGN B1 B2 B3 B4 B5` lines. ADDR is decimal and
    /// optional, the bytes are octal, `#` starts a comment.
    pub fn parse(text: &str) -> Result<Self, LoadError> {
        let mut image = Self::new();

        for (n, raw) in text.lines().enumerate() {
            let line = n + 1;
            let content = raw.split('#').next().unwrap_or("").trim();
            if content.is_empty() {
                continue;
            }

            let (address, rest) = match content.split_once(':') {
                Some((addr, rest)) => {
                    let addr = addr.trim();
                    let address = addr.parse::<usize>().map_err(|_| LoadError::BadAddress {
                        line,
                        text: addr.to_string(),
                    })?;
                    (address, rest)
                }
                None => (image.next_address(), content),
            };

            image.push(address, parse_word(line, rest)?);
        }

        Ok(image)
    }

    pub fn from_file(path: &Path) -> Result<Self, LoadError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Writes every segment into memory
    pub fn load_into(&self, mem: &mut Memory) -> Result<(), LoadError> {
        for seg in &self.segments {
            mem.load(seg.origin, &seg.words)?;
        }
        Ok(())
    }
}

fn parse_word(line: usize, text: &str) -> Result<Word, LoadError> {
    let fields: Vec<&str> = text.split_whitespace().collect();
    if fields.len() != 6 {
        return Err(LoadError::WrongFieldCount {
            line,
            found: fields.len(),
        });
    }

    let sign = match fields[0] {
        "+1" | "+" => Sign::Plus,
        "-1" | "-" => Sign::Minus,
        other => {
            return Err(LoadError::BadSign {
                line,
                text: other.to_string(),
            })
        }
    };

    let mut bytes = [0u8; 5];
    for (byte, text) in bytes.iter_mut().zip(&fields[1..]) {
        *byte = u8::from_str_radix(text, 8)
            .ok()
            .filter(|&b| b < 64)
            .ok_or_else(|| LoadError::BadByte {
                line,
                text: text.to_string(),
            })?;
    }

    Ok(Word::new(sign, bytes))
}

#[cfg(test)]
mod loader_tests {
    use super::*;

    #[test]
    fn test_parse_addressed_and_following_lines() {
        let text = "\
# sum of two cells
0: +1 00 00 00 02 05
10: -1 77 01 02 03 04   # data
+ 00 00 00 00 01

12: - 00 00 00 00 00
";
        let image = Image::parse(text).unwrap();
        assert_eq!(image.len(), 4);
        assert_eq!(
            image.segments,
            &[
                Segment {
                    origin: 0,
                    words: vec![Word::new(Sign::Plus, [0, 0, 0, 2, 5])],
                },
                Segment {
                    origin: 10,
                    words: vec![
                        Word::new(Sign::Minus, [63, 1, 2, 3, 4]),
                        Word::new(Sign::Plus, [0, 0, 0, 0, 1]),
                        Word::new(Sign::Minus, [0; 5]),
                    ],
                },
            ]
        );
    }

    #[test]
    fn test_parse_errors_carry_line() {
        assert!(matches!(
            Image::parse("x: +1 00 00 00 00 00"),
            Err(LoadError::BadAddress { line: 1, .. })
        ));
        assert!(matches!(
            Image::parse("\n+1 00 00 00 00"),
            Err(LoadError::WrongFieldCount { line: 2, found: 5 })
        ));
        assert!(matches!(
            Image::parse("0: 1 00 00 00 00 00"),
            Err(LoadError::BadSign { line: 1, .. })
        ));
        assert!(matches!(
            Image::parse("0: +1 00 00 00 00 100"),
            Err(LoadError::BadByte { line: 1, .. })
        ));
        assert!(matches!(
            Image::parse("0: +1 00 08 00 00 00"),
            Err(LoadError::BadByte { line: 1, .. })
        ));
    }

    #[test]
    fn test_load_into_memory() {
        let image = Image::parse("3998: +1 00 00 00 00 07\n+1 00 00 00 00 10").unwrap();
        let mut mem = Memory::new();
        image.load_into(&mut mem).unwrap();
        assert_eq!(mem.read(3998), Ok(Word::from_value(7)));
        assert_eq!(mem.read(3999), Ok(Word::from_value(8)));

        let too_long = Image::parse("3999: +1 00 00 00 00 07\n+1 00 00 00 00 10").unwrap();
        assert!(matches!(
            too_long.load_into(&mut mem),
            Err(LoadError::Placement(Fault::ImageTooLarge {
                origin: 3999,
                len: 2
            }))
        ));
    }

    #[test]
    fn test_builtin_cells_group_into_segments() {
        let image = Image::from_cells(mix_programs::GCD.image);
        let origins: Vec<usize> = image.segments.iter().map(|s| s.origin).collect();
        assert_eq!(origins, [0, 300]);
        assert_eq!(image.len(), mix_programs::GCD.image.len());
    }
}
