use crate::constants::MEMORY_SIZE;
use crate::error::Fault;
use crate::word::Word;

/// Main storage: 4000 sign-magnitude words, zero at power-on
pub struct Memory {
    words: [Word; MEMORY_SIZE],
}

impl Memory {
    pub fn new() -> Self {
        Self {
            words: [Word::ZERO; MEMORY_SIZE],
        }
    }

    /// Checks a signed address against the memory bounds
    pub fn locate(address: i64) -> Result<usize, Fault> {
        if (0..MEMORY_SIZE as i64).contains(&address) {
            Ok(address as usize)
        } else {
            Err(Fault::AddressViolation(address))
        }
    }

    pub fn read(&self, address: i64) -> Result<Word, Fault> {
        Ok(self.words[Self::locate(address)?])
    }

    pub fn write(&mut self, address: i64, word: Word) -> Result<(), Fault> {
        self.words[Self::locate(address)?] = word;
        Ok(())
    }

    pub fn word_mut(&mut self, address: i64) -> Result<&mut Word, Fault> {
        let idx = Self::locate(address)?;
        Ok(&mut self.words[idx])
    }

    /// Copies a program image into consecutive locations from `origin`
    pub fn load(&mut self, origin: usize, image: &[Word]) -> Result<(), Fault> {
        let end = origin
            .checked_add(image.len())
            .filter(|&end| end <= MEMORY_SIZE)
            .ok_or(Fault::ImageTooLarge {
                origin,
                len: image.len(),
            })?;
        self.words[origin..end].copy_from_slice(image);
        Ok(())
    }

    pub fn as_slice(&self) -> &[Word] {
        &self.words
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod memory_tests {
    use super::*;

    #[test]
    fn test_bounds() {
        let mut mem = Memory::new();
        assert_eq!(mem.read(0), Ok(Word::ZERO));
        assert_eq!(mem.read(3999), Ok(Word::ZERO));
        assert_eq!(mem.read(4000), Err(Fault::AddressViolation(4000)));
        assert_eq!(mem.read(-1), Err(Fault::AddressViolation(-1)));
        assert_eq!(
            mem.write(4000, Word::from_value(1)),
            Err(Fault::AddressViolation(4000))
        );
    }

    #[test]
    fn test_load_image() {
        let mut mem = Memory::new();
        let image = [Word::from_value(1), Word::from_value(-2)];
        mem.load(3998, &image).unwrap();
        assert_eq!(mem.read(3999), Ok(Word::from_value(-2)));

        assert_eq!(
            mem.load(3999, &image),
            Err(Fault::ImageTooLarge {
                origin: 3999,
                len: 2
            })
        );
        // A rejected image leaves memory untouched
        assert_eq!(mem.read(3999), Ok(Word::from_value(-2)));
    }
}
