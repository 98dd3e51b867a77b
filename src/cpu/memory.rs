//! SAP-1 memory subsystem.
//!
//! The SAP-1 has a 16 × 8 RAM addressed by the 4-bit memory address
//! register. Programs and their data share the same sixteen cells.

use crate::word::{Addr4, Word8};
use serde::{Serialize, Deserialize};

/// The number of memory cells in the SAP-1.
pub const MEMORY_SIZE: usize = Addr4::COUNT;

/// SAP-1 memory: 16 eight-bit cells.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Memory {
    cells: [Word8; MEMORY_SIZE],
}

impl Memory {
    /// Create a new memory with all cells zeroed.
    pub fn new() -> Self {
        Self {
            cells: [Word8::ZERO; MEMORY_SIZE],
        }
    }

    /// Read a cell. Every `Addr4` is in range.
    #[inline]
    pub fn read(&self, addr: Addr4) -> Word8 {
        self.cells[addr.index()]
    }

    /// Write a cell.
    #[inline]
    pub fn write(&mut self, addr: Addr4, value: Word8) {
        self.cells[addr.index()] = value;
    }

    /// Clear all memory to zeros.
    pub fn clear(&mut self) {
        self.cells = [Word8::ZERO; MEMORY_SIZE];
    }

    /// Replace the contents with a program image.
    ///
    /// Cells past the end of `program` are zeroed; words past the sixteenth
    /// are ignored.
    pub fn load(&mut self, program: &[Word8]) {
        self.clear();
        for (addr, &word) in Addr4::all().zip(program) {
            self.write(addr, word);
        }
    }

    /// All cells in address order.
    pub fn words(&self) -> &[Word8; MEMORY_SIZE] {
        &self.cells
    }

    /// Iterate over (address, word) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Addr4, Word8)> + '_ {
        Addr4::all().zip(self.cells.iter().copied())
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&[Word8]> for Memory {
    fn from(program: &[Word8]) -> Self {
        let mut mem = Memory::new();
        mem.load(program);
        mem
    }
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Only show non-zero cells
        let non_zero: Vec<_> = self.iter()
            .filter(|(_, word)| !word.is_zero())
            .map(|(addr, word)| (addr.value(), word))
            .collect();

        f.debug_struct("Memory")
            .field("non_zero_cells", &non_zero)
            .field("total_cells", &MEMORY_SIZE)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_read_write() {
        let mut mem = Memory::new();
        mem.write(Addr4::new(10), Word8::new(42));
        assert_eq!(mem.read(Addr4::new(10)).value(), 42);
        assert_eq!(mem.read(Addr4::new(11)), Word8::ZERO);
    }

    #[test]
    fn test_load_full_image_reads_back() {
        let image: Vec<Word8> = (0..16u8).map(|i| Word8::new(i.wrapping_mul(37))).collect();
        let mut mem = Memory::new();
        mem.load(&image);

        for (addr, expected) in Addr4::all().zip(&image) {
            assert_eq!(mem.read(addr), *expected, "address {}", addr.value());
        }
    }

    #[test]
    fn test_load_short_image_pads_with_zero() {
        let mut mem = Memory::new();
        mem.write(Addr4::new(9), Word8::new(0xAA));
        mem.load(&[Word8::new(1), Word8::new(2), Word8::new(3)]);

        assert_eq!(mem.read(Addr4::new(0)).value(), 1);
        assert_eq!(mem.read(Addr4::new(2)).value(), 3);
        assert_eq!(mem.read(Addr4::new(3)), Word8::ZERO);
        // Previous contents do not survive a load
        assert_eq!(mem.read(Addr4::new(9)), Word8::ZERO);
    }

    #[test]
    fn test_load_ignores_excess_words() {
        let image = vec![Word8::new(7); 20];
        let mem = Memory::from(image.as_slice());
        assert!(mem.words().iter().all(|w| w.value() == 7));
    }
}
