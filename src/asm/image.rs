//! Binary program image format.
//!
//! An image is plain text:
//! - Exactly 16 lines, one per memory address in order
//! - Each line is eight `0`/`1` characters, MSB first
//!
//! When loading, lines past the sixteenth are ignored and missing lines
//! are treated as zero words.

use crate::word::{Addr4, Word8};
use crate::cpu::memory::MEMORY_SIZE;
use std::path::Path;
use std::io::{BufRead, BufReader, Write};
use thiserror::Error;

/// A full 16-word memory image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgramImage {
    words: [Word8; MEMORY_SIZE],
}

impl ProgramImage {
    /// Create an all-zero image.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an image from up to 16 words, zero-padded.
    pub fn from_words(words: &[Word8]) -> Self {
        let mut image = Self::new();
        for (slot, &word) in image.words.iter_mut().zip(words) {
            *slot = word;
        }
        image
    }

    /// Read the word at an address.
    pub fn get(&self, addr: Addr4) -> Word8 {
        self.words[addr.index()]
    }

    /// Overwrite the word at an address.
    pub fn set(&mut self, addr: Addr4, word: Word8) {
        self.words[addr.index()] = word;
    }

    /// All sixteen words.
    pub fn words(&self) -> &[Word8; MEMORY_SIZE] {
        &self.words
    }

    /// Render the image as text, one newline-terminated word per line.
    pub fn to_text(&self) -> String {
        self.words.iter().map(|word| format!("{}\n", word)).collect()
    }

    /// Parse image text.
    pub fn parse(text: &str) -> Result<Self, ImageError> {
        Self::read_from(text.as_bytes())
    }

    /// Read an image from any buffered source.
    pub fn read_from<R: BufRead>(reader: R) -> Result<Self, ImageError> {
        let mut image = Self::new();

        for (line_num, line_result) in reader.lines().take(MEMORY_SIZE).enumerate() {
            let line = line_result.map_err(|e| ImageError::IoError(e.to_string()))?;

            let word = Word8::parse(&line)
                .map_err(|e| ImageError::ParseError {
                    line: line_num + 1,
                    message: e.to_string(),
                })?;

            image.words[line_num] = word;
        }

        Ok(image)
    }
}

impl From<[Word8; MEMORY_SIZE]> for ProgramImage {
    fn from(words: [Word8; MEMORY_SIZE]) -> Self {
        Self { words }
    }
}

/// Load an image file from disk.
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<ProgramImage, ImageError> {
    let file = std::fs::File::open(path.as_ref())
        .map_err(|e| ImageError::IoError(e.to_string()))?;
    ProgramImage::read_from(BufReader::new(file))
}

/// Save an image file to disk.
pub fn save_image<P: AsRef<Path>>(path: P, image: &ProgramImage) -> Result<(), ImageError> {
    let mut file = std::fs::File::create(path.as_ref())
        .map_err(|e| ImageError::IoError(e.to_string()))?;

    file.write_all(image.to_text().as_bytes())
        .map_err(|e| ImageError::IoError(e.to_string()))?;

    Ok(())
}

/// Errors that can occur during image operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("parse error on line {line}: {message}")]
    ParseError { line: usize, message: String },
}
