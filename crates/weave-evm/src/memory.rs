//! Frame memory

use crate::word::Word;

/// Physical growth step in bytes
const CHUNK_SIZE: usize = 1024;

/// Byte-addressable scratch memory.
///
/// `size` is the soft size billed for gas: the highest touched byte rounded up
/// to a whole word. It only grows. The backing buffer grows in 1 KiB chunks
/// and is always at least `size` bytes long.
#[derive(Clone, Debug, Default)]
pub struct Memory {
    data: Vec<u8>,
    size: usize,
}

impl Memory {
    /// Create new empty memory
    pub fn new() -> Self {
        Self::default()
    }

    /// Soft size in bytes (multiple of 32)
    pub fn size(&self) -> usize {
        self.size
    }

    /// Soft size in words
    pub fn words(&self) -> usize {
        self.size / 32
    }

    /// Grow the soft size to cover `offset..offset + len`. No-op for `len == 0`.
    pub fn extend(&mut self, offset: usize, len: usize) {
        if len == 0 {
            return;
        }
        self.extend_to(offset.saturating_add(len));
    }

    /// Grow the soft size to cover the first `end` bytes
    pub fn extend_to(&mut self, end: usize) {
        if end <= self.size {
            return;
        }
        self.size = end.div_ceil(32) * 32;
        if self.size > self.data.len() {
            let physical = self.size.div_ceil(CHUNK_SIZE) * CHUNK_SIZE;
            self.data.resize(physical, 0);
        }
    }

    /// Read `len` bytes at `offset`, extending memory
    pub fn read(&mut self, offset: usize, len: usize) -> Vec<u8> {
        if len == 0 {
            return Vec::new();
        }
        self.extend(offset, len);
        self.data[offset..offset + len].to_vec()
    }

    /// Read a word at `offset`, extending memory
    pub fn read_word(&mut self, offset: usize) -> Word {
        self.extend(offset, 32);
        Word::from_bytes(&self.data[offset..offset + 32])
    }

    /// Write `data` at `offset`, extending memory
    pub fn write(&mut self, offset: usize, data: &[u8]) {
        if data.is_empty() {
            return;
        }
        self.extend(offset, data.len());
        self.data[offset..offset + data.len()].copy_from_slice(data);
    }

    /// Write a word at `offset`
    pub fn write_word(&mut self, offset: usize, value: Word) {
        self.write(offset, &value.to_be_bytes());
    }

    /// Write one byte at `offset`
    pub fn write_byte(&mut self, offset: usize, value: u8) {
        self.write(offset, &[value]);
    }

    /// Fill `offset..offset + len` from `data`, zero-padding past its end
    pub fn write_padded(&mut self, offset: usize, len: usize, data: &[u8]) {
        if len == 0 {
            return;
        }
        self.extend(offset, len);
        let copied = data.len().min(len);
        self.data[offset..offset + copied].copy_from_slice(&data[..copied]);
        self.data[offset + copied..offset + len].fill(0);
    }

    /// Write at most `limit` bytes of `data` at `offset`
    pub fn write_limited(&mut self, offset: usize, limit: usize, data: &[u8]) {
        let len = data.len().min(limit);
        self.write(offset, &data[..len]);
    }

    /// Soft-sized view of the contents
    pub fn data(&self) -> &[u8] {
        &self.data[..self.size]
    }
}
