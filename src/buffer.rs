use std::cmp::min;


/// A growable byte buffer with a read cursor
///
/// Parsers read from the cursor and may `set_cursor` back to abandon
/// a speculative parse. Data in front of the cursor stays in the buffer
/// until `erase`d explicitly.
#[derive(Debug, Clone, Default)]
pub struct ByteBuffer {
    data: Vec<u8>,
    cursor: usize,
}

impl ByteBuffer {
    /// Create an empty buffer
    pub fn new() -> ByteBuffer {
        ByteBuffer {
            data: Vec::new(),
            cursor: 0,
        }
    }
    /// Append bytes at the end of the buffer
    pub fn append(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }
    /// Total number of bytes stored (regardless of the cursor)
    pub fn len(&self) -> usize {
        self.data.len()
    }
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
    /// All the bytes stored in the buffer
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }
    /// Bytes starting at the cursor (empty slice if none left)
    pub fn current(&self) -> &[u8] {
        &self.data[self.cursor..]
    }
    pub fn cursor(&self) -> usize {
        self.cursor
    }
    /// Returns true if at least `n` bytes are available after the cursor
    pub fn require(&self, n: usize) -> bool {
        n <= self.data.len() - self.cursor
    }
    /// Copy `dest.len()` bytes from the cursor and advance it
    ///
    /// Returns false and leaves the buffer untouched if there are not
    /// enough bytes.
    pub fn read(&mut self, dest: &mut [u8]) -> bool {
        let n = dest.len();
        if !self.require(n) {
            return false;
        }
        dest.copy_from_slice(&self.data[self.cursor..self.cursor+n]);
        self.cursor += n;
        true
    }
    /// Advance the cursor by `n` bytes, same failure rules as `read`
    pub fn skip(&mut self, n: usize) -> bool {
        if !self.require(n) {
            return false;
        }
        self.cursor += n;
        true
    }
    /// Drop `n` bytes from the front of the buffer
    ///
    /// Clears the buffer when `n >= len()`, zero is a no-op. The cursor is
    /// moved back by the number of bytes dropped.
    pub fn erase(&mut self, n: usize) {
        if n == 0 {
            return;
        }
        let n = min(n, self.data.len());
        self.data.drain(..n);
        self.cursor = self.cursor.saturating_sub(n);
    }
    /// Move the cursor to the start, keeping the data
    pub fn reset_cursor(&mut self) {
        self.cursor = 0;
    }
    /// Move the cursor to an absolute position
    ///
    /// # Panics
    ///
    /// When `pos` is beyond the end of the data.
    pub fn set_cursor(&mut self, pos: usize) {
        assert!(pos <= self.data.len());
        self.cursor = pos;
    }
}
