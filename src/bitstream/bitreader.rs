//! BitReader: reads a compressed stream in bounded chunks.
//!
//! Only one chunk is held in memory at a time. The decoder walks the bits of each chunk
//! with bits(), most significant bit first, and carries its own state from one chunk to
//! the next.
//!
//! NOTE: This module can read from any I/O source that supports the read() call.
//!

use std::io::{self, Read};

/// Reads a compressed artifact chunk by chunk.
#[derive(Debug)]
pub struct BitReader<R> {
    buffer: Vec<u8>,
    source: R,
    chunks: u64,
}

impl<R: Read> BitReader<R> {
    /// Creates a new BitReader that hands out chunks of at most `chunk_size` bytes.
    pub fn new(source: R, chunk_size: usize) -> Self {
        Self {
            buffer: vec![0; chunk_size.max(1)],
            source,
            chunks: 0,
        }
    }

    /// Return the next chunk, or None if there is no more data to read. Every chunk but the
    /// last is exactly chunk_size bytes long, whatever sizes the source returns.
    pub fn next_chunk(&mut self) -> io::Result<Option<&[u8]>> {
        let mut filled = 0;
        while filled < self.buffer.len() {
            match self.source.read(&mut self.buffer[filled..]) {
                // Nothing came back, the source is drained.
                Ok(0) => break,
                Ok(size) => filled += size,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        if filled == 0 {
            return Ok(None);
        }
        self.chunks += 1;
        Ok(Some(&self.buffer[..filled]))
    }

    /// Count of chunks read so far.
    pub fn chunks(&self) -> u64 {
        self.chunks
    }
}

/// Iterate over the bits of `bytes`, most significant bit of each byte first.
pub fn bits(bytes: &[u8]) -> impl Iterator<Item = bool> + '_ {
    bytes
        .iter()
        .flat_map(|&byte| (0..8).rev().map(move |shift| (byte >> shift) & 1 == 1))
}
