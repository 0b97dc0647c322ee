//! Chunk sources
//!
//! A source is a restartable sequence of string fragments. Fragments carry no
//! alignment guarantees: a chunk may split a record, a token, or a multi-byte
//! character sequence mid-way, and the parser downstream must cope. Sources
//! only promise that concatenating every chunk reproduces the payload.

use crate::error::Result;

/// A restartable, lazily-consumed stream of payload fragments
///
/// `open` rewinds the source to the beginning; it is called once per
/// ingestion session, so a session restart replays the payload from scratch.
/// `next_chunk` returns `None` exactly once the payload is exhausted.
pub trait ChunkSource: Send {
    /// Prepare (or rewind) the source for a fresh session
    fn open(&mut self) -> Result<()>;

    /// The next fragment, or `None` at end of stream
    fn next_chunk(&mut self) -> Option<String>;

    /// Total payload size in bytes, when the source knows it up front
    fn len_hint(&self) -> Option<usize> {
        None
    }
}

/// Delivers an in-memory payload one character at a time
///
/// This mirrors the simulated network feed the deck was designed against:
/// maximally adversarial chunking, where every token and every string is
/// split at every possible position.
#[derive(Debug)]
pub struct PerCharSource {
    payload: String,
    cursor: usize,
}

impl PerCharSource {
    pub fn new(payload: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
            cursor: 0,
        }
    }
}

impl ChunkSource for PerCharSource {
    fn open(&mut self) -> Result<()> {
        self.cursor = 0;
        Ok(())
    }

    fn next_chunk(&mut self) -> Option<String> {
        let c = self.payload[self.cursor..].chars().next()?;
        self.cursor += c.len_utf8();
        Some(c.to_string())
    }

    fn len_hint(&self) -> Option<usize> {
        Some(self.payload.len())
    }
}

/// Delivers an in-memory payload in fixed-size pieces
///
/// Chunk boundaries are nudged forward so a multi-byte character is never
/// split across chunks; apart from that, boundaries land wherever the byte
/// count says.
#[derive(Debug)]
pub struct FixedChunkSource {
    payload: String,
    chunk_bytes: usize,
    cursor: usize,
}

impl FixedChunkSource {
    pub fn new(payload: impl Into<String>, chunk_bytes: usize) -> Self {
        Self {
            payload: payload.into(),
            chunk_bytes: chunk_bytes.max(1),
            cursor: 0,
        }
    }
}

impl ChunkSource for FixedChunkSource {
    fn open(&mut self) -> Result<()> {
        self.cursor = 0;
        Ok(())
    }

    fn next_chunk(&mut self) -> Option<String> {
        if self.cursor >= self.payload.len() {
            return None;
        }
        let mut end = (self.cursor + self.chunk_bytes).min(self.payload.len());
        while !self.payload.is_char_boundary(end) {
            end += 1;
        }
        let chunk = self.payload[self.cursor..end].to_string();
        self.cursor = end;
        Some(chunk)
    }

    fn len_hint(&self) -> Option<usize> {
        Some(self.payload.len())
    }
}
