//! Sentinel-terminated source buffer for zero-bounds-check scanning.
//!
//! The buffer guarantees a `0x00` sentinel byte after the source content,
//! allowing the scanner to detect EOF without explicit bounds checking. The
//! total buffer size is rounded up to the next 64-byte boundary for
//! cache-line alignment, which also provides safe padding for `peek()` and
//! `peek2()` operations near the end of the buffer.
//!
//! The buffer stores raw bytes, not `str`: Mica source is nominally UTF-8
//! but the lexer itself validates multi-byte sequences and must be able to
//! scan past (and diagnose) broken ones.

use crate::Cursor;

/// Cache line size in bytes, used for buffer alignment padding.
const CACHE_LINE: usize = 64;

/// Sentinel-terminated source buffer.
///
/// # Layout
///
/// ```text
/// [source_bytes..., 0x00, padding_zeros...]
///  ^                ^     ^
///  0                |     rounded up to 64-byte boundary
///              source_len (sentinel)
/// ```
///
/// The sentinel byte at `source_len` is always `0x00`. All subsequent bytes
/// (cache-line padding) are also `0x00`, ensuring safe reads for `peek()`
/// and `peek2()` near the end of the buffer.
#[derive(Clone, Debug)]
pub struct SourceBuffer {
    /// Owned buffer: `[source_bytes..., 0x00 sentinel, 0x00 padding...]`.
    buf: Vec<u8>,
    /// Length of the actual source content (excludes sentinel and padding).
    source_len: u32,
}

impl SourceBuffer {
    /// Create a new sentinel-terminated buffer from source bytes.
    ///
    /// Copies the bytes into a cache-line-aligned buffer with a `0x00`
    /// sentinel appended. If the source itself already ends with a `0x00`
    /// or `0x1A` terminator, that byte simply becomes part of the content
    /// and ends scanning exactly like the appended sentinel would.
    ///
    /// Sources larger than `u32::MAX` bytes are truncated to that length;
    /// positions are `u32` throughout the lexer to keep tokens compact.
    pub fn new(source: &[u8]) -> Self {
        let source_len = source.len().min(u32::MAX as usize - 2 * CACHE_LINE);

        // Round up to a 64-byte boundary, always leaving at least one full
        // cache line of zeros past the sentinel so `peek`/`peek2` and small
        // overshoots near EOF stay in bounds.
        let padded_len = (source_len + 1 + CACHE_LINE) & !(CACHE_LINE - 1);

        // Allocate zero-filled buffer, then copy source bytes. The sentinel
        // (buf[source_len]) and padding are already 0x00.
        let mut buf = vec![0u8; padded_len];
        buf[..source_len].copy_from_slice(&source[..source_len]);

        Self {
            buf,
            source_len: source_len as u32,
        }
    }

    /// Create a buffer from a `&str` source.
    pub fn from_str(source: &str) -> Self {
        Self::new(source.as_bytes())
    }

    /// Returns the source bytes (without sentinel or padding).
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.source_len as usize]
    }

    /// Returns the full buffer including sentinel and cache-line padding.
    pub fn as_sentinel_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Create a [`Cursor`] positioned at byte 0.
    pub fn cursor(&self) -> Cursor<'_> {
        Cursor::new(&self.buf, self.source_len)
    }

    /// Length of the source content in bytes (excludes sentinel and padding).
    pub fn len(&self) -> u32 {
        self.source_len
    }

    /// Returns `true` if the source content is empty.
    pub fn is_empty(&self) -> bool {
        self.source_len == 0
    }
}
