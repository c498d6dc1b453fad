//! Low-level scanning substrate for the Mica lexer.
//!
//! This crate is standalone (no dependency on the rest of the compiler) and
//! provides:
//!
//! - [`SourceBuffer`]: a sentinel-terminated, cache-line-padded copy of the
//!   source bytes, so the scanner can read one byte past the logical content
//!   without bounds checks
//! - [`Cursor`]: a `Copy` byte cursor over that buffer
//! - [`char_class`]: the 256-entry classification bitmask table, built once
//!   at compile time
//! - [`utf8`]: the validating UTF-8 decode helper
//!
//! End-of-input is byte-driven: a `0x00` or `0x1A` byte terminates scanning
//! wherever it appears, which is why the sentinel needs no position check on
//! the hot path.

pub mod char_class;
pub mod utf8;

mod cursor;
mod source_buffer;

pub use cursor::Cursor;
pub use source_buffer::SourceBuffer;

/// End-of-file marker bytes: NUL and SUB (`^Z`). Either one ends the
/// scannable content, no matter where it appears in the buffer.
#[inline]
#[must_use]
pub fn is_eof_byte(b: u8) -> bool {
    b == 0 || b == 0x1A
}
