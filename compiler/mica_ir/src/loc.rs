//! Source locations.
//!
//! A [`Loc`] names a point in a source file as the diagnostics see it:
//! interned filename, 1-based line, 1-based column. The lexer computes the
//! column on demand from the byte offset of the current line start, and the
//! `#line` directive can rewrite both the line number and the filename.

use super::Name;
use std::fmt;

/// Source location: `file(line,col)`.
///
/// Layout: 12 bytes. `Copy` so tokens and errors can carry it freely.
/// `line == 0` marks a location that has no meaningful position (used for
/// synthesized tokens); `col == 0` means "line-only" precision.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct Loc {
    /// Interned filename.
    pub file: Name,
    /// 1-based line number, possibly rewritten by `#line`.
    pub line: u32,
    /// 1-based column (byte column within the line).
    pub col: u32,
}

impl Loc {
    /// Create a new location.
    #[inline]
    pub const fn new(file: Name, line: u32, col: u32) -> Self {
        Loc { file, line, col }
    }

    /// Location with no position information.
    pub const NONE: Loc = Loc {
        file: Name::EMPTY,
        line: 0,
        col: 0,
    };

    /// Returns `true` if this location carries real position information.
    #[inline]
    pub const fn is_valid(&self) -> bool {
        self.line != 0
    }
}

impl fmt::Debug for Loc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({},{})", self.file, self.line, self.col)
    }
}

/// Renders as `(line)` or `(line,col)`; the filename itself needs the
/// interner to resolve, so callers prepend it when formatting diagnostics.
impl fmt::Display for Loc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.col == 0 {
            write!(f, "({})", self.line)
        } else {
            write!(f, "({},{})", self.line, self.col)
        }
    }
}

/// Size assertion: Loc stays pocket-sized for embedding in every token.
const _: () = assert!(std::mem::size_of::<Loc>() == 12);
