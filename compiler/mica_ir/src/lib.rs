//! Shared identity types for the Mica compiler front end.
//!
//! This crate holds the small, widely-shared vocabulary that both the lexer
//! and its consumers (the parser, diagnostics rendering) speak:
//!
//! - [`Name`]: a compact 32-bit handle for an interned string
//! - [`StringInterner`]: the process-wide intern pool; it outlives any lexer
//! - [`Loc`]: a `file(line,col)` source location
//! - [`TokenKind`]: the closed enumeration of token kinds, one variant per
//!   keyword, operator, and literal family

mod interner;
mod loc;
mod name;
mod token;

pub use interner::{InternError, StringInterner};
pub use loc::Loc;
pub use name::Name;
pub use token::TokenKind;
