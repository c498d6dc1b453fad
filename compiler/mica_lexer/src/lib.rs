//! Hand-written lexer for the Mica language.
//!
//! Turns a byte buffer of source text into a stream of [`Token`]s:
//! longest-match punctuation, identifiers and keywords, numeric literals
//! in four bases with float re-entry, six string literal syntaxes,
//! character literals, three comment shapes (one nesting), doc-comment
//! harvesting, `#line` directives, and index-addressed lookahead.
//!
//! # Usage
//!
//! ```
//! use mica_ir::{StringInterner, TokenKind};
//! use mica_lexer::{CompilerConfig, Lexer};
//! use mica_lexer_core::SourceBuffer;
//!
//! let pool = StringInterner::new();
//! let config = CompilerConfig::default();
//! let buf = SourceBuffer::from_str("int x = 42;");
//! let mut lexer = Lexer::new(&pool, &config, "demo.mi", &buf, 0, false, false);
//!
//! assert_eq!(lexer.next(), TokenKind::Int);
//! assert_eq!(lexer.next(), TokenKind::Identifier);
//! assert_eq!(lexer.next(), TokenKind::Assign);
//! assert_eq!(lexer.next(), TokenKind::Int32Value);
//! assert_eq!(lexer.token.int_value(), 42);
//! assert_eq!(lexer.next(), TokenKind::Semicolon);
//! assert_eq!(lexer.next(), TokenKind::Eof);
//! ```
//!
//! # Collaborators
//!
//! The lexer borrows two long-lived collaborators: the identifier intern
//! pool ([`mica_ir::StringInterner`]) and the [`CompilerConfig`] slice of
//! the compiler configuration. Diagnostics accumulate on the lexer itself
//! ([`Lexer::diagnostics`]); the `errors` flag tells the parser whether
//! any were fatal.

mod comment;
mod config;
mod entity;
mod escape;
mod float_lit;
mod keywords;
mod lex_error;
mod lexer;
mod number;
mod special;
mod string;
mod token;

#[cfg(test)]
mod tests;

pub use config::CompilerConfig;
pub use lex_error::{LexError, LexErrorKind, Severity};
pub use lexer::Lexer;
pub use token::{Token, TokenValue};
