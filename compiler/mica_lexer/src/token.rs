//! The token value record.
//!
//! Unlike the bare [`TokenKind`] tag, a [`Token`] carries everything the
//! parser needs: the start location, the byte span in the source, the
//! payload selected by the kind (integer value, float value, string body,
//! interned identifier), and any doc comments harvested from the comments
//! preceding it.

use mica_ir::{Loc, Name, TokenKind};

/// Payload of a token, selected by its kind.
#[derive(Clone, Debug, PartialEq)]
pub enum TokenValue {
    /// No payload (operators, keywords, EOF).
    None,
    /// Integer and character literals (character literals store the code
    /// point value).
    Int(u64),
    /// Float literals, including the imaginary kinds.
    Float(f64),
    /// String literals: an owned copy of the body plus the width postfix
    /// (`0`, `b'c'`, `b'w'`, or `b'd'`). Bytes, not `str`: hex strings
    /// and `\x`/octal escapes can produce arbitrary byte values.
    Str { text: Box<[u8]>, postfix: u8 },
    /// Identifier resolved through the intern pool.
    Ident(Name),
}

impl Default for TokenValue {
    fn default() -> Self {
        TokenValue::None
    }
}

/// A scanned token.
#[derive(Clone, Debug, Default)]
pub struct Token {
    /// What kind of token this is.
    pub kind: TokenKind,
    /// Location of the token start.
    pub loc: Loc,
    /// Byte offset of the token start in the source buffer.
    pub start: u32,
    /// Byte offset one past the token end.
    pub end: u32,
    /// Payload selected by `kind`.
    pub value: TokenValue,
    /// Canonicalized doc comment block preceding this token, if any.
    pub block_comment: Option<Box<str>>,
    /// Canonicalized trailing doc comment from the previous line, if any.
    pub line_comment: Option<Box<str>>,
}

impl Token {
    /// Integer payload; `0` for non-integer tokens.
    #[inline]
    pub fn int_value(&self) -> u64 {
        match self.value {
            TokenValue::Int(v) => v,
            _ => 0,
        }
    }

    /// Float payload; `0.0` for non-float tokens.
    #[inline]
    pub fn float_value(&self) -> f64 {
        match self.value {
            TokenValue::Float(v) => v,
            _ => 0.0,
        }
    }

    /// Identifier payload, if this token is an identifier or keyword that
    /// went through the intern pool.
    #[inline]
    pub fn ident(&self) -> Option<Name> {
        match self.value {
            TokenValue::Ident(name) => Some(name),
            _ => None,
        }
    }

    /// String payload bytes, if this token is a string literal.
    #[inline]
    pub fn string_bytes(&self) -> Option<&[u8]> {
        match &self.value {
            TokenValue::Str { text, .. } => Some(text),
            _ => None,
        }
    }

    /// String postfix (`0` when absent or not a string).
    #[inline]
    pub fn postfix(&self) -> u8 {
        match &self.value {
            TokenValue::Str { postfix, .. } => *postfix,
            _ => 0,
        }
    }
}
