//! Escape sequence resolution.
//!
//! Shared by the double-quoted string scanner and the character literal
//! scanner. Each resolved escape reports how wide a value it produced, so
//! the character literal can pick its token kind (`\u` makes a wide char,
//! `\U` and named entities make a 32-bit char).

use crate::entity;
use crate::lex_error::LexErrorKind;
use crate::lexer::Lexer;
use mica_lexer_core::{char_class, utf8};

/// A resolved escape sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Escape {
    /// A raw byte: simple escapes, `\xHH`, octal. Written to string
    /// payloads verbatim, without UTF-8 re-encoding.
    Byte(u8),
    /// `\uHHHH`: a code point that fits in 16 bits.
    Wide(char),
    /// `\UHHHHHHHH` or a named entity: a full code point.
    Quad(char),
    /// End of input directly after the backslash; resolves to `\` and the
    /// caller lets the EOF surface on its next read.
    Eof,
}

impl<'a> Lexer<'a> {
    /// Resolve one escape sequence. The cursor sits just past the `\`.
    pub(crate) fn escape_sequence(&mut self) -> Escape {
        let loc = self.here();
        let b = self.cursor.current();
        match b {
            b'\'' | b'"' | b'?' | b'\\' => {
                self.cursor.advance();
                Escape::Byte(b)
            }
            b'a' => self.simple_escape(7),
            b'b' => self.simple_escape(8),
            b'f' => self.simple_escape(12),
            b'n' => self.simple_escape(10),
            b'r' => self.simple_escape(13),
            b't' => self.simple_escape(9),
            b'v' => self.simple_escape(11),
            b'x' => self.hex_escape(2),
            b'u' => self.hex_escape(4),
            b'U' => self.hex_escape(8),
            b'&' => self.entity_escape(),
            _ if char_class::is_octal_digit(b) => {
                let mut value: u32 = 0;
                let mut n = 0;
                while n < 3 && char_class::is_octal_digit(self.cursor.current()) {
                    value = (value << 3) | u32::from(self.cursor.current() - b'0');
                    self.cursor.advance();
                    n += 1;
                }
                if value > 0xFF {
                    self.error(loc, LexErrorKind::OctalEscapeTooLarge { value });
                }
                Escape::Byte(value as u8)
            }
            0 | 0x1A => Escape::Eof,
            _ if b >= 0x80 => match self.decode_char() {
                Ok(c) => {
                    self.error(loc, LexErrorKind::UndefinedEscape { ch: c });
                    if (c as u32) <= 0xFFFF {
                        Escape::Wide(c)
                    } else {
                        Escape::Quad(c)
                    }
                }
                Err(msg) => {
                    self.error(loc, LexErrorKind::InvalidUtf8 { msg });
                    Escape::Byte(b'?')
                }
            },
            _ => {
                // Undefined escape resolves to the escaped character itself
                self.error(loc, LexErrorKind::UndefinedEscape { ch: b as char });
                self.cursor.advance();
                Escape::Byte(b)
            }
        }
    }

    fn simple_escape(&mut self, value: u8) -> Escape {
        self.cursor.advance();
        Escape::Byte(value)
    }

    /// `\x`, `\u`, `\U`: exactly `ndigits` hex digits.
    fn hex_escape(&mut self, ndigits: u32) -> Escape {
        let loc = self.here();
        let marker = self.cursor.current();
        self.cursor.advance();

        if !char_class::is_hex_digit(self.cursor.current()) {
            // The following character is left for the string scanner
            let c = self.cursor.current();
            self.error(
                loc,
                LexErrorKind::UndefinedHexEscape {
                    ch: if c.is_ascii() && c != 0 { c as char } else { '?' },
                },
            );
            return Escape::Byte(marker);
        }

        let mut value: u32 = 0;
        let mut n = 0;
        while n < ndigits && char_class::is_hex_digit(self.cursor.current()) {
            value = (value << 4) | u32::from(char_class::hex_digit_value(self.cursor.current()));
            self.cursor.advance();
            n += 1;
        }
        if n < ndigits {
            self.error(
                loc,
                LexErrorKind::EscapeHexDigits {
                    found: n,
                    expected: ndigits,
                },
            );
        }

        if ndigits == 2 {
            return Escape::Byte(value as u8);
        }
        if !utf8::is_valid_codepoint(value) {
            self.error(loc, LexErrorKind::InvalidCodePoint { cp: value });
            value = u32::from(b'?');
        }
        let c = char::from_u32(value).unwrap_or('?');
        if ndigits == 4 {
            Escape::Wide(c)
        } else {
            Escape::Quad(c)
        }
    }

    /// `\&name;`: named character entity.
    fn entity_escape(&mut self) -> Escape {
        let loc = self.here();
        self.cursor.advance(); // '&'
        let start = self.cursor.pos();
        loop {
            let b = self.cursor.current();
            if b.is_ascii_alphabetic() || (self.cursor.pos() > start && b.is_ascii_digit()) {
                self.cursor.advance();
                continue;
            }
            if b == b';' {
                let name = String::from_utf8_lossy(self.cursor.bytes_from(start)).into_owned();
                self.cursor.advance();
                return match entity::lookup(&name) {
                    Some(c) => Escape::Quad(c),
                    None => {
                        self.error(loc, LexErrorKind::UnknownEntity { name });
                        Escape::Quad(' ')
                    }
                };
            }
            // Malformed: recover with a space, leave the offending byte
            self.error(loc, LexErrorKind::UnterminatedEntity);
            return Escape::Quad(' ');
        }
    }
}
