//! Numeric literal scanning.
//!
//! Integers are scanned in place with base detection (`0x`/`0b`/leading-
//! octal/decimal), `_` separators, and 64-bit overflow tracking. A handful
//! of mid-scan characters re-enter scanning as a float from the literal's
//! original start: `.` (unless it begins a range or a property access),
//! `e`/`E`/`f`/`F` outside hex, `p`/`P` inside hex, `i`/`I`, and `L`
//! immediately followed by `i`.
//!
//! A digit outside the literal's radix is diagnosed but still accumulated
//! into the value; existing consumers rely on the recovered value.

use crate::float_lit;
use crate::lex_error::LexErrorKind;
use crate::lexer::Lexer;
use crate::token::{Token, TokenValue};
use mica_ir::TokenKind;
use mica_lexer_core::char_class;

impl<'a> Lexer<'a> {
    /// Scan an integer literal; the cursor sits on its first digit.
    ///
    /// Returns early into [`scan_float`](Self::scan_float) when a float
    /// trigger appears mid-scan.
    pub(crate) fn scan_number(&mut self, t: &mut Token) -> TokenKind {
        let start = self.cursor.pos();
        let loc = t.loc;
        let first = self.cursor.current();
        self.cursor.advance();

        let mut base: u64 = 10;
        if first == b'0' {
            match self.cursor.current() {
                b'x' | b'X' => {
                    self.cursor.advance();
                    base = 16;
                }
                b'b' | b'B' => {
                    self.cursor.advance();
                    base = 2;
                }
                c if char_class::is_octal_digit(c) || c == b'_' => base = 8,
                _ => {}
            }
        }

        let mut value: u64 = if base == 16 || base == 2 {
            0
        } else {
            u64::from(first - b'0')
        };
        let mut digit_count: u32 = u32::from(base == 10 || base == 8);
        let mut overflow = false;

        loop {
            let c = self.cursor.current();
            let d: u64 = match c {
                b'_' => {
                    self.cursor.advance();
                    continue;
                }
                b'0'..=b'9' => u64::from(c - b'0'),
                b'a'..=b'f' | b'A'..=b'F' => {
                    if base != 16 && matches!(c, b'e' | b'E' | b'f' | b'F') {
                        return self.scan_float(t, start);
                    }
                    u64::from(char_class::hex_digit_value(c))
                }
                b'i' | b'I' => return self.scan_float(t, start),
                b'p' | b'P' if base == 16 => return self.scan_float(t, start),
                b'L' if self.cursor.peek() == b'i' => return self.scan_float(t, start),
                b'.' => {
                    let next = self.cursor.peek();
                    if next == b'.' {
                        break; // range operator
                    }
                    match base {
                        10 => {
                            if char_class::is_ident_start(next) || next >= 0x80 {
                                break; // property access on the literal
                            }
                            return self.scan_float(t, start);
                        }
                        16 => {
                            if char_class::is_hex_digit(next) {
                                return self.scan_float(t, start);
                            }
                            break;
                        }
                        _ => break,
                    }
                }
                _ => break,
            };

            if d >= base {
                // Diagnose but keep accumulating; the token still carries
                // the recovered value.
                self.error(
                    self.here(),
                    LexErrorKind::RadixDigit {
                        radix: base as u32,
                        digit: c as char,
                    },
                );
            }
            self.cursor.advance();
            digit_count += 1;
            value = match value.checked_mul(base).and_then(|v| v.checked_add(d)) {
                Some(v) => v,
                None => {
                    overflow = true;
                    value
                }
            };
        }

        if digit_count == 0 {
            // `0x` or `0b` with nothing after the prefix
            let c = self.cursor.current();
            self.error(
                loc,
                LexErrorKind::RadixDigit {
                    radix: base as u32,
                    digit: if c.is_ascii() { c as char } else { '?' },
                },
            );
        }

        // Suffix flags, any combination of U/u and L (l is deprecated)
        let mut unsigned_suffix = false;
        let mut long_suffix = false;
        loop {
            match self.cursor.current() {
                b'u' | b'U' => {
                    if unsigned_suffix {
                        self.error(self.here(), LexErrorKind::RepeatedSuffix { suffix: 'U' });
                    }
                    unsigned_suffix = true;
                    self.cursor.advance();
                }
                b'L' => {
                    if long_suffix {
                        self.error(self.here(), LexErrorKind::RepeatedSuffix { suffix: 'L' });
                    }
                    long_suffix = true;
                    self.cursor.advance();
                }
                b'l' => {
                    self.deprecation(self.here(), LexErrorKind::LowercaseLSuffix);
                    if long_suffix {
                        self.error(self.here(), LexErrorKind::RepeatedSuffix { suffix: 'L' });
                    }
                    long_suffix = true;
                    self.cursor.advance();
                }
                _ => break,
            }
        }

        if base == 8 && value >= 8 {
            self.deprecation(loc, LexErrorKind::OctalLiteral { value });
        }
        if overflow {
            self.error(loc, LexErrorKind::IntegerOverflow);
        }

        let decimal = base == 10;
        let kind = match (unsigned_suffix, long_suffix) {
            (false, false) => {
                if value <= 0x7FFF_FFFF {
                    TokenKind::Int32Value
                } else if !decimal && value <= 0xFFFF_FFFF {
                    TokenKind::Uns32Value
                } else if value <= 0x7FFF_FFFF_FFFF_FFFF {
                    TokenKind::Int64Value
                } else if decimal {
                    self.error(loc, LexErrorKind::SignedIntegerOverflow);
                    TokenKind::Uns64Value
                } else {
                    TokenKind::Uns64Value
                }
            }
            (true, false) => {
                if value <= 0xFFFF_FFFF {
                    TokenKind::Uns32Value
                } else {
                    TokenKind::Uns64Value
                }
            }
            (false, true) => {
                if value <= 0x7FFF_FFFF_FFFF_FFFF {
                    TokenKind::Int64Value
                } else if decimal {
                    self.error(loc, LexErrorKind::SignedIntegerOverflow);
                    TokenKind::Uns64Value
                } else {
                    TokenKind::Uns64Value
                }
            }
            (true, true) => TokenKind::Uns64Value,
        };

        t.value = TokenValue::Int(value);
        kind
    }

    /// Scan a float literal, restarting from the original start of the
    /// number. The digit bytes (minus `_` separators) are collected into
    /// the scratch buffer and parsed as ASCII.
    pub(crate) fn scan_float(&mut self, t: &mut Token, start: u32) -> TokenKind {
        self.cursor.set_pos(start);
        self.scratch.clear();
        let loc = t.loc;

        let hex = self.cursor.current() == b'0' && matches!(self.cursor.peek(), b'x' | b'X');
        if hex {
            self.scratch.extend_from_slice(b"0x");
            self.cursor.advance_n(2);
        }

        self.copy_float_digits(hex);
        if self.cursor.current() == b'.' && self.cursor.peek() != b'.' {
            self.scratch.push(b'.');
            self.cursor.advance();
            self.copy_float_digits(hex);
        }

        if hex {
            if matches!(self.cursor.current(), b'p' | b'P') {
                self.scratch.push(b'p');
                self.cursor.advance();
                self.copy_exponent_digits(loc);
            } else {
                self.error(loc, LexErrorKind::HexFloatExponentRequired);
            }
        } else if matches!(self.cursor.current(), b'e' | b'E') {
            self.scratch.push(b'e');
            self.cursor.advance();
            self.copy_exponent_digits(loc);
        }

        let ascii = String::from_utf8_lossy(&self.scratch).into_owned();
        let (value, parse_oor) = float_lit::parse(&ascii);

        let mut kind = match self.cursor.current() {
            b'f' | b'F' => {
                self.cursor.advance();
                TokenKind::Float32Value
            }
            b'L' => {
                self.cursor.advance();
                TokenKind::Float80Value
            }
            _ => TokenKind::Float64Value,
        };
        if matches!(self.cursor.current(), b'i' | b'I') {
            if self.cursor.current() == b'I' {
                self.deprecation(self.here(), LexErrorKind::UppercaseISuffix);
            }
            self.cursor.advance();
            kind = match kind {
                TokenKind::Float32Value => TokenKind::Imaginary32Value,
                TokenKind::Float64Value => TokenKind::Imaginary64Value,
                _ => TokenKind::Imaginary80Value,
            };
        }

        let out_of_range = match kind {
            TokenKind::Float32Value | TokenKind::Imaginary32Value => {
                parse_oor || float_lit::is_float32_out_of_range(&ascii)
            }
            TokenKind::Float64Value | TokenKind::Imaginary64Value => {
                parse_oor || float_lit::is_float64_out_of_range(&ascii)
            }
            // The extended-precision kinds absorb the full scanned range.
            _ => false,
        };
        if out_of_range {
            self.error(loc, LexErrorKind::FloatOutOfRange { literal: ascii });
        }

        t.value = TokenValue::Float(value);
        kind
    }

    /// Copy a run of digits into scratch, dropping `_` separators.
    fn copy_float_digits(&mut self, hex: bool) {
        loop {
            let b = self.cursor.current();
            if b == b'_' {
                self.cursor.advance();
                continue;
            }
            let is_digit = if hex {
                char_class::is_hex_digit(b)
            } else {
                b.is_ascii_digit()
            };
            if !is_digit {
                break;
            }
            self.scratch.push(b);
            self.cursor.advance();
        }
    }

    /// Copy an exponent: optional sign, then decimal digits (underscores
    /// allowed and dropped). Diagnoses an empty exponent.
    fn copy_exponent_digits(&mut self, loc: mica_ir::Loc) {
        if matches!(self.cursor.current(), b'+' | b'-') {
            self.scratch.push(self.cursor.current());
            self.cursor.advance();
        }
        let mut any = false;
        loop {
            let b = self.cursor.current();
            if b == b'_' {
                self.cursor.advance();
                continue;
            }
            if !b.is_ascii_digit() {
                break;
            }
            any = true;
            self.scratch.push(b);
            self.cursor.advance();
        }
        if !any {
            self.error(loc, LexErrorKind::MissingExponentDigits);
        }
    }
}
