//! The string literal family and character literals.
//!
//! Six syntaxes feed this module: escape strings (`"..."`), the two
//! wysiwyg forms (`r"..."` and backtick), hex strings (`x"..."`),
//! delimited strings (`q"..."` in bracketed, heredoc, and single-char
//! modes), and token strings (`q{...}`). All of them share the scratch
//! buffer, normalize line endings to `\n`, validate non-ASCII sequences,
//! and recover from EOF by producing a token with whatever was collected.

use crate::escape::Escape;
use crate::lex_error::LexErrorKind;
use crate::lexer::Lexer;
use crate::token::{Token, TokenValue};
use mica_ir::{Loc, TokenKind};
use mica_lexer_core::char_class;

impl<'a> Lexer<'a> {
    /// Double-quoted string with escape processing. Cursor on the `"`.
    pub(crate) fn scan_escape_string(&mut self, t: &mut Token) -> TokenKind {
        let start_loc = t.loc;
        self.cursor.advance();
        self.scratch.clear();
        loop {
            let b = self.cursor.current();
            match b {
                b'"' => {
                    self.cursor.advance();
                    break;
                }
                b'\\' => {
                    self.cursor.advance();
                    match self.escape_sequence() {
                        Escape::Byte(v) => self.scratch.push(v),
                        Escape::Wide(c) | Escape::Quad(c) => self.push_char(c),
                        // Backslash at EOF resolves to itself; the EOF
                        // surfaces on the next loop iteration.
                        Escape::Eof => self.scratch.push(b'\\'),
                    }
                }
                b'\n' => {
                    self.cursor.advance();
                    self.bump_line();
                    self.scratch.push(b'\n');
                }
                b'\r' => {
                    self.cursor.advance();
                    if self.cursor.current() == b'\n' {
                        self.cursor.advance();
                    }
                    self.bump_line();
                    self.scratch.push(b'\n');
                }
                0 | 0x1A => {
                    self.error(
                        self.here(),
                        LexErrorKind::UnterminatedString { start: start_loc },
                    );
                    break;
                }
                _ if b >= 0x80 => self.string_utf8(),
                _ => {
                    self.scratch.push(b);
                    self.cursor.advance();
                }
            }
        }
        self.finish_string(t, TokenKind::StringValue)
    }

    /// Wysiwyg string: bytes taken literally until the closing delimiter.
    /// The caller has consumed the opener (`r"` or a backtick).
    pub(crate) fn scan_wysiwyg(&mut self, t: &mut Token, delim: u8) -> TokenKind {
        let start_loc = t.loc;
        self.scratch.clear();
        loop {
            let b = self.cursor.current();
            if b == delim {
                self.cursor.advance();
                break;
            }
            match b {
                b'\n' => {
                    self.cursor.advance();
                    self.bump_line();
                    self.scratch.push(b'\n');
                }
                b'\r' => {
                    self.cursor.advance();
                    if self.cursor.current() == b'\n' {
                        self.cursor.advance();
                    }
                    self.bump_line();
                    self.scratch.push(b'\n');
                }
                0 | 0x1A => {
                    self.error(
                        self.here(),
                        LexErrorKind::UnterminatedString { start: start_loc },
                    );
                    break;
                }
                _ if b >= 0x80 => self.string_utf8(),
                _ => {
                    self.scratch.push(b);
                    self.cursor.advance();
                }
            }
        }
        self.finish_string(t, TokenKind::StringValue)
    }

    /// Hex string `x"..."`: hex digit pairs become bytes, whitespace is
    /// ignored. Cursor on the `x`.
    pub(crate) fn scan_hex_string(&mut self, t: &mut Token) -> TokenKind {
        let start_loc = t.loc;
        self.cursor.advance_n(2);
        self.scratch.clear();
        let mut count: u32 = 0;
        let mut pending: u8 = 0;
        loop {
            let b = self.cursor.current();
            match b {
                b'"' => {
                    self.cursor.advance();
                    if count % 2 != 0 {
                        self.error(self.here(), LexErrorKind::OddHexDigits { count });
                        self.scratch.push(pending);
                    }
                    break;
                }
                b' ' | b'\t' | 0x0B | 0x0C => self.cursor.advance(),
                b'\n' => {
                    self.cursor.advance();
                    self.bump_line();
                }
                b'\r' => {
                    self.cursor.advance();
                    if self.cursor.current() == b'\n' {
                        self.cursor.advance();
                    }
                    self.bump_line();
                }
                0 | 0x1A => {
                    self.error(
                        self.here(),
                        LexErrorKind::UnterminatedString { start: start_loc },
                    );
                    break;
                }
                c if char_class::is_hex_digit(c) => {
                    let d = char_class::hex_digit_value(c);
                    if count % 2 == 0 {
                        pending = d;
                    } else {
                        self.scratch.push((pending << 4) | d);
                    }
                    count += 1;
                    self.cursor.advance();
                }
                _ => {
                    let loc = self.here();
                    if b >= 0x80 {
                        match self.decode_char() {
                            Ok(c) => self.error(loc, LexErrorKind::NonHexCharacter { ch: c }),
                            Err(msg) => self.error(loc, LexErrorKind::InvalidUtf8 { msg }),
                        }
                    } else {
                        self.error(loc, LexErrorKind::NonHexCharacter { ch: b as char });
                        self.cursor.advance();
                    }
                }
            }
        }
        self.finish_string(t, TokenKind::HexStringValue)
    }

    /// Delimited string `q"..."`. The first character after the quote
    /// selects bracketed, heredoc, or single-character mode. Cursor on the
    /// `q`.
    pub(crate) fn scan_delimited_string(&mut self, t: &mut Token) -> TokenKind {
        let start_loc = t.loc;
        self.cursor.advance_n(2);
        self.scratch.clear();

        let b = self.cursor.current();
        match b {
            0 | 0x1A => {
                self.error(
                    self.here(),
                    LexErrorKind::UnterminatedString { start: start_loc },
                );
                self.finish_string(t, TokenKind::StringValue)
            }
            b'(' => self.delimited_bracketed(t, start_loc, b'(', b')'),
            b'[' => self.delimited_bracketed(t, start_loc, b'[', b']'),
            b'{' => self.delimited_bracketed(t, start_loc, b'{', b'}'),
            b'<' => self.delimited_bracketed(t, start_loc, b'<', b'>'),
            _ if char_class::is_ident_start(b) => self.delimited_heredoc(t, start_loc),
            _ if b >= 0x80 => {
                let saved = self.cursor;
                let loc = self.here();
                match self.decode_char() {
                    Ok(c) if unicode_ident::is_xid_start(c) => {
                        self.cursor = saved;
                        self.delimited_heredoc(t, start_loc)
                    }
                    Ok(c) => {
                        let mut delim = [0u8; 4];
                        let delim = c.encode_utf8(&mut delim).as_bytes().to_vec();
                        self.delimited_single(t, start_loc, &delim)
                    }
                    Err(msg) => {
                        self.error(loc, LexErrorKind::InvalidUtf8 { msg });
                        self.delimited_single(t, start_loc, &[b'"'])
                    }
                }
            }
            _ => {
                if matches!(b, b' ' | b'\t' | 0x0B | 0x0C | b'\n' | b'\r') {
                    self.error(self.here(), LexErrorKind::WhitespaceDelimiter);
                }
                if b == b'\n' {
                    self.cursor.advance();
                    self.bump_line();
                } else if b == b'\r' {
                    self.cursor.advance();
                    if self.cursor.current() == b'\n' {
                        self.cursor.advance();
                    }
                    self.bump_line();
                } else {
                    self.cursor.advance();
                }
                self.delimited_single(t, start_loc, &[b])
            }
        }
    }

    /// Bracketed delimited string: nesting delimiter pairs. The opening
    /// delimiter is still under the cursor.
    fn delimited_bracketed(
        &mut self,
        t: &mut Token,
        start_loc: Loc,
        left: u8,
        right: u8,
    ) -> TokenKind {
        self.cursor.advance(); // the delimiter itself, not part of payload
        let mut nest: u32 = 1;
        loop {
            let b = self.cursor.current();
            if b == left {
                nest += 1;
                self.scratch.push(b);
                self.cursor.advance();
                continue;
            }
            if b == right {
                self.cursor.advance();
                nest -= 1;
                if nest == 0 {
                    if self.cursor.current() == b'"' {
                        self.cursor.advance();
                    } else {
                        self.error(
                            self.here(),
                            LexErrorKind::DelimiterMismatch {
                                delim: right as char,
                            },
                        );
                    }
                    break;
                }
                self.scratch.push(right);
                continue;
            }
            match b {
                b'\n' => {
                    self.cursor.advance();
                    self.bump_line();
                    self.scratch.push(b'\n');
                }
                b'\r' => {
                    self.cursor.advance();
                    if self.cursor.current() == b'\n' {
                        self.cursor.advance();
                    }
                    self.bump_line();
                    self.scratch.push(b'\n');
                }
                0 | 0x1A => {
                    self.error(
                        self.here(),
                        LexErrorKind::UnterminatedString { start: start_loc },
                    );
                    break;
                }
                _ if b >= 0x80 => self.string_utf8(),
                _ => {
                    self.scratch.push(b);
                    self.cursor.advance();
                }
            }
        }
        self.finish_string(t, TokenKind::StringValue)
    }

    /// Heredoc delimited string: an identifier names the terminator; the
    /// body runs until a line begins with that identifier.
    fn delimited_heredoc(&mut self, t: &mut Token, start_loc: Loc) -> TokenKind {
        // Read the delimiter identifier
        let id_start = self.cursor.pos();
        loop {
            let b = self.cursor.current();
            if char_class::is_ident_continue(b) {
                self.cursor.advance();
                continue;
            }
            if b >= 0x80 {
                let saved = self.cursor;
                match self.decode_char() {
                    Ok(c) if unicode_ident::is_xid_continue(c) => continue,
                    _ => {
                        self.cursor = saved;
                        break;
                    }
                }
            }
            break;
        }
        let id = self.cursor.bytes_from(id_start).to_vec();

        // The rest of the delimiter line must be blank
        let mut complained = false;
        loop {
            match self.cursor.current() {
                b' ' | b'\t' | 0x0B | 0x0C => self.cursor.advance(),
                b'\n' => {
                    self.cursor.advance();
                    self.bump_line();
                    break;
                }
                b'\r' => {
                    self.cursor.advance();
                    if self.cursor.current() == b'\n' {
                        self.cursor.advance();
                    }
                    self.bump_line();
                    break;
                }
                0 | 0x1A => {
                    self.error(
                        self.here(),
                        LexErrorKind::UnterminatedString { start: start_loc },
                    );
                    return self.finish_string(t, TokenKind::StringValue);
                }
                _ => {
                    if !complained {
                        self.error(self.here(), LexErrorKind::HeredocRestOfLine);
                        complained = true;
                    }
                    self.cursor.advance();
                }
            }
        }

        // Body: terminates when a line begins with the identifier
        let mut at_line_start = true;
        loop {
            if at_line_start && !id.is_empty() && self.cursor_matches(&id) {
                let after = self.cursor.peek_n(id.len() as u32);
                if !char_class::is_ident_continue(after) && after < 0x80 {
                    self.cursor.advance_n(id.len() as u32);
                    if self.cursor.current() == b'"' {
                        self.cursor.advance();
                    } else {
                        self.error(self.here(), LexErrorKind::DelimiterMismatch { delim: '"' });
                    }
                    break;
                }
            }
            let b = self.cursor.current();
            match b {
                b'\n' => {
                    self.cursor.advance();
                    self.bump_line();
                    self.scratch.push(b'\n');
                    at_line_start = true;
                }
                b'\r' => {
                    self.cursor.advance();
                    if self.cursor.current() == b'\n' {
                        self.cursor.advance();
                    }
                    self.bump_line();
                    self.scratch.push(b'\n');
                    at_line_start = true;
                }
                0 | 0x1A => {
                    self.error(
                        self.here(),
                        LexErrorKind::UnterminatedString { start: start_loc },
                    );
                    break;
                }
                _ if b >= 0x80 => {
                    self.string_utf8();
                    at_line_start = false;
                }
                _ => {
                    self.scratch.push(b);
                    self.cursor.advance();
                    at_line_start = false;
                }
            }
        }
        self.finish_string(t, TokenKind::StringValue)
    }

    /// Single-character delimited string: terminates at the next
    /// occurrence of the delimiter, no nesting. The delimiter has been
    /// consumed.
    fn delimited_single(&mut self, t: &mut Token, start_loc: Loc, delim: &[u8]) -> TokenKind {
        loop {
            if self.cursor_matches(delim) {
                self.cursor.advance_n(delim.len() as u32);
                if self.cursor.current() == b'"' {
                    self.cursor.advance();
                } else {
                    let shown = std::str::from_utf8(delim)
                        .ok()
                        .and_then(|s| s.chars().next())
                        .unwrap_or('"');
                    self.error(self.here(), LexErrorKind::DelimiterMismatch { delim: shown });
                }
                break;
            }
            let b = self.cursor.current();
            match b {
                b'\n' => {
                    self.cursor.advance();
                    self.bump_line();
                    self.scratch.push(b'\n');
                }
                b'\r' => {
                    self.cursor.advance();
                    if self.cursor.current() == b'\n' {
                        self.cursor.advance();
                    }
                    self.bump_line();
                    self.scratch.push(b'\n');
                }
                0 | 0x1A => {
                    self.error(
                        self.here(),
                        LexErrorKind::UnterminatedString { start: start_loc },
                    );
                    break;
                }
                _ if b >= 0x80 => self.string_utf8(),
                _ => {
                    self.scratch.push(b);
                    self.cursor.advance();
                }
            }
        }
        self.finish_string(t, TokenKind::StringValue)
    }

    /// Token string `q{...}`: the body is lexed as tokens; the payload is
    /// the raw byte range between the braces. Cursor on the `q`.
    pub(crate) fn scan_token_string(&mut self, t: &mut Token) -> TokenKind {
        let start_loc = t.loc;
        self.cursor.advance_n(2);
        let body_start = self.cursor.pos();
        let mut nest: u32 = 1;
        loop {
            let mut tok = Token::default();
            self.scan(&mut tok);
            match tok.kind {
                TokenKind::LBrace => nest += 1,
                TokenKind::RBrace => {
                    nest -= 1;
                    if nest == 0 {
                        let body = self.cursor.bytes(body_start, tok.start).to_vec();
                        let postfix = self.take_postfix();
                        t.value = TokenValue::Str {
                            text: body.into_boxed_slice(),
                            postfix,
                        };
                        return TokenKind::StringValue;
                    }
                }
                TokenKind::Eof => {
                    self.error(start_loc, LexErrorKind::UnterminatedTokenString);
                    let end = self.cursor.pos().min(self.cursor.source_len());
                    let body = self.cursor.bytes(body_start.min(end), end).to_vec();
                    t.value = TokenValue::Str {
                        text: body.into_boxed_slice(),
                        postfix: 0,
                    };
                    return TokenKind::StringValue;
                }
                _ => {}
            }
        }
    }

    /// Character literal (slow path; the dispatcher handles `'x'` with a
    /// classified single byte directly). Cursor on the opening quote.
    pub(crate) fn scan_char_literal(&mut self, t: &mut Token) -> TokenKind {
        self.cursor.advance();
        let mut kind = TokenKind::CharValue;
        let b = self.cursor.current();
        match b {
            b'\\' => {
                self.cursor.advance();
                match self.escape_sequence() {
                    Escape::Byte(v) => t.value = TokenValue::Int(u64::from(v)),
                    Escape::Wide(c) => {
                        kind = TokenKind::WcharValue;
                        t.value = TokenValue::Int(u64::from(u32::from(c)));
                    }
                    Escape::Quad(c) => {
                        kind = TokenKind::DcharValue;
                        t.value = TokenValue::Int(u64::from(u32::from(c)));
                    }
                    Escape::Eof => {
                        t.value = TokenValue::Int(u64::from(b'\\'));
                    }
                }
            }
            b'\n' | b'\r' | 0 | 0x1A | b'\'' => {
                if b == b'\n' {
                    self.cursor.advance();
                    self.bump_line();
                } else if b == b'\r' {
                    self.cursor.advance();
                    if self.cursor.current() == b'\n' {
                        self.cursor.advance();
                    }
                    self.bump_line();
                } else if b == b'\'' {
                    self.cursor.advance();
                }
                self.error(t.loc, LexErrorKind::UnterminatedCharacter);
                t.value = TokenValue::Int(u64::from(b'?'));
                return kind;
            }
            _ if b >= 0x80 => {
                let loc = self.here();
                match self.decode_char() {
                    Ok(c) if c == '\u{2028}' || c == '\u{2029}' => {
                        self.bump_line();
                        self.error(t.loc, LexErrorKind::UnterminatedCharacter);
                        t.value = TokenValue::Int(u64::from(b'?'));
                        return kind;
                    }
                    Ok(c) => {
                        kind = if (c as u32) <= 0xFFFF {
                            TokenKind::WcharValue
                        } else {
                            TokenKind::DcharValue
                        };
                        t.value = TokenValue::Int(u64::from(u32::from(c)));
                    }
                    Err(msg) => {
                        self.error(loc, LexErrorKind::InvalidUtf8 { msg });
                        t.value = TokenValue::Int(u64::from(b'?'));
                    }
                }
            }
            _ => {
                self.cursor.advance();
                t.value = TokenValue::Int(u64::from(b));
            }
        }

        if self.cursor.current() != b'\'' {
            // Diagnose the missing quote but keep the scanned value
            self.error(t.loc, LexErrorKind::UnterminatedCharacter);
            return kind;
        }
        self.cursor.advance();
        kind
    }

    // ─── Shared helpers ─────────────────────────────────────────────────

    /// Decode and re-encode one non-ASCII sequence into the scratch
    /// buffer, counting LS/PS as line terminators. Invalid sequences are
    /// diagnosed and dropped.
    pub(crate) fn string_utf8(&mut self) {
        let saved_pos = self.cursor.pos();
        let loc = self.here();
        match self.decode_char() {
            Ok(c) => {
                if c == '\u{2028}' || c == '\u{2029}' {
                    self.bump_line();
                }
                let bytes = self.cursor.bytes(saved_pos, self.cursor.pos());
                self.scratch.extend_from_slice(bytes);
            }
            Err(msg) => self.error(loc, LexErrorKind::InvalidUtf8 { msg }),
        }
    }

    /// Push a char as UTF-8 into the scratch buffer.
    pub(crate) fn push_char(&mut self, c: char) {
        let mut buf = [0u8; 4];
        self.scratch.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
    }

    /// Consume a trailing string postfix if present.
    pub(crate) fn take_postfix(&mut self) -> u8 {
        match self.cursor.current() {
            c @ (b'c' | b'w' | b'd') => {
                self.cursor.advance();
                c
            }
            _ => 0,
        }
    }

    /// Attach the scratch buffer as the token's string payload.
    pub(crate) fn finish_string(&mut self, t: &mut Token, kind: TokenKind) -> TokenKind {
        let postfix = self.take_postfix();
        t.value = TokenValue::Str {
            text: self.scratch.as_slice().into(),
            postfix,
        };
        kind
    }

    /// Do the bytes at the cursor match `pat` exactly?
    pub(crate) fn cursor_matches(&self, pat: &[u8]) -> bool {
        pat.iter()
            .enumerate()
            .all(|(i, &p)| self.cursor.peek_n(i as u32) == p)
    }
}
