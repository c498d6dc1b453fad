//! The Mica lexer.
//!
//! A [`Lexer`] owns a cursor into one immutable [`SourceBuffer`] and
//! produces tokens on demand. The dispatcher classifies the first
//! significant byte and hands off to the family scanners (numbers,
//! strings, comments, identifiers); compound punctuation is resolved
//! longest-match in place. Lookahead is served from an index-addressed
//! queue of already-scanned tokens, realizing the token cache without
//! per-node allocation.
//!
//! The lexer never aborts: every diagnostic is paired with a recovery
//! that produces a token and keeps the cursor moving toward EOF.

use std::collections::VecDeque;

use mica_ir::{Loc, Name, StringInterner, TokenKind};
use mica_lexer_core::{char_class, utf8, Cursor, SourceBuffer};

use crate::config::CompilerConfig;
use crate::keywords;
use crate::lex_error::{LexError, LexErrorKind, Severity};
use crate::special;
use crate::token::{Token, TokenValue};

/// The Mica lexer.
///
/// Construct one per source buffer; the intern pool and configuration are
/// shared collaborators that outlive it. The parser reads `token`,
/// `prev_loc`, and `errors` directly, and drives scanning through
/// [`next()`](Self::next) and the peek family.
pub struct Lexer<'a> {
    /// Read cursor over the sentinel-terminated buffer.
    pub(crate) cursor: Cursor<'a>,
    /// Identifier intern pool (outlives the lexer).
    pub(crate) pool: &'a StringInterner,
    /// Compiler configuration for `__VENDOR__`/`__VERSION__` and the
    /// deprecation policy.
    pub(crate) config: &'a CompilerConfig,

    /// Filename reported in locations; `#line` can replace it.
    pub(crate) file: Name,
    /// Current 1-based line number; `#line` can rewrite it.
    pub(crate) line: u32,
    /// Byte offset of the first byte of the current line.
    pub(crate) line_start: u32,

    /// Harvest doc comments onto following tokens.
    pub(crate) doc_comments: bool,
    /// Emit comments as `Comment` tokens instead of skipping them.
    pub(crate) comment_tokens: bool,

    /// The current token, populated by `next()`.
    pub token: Token,
    /// Location of the token returned by the previous `next()` call.
    pub prev_loc: Loc,
    /// Set when any error-severity diagnostic was emitted (deprecations
    /// too, when the configuration promotes them).
    pub errors: bool,

    /// Whether any real token has been scanned yet; a doc comment can only
    /// be a trailing line comment when a token precedes it on its line.
    pub(crate) any_token: bool,

    /// Already-scanned tokens ahead of `token`, front first.
    lookahead: VecDeque<Token>,
    /// Reusable byte scratch for string and float scanning.
    pub(crate) scratch: Vec<u8>,
    /// Accumulated diagnostics in source order.
    diagnostics: Vec<LexError>,

    /// Pre-interned `line` for `#line` recognition.
    id_line: Name,
    /// Pre-interned `__LINE__` for `#line __LINE__`.
    id_line_macro: Name,
}

impl<'a> Lexer<'a> {
    /// Create a lexer over `source`, starting at byte offset `begin`.
    ///
    /// A `#!` shebang at the starting position is consumed up to (not
    /// including) its line end. `doc_comments` enables doc-comment
    /// harvesting; `comment_tokens` turns every comment into a token and
    /// takes precedence over harvesting.
    pub fn new(
        pool: &'a StringInterner,
        config: &'a CompilerConfig,
        filename: &str,
        source: &'a SourceBuffer,
        begin: u32,
        doc_comments: bool,
        comment_tokens: bool,
    ) -> Self {
        let mut cursor = source.cursor();
        cursor.advance_n(begin);

        // Shebang line is not part of the token stream
        if cursor.current() == b'#' && cursor.peek() == b'!' {
            cursor.skip_to_line_feed();
        }

        Lexer {
            cursor,
            pool,
            config,
            file: pool.intern(filename),
            line: 1,
            line_start: begin,
            doc_comments,
            comment_tokens,
            token: Token::default(),
            prev_loc: Loc::NONE,
            errors: false,
            any_token: false,
            lookahead: VecDeque::new(),
            scratch: Vec::with_capacity(64),
            diagnostics: Vec::new(),
            id_line: pool.intern("line"),
            id_line_macro: pool.intern("__LINE__"),
        }
    }

    /// Diagnostics accumulated so far, in source order.
    pub fn diagnostics(&self) -> &[LexError] {
        &self.diagnostics
    }

    /// Advance to the next token, draining the lookahead cache first.
    ///
    /// Returns the new token's kind; the full record is in `self.token`.
    /// Once `Eof` has been produced, further calls keep returning `Eof`
    /// without moving the cursor.
    pub fn next(&mut self) -> TokenKind {
        self.prev_loc = self.token.loc;
        match self.lookahead.pop_front() {
            Some(t) => self.token = t,
            None => {
                let mut t = Token::default();
                self.scan(&mut t);
                self.token = t;
            }
        }
        self.token.kind
    }

    /// Peek `n` tokens ahead (0 = the current token), scanning and caching
    /// as needed. A cached `Eof` is returned for any deeper request.
    pub fn peek(&mut self, n: usize) -> &Token {
        if n == 0 {
            return &self.token;
        }
        while self.lookahead.len() < n {
            if self
                .lookahead
                .back()
                .is_some_and(|t| t.kind == TokenKind::Eof)
            {
                break;
            }
            let mut t = Token::default();
            self.scan(&mut t);
            self.lookahead.push_back(t);
        }
        let idx = n.min(self.lookahead.len());
        &self.lookahead[idx - 1]
    }

    /// Kind of the token after the current one.
    pub fn peek_next(&mut self) -> TokenKind {
        self.peek(1).kind
    }

    /// Kind of the token two past the current one.
    pub fn peek_next2(&mut self) -> TokenKind {
        self.peek(2).kind
    }

    /// Given the lookahead depth of a `(` token (0 = current), return the
    /// token after its matching `)`.
    ///
    /// The scan tracks paren and brace depth; it gives up and returns the
    /// offending token at an unbalanced `}`, at a `;` outside braces, or
    /// at EOF.
    pub fn peek_past_paren(&mut self, start: usize) -> &Token {
        let mut n = start;
        let mut parens: u32 = 1;
        let mut braces: u32 = 0;
        loop {
            n += 1;
            let kind = self.peek(n).kind;
            match kind {
                TokenKind::LParen => parens += 1,
                TokenKind::RParen => {
                    parens -= 1;
                    if parens == 0 {
                        n += 1;
                        break;
                    }
                }
                TokenKind::LBrace => braces += 1,
                TokenKind::RBrace => {
                    if braces == 0 {
                        break;
                    }
                    braces -= 1;
                }
                TokenKind::Semicolon => {
                    if braces == 0 {
                        break;
                    }
                }
                TokenKind::Eof => break,
                _ => {}
            }
        }
        self.peek(n)
    }

    // ─── Scanning ───────────────────────────────────────────────────────

    /// Scan one token into `t`, recording its byte span.
    pub(crate) fn scan(&mut self, t: &mut Token) {
        self.scan_token(t);
        t.end = self.cursor.pos();
    }

    fn scan_token(&mut self, t: &mut Token) {
        let last_line = self.line;
        let mut doc_end_line = 0u32;
        t.block_comment = None;
        t.line_comment = None;

        loop {
            t.start = self.cursor.pos();
            t.loc = self.here();
            t.value = TokenValue::None;
            let b = self.cursor.current();

            let kind = match b {
                // EOF is sticky: the cursor stays on the terminator byte
                0 | 0x1A => TokenKind::Eof,

                b' ' | b'\t' | 0x0B | 0x0C => {
                    self.cursor.advance();
                    continue;
                }
                b'\n' => {
                    self.cursor.advance();
                    self.bump_line();
                    continue;
                }
                b'\r' => {
                    self.cursor.advance();
                    if self.cursor.current() == b'\n' {
                        self.cursor.advance();
                    }
                    self.bump_line();
                    continue;
                }

                b'0' => {
                    if char_class::is_second_after_zero(self.cursor.peek()) {
                        self.scan_number(t)
                    } else {
                        self.cursor.advance();
                        t.value = TokenValue::Int(0);
                        TokenKind::Int32Value
                    }
                }
                b'1'..=b'9' => {
                    if char_class::is_second_after_digit(self.cursor.peek()) {
                        self.scan_number(t)
                    } else {
                        self.cursor.advance();
                        t.value = TokenValue::Int(u64::from(b - b'0'));
                        TokenKind::Int32Value
                    }
                }

                b'\'' => {
                    if char_class::is_single_char_body(self.cursor.peek())
                        && self.cursor.peek2() == b'\''
                    {
                        t.value = TokenValue::Int(u64::from(self.cursor.peek()));
                        self.cursor.advance_n(3);
                        TokenKind::CharValue
                    } else {
                        self.scan_char_literal(t)
                    }
                }

                b'"' => self.scan_escape_string(t),
                b'`' => {
                    self.cursor.advance();
                    self.scan_wysiwyg(t, b'`')
                }
                b'r' if self.cursor.peek() == b'"' => {
                    self.cursor.advance_n(2);
                    self.scan_wysiwyg(t, b'"')
                }
                b'x' if self.cursor.peek() == b'"' => self.scan_hex_string(t),
                b'q' if self.cursor.peek() == b'"' => self.scan_delimited_string(t),
                b'q' if self.cursor.peek() == b'{' => self.scan_token_string(t),

                b'/' => match self.scan_slash(t, last_line, &mut doc_end_line) {
                    Some(kind) => kind,
                    None => continue,
                },

                _ if char_class::is_ident_start(b) => {
                    self.cursor.advance();
                    self.scan_identifier(t)
                }

                b'.' => self.scan_dot(t),
                b'(' => self.single(TokenKind::LParen),
                b')' => self.single(TokenKind::RParen),
                b'[' => self.single(TokenKind::LBracket),
                b']' => self.single(TokenKind::RBracket),
                b'{' => self.single(TokenKind::LBrace),
                b'}' => self.single(TokenKind::RBrace),
                b'?' => self.single(TokenKind::Question),
                b',' => self.single(TokenKind::Comma),
                b';' => self.single(TokenKind::Semicolon),
                b':' => self.single(TokenKind::Colon),
                b'$' => self.single(TokenKind::Dollar),
                b'@' => self.single(TokenKind::At),

                b'&' => self.scan_pair(b'&', TokenKind::Amp, TokenKind::AmpAssign, TokenKind::AndAnd),
                b'|' => self.scan_pair(b'|', TokenKind::Pipe, TokenKind::PipeAssign, TokenKind::OrOr),
                b'-' => self.scan_pair(b'-', TokenKind::Minus, TokenKind::MinusAssign, TokenKind::MinusMinus),
                b'+' => self.scan_pair(b'+', TokenKind::Plus, TokenKind::PlusAssign, TokenKind::PlusPlus),
                b'*' => self.scan_assign(TokenKind::Star, TokenKind::StarAssign),
                b'%' => self.scan_assign(TokenKind::Percent, TokenKind::PercentAssign),
                b'~' => self.scan_assign(TokenKind::Tilde, TokenKind::TildeAssign),
                b'^' => self.scan_caret(),
                b'<' => self.scan_less(),
                b'>' => self.scan_greater(),
                b'!' => self.scan_bang(),
                b'=' => self.scan_equal(),

                b'#' => {
                    self.cursor.advance();
                    let mut n = Token::default();
                    self.scan(&mut n);
                    if n.kind == TokenKind::Identifier && n.ident() == Some(self.id_line) {
                        self.pound_line(t.loc);
                        continue;
                    }
                    TokenKind::Pound
                }

                _ => {
                    // Non-ASCII, or an ASCII byte no token starts with
                    let loc = t.loc;
                    if b >= 0x80 {
                        match self.decode_char() {
                            Ok('\u{2028}') | Ok('\u{2029}') => {
                                self.bump_line();
                                continue;
                            }
                            Ok(c) if unicode_ident::is_xid_start(c) => self.scan_identifier(t),
                            Ok(c) => {
                                self.error(loc, LexErrorKind::InvalidToken { ch: c });
                                continue;
                            }
                            Err(msg) => {
                                self.error(loc, LexErrorKind::InvalidUtf8 { msg });
                                continue;
                            }
                        }
                    } else {
                        self.error(loc, LexErrorKind::InvalidToken { ch: b as char });
                        self.cursor.advance();
                        continue;
                    }
                }
            };

            t.kind = kind;
            if kind != TokenKind::Eof {
                self.any_token = true;
            }
            return;
        }
    }

    // ─── Punctuation ────────────────────────────────────────────────────

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.cursor.advance();
        kind
    }

    /// `X`, `X=`, `XX` family (`&`, `|`, `-`, `+`).
    fn scan_pair(&mut self, c: u8, plain: TokenKind, assign: TokenKind, double: TokenKind) -> TokenKind {
        self.cursor.advance();
        if self.cursor.current() == b'=' {
            self.cursor.advance();
            assign
        } else if self.cursor.current() == c {
            self.cursor.advance();
            double
        } else {
            plain
        }
    }

    /// `X`, `X=` family (`*`, `%`, `~`).
    fn scan_assign(&mut self, plain: TokenKind, assign: TokenKind) -> TokenKind {
        self.cursor.advance();
        if self.cursor.current() == b'=' {
            self.cursor.advance();
            assign
        } else {
            plain
        }
    }

    fn scan_caret(&mut self) -> TokenKind {
        self.cursor.advance();
        match self.cursor.current() {
            b'=' => {
                self.cursor.advance();
                TokenKind::CaretAssign
            }
            b'^' => {
                self.cursor.advance();
                if self.cursor.current() == b'=' {
                    self.cursor.advance();
                    TokenKind::CaretCaretAssign
                } else {
                    TokenKind::CaretCaret
                }
            }
            _ => TokenKind::Caret,
        }
    }

    fn scan_less(&mut self) -> TokenKind {
        self.cursor.advance();
        match self.cursor.current() {
            b'=' => {
                self.cursor.advance();
                TokenKind::LtEq
            }
            b'<' => {
                self.cursor.advance();
                if self.cursor.current() == b'=' {
                    self.cursor.advance();
                    TokenKind::ShlAssign
                } else {
                    TokenKind::Shl
                }
            }
            b'>' => {
                self.cursor.advance();
                if self.cursor.current() == b'=' {
                    self.cursor.advance();
                    TokenKind::LessGreaterEq
                } else {
                    TokenKind::LessGreater
                }
            }
            _ => TokenKind::Lt,
        }
    }

    fn scan_greater(&mut self) -> TokenKind {
        self.cursor.advance();
        match self.cursor.current() {
            b'=' => {
                self.cursor.advance();
                TokenKind::GtEq
            }
            b'>' => {
                self.cursor.advance();
                match self.cursor.current() {
                    b'=' => {
                        self.cursor.advance();
                        TokenKind::ShrAssign
                    }
                    b'>' => {
                        self.cursor.advance();
                        if self.cursor.current() == b'=' {
                            self.cursor.advance();
                            TokenKind::UshrAssign
                        } else {
                            TokenKind::Ushr
                        }
                    }
                    _ => TokenKind::Shr,
                }
            }
            _ => TokenKind::Gt,
        }
    }

    fn scan_bang(&mut self) -> TokenKind {
        self.cursor.advance();
        match self.cursor.current() {
            b'=' => {
                self.cursor.advance();
                TokenKind::NotEq
            }
            b'<' => {
                self.cursor.advance();
                match self.cursor.current() {
                    b'=' => {
                        self.cursor.advance();
                        TokenKind::NotLessEq
                    }
                    b'>' => {
                        self.cursor.advance();
                        if self.cursor.current() == b'=' {
                            self.cursor.advance();
                            TokenKind::NotLessGreaterEq
                        } else {
                            TokenKind::NotLessGreater
                        }
                    }
                    _ => TokenKind::NotLess,
                }
            }
            b'>' => {
                self.cursor.advance();
                if self.cursor.current() == b'=' {
                    self.cursor.advance();
                    TokenKind::NotGreaterEq
                } else {
                    TokenKind::NotGreater
                }
            }
            _ => TokenKind::Bang,
        }
    }

    fn scan_equal(&mut self) -> TokenKind {
        self.cursor.advance();
        match self.cursor.current() {
            b'=' => {
                self.cursor.advance();
                TokenKind::EqEq
            }
            b'>' => {
                self.cursor.advance();
                TokenKind::FatArrow
            }
            _ => TokenKind::Assign,
        }
    }

    fn scan_dot(&mut self, t: &mut Token) -> TokenKind {
        let start = t.start;
        self.cursor.advance();
        if self.cursor.current().is_ascii_digit() {
            return self.scan_float(t, start);
        }
        if self.cursor.current() == b'.' {
            self.cursor.advance();
            if self.cursor.current() == b'.' {
                self.cursor.advance();
                TokenKind::DotDotDot
            } else {
                TokenKind::DotDot
            }
        } else {
            TokenKind::Dot
        }
    }

    // ─── Identifiers ────────────────────────────────────────────────────

    /// Scan the rest of an identifier whose first character has been
    /// consumed, then resolve it: keyword kind, special substitution, or
    /// interned identifier.
    fn scan_identifier(&mut self, t: &mut Token) -> TokenKind {
        loop {
            let b = self.cursor.current();
            if char_class::is_ident_continue(b) {
                self.cursor.advance();
                continue;
            }
            if b >= 0x80 {
                let saved = self.cursor;
                let loc = self.here();
                match self.decode_char() {
                    Ok(c) if unicode_ident::is_xid_continue(c) => continue,
                    Ok(c) => {
                        self.error(loc, LexErrorKind::IdentifierChar { cp: c as u32 });
                        self.cursor = saved;
                        break;
                    }
                    Err(_) => {
                        // The dispatcher diagnoses the broken sequence on
                        // the next scan
                        self.cursor = saved;
                        break;
                    }
                }
            }
            break;
        }

        let bytes = self.cursor.bytes(t.start, self.cursor.pos());
        let text = String::from_utf8_lossy(bytes);
        if let Some(kind) = keywords::lookup(&text) {
            return kind;
        }
        if bytes.first() == Some(&b'_') {
            if let Some(kind) = self.special_identifier(t, &text) {
                return kind;
            }
        }
        t.value = TokenValue::Ident(self.pool.intern(&text));
        TokenKind::Identifier
    }

    /// `__DATE__`-family substitutions. Returns `None` for ordinary
    /// identifiers that merely start with `_`.
    fn special_identifier(&mut self, t: &mut Token, text: &str) -> Option<TokenKind> {
        let string_token = |t: &mut Token, s: &str| {
            t.value = TokenValue::Str {
                text: s.as_bytes().into(),
                postfix: 0,
            };
        };
        match text {
            "__DATE__" => {
                string_token(t, &special::timestamps().date);
                Some(TokenKind::StringValue)
            }
            "__TIME__" => {
                string_token(t, &special::timestamps().time);
                Some(TokenKind::StringValue)
            }
            "__TIMESTAMP__" => {
                string_token(t, &special::timestamps().timestamp);
                Some(TokenKind::StringValue)
            }
            "__VENDOR__" => {
                let vendor = self.config.vendor.clone();
                string_token(t, &vendor);
                Some(TokenKind::StringValue)
            }
            "__VERSION__" => {
                t.value = TokenValue::Int(special::version_number(&self.config.version));
                Some(TokenKind::Int64Value)
            }
            "__EOF__" => {
                // Everything up to the sentinel is consumed
                self.cursor.set_pos(self.cursor.source_len());
                Some(TokenKind::Eof)
            }
            _ => None,
        }
    }

    // ─── #line ──────────────────────────────────────────────────────────

    /// Handle a `#line` directive; the `line` identifier has been
    /// consumed. On success the next source line reports the new number
    /// (and filename, when a filespec was given).
    fn pound_line(&mut self, dloc: Loc) {
        let mut tok = Token::default();
        self.scan(&mut tok);
        let new_line: u32 = match tok.kind {
            TokenKind::Int32Value
            | TokenKind::Uns32Value
            | TokenKind::Int64Value
            | TokenKind::Uns64Value => tok.int_value().min(u64::from(u32::MAX)) as u32,
            TokenKind::Identifier if tok.ident() == Some(self.id_line_macro) => {
                // `#line __LINE__` keeps the current numbering
                self.line + 1
            }
            _ => {
                self.error(dloc, LexErrorKind::MalformedLineDirective);
                return;
            }
        };

        let mut new_file: Option<Name> = None;
        loop {
            let b = self.cursor.current();
            match b {
                // The terminating line end stays for the dispatcher, which
                // performs the increment onto the rewritten number.
                0 | 0x1A | b'\n' | b'\r' => break,
                b' ' | b'\t' | 0x0B | 0x0C => self.cursor.advance(),
                b'"' => {
                    if new_file.is_some() {
                        self.error(dloc, LexErrorKind::MalformedLineDirective);
                        return;
                    }
                    self.cursor.advance();
                    let start = self.cursor.pos();
                    loop {
                        match self.cursor.current() {
                            b'"' => {
                                let text = String::from_utf8_lossy(self.cursor.bytes_from(start))
                                    .into_owned();
                                new_file = Some(self.pool.intern(&text));
                                self.cursor.advance();
                                break;
                            }
                            b'\n' | b'\r' | 0 | 0x1A => {
                                self.error(dloc, LexErrorKind::MalformedLineDirective);
                                return;
                            }
                            _ => self.cursor.advance(),
                        }
                    }
                }
                _ if char_class::is_ident_start(b) => {
                    let start = self.cursor.pos();
                    self.cursor.eat_while(char_class::is_ident_continue);
                    if self.cursor.bytes_from(start) != b"__FILE__" {
                        self.error(dloc, LexErrorKind::MalformedLineDirective);
                        return;
                    }
                    // `__FILE__` keeps the current filename
                }
                _ => {
                    self.error(dloc, LexErrorKind::MalformedLineDirective);
                    return;
                }
            }
        }

        self.line = new_line.saturating_sub(1);
        if let Some(f) = new_file {
            self.file = f;
        }
    }

    // ─── Position and diagnostics ───────────────────────────────────────

    /// Location of the current cursor position.
    #[inline]
    pub(crate) fn here(&self) -> Loc {
        Loc::new(
            self.file,
            self.line,
            self.cursor.pos() - self.line_start + 1,
        )
    }

    /// Record a line break that has just been consumed.
    #[inline]
    pub(crate) fn bump_line(&mut self) {
        self.line += 1;
        self.line_start = self.cursor.pos();
    }

    /// Emit an error diagnostic.
    pub(crate) fn error(&mut self, loc: Loc, kind: LexErrorKind) {
        self.errors = true;
        self.diagnostics.push(LexError {
            loc,
            severity: Severity::Error,
            kind,
        });
    }

    /// Emit a deprecation diagnostic; fatal only when promoted by the
    /// configuration.
    pub(crate) fn deprecation(&mut self, loc: Loc, kind: LexErrorKind) {
        if self.config.deprecations_as_errors {
            self.errors = true;
        }
        self.diagnostics.push(LexError {
            loc,
            severity: Severity::Deprecation,
            kind,
        });
    }

    /// Decode one UTF-8 sequence at the cursor, advancing past it on
    /// success and past exactly one byte on failure.
    pub(crate) fn decode_char(&mut self) -> Result<char, &'static str> {
        let pos = self.cursor.pos();
        let end = (pos + 4).min(self.cursor.source_len());
        let bytes = self.cursor.bytes(pos, end);
        if bytes.is_empty() {
            self.cursor.advance_n(1);
            return Err("truncated UTF-8 sequence");
        }
        match utf8::decode(bytes) {
            Ok((c, len)) => {
                self.cursor.advance_n(len);
                Ok(c)
            }
            Err(msg) => {
                self.cursor.advance();
                Err(msg)
            }
        }
    }
}
