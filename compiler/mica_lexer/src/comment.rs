//! Comment scanning and doc-comment harvesting.
//!
//! Three comment shapes hang off `/`: line comments, non-nesting block
//! comments, and nesting `/+ +/` comments. In comment-token mode every
//! comment becomes a token; otherwise comments are skipped, and a comment
//! whose opener is tripled (`/**`, `/++`, `///`) has its body
//! canonicalized and attached to the next real token — as a line comment
//! when it trails a token on the same line, as a block comment otherwise.

use crate::lex_error::LexErrorKind;
use crate::lexer::Lexer;
use crate::token::Token;
use mica_ir::TokenKind;

impl<'a> Lexer<'a> {
    /// Handle `/` and everything behind it. Returns `Some(kind)` when a
    /// token was produced (`/`, `/=`, or a `Comment` token), `None` when a
    /// comment was consumed and scanning should continue.
    ///
    /// `last_line` is the line the previous token ended on; `doc_end_line`
    /// tracks the end line of the previous doc comment attached to this
    /// token, for blank-line-aware concatenation.
    pub(crate) fn scan_slash(
        &mut self,
        t: &mut Token,
        last_line: u32,
        doc_end_line: &mut u32,
    ) -> Option<TokenKind> {
        match self.cursor.peek() {
            b'=' => {
                self.cursor.advance_n(2);
                Some(TokenKind::SlashAssign)
            }
            b'/' => {
                self.cursor.advance_n(2);
                loop {
                    let b = self.cursor.current();
                    if matches!(b, b'\n' | b'\r' | 0 | 0x1A) {
                        break;
                    }
                    if b >= 0x80 {
                        let saved = self.cursor;
                        let loc = self.here();
                        match self.decode_char() {
                            Ok('\u{2028}') | Ok('\u{2029}') => {
                                // Line separator ends the comment; leave it
                                // for the dispatcher to count.
                                self.cursor = saved;
                                break;
                            }
                            Ok(_) => {}
                            Err(msg) => self.error(loc, LexErrorKind::InvalidUtf8 { msg }),
                        }
                        continue;
                    }
                    self.cursor.advance();
                }
                self.comment_epilogue(t, b'/', true, last_line, doc_end_line)
            }
            b'*' => {
                self.cursor.advance_n(2);
                let mut terminated = false;
                loop {
                    let b = self.cursor.current();
                    match b {
                        b'*' if self.cursor.peek() == b'/' => {
                            self.cursor.advance_n(2);
                            terminated = true;
                            break;
                        }
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
                            self.error(t.loc, LexErrorKind::UnterminatedBlockComment);
                            break;
                        }
                        _ if b >= 0x80 => self.comment_utf8(),
                        _ => self.cursor.advance(),
                    }
                }
                self.comment_epilogue(t, b'*', terminated, last_line, doc_end_line)
            }
            b'+' => {
                self.cursor.advance_n(2);
                let mut nest: u32 = 1;
                let mut terminated = false;
                loop {
                    let b = self.cursor.current();
                    match b {
                        b'/' if self.cursor.peek() == b'+' => {
                            self.cursor.advance_n(2);
                            nest += 1;
                        }
                        b'+' if self.cursor.peek() == b'/' => {
                            self.cursor.advance_n(2);
                            nest -= 1;
                            if nest == 0 {
                                terminated = true;
                                break;
                            }
                        }
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
                            self.error(t.loc, LexErrorKind::UnterminatedNestingComment);
                            break;
                        }
                        _ if b >= 0x80 => self.comment_utf8(),
                        _ => self.cursor.advance(),
                    }
                }
                self.comment_epilogue(t, b'+', terminated, last_line, doc_end_line)
            }
            _ => {
                self.cursor.advance();
                Some(TokenKind::Slash)
            }
        }
    }

    /// After a comment body has been consumed: either produce a `Comment`
    /// token, harvest a doc comment, or fall through to normal scanning.
    fn comment_epilogue(
        &mut self,
        t: &mut Token,
        fill: u8,
        terminated: bool,
        last_line: u32,
        doc_end_line: &mut u32,
    ) -> Option<TokenKind> {
        if self.comment_tokens {
            return Some(TokenKind::Comment);
        }
        if !self.doc_comments {
            return None;
        }
        let text = self.cursor.bytes(t.start, self.cursor.pos());
        // Doc comments triple their opener; `/**/` and `/++/` are the
        // empty non-doc forms.
        let is_doc = match fill {
            b'/' => text.len() > 2 && text[2] == b'/',
            _ => text.len() > 4 && text[2] == fill,
        };
        if !is_doc {
            return None;
        }
        let body_end = if fill != b'/' && terminated {
            text.len() - 2
        } else {
            text.len()
        };
        let canon = canonicalize(&text[3..body_end], fill);
        let start_line = t.loc.line;
        let end_line = self.line;
        let gap = *doc_end_line != 0 && start_line > *doc_end_line + 1;
        let slot = if self.any_token && end_line == last_line {
            &mut t.line_comment
        } else {
            &mut t.block_comment
        };
        let mut s = slot.take().map(String::from).unwrap_or_default();
        if !s.is_empty() && gap {
            s.push('\n');
        }
        s.push_str(&canon);
        *slot = Some(s.into_boxed_str());
        *doc_end_line = end_line;
        None
    }

    /// Decode one non-ASCII sequence inside a comment: invalid UTF-8 is
    /// still diagnosed there, and LS/PS still count as line breaks.
    fn comment_utf8(&mut self) {
        let loc = self.here();
        match self.decode_char() {
            Ok('\u{2028}') | Ok('\u{2029}') => self.bump_line(),
            Ok(_) => {}
            Err(msg) => self.error(loc, LexErrorKind::InvalidUtf8 { msg }),
        }
    }
}

/// Canonicalize a doc comment body.
///
/// Strips the initial banner row of fill characters, strips one leading
/// fill character per line (with the whitespace before it), normalizes
/// line endings to `\n`, trims trailing whitespace per line, and
/// guarantees a terminating `\n`.
pub(crate) fn canonicalize(body: &[u8], fill: u8) -> String {
    let mut buf: Vec<u8> = Vec::with_capacity(body.len());
    let mut i = 0;

    // Initial row of fill characters (e.g. the banner of `/****`)
    while i < body.len() && body[i] == fill {
        i += 1;
    }

    let mut linestart = false;
    while i < body.len() {
        let c = body[i];
        match c {
            b'*' | b'+' | b'/' if linestart && c == fill => {
                linestart = false;
                trim_trailing_blanks(&mut buf);
                i += 1;
                continue;
            }
            b' ' | b'\t' => {}
            b'\r' => {
                if body.get(i + 1) == Some(&b'\n') {
                    i += 1; // the \n handles the line break
                    continue;
                }
                trim_trailing_blanks(&mut buf);
                buf.push(b'\n');
                linestart = true;
                i += 1;
                continue;
            }
            b'\n' => {
                trim_trailing_blanks(&mut buf);
                buf.push(b'\n');
                linestart = true;
                i += 1;
                continue;
            }
            _ => linestart = false,
        }
        buf.push(c);
        i += 1;
    }

    trim_trailing_blanks(&mut buf);
    if buf.last() != Some(&b'\n') {
        buf.push(b'\n');
    }
    String::from_utf8_lossy(&buf).into_owned()
}

fn trim_trailing_blanks(buf: &mut Vec<u8>) {
    while matches!(buf.last(), Some(b' ') | Some(b'\t')) {
        buf.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::canonicalize;

    #[test]
    fn simple_block_body() {
        assert_eq!(canonicalize(b" hello ", b'*'), " hello\n");
    }

    #[test]
    fn banner_row_stripped() {
        // Body of `/**** header` style comments
        assert_eq!(canonicalize(b"*** header", b'*'), " header\n");
    }

    #[test]
    fn per_line_fill_stripped() {
        let body = b" First line\n * Second line\n * Third line\n";
        assert_eq!(
            canonicalize(body, b'*'),
            " First line\n Second line\n Third line\n"
        );
    }

    #[test]
    fn only_one_fill_char_stripped_per_line() {
        let body = b"\n ** still starred\n";
        assert_eq!(canonicalize(body, b'*'), "\n* still starred\n");
    }

    #[test]
    fn trailing_whitespace_trimmed() {
        assert_eq!(canonicalize(b"text   \t\nmore  ", b'/'), "text\nmore\n");
    }

    #[test]
    fn crlf_and_lone_cr_normalized() {
        assert_eq!(canonicalize(b"a\r\nb\rc", b'*'), "a\nb\nc\n");
    }

    #[test]
    fn empty_body_gets_single_newline() {
        assert_eq!(canonicalize(b"", b'*'), "\n");
        assert_eq!(canonicalize(b"   ", b'*'), "\n");
    }

    #[test]
    fn fill_mid_line_is_kept() {
        assert_eq!(canonicalize(b"a * b", b'*'), "a * b\n");
    }

    #[test]
    fn matches_line_comment_fill() {
        // `//// header` after the `///` opener: one leading `/` is the
        // banner row remainder
        assert_eq!(canonicalize(b"/ header", b'/'), " header\n");
    }
}
