//! Lexer diagnostics.
//!
//! Every diagnostic the lexer emits is a [`LexError`]: WHERE (`loc`),
//! severity (hard error or deprecation), and WHAT (`kind`). The lexer
//! accumulates them in order; the `errors` flag on the lexer mirrors
//! whether any error-severity diagnostic (or, with
//! `deprecations_as_errors`, any deprecation) was pushed.
//!
//! Recovery is never signalled through these values: the scanner always
//! produces some token and keeps going regardless of what it reports here.

use mica_ir::Loc;
use std::fmt;

/// Severity of a lexer diagnostic.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Severity {
    /// A hard lexical error.
    Error,
    /// A deprecation; only fatal when deprecations are promoted.
    Deprecation,
}

/// A lexer diagnostic with its location.
#[derive(Clone, Debug, PartialEq)]
pub struct LexError {
    /// WHERE the problem was found.
    pub loc: Loc,
    /// Whether this is a hard error or a deprecation.
    pub severity: Severity,
    /// WHAT went wrong.
    pub kind: LexErrorKind,
}

/// What kind of lexer diagnostic occurred.
#[derive(Clone, Debug, PartialEq)]
pub enum LexErrorKind {
    // Dispatcher
    /// A byte or code point that cannot start any token.
    InvalidToken { ch: char },
    /// Broken UTF-8 in the source.
    InvalidUtf8 { msg: &'static str },
    /// Unicode code point not allowed inside an identifier.
    IdentifierChar { cp: u32 },

    // Strings and characters
    /// String literal ran into EOF; `start` is where it began.
    UnterminatedString { start: Loc },
    /// Token string (`q{...}`) ran into EOF.
    UnterminatedTokenString,
    /// Character literal missing its closing quote (or empty).
    UnterminatedCharacter,
    /// Escape sequence not in the recognized table.
    UndefinedEscape { ch: char },
    /// `\x`/`\u`/`\U` with the wrong number of hex digits.
    EscapeHexDigits { found: u32, expected: u32 },
    /// `\x` (or friends) not followed by any hex digit.
    UndefinedHexEscape { ch: char },
    /// Octal escape beyond `\377`.
    OctalEscapeTooLarge { value: u32 },
    /// `\u`/`\U` escape naming an invalid code point.
    InvalidCodePoint { cp: u32 },
    /// `\&name` missing its terminating `;`.
    UnterminatedEntity,
    /// `\&name;` with a name the entity table does not know.
    UnknownEntity { name: String },
    /// Non-hex, non-whitespace character inside `x"..."`.
    NonHexCharacter { ch: char },
    /// `x"..."` with an odd number of hex digits.
    OddHexDigits { count: u32 },
    /// `q"..."` delimiter is whitespace.
    WhitespaceDelimiter,
    /// Delimited string not closed by the expected delimiter-plus-quote.
    DelimiterMismatch { delim: char },
    /// Heredoc delimiter line has trailing text.
    HeredocRestOfLine,

    // Numbers
    /// Digit outside the literal's radix (still accumulated).
    RadixDigit { radix: u32, digit: char },
    /// Literal does not fit in 64 bits.
    IntegerOverflow,
    /// Decimal literal exceeds the signed 64-bit range without a `U` suffix.
    SignedIntegerOverflow,
    /// Integer suffix letter repeated.
    RepeatedSuffix { suffix: char },
    /// Octal literal with value 8 or more (deprecation).
    OctalLiteral { value: u64 },
    /// Lowercase `l` integer suffix (deprecation).
    LowercaseLSuffix,
    /// Uppercase `I` imaginary suffix (deprecation).
    UppercaseISuffix,
    /// Hex float without the mandatory binary exponent.
    HexFloatExponentRequired,
    /// Exponent marker with no digits after it.
    MissingExponentDigits,
    /// Literal not representable in the target float width.
    FloatOutOfRange { literal: String },

    // Comments
    /// `/* */` comment ran into EOF.
    UnterminatedBlockComment,
    /// `/+ +/` comment ran into EOF with open nesting.
    UnterminatedNestingComment,

    // #line
    /// `#line` directive did not match `#line integer ["filespec"]`.
    MalformedLineDirective,
}

impl fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use LexErrorKind::*;
        match self {
            InvalidToken { ch } => {
                if ch.is_ascii_graphic() {
                    write!(f, "character '{ch}' is not a valid token")
                } else {
                    write!(f, "character 0x{:02x} is not a valid token", *ch as u32)
                }
            }
            InvalidUtf8 { msg } => write!(f, "{msg}"),
            IdentifierChar { cp } => {
                write!(f, "char 0x{cp:04x} not allowed in identifier")
            }
            UnterminatedString { start } => {
                write!(f, "unterminated string constant starting at {start}")
            }
            UnterminatedTokenString => write!(f, "unterminated token string constant"),
            UnterminatedCharacter => write!(f, "unterminated character constant"),
            UndefinedEscape { ch } => write!(f, "undefined escape sequence \\{ch}"),
            EscapeHexDigits { found, expected } => write!(
                f,
                "escape hex sequence has {found} hex digits instead of {expected}"
            ),
            UndefinedHexEscape { ch } => {
                write!(f, "undefined escape hex sequence \\{ch}")
            }
            OctalEscapeTooLarge { value } => {
                write!(f, "escape octal sequence \\{value:03o} is larger than \\377")
            }
            InvalidCodePoint { cp } => write!(f, "invalid UTF character \\U{cp:08x}"),
            UnterminatedEntity => write!(f, "unterminated named entity"),
            UnknownEntity { name } => write!(f, "unnamed character entity &{name};"),
            NonHexCharacter { ch } => write!(f, "non-hex character '{ch}'"),
            OddHexDigits { count } => {
                write!(f, "odd number ({count}) of hex characters in hex string")
            }
            WhitespaceDelimiter => write!(f, "delimiter cannot be whitespace"),
            DelimiterMismatch { delim } => {
                write!(f, "delimited string must end in {delim}\"")
            }
            HeredocRestOfLine => write!(f, "heredoc rest of line should be blank"),
            RadixDigit { radix, digit } => {
                write!(f, "radix {radix} digit expected, not '{digit}'")
            }
            IntegerOverflow => write!(f, "integer overflow"),
            SignedIntegerOverflow => write!(f, "signed integer overflow"),
            RepeatedSuffix { suffix } => {
                write!(f, "repeated integer suffix '{suffix}'")
            }
            OctalLiteral { value } => write!(
                f,
                "octal literals larger than 7 are deprecated, value is {value}"
            ),
            LowercaseLSuffix => write!(f, "'l' suffix is deprecated, use 'L' instead"),
            UppercaseISuffix => write!(f, "'I' suffix is deprecated, use 'i' instead"),
            HexFloatExponentRequired => write!(f, "exponent required for hex float"),
            MissingExponentDigits => write!(f, "missing exponent digits"),
            FloatOutOfRange { literal } => {
                write!(f, "number '{literal}' is not representable")
            }
            UnterminatedBlockComment => write!(f, "unterminated /* */ comment"),
            UnterminatedNestingComment => write!(f, "unterminated /+ +/ comment"),
            MalformedLineDirective => {
                write!(f, "#line integer [\"filespec\"]\\n expected")
            }
        }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.severity {
            Severity::Error => write!(f, "{}: error: {}", self.loc, self.kind),
            Severity::Deprecation => write!(f, "{}: deprecation: {}", self.loc, self.kind),
        }
    }
}

impl std::error::Error for LexError {}
