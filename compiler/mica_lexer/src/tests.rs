//! Crate-level lexer tests: token streams, literals, comments, lookahead,
//! `#line`, and the universal scanning properties.

use crate::{CompilerConfig, LexErrorKind, Lexer, Severity, Token, TokenValue};
use mica_ir::{StringInterner, TokenKind};
use mica_lexer_core::SourceBuffer;

/// Collected result of lexing one source to EOF.
struct Lexed {
    tokens: Vec<Token>,
    kinds: Vec<TokenKind>,
    errors: bool,
    diagnostics: Vec<crate::LexError>,
}

fn lex_with(src: &[u8], doc_comments: bool, comment_tokens: bool) -> Lexed {
    let pool = StringInterner::new();
    let config = CompilerConfig::default();
    let buf = SourceBuffer::new(src);
    let mut lexer = Lexer::new(&pool, &config, "test.mi", &buf, 0, doc_comments, comment_tokens);
    let mut tokens = Vec::new();
    loop {
        let kind = lexer.next();
        tokens.push(lexer.token.clone());
        if kind == TokenKind::Eof {
            break;
        }
        assert!(tokens.len() < src.len() + 16, "lexer failed to terminate");
    }
    Lexed {
        kinds: tokens.iter().map(|t| t.kind).collect(),
        errors: lexer.errors,
        diagnostics: lexer.diagnostics().to_vec(),
        tokens,
    }
}

fn lex(src: &str) -> Lexed {
    lex_with(src.as_bytes(), false, false)
}

fn kinds(src: &str) -> Vec<TokenKind> {
    lex(src).kinds
}

fn single(src: &str) -> Token {
    let lexed = lex(src);
    assert_eq!(
        lexed.kinds.len(),
        2,
        "expected one token + EOF for {src:?}, got {:?}",
        lexed.kinds
    );
    lexed.tokens.into_iter().next().expect("one token")
}

fn string_payload(src: &str) -> (Vec<u8>, u8) {
    let t = single(src);
    match t.value {
        TokenValue::Str { ref text, postfix } => (text.to_vec(), postfix),
        ref other => panic!("expected string payload for {src:?}, got {other:?}"),
    }
}

// === Boundary scenarios ===

#[test]
fn keyword_then_sticky_eof() {
    let pool = StringInterner::new();
    let config = CompilerConfig::default();
    let buf = SourceBuffer::new(b"int\0");
    let mut lexer = Lexer::new(&pool, &config, "test.mi", &buf, 0, false, false);
    assert_eq!(lexer.next(), TokenKind::Int);
    assert_eq!(lexer.next(), TokenKind::Eof);
    let eof_start = lexer.token.start;
    assert_eq!(lexer.next(), TokenKind::Eof);
    assert_eq!(lexer.token.start, eof_start, "EOF must not advance");
    assert!(!lexer.errors);
}

#[test]
fn single_zero() {
    let t = single("0");
    assert_eq!(t.kind, TokenKind::Int32Value);
    assert_eq!(t.int_value(), 0);
}

#[test]
fn hex_literal_kind_ladder() {
    let t = single("0x8000_0000");
    assert_eq!(t.kind, TokenKind::Uns32Value);
    assert_eq!(t.int_value(), 0x8000_0000);

    let t = single("0x1_0000_0000");
    assert_eq!(t.kind, TokenKind::Int64Value);
    assert_eq!(t.int_value(), 0x1_0000_0000);

    let t = single("0x8000_0000_0000_0000");
    assert_eq!(t.kind, TokenKind::Uns64Value);
    assert_eq!(t.int_value(), 0x8000_0000_0000_0000);
}

#[test]
fn wysiwyg_takes_backslash_literally() {
    let (payload, postfix) = string_payload(r#"r"a\nb""#);
    assert_eq!(payload, b"a\\nb");
    assert_eq!(postfix, 0);
}

#[test]
fn delimited_string_nests_parens() {
    let (payload, _) = string_payload(r#"q"(a(b)c)""#);
    assert_eq!(payload, b"a(b)c");
}

#[test]
fn nesting_comment_nests() {
    let lexed = lex("/+ outer /+ inner +/ still outer +/ 1");
    assert_eq!(lexed.kinds, [TokenKind::Int32Value, TokenKind::Eof]);
    assert_eq!(lexed.tokens[0].int_value(), 1);
    assert!(!lexed.errors);
}

#[test]
fn line_directive_rewrites_position() {
    let pool = StringInterner::new();
    let config = CompilerConfig::default();
    let buf = SourceBuffer::new(b"#line 42 \"foo.mi\"\n;");
    let mut lexer = Lexer::new(&pool, &config, "test.mi", &buf, 0, false, false);
    assert_eq!(lexer.next(), TokenKind::Semicolon);
    assert_eq!(lexer.token.loc.line, 42);
    assert_eq!(pool.lookup(lexer.token.loc.file), "foo.mi");
    assert!(!lexer.errors);
}

#[test]
fn lone_backslash_char_at_eof() {
    let lexed = lex("'\\");
    assert_eq!(lexed.kinds[0], TokenKind::CharValue);
    assert_eq!(lexed.tokens[0].int_value(), u64::from(b'\\'));
    assert!(lexed.errors, "missing quote must be diagnosed");
}

#[test]
fn doc_comment_attaches_to_next_token() {
    let lexed = lex_with(b"/** doc */\nvoid", true, false);
    assert_eq!(lexed.kinds, [TokenKind::Void, TokenKind::Eof]);
    assert_eq!(lexed.tokens[0].block_comment.as_deref(), Some(" doc\n"));
    assert_eq!(lexed.tokens[0].line_comment, None);
}

// === Punctuation ===

#[test]
fn maximal_munch_operators() {
    assert_eq!(
        kinds(">>>= >>> >>= >> >= >"),
        [
            TokenKind::UshrAssign,
            TokenKind::Ushr,
            TokenKind::ShrAssign,
            TokenKind::Shr,
            TokenKind::GtEq,
            TokenKind::Gt,
            TokenKind::Eof,
        ]
    );
    assert_eq!(
        kinds("<<= << <>= <> <= <"),
        [
            TokenKind::ShlAssign,
            TokenKind::Shl,
            TokenKind::LessGreaterEq,
            TokenKind::LessGreater,
            TokenKind::LtEq,
            TokenKind::Lt,
            TokenKind::Eof,
        ]
    );
    assert_eq!(
        kinds("!<>= !<> !<= !< !>= !> != !"),
        [
            TokenKind::NotLessGreaterEq,
            TokenKind::NotLessGreater,
            TokenKind::NotLessEq,
            TokenKind::NotLess,
            TokenKind::NotGreaterEq,
            TokenKind::NotGreater,
            TokenKind::NotEq,
            TokenKind::Bang,
            TokenKind::Eof,
        ]
    );
    assert_eq!(
        kinds("^^= ^^ ^= ^"),
        [
            TokenKind::CaretCaretAssign,
            TokenKind::CaretCaret,
            TokenKind::CaretAssign,
            TokenKind::Caret,
            TokenKind::Eof,
        ]
    );
    assert_eq!(
        kinds("... .. . => == ="),
        [
            TokenKind::DotDotDot,
            TokenKind::DotDot,
            TokenKind::Dot,
            TokenKind::FatArrow,
            TokenKind::EqEq,
            TokenKind::Assign,
            TokenKind::Eof,
        ]
    );
    assert_eq!(
        kinds("&& &= & || |= | ++ += + -- -= -"),
        [
            TokenKind::AndAnd,
            TokenKind::AmpAssign,
            TokenKind::Amp,
            TokenKind::OrOr,
            TokenKind::PipeAssign,
            TokenKind::Pipe,
            TokenKind::PlusPlus,
            TokenKind::PlusAssign,
            TokenKind::Plus,
            TokenKind::MinusMinus,
            TokenKind::MinusAssign,
            TokenKind::Minus,
            TokenKind::Eof,
        ]
    );
    assert_eq!(
        kinds("~= ~ *= * /= %= $ @ ? #"),
        [
            TokenKind::TildeAssign,
            TokenKind::Tilde,
            TokenKind::StarAssign,
            TokenKind::Star,
            TokenKind::SlashAssign,
            TokenKind::PercentAssign,
            TokenKind::Dollar,
            TokenKind::At,
            TokenKind::Question,
            TokenKind::Pound,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn range_after_integer_is_not_float() {
    assert_eq!(
        kinds("0..1"),
        [
            TokenKind::Int32Value,
            TokenKind::DotDot,
            TokenKind::Int32Value,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn property_access_on_literal_is_not_float() {
    assert_eq!(
        kinds("5.max"),
        [
            TokenKind::Int32Value,
            TokenKind::Dot,
            TokenKind::Identifier,
            TokenKind::Eof,
        ]
    );
}

// === Numbers ===

#[test]
fn decimal_kind_ladder() {
    assert_eq!(single("2147483647").kind, TokenKind::Int32Value);
    assert_eq!(single("2147483648").kind, TokenKind::Int64Value);
    assert_eq!(single("9223372036854775807").kind, TokenKind::Int64Value);

    let lexed = lex("9223372036854775808");
    assert_eq!(lexed.kinds[0], TokenKind::Uns64Value);
    assert!(lexed
        .diagnostics
        .iter()
        .any(|d| d.kind == LexErrorKind::SignedIntegerOverflow));
}

#[test]
fn integer_suffixes() {
    assert_eq!(single("7U").kind, TokenKind::Uns32Value);
    assert_eq!(single("7u").kind, TokenKind::Uns32Value);
    assert_eq!(single("7L").kind, TokenKind::Int64Value);
    assert_eq!(single("7UL").kind, TokenKind::Uns64Value);
    assert_eq!(single("7LU").kind, TokenKind::Uns64Value);
    assert_eq!(single("4294967296U").kind, TokenKind::Uns64Value);
}

#[test]
fn lowercase_l_suffix_is_deprecated() {
    let lexed = lex("7l");
    assert_eq!(lexed.kinds[0], TokenKind::Int64Value);
    assert!(!lexed.errors, "deprecations are not errors by default");
    assert!(lexed
        .diagnostics
        .iter()
        .any(|d| d.severity == Severity::Deprecation
            && d.kind == LexErrorKind::LowercaseLSuffix));
}

#[test]
fn deprecations_promoted_by_config() {
    let pool = StringInterner::new();
    let config = CompilerConfig {
        deprecations_as_errors: true,
        ..CompilerConfig::default()
    };
    let buf = SourceBuffer::new(b"7l");
    let mut lexer = Lexer::new(&pool, &config, "test.mi", &buf, 0, false, false);
    lexer.next();
    assert!(lexer.errors);
}

#[test]
fn underscore_separators() {
    assert_eq!(single("1_000_000").int_value(), 1_000_000);
    assert_eq!(single("0x_FF_FF").int_value(), 0xFFFF);
    assert_eq!(single("0b1010_1010").int_value(), 0b1010_1010);
}

#[test]
fn octal_literals_deprecated_above_seven() {
    let lexed = lex("0777");
    assert_eq!(lexed.tokens[0].int_value(), 0o777);
    assert!(lexed
        .diagnostics
        .iter()
        .any(|d| d.severity == Severity::Deprecation
            && matches!(d.kind, LexErrorKind::OctalLiteral { value: 511 })));

    // 0..7 stays silent
    assert!(lex("07").diagnostics.is_empty());
}

#[test]
fn illegal_radix_digit_still_accumulates() {
    let lexed = lex("0b102");
    assert_eq!(lexed.kinds[0], TokenKind::Int32Value);
    // (1*2 + 0)*2 + 2 — the out-of-radix digit is folded in
    assert_eq!(lexed.tokens[0].int_value(), 6);
    assert!(lexed
        .diagnostics
        .iter()
        .any(|d| matches!(d.kind, LexErrorKind::RadixDigit { radix: 2, digit: '2' })));
}

#[test]
fn integer_overflow_is_diagnosed() {
    let lexed = lex("0xFFFF_FFFF_FFFF_FFFF_F");
    assert!(lexed
        .diagnostics
        .iter()
        .any(|d| d.kind == LexErrorKind::IntegerOverflow));
}

#[test]
fn bare_base_prefix_is_diagnosed() {
    let lexed = lex("0x");
    assert!(lexed
        .diagnostics
        .iter()
        .any(|d| matches!(d.kind, LexErrorKind::RadixDigit { radix: 16, .. })));
}

// === Floats ===

fn assert_float(src: &str, kind: TokenKind, value: f64) {
    let t = single(src);
    assert_eq!(t.kind, kind, "kind for {src:?}");
    let got = t.float_value();
    assert!(
        (got - value).abs() <= f64::EPSILON * value.abs().max(1.0),
        "value for {src:?}: got {got}, want {value}"
    );
}

#[test]
fn float_forms() {
    assert_float("3.14", TokenKind::Float64Value, 3.14);
    assert_float("1e10", TokenKind::Float64Value, 1e10);
    assert_float("2.5e-3", TokenKind::Float64Value, 2.5e-3);
    assert_float(".5", TokenKind::Float64Value, 0.5);
    assert_float("4.", TokenKind::Float64Value, 4.0);
    assert_float("1_0.5_0", TokenKind::Float64Value, 10.5);
}

#[test]
fn float_suffixes() {
    assert_float("1.5f", TokenKind::Float32Value, 1.5);
    assert_float("1.5F", TokenKind::Float32Value, 1.5);
    assert_float("1.5L", TokenKind::Float80Value, 1.5);
    assert_float("1.5i", TokenKind::Imaginary64Value, 1.5);
    assert_float("1.5fi", TokenKind::Imaginary32Value, 1.5);
    assert_float("1.5Li", TokenKind::Imaginary80Value, 1.5);
    assert_float("3i", TokenKind::Imaginary64Value, 3.0);
    assert_float("123Li", TokenKind::Imaginary80Value, 123.0);
}

#[test]
fn hex_floats() {
    assert_float("0x1p0", TokenKind::Float64Value, 1.0);
    assert_float("0x1.8p3", TokenKind::Float64Value, 12.0);
    assert_float("0xAp-2", TokenKind::Float64Value, 2.5);
}

#[test]
fn hex_float_requires_exponent() {
    let lexed = lex("0x1.8i");
    assert!(lexed
        .diagnostics
        .iter()
        .any(|d| d.kind == LexErrorKind::HexFloatExponentRequired));
}

#[test]
fn float_out_of_range_is_diagnosed_except_for_real() {
    let lexed = lex("1e999");
    assert!(lexed
        .diagnostics
        .iter()
        .any(|d| matches!(d.kind, LexErrorKind::FloatOutOfRange { .. })));

    let lexed = lex("3.5e38f");
    assert!(lexed
        .diagnostics
        .iter()
        .any(|d| matches!(d.kind, LexErrorKind::FloatOutOfRange { .. })));

    // The extended kind absorbs the full range without complaint
    assert!(lex("1e999L").diagnostics.is_empty());
    assert!(lex("3.5e38").diagnostics.is_empty());
}

#[test]
fn uppercase_imaginary_suffix_is_deprecated() {
    let lexed = lex("1.5I");
    assert_eq!(lexed.kinds[0], TokenKind::Imaginary64Value);
    assert!(lexed
        .diagnostics
        .iter()
        .any(|d| d.kind == LexErrorKind::UppercaseISuffix));
}

// === Identifiers, keywords, specials ===

#[test]
fn identifiers_and_keywords() {
    assert_eq!(
        kinds("foreach_reverse foo _bar __traits int9"),
        [
            TokenKind::ForeachReverse,
            TokenKind::Identifier,
            TokenKind::Identifier,
            TokenKind::Traits,
            TokenKind::Identifier,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn identifier_interning_is_stable() {
    let pool = StringInterner::new();
    let config = CompilerConfig::default();
    let buf = SourceBuffer::new(b"abc xyz abc");
    let mut lexer = Lexer::new(&pool, &config, "test.mi", &buf, 0, false, false);
    lexer.next();
    let first = lexer.token.ident();
    lexer.next();
    let second = lexer.token.ident();
    lexer.next();
    let third = lexer.token.ident();
    assert_eq!(first, third);
    assert_ne!(first, second);
    assert_eq!(pool.lookup(first.expect("ident")), "abc");
}

#[test]
fn unicode_identifiers() {
    let lexed = lex("αβγ = δ");
    assert_eq!(
        lexed.kinds,
        [
            TokenKind::Identifier,
            TokenKind::Assign,
            TokenKind::Identifier,
            TokenKind::Eof,
        ]
    );
    assert!(!lexed.errors);
}

#[test]
fn invalid_identifier_codepoint_is_diagnosed() {
    let lexed = lex("ab\u{2603}cd");
    assert!(lexed
        .diagnostics
        .iter()
        .any(|d| matches!(d.kind, LexErrorKind::IdentifierChar { cp: 0x2603 })));
    // Identifier ends before the snowman; the snowman itself is also not
    // a valid token start.
    assert_eq!(lexed.kinds[0], TokenKind::Identifier);
}

#[test]
fn special_version_identifier() {
    let t = single("__VERSION__");
    assert_eq!(t.kind, TokenKind::Int64Value);
    // Default config version is 0.3.0 -> 1000*0 + 3
    assert_eq!(t.int_value(), 3);
}

#[test]
fn special_date_time_identifiers() {
    let (date, postfix) = string_payload("__DATE__");
    assert_eq!(date.len(), 11);
    assert_eq!(postfix, 0);

    let (time, _) = string_payload("__TIME__");
    assert_eq!(time.len(), 8);

    let (stamp, _) = string_payload("__TIMESTAMP__");
    assert_eq!(stamp.len(), 24);

    let (vendor, _) = string_payload("__VENDOR__");
    assert_eq!(vendor, CompilerConfig::default().vendor.as_bytes());
}

#[test]
fn special_eof_consumes_rest() {
    let lexed = lex("__EOF__ int float )))");
    assert_eq!(lexed.kinds, [TokenKind::Eof]);
    assert!(!lexed.errors);
}

// === Strings ===

#[test]
fn escape_string_resolves_escapes() {
    let (payload, _) = string_payload(r#""a\nb\t\"q\\\x41\101A""#);
    assert_eq!(payload, b"a\nb\t\"q\\AAA");
}

#[test]
fn escape_round_trip() {
    for (src, want) in [
        ("'\\a'", 7u64),
        ("'\\b'", 8),
        ("'\\f'", 12),
        ("'\\n'", 10),
        ("'\\r'", 13),
        ("'\\t'", 9),
        ("'\\v'", 11),
        ("'\\''", 39),
        ("'\\\"'", 34),
        ("'\\?'", 63),
        ("'\\\\'", 92),
        ("'\\x41'", 65),
        ("'\\101'", 65),
        ("'\\0'", 0),
    ] {
        let t = single(src);
        assert_eq!(t.kind, TokenKind::CharValue, "kind for {src:?}");
        assert_eq!(t.int_value(), want, "value for {src:?}");
    }
}

#[test]
fn escape_width_selects_char_kind() {
    assert_eq!(single("'\\u0041'").kind, TokenKind::WcharValue);
    assert_eq!(single("'\\U0001F600'").kind, TokenKind::DcharValue);
    let t = single("'\\&amp;'");
    assert_eq!(t.kind, TokenKind::DcharValue);
    assert_eq!(t.int_value(), u64::from(b'&'));
}

#[test]
fn unicode_entity_escape_in_string() {
    let (payload, _) = string_payload(r#""\&euro;""#);
    assert_eq!(payload, "€".as_bytes());
}

#[test]
fn unknown_entity_recovers_with_space() {
    let lexed = lex(r#""\&bogus;""#);
    assert_eq!(lexed.tokens[0].string_bytes(), Some(&b" "[..]));
    assert!(lexed
        .diagnostics
        .iter()
        .any(|d| matches!(d.kind, LexErrorKind::UnknownEntity { .. })));
}

#[test]
fn undefined_escape_keeps_character() {
    let lexed = lex(r#""\q""#);
    assert_eq!(lexed.tokens[0].string_bytes(), Some(&b"q"[..]));
    assert!(lexed.errors);
}

#[test]
fn string_postfixes() {
    assert_eq!(string_payload(r#""s"c"#).1, b'c');
    assert_eq!(string_payload(r#""s"w"#).1, b'w');
    assert_eq!(string_payload(r#""s"d"#).1, b'd');
    assert_eq!(string_payload(r#"r"s"c"#).1, b'c');
    assert_eq!(string_payload(r#"x"00"w"#).1, b'w');
    assert_eq!(string_payload("`s`d").1, b'd');
}

#[test]
fn backtick_wysiwyg() {
    let (payload, _) = string_payload(r"`a\nb`");
    assert_eq!(payload, b"a\\nb");
}

#[test]
fn string_newlines_normalize() {
    let (payload, _) = string_payload("\"a\r\nb\rc\nd\"");
    assert_eq!(payload, b"a\nb\nc\nd");
}

#[test]
fn unterminated_string_recovers_at_eof() {
    let lexed = lex("\"abc");
    assert_eq!(lexed.kinds, [TokenKind::StringValue, TokenKind::Eof]);
    assert_eq!(lexed.tokens[0].string_bytes(), Some(&b"abc"[..]));
    assert!(lexed
        .diagnostics
        .iter()
        .any(|d| matches!(d.kind, LexErrorKind::UnterminatedString { .. })));
}

#[test]
fn hex_string_pairs_bytes() {
    let (payload, _) = string_payload(r#"x"0A 1b  FF""#);
    assert_eq!(payload, [0x0A, 0x1B, 0xFF]);

    let t = single(r#"x"""#);
    assert_eq!(t.kind, TokenKind::HexStringValue);
    assert_eq!(t.string_bytes(), Some(&[][..]));
}

#[test]
fn hex_string_odd_count_writes_final_nibble() {
    let lexed = lex(r#"x"F""#);
    assert_eq!(lexed.tokens[0].string_bytes(), Some(&[0x0F][..]));
    assert!(lexed
        .diagnostics
        .iter()
        .any(|d| matches!(d.kind, LexErrorKind::OddHexDigits { count: 1 })));
}

#[test]
fn hex_string_rejects_non_hex() {
    let lexed = lex(r#"x"0G""#);
    assert!(lexed
        .diagnostics
        .iter()
        .any(|d| matches!(d.kind, LexErrorKind::NonHexCharacter { ch: 'G' })));
}

#[test]
fn delimited_bracket_forms() {
    assert_eq!(string_payload(r#"q"[a[b]c]""#).0, b"a[b]c");
    assert_eq!(string_payload(r#"q"{a{b}c}""#).0, b"a{b}c");
    assert_eq!(string_payload(r#"q"<a<b>c>""#).0, b"a<b>c");
}

#[test]
fn delimited_single_char() {
    assert_eq!(string_payload(r#"q"/abc/""#).0, b"abc");
    assert_eq!(string_payload(r#"q"!hi!""#).0, b"hi");
}

#[test]
fn delimited_heredoc() {
    let (payload, _) = string_payload("q\"EOS\nline one\nline two\nEOS\"");
    assert_eq!(payload, b"line one\nline two\n");
}

#[test]
fn heredoc_delimiter_must_start_line() {
    let (payload, _) = string_payload("q\"END\n not END yet\nEND\"");
    assert_eq!(payload, b" not END yet\n");
}

#[test]
fn heredoc_rest_of_line_must_be_blank() {
    let lexed = lex("q\"EOS junk\nbody\nEOS\"");
    assert!(lexed
        .diagnostics
        .iter()
        .any(|d| d.kind == LexErrorKind::HeredocRestOfLine));
    assert_eq!(lexed.tokens[0].string_bytes(), Some(&b"body\n"[..]));
}

#[test]
fn whitespace_delimiter_is_diagnosed() {
    let lexed = lex("q\" a \"");
    assert!(lexed
        .diagnostics
        .iter()
        .any(|d| d.kind == LexErrorKind::WhitespaceDelimiter));
}

#[test]
fn token_string_counts_braces() {
    let (payload, _) = string_payload("q{ foo(1+2); }");
    assert_eq!(payload, b" foo(1+2); ");

    let (payload, _) = string_payload("q{ { nested } }");
    assert_eq!(payload, b" { nested } ");
}

#[test]
fn token_string_postfix_and_eof() {
    assert_eq!(string_payload("q{x}c").1, b'c');

    let lexed = lex("q{ no close");
    assert_eq!(lexed.kinds[0], TokenKind::StringValue);
    assert!(lexed
        .diagnostics
        .iter()
        .any(|d| d.kind == LexErrorKind::UnterminatedTokenString));
}

// === Character literals ===

#[test]
fn char_literals() {
    assert_eq!(single("'a'").int_value(), u64::from(b'a'));
    assert_eq!(single("' '").int_value(), 32);

    let t = single("'€'");
    assert_eq!(t.kind, TokenKind::WcharValue);
    assert_eq!(t.int_value(), 0x20AC);

    let t = single("'\u{1F600}'");
    assert_eq!(t.kind, TokenKind::DcharValue);
    assert_eq!(t.int_value(), 0x1F600);
}

#[test]
fn empty_char_literal_recovers() {
    let lexed = lex("''");
    assert_eq!(lexed.kinds[0], TokenKind::CharValue);
    assert_eq!(lexed.tokens[0].int_value(), u64::from(b'?'));
    assert!(lexed.errors);
}

#[test]
fn unclosed_char_literal_recovers() {
    let lexed = lex("'ab'");
    assert_eq!(lexed.kinds[0], TokenKind::CharValue);
    assert!(lexed
        .diagnostics
        .iter()
        .any(|d| d.kind == LexErrorKind::UnterminatedCharacter));
}

// === Comments ===

#[test]
fn comments_are_skipped() {
    assert_eq!(
        kinds("a // line\nb /* block */ c /+ nest +/ d"),
        [
            TokenKind::Identifier,
            TokenKind::Identifier,
            TokenKind::Identifier,
            TokenKind::Identifier,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn unterminated_comments_are_diagnosed() {
    let lexed = lex("/* no close");
    assert_eq!(lexed.kinds, [TokenKind::Eof]);
    assert!(lexed
        .diagnostics
        .iter()
        .any(|d| d.kind == LexErrorKind::UnterminatedBlockComment));

    let lexed = lex("/+ /+ half +/ still open");
    assert!(lexed
        .diagnostics
        .iter()
        .any(|d| d.kind == LexErrorKind::UnterminatedNestingComment));
}

#[test]
fn comment_token_mode_emits_comments() {
    let lexed = lex_with(b"// hi\nx /* there */", false, true);
    assert_eq!(
        lexed.kinds,
        [
            TokenKind::Comment,
            TokenKind::Identifier,
            TokenKind::Comment,
            TokenKind::Eof,
        ]
    );
    // Spans bracket the comment bodies
    assert_eq!(lexed.tokens[0].start, 0);
    assert_eq!(lexed.tokens[0].end, 5);
    assert_eq!(lexed.tokens[2].end, 19);
}

#[test]
fn line_doc_comments_concatenate() {
    let lexed = lex_with(b"/// one\n/// two\nvoid", true, false);
    assert_eq!(lexed.tokens[0].block_comment.as_deref(), Some(" one\n two\n"));
}

#[test]
fn blank_line_between_doc_comments_doubles_newline() {
    let lexed = lex_with(b"/// one\n\n/// two\nvoid", true, false);
    assert_eq!(
        lexed.tokens[0].block_comment.as_deref(),
        Some(" one\n\n two\n")
    );
}

#[test]
fn trailing_doc_comment_goes_to_line_slot() {
    let lexed = lex_with(b"int x; /// note\nfloat", true, false);
    let float_tok = &lexed.tokens[3];
    assert_eq!(float_tok.kind, TokenKind::Float);
    assert_eq!(float_tok.line_comment.as_deref(), Some(" note\n"));
    assert_eq!(float_tok.block_comment, None);
}

#[test]
fn non_doc_comments_do_not_attach() {
    let lexed = lex_with(b"/* plain */\n/**/\nvoid", true, false);
    assert_eq!(lexed.tokens[0].block_comment, None);
    assert_eq!(lexed.tokens[0].line_comment, None);
}

#[test]
fn nesting_doc_comment_attaches() {
    let lexed = lex_with(b"/++ plus doc +/\nvoid", true, false);
    assert_eq!(
        lexed.tokens[0].block_comment.as_deref(),
        Some(" plus doc\n")
    );
}

// === Line tracking ===

#[test]
fn line_terminators_count_once_each() {
    let lexed = lex("a\nb\r\nc\rd \u{2028}e \u{2029}f");
    let lines: Vec<u32> = lexed.tokens.iter().map(|t| t.loc.line).collect();
    assert_eq!(lines, [1, 2, 3, 4, 5, 6, 6]);
    assert!(!lexed.errors);
}

#[test]
fn columns_are_one_based_byte_columns() {
    let lexed = lex("ab cd\n  ef");
    assert_eq!(lexed.tokens[0].loc.col, 1);
    assert_eq!(lexed.tokens[1].loc.col, 4);
    assert_eq!(lexed.tokens[2].loc.col, 3);
}

#[test]
fn shebang_is_consumed() {
    let lexed = lex("#!/usr/bin/env mica\nint");
    assert_eq!(lexed.kinds, [TokenKind::Int, TokenKind::Eof]);
    assert_eq!(lexed.tokens[0].loc.line, 2);
    assert!(!lexed.errors);
}

#[test]
fn line_directive_line_macro_form() {
    let lexed = lex("#line __LINE__ __FILE__\n;");
    assert_eq!(lexed.kinds[0], TokenKind::Semicolon);
    assert_eq!(lexed.tokens[0].loc.line, 2);
    assert!(!lexed.errors);
}

#[test]
fn malformed_line_directive_is_diagnosed() {
    let lexed = lex("#line nope\n;");
    assert!(lexed
        .diagnostics
        .iter()
        .any(|d| d.kind == LexErrorKind::MalformedLineDirective));
    // Scanning recovers and continues
    assert_eq!(*lexed.kinds.last().expect("eof"), TokenKind::Eof);
}

#[test]
fn strings_count_embedded_lines() {
    let lexed = lex("\"a\nb\" x");
    assert_eq!(lexed.tokens[1].loc.line, 2);
}

// === Lookahead ===

#[test]
fn peek_matches_next() {
    let pool = StringInterner::new();
    let config = CompilerConfig::default();
    let buf = SourceBuffer::new(b"int x = 1 + 2;");
    let mut lexer = Lexer::new(&pool, &config, "test.mi", &buf, 0, false, false);
    lexer.next();
    loop {
        let peeked = lexer.peek_next();
        let advanced = lexer.next();
        assert_eq!(peeked, advanced);
        if advanced == TokenKind::Eof {
            break;
        }
    }
}

#[test]
fn peek_next2_sees_two_ahead() {
    let pool = StringInterner::new();
    let config = CompilerConfig::default();
    let buf = SourceBuffer::new(b"a b c");
    let mut lexer = Lexer::new(&pool, &config, "test.mi", &buf, 0, false, false);
    lexer.next();
    assert_eq!(lexer.peek_next(), TokenKind::Identifier);
    assert_eq!(lexer.peek_next2(), TokenKind::Identifier);
    lexer.next();
    lexer.next();
    assert_eq!(lexer.peek_next(), TokenKind::Eof);
    assert_eq!(lexer.peek_next2(), TokenKind::Eof);
}

#[test]
fn cached_tokens_preserve_location_and_payload() {
    let pool = StringInterner::new();
    let config = CompilerConfig::default();
    let buf = SourceBuffer::new(b"a\n  42");
    let mut lexer = Lexer::new(&pool, &config, "test.mi", &buf, 0, false, false);
    lexer.next();
    let peeked = lexer.peek(1).clone();
    lexer.next();
    assert_eq!(lexer.token.loc, peeked.loc);
    assert_eq!(lexer.token.loc.line, 2);
    assert_eq!(lexer.token.loc.col, 3);
    assert_eq!(lexer.token.int_value(), 42);
}

#[test]
fn prev_loc_tracks_previous_token() {
    let pool = StringInterner::new();
    let config = CompilerConfig::default();
    let buf = SourceBuffer::new(b"a b");
    let mut lexer = Lexer::new(&pool, &config, "test.mi", &buf, 0, false, false);
    lexer.next();
    let first_loc = lexer.token.loc;
    lexer.next();
    assert_eq!(lexer.prev_loc, first_loc);
}

#[test]
fn peek_past_paren_simple() {
    let pool = StringInterner::new();
    let config = CompilerConfig::default();
    let buf = SourceBuffer::new(b"(a, b) x");
    let mut lexer = Lexer::new(&pool, &config, "test.mi", &buf, 0, false, false);
    assert_eq!(lexer.next(), TokenKind::LParen);
    let after = lexer.peek_past_paren(0);
    assert_eq!(after.kind, TokenKind::Identifier);
    assert_eq!(pool.lookup(after.ident().expect("ident")), "x");
}

#[test]
fn peek_past_paren_nested() {
    let pool = StringInterner::new();
    let config = CompilerConfig::default();
    let buf = SourceBuffer::new(b"((a), (b)) y");
    let mut lexer = Lexer::new(&pool, &config, "test.mi", &buf, 0, false, false);
    assert_eq!(lexer.next(), TokenKind::LParen);
    let after = lexer.peek_past_paren(0);
    assert_eq!(pool.lookup(after.ident().expect("ident")), "y");
}

#[test]
fn peek_past_paren_stops_at_stray_semicolon_and_eof() {
    let pool = StringInterner::new();
    let config = CompilerConfig::default();
    let buf = SourceBuffer::new(b"(a; b");
    let mut lexer = Lexer::new(&pool, &config, "test.mi", &buf, 0, false, false);
    assert_eq!(lexer.next(), TokenKind::LParen);
    assert_eq!(lexer.peek_past_paren(0).kind, TokenKind::Semicolon);

    let buf = SourceBuffer::new(b"(a");
    let mut lexer = Lexer::new(&pool, &config, "test.mi", &buf, 0, false, false);
    assert_eq!(lexer.next(), TokenKind::LParen);
    assert_eq!(lexer.peek_past_paren(0).kind, TokenKind::Eof);
}

#[test]
fn peek_past_paren_ignores_semicolons_in_braces() {
    let pool = StringInterner::new();
    let config = CompilerConfig::default();
    let buf = SourceBuffer::new(b"(a, { x; y; }) z");
    let mut lexer = Lexer::new(&pool, &config, "test.mi", &buf, 0, false, false);
    assert_eq!(lexer.next(), TokenKind::LParen);
    let after = lexer.peek_past_paren(0);
    assert_eq!(pool.lookup(after.ident().expect("ident")), "z");
}

// === Span coverage ===

#[test]
fn token_spans_are_monotone() {
    let lexed = lex("int x = 42; /* gap */ \"s\" 'c' q{tok}");
    let mut prev_end = 0;
    for t in &lexed.tokens {
        assert!(t.start >= prev_end, "token spans overlap");
        assert!(t.end >= t.start);
        prev_end = t.end;
    }
}

// === Properties ===

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn termination_on_arbitrary_bytes(bytes in proptest::collection::vec(any::<u8>(), 0..512)) {
            let pool = StringInterner::new();
            let config = CompilerConfig::default();
            let buf = SourceBuffer::new(&bytes);
            let mut lexer = Lexer::new(&pool, &config, "fuzz.mi", &buf, 0, true, false);
            let mut steps = 0usize;
            loop {
                let kind = lexer.next();
                if kind == TokenKind::Eof {
                    break;
                }
                steps += 1;
                prop_assert!(steps <= bytes.len() + 4, "no progress on {:?}", bytes);
            }
            // EOF stays sticky
            prop_assert_eq!(lexer.next(), TokenKind::Eof);
        }

        #[test]
        fn spans_monotone_on_arbitrary_bytes(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
            let pool = StringInterner::new();
            let config = CompilerConfig::default();
            let buf = SourceBuffer::new(&bytes);
            let mut lexer = Lexer::new(&pool, &config, "fuzz.mi", &buf, 0, false, false);
            let mut prev_end = 0u32;
            loop {
                let kind = lexer.next();
                prop_assert!(lexer.token.start >= prev_end);
                prop_assert!(lexer.token.end >= lexer.token.start);
                prev_end = lexer.token.end;
                if kind == TokenKind::Eof {
                    break;
                }
            }
        }

        #[test]
        fn peek_agrees_with_next(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
            let pool = StringInterner::new();
            let config = CompilerConfig::default();
            let buf = SourceBuffer::new(&bytes);
            let mut lexer = Lexer::new(&pool, &config, "fuzz.mi", &buf, 0, false, false);
            loop {
                let peeked = lexer.peek_next();
                let advanced = lexer.next();
                prop_assert_eq!(peeked, advanced);
                if advanced == TokenKind::Eof {
                    break;
                }
            }
        }

        #[test]
        fn decimal_fidelity(n in 0u64..0x8000_0000_0000_0000) {
            let src = n.to_string();
            let pool = StringInterner::new();
            let config = CompilerConfig::default();
            let buf = SourceBuffer::new(src.as_bytes());
            let mut lexer = Lexer::new(&pool, &config, "num.mi", &buf, 0, false, false);
            let kind = lexer.next();
            prop_assert_eq!(lexer.token.int_value(), n);
            let want = if n <= 0x7FFF_FFFF {
                TokenKind::Int32Value
            } else {
                TokenKind::Int64Value
            };
            prop_assert_eq!(kind, want);
            prop_assert_eq!(lexer.next(), TokenKind::Eof);
            prop_assert!(!lexer.errors);
        }

        #[test]
        fn line_counting_matches_terminators(
            lines in proptest::collection::vec("[a-z0-9 \\+\\-\\*\\(\\)';,]{0,12}", 0..12)
        ) {
            let src = lines.join("\n");
            let pool = StringInterner::new();
            let config = CompilerConfig::default();
            let buf = SourceBuffer::new(src.as_bytes());
            let mut lexer = Lexer::new(&pool, &config, "lines.mi", &buf, 0, false, false);
            while lexer.next() != TokenKind::Eof {}
            let newlines = src.bytes().filter(|&b| b == b'\n').count() as u32;
            prop_assert_eq!(lexer.token.loc.line, 1 + newlines);
        }
    }
}
