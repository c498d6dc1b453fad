//! Keyword resolution.
//!
//! The intern pool canonicalizes identifier text; this module supplies the
//! second half of the `idPool` contract, mapping keyword text to its own
//! [`TokenKind`]. The lookup buckets by length first: keywords run from 2
//! (`do`, `if`) to 15 (`foreach_reverse`) characters, so most identifiers
//! are rejected by a single length compare.

use mica_ir::TokenKind;

/// Look up a keyword by its text.
///
/// Returns the keyword's `TokenKind`, or `None` for ordinary identifiers.
#[inline]
pub(crate) fn lookup(text: &str) -> Option<TokenKind> {
    use TokenKind::*;

    let len = text.len();
    if !(2..=15).contains(&len) {
        return None;
    }

    match len {
        2 => match text {
            "do" => Some(Do),
            "if" => Some(If),
            "in" => Some(In),
            "is" => Some(Is),
            _ => None,
        },
        3 => match text {
            "asm" => Some(Asm),
            "for" => Some(For),
            "int" => Some(Int),
            "new" => Some(New),
            "out" => Some(Out),
            "ref" => Some(Ref),
            "try" => Some(Try),
            _ => None,
        },
        4 => match text {
            "auto" => Some(Auto),
            "bool" => Some(Bool),
            "byte" => Some(Byte),
            "case" => Some(Case),
            "cast" => Some(Cast),
            "cent" => Some(Cent),
            "char" => Some(Char),
            "else" => Some(Else),
            "enum" => Some(Enum),
            "goto" => Some(Goto),
            "lazy" => Some(Lazy),
            "long" => Some(Long),
            "null" => Some(Null),
            "pure" => Some(Pure),
            "real" => Some(Real),
            "this" => Some(This),
            "true" => Some(True),
            "uint" => Some(Uint),
            "void" => Some(Void),
            "with" => Some(With),
            _ => None,
        },
        5 => match text {
            "alias" => Some(Alias),
            "align" => Some(Align),
            "break" => Some(Break),
            "catch" => Some(Catch),
            "class" => Some(Class),
            "const" => Some(Const),
            "creal" => Some(Creal),
            "dchar" => Some(Dchar),
            "debug" => Some(Debug),
            "false" => Some(False),
            "final" => Some(Final),
            "float" => Some(Float),
            "inout" => Some(Inout),
            "ireal" => Some(Ireal),
            "mixin" => Some(Mixin),
            "scope" => Some(Scope),
            "short" => Some(Short),
            "super" => Some(Super),
            "throw" => Some(Throw),
            "ubyte" => Some(Ubyte),
            "ucent" => Some(Ucent),
            "ulong" => Some(Ulong),
            "union" => Some(Union),
            "wchar" => Some(Wchar),
            "while" => Some(While),
            _ => None,
        },
        6 => match text {
            "assert" => Some(Assert),
            "cfloat" => Some(Cfloat),
            "delete" => Some(Delete),
            "double" => Some(Double),
            "export" => Some(Export),
            "extern" => Some(Extern),
            "ifloat" => Some(Ifloat),
            "import" => Some(Import),
            "module" => Some(Module),
            "pragma" => Some(Pragma),
            "public" => Some(Public),
            "return" => Some(Return),
            "shared" => Some(Shared),
            "static" => Some(Static),
            "struct" => Some(Struct),
            "switch" => Some(Switch),
            "typeid" => Some(Typeid),
            "typeof" => Some(Typeof),
            "ushort" => Some(Ushort),
            _ => None,
        },
        7 => match text {
            "cdouble" => Some(Cdouble),
            "default" => Some(Default),
            "finally" => Some(Finally),
            "foreach" => Some(Foreach),
            "idouble" => Some(Idouble),
            "nothrow" => Some(Nothrow),
            "package" => Some(Package),
            "private" => Some(Private),
            "version" => Some(Version),
            _ => None,
        },
        8 => match text {
            "abstract" => Some(Abstract),
            "continue" => Some(Continue),
            "delegate" => Some(Delegate),
            "function" => Some(Function),
            "override" => Some(Override),
            "template" => Some(Template),
            "unittest" => Some(Unittest),
            "__traits" => Some(Traits),
            "__vector" => Some(Vector),
            _ => None,
        },
        9 => match text {
            "immutable" => Some(Immutable),
            "interface" => Some(Interface),
            "invariant" => Some(Invariant),
            "protected" => Some(Protected),
            "__gshared" => Some(Gshared),
            _ => None,
        },
        10 => match text {
            "deprecated" => Some(Deprecated),
            _ => None,
        },
        12 => match text {
            "synchronized" => Some(Synchronized),
            "__parameters" => Some(Parameters),
            _ => None,
        },
        15 => match text {
            "foreach_reverse" => Some(ForeachReverse),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_types_resolve() {
        assert_eq!(lookup("int"), Some(TokenKind::Int));
        assert_eq!(lookup("uint"), Some(TokenKind::Uint));
        assert_eq!(lookup("dchar"), Some(TokenKind::Dchar));
        assert_eq!(lookup("cdouble"), Some(TokenKind::Cdouble));
    }

    #[test]
    fn control_flow_resolves() {
        assert_eq!(lookup("if"), Some(TokenKind::If));
        assert_eq!(lookup("foreach_reverse"), Some(TokenKind::ForeachReverse));
        assert_eq!(lookup("synchronized"), Some(TokenKind::Synchronized));
    }

    #[test]
    fn double_underscore_forms_resolve() {
        assert_eq!(lookup("__traits"), Some(TokenKind::Traits));
        assert_eq!(lookup("__gshared"), Some(TokenKind::Gshared));
        assert_eq!(lookup("__parameters"), Some(TokenKind::Parameters));
        assert_eq!(lookup("__vector"), Some(TokenKind::Vector));
    }

    #[test]
    fn non_keywords_rejected() {
        assert_eq!(lookup("foo"), None);
        assert_eq!(lookup("Interface"), None);
        assert_eq!(lookup("intx"), None);
        assert_eq!(lookup("i"), None);
        assert_eq!(lookup(""), None);
        assert_eq!(lookup("averylongidentifiername"), None);
        // Special identifiers are substitutions, not keywords
        assert_eq!(lookup("__EOF__"), None);
        assert_eq!(lookup("__DATE__"), None);
    }

    #[test]
    fn every_keyword_round_trips_through_as_str() {
        // For every keyword bucket entry, the TokenKind's surface text must
        // map back to the same kind.
        for kw in [
            "do", "if", "in", "is", "asm", "for", "int", "new", "out", "ref", "try", "auto",
            "bool", "byte", "case", "cast", "cent", "char", "else", "enum", "goto", "lazy",
            "long", "null", "pure", "real", "this", "true", "uint", "void", "with", "alias",
            "align", "break", "catch", "class", "const", "creal", "dchar", "debug", "false",
            "final", "float", "inout", "ireal", "mixin", "scope", "short", "super", "throw",
            "ubyte", "ucent", "ulong", "union", "wchar", "while", "assert", "cfloat", "delete",
            "double", "export", "extern", "ifloat", "import", "module", "pragma", "public",
            "return", "shared", "static", "struct", "switch", "typeid", "typeof", "ushort",
            "cdouble", "default", "finally", "foreach", "idouble", "nothrow", "package",
            "private", "version", "abstract", "continue", "delegate", "function", "override",
            "template", "unittest", "__traits", "__vector", "immutable", "interface",
            "invariant", "protected", "__gshared", "deprecated", "synchronized",
            "__parameters", "foreach_reverse",
        ] {
            let kind = lookup(kw).unwrap_or_else(|| panic!("{kw} should be a keyword"));
            assert_eq!(kind.as_str(), kw);
            assert!(kind.is_keyword());
        }
    }
}
