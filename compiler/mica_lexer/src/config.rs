//! Compiler configuration seen by the lexer.
//!
//! The lexer only needs three things from the wider compiler configuration:
//! the vendor string (`__VENDOR__`), the version string (`__VERSION__`),
//! and whether deprecations are promoted to errors.

/// Configuration slice consumed by the lexer.
#[derive(Clone, Debug)]
pub struct CompilerConfig {
    /// Vendor string substituted for `__VENDOR__`.
    pub vendor: String,
    /// Version string of the form `N.M...`; `__VERSION__` becomes the
    /// integer `1000 * N + M`.
    pub version: String,
    /// When set, deprecation diagnostics also set the lexer's `errors` flag.
    pub deprecations_as_errors: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        CompilerConfig {
            vendor: "Mica reference compiler".to_string(),
            version: "0.3.0".to_string(),
            deprecations_as_errors: false,
        }
    }
}
