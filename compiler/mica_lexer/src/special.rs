//! Special identifier substitutions.
//!
//! `__DATE__`, `__TIME__`, and `__TIMESTAMP__` all derive from one clock
//! sample taken lazily at first use and memoized for the process, so every
//! lexer (and every use within one compilation) sees identical values.
//! `__VERSION__` condenses a `N.M...` version string into the integer
//! `1000 * N + M`.

use chrono::Local;
use std::sync::OnceLock;

/// Memoized clock-derived strings, ctime-style formats:
/// `date` = `Mmm dd yyyy`, `time` = `hh:mm:ss`,
/// `timestamp` = `Www Mmm dd hh:mm:ss yyyy`.
pub(crate) struct Timestamps {
    pub date: String,
    pub time: String,
    pub timestamp: String,
}

static STAMPS: OnceLock<Timestamps> = OnceLock::new();

/// The process-wide timestamp strings, sampled once.
pub(crate) fn timestamps() -> &'static Timestamps {
    STAMPS.get_or_init(|| {
        let now = Local::now();
        Timestamps {
            date: now.format("%b %e %Y").to_string(),
            time: now.format("%H:%M:%S").to_string(),
            timestamp: now.format("%a %b %e %H:%M:%S %Y").to_string(),
        }
    })
}

/// Condense a version string of the form `N.M...` into `1000 * N + M`.
///
/// Trailing patch components and any non-digit suffixes are ignored; a
/// string with no parseable leading digits yields 0.
pub(crate) fn version_number(version: &str) -> u64 {
    let mut parts = version.split('.');
    let major = leading_digits(parts.next().unwrap_or(""));
    let minor = leading_digits(parts.next().unwrap_or(""));
    major * 1000 + minor
}

fn leading_digits(s: &str) -> u64 {
    let mut v: u64 = 0;
    for b in s.bytes() {
        if !b.is_ascii_digit() {
            break;
        }
        v = v.saturating_mul(10).saturating_add(u64::from(b - b'0'));
    }
    v
}
