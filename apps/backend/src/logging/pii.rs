//! Scrubbing for raw database messages before they reach the logs.
//!
//! Driver errors echo parameter values back (display names, payload JSON).
//! Only constraint and table names are kept.

use std::fmt;

use lazy_regex::regex;

/// Masks quoted literals and Postgres `Key (...)=(...)` details.
pub fn redact(input: &str) -> String {
    let keys = regex!(r"Key \(([^)]*)\)=\([^)]*\)");
    let quoted = regex!(r"'(?:[^']|'')*'");
    let masked = keys.replace_all(input, "Key ($1)=([REDACTED])");
    quoted.replace_all(&masked, "'[REDACTED]'").into_owned()
}

/// `Display` wrapper that redacts on format.
pub struct Redacted<'a>(pub &'a str);

impl fmt::Display for Redacted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&redact(self.0))
    }
}
