//! Operator-visible progress and warning output.
//!
//! The crate writes progress to stderr with explicit `writeln!` calls rather
//! than a logging framework; stdout is reserved for forwarded child-process
//! output.

use std::io::{self, Write};

/// Writes a progress note for the operator.
pub(crate) fn note(message: &str) {
    writeln!(io::stderr(), "{message}").ok();
}

/// Writes a non-fatal warning for the operator.
pub(crate) fn warn(message: &str) {
    writeln!(io::stderr(), "warning: {message}").ok();
}
