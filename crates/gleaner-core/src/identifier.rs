//! Identifier validation for project and spider names.
//!
//! Project names become both a directory and an importable package, and
//! spider names become module files, so both must be bare module identifiers:
//! an ASCII letter or underscore followed by letters, digits or underscores,
//! and not a reserved word.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{Error, Result};

static IDENTIFIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier regex is valid"));

/// Words that cannot be used as project or spider names.
///
/// The keyword list of the generated code's language, plus the engine's own
/// package name, which a same-named project would shadow on import.
pub const RESERVED_WORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global", "if",
    "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try",
    "while", "with", "yield", "gleaner",
];

/// Check whether `name` is a legal, non-reserved module identifier.
pub fn is_valid_identifier(name: &str) -> bool {
    validate_identifier(name).is_ok()
}

/// Validate `name`, returning [`Error::InvalidName`] with the reason on failure.
pub fn validate_identifier(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::invalid_name(name, "name must not be empty"));
    }

    if !IDENTIFIER_RE.is_match(name) {
        return Err(Error::invalid_name(
            name,
            "names must begin with a letter or underscore and contain only letters, numbers and underscores",
        ));
    }

    if RESERVED_WORDS.contains(&name) {
        return Err(Error::invalid_name(name, "name is a reserved word"));
    }

    Ok(())
}
