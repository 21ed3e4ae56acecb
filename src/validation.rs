//! Name validation for store paths
//!
//! Database and collection names come from configuration and become
//! directory names, so they are restricted to safe path segments.

use std::fmt;

/// A rejected database or collection name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameError {
    pub kind: &'static str,
    pub value: String,
    pub reason: &'static str,
}

impl fmt::Display for NameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid {} '{}': {}", self.kind, self.value, self.reason)
    }
}

impl std::error::Error for NameError {}

/// Maximum length for names
pub const MAX_NAME_LENGTH: usize = 64;

/// Names that are unsafe as directory names on some platforms
const RESERVED_NAMES: &[&str] = &[
    ".", "..", "con", "prn", "aux", "nul",
    "com1", "com2", "com3", "com4", "com5", "com6", "com7", "com8", "com9",
    "lpt1", "lpt2", "lpt3", "lpt4", "lpt5", "lpt6", "lpt7", "lpt8", "lpt9",
];

pub fn validate_database_name(name: &str) -> Result<(), NameError> {
    validate_segment(name, "database name")
}

pub fn validate_collection_name(name: &str) -> Result<(), NameError> {
    validate_segment(name, "collection name")
}

/// Rules:
/// - 1 to 64 ASCII characters
/// - alphanumeric, underscore and hyphen only
/// - first character alphanumeric
/// - not a reserved device name (case-insensitive)
fn validate_segment(name: &str, kind: &'static str) -> Result<(), NameError> {
    let reject = |reason| NameError {
        kind,
        value: name.to_string(),
        reason,
    };

    if name.is_empty() {
        return Err(reject("cannot be empty"));
    }

    if name.len() > MAX_NAME_LENGTH {
        return Err(reject("exceeds maximum length"));
    }

    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
        return Err(reject(
            "contains invalid characters (only alphanumeric, underscore, and hyphen allowed)",
        ));
    }

    if name.starts_with(['-', '_']) {
        return Err(reject("cannot start with hyphen or underscore"));
    }

    if RESERVED_NAMES.contains(&name.to_lowercase().as_str()) {
        return Err(reject("reserved name"));
    }

    Ok(())
}
